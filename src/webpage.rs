// src/webpage.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thirtyfour::components::SelectElement;
use thirtyfour::prelude::*;
use url::Url;

use crate::page::{
    pick_label, ControlTag, FormControlDescriptor, FormPage, NavigationResponse, Navigator,
    CONTROL_SELECTOR,
};

const DESCRIBE_SCRIPT: &str = r#"
const el = arguments[0];
const byFor = el.id ? document.querySelector(`label[for="${CSS.escape(el.id)}"]`) : null;
const ancestor = el.closest ? el.closest("label") : null;
return {
  tag: el.tagName.toLowerCase(),
  type: el.type || null,
  name: el.name || null,
  id: el.id || null,
  placeholder: el.placeholder || null,
  ariaLabel: el.getAttribute ? el.getAttribute("aria-label") : null,
  labelFor: byFor ? byFor.innerText : null,
  ancestorLabel: ancestor ? ancestor.innerText : null,
};
"#;

const SET_CHECKED_SCRIPT: &str = r#"
const el = arguments[0];
el.checked = arguments[1];
el.dispatchEvent(new Event("change", { bubbles: true }));
"#;

const ASSIGN_VALUE_SCRIPT: &str = r#"
const el = arguments[0];
el.value = arguments[1];
el.dispatchEvent(new Event("input", { bubbles: true }));
"#;

const RESPONSE_STATUS_SCRIPT: &str = r#"
const nav = performance.getEntriesByType("navigation")[0];
return nav && nav.responseStatus ? nav.responseStatus : null;
"#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ControlMetadata {
    tag: String,
    #[serde(rename = "type")]
    r#type: Option<String>,
    name: Option<String>,
    id: Option<String>,
    placeholder: Option<String>,
    aria_label: Option<String>,
    label_for: Option<String>,
    ancestor_label: Option<String>,
}

/// [`FormPage`] and [`Navigator`] over the current tab of a WebDriver session.
pub struct WebDriverPage<'a> {
    driver: &'a WebDriver,
}

impl<'a> WebDriverPage<'a> {
    pub fn new(driver: &'a WebDriver) -> Self {
        Self { driver }
    }

    async fn run_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        let ret = self
            .driver
            .execute(script, args)
            .await
            .context("script execution failed")?;
        Ok(ret.json().clone())
    }
}

#[async_trait]
impl<'a> FormPage for WebDriverPage<'a> {
    type Control = WebElement;

    async fn list_controls(&self) -> Result<Vec<WebElement>> {
        self.driver
            .find_all(By::Css(CONTROL_SELECTOR))
            .await
            .context("failed to enumerate form controls")
    }

    async fn describe_control(&self, control: &WebElement, index: usize) -> Result<FormControlDescriptor> {
        let raw = self.run_script(DESCRIBE_SCRIPT, vec![control.to_json()?]).await?;
        let meta: ControlMetadata =
            serde_json::from_value(raw).context("unexpected control metadata shape")?;

        let label_text = pick_label(meta.id.as_deref(), meta.label_for, meta.ancestor_label);
        Ok(FormControlDescriptor {
            index,
            tag: ControlTag::from_tag_name(&meta.tag),
            r#type: meta.r#type,
            name: meta.name,
            id: meta.id,
            placeholder: meta.placeholder,
            aria_label: meta.aria_label,
            label_text,
        })
    }

    async fn set_value(&self, control: &WebElement, value: &str) -> Result<()> {
        control.clear().await.context("clear failed")?;
        control.send_keys(value).await.context("typing failed")?;
        Ok(())
    }

    async fn set_checked(&self, control: &WebElement, checked: bool) -> Result<()> {
        self.run_script(SET_CHECKED_SCRIPT, vec![control.to_json()?, json!(checked)])
            .await?;
        Ok(())
    }

    async fn select_option(&self, control: &WebElement, value: &str) -> Result<()> {
        let select = SelectElement::new(control)
            .await
            .context("element is not a <select>")?;
        select
            .select_by_value(value)
            .await
            .with_context(|| format!("no option with value {value:?}"))?;
        Ok(())
    }

    async fn assign_value(&self, control: &WebElement, value: &str) -> Result<()> {
        self.run_script(ASSIGN_VALUE_SCRIPT, vec![control.to_json()?, json!(value)])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<'a> Navigator for WebDriverPage<'a> {
    async fn navigate(&self, url: &Url) -> Result<NavigationResponse> {
        println!("🌐 Visit: {url}");
        self.driver
            .goto(url.as_str())
            .await
            .with_context(|| format!("failed to load {url}"))?;

        let status = self
            .run_script(RESPONSE_STATUS_SCRIPT, Vec::new())
            .await?
            .as_u64()
            .and_then(|s| u16::try_from(s).ok());
        Ok(NavigationResponse { status })
    }
}
