//! In-memory doubles for the page and model seams.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use url::Url;

use job_autofill::gemini_client::TextModel;
use job_autofill::page::{ControlTag, FormControlDescriptor, FormPage, NavigationResponse, Navigator};
use job_autofill::profile::{Details, Profile, ProfileStore, StructuredResume};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    SetValue(usize, String),
    SetChecked(usize, bool),
    Select(usize, String),
    Assign(usize, String),
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub tag: ControlTag,
    pub r#type: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub options: Vec<String>,
    pub value: String,
    pub checked: bool,
    pub broken: bool,
}

impl FakeElement {
    fn new(tag: ControlTag, ty: Option<&str>, name: &str) -> Self {
        Self {
            tag,
            r#type: ty.map(str::to_string),
            name: Some(name.to_string()),
            label: None,
            options: Vec::new(),
            value: String::new(),
            checked: false,
            broken: false,
        }
    }

    pub fn input(ty: &str, name: &str) -> Self {
        Self::new(ControlTag::Input, Some(ty), name)
    }

    pub fn textarea(name: &str) -> Self {
        Self::new(ControlTag::Textarea, Some("textarea"), name)
    }

    pub fn select(name: &str, options: &[&str]) -> Self {
        let mut el = Self::new(ControlTag::Select, Some("select-one"), name);
        el.options = options.iter().map(|o| o.to_string()).collect();
        el
    }

    pub fn other(name: &str) -> Self {
        Self::new(ControlTag::Other, None, name)
    }

    pub fn labelled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Every mutation on this element fails, like a detached node.
    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

#[derive(Debug, Clone)]
pub enum NavBehavior {
    Status(Option<u16>),
    Error,
    Hang,
}

pub struct FakePage {
    elements: Mutex<Vec<FakeElement>>,
    /// Appended to the DOM right after the first enumeration.
    late_elements: Mutex<Vec<FakeElement>>,
    ops: Mutex<Vec<Op>>,
    nav: NavBehavior,
    navigations: AtomicUsize,
}

impl FakePage {
    pub fn new(elements: Vec<FakeElement>) -> Self {
        Self {
            elements: Mutex::new(elements),
            late_elements: Mutex::new(Vec::new()),
            ops: Mutex::new(Vec::new()),
            nav: NavBehavior::Status(Some(200)),
            navigations: AtomicUsize::new(0),
        }
    }

    pub fn with_navigation(mut self, nav: NavBehavior) -> Self {
        self.nav = nav;
        self
    }

    pub fn with_late_elements(self, late: Vec<FakeElement>) -> Self {
        *self.late_elements.lock().unwrap() = late;
        self
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    pub fn element(&self, index: usize) -> FakeElement {
        self.elements.lock().unwrap()[index].clone()
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    fn mutate(&self, index: usize, op: Op, f: impl FnOnce(&mut FakeElement) -> Result<()>) -> Result<()> {
        let mut elements = self.elements.lock().unwrap();
        let el = elements
            .get_mut(index)
            .ok_or_else(|| anyhow!("element #{index} is detached"))?;
        if el.broken {
            bail!("element #{index} is not interactable");
        }
        f(el)?;
        self.ops.lock().unwrap().push(op);
        Ok(())
    }
}

#[async_trait]
impl FormPage for FakePage {
    type Control = usize;

    async fn list_controls(&self) -> Result<Vec<usize>> {
        let mut elements = self.elements.lock().unwrap();
        let handles = (0..elements.len()).collect();
        elements.append(&mut self.late_elements.lock().unwrap());
        Ok(handles)
    }

    async fn describe_control(&self, control: &usize, index: usize) -> Result<FormControlDescriptor> {
        let elements = self.elements.lock().unwrap();
        let el = elements
            .get(*control)
            .ok_or_else(|| anyhow!("element #{control} is detached"))?;
        let mut d = FormControlDescriptor::new(index, el.tag);
        d.r#type = el.r#type.clone();
        d.name = el.name.clone();
        d.label_text = el.label.clone();
        Ok(d)
    }

    async fn set_value(&self, control: &usize, value: &str) -> Result<()> {
        self.mutate(*control, Op::SetValue(*control, value.to_string()), |el| {
            el.value = value.to_string();
            Ok(())
        })
    }

    async fn set_checked(&self, control: &usize, checked: bool) -> Result<()> {
        self.mutate(*control, Op::SetChecked(*control, checked), |el| {
            el.checked = checked;
            Ok(())
        })
    }

    async fn select_option(&self, control: &usize, value: &str) -> Result<()> {
        self.mutate(*control, Op::Select(*control, value.to_string()), |el| {
            if !el.options.iter().any(|o| o == value) {
                bail!("no option with value {value:?}");
            }
            el.value = value.to_string();
            Ok(())
        })
    }

    async fn assign_value(&self, control: &usize, value: &str) -> Result<()> {
        self.mutate(*control, Op::Assign(*control, value.to_string()), |el| {
            el.value = value.to_string();
            Ok(())
        })
    }
}

#[async_trait]
impl Navigator for FakePage {
    async fn navigate(&self, _url: &Url) -> Result<NavigationResponse> {
        self.navigations.fetch_add(1, Ordering::SeqCst);
        match &self.nav {
            NavBehavior::Status(status) => Ok(NavigationResponse { status: *status }),
            NavBehavior::Error => bail!("net::ERR_NAME_NOT_RESOLVED"),
            NavBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

/// Model that always answers with the same text (or error) and records prompts.
#[derive(Clone)]
pub struct ScriptedModel {
    reply: std::result::Result<String, String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => bail!("{message}"),
        }
    }
}

pub fn ready_profile() -> Profile {
    let mut profile = Profile::new("test-key", "Ada Lovelace\nGo, SQL");
    profile.resume_structured = Some(StructuredResume {
        name: Some("Ada Lovelace".into()),
        email: Some("ada@example.com".into()),
        skills: vec!["Go".into(), "SQL".into()],
        ..Default::default()
    });
    profile.details = Some(Details::from([
        ("name".to_string(), "Ada Lovelace".to_string()),
        ("gender".to_string(), "Prefer not to say".to_string()),
    ]));
    profile
}

pub async fn store_with(dir: &tempfile::TempDir, profile: &Profile) -> ProfileStore {
    let store = ProfileStore::new(dir.path().join("userData.json"));
    store.save(profile).await.unwrap();
    store
}
