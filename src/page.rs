//! Capability seams between the form filler and a live browser page.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Every control the filler considers, in DOM order.
pub const CONTROL_SELECTOR: &str = "input, textarea, select";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlTag {
    Input,
    Textarea,
    Select,
    #[serde(other)]
    Other,
}

impl ControlTag {
    pub fn from_tag_name(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "input" => ControlTag::Input,
            "textarea" => ControlTag::Textarea,
            "select" => ControlTag::Select,
            _ => ControlTag::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlTag::Input => "input",
            ControlTag::Textarea => "textarea",
            ControlTag::Select => "select",
            ControlTag::Other => "other",
        }
    }
}

impl fmt::Display for ControlTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one form control, serialized into the AI prompt as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormControlDescriptor {
    pub index: usize,
    pub tag: ControlTag,
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub name: Option<String>,
    pub id: Option<String>,
    pub placeholder: Option<String>,
    pub aria_label: Option<String>,
    pub label_text: Option<String>,
}

impl FormControlDescriptor {
    pub fn new(index: usize, tag: ControlTag) -> Self {
        Self {
            index,
            tag,
            r#type: None,
            name: None,
            id: None,
            placeholder: None,
            aria_label: None,
            label_text: None,
        }
    }

    /// Checkbox or radio `<input>`, compared case-insensitively.
    pub fn is_toggle(&self) -> bool {
        self.tag == ControlTag::Input
            && matches!(
                self.r#type.as_deref().map(str::to_ascii_lowercase).as_deref(),
                Some("checkbox") | Some("radio")
            )
    }

    /// Short human label for status lines, e.g. `input name=email`.
    pub fn short_label(&self) -> String {
        match (&self.name, &self.id) {
            (Some(name), _) => format!("{} name={name}", self.tag),
            (None, Some(id)) => format!("{} id={id}", self.tag),
            _ => self.tag.to_string(),
        }
    }
}

/// Label text for a control: the `<label for=id>` text when the control has an
/// id and such a label exists, otherwise the enclosing `<label>`, otherwise none.
pub fn pick_label(
    id: Option<&str>,
    label_for: Option<String>,
    ancestor_label: Option<String>,
) -> Option<String> {
    let has_id = id.map_or(false, |i| !i.is_empty());
    match label_for {
        Some(text) if has_id => Some(text),
        _ => ancestor_label,
    }
}

/// DOM operations the form filler needs from a page.
///
/// `Control` is whatever handle the backend uses for a live element. Handles
/// are only valid until the next DOM mutation.
#[async_trait]
pub trait FormPage: Send + Sync {
    type Control: Send + Sync;

    /// Controls matching [`CONTROL_SELECTOR`], in document order.
    async fn list_controls(&self) -> Result<Vec<Self::Control>>;

    /// Read metadata for `control`. Label text precedence: `<label for=id>`,
    /// then an ancestor `<label>`, then none.
    async fn describe_control(
        &self,
        control: &Self::Control,
        index: usize,
    ) -> Result<FormControlDescriptor>;

    /// Replace the text content of an input or textarea.
    async fn set_value(&self, control: &Self::Control, value: &str) -> Result<()>;

    /// Set `checked` and dispatch a bubbling `change` event.
    async fn set_checked(&self, control: &Self::Control, checked: bool) -> Result<()>;

    /// Select the option whose `value` equals `value`.
    async fn select_option(&self, control: &Self::Control, value: &str) -> Result<()>;

    /// Assign the `value` property directly and dispatch a bubbling `input` event.
    async fn assign_value(&self, control: &Self::Control, value: &str) -> Result<()>;
}

/// What came back from a top-level navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationResponse {
    /// HTTP status of the main document, when the browser reports one.
    pub status: Option<u16>,
}

impl NavigationResponse {
    pub fn with_status(status: u16) -> Self {
        Self { status: Some(status) }
    }

    /// 2xx and 3xx count as loaded; a missing status does not.
    pub fn is_loaded(&self) -> bool {
        matches!(self.status, Some(s) if (200..400).contains(&s))
    }
}

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn navigate(&self, url: &Url) -> Result<NavigationResponse>;
}
