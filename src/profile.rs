//! The locally stored user profile (`userData.json`) and its store handle.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{AutofillError, Result};

/// Free-form personal details, e.g. `address`, `gender`, `email`.
pub type Details = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub resume_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_structured: Option<StructuredResume>,
    #[serde(default, deserialize_with = "lenient_details", skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
    /// Fields we don't model are carried through a load/save cycle untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Resume fields as extracted by the model. List entries keep whatever shape
/// the model chose (plain strings or objects).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredResume {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skills: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub experience: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub education: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub projects: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn new(api_key: impl Into<String>, resume_raw: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            resume_raw: resume_raw.into(),
            ..Default::default()
        }
    }

    /// Borrow the pieces the form filler needs, or explain what is missing.
    pub fn ensure_ready(&self) -> Result<(&StructuredResume, &Details)> {
        match (&self.resume_structured, &self.details) {
            (Some(resume), Some(details)) => Ok((resume, details)),
            _ => Err(AutofillError::ConfigurationMissing(
                "profile exists but is missing required data (structured resume or personal details). \
                 Run `job-autofill setup` and `job-autofill parse-resume` first."
                    .to_string(),
            )),
        }
    }

    /// Store a freshly derived resume and copy its contact fields into
    /// `details`, keeping every other detail entry.
    pub fn merge_structured(&mut self, structured: StructuredResume) {
        let details = self.details.get_or_insert_with(Details::new);
        for (key, value) in [
            ("name", &structured.name),
            ("email", &structured.email),
            ("phone", &structured.phone),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                details.insert(key.to_string(), v.to_string());
            }
        }
        self.resume_structured = Some(structured);
    }
}

/// Explicit handle on the profile file; read and written wholesale.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Profile> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AutofillError::ConfigurationMissing(format!(
                    "{} not found. Please run `job-autofill setup` to create it.",
                    self.path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| {
            AutofillError::ConfigurationMissing(format!(
                "{} is not a valid profile ({e}). Re-run `job-autofill setup`.",
                self.path.display()
            ))
        })
    }

    /// Full rewrite with 2-space indentation.
    pub async fn save(&self, profile: &Profile) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut body = serde_json::to_string_pretty(profile)?;
        body.push('\n');
        tokio::fs::write(&self.path, body).await?;
        debug!("profile written to {}", self.path.display());
        Ok(())
    }
}

/* ---------- Small internal helpers ---------- */

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Detail values written by hand or older tools may be numbers or booleans;
/// they are kept as their JSON text. Null entries are dropped.
fn lenient_details<'de, D>(deserializer: D) -> std::result::Result<Option<Details>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Map<String, Value>>::deserialize(deserializer)?;
    Ok(raw.map(|map| {
        map.into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect()
    }))
}

fn lenient_list<'de, D>(deserializer: D) -> std::result::Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        single => vec![single],
    })
}
