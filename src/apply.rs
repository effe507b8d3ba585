//! One job application: profile → model → URL check → navigation → autofill.

use log::info;
use serde::Serialize;
use std::fmt;
use url::Url;

use crate::autofill::fill_form;
use crate::config::NAVIGATION_TIMEOUT;
use crate::error::{AutofillError, Result};
use crate::gemini_client::TextModel;
use crate::page::{FormPage, Navigator};
use crate::profile::ProfileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    InvalidUrl,
    NavigationFailed,
    NavigationError,
    AiFailed,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::InvalidUrl => "invalid-url",
            FailureReason::NavigationFailed => "navigation-failed",
            FailureReason::NavigationError => "navigation-error",
            FailureReason::AiFailed => "ai-failed",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Completed,
    Failed(FailureReason),
}

impl ApplyOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApplyOutcome::Completed)
    }
}

/// Run one application against an already-open `page`.
///
/// Only a missing or incomplete profile is returned as an error; every later
/// stage reports failure through [`ApplyOutcome`]. The page is never closed.
pub async fn apply_to_job<P, M, F>(
    url: &str,
    store: &ProfileStore,
    page: &P,
    connect: F,
) -> Result<ApplyOutcome>
where
    P: FormPage + Navigator + ?Sized,
    M: TextModel,
    F: FnOnce(&str) -> Result<M>,
{
    let profile = store.load().await?;
    profile.ensure_ready()?;

    let model = match connect(&profile.api_key) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("❌ Could not set up the AI client: {e}");
            return Ok(ApplyOutcome::Failed(FailureReason::AiFailed));
        }
    };

    let target = match Url::parse(url.trim()) {
        Ok(u) => u,
        Err(e) => {
            let err = AutofillError::InvalidInput(format!("{url:?} is not a valid URL ({e})"));
            eprintln!("❌ {err}");
            return Ok(ApplyOutcome::Failed(FailureReason::InvalidUrl));
        }
    };

    match tokio::time::timeout(NAVIGATION_TIMEOUT, page.navigate(&target)).await {
        Ok(Ok(resp)) if resp.is_loaded() => {
            info!("navigation to {target} returned {:?}", resp.status);
        }
        Ok(Ok(resp)) => {
            let status = resp
                .status
                .map_or_else(|| "no response".to_string(), |s| s.to_string());
            let err = AutofillError::NavigationFailure(format!("status: {status}"));
            eprintln!("❌ Failed to load page ({err}). The browser is open for inspection.");
            return Ok(ApplyOutcome::Failed(FailureReason::NavigationFailed));
        }
        Ok(Err(e)) => {
            let err = AutofillError::NavigationFailure(format!("{e:#}"));
            eprintln!("❌ Couldn't access the URL. The browser is open for inspection. {err}");
            return Ok(ApplyOutcome::Failed(FailureReason::NavigationError));
        }
        Err(_) => {
            let err = AutofillError::NavigationFailure(format!(
                "timed out after {}s",
                NAVIGATION_TIMEOUT.as_secs()
            ));
            eprintln!("❌ Couldn't access the URL. The browser is open for inspection. {err}");
            return Ok(ApplyOutcome::Failed(FailureReason::NavigationError));
        }
    }

    if let Err(e) = fill_form(page, &model, &profile).await {
        eprintln!("❌ AI-driven autofill failed: {e}");
        return Ok(ApplyOutcome::Failed(FailureReason::AiFailed));
    }

    println!("🎉 AI autofill complete. Please review before submitting. The browser remains open for inspection.");
    Ok(ApplyOutcome::Completed)
}

/// First look at the job page before the go/exit gate. Bounded by the same
/// navigation timeout; any problem is printed and the gate still runs.
pub async fn preview_navigation<P: Navigator + ?Sized>(url: &str, page: &P) -> bool {
    let problem = match Url::parse(url.trim()) {
        Err(e) => format!("{e}"),
        Ok(target) => match tokio::time::timeout(NAVIGATION_TIMEOUT, page.navigate(&target)).await {
            Ok(Ok(_)) => return true,
            Ok(Err(e)) => format!("{e:#}"),
            Err(_) => format!("timed out after {}s", NAVIGATION_TIMEOUT.as_secs()),
        },
    };
    println!("Navigation may have failed; you can inspect the open browser. Error: {problem}");
    false
}
