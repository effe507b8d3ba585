//! Job application autofill: resume profile, Gemini inference, WebDriver form filling.

pub mod apply;
pub mod autofill;
pub mod cli;
pub mod config;
pub mod console;
pub mod driver;
pub mod error;
pub mod gemini_client;
pub mod mapping;
pub mod page;
pub mod profile;
pub mod resume;
pub mod webpage;

pub use apply::{apply_to_job, preview_navigation, ApplyOutcome, FailureReason};
pub use autofill::fill_form;
pub use error::{AutofillError, Result};
pub use profile::{Profile, ProfileStore};
