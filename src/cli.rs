//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "job-autofill")]
#[command(about = "Fill job application forms from your resume with Gemini")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Profile file (default: userData.json or $AUTOFILL_PROFILE_PATH)
    #[arg(short, long, global = true)]
    pub profile: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Store the API key, resume text and personal details
    Setup,

    /// Turn the stored resume text into structured JSON
    ParseResume,

    /// Open a job posting and autofill its form
    Apply {
        /// Job posting URL (prompted for when omitted)
        url: Option<String>,
    },
}
