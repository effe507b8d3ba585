// src/config.rs
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PROFILE_PATH: &str = "userData.json";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Upper bound for a single page navigation. Not configurable per call.
pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(20);

/// Runtime settings read once from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Settings {
    pub profile_path: PathBuf,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub gemini_timeout: Duration,
    pub driver: DriverSettings,
}

#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub port: u16,
    pub chrome_bin: Option<String>,
    /// Persistent Chrome profile so logins survive between runs.
    pub user_data_dir: PathBuf,
    pub headless: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            profile_path: env::var("AUTOFILL_PROFILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROFILE_PATH)),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_timeout: Duration::from_secs(env_parse("GEMINI_TIMEOUT_SECS", 60)),
            driver: DriverSettings::from_env(),
        }
    }
}

impl DriverSettings {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("CHROMEDRIVER_PORT", 9515),
            chrome_bin: env::var("CHROME_BIN").ok().filter(|s| !s.trim().is_empty()),
            user_data_dir: env::var("BROWSER_PROFILE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./browser-profile")),
            headless: env::var("HEADLESS").map_or(false, |v| v == "1"),
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
