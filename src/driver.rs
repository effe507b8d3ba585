// src/driver.rs (visible, persistent profile)
use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use thirtyfour::prelude::*;
use thirtyfour::{CapabilitiesHelper, ChromeCapabilities, PageLoadStrategy};
use tokio::net::TcpStream;
use which::which;

use crate::config::{DriverSettings, NAVIGATION_TIMEOUT};

/// A chromedriver child plus the WebDriver session on top of it.
///
/// Never quit by this tool: the window stays open so a human can review what
/// was filled, including after failures.
pub struct BrowserSession {
    pub driver: WebDriver,
    pub chromedriver_child: Child,
    pub user_data_dir: PathBuf,
}

impl BrowserSession {
    /// Hand the browser over to the user. Dropping the session would end it,
    /// so the handles are intentionally leaked.
    pub fn detach(self) {
        println!(
            "🪟 Browser left open for review (profile: {}).",
            self.user_data_dir.display()
        );
        std::mem::forget(self);
    }
}

pub async fn launch_browser(settings: &DriverSettings) -> Result<BrowserSession> {
    let chromedriver_path =
        which("chromedriver").context("chromedriver not found in PATH. Install it or add to PATH.")?;

    let log_file = File::create(log_path()).context("cannot create chromedriver.log")?;

    let chromedriver = spawn_chromedriver(chromedriver_path.as_path(), settings.port, log_file)?;
    wait_for_port("127.0.0.1", settings.port, Duration::from_secs(10))
        .await
        .context("chromedriver did not become ready on time")?;

    // Persistent profile so logins and cookies survive between runs.
    std::fs::create_dir_all(&settings.user_data_dir)
        .with_context(|| format!("cannot create {}", settings.user_data_dir.display()))?;
    let user_data_dir = settings
        .user_data_dir
        .canonicalize()
        .unwrap_or_else(|_| settings.user_data_dir.clone());
    let caps = chrome_capabilities(settings, &user_data_dir)?;

    let driver_url = format!("http://127.0.0.1:{}", settings.port);
    let driver = WebDriver::new(&driver_url, caps)
        .await
        .context("failed to start a Chrome session")?;
    driver
        .set_page_load_timeout(NAVIGATION_TIMEOUT)
        .await
        .context("failed to set page-load timeout")?;

    Ok(BrowserSession {
        driver,
        chromedriver_child: chromedriver,
        user_data_dir,
    })
}

fn chrome_capabilities(settings: &DriverSettings, user_data_dir: &Path) -> Result<ChromeCapabilities> {
    let mut caps = DesiredCapabilities::chrome();

    if let Some(bin) = settings.chrome_bin.as_deref() {
        caps.set_binary(bin)?;
    } else if let Some(bin) = find_chrome_bin() {
        caps.set_binary(&bin)?;
    }

    // Return from goto at DOMContentLoaded, not after every subresource.
    caps.set_page_load_strategy(PageLoadStrategy::Eager)?;

    caps.add_arg(&format!("--user-data-dir={}", user_data_dir.to_string_lossy()))?;
    if settings.headless {
        caps.add_arg("--headless=new")?;
    } else {
        caps.add_arg("--start-maximized")?;
    }
    caps.add_arg("--no-default-browser-check")?;
    caps.add_arg("--no-first-run")?;
    caps.add_arg("--disable-infobars")?;

    caps.add_experimental_option("excludeSwitches", vec!["enable-automation"])?;
    caps.add_experimental_option("useAutomationExtension", false)?;
    // Keep Chrome alive even after chromedriver goes away.
    caps.add_experimental_option("detach", true)?;
    Ok(caps)
}

fn spawn_chromedriver(chromedriver: &Path, port: u16, log_file: File) -> Result<Child> {
    let mut cmd = Command::new(chromedriver);
    cmd.arg(format!("--port={}", port))
        .stdout(Stdio::from(log_file.try_clone()?))
        .stderr(Stdio::from(log_file));
    let child = cmd.spawn().with_context(|| "failed to spawn chromedriver")?;
    Ok(child)
}

async fn wait_for_port(host: &str, port: u16, timeout: Duration) -> Result<()> {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if TcpStream::connect((host, port)).await.is_ok() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(150)).await;
    }
    bail!("port {}:{} did not open within {:?}", host, port, timeout)
}

fn find_chrome_bin() -> Option<String> {
    for cand in [
        "google-chrome",
        "google-chrome-stable",
        "chromium-browser",
        "chromium",
    ] {
        if let Ok(p) = which(cand) {
            return Some(p.to_string_lossy().into_owned());
        }
    }
    None
}

fn log_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join("chromedriver.log")
}
