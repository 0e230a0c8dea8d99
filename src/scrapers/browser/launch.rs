//! Starting or attaching to a Chrome instance.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::BrowserEngineConfig;
use crate::error::{Result, ScrapeError};

/// Well-known Chrome locations, checked before searching `PATH`.
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// A connected browser and the task driving its CDP connection.
pub(crate) struct Session {
    pub browser: Browser,
    pub handler: JoinHandle<()>,
    pub remote: bool,
}

pub(crate) async fn start(config: &BrowserEngineConfig) -> Result<Session> {
    match config.remote_url.as_deref() {
        Some(url) => connect_remote(url).await,
        None => launch(config).await,
    }
}

fn find_chrome(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(ScrapeError::Browser(format!(
            "Configured Chrome executable {} does not exist",
            path.display()
        )));
    }

    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    for cmd in CHROME_COMMANDS {
        if let Ok(path) = which::which(cmd) {
            info!("Found Chrome in PATH: {}", path.display());
            return Ok(path);
        }
    }

    Err(ScrapeError::Browser(
        "Chrome/Chromium not found. Install it, or set browser.chrome_path \
         (or EVICTIONS_CHROME) to its executable"
            .to_string(),
    ))
}

async fn launch(config: &BrowserEngineConfig) -> Result<Session> {
    info!("Launching browser (headless={})", config.headless);

    let chrome_path = find_chrome(config.chrome_path.as_deref())?;
    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .request_timeout(Duration::from_secs(config.timeout));

    // with_head means a visible window
    if !config.headless {
        builder = builder.with_head();
    }

    if let Some(ref proxy) = config.proxy {
        builder = builder.arg(format!("--proxy-server={}", proxy));
    }

    builder = builder
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-translate")
        .arg("--no-sandbox")
        .arg("--disable-gpu");

    for arg in &config.chrome_args {
        builder = builder.arg(arg);
    }

    let browser_config = builder
        .build()
        .map_err(|e| ScrapeError::Browser(format!("Failed to build browser config: {}", e)))?;

    let (browser, handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| ScrapeError::Browser(format!("Failed to launch browser: {}", e)))?;

    Ok(Session {
        browser,
        handler: drive(handler),
        remote: false,
    })
}

/// Attach to a running Chrome through its DevTools endpoint.
async fn connect_remote(url: &str) -> Result<Session> {
    info!("Connecting to remote browser at {}", url);

    let http_url = url
        .replace("ws://", "http://")
        .replace("wss://", "https://");
    let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

    let resp: serde_json::Value = reqwest::Client::new()
        .get(&version_url)
        .send()
        .await
        .map_err(|e| ScrapeError::Browser(format!("Failed to reach remote browser: {}", e)))?
        .json()
        .await
        .map_err(|e| ScrapeError::Browser(format!("Failed to parse browser version info: {}", e)))?;

    let ws_url = resp
        .get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ScrapeError::Browser("No webSocketDebuggerUrl in response".to_string()))?;

    debug!("Connecting to WebSocket: {}", ws_url);

    let (browser, handler) = Browser::connect(ws_url)
        .await
        .map_err(|e| ScrapeError::Browser(format!("Failed to connect to remote browser: {}", e)))?;

    Ok(Session {
        browser,
        handler: drive(handler),
        remote: true,
    })
}

fn drive(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    })
}
