//! Launching browsers through the Playwright bridge

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use screenplay::config::Settings;
use serde_json::{json, Value};
use tokio::process::Command;
use tracing::{debug, info};

use crate::bridge::{Bridge, BRIDGE_SCRIPT};
use crate::error::{E2eError, E2eResult};
use crate::playwright::{ContextSetup, Deadlines, PlaywrightBrowser};

const BROWSER_TYPES: [&str; 3] = ["chromium", "firefox", "webkit"];

/// Resolves `playwright` the same way the bridge script does
const RESOLVE_PLAYWRIGHT: &str =
    "try { require.resolve('playwright', { paths: [process.cwd()] }) } catch (_) { require.resolve('playwright') }";

/// Everything needed to start a browser
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// chromium, firefox or webkit
    pub browser_name: String,
    pub headless: bool,
    pub slow_mo: Duration,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Where context videos are recorded; off when unset
    pub video_dir: Option<PathBuf>,
    /// Where context traces are saved; off when unset
    pub trace_dir: Option<PathBuf>,

    /// Node.js executable
    pub node: PathBuf,
    /// Directory `playwright` is resolved from
    pub working_dir: PathBuf,
    /// Budget for the bridge to report ready
    pub startup_timeout: Duration,
    /// Budget for the browser itself to launch
    pub launch_timeout: Duration,
    pub deadlines: Deadlines,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl LaunchConfig {
    /// Browser options plus video and trace output under the reports directory
    pub fn from_settings(all: &Settings) -> Self {
        let settings = &all.browser;
        let reports = &all.test.reports_path;
        Self {
            browser_name: settings.browser_name.clone(),
            headless: settings.headless,
            slow_mo: Duration::from_millis(settings.slow_mo),
            viewport_width: settings.viewport_width,
            viewport_height: settings.viewport_height,
            video_dir: settings.video.then(|| reports.join("videos")),
            trace_dir: settings.trace.then(|| reports.join("traces")),
            node: PathBuf::from("node"),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            startup_timeout: Duration::from_secs(15),
            launch_timeout: Duration::from_secs(60),
            deadlines: Deadlines {
                request: Duration::from_millis(settings.timeout),
                ..Deadlines::default()
            },
        }
    }

    fn launch_params(&self) -> Value {
        json!({
            "browser": self.browser_name,
            "headless": self.headless,
            "slowMo": self.slow_mo.as_millis() as u64,
        })
    }

    fn context_params(&self) -> Value {
        let viewport = json!({ "width": self.viewport_width, "height": self.viewport_height });
        let mut params = json!({ "viewport": viewport });
        if let Some(dir) = &self.video_dir {
            params["recordVideo"] = json!({ "dir": dir.to_string_lossy(), "size": viewport });
        }
        params
    }

    fn context_setup(&self) -> ContextSetup {
        ContextSetup {
            options: self.context_params(),
            trace_dir: self.trace_dir.clone(),
        }
    }

    fn validate(&self) -> E2eResult<()> {
        if BROWSER_TYPES.contains(&self.browser_name.as_str()) {
            Ok(())
        } else {
            Err(E2eError::UnsupportedBrowser(self.browser_name.clone()))
        }
    }
}

/// Check that node runs and can resolve the `playwright` package
pub async fn check_available(config: &LaunchConfig) -> E2eResult<()> {
    let status = Command::new(&config.node)
        .arg("-e")
        .arg(RESOLVE_PLAYWRIGHT)
        .current_dir(&config.working_dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(_) => Err(E2eError::PlaywrightNotFound),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(E2eError::NodeNotFound),
        Err(e) => Err(e.into()),
    }
}

/// Start the bridge and launch a browser in it
pub async fn launch(config: &LaunchConfig) -> E2eResult<PlaywrightBrowser> {
    config.validate()?;
    for dir in config.video_dir.iter().chain(config.trace_dir.iter()) {
        std::fs::create_dir_all(config.working_dir.join(dir))?;
    }

    let script_dir = tempfile::tempdir()?;
    let script_path = script_dir.path().join("screenplay-bridge.js");
    std::fs::write(&script_path, BRIDGE_SCRIPT)?;
    debug!("Wrote bridge script to {}", script_path.display());

    let mut command = Command::new(&config.node);
    command.arg(&script_path).current_dir(&config.working_dir);
    let bridge = Bridge::spawn(command, config.startup_timeout)
        .await?
        .retain(script_dir);

    let launched = bridge
        .request(None, "launch", config.launch_params(), config.launch_timeout)
        .await
        .and_then(|id| serde_json::from_value::<String>(id).map_err(E2eError::from));
    let browser_id = match launched {
        Ok(id) => id,
        Err(e) => {
            bridge.shutdown(config.deadlines.shutdown).await.ok();
            return Err(e);
        }
    };

    info!(
        "Launched {} ({}, {}x{})",
        config.browser_name,
        if config.headless { "headless" } else { "headed" },
        config.viewport_width,
        config.viewport_height
    );
    Ok(PlaywrightBrowser::new(
        bridge,
        browser_id,
        config.context_setup(),
        config.deadlines,
    ))
}
