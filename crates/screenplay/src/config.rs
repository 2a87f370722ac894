//! Test-run configuration
//!
//! Settings come from three layers: built-in defaults, an optional TOML
//! file, and environment variable overrides. Named environment presets can
//! be applied on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Complete configuration for a test run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Browser launch and context configuration
    pub browser: BrowserSettings,

    /// Target environment and credentials
    pub environment: EnvironmentSettings,

    /// Test execution configuration
    pub test: TestSettings,
}

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Playwright browser type: chromium, firefox or webkit
    pub browser_name: String,

    pub headless: bool,

    /// Delay inserted after each driver operation, in milliseconds
    pub slow_mo: u64,

    /// Default timeout for waits and navigation, in milliseconds
    pub timeout: u64,

    pub viewport_width: u32,

    pub viewport_height: u32,

    /// Record video of each context
    pub video: bool,

    /// Screenshot policy passed through to the runner
    pub screenshot: String,

    /// Record a Playwright trace
    pub trace: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            browser_name: "chromium".to_string(),
            headless: true,
            slow_mo: 0,
            timeout: 30_000,
            viewport_width: 1920,
            viewport_height: 1080,
            video: false,
            screenshot: "only-on-failure".to_string(),
            trace: false,
        }
    }
}

/// Environment-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSettings {
    /// Name of the environment preset these values came from
    pub environment: String,

    pub base_url: String,

    pub api_base_url: String,

    pub valid_username: String,

    pub valid_password: String,

    pub invalid_username: String,

    pub invalid_password: String,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            environment: "dev".to_string(),
            base_url: "https://practicetestautomation.com".to_string(),
            api_base_url: String::new(),
            valid_username: "student".to_string(),
            valid_password: "Password123".to_string(),
            invalid_username: "incorrectUser".to_string(),
            invalid_password: "incorrectPassword".to_string(),
        }
    }
}

/// Test execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestSettings {
    pub retry_count: u32,

    pub parallel_workers: u32,

    pub test_data_path: PathBuf,

    pub reports_path: PathBuf,

    pub logs_path: PathBuf,

    pub screenshots_path: PathBuf,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            retry_count: 2,
            parallel_workers: 1,
            test_data_path: PathBuf::from("src/data"),
            reports_path: PathBuf::from("reports"),
            logs_path: PathBuf::from("logs"),
            screenshots_path: PathBuf::from("reports/screenshots"),
        }
    }
}

/// Pages the login suite visits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUrls {
    pub login: String,
    pub logged_in: String,
    pub home: String,
}

/// A username/password pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Credentials the target site accepts and rejects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSet {
    pub valid: Credentials,
    pub invalid: Credentials,
}

impl Settings {
    /// Load settings from a TOML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let settings: Self = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Self::default())
        }
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_env()?;
        Ok(settings)
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, keyed by environment variable name
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let b = &mut self.browser;
        set_string(&lookup, "BROWSER_NAME", &mut b.browser_name);
        set_parsed(&lookup, "HEADLESS", &mut b.headless, parse_flag)?;
        set_parsed(&lookup, "SLOW_MO", &mut b.slow_mo, parse_number)?;
        set_parsed(&lookup, "TIMEOUT", &mut b.timeout, parse_number)?;
        set_parsed(&lookup, "VIEWPORT_WIDTH", &mut b.viewport_width, parse_number)?;
        set_parsed(&lookup, "VIEWPORT_HEIGHT", &mut b.viewport_height, parse_number)?;
        set_parsed(&lookup, "VIDEO", &mut b.video, parse_flag)?;
        set_string(&lookup, "SCREENSHOT", &mut b.screenshot);
        set_parsed(&lookup, "TRACE", &mut b.trace, parse_flag)?;

        let e = &mut self.environment;
        set_string(&lookup, "ENVIRONMENT", &mut e.environment);
        set_string(&lookup, "BASE_URL", &mut e.base_url);
        set_string(&lookup, "API_BASE_URL", &mut e.api_base_url);
        set_string(&lookup, "VALID_USERNAME", &mut e.valid_username);
        set_string(&lookup, "VALID_PASSWORD", &mut e.valid_password);
        set_string(&lookup, "INVALID_USERNAME", &mut e.invalid_username);
        set_string(&lookup, "INVALID_PASSWORD", &mut e.invalid_password);

        let t = &mut self.test;
        set_parsed(&lookup, "RETRY_COUNT", &mut t.retry_count, parse_number)?;
        set_parsed(&lookup, "PARALLEL_WORKERS", &mut t.parallel_workers, parse_number)?;
        set_path(&lookup, "TEST_DATA_PATH", &mut t.test_data_path);
        set_path(&lookup, "REPORTS_PATH", &mut t.reports_path);
        set_path(&lookup, "LOGS_PATH", &mut t.logs_path);
        set_path(&lookup, "SCREENSHOTS_PATH", &mut t.screenshots_path);
        Ok(())
    }

    /// Apply the named environment preset over these settings
    pub fn for_environment(mut self, name: &str) -> Result<Self> {
        let preset = EnvironmentConfig::named(name)?;
        self.environment.environment = preset.name.to_string();
        self.environment.base_url = preset.base_url.to_string();
        self.environment.api_base_url = preset.api_base_url.to_string();
        self.browser.timeout = preset.timeout_ms;
        self.browser.headless = preset.headless;
        self.browser.video = preset.video;
        self.browser.trace = preset.trace;
        self.test.retry_count = preset.retry_count;
        self.test.parallel_workers = preset.parallel_workers;
        Ok(self)
    }

    /// Get the login suite URLs under the base URL
    pub fn urls(&self) -> TestUrls {
        let base = self.environment.base_url.trim_end_matches('/');
        TestUrls {
            login: format!("{}/practice-test-login/", base),
            logged_in: format!("{}/logged-in-successfully/", base),
            home: base.to_string(),
        }
    }

    pub fn credentials(&self) -> CredentialSet {
        let e = &self.environment;
        CredentialSet {
            valid: Credentials::new(&e.valid_username, &e.valid_password),
            invalid: Credentials::new(&e.invalid_username, &e.invalid_password),
        }
    }

    /// Get the default wait and navigation timeout
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.browser.timeout)
    }
}

fn set_string<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, slot: &mut String) {
    if let Some(value) = lookup(key) {
        *slot = value;
    }
}

fn set_path<F: Fn(&str) -> Option<String>>(lookup: &F, key: &str, slot: &mut PathBuf) {
    if let Some(value) = lookup(key) {
        *slot = PathBuf::from(value);
    }
}

fn set_parsed<F, T>(lookup: &F, key: &str, slot: &mut T, parse: fn(&str, &str) -> Result<T>) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key) {
        *slot = parse(key, value.trim())?;
    }
    Ok(())
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(Error::InvalidConfig(format!("{} must be a boolean, got '{}'", key, other))),
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{} must be a non-negative integer, got '{}'", key, value)))
}

/// A named target environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub name: &'static str,
    pub base_url: &'static str,
    pub api_base_url: &'static str,
    pub timeout_ms: u64,
    pub retry_count: u32,
    pub parallel_workers: u32,
    pub headless: bool,
    pub video: bool,
    pub trace: bool,
}

const ENVIRONMENTS: [EnvironmentConfig; 4] = [
    EnvironmentConfig {
        name: "dev",
        base_url: "https://practicetestautomation.com",
        api_base_url: "",
        timeout_ms: 30_000,
        retry_count: 2,
        parallel_workers: 1,
        headless: true,
        video: false,
        trace: false,
    },
    EnvironmentConfig {
        name: "staging",
        base_url: "https://staging.practicetestautomation.com",
        api_base_url: "",
        timeout_ms: 45_000,
        retry_count: 3,
        parallel_workers: 2,
        headless: true,
        video: true,
        trace: true,
    },
    EnvironmentConfig {
        name: "prod",
        base_url: "https://practicetestautomation.com",
        api_base_url: "",
        timeout_ms: 60_000,
        retry_count: 3,
        parallel_workers: 1,
        headless: true,
        video: true,
        trace: true,
    },
    EnvironmentConfig {
        name: "local",
        base_url: "http://localhost:3000",
        api_base_url: "http://localhost:8000",
        timeout_ms: 15_000,
        retry_count: 1,
        parallel_workers: 1,
        headless: false,
        video: false,
        trace: false,
    },
];

impl EnvironmentConfig {
    /// Look up a preset by name
    pub fn named(name: &str) -> Result<Self> {
        ENVIRONMENTS
            .iter()
            .find(|env| env.name == name)
            .copied()
            .ok_or_else(|| Error::UnknownEnvironment {
                name: name.to_string(),
                available: Self::names().into_iter().map(str::to_string).collect(),
            })
    }

    pub fn all() -> &'static [EnvironmentConfig] {
        &ENVIRONMENTS
    }

    pub fn names() -> Vec<&'static str> {
        ENVIRONMENTS.iter().map(|env| env.name).collect()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
