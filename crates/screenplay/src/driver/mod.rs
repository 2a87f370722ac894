//! Browser driver capability contract
//!
//! The Screenplay core never talks to a browser directly. It consumes the
//! three handle traits below, at browser, context and page granularity.
//! Any automation backend that implements them is substitutable: the
//! Playwright bridge in `screenplay-e2e` for real browsers, or
//! [`memory::MemoryBrowser`] for offline tests.

pub mod memory;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by a driver implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// No element ever matched the locator within the budget
    #[error("no element matches '{locator}'")]
    ElementNotFound { locator: String },

    /// A wait or load did not complete within the budget
    #[error("timed out after {}ms waiting for {what}", .timeout.as_millis())]
    Timeout { what: String, timeout: Duration },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The handle was used after it was closed
    #[error("{0} has been closed")]
    Closed(String),

    #[error("element '{locator}' is detached: {reason}")]
    Detached { locator: String, reason: String },

    /// Transport or backend failure
    #[error("driver protocol error: {0}")]
    Protocol(String),
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Element state a selector wait resolves on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document load milestones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    #[default]
    #[serde(rename = "load")]
    Load,
    #[serde(rename = "domcontentloaded")]
    DomContentLoaded,
    #[serde(rename = "networkidle")]
    NetworkIdle,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::Load => "load",
            LoadState::DomContentLoaded => "domcontentloaded",
            LoadState::NetworkIdle => "networkidle",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options forwarded to `goto`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_until: Option<LoadState>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "millis")]
    pub timeout: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

/// Options forwarded to `click`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickOptions {
    pub button: MouseButton,
    pub click_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "millis")]
    pub delay: Option<Duration>,
    pub force: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "millis")]
    pub timeout: Option<Duration>,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            click_count: 1,
            delay: None,
            force: false,
            timeout: None,
        }
    }
}

/// Options forwarded to the simulated-keystroke `type` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeystrokeOptions {
    /// Pause between key presses
    #[serde(default, skip_serializing_if = "Option::is_none", with = "millis")]
    pub delay: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "millis")]
    pub timeout: Option<Duration>,
}

/// A running browser instance
#[async_trait]
pub trait Browser: Send + Sync {
    async fn new_context(&self) -> DriverResult<Arc<dyn BrowserContext>>;

    async fn close(&self) -> DriverResult<()>;
}

/// An isolated browsing session (cookies, storage) inside a browser
#[async_trait]
pub trait BrowserContext: Send + Sync {
    async fn new_page(&self) -> DriverResult<Arc<dyn Page>>;

    async fn close(&self) -> DriverResult<()>;

    /// Owning browser, if the context was created from one
    fn browser(&self) -> Option<Arc<dyn Browser>>;

    fn is_closed(&self) -> bool;
}

/// A single tab
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str, options: &NavigateOptions) -> DriverResult<()>;

    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> DriverResult<()>;

    async fn click(&self, locator: &str, options: &ClickOptions) -> DriverResult<()>;

    /// Sets the element value directly, no key events
    async fn fill(&self, locator: &str, text: &str) -> DriverResult<()>;

    /// Types `text` one key press at a time
    async fn type_text(&self, locator: &str, text: &str, options: &KeystrokeOptions) -> DriverResult<()>;

    async fn wait_for_selector(&self, locator: &str, state: WaitState, timeout: Duration) -> DriverResult<()>;

    async fn is_visible(&self, locator: &str) -> DriverResult<bool>;

    /// Whether any element matches `locator` right now
    async fn query_selector(&self, locator: &str) -> DriverResult<bool>;

    async fn text_content(&self, locator: &str) -> DriverResult<Option<String>>;

    async fn url(&self) -> DriverResult<String>;

    async fn title(&self) -> DriverResult<String>;

    async fn close(&self) -> DriverResult<()>;

    fn context(&self) -> Arc<dyn BrowserContext>;

    fn is_closed(&self) -> bool;
}

/// `Option<Duration>` as integer milliseconds, the unit browser drivers speak
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_u64(d.as_millis() as u64),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
