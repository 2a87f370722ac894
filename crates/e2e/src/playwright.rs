//! Playwright-backed implementation of the Screenplay driver contract
//!
//! Every handle is a string id owned by the bridge process. Local closed
//! flags let callers check liveness without a round trip.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use screenplay::driver::{
    Browser, BrowserContext, ClickOptions, DriverError, DriverResult, KeystrokeOptions, LoadState,
    NavigateOptions, Page, WaitState,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::bridge::Bridge;
use crate::error::{E2eError, RemoteErrorKind};

/// How long Rust waits on the bridge, relative to the browser-side budget
#[derive(Debug, Clone, Copy)]
pub struct Deadlines {
    /// Budget for calls that carry no timeout of their own
    pub request: Duration,
    /// Added on top of a browser-side timeout before giving up on the bridge
    pub grace: Duration,
    /// Budget for shutting the bridge process down
    pub shutdown: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(30),
            grace: Duration::from_secs(5),
            shutdown: Duration::from_secs(10),
        }
    }
}

impl Deadlines {
    fn around(&self, timeout: Duration) -> Duration {
        timeout + self.grace
    }
}

/// How every new context is set up
#[derive(Debug, Clone)]
pub struct ContextSetup {
    /// `newContext` options, forwarded as is
    pub options: Value,
    /// Where traces are written; tracing is off when unset
    pub trace_dir: Option<PathBuf>,
}

impl ContextSetup {
    /// One trace archive per context, written when the context closes
    pub fn trace_path(&self, context_id: &str) -> Option<PathBuf> {
        self.trace_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.zip", context_id)))
    }
}

struct Session {
    bridge: Bridge,
    browser_id: String,
    setup: ContextSetup,
    deadlines: Deadlines,
    closed: AtomicBool,
}

impl Session {
    async fn call<T: DeserializeOwned>(&self, target: &str, op: &str, params: Value, deadline: Duration) -> Result<T, E2eError> {
        let value = self.bridge.request(Some(target), op, params, deadline).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// A browser launched through the bridge; clones share the same process
#[derive(Clone)]
pub struct PlaywrightBrowser {
    session: Arc<Session>,
}

impl PlaywrightBrowser {
    pub(crate) fn new(bridge: Bridge, browser_id: String, setup: ContextSetup, deadlines: Deadlines) -> Self {
        Self {
            session: Arc::new(Session {
                bridge,
                browser_id,
                setup,
                deadlines,
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.session.browser_id
    }

    pub fn is_closed(&self) -> bool {
        self.session.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.is_closed() {
            return Err(DriverError::Closed(self.session.browser_id.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl Browser for PlaywrightBrowser {
    async fn new_context(&self) -> DriverResult<Arc<dyn BrowserContext>> {
        self.ensure_open()?;
        let s = &self.session;
        let id: String = s
            .call(&s.browser_id, "newContext", s.setup.options.clone(), s.deadlines.request)
            .await?;
        debug!("Opened {} in {}", id, s.browser_id);

        let trace_path = s.setup.trace_path(&id);
        if trace_path.is_some() {
            let tracing = json!({ "screenshots": true, "snapshots": true, "sources": true });
            if let Err(e) = s.call::<Value>(&id, "startTracing", tracing, s.deadlines.request).await {
                s.call::<Value>(&id, "close", json!({}), s.deadlines.request).await.ok();
                return Err(e.into());
            }
        }
        Ok(Arc::new(PlaywrightContext {
            state: Arc::new(ContextState {
                id,
                browser: self.clone(),
                trace_path,
                closed: AtomicBool::new(false),
            }),
        }))
    }

    /// Closes the browser and stops the bridge process
    async fn close(&self) -> DriverResult<()> {
        if self.session.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let s = &self.session;
        let closed: DriverResult<()> = s
            .call(&s.browser_id, "close", json!({}), s.deadlines.request)
            .await
            .map_err(DriverError::from);
        s.bridge.shutdown(s.deadlines.shutdown).await.map_err(DriverError::from)?;
        debug!("Closed {}", s.browser_id);
        closed
    }
}

struct ContextState {
    id: String,
    browser: PlaywrightBrowser,
    trace_path: Option<PathBuf>,
    closed: AtomicBool,
}

/// A browser context living in the bridge
#[derive(Clone)]
pub struct PlaywrightContext {
    state: Arc<ContextState>,
}

impl PlaywrightContext {
    fn session(&self) -> &Session {
        &self.state.browser.session
    }

    fn ensure_open(&self) -> DriverResult<()> {
        self.state.browser.ensure_open()?;
        if self.is_closed() {
            return Err(DriverError::Closed(self.state.id.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl BrowserContext for PlaywrightContext {
    async fn new_page(&self) -> DriverResult<Arc<dyn Page>> {
        self.ensure_open()?;
        let s = self.session();
        let id: String = s.call(&self.state.id, "newPage", json!({}), s.deadlines.request).await?;
        debug!("Opened {} in {}", id, self.state.id);
        Ok(Arc::new(PlaywrightPage {
            id,
            context: self.clone(),
            closed: AtomicBool::new(false),
        }))
    }

    async fn close(&self) -> DriverResult<()> {
        if self.state.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let s = self.session();
        let traced = match &self.state.trace_path {
            Some(path) => {
                let params = json!({ "path": path.to_string_lossy() });
                let stopped = s.call::<Value>(&self.state.id, "stopTracing", params, s.deadlines.request).await;
                if stopped.is_ok() {
                    debug!("Saved trace of {} to {}", self.state.id, path.display());
                }
                stopped.map(|_| ())
            }
            None => Ok(()),
        };
        s.call::<Value>(&self.state.id, "close", json!({}), s.deadlines.request).await?;
        Ok(traced?)
    }

    fn browser(&self) -> Option<Arc<dyn Browser>> {
        Some(Arc::new(self.state.browser.clone()))
    }

    fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst) || self.state.browser.is_closed()
    }
}

/// A page living in the bridge
pub struct PlaywrightPage {
    id: String,
    context: PlaywrightContext,
    closed: AtomicBool,
}

impl PlaywrightPage {
    fn ensure_open(&self) -> DriverResult<()> {
        if self.is_closed() {
            return Err(DriverError::Closed(self.id.clone()));
        }
        Ok(())
    }

    async fn call<T: DeserializeOwned>(&self, op: &str, params: Value, deadline: Duration) -> Result<T, E2eError> {
        self.context.session().call(&self.id, op, params, deadline).await
    }

    fn deadlines(&self) -> Deadlines {
        self.context.session().deadlines
    }

    /// Runs an element operation, attributing failures to `locator`
    async fn on_element<T: DeserializeOwned>(
        &self,
        op: &str,
        locator: &str,
        params: Value,
        timeout: Duration,
        waiting_for: &str,
    ) -> DriverResult<T> {
        self.ensure_open()?;
        let deadline = self.deadlines().around(timeout);
        self.call(op, params, deadline)
            .await
            .map_err(|e| element_error(e, locator, waiting_for, timeout))
    }
}

/// Translate a bridge failure on an element operation into the driver's vocabulary
fn element_error(error: E2eError, locator: &str, waiting_for: &str, timeout: Duration) -> DriverError {
    match error {
        E2eError::Remote {
            kind: RemoteErrorKind::NotFound,
            ..
        } => DriverError::ElementNotFound {
            locator: locator.to_string(),
        },
        E2eError::Remote {
            kind: RemoteErrorKind::Timeout,
            ..
        } => DriverError::Timeout {
            what: format!("'{}' to {}", locator, waiting_for),
            timeout,
        },
        E2eError::Remote {
            kind: RemoteErrorKind::Detached,
            message,
        } => DriverError::Detached {
            locator: locator.to_string(),
            reason: message,
        },
        other => other.into(),
    }
}

fn navigation_error(error: E2eError, url: &str, timeout: Duration) -> DriverError {
    match error {
        E2eError::Remote {
            kind: RemoteErrorKind::Timeout,
            ..
        } => DriverError::Timeout {
            what: format!("{} to load", url),
            timeout,
        },
        E2eError::Remote {
            kind: RemoteErrorKind::Navigation,
            message,
        } => DriverError::Navigation {
            url: url.to_string(),
            reason: message,
        },
        other => other.into(),
    }
}

#[async_trait]
impl Page for PlaywrightPage {
    async fn goto(&self, url: &str, options: &NavigateOptions) -> DriverResult<()> {
        self.ensure_open()?;
        let timeout = options.timeout.unwrap_or(self.deadlines().request);
        let params = json!({ "url": url, "options": options });
        self.call::<Value>("goto", params, self.deadlines().around(timeout))
            .await
            .map_err(|e| navigation_error(e, url, timeout))?;
        Ok(())
    }

    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> DriverResult<()> {
        self.ensure_open()?;
        let params = json!({ "state": state, "timeout": timeout.as_millis() as u64 });
        self.call::<Value>("waitForLoadState", params, self.deadlines().around(timeout))
            .await
            .map_err(|e| match e {
                E2eError::Remote {
                    kind: RemoteErrorKind::Timeout,
                    ..
                } => DriverError::Timeout {
                    what: format!("load state {}", state),
                    timeout,
                },
                other => other.into(),
            })?;
        Ok(())
    }

    async fn click(&self, locator: &str, options: &ClickOptions) -> DriverResult<()> {
        let timeout = options.timeout.unwrap_or(self.deadlines().request);
        let params = json!({ "locator": locator, "options": options });
        self.on_element::<Value>("click", locator, params, timeout, "be clickable")
            .await?;
        Ok(())
    }

    async fn fill(&self, locator: &str, text: &str) -> DriverResult<()> {
        let timeout = self.deadlines().request;
        let params = json!({ "locator": locator, "text": text, "timeout": timeout.as_millis() as u64 });
        self.on_element::<Value>("fill", locator, params, timeout, "be editable")
            .await?;
        Ok(())
    }

    async fn type_text(&self, locator: &str, text: &str, options: &KeystrokeOptions) -> DriverResult<()> {
        let timeout = options.timeout.unwrap_or(self.deadlines().request);
        // the deadline also covers the delay between key presses
        let typing = options.delay.unwrap_or_default() * text.chars().count() as u32;
        let params = json!({ "locator": locator, "text": text, "options": options });
        self.on_element::<Value>("type", locator, params, timeout + typing, "accept input")
            .await?;
        Ok(())
    }

    async fn wait_for_selector(&self, locator: &str, state: WaitState, timeout: Duration) -> DriverResult<()> {
        let params = json!({ "locator": locator, "state": state.as_str(), "timeout": timeout.as_millis() as u64 });
        let waiting_for = format!("be {}", state);
        self.on_element::<Value>("waitForSelector", locator, params, timeout, &waiting_for)
            .await?;
        Ok(())
    }

    async fn is_visible(&self, locator: &str) -> DriverResult<bool> {
        let timeout = self.deadlines().request;
        self.on_element("isVisible", locator, json!({ "locator": locator }), timeout, "be visible")
            .await
    }

    async fn query_selector(&self, locator: &str) -> DriverResult<bool> {
        let timeout = self.deadlines().request;
        self.on_element("querySelector", locator, json!({ "locator": locator }), timeout, "exist")
            .await
    }

    async fn text_content(&self, locator: &str) -> DriverResult<Option<String>> {
        let timeout = self.deadlines().request;
        let params = json!({ "locator": locator, "timeout": timeout.as_millis() as u64 });
        self.on_element("textContent", locator, params, timeout, "have text")
            .await
    }

    async fn url(&self) -> DriverResult<String> {
        self.ensure_open()?;
        Ok(self.call("url", json!({}), self.deadlines().request).await?)
    }

    async fn title(&self) -> DriverResult<String> {
        self.ensure_open()?;
        Ok(self.call("title", json!({}), self.deadlines().request).await?)
    }

    async fn close(&self) -> DriverResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.call::<Value>("close", json!({}), self.deadlines().request).await?;
        Ok(())
    }

    fn context(&self) -> Arc<dyn BrowserContext> {
        Arc::new(self.context.clone())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.context.is_closed()
    }
}
