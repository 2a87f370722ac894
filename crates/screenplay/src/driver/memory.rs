//! In-memory browser driver
//!
//! A scripted stand-in for a real browser. A [`MemorySite`] maps URLs to
//! [`MemoryDocument`]s; clicks can run handlers that edit the document or
//! navigate elsewhere. Every driver call is appended to a journal so tests
//! can assert on ordering, and individual locators can be made to fail.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{
    Browser, BrowserContext, ClickOptions, DriverError, DriverResult, KeystrokeOptions, LoadState,
    NavigateOptions, Page, WaitState,
};

const BLANK: &str = "about:blank";

/// A single element on a simulated page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryElement {
    pub text: Option<String>,
    pub value: String,
    pub visible: bool,
}

impl MemoryElement {
    /// Visible element with text content
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            value: String::new(),
            visible: true,
        }
    }

    /// Visible, empty form field
    pub fn input() -> Self {
        Self {
            text: None,
            value: String::new(),
            visible: true,
        }
    }

    /// Element in the DOM but not rendered
    pub fn hidden() -> Self {
        Self::default()
    }
}

/// A simulated document
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pub title: String,
    elements: BTreeMap<String, MemoryElement>,
}

impl MemoryDocument {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            elements: BTreeMap::new(),
        }
    }

    pub fn with(mut self, locator: impl Into<String>, element: MemoryElement) -> Self {
        self.elements.insert(locator.into(), element);
        self
    }

    pub fn element(&self, locator: &str) -> Option<&MemoryElement> {
        self.elements.get(locator)
    }

    pub fn element_mut(&mut self, locator: &str) -> Option<&mut MemoryElement> {
        self.elements.get_mut(locator)
    }

    /// Current value of a form field, empty when the field does not exist
    pub fn value_of(&self, locator: &str) -> &str {
        self.elements.get(locator).map(|e| e.value.as_str()).unwrap_or("")
    }

    pub fn insert(&mut self, locator: impl Into<String>, element: MemoryElement) {
        self.elements.insert(locator.into(), element);
    }
}

/// Runs on click; may edit the document in place and returns a URL to navigate to
pub type ClickHandler = Arc<dyn Fn(&mut MemoryDocument) -> Option<String> + Send + Sync>;

/// The set of pages a [`MemoryBrowser`] can visit
#[derive(Clone, Default)]
pub struct MemorySite {
    documents: HashMap<String, MemoryDocument>,
    handlers: HashMap<(String, String), ClickHandler>,
    faults: HashMap<String, DriverError>,
    stalled: HashSet<String>,
}

impl MemorySite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, document: MemoryDocument) -> Self {
        self.documents.insert(url.into(), document);
        self
    }

    pub fn on_click<F>(mut self, url: impl Into<String>, locator: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut MemoryDocument) -> Option<String> + Send + Sync + 'static,
    {
        self.handlers.insert((url.into(), locator.into()), Arc::new(handler));
        self
    }

    /// Every driver call touching `locator` fails with `error`
    pub fn fault(mut self, locator: impl Into<String>, error: DriverError) -> Self {
        self.faults.insert(locator.into(), error);
        self
    }

    /// Pages at `url` load but never settle; load-state waits time out
    pub fn stall(mut self, url: impl Into<String>) -> Self {
        self.stalled.insert(url.into());
        self
    }
}

struct BrowserState {
    site: MemorySite,
    journal: Mutex<Vec<String>>,
    clicks: Mutex<Vec<(String, ClickOptions)>>,
    keystrokes: Mutex<Vec<(String, KeystrokeOptions)>>,
    next_id: AtomicUsize,
    closed: AtomicBool,
}

/// Browser handle over a [`MemorySite`]; clones share the same journal
#[derive(Clone)]
pub struct MemoryBrowser {
    state: Arc<BrowserState>,
}

impl MemoryBrowser {
    pub fn new(site: MemorySite) -> Self {
        Self {
            state: Arc::new(BrowserState {
                site,
                journal: Mutex::new(Vec::new()),
                clicks: Mutex::new(Vec::new()),
                keystrokes: Mutex::new(Vec::new()),
                next_id: AtomicUsize::new(1),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Driver calls in the order they were made
    pub fn journal(&self) -> Vec<String> {
        self.state.journal.lock().clone()
    }

    /// Journal entries starting with `op`
    pub fn calls(&self, op: &str) -> Vec<String> {
        self.state
            .journal
            .lock()
            .iter()
            .filter(|entry| entry.split(' ').next() == Some(op))
            .cloned()
            .collect()
    }

    /// Options each `click` received, keyed by locator
    pub fn click_options(&self) -> Vec<(String, ClickOptions)> {
        self.state.clicks.lock().clone()
    }

    /// Options each `type_text` received, keyed by locator
    pub fn keystroke_options(&self) -> Vec<(String, KeystrokeOptions)> {
        self.state.keystrokes.lock().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }

    fn record(&self, entry: String) {
        self.state.journal.lock().push(entry);
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.state.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.is_closed() {
            return Err(DriverError::Closed("browser".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Browser for MemoryBrowser {
    async fn new_context(&self) -> DriverResult<Arc<dyn BrowserContext>> {
        self.ensure_open()?;
        let id = self.next_id("context");
        self.record(format!("new_context {}", id));
        Ok(Arc::new(MemoryContext {
            state: Arc::new(ContextState {
                id,
                browser: self.clone(),
                closed: AtomicBool::new(false),
            }),
        }))
    }

    async fn close(&self) -> DriverResult<()> {
        self.record("close browser".to_string());
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct ContextState {
    id: String,
    browser: MemoryBrowser,
    closed: AtomicBool,
}

/// Context handle; pages keep a clone so they observe its closing
#[derive(Clone)]
pub struct MemoryContext {
    state: Arc<ContextState>,
}

impl MemoryContext {
    fn browser_handle(&self) -> &MemoryBrowser {
        &self.state.browser
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
impl BrowserContext for MemoryContext {
    async fn new_page(&self) -> DriverResult<Arc<dyn Page>> {
        self.ensure_open()?;
        let id = self.state.browser.next_id("page");
        self.state.browser.record(format!("new_page {}", id));
        Ok(Arc::new(MemoryPage {
            id,
            context: self.clone(),
            state: Mutex::new(PageState {
                url: BLANK.to_string(),
                document: None,
            }),
            closed: AtomicBool::new(false),
        }))
    }

    async fn close(&self) -> DriverResult<()> {
        self.state.browser.record(format!("close {}", self.state.id));
        self.state.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn browser(&self) -> Option<Arc<dyn Browser>> {
        Some(Arc::new(self.state.browser.clone()))
    }

    fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}

struct PageState {
    url: String,
    document: Option<MemoryDocument>,
}

pub struct MemoryPage {
    id: String,
    context: MemoryContext,
    state: Mutex<PageState>,
    closed: AtomicBool,
}

impl MemoryPage {
    fn site(&self) -> &MemorySite {
        &self.context.browser_handle().state.site
    }

    fn record(&self, entry: String) {
        self.context.browser_handle().record(entry);
    }

    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed.load(Ordering::SeqCst) || self.context.ensure_open().is_err() {
            return Err(DriverError::Closed(self.id.clone()));
        }
        Ok(())
    }

    fn check_fault(&self, locator: &str) -> DriverResult<()> {
        match self.site().faults.get(locator) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn load(&self, state: &mut PageState, url: &str) -> DriverResult<()> {
        let document = self.site().documents.get(url).cloned().ok_or_else(|| DriverError::Navigation {
            url: url.to_string(),
            reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
        })?;
        state.url = url.to_string();
        state.document = Some(document);
        Ok(())
    }

    /// Runs `f` against the element, failing when nothing matches
    fn with_element<T>(
        &self,
        locator: &str,
        f: impl FnOnce(&mut MemoryElement) -> DriverResult<T>,
    ) -> DriverResult<T> {
        let mut state = self.state.lock();
        let element = state
            .document
            .as_mut()
            .and_then(|doc| doc.element_mut(locator))
            .ok_or_else(|| DriverError::ElementNotFound {
                locator: locator.to_string(),
            })?;
        f(element)
    }

    fn peek(&self, locator: &str) -> Option<MemoryElement> {
        self.state
            .lock()
            .document
            .as_ref()
            .and_then(|doc| doc.element(locator))
            .cloned()
    }
}

#[async_trait]
impl Page for MemoryPage {
    async fn goto(&self, url: &str, _options: &NavigateOptions) -> DriverResult<()> {
        self.ensure_open()?;
        self.record(format!("goto {}", url));
        let mut state = self.state.lock();
        self.load(&mut state, url)
    }

    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> DriverResult<()> {
        self.ensure_open()?;
        self.record(format!("wait_for_load_state {}", state));
        let url = self.state.lock().url.clone();
        if self.site().stalled.contains(&url) {
            return Err(DriverError::Timeout {
                what: format!("load state {}", state),
                timeout,
            });
        }
        Ok(())
    }

    async fn click(&self, locator: &str, options: &ClickOptions) -> DriverResult<()> {
        self.ensure_open()?;
        self.record(format!("click {}", locator));
        self.context
            .browser_handle()
            .state
            .clicks
            .lock()
            .push((locator.to_string(), options.clone()));
        self.check_fault(locator)?;
        self.with_element(locator, |element| {
            if element.visible || options.force {
                Ok(())
            } else {
                Err(DriverError::Timeout {
                    what: format!("'{}' to be clickable", locator),
                    timeout: options.timeout.unwrap_or_default(),
                })
            }
        })?;

        let mut state = self.state.lock();
        let handler = self.site().handlers.get(&(state.url.clone(), locator.to_string())).cloned();
        let Some(handler) = handler else {
            return Ok(());
        };
        let target = match state.document.as_mut() {
            Some(document) => handler(document),
            None => None,
        };
        match target {
            Some(url) => self.load(&mut state, &url),
            None => Ok(()),
        }
    }

    async fn fill(&self, locator: &str, text: &str) -> DriverResult<()> {
        self.ensure_open()?;
        self.record(format!("fill {} {:?}", locator, text));
        self.check_fault(locator)?;
        self.with_element(locator, |element| {
            element.value = text.to_string();
            Ok(())
        })
    }

    async fn type_text(&self, locator: &str, text: &str, options: &KeystrokeOptions) -> DriverResult<()> {
        self.ensure_open()?;
        self.record(format!("type {} {:?}", locator, text));
        self.context
            .browser_handle()
            .state
            .keystrokes
            .lock()
            .push((locator.to_string(), options.clone()));
        self.check_fault(locator)?;
        self.with_element(locator, |element| {
            element.value.push_str(text);
            Ok(())
        })
    }

    async fn wait_for_selector(&self, locator: &str, state: WaitState, timeout: Duration) -> DriverResult<()> {
        self.ensure_open()?;
        self.record(format!("wait_for_selector {} {}", locator, state));
        self.check_fault(locator)?;

        let element = self.peek(locator);
        let timed_out = || DriverError::Timeout {
            what: format!("'{}' to be {}", locator, state),
            timeout,
        };
        match (state, element) {
            (WaitState::Visible, None) | (WaitState::Attached, None) => Err(DriverError::ElementNotFound {
                locator: locator.to_string(),
            }),
            (WaitState::Visible, Some(e)) if !e.visible => Err(timed_out()),
            (WaitState::Hidden, Some(e)) if e.visible => Err(timed_out()),
            (WaitState::Detached, Some(_)) => Err(timed_out()),
            _ => Ok(()),
        }
    }

    async fn is_visible(&self, locator: &str) -> DriverResult<bool> {
        self.ensure_open()?;
        self.record(format!("is_visible {}", locator));
        self.check_fault(locator)?;
        Ok(self.peek(locator).map(|e| e.visible).unwrap_or(false))
    }

    async fn query_selector(&self, locator: &str) -> DriverResult<bool> {
        self.ensure_open()?;
        self.record(format!("query_selector {}", locator));
        self.check_fault(locator)?;
        Ok(self.peek(locator).is_some())
    }

    async fn text_content(&self, locator: &str) -> DriverResult<Option<String>> {
        self.ensure_open()?;
        self.record(format!("text_content {}", locator));
        self.check_fault(locator)?;
        self.with_element(locator, |element| Ok(element.text.clone()))
    }

    async fn url(&self) -> DriverResult<String> {
        self.ensure_open()?;
        self.record("url".to_string());
        Ok(self.state.lock().url.clone())
    }

    async fn title(&self) -> DriverResult<String> {
        self.ensure_open()?;
        self.record("title".to_string());
        Ok(self
            .state
            .lock()
            .document
            .as_ref()
            .map(|doc| doc.title.clone())
            .unwrap_or_default())
    }

    async fn close(&self) -> DriverResult<()> {
        self.record(format!("close {}", self.id));
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn context(&self) -> Arc<dyn BrowserContext> {
        Arc::new(self.context.clone())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
