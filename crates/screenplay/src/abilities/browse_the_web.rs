//! BrowseTheWeb: the ability to drive a browser

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::debug;

use crate::ability::{Ability, ActorIdentity};
use crate::driver::{Browser, BrowserContext, Page};
use crate::error::{Error, Result};

/// Timeout used when neither the caller nor configuration gives one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Ability to browse the web through a browser driver
///
/// Holds the browser plus a lazily created context and page. Binding to an
/// actor produces a new value sharing the same handles; the caches of the
/// two values evolve independently afterwards.
///
/// Creation of the context and the page is serialized, so concurrent first
/// accesses share one handle instead of opening several.
pub struct BrowseTheWeb {
    browser: Arc<dyn Browser>,
    context: Mutex<Option<Arc<dyn BrowserContext>>>,
    page: Mutex<Option<Arc<dyn Page>>>,
    opening_context: AsyncMutex<()>,
    opening_page: AsyncMutex<()>,
    timeout: Duration,
    actor: Option<ActorIdentity>,
}

impl BrowseTheWeb {
    /// Browse with a fresh session on `browser`; context and page are created on first use
    pub fn using(browser: Arc<dyn Browser>) -> Self {
        Self {
            browser,
            context: Mutex::new(None),
            page: Mutex::new(None),
            opening_context: AsyncMutex::new(()),
            opening_page: AsyncMutex::new(()),
            timeout: DEFAULT_TIMEOUT,
            actor: None,
        }
    }

    /// Browse on an already open page, adopting its context and browser
    pub fn using_page(page: Arc<dyn Page>) -> Result<Self> {
        if page.is_closed() {
            return Err(Error::AbilityUnavailable("page has been closed".to_string()));
        }
        let context = page.context();
        if context.is_closed() {
            return Err(Error::AbilityUnavailable("page's context has been closed".to_string()));
        }
        let browser = context
            .browser()
            .ok_or_else(|| Error::AbilityUnavailable("page's context has no owning browser".to_string()))?;

        Ok(Self {
            browser,
            context: Mutex::new(Some(context)),
            page: Mutex::new(Some(page)),
            opening_context: AsyncMutex::new(()),
            opening_page: AsyncMutex::new(()),
            timeout: DEFAULT_TIMEOUT,
            actor: None,
        })
    }

    /// Budget for element waits and navigation when the caller gives none
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn browser(&self) -> Arc<dyn Browser> {
        self.browser.clone()
    }

    /// The working context, created and cached on first access
    pub async fn context(&self) -> Result<Arc<dyn BrowserContext>> {
        if let Some(context) = self.cached_context() {
            return Ok(context);
        }
        let _opening = self.opening_context.lock().await;
        if let Some(context) = self.cached_context() {
            return Ok(context);
        }
        let context = self.browser.new_context().await?;
        debug!("{} opened a browser context", self);
        *self.context.lock() = Some(context.clone());
        Ok(context)
    }

    /// The working page, created in the working context and cached on first access
    pub async fn page(&self) -> Result<Arc<dyn Page>> {
        if let Some(page) = self.cached_page() {
            return Ok(page);
        }
        let _opening = self.opening_page.lock().await;
        if let Some(page) = self.cached_page() {
            return Ok(page);
        }
        let context = self.context().await?;
        let page = context.new_page().await?;
        debug!("{} opened a page", self);
        *self.page.lock() = Some(page.clone());
        Ok(page)
    }

    fn cached_context(&self) -> Option<Arc<dyn BrowserContext>> {
        self.context.lock().clone()
    }

    fn cached_page(&self) -> Option<Arc<dyn Page>> {
        self.page.lock().clone()
    }

    /// An additional page in the working context; not cached
    pub async fn new_page(&self) -> Result<Arc<dyn Page>> {
        let context = self.context().await?;
        Ok(context.new_page().await?)
    }

    pub async fn close_page(&self) -> Result<()> {
        let page = self.page.lock().take();
        if let Some(page) = page {
            page.close().await?;
        }
        Ok(())
    }

    /// Closes the working context; its page goes with it
    pub async fn close_context(&self) -> Result<()> {
        let context = self.context.lock().take();
        if let Some(context) = context {
            self.page.lock().take();
            context.close().await?;
        }
        Ok(())
    }

    /// Closes the browser itself; cached handles are left for the caller to drop
    pub async fn close_browser(&self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

#[async_trait]
impl Ability for BrowseTheWeb {
    fn bound_to(&self, actor: &ActorIdentity) -> Self {
        Self {
            browser: self.browser.clone(),
            context: Mutex::new(self.context.lock().clone()),
            page: Mutex::new(self.page.lock().clone()),
            opening_context: AsyncMutex::new(()),
            opening_page: AsyncMutex::new(()),
            timeout: self.timeout,
            actor: Some(actor.clone()),
        }
    }

    fn actor(&self) -> Option<&ActorIdentity> {
        self.actor.as_ref()
    }

    /// Closes page and context; the browser belongs to whoever launched it
    async fn release(&self) -> Result<()> {
        let page = self.close_page().await;
        self.close_context().await?;
        page
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for BrowseTheWeb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actor = self.actor.as_ref().map(|a| a.name.as_str()).unwrap_or("Unknown");
        write!(f, "BrowseTheWeb(actor={})", actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::{MemoryBrowser, MemoryDocument, MemorySite};
    use crate::driver::NavigateOptions;

    fn browser() -> MemoryBrowser {
        MemoryBrowser::new(MemorySite::new().page("https://example.test/", MemoryDocument::titled("Example")))
    }

    #[tokio::test]
    async fn test_context_and_page_are_lazy_and_cached() {
        let driver = browser();
        let ability = BrowseTheWeb::using(Arc::new(driver.clone()));
        assert!(driver.journal().is_empty());

        let first = ability.page().await.unwrap();
        let second = ability.page().await.unwrap();
        ability.context().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(driver.calls("new_context").len(), 1);
        assert_eq!(driver.calls("new_page").len(), 1);
    }

    /// Yields inside `new_context` so concurrent callers interleave
    struct YieldingBrowser(MemoryBrowser);

    #[async_trait]
    impl Browser for YieldingBrowser {
        async fn new_context(&self) -> crate::driver::DriverResult<Arc<dyn BrowserContext>> {
            tokio::task::yield_now().await;
            self.0.new_context().await
        }

        async fn close(&self) -> crate::driver::DriverResult<()> {
            self.0.close().await
        }
    }

    #[tokio::test]
    async fn test_concurrent_first_access_opens_one_session() {
        let driver = browser();
        let ability = BrowseTheWeb::using(Arc::new(YieldingBrowser(driver.clone())));

        let (first, second) = tokio::join!(ability.page(), ability.page());
        let (first, second) = (first.unwrap(), second.unwrap());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(driver.calls("new_context").len(), 1);
        assert_eq!(driver.calls("new_page").len(), 1);

        ability.release().await.unwrap();
        assert!(first.is_closed());
        assert_eq!(driver.calls("close").len(), 2);
    }

    #[tokio::test]
    async fn test_close_context_invalidates_page() {
        let driver = browser();
        let ability = BrowseTheWeb::using(Arc::new(driver.clone()));
        let before = ability.page().await.unwrap();

        ability.close_context().await.unwrap();
        let after = ability.page().await.unwrap();

        assert!(before.is_closed() || before.url().await.is_err());
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(driver.calls("new_context").len(), 2);
        assert_eq!(driver.calls("new_page").len(), 2);
        after.goto("https://example.test/", &NavigateOptions::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_page_keeps_context() {
        let driver = browser();
        let ability = BrowseTheWeb::using(Arc::new(driver.clone()));
        ability.page().await.unwrap();

        ability.close_page().await.unwrap();
        ability.page().await.unwrap();

        assert_eq!(driver.calls("new_context").len(), 1);
        assert_eq!(driver.calls("new_page").len(), 2);
    }

    #[tokio::test]
    async fn test_close_browser_delegates_without_clearing() {
        let driver = browser();
        let ability = BrowseTheWeb::using(Arc::new(driver.clone()));
        let page = ability.page().await.unwrap();

        ability.close_browser().await.unwrap();

        assert!(driver.is_closed());
        assert!(Arc::ptr_eq(&page, &ability.page().await.unwrap()));
    }

    #[tokio::test]
    async fn test_using_page_adopts_live_handles() {
        let driver = browser();
        let context = driver.new_context().await.unwrap();
        let page = context.new_page().await.unwrap();

        let ability = BrowseTheWeb::using_page(page.clone()).unwrap();
        assert!(Arc::ptr_eq(&page, &ability.page().await.unwrap()));
        assert_eq!(driver.calls("new_context").len(), 1);

        context.close().await.unwrap();
        assert!(matches!(
            BrowseTheWeb::using_page(page),
            Err(Error::AbilityUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_bound_copy_leaves_original_untouched() {
        let driver = browser();
        let original = BrowseTheWeb::using(Arc::new(driver.clone())).with_timeout(Duration::from_secs(5));
        let alice = ActorIdentity::new("Alice");

        let bound = original.bound_to(&alice);
        bound.page().await.unwrap();

        assert_eq!(bound.actor(), Some(&alice));
        assert_eq!(bound.timeout(), Duration::from_secs(5));
        assert!(original.actor().is_none());
        assert!(original.page.lock().is_none());
        assert_eq!(bound.to_string(), "BrowseTheWeb(actor=Alice)");
    }

    #[tokio::test]
    async fn test_release_closes_page_and_context() {
        let driver = browser();
        let ability = BrowseTheWeb::using(Arc::new(driver.clone()));
        ability.page().await.unwrap();

        ability.release().await.unwrap();

        assert_eq!(driver.calls("close").len(), 2);
        assert!(!driver.is_closed());
    }
}
