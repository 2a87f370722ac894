//! Navigate interaction

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::abilities::BrowseTheWeb;
use crate::actor::Actor;
use crate::driver::{LoadState, NavigateOptions};
use crate::error::{Error, Result};
use crate::performable::{Interaction, Performable};

/// Go to a URL and wait for the page to settle
#[derive(Debug, Clone)]
pub struct Navigate {
    url: String,
    options: NavigateOptions,
    settle: LoadState,
}

impl Navigate {
    /// Navigate to `url`, then wait for the network to go idle
    pub fn to(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            options: NavigateOptions::default(),
            settle: LoadState::NetworkIdle,
        }
    }

    pub fn with_options(mut self, options: NavigateOptions) -> Self {
        self.options = options;
        self
    }

    /// Load state to wait for after `goto` returns
    pub fn waiting_for(mut self, state: LoadState) -> Self {
        self.settle = state;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Performable for Navigate {
    async fn perform_as(&self, actor: &Actor) -> Result<()> {
        let browsing = actor.ability_to::<BrowseTheWeb>()?;
        let page = browsing.page().await?;
        let budget = self.options.timeout.unwrap_or(browsing.timeout());

        let options = NavigateOptions {
            timeout: Some(budget),
            ..self.options.clone()
        };
        let failed = |source| Error::Navigation {
            url: self.url.clone(),
            source,
        };

        page.goto(&self.url, &options).await.map_err(failed)?;
        page.wait_for_load_state(self.settle, budget).await.map_err(failed)?;
        debug!("Reached {} ({})", self.url, self.settle);
        Ok(())
    }
}

impl Interaction for Navigate {}

impl fmt::Display for Navigate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Navigate to '{}'", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::{MemoryBrowser, MemoryDocument, MemorySite};
    use crate::driver::DriverError;
    use std::sync::Arc;
    use std::time::Duration;

    fn actor(driver: &MemoryBrowser) -> Actor {
        Actor::named("Nina").who_can(BrowseTheWeb::using(Arc::new(driver.clone())))
    }

    #[tokio::test]
    async fn test_navigate_waits_for_network_idle() {
        let driver = MemoryBrowser::new(MemorySite::new().page("https://example.test/", MemoryDocument::titled("Home")));
        let nina = actor(&driver);

        nina.attempts_to(&[&Navigate::to("https://example.test/")]).await.unwrap();

        let journal = driver.journal();
        let tail: Vec<&str> = journal.iter().rev().take(2).rev().map(String::as_str).collect();
        assert_eq!(tail, vec!["goto https://example.test/", "wait_for_load_state networkidle"]);
        nina.dismiss().await.unwrap();
    }

    #[tokio::test]
    async fn test_explicit_load_state() {
        let driver = MemoryBrowser::new(MemorySite::new().page("https://example.test/", MemoryDocument::titled("Home")));
        let nina = actor(&driver);

        nina.attempts_to(&[&Navigate::to("https://example.test/").waiting_for(LoadState::DomContentLoaded)])
            .await
            .unwrap();

        assert_eq!(
            driver.calls("wait_for_load_state"),
            vec!["wait_for_load_state domcontentloaded".to_string()]
        );
        nina.dismiss().await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_url_is_navigation_error() {
        let driver = MemoryBrowser::new(MemorySite::new());
        let nina = actor(&driver);

        let err = nina
            .attempts_to(&[&Navigate::to("https://nowhere.test/")])
            .await
            .unwrap_err();

        match err {
            Error::Navigation { url, .. } => assert_eq!(url, "https://nowhere.test/"),
            other => panic!("expected navigation error, got {other}"),
        }
        assert!(driver.calls("wait_for_load_state").is_empty());
        nina.dismiss().await.unwrap();
    }

    #[tokio::test]
    async fn test_settle_timeout_is_navigation_timeout() {
        let driver = MemoryBrowser::new(
            MemorySite::new()
                .page("https://example.test/slow/", MemoryDocument::titled("Slow"))
                .stall("https://example.test/slow/"),
        );
        let nina = actor(&driver);

        let err = nina
            .attempts_to(&[&Navigate::to("https://example.test/slow/").with_options(NavigateOptions {
                timeout: Some(Duration::from_millis(500)),
                ..NavigateOptions::default()
            })])
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        match err {
            Error::Navigation {
                url,
                source: DriverError::Timeout { timeout, .. },
            } => {
                assert_eq!(url, "https://example.test/slow/");
                assert_eq!(timeout, Duration::from_millis(500));
            }
            other => panic!("expected settle timeout, got {other}"),
        }
        assert_eq!(driver.calls("goto").len(), 1);
        nina.dismiss().await.unwrap();
    }

    #[test]
    fn test_display() {
        assert_eq!(Navigate::to("https://example.test/").to_string(), "Navigate to 'https://example.test/'");
    }
}
