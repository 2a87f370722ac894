//! Click interaction

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::abilities::BrowseTheWeb;
use crate::actor::Actor;
use crate::driver::{ClickOptions, WaitState};
use crate::error::{Error, Result};
use crate::performable::{Interaction, Performable};

/// Click an element once it is visible
#[derive(Debug, Clone)]
pub struct Click {
    locator: String,
    options: ClickOptions,
}

impl Click {
    pub fn on(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            options: ClickOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ClickOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }
}

#[async_trait]
impl Performable for Click {
    async fn perform_as(&self, actor: &Actor) -> Result<()> {
        let browsing = actor.ability_to::<BrowseTheWeb>()?;
        let page = browsing.page().await?;
        let budget = self.options.timeout.unwrap_or(browsing.timeout());

        page.wait_for_selector(&self.locator, WaitState::Visible, budget)
            .await
            .map_err(|e| Error::interaction("click", &self.locator, e))?;
        page.click(&self.locator, &self.options)
            .await
            .map_err(|e| Error::interaction("click", &self.locator, e))
    }
}

impl Interaction for Click {}

impl fmt::Display for Click {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Click on '{}'", self.locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::{MemoryBrowser, MemoryDocument, MemoryElement, MemorySite};
    use crate::driver::MouseButton;
    use crate::error::InteractionFailure;
    use crate::interactions::Navigate;
    use std::sync::Arc;

    const HOME: &str = "https://example.test/";

    fn driver() -> MemoryBrowser {
        MemoryBrowser::new(
            MemorySite::new().page(
                HOME,
                MemoryDocument::titled("Home")
                    .with("#go", MemoryElement::text("Go"))
                    .with("#later", MemoryElement::hidden()),
            ),
        )
    }

    async fn actor_at_home(driver: &MemoryBrowser) -> Actor {
        let actor = Actor::named("Carl").who_can(BrowseTheWeb::using(Arc::new(driver.clone())));
        actor.attempts_to(&[&Navigate::to(HOME)]).await.unwrap();
        actor
    }

    #[tokio::test]
    async fn test_waits_for_visibility_before_clicking() {
        let driver = driver();
        let carl = actor_at_home(&driver).await;

        carl.attempts_to(&[&Click::on("#go")]).await.unwrap();

        let journal = driver.journal();
        let wait = journal.iter().position(|e| e == "wait_for_selector #go visible").unwrap();
        let click = journal.iter().position(|e| e == "click #go").unwrap();
        assert!(wait < click);
        carl.dismiss().await.unwrap();
    }

    #[tokio::test]
    async fn test_click_options_reach_the_driver_unchanged() {
        let driver = driver();
        let carl = actor_at_home(&driver).await;
        let options = ClickOptions {
            button: MouseButton::Right,
            click_count: 2,
            delay: Some(Duration::from_millis(30)),
            force: false,
            timeout: Some(Duration::from_secs(2)),
        };

        carl.attempts_to(&[&Click::on("#go").with_options(options.clone())])
            .await
            .unwrap();

        assert_eq!(driver.click_options(), vec![("#go".to_string(), options)]);
        carl.dismiss().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_element_reports_not_found() {
        let driver = driver();
        let carl = actor_at_home(&driver).await;

        let err = carl.attempts_to(&[&Click::on("#nope")]).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Interaction {
                action: "click",
                reason: InteractionFailure::ElementNotFound,
                ..
            }
        ));
        assert!(driver.calls("click").is_empty());
        carl.dismiss().await.unwrap();
    }

    #[tokio::test]
    async fn test_hidden_element_reports_timeout() {
        let driver = driver();
        let carl = actor_at_home(&driver).await;

        let err = carl
            .attempts_to(&[&Click::on("#later").with_timeout(Duration::from_millis(250))])
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(matches!(
            err,
            Error::Interaction {
                reason: InteractionFailure::Timeout { waited },
                ..
            } if waited == Duration::from_millis(250)
        ));
        assert!(driver.calls("click").is_empty());
        carl.dismiss().await.unwrap();
    }
}
