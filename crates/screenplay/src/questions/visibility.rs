//! Existence and visibility probes
//!
//! These never fail on driver errors: "could not prove it is there" and
//! "it is not there" are the same answer.

use std::fmt;

use async_trait::async_trait;
use tracing::warn;

use crate::abilities::BrowseTheWeb;
use crate::actor::Actor;
use crate::error::Result;
use crate::performable::Question;

/// Whether an element is currently visible
#[derive(Debug, Clone)]
pub struct Visibility {
    locator: String,
}

impl Visibility {
    pub fn of(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
        }
    }
}

#[async_trait]
impl Question for Visibility {
    type Answer = bool;

    async fn answered_by(&self, actor: &Actor) -> Result<bool> {
        let page = actor.ability_to::<BrowseTheWeb>()?.page().await?;
        match page.is_visible(&self.locator).await {
            Ok(visible) => Ok(visible),
            Err(e) => {
                warn!("Treating '{}' as not visible: {}", self.locator, e);
                Ok(false)
            }
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Visibility of '{}'", self.locator)
    }
}

/// Whether an element is present in the DOM, visible or not
#[derive(Debug, Clone)]
pub struct Presence {
    locator: String,
}

impl Presence {
    pub fn of(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
        }
    }
}

#[async_trait]
impl Question for Presence {
    type Answer = bool;

    async fn answered_by(&self, actor: &Actor) -> Result<bool> {
        let page = actor.ability_to::<BrowseTheWeb>()?.page().await?;
        match page.query_selector(&self.locator).await {
            Ok(present) => Ok(present),
            Err(e) => {
                warn!("Treating '{}' as absent: {}", self.locator, e);
                Ok(false)
            }
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Presence of '{}'", self.locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::{MemoryBrowser, MemoryDocument, MemoryElement, MemorySite};
    use crate::driver::DriverError;
    use crate::error::Error;
    use crate::interactions::Navigate;
    use std::sync::Arc;

    const HOME: &str = "https://example.test/";

    async fn prober() -> Actor {
        let site = MemorySite::new()
            .page(
                HOME,
                MemoryDocument::titled("Home")
                    .with("#shown", MemoryElement::text("here"))
                    .with("#tucked", MemoryElement::hidden())
                    .with("#frame", MemoryElement::text("inside")),
            )
            .fault(
                "#frame",
                DriverError::Detached {
                    locator: "#frame".to_string(),
                    reason: "frame was detached".to_string(),
                },
            );
        let driver = MemoryBrowser::new(site);
        let actor = Actor::named("Paz").who_can(BrowseTheWeb::using(Arc::new(driver)));
        actor.attempts_to(&[&Navigate::to(HOME)]).await.unwrap();
        actor
    }

    #[tokio::test]
    async fn test_visibility() {
        let paz = prober().await;
        assert!(paz.asks(Visibility::of("#shown")).await.unwrap());
        assert!(!paz.asks(Visibility::of("#tucked")).await.unwrap());
        assert!(!paz.asks(Visibility::of("#missing")).await.unwrap());
        paz.dismiss().await.unwrap();
    }

    #[tokio::test]
    async fn test_presence_includes_hidden_elements() {
        let paz = prober().await;
        assert!(paz.asks(Presence::of("#tucked")).await.unwrap());
        assert!(!paz.asks(Presence::of("#missing")).await.unwrap());
        paz.dismiss().await.unwrap();
    }

    #[tokio::test]
    async fn test_driver_errors_become_false() {
        let paz = prober().await;
        assert!(!paz.asks(Visibility::of("#frame")).await.unwrap());
        assert!(!paz.asks(Presence::of("#frame")).await.unwrap());
        paz.dismiss().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_ability_still_propagates() {
        let actor = Actor::named("Nobody");
        let err = actor.asks(Visibility::of("#shown")).await.unwrap_err();
        assert!(matches!(err, Error::MissingAbility { .. }));
    }
}
