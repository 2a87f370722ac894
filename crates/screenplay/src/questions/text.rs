//! Text-valued questions

use std::fmt;

use async_trait::async_trait;

use crate::abilities::BrowseTheWeb;
use crate::actor::Actor;
use crate::driver::WaitState;
use crate::error::{Error, Result};
use crate::performable::Question;

/// Text content of an element, once visible; empty when it has none
#[derive(Debug, Clone)]
pub struct Text {
    locator: String,
}

impl Text {
    pub fn of(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
        }
    }
}

#[async_trait]
impl Question for Text {
    type Answer = String;

    async fn answered_by(&self, actor: &Actor) -> Result<String> {
        let browsing = actor.ability_to::<BrowseTheWeb>()?;
        let page = browsing.page().await?;
        let budget = browsing.timeout();
        let failed = |e| Error::interaction("read text of", &self.locator, e);

        page.wait_for_selector(&self.locator, WaitState::Visible, budget)
            .await
            .map_err(failed)?;
        let content = page.text_content(&self.locator).await.map_err(failed)?;
        Ok(content.unwrap_or_default())
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Text of '{}'", self.locator)
    }
}

/// Location of the working page, read without waiting
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentUrl;

impl CurrentUrl {
    pub fn new() -> Self {
        CurrentUrl
    }
}

#[async_trait]
impl Question for CurrentUrl {
    type Answer = String;

    async fn answered_by(&self, actor: &Actor) -> Result<String> {
        let page = actor.ability_to::<BrowseTheWeb>()?.page().await?;
        Ok(page.url().await?)
    }
}

impl fmt::Display for CurrentUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Current URL")
    }
}

/// Document title of the working page, read without waiting
#[derive(Debug, Clone, Copy, Default)]
pub struct PageTitle;

impl PageTitle {
    pub fn new() -> Self {
        PageTitle
    }
}

#[async_trait]
impl Question for PageTitle {
    type Answer = String;

    async fn answered_by(&self, actor: &Actor) -> Result<String> {
        let page = actor.ability_to::<BrowseTheWeb>()?.page().await?;
        Ok(page.title().await?)
    }
}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Page title")
    }
}
