//! Type interaction

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::abilities::BrowseTheWeb;
use crate::actor::Actor;
use crate::driver::{KeystrokeOptions, WaitState};
use crate::error::{Error, Result};
use crate::performable::{Interaction, Performable};

/// How a [`Type`] interaction enters its text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOptions {
    /// Empty the field before typing
    pub clear: bool,
    /// Passed to the driver's typing call as is
    pub keystrokes: KeystrokeOptions,
}

impl Default for TypeOptions {
    fn default() -> Self {
        Self {
            clear: true,
            keystrokes: KeystrokeOptions::default(),
        }
    }
}

/// Type text into a field with simulated key presses
///
/// ```ignore
/// Type::the_text("student").into("#username")
/// ```
#[derive(Debug, Clone)]
pub struct Type {
    text: String,
    locator: String,
    options: TypeOptions,
}

/// First half of the `Type::the_text(..).into(..)` phrase
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    text: String,
}

impl TypeBuilder {
    pub fn into(self, locator: impl Into<String>) -> Type {
        Type {
            text: self.text,
            locator: locator.into(),
            options: TypeOptions::default(),
        }
    }
}

impl Type {
    pub fn the_text(text: impl Into<String>) -> TypeBuilder {
        TypeBuilder { text: text.into() }
    }

    pub fn with_options(mut self, options: TypeOptions) -> Self {
        self.options = options;
        self
    }

    /// Append to whatever the field already holds
    pub fn without_clearing(mut self) -> Self {
        self.options.clear = false;
        self
    }

    /// Pause between key presses
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.options.keystrokes.delay = Some(delay);
        self
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }
}

#[async_trait]
impl Performable for Type {
    async fn perform_as(&self, actor: &Actor) -> Result<()> {
        let browsing = actor.ability_to::<BrowseTheWeb>()?;
        let page = browsing.page().await?;
        let budget = self.options.keystrokes.timeout.unwrap_or(browsing.timeout());
        let failed = |e| Error::interaction("type into", &self.locator, e);

        // one wait covers both the clear and the typing
        page.wait_for_selector(&self.locator, WaitState::Visible, budget)
            .await
            .map_err(failed)?;
        if self.options.clear {
            page.fill(&self.locator, "").await.map_err(failed)?;
        }
        page.type_text(&self.locator, &self.text, &self.options.keystrokes)
            .await
            .map_err(failed)
    }
}

impl Interaction for Type {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type '{}' into '{}'", self.text, self.locator)
    }
}
