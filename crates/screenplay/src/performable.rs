//! The action and observation protocol
//!
//! Everything an actor does is a [`Performable`]; everything it asks is a
//! [`Question`]. Both receive the actor for the duration of one call and
//! never keep it.

use std::fmt;

use async_trait::async_trait;

use crate::actor::Actor;
use crate::error::Result;

/// A unit of action executed on behalf of an actor
#[async_trait]
pub trait Performable: fmt::Display + Send + Sync {
    async fn perform_as(&self, actor: &Actor) -> Result<()>;
}

/// Business-level performable composed from other performables
pub trait Task: Performable {}

/// Atomic, UI-level performable that calls straight into an ability
pub trait Interaction: Performable {}

/// A typed read of system state through an actor's abilities
#[async_trait]
pub trait Question: fmt::Display + Send + Sync {
    type Answer: Send;

    async fn answered_by(&self, actor: &Actor) -> Result<Self::Answer>;
}
