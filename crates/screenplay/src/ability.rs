//! Abilities: capabilities an actor holds
//!
//! An actor keeps at most one ability per [`AbilityKind`]. Kinds are
//! explicit tokens derived from the ability's type, so lookups go through a
//! typed accessor ([`crate::Actor::ability_to`]) instead of runtime class
//! checks.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

/// Identity of the actor an ability is bound to, kept for diagnostics only
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActorIdentity {
    pub id: Uuid,
    pub name: String,
}

impl ActorIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ActorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Token naming a capability kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbilityKind {
    id: TypeId,
    name: &'static str,
}

impl AbilityKind {
    pub fn of<A: Ability>() -> Self {
        let full = type_name::<A>();
        Self {
            id: TypeId::of::<A>(),
            name: full.rsplit("::").next().unwrap_or(full),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A capability an actor can be granted
#[async_trait]
pub trait Ability: Send + Sync + 'static {
    /// A copy of this ability bound to `actor`; `self` is left untouched
    fn bound_to(&self, actor: &ActorIdentity) -> Self
    where
        Self: Sized;

    /// The actor this instance was bound to, if any
    fn actor(&self) -> Option<&ActorIdentity>;

    /// Releases whatever the ability holds open
    async fn release(&self) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;
}
