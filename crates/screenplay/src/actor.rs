//! Actors: named agents that hold abilities

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::ability::{Ability, AbilityKind, ActorIdentity};
use crate::error::{Error, Result};
use crate::performable::{Performable, Question};

/// A named agent that performs tasks and asks questions
///
/// ```ignore
/// let alice = Actor::named("Alice").who_can(BrowseTheWeb::using(browser));
/// alice
///     .attempts_to(&[&Login::with_valid_credentials(&settings)])
///     .await?;
/// let url = alice.asks(CurrentUrl::new()).await?;
/// alice.dismiss().await?;
/// ```
pub struct Actor {
    identity: ActorIdentity,
    abilities: HashMap<AbilityKind, Box<dyn Ability>>,
}

impl Actor {
    /// Create an actor with no abilities
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            identity: ActorIdentity::new(name),
            abilities: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn identity(&self) -> &ActorIdentity {
        &self.identity
    }

    /// Grant an ability, consuming and returning the actor
    pub fn who_can<A: Ability>(mut self, ability: A) -> Self {
        self.grant(ability);
        self
    }

    /// Grant an ability; a previous ability of the same kind is replaced
    pub fn grant<A: Ability>(&mut self, ability: A) -> &mut Self {
        let kind = AbilityKind::of::<A>();
        let bound = ability.bound_to(&self.identity);
        if self.abilities.insert(kind, Box::new(bound)).is_some() {
            debug!("{} replaced ability {}", self, kind);
        } else {
            debug!("{} can now {}", self, kind);
        }
        self
    }

    /// Perform each performable in order, stopping at the first failure
    pub async fn attempts_to(&self, performables: &[&dyn Performable]) -> Result<&Self> {
        for performable in performables {
            info!("{} attempts to {}", self.identity, performable);
            if let Err(e) = performable.perform_as(self).await {
                warn!("{} could not {}: {}", self.identity, performable, e);
                return Err(e);
            }
        }
        Ok(self)
    }

    /// Ask a question and return the answer
    pub async fn asks<Q: Question>(&self, question: Q) -> Result<Q::Answer> {
        debug!("{} asks for {}", self.identity, question);
        question.answered_by(self).await
    }

    pub fn has_ability(&self, kind: AbilityKind) -> bool {
        self.abilities.contains_key(&kind)
    }

    pub fn has_ability_to<A: Ability>(&self) -> bool {
        self.has_ability(AbilityKind::of::<A>())
    }

    /// The ability held for `kind`
    pub fn ability_for(&self, kind: AbilityKind) -> Result<&dyn Ability> {
        self.abilities
            .get(&kind)
            .map(|ability| ability.as_ref())
            .ok_or_else(|| Error::MissingAbility {
                actor: self.identity.name.clone(),
                ability: kind,
            })
    }

    /// Typed accessor for the ability of type `A`
    pub fn ability_to<A: Ability>(&self) -> Result<&A> {
        let kind = AbilityKind::of::<A>();
        self.ability_for(kind)?
            .as_any()
            .downcast_ref::<A>()
            .ok_or_else(|| Error::MissingAbility {
                actor: self.identity.name.clone(),
                ability: kind,
            })
    }

    /// Release every ability and end the actor's scene
    ///
    /// All abilities are released even if one fails; the first failure is
    /// returned.
    pub async fn dismiss(mut self) -> Result<()> {
        let abilities: Vec<_> = self.abilities.drain().collect();
        let mut first_error = None;
        for (kind, ability) in abilities {
            debug!("{} releases {}", self.identity, kind);
            if let Err(e) = ability.release().await {
                warn!("{} failed to release {}: {}", self.identity, kind, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor({})", self.identity.name)
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.abilities.keys().map(|k| k.name()).collect();
        kinds.sort_unstable();
        f.debug_struct("Actor")
            .field("name", &self.identity.name)
            .field("abilities", &kinds)
            .finish()
    }
}

impl Drop for Actor {
    fn drop(&mut self) {
        if !self.abilities.is_empty() {
            warn!(
                "{} dropped without dismiss(); {} ability(ies) not released",
                self,
                self.abilities.len()
            );
        }
    }
}
