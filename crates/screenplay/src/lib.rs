//! Screenplay: browser test automation with actors
//!
//! Tests are written from the point of view of actors. An actor holds
//! abilities, performs tasks made of interactions, and asks questions about
//! what it sees:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Actor("Alice")                                              │
//! │    ├── abilities: AbilityKind -> Ability                     │
//! │    │     └── BrowseTheWeb { browser, context?, page? }       │
//! │    ├── attempts_to([Performable])                            │
//! │    │     ├── Task         Login, NavigateToLoginPage, ...    │
//! │    │     └── Interaction  Navigate, Click, Type              │
//! │    └── asks(Question)                                        │
//! │          └── Text, CurrentUrl, PageTitle, Visibility, ...    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  driver::{Browser, BrowserContext, Page}                     │
//! │    ├── screenplay-e2e: Playwright over a Node bridge         │
//! │    └── driver::memory: scripted in-memory site               │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod abilities;
pub mod ability;
pub mod actor;
pub mod config;
pub mod data;
pub mod driver;
pub mod error;
pub mod interactions;
pub mod pages;
pub mod performable;
pub mod questions;
pub mod tasks;

pub use abilities::BrowseTheWeb;
pub use ability::{Ability, AbilityKind, ActorIdentity};
pub use actor::Actor;
pub use config::Settings;
pub use error::{Error, InteractionFailure, Result};
pub use performable::{Interaction, Performable, Question, Task};
