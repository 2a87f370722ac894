//! Playwright driver for Screenplay
//!
//! Drives real browsers from Rust through a small Node.js bridge process:
//!
//! ```text
//! ┌──────────────────────────┐  JSON lines   ┌──────────────────────────┐
//! │  PlaywrightBrowser       │ ────────────▶ │  node screenplay-bridge  │
//! │    PlaywrightContext     │    stdin      │    playwright.<browser>  │
//! │      PlaywrightPage      │ ◀──────────── │    handle id -> object   │
//! │  (driver::{Browser,..})  │    stdout     │                          │
//! └──────────────────────────┘               └──────────────────────────┘
//! ```
//!
//! Every request carries an id and is answered exactly once; each waits on
//! a Rust-side deadline so a stuck browser cannot hang the caller.

pub mod bridge;
pub mod error;
pub mod launcher;
pub mod playwright;

pub use error::{E2eError, E2eResult};
pub use launcher::{check_available, launch, LaunchConfig};
pub use playwright::{ContextSetup, Deadlines, PlaywrightBrowser, PlaywrightContext, PlaywrightPage};
