//! Concrete abilities

mod browse_the_web;

pub use browse_the_web::{BrowseTheWeb, DEFAULT_TIMEOUT};
