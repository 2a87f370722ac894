//! Atomic UI interactions
//!
//! Each interaction waits for its target to be ready before acting on it.

mod click;
mod navigate;
mod type_text;

pub use click::Click;
pub use navigate::Navigate;
pub use type_text::{Type, TypeBuilder, TypeOptions};
