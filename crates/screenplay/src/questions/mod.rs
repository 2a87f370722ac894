//! Questions about what the browser currently shows

mod text;
mod visibility;

pub use text::{CurrentUrl, PageTitle, Text};
pub use visibility::{Presence, Visibility};
