//! Business-level tasks

mod login;

pub use login::{EnterCredentials, Login, NavigateToLoginPage, SubmitLoginForm};
