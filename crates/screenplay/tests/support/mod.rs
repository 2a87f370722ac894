//! Offline replica of the practice login site

#![allow(dead_code)]

use std::sync::Arc;

use screenplay::config::Settings;
use screenplay::driver::memory::{MemoryBrowser, MemoryDocument, MemoryElement, MemorySite};
use screenplay::pages::{LoggedInPageLocators, LoginPageLocators};
use screenplay::{Actor, BrowseTheWeb};

pub const USERNAME_ERROR: &str = "Your username is invalid!";
pub const PASSWORD_ERROR: &str = "Your password is invalid!";
pub const SUCCESS_TEXT: &str = "Congratulations student. You successfully logged in!";

/// The site as configured by `settings`: a login form that accepts the
/// configured valid credentials and nothing else
pub fn practice_site(settings: &Settings) -> MemorySite {
    let urls = settings.urls();
    let valid = settings.credentials().valid;

    let login = MemoryDocument::titled("Test Login | Practice Test Automation")
        .with(LoginPageLocators::LOGIN_FORM, MemoryElement::input())
        .with(LoginPageLocators::PAGE_HEADING, MemoryElement::text("Test login"))
        .with(LoginPageLocators::USERNAME_INPUT, MemoryElement::input())
        .with(LoginPageLocators::PASSWORD_INPUT, MemoryElement::input())
        .with(LoginPageLocators::SUBMIT_BUTTON, MemoryElement::text("Submit"))
        .with(LoginPageLocators::ERROR_MESSAGE, MemoryElement::hidden());

    let logged_in = MemoryDocument::titled("Logged In Successfully | Practice Test Automation")
        .with(LoggedInPageLocators::PAGE_TITLE, MemoryElement::text("Logged In Successfully"))
        .with(LoggedInPageLocators::POST_CONTENT, MemoryElement::text(SUCCESS_TEXT))
        .with(LoggedInPageLocators::CONGRATULATIONS, MemoryElement::text("Congratulations"))
        .with(LoggedInPageLocators::SUCCESS_MESSAGE, MemoryElement::text("successfully logged in"))
        .with(LoggedInPageLocators::LOGOUT_LINK, MemoryElement::text("Log out"));

    let target = urls.logged_in.clone();
    MemorySite::new()
        .page(urls.login.clone(), login)
        .page(urls.logged_in.clone(), logged_in)
        .on_click(urls.login, LoginPageLocators::SUBMIT_BUTTON, move |doc| {
            let username = doc.value_of(LoginPageLocators::USERNAME_INPUT).to_string();
            let password = doc.value_of(LoginPageLocators::PASSWORD_INPUT).to_string();
            if username == valid.username && password == valid.password {
                return Some(target.clone());
            }
            let message = if username != valid.username {
                USERNAME_ERROR
            } else {
                PASSWORD_ERROR
            };
            doc.insert(LoginPageLocators::ERROR_MESSAGE, MemoryElement::text(message));
            None
        })
}

pub fn practice_browser(settings: &Settings) -> MemoryBrowser {
    MemoryBrowser::new(practice_site(settings))
}

/// An actor able to browse `driver` with the configured timeout
pub fn browsing_actor(name: &str, driver: &MemoryBrowser, settings: &Settings) -> Actor {
    Actor::named(name)
        .who_can(BrowseTheWeb::using(Arc::new(driver.clone())).with_timeout(settings.default_timeout()))
}
