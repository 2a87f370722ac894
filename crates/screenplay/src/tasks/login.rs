//! Login tasks for the practice login page

use std::fmt;

use async_trait::async_trait;

use crate::actor::Actor;
use crate::config::{Credentials, Settings};
use crate::error::Result;
use crate::interactions::{Click, Navigate, Type};
use crate::pages::LoginPageLocators;
use crate::performable::{Performable, Task};

/// Open the login page, fill in both fields and submit
#[derive(Debug, Clone)]
pub struct Login {
    login_url: String,
    username: String,
    password: String,
}

impl Login {
    pub fn new(login_url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Log in with explicit credentials at the configured login page
    pub fn with_credentials(settings: &Settings, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(settings.urls().login, username, password)
    }

    pub fn with_valid_credentials(settings: &Settings) -> Self {
        Self::using(settings, settings.credentials().valid)
    }

    pub fn with_invalid_credentials(settings: &Settings) -> Self {
        Self::using(settings, settings.credentials().invalid)
    }

    fn using(settings: &Settings, credentials: Credentials) -> Self {
        Self::with_credentials(settings, credentials.username, credentials.password)
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[async_trait]
impl Performable for Login {
    async fn perform_as(&self, actor: &Actor) -> Result<()> {
        actor
            .attempts_to(&[
                &Navigate::to(&self.login_url),
                &Type::the_text(&self.username).into(LoginPageLocators::USERNAME_INPUT),
                &Type::the_text(&self.password).into(LoginPageLocators::PASSWORD_INPUT),
                &Click::on(LoginPageLocators::SUBMIT_BUTTON),
            ])
            .await?;
        Ok(())
    }
}

impl Task for Login {}

impl fmt::Display for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Login with username '{}'", self.username)
    }
}

/// Open the login page
#[derive(Debug, Clone)]
pub struct NavigateToLoginPage {
    login_url: String,
}

impl NavigateToLoginPage {
    pub fn new(settings: &Settings) -> Self {
        Self::at(settings.urls().login)
    }

    pub fn at(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }
}

#[async_trait]
impl Performable for NavigateToLoginPage {
    async fn perform_as(&self, actor: &Actor) -> Result<()> {
        actor.attempts_to(&[&Navigate::to(&self.login_url)]).await?;
        Ok(())
    }
}

impl Task for NavigateToLoginPage {}

impl fmt::Display for NavigateToLoginPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Navigate to login page")
    }
}

/// Fill in both login fields without submitting
#[derive(Debug, Clone)]
pub struct EnterCredentials {
    username: String,
    password: String,
}

impl EnterCredentials {
    pub fn with_values(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl Performable for EnterCredentials {
    async fn perform_as(&self, actor: &Actor) -> Result<()> {
        actor
            .attempts_to(&[
                &Type::the_text(&self.username).into(LoginPageLocators::USERNAME_INPUT),
                &Type::the_text(&self.password).into(LoginPageLocators::PASSWORD_INPUT),
            ])
            .await?;
        Ok(())
    }
}

impl Task for EnterCredentials {}

impl fmt::Display for EnterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Enter credentials (username: '{}')", self.username)
    }
}

/// Press the login form's submit button
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitLoginForm;

#[async_trait]
impl Performable for SubmitLoginForm {
    async fn perform_as(&self, actor: &Actor) -> Result<()> {
        actor
            .attempts_to(&[&Click::on(LoginPageLocators::SUBMIT_BUTTON)])
            .await?;
        Ok(())
    }
}

impl Task for SubmitLoginForm {}

impl fmt::Display for SubmitLoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Submit login form")
    }
}
