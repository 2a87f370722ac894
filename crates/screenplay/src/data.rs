//! Login test data

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Credentials;

/// What a login attempt is expected to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginOutcome {
    Success,
    Failure,
}

/// One login case: credentials plus the expected outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
    pub description: String,
    pub expected: LoginOutcome,
}

impl LoginCredentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        description: impl Into<String>,
        expected: LoginOutcome,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            description: description.into(),
            expected,
        }
    }

    /// Unique throwaway credentials no site should accept
    pub fn random() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self::new(
            format!("user_{}", &id[..12]),
            format!("pw-{}", &id[12..24]),
            "Randomly generated credentials",
            LoginOutcome::Failure,
        )
    }

    pub fn should_succeed(&self) -> bool {
        self.expected == LoginOutcome::Success
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }
}

/// The catalogue of login cases
pub struct LoginTestData;

impl LoginTestData {
    pub fn valid_user() -> LoginCredentials {
        LoginCredentials::new("student", "Password123", "Valid user credentials", LoginOutcome::Success)
    }

    pub fn invalid_username() -> LoginCredentials {
        failing("incorrectUser", "Password123", "Invalid username with valid password")
    }

    pub fn invalid_password() -> LoginCredentials {
        failing("student", "incorrectPassword", "Valid username with invalid password")
    }

    pub fn both_invalid() -> LoginCredentials {
        failing("incorrectUser", "incorrectPassword", "Both username and password invalid")
    }

    pub fn empty_username() -> LoginCredentials {
        failing("", "Password123", "Empty username with valid password")
    }

    pub fn empty_password() -> LoginCredentials {
        failing("student", "", "Valid username with empty password")
    }

    pub fn both_empty() -> LoginCredentials {
        failing("", "", "Both username and password empty")
    }

    pub fn special_chars_username() -> LoginCredentials {
        failing("user@#$%", "Password123", "Username with special characters")
    }

    pub fn long_username() -> LoginCredentials {
        failing("a".repeat(100), "Password123", "Very long username")
    }

    pub fn long_password() -> LoginCredentials {
        failing("student", "a".repeat(100), "Very long password")
    }

    pub fn all() -> Vec<LoginCredentials> {
        vec![
            Self::valid_user(),
            Self::invalid_username(),
            Self::invalid_password(),
            Self::both_invalid(),
            Self::empty_username(),
            Self::empty_password(),
            Self::both_empty(),
            Self::special_chars_username(),
            Self::long_username(),
            Self::long_password(),
        ]
    }

    pub fn valid() -> Vec<LoginCredentials> {
        Self::all().into_iter().filter(|c| c.should_succeed()).collect()
    }

    pub fn invalid() -> Vec<LoginCredentials> {
        Self::all().into_iter().filter(|c| !c.should_succeed()).collect()
    }
}

fn failing(username: impl Into<String>, password: impl Into<String>, description: &str) -> LoginCredentials {
    LoginCredentials::new(username, password, description, LoginOutcome::Failure)
}
