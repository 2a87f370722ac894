//! Locators for the practice login site

/// Elements of the login page
pub struct LoginPageLocators;

impl LoginPageLocators {
    pub const USERNAME_INPUT: &'static str = "#username";
    pub const PASSWORD_INPUT: &'static str = "#password";
    pub const SUBMIT_BUTTON: &'static str = "#submit";
    pub const ERROR_MESSAGE: &'static str = "#error";
    pub const PAGE_TITLE: &'static str = ".post-title";
    pub const PAGE_HEADING: &'static str = "h2";
    pub const LOGIN_FORM: &'static str = "#login";
    pub const LOGOUT_LINK: &'static str = "a[href*='logout']";
}

/// Elements of the page shown after a successful login
pub struct LoggedInPageLocators;

impl LoggedInPageLocators {
    pub const PAGE_TITLE: &'static str = ".post-title";
    pub const POST_CONTENT: &'static str = ".post-content";
    pub const LOGOUT_LINK: &'static str = "a[href*='logout']";
    pub const CONGRATULATIONS: &'static str = "text=Congratulations";
    pub const SUCCESS_MESSAGE: &'static str = "text=successfully logged in";
}
