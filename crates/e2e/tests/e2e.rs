//! End-to-end login suite against a real browser
//!
//! Run with: cargo test --package screenplay-e2e --test e2e -- --environment dev
//!
//! Exits 0 without running anything when node or the Playwright package is
//! missing, or when the target site cannot be reached.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{ensure, Context};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use screenplay::config::Settings;
use screenplay::data::{LoginCredentials, LoginTestData};
use screenplay::driver::Browser;
use screenplay::interactions::Navigate;
use screenplay::pages::{LoggedInPageLocators, LoginPageLocators};
use screenplay::questions::{CurrentUrl, Text, Visibility};
use screenplay::tasks::Login;
use screenplay::{Actor, BrowseTheWeb, Error};
use screenplay_e2e::{check_available, launch, E2eError, LaunchConfig};

#[derive(Parser, Debug)]
#[command(name = "screenplay-e2e")]
#[command(about = "End-to-end login suite for Screenplay")]
#[command(ignore_errors = true)]
struct Args {
    /// Run only scenarios whose name contains this
    filter: Option<String>,

    /// Settings file; missing file means defaults
    #[arg(short, long, env = "SCREENPLAY_CONFIG", default_value = "screenplay.toml")]
    config: PathBuf,

    /// Environment preset (dev, staging, prod, local)
    #[arg(short, long)]
    environment: Option<String>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    browser: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Also run every catalogued login case
    #[arg(long)]
    all_cases: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy)]
enum Scenario {
    ValidLogin,
    InvalidUsername,
    EmptyCredentials,
    Catalogue,
}

impl Scenario {
    fn name(&self) -> &'static str {
        match self {
            Scenario::ValidLogin => "valid_login",
            Scenario::InvalidUsername => "invalid_username",
            Scenario::EmptyCredentials => "empty_credentials",
            Scenario::Catalogue => "catalogue",
        }
    }
}

fn main() {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    let settings = load_settings(&args)?;
    let config = LaunchConfig::from_settings(&settings);

    match check_available(&config).await {
        Ok(()) => {}
        Err(e @ (E2eError::NodeNotFound | E2eError::PlaywrightNotFound)) => {
            eprintln!("Skipping: {}", e);
            return Ok(true);
        }
        Err(e) => return Err(e.into()),
    }

    let browser: Arc<dyn Browser> = Arc::new(launch(&config).await?);
    let passed = run_suite(&args, browser.clone(), &settings).await;
    browser.close().await.context("closing browser")?;
    passed
}

fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    settings.apply_env()?;
    if let Some(name) = &args.environment {
        settings = settings.for_environment(name)?;
    }
    if let Some(browser) = &args.browser {
        settings.browser.browser_name = browser.clone();
    }
    if args.headed {
        settings.browser.headless = false;
    }
    info!(
        "Environment {} at {}",
        settings.environment.environment, settings.environment.base_url
    );
    Ok(settings)
}

async fn run_suite(args: &Args, browser: Arc<dyn Browser>, settings: &Settings) -> anyhow::Result<bool> {
    if !site_reachable(browser.clone(), settings).await? {
        eprintln!("Skipping: {} is unreachable", settings.urls().login);
        return Ok(true);
    }

    let mut scenarios = vec![
        Scenario::ValidLogin,
        Scenario::InvalidUsername,
        Scenario::EmptyCredentials,
    ];
    if args.all_cases {
        scenarios.push(Scenario::Catalogue);
    }
    if let Some(filter) = &args.filter {
        scenarios.retain(|s| s.name().contains(filter.as_str()));
    }

    let mut failed = 0;
    for scenario in &scenarios {
        let start = Instant::now();
        match run_scenario(*scenario, browser.clone(), settings).await {
            Ok(()) => info!("PASS {} ({}ms)", scenario.name(), start.elapsed().as_millis()),
            Err(e) => {
                failed += 1;
                error!("FAIL {} ({}ms): {:#}", scenario.name(), start.elapsed().as_millis(), e);
            }
        }
    }

    println!(
        "\n{} scenarios: {} passed, {} failed",
        scenarios.len(),
        scenarios.len() - failed,
        failed
    );
    Ok(failed == 0)
}

fn actor(name: &str, browser: Arc<dyn Browser>, settings: &Settings) -> Actor {
    Actor::named(name).who_can(BrowseTheWeb::using(browser).with_timeout(settings.default_timeout()))
}

async fn site_reachable(browser: Arc<dyn Browser>, settings: &Settings) -> anyhow::Result<bool> {
    let scout = actor("Scout", browser, settings);
    let visit = scout.attempts_to(&[&Navigate::to(settings.urls().login)]).await.map(|_| ());
    scout.dismiss().await?;
    match visit {
        Ok(()) => Ok(true),
        Err(Error::Navigation { .. }) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

async fn run_scenario(scenario: Scenario, browser: Arc<dyn Browser>, settings: &Settings) -> anyhow::Result<()> {
    let student = actor("Student", browser, settings);
    let outcome = play(scenario, &student, settings).await;
    let released = student.dismiss().await;
    outcome?;
    released?;
    Ok(())
}

async fn play(scenario: Scenario, student: &Actor, settings: &Settings) -> anyhow::Result<()> {
    let credentials = settings.credentials();
    match scenario {
        Scenario::ValidLogin => {
            student
                .attempts_to(&[&Login::with_valid_credentials(settings)])
                .await?;
            let url = student.asks(CurrentUrl::new()).await?;
            ensure!(url.contains("/logged-in-successfully/"), "landed on {}", url);
            let content = student.asks(Text::of(LoggedInPageLocators::POST_CONTENT)).await?;
            ensure!(content.contains("Congratulations"), "unexpected content: {}", content);
        }
        Scenario::InvalidUsername => {
            student
                .attempts_to(&[&Login::with_credentials(
                    settings,
                    &credentials.invalid.username,
                    &credentials.valid.password,
                )])
                .await?;
            let url = student.asks(CurrentUrl::new()).await?;
            ensure!(url.contains("/practice-test-login/"), "left the login page for {}", url);
            ensure!(
                student.asks(Visibility::of(LoginPageLocators::ERROR_MESSAGE)).await?,
                "error message not shown"
            );
        }
        Scenario::EmptyCredentials => {
            student
                .attempts_to(&[&Login::with_credentials(settings, "", "")])
                .await?;
            let url = student.asks(CurrentUrl::new()).await?;
            ensure!(url.contains("/practice-test-login/"), "left the login page for {}", url);
        }
        Scenario::Catalogue => {
            for case in LoginTestData::all() {
                check_case(student, settings, &case)
                    .await
                    .with_context(|| case.description.clone())?;
            }
        }
    }
    Ok(())
}

async fn check_case(student: &Actor, settings: &Settings, case: &LoginCredentials) -> anyhow::Result<()> {
    student
        .attempts_to(&[&Login::with_credentials(settings, &case.username, &case.password)])
        .await?;
    let url = student.asks(CurrentUrl::new()).await?;
    let logged_in = url.contains("/logged-in-successfully/");
    ensure!(
        logged_in == case.should_succeed(),
        "expected {:?}, ended on {}",
        case.expected,
        url
    );
    Ok(())
}
