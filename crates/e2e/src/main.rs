//! chatflow-e2e - run the console scenarios against a live bot

use anyhow::Context;
use chatflow_common::ConsoleConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use chatflow_e2e::playwright::{Browser, PlaywrightConfig};
use chatflow_e2e::scenarios::{self, ScenarioKind};
use chatflow_e2e::{ScenarioRunner, Session, SuiteEntry};

#[derive(Parser)]
#[command(name = "chatflow-e2e")]
#[command(author, version, about = "E2E suite for the chatbot console", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available scenarios
    List,

    /// Run scenarios; setup always runs first
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Configuration file (missing file means defaults)
    #[arg(short, long, default_value_os_t = chatflow_common::default_config_path())]
    config: PathBuf,

    /// Bot profile id, overrides the config and CHATFLOW_BOT_PROFILE
    #[arg(short, long)]
    profile: Option<String>,

    /// Run only this scenario (repeatable)
    #[arg(short, long)]
    scenario: Vec<String>,

    /// Run only scenarios carrying this tag (repeatable)
    #[arg(short, long)]
    tag: Vec<String>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let result = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")
        .and_then(|rt| rt.block_on(async_main(cli.command)));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(command: Commands) -> anyhow::Result<bool> {
    match command {
        Commands::List => {
            for kind in ScenarioKind::ALL {
                println!(
                    "{:<22} [{}] {}",
                    kind.name(),
                    kind.tags().join(", "),
                    kind.description()
                );
            }
            Ok(true)
        }
        Commands::Run(args) => run(args).await,
    }
}

async fn run(args: RunArgs) -> anyhow::Result<bool> {
    let mut config = ConsoleConfig::load_with_env(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    if let Some(profile) = args.profile {
        config.bot_profile = profile;
    }
    config.validate()?;
    config.credentials()?;

    let filters: Vec<String> = args.scenario.into_iter().chain(args.tag).collect();
    let kinds = scenarios::select(&filters)?;

    let playwright = PlaywrightConfig {
        browser: Browser::from_name(&args.browser),
        headless: !args.headed,
        action_timeout: config.timeouts.ui(),
        ..Default::default()
    };
    let config = Arc::new(config);

    let entries = kinds
        .into_iter()
        .map(|kind| {
            let config = config.clone();
            let playwright = playwright.clone();
            SuiteEntry::new(kind.name(), kind.is_setup(), move || async move {
                let session = Session::open(&config, playwright).await?;
                let scenario = kind.build(session.ctx());
                Ok(scenario.teardown(move || async move { session.close().await }))
            })
        })
        .collect();

    let runner = ScenarioRunner::new(args.output);
    let suite = runner.run_suite(entries).await;
    runner.write_results(&suite)?;
    Ok(suite.all_passed())
}
