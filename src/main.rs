mod ai;
mod compose;
mod config;
mod constants;
mod credentials;
mod customers;
mod generator;
mod retry;
mod ui;

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::ai::init_client;
use crate::config::Config;
use crate::credentials::ApiKeyStore;
use crate::generator::Generator;
use crate::retry::RetryConfig;
use crate::ui::UiApp;

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mailgen=debug"));

    // Try to create a log file in the config directory
    let log_file = Config::config_dir()
        .ok()
        .map(|dir| dir.join("mailgen.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        // Log to file; the terminal belongs to the TUI
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"mailgen - personalized customer emails and notifications

Usage: mailgen [command | customers.csv]

Commands:
    <customers.csv>   Generate and browse emails for the given customer CSV
    setup             Store the OpenAI API key
    help              Show this help message

Without a stored key (or OPENAI_API_KEY), content is generated in mock mode.
Configuration file: ~/.config/mailgen/config.toml
"#
    );
}

fn run_setup() -> Result<()> {
    use std::io::{self, Write};

    println!("Mailgen Setup");
    println!("=============\n");

    let store = ApiKeyStore::new();
    if store.has_key() {
        print!("An API key is already stored. Overwrite? [y/N]: ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Setup cancelled.");
            return Ok(());
        }
    }

    let key = loop {
        print!("OpenAI API key: ");
        io::stdout().flush()?;
        let mut key = String::new();
        io::stdin().read_line(&mut key)?;
        let key = key.trim().to_string();
        if !key.is_empty() {
            break key;
        }
        println!("Key cannot be empty.");
    };

    Config::ensure_dirs()?;
    store.store(&key)?;

    if store.has_key() {
        println!("API key stored successfully.");
    } else {
        eprintln!("Warning: Failed to store the API key.");
        return Err(anyhow::anyhow!("Credential storage failed"));
    }

    println!("\nSetup complete! Run 'mailgen customers.csv' to start.");
    Ok(())
}

async fn run_app(csv_path: PathBuf) -> Result<()> {
    setup_logging();

    let config = Config::load()?;
    Config::ensure_dirs()?;

    // Key resolution and client init are never fatal; absence means mock mode
    let api_key = ApiKeyStore::new().resolve();
    let client = init_client(&api_key, &config.ai);
    if client.is_none() {
        eprintln!("OpenAI not available. Mock email content will be used.");
    }

    let customers = customers::load_customers(&csv_path)?;

    let retry = RetryConfig::new(
        config.ai.max_attempts,
        Duration::from_secs(config.ai.initial_backoff_secs),
        RetryConfig::default().max_delay,
    );
    let generator = Generator::new(client, retry);
    let app = UiApp::new(generator, customers, config.ui.recipient_domain.clone());

    let mut terminal = ratatui::try_init()?;
    let result = app.run(&mut terminal).await;
    ratatui::restore();
    result
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("setup") => run_setup(),
        Some(path) => run_app(PathBuf::from(path)).await,
        None => {
            eprintln!("Missing customer CSV path.");
            print_usage();
            std::process::exit(1);
        }
    }
}
