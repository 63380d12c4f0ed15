mod config;
mod device;
mod locator;
mod notify;
mod observer;
mod report;
mod tracker;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::device::EnvProps;
use crate::locator::GpsdSource;
use crate::notify::{FeedConnector, StatusFeed};
use crate::observer::LogObserver;
use crate::report::HttpSink;
use crate::tracker::{Worker, WorkerParts};

#[derive(Parser)]
#[command(name = "capsule-agent")]
#[command(about = "Field telemetry beacon agent")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file
    Validate { config: String },
    /// Run the tracking agent
    Run { config: String },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Run { config } => run(&config),
    }
}

fn validate(path: &str) -> ExitCode {
    match Config::from_file(path) {
        Ok(config) => {
            println!("Config is valid");
            println!("  mission: {}", config.agent.mission_id);
            println!("  interval: {}s", config.agent.interval_s);
            println!("  primary: {}", config.report.primary_url);
            println!("  secondary: {}", config.report.secondary_url);
            match &config.feed {
                Some(feed) => println!("  feed: {} (cooldown {}s)", feed.base_url, feed.cooldown_s),
                None => println!("  feed: disabled"),
            }
            println!("  gpsd: {}", config.locator.gpsd_addr);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Config error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str) -> ExitCode {
    let config = match Config::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Runtime error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run_agent(config))
}

async fn run_agent(config: Config) -> ExitCode {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.report.timeout_s))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("HTTP client error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let feed = config.feed.as_ref().map(|feed_config| {
        StatusFeed::new(
            config.agent.mission_id.clone(),
            Duration::from_secs(feed_config.cooldown_s),
            Box::new(FeedConnector::new(
                client.clone(),
                feed_config.base_url.clone(),
                feed_config.access_token.clone(),
            )),
        )
    });

    let mut worker = Worker::new(WorkerParts {
        interval: Duration::from_secs(config.agent.interval_s),
        source: Box::new(GpsdSource::new(config.locator.gpsd_addr.clone())),
        primary: Box::new(HttpSink::new(
            client.clone(),
            config.report.primary_url.clone(),
        )),
        secondary: Box::new(HttpSink::new(client, config.report.secondary_url.clone())),
        feed,
        props: Box::new(EnvProps),
        observer: Arc::new(LogObserver),
    });

    if let Err(e) = worker.start() {
        eprintln!("Failed to start worker: {}", e);
        return ExitCode::FAILURE;
    }
    log::info!(
        "Tracking started for mission {} at {}",
        config.agent.mission_id,
        chrono::Utc::now()
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for interrupt: {e}");
    }

    match worker.stop().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Tracking error: {}", e);
            ExitCode::FAILURE
        }
    }
}
