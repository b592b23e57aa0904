//! Dyloader - audio extraction from Douyin listing pages
//!
//! Renders pages in headless Chromium, picks the best media link on each
//! item page and streams it to a collision-free local file.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dyloader::batch::{BatchEvent, BatchRequest, BatchRunner, ItemResult};
use dyloader::browser::ChromiumLauncher;
use dyloader::downloader::HttpFetcher;
use dyloader::extractor::CountScraper;
use dyloader::report::{AudioReport, CountReport, FailureReport};
use dyloader::utils::{HttpConnectivity, Settings};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dyloader", version, about = "Download audio from Douyin videos")]
struct Cli {
    /// Settings file (JSON); defaults to the per-user config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download audio for the first videos of a profile page
    Audio {
        /// Profile or listing page URL
        #[arg(short, long)]
        url: String,

        /// Output directory
        #[arg(short, long, default_value = "audio")]
        output: PathBuf,

        /// Base file name (a timestamp is appended)
        #[arg(short, long)]
        name: Option<String>,

        /// Number of videos to process
        #[arg(short, long, default_value_t = 1)]
        count: usize,

        /// Print results as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Print the works count shown on a profile page
    Count {
        /// Profile page URL
        #[arg(short, long)]
        url: String,

        /// Print the result as JSON
        #[arg(short, long)]
        json: bool,
    },
}

impl Command {
    fn json(&self) -> bool {
        match self {
            Command::Audio { json, .. } | Command::Count { json, .. } => *json,
        }
    }
}

fn init_logging(json: bool) {
    let default = if json { "warn" } else { "dyloader=info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!("Failed to serialize output: {}", e),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let json = cli.command.json();
    init_logging(json);

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => Arc::new(settings),
        Err(e) => {
            match &cli.command {
                Command::Count { url, .. } => report_count_failure(json, url, &e),
                Command::Audio { .. } => report_fatal(json, &e),
            }
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Audio {
            url,
            output,
            name,
            count,
            json,
        } => {
            let request = BatchRequest {
                listing_url: url,
                max_count: count,
                output_dir: output,
                explicit_name: name,
            };
            match run_audio(settings, &request, json).await {
                Ok(results) => {
                    if json {
                        let reports: Vec<AudioReport> =
                            results.iter().map(AudioReport::from_item).collect();
                        print_json(&reports);
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    report_fatal(json, &e);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Count { url, json } => match run_count(settings, &url).await {
            Ok(number) => {
                let report = CountReport::found(&url, number);
                if json {
                    print_json(&report);
                } else if let CountReport::Found { message, .. } = &report {
                    println!("{}", message);
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                report_count_failure(json, &url, &e);
                ExitCode::FAILURE
            }
        },
    }
}

fn report_fatal(json: bool, error: &anyhow::Error) {
    if json {
        print_json(&FailureReport::new(error));
    } else {
        println!("Error: {:#}", error);
    }
}

fn report_count_failure(json: bool, url: &str, error: &anyhow::Error) {
    if json {
        print_json(&CountReport::failed(url, error));
    } else {
        println!("Failed to get works count: {:#}", error);
    }
}

async fn run_audio(
    settings: Arc<Settings>,
    request: &BatchRequest,
    json: bool,
) -> Result<Vec<ItemResult>> {
    let launcher = Arc::new(ChromiumLauncher::new(settings.browser.clone()));
    let fetcher = Arc::new(HttpFetcher::new(&settings.http)?);
    let connectivity = Arc::new(HttpConnectivity::default());
    let mut runner = BatchRunner::new(launcher, fetcher, connectivity, settings);

    let printer = if json {
        None
    } else {
        let (tx, rx) = mpsc::channel(64);
        runner = runner.with_events(tx);
        Some(tokio::spawn(print_events(rx)))
    };

    let results = runner.run(request).await;
    // Closes the event channel so the printer can finish
    drop(runner);
    if let Some(printer) = printer {
        finish_printer(printer).await;
    }
    results
}

/// Wait for the printer; a failed task is logged, never ignored
async fn finish_printer(printer: JoinHandle<()>) -> bool {
    match printer.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Event printer task failed: {}", e);
            false
        }
    }
}

async fn print_events(mut rx: mpsc::Receiver<BatchEvent>) {
    while let Some(event) = rx.recv().await {
        println!("{}", event.describe());
    }
}

async fn run_count(settings: Arc<Settings>, url: &str) -> Result<String> {
    let launcher = Arc::new(ChromiumLauncher::new(settings.browser.clone()));
    let connectivity = Arc::new(HttpConnectivity::default());
    CountScraper::new(launcher, connectivity, settings)
        .scrape_count(url)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_finish_printer_reports_failed_task() {
        let ok = tokio::spawn(async {});
        assert!(finish_printer(ok).await);

        let aborted = tokio::spawn(std::future::pending::<()>());
        aborted.abort();
        assert!(!finish_printer(aborted).await);
    }
}
