mod analyzer;
mod config;
mod model;
mod narrator;
mod normalizer;
mod parser;
mod pipeline;
mod report;
mod scraper;
mod utils;

use clap::Parser;
use config::load_config;
use model::{ErrorBody, FinalReport};
use pipeline::NewsPipeline;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// News sentiment and comparative coverage analysis for a company or topic.
#[derive(Debug, clap::Parser)]
#[command(name = "news-pulse", version)]
struct Cli {
    /// Company or topic to analyze
    query: Option<String>,

    /// Number of articles to fetch (1-20, default from config)
    #[arg(short = 'n', long)]
    page_size: Option<u32>,

    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Also write the spoken summary as MP3 to this path
    #[arg(long)]
    audio_out: Option<PathBuf>,

    /// Skip speech synthesis
    #[arg(long)]
    no_audio: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for the report
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic occurred: {:?}", panic_info);
    }));

    // Load configuration from file
    let mut config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            print_error(&e.to_string());
            return ExitCode::from(1);
        }
    };
    if cli.no_audio {
        config.speech_enabled = false;
    }

    let pipeline = match NewsPipeline::from_config(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to initialize capabilities: {}", e);
            print_error(&e.to_string());
            return ExitCode::from(1);
        }
    };

    let outcome = match pipeline.request(cli.query.as_deref(), cli.page_size) {
        Ok(request) => pipeline.run(&request).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(report) => {
            if let Some(path) = &cli.audio_out {
                save_audio(&report, path);
            }
            match serde_json::to_string_pretty(&report) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!("Failed to serialize report: {}", e);
                    print_error(&e.to_string());
                    ExitCode::from(1)
                }
            }
        }
        Err(e) => {
            warn!("Request failed: {}", e);
            print_error(&e.to_string());
            ExitCode::from(e.exit_code())
        }
    }
}

/// Prints the structured error object in place of a report.
fn print_error(message: &str) {
    let body = ErrorBody {
        error: message.to_string(),
    };
    match serde_json::to_string(&body) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{{\"error\": \"unknown error\"}}"),
    }
}

/// Writes the synthesized MP3, if any, for local playback.
fn save_audio(report: &FinalReport, path: &Path) {
    let Some(audio) = &report.audio else {
        warn!("No audio available to write to {}", path.display());
        return;
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create audio folder: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, audio) {
        warn!("Failed to write audio: {}", e);
    } else {
        info!("Saved audio: {}", path.display());
    }
}
