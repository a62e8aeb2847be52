use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use gpterm::core::config::{self, CliOverrides, ConfigError};
use gpterm::transport::OpenAiTransport;
use gpterm::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

#[derive(Parser)]
#[command(name = "gpterm", about = "Chat with an OpenAI-compatible model in your terminal")]
struct Args {
    /// Config file path (default: ~/.config/gpterm/gpterm.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model to use, overriding the config file
    #[arg(short, long)]
    model: Option<String>,

    /// Where to write the log
    #[arg(long, default_value = "gpterm.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // The terminal belongs to the UI, so logs go to a file
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    log::info!("gpterm starting up");

    let Some(path) = args.config.or_else(config::config_path) else {
        eprintln!("{}", ConfigError::NoHomeDir);
        return ExitCode::FAILURE;
    };

    let file_config = match config::load_config(&path) {
        Ok(c) => c,
        Err(err @ ConfigError::DefaultCreated(_)) => {
            println!("{err}");
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let cli = CliOverrides { model: args.model };
    let chat_config = match config::resolve(&file_config, &cli, &path) {
        Ok(c) => c,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let transport = match OpenAiTransport::new(&chat_config) {
        Ok(t) => t,
        Err(err) => {
            let err = ConfigError::Client(err.to_string());
            log::error!("{err}");
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match tui::run(&chat_config.model, Arc::new(transport)) {
        Ok(()) => {
            log::info!("gpterm exiting");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
