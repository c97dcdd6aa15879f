//! Main entry point for vidget CLI

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidget::cli::output::{create_progress_callback, create_start_callback, OutputFormatter};
use vidget::cli::{Cli, Commands, DownloadArgs, VerbosityLevel};
use vidget::core::{format_duration, Downloader};
use vidget::utils::validate_url;
use vidget::DownloadError;

/// Exit status of an interrupted download
const EXIT_CANCELLED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Download(args) => {
            init_logging(args.verbosity_level());
            info!("Starting vidget with args: {:?}", args);
            run_download(args).await
        }
    }
}

/// Run the `download` subcommand
async fn run_download(args: DownloadArgs) -> ExitCode {
    let mut formatter = OutputFormatter::new(args.verbosity_level());
    if args.no_progress {
        formatter = formatter.without_progress();
    }
    let formatter = Arc::new(formatter);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    match download(&args, formatter.clone(), cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            warn!("Download failed ({:?}): {}", error.category(), error);
            formatter.print_failure(&error);
            if error.is_cancelled() {
                ExitCode::from(EXIT_CANCELLED)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn download(
    args: &DownloadArgs,
    formatter: Arc<OutputFormatter>,
    cancel: CancellationToken,
) -> Result<(), DownloadError> {
    let start_time = Instant::now();
    formatter.print_validating(&args.url);
    let platform = validate_url(&args.url)?;

    let downloader = Downloader::new()
        .with_options(args.download_options())
        .with_boxed_format_selection(args.format.selection())
        .with_start(create_start_callback(formatter.clone()))
        .with_progress(create_progress_callback(formatter.clone()))
        .with_cancellation(cancel);

    let dir = downloader.prepare_output_dir().await?;
    formatter.print_download_target(platform, &dir);

    let outcome = downloader.download_to(platform, &args.url, &dir).await?;
    formatter.debug(&format!(
        "Wrote {} of {} declared bytes in {}",
        outcome.bytes,
        outcome.declared_size,
        format_duration(start_time.elapsed())
    ));

    formatter.print_download_complete(&outcome.path);
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Interrupt received, cancelling download");
        cancel.cancel();
    }
}

/// Initialize logging system
fn init_logging(verbosity: VerbosityLevel) {
    let default_level = match verbosity {
        VerbosityLevel::Verbose => "debug",
        _ => "warn",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
