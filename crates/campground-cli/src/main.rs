//! Campground CLI: upload images to a campground from the command line.
//!
//! Configuration comes from the environment (or `.env`): storage settings,
//! CAMPGROUND_API_URL / CAMPGROUND_API_KEY for the campground API, and
//! CAMPGROUND_USER_ID for uploads to a campground that does not exist yet.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use campground_api_client::{ApiClient, HttpImageRecorder};
use campground_cli::{init_tracing, load_candidates, run_upload, UploadReport};
use campground_core::models::{SessionUser, UploadTarget};
use campground_core::{
    Config, ImageRecorder, NoOpImageRecorder, RecordingMode, SessionProvider,
    StaticSessionProvider,
};
use campground_storage::create_storage;
use campground_upload::UploadSessionManager;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "campground", about = "Campground image upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload images to an existing campground
    Upload {
        /// Campground id
        #[arg(long)]
        campground: i64,
        /// Submit the whole image list at the end instead of recording each upload
        #[arg(long)]
        manual: bool,
        /// Image files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Upload images for a campground that is still being created
    UploadNew {
        /// Image files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize report")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage")?;
    let session: Arc<dyn SessionProvider> = Arc::new(StaticSessionProvider::new(
        config.user_id.map(SessionUser::new),
    ));

    let report = match cli.command {
        Commands::Upload {
            campground,
            manual,
            files,
        } => {
            let mode = if manual {
                RecordingMode::Manual
            } else {
                config.recording_mode
            };
            let client = ApiClient::from_config(&config)
                .context("Failed to create API client. Set CAMPGROUND_API_URL")?;
            let existing = client.list_campground_images(campground).await?;

            let recorder: Arc<dyn ImageRecorder> = match mode {
                RecordingMode::Auto => Arc::new(HttpImageRecorder::new(client.clone())),
                RecordingMode::Manual => Arc::new(NoOpImageRecorder),
            };
            let manager = UploadSessionManager::new(
                UploadTarget::Existing(campground),
                &config.limits,
                mode,
                storage,
                recorder,
                session.clone(),
            )
            .with_existing_images(existing);

            let candidates = load_candidates(&files, config.limits.max_file_size_bytes).await?;
            let report = run_upload(&manager, candidates).await;

            if mode == RecordingMode::Manual && !report.uploaded.is_empty() {
                client
                    .update_campground_images(campground, &manager.images_update())
                    .await?;
                tracing::info!(
                    campground_id = campground,
                    images = report.images.len(),
                    "Image list submitted"
                );
            }
            report
        }
        Commands::UploadNew { files } => {
            if session.current().is_none() {
                tracing::warn!("CAMPGROUND_USER_ID not set; uploads will fail");
            }
            let manager = UploadSessionManager::new(
                UploadTarget::New,
                &config.limits,
                RecordingMode::Manual,
                storage,
                Arc::new(NoOpImageRecorder),
                session.clone(),
            );

            let candidates = load_candidates(&files, config.limits.max_file_size_bytes).await?;
            run_upload(&manager, candidates).await
        }
    };

    session.teardown();
    finish(report)
}

fn finish(report: UploadReport) -> anyhow::Result<()> {
    print_json(&report)?;
    if report.has_failures() {
        anyhow::bail!("{} file(s) could not be uploaded", report.failed.len());
    }
    Ok(())
}
