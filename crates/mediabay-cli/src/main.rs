//! Mediabay CLI: run ingestion operations against the configured stores.
//!
//! Storage is configured from the environment (see `Config::from_env`). Results are
//! printed as JSON on stdout; logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediabay_core::{Config, ErrorMetadata, MediaError};
use mediabay_cli::{init_tracing, read_asset, read_assets};
use mediabay_processing::MediaIngestor;
use mediabay_storage::create_storage_gateway;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediabay", about = "Media ingestion CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize and store a batch of images
    UploadImages {
        /// Destination folder
        #[arg(long)]
        folder: String,
        /// Use the origin policy (12 MP cap, inverse-ratio quality)
        #[arg(long)]
        origin: bool,
        /// Image files, processed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Store GIF/JPEG/PNG/PDF files unchanged
    UploadFiles {
        #[arg(long)]
        folder: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Store a video and its first-frame thumbnail
    UploadVideo {
        #[arg(long)]
        folder: String,
        file: PathBuf,
    },
    /// List image keys under a prefix
    List {
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Remove image keys
    Remove {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Copy keys pairwise: --from a --from b --to c --to d
    Copy {
        #[arg(long = "from")]
        previous: Vec<String>,
        #[arg(long = "to")]
        next: Vec<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Report a pipeline error with its code before bailing out.
fn pipeline_error(err: MediaError) -> anyhow::Error {
    let body = serde_json::json!({
        "code": err.error_code(),
        "status": err.http_status_code(),
        "message": err.detailed_message(),
    });
    if let Err(e) = print_json(&body) {
        tracing::error!(error = %e, "Failed to print error");
    }
    anyhow::Error::new(err)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.log_format);
    config.validate()?;

    let storage = create_storage_gateway(&config)
        .await
        .context("Failed to initialize storage")?;
    let ingestor = MediaIngestor::from_config(storage, &config.processing);

    match cli.command {
        Commands::UploadImages {
            folder,
            origin,
            files,
        } => {
            let assets = read_assets(&files).await?;
            let keys = if origin {
                ingestor.upload_images_origin(assets, &folder).await
            } else {
                ingestor.upload_images(assets, &folder).await
            }
            .map_err(pipeline_error)?;
            print_json(&keys)?;
        }
        Commands::UploadFiles { folder, files } => {
            let assets = read_assets(&files).await?;
            let keys = ingestor
                .upload_files(assets, &folder)
                .await
                .map_err(pipeline_error)?;
            print_json(&keys)?;
        }
        Commands::UploadVideo { folder, file } => {
            let asset = read_asset(&file).await?;
            let upload = ingestor
                .upload_video(&folder, asset)
                .await
                .map_err(pipeline_error)?;
            print_json(&upload)?;
        }
        Commands::List { prefix } => {
            let listing = ingestor.list_images(&prefix).await.map_err(pipeline_error)?;
            print_json(&listing)?;
        }
        Commands::Remove { keys } => {
            let summary = ingestor.remove_images(&keys).await;
            print_json(&summary)?;
        }
        Commands::Copy { previous, next } => {
            let outcome = ingestor.copy_images(&previous, &next).await;
            print_json(&outcome)?;
        }
    }

    Ok(())
}
