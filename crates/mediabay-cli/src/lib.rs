use anyhow::Context;
use mediabay_processing::RawAsset;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI. `log_format` of `json` switches to JSON lines.
pub fn init_tracing(log_format: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mediabay=info"));

    let registry = tracing_subscriber::registry().with(filter);
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Name a file is uploaded under: the last path component.
pub fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Read each path into a [`RawAsset`], in order.
pub async fn read_assets(paths: &[PathBuf]) -> anyhow::Result<Vec<RawAsset>> {
    let mut assets = Vec::with_capacity(paths.len());
    for path in paths {
        assets.push(read_asset(path).await?);
    }
    Ok(assets)
}

pub async fn read_asset(path: &Path) -> anyhow::Result<RawAsset> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(RawAsset::new(upload_name(path), data))
}
