//! `ims-upload` -- upload a folder of page images into one release.
//!
//! Every PNG/JPEG file in the folder is uploaded, sorted by file name, one
//! at a time. Each page is named after its file stem. Ctrl-C stops the
//! batch before the next file.
//!
//! Usage: `ims-upload <folder>` with `IMS_API_URL`, `IMS_PROJECT_ID` and
//! `IMS_RELEASE_ID` set (see [`UploadConfig`]).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ims_client::api::ApiClient;
use ims_client::config::UploadConfig;
use ims_client::upload::{ReleasePageSink, Stopped, UploadItem, UploadQueue};

const PAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ims_client=info,ims_upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "Upload failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let folder: PathBuf = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: ims-upload <folder>")?;
    let config = UploadConfig::from_env()?;

    let files = page_files(&folder).await?;
    if files.is_empty() {
        tracing::warn!(folder = %folder.display(), "No PNG or JPEG files found");
        return Ok(ExitCode::SUCCESS);
    }

    let client = ApiClient::new(config.api_url.clone());
    let release = client
        .get_release(config.project_id, config.release_id)
        .await
        .context("target release is not reachable")?;
    tracing::info!(
        release_id = release.id,
        chapter = %release.chapter,
        version = release.version,
        files = files.len(),
        "Uploading pages"
    );

    let mut queue = UploadQueue::new(ReleasePageSink {
        client,
        project_id: config.project_id,
        release_id: config.release_id,
    });
    for path in files {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        queue.push(UploadItem::file(name, path));
    }

    let cancel = queue.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Ctrl-C received, stopping after the current page");
            cancel.cancel();
        }
    });

    let report = queue.run().await;
    tracing::info!(
        uploaded = report.uploaded.len(),
        skipped = report.skipped.len(),
        "Upload finished"
    );

    Ok(match report.stopped {
        None => ExitCode::SUCCESS,
        Some(Stopped::Cancelled) => ExitCode::from(130),
        Some(Stopped::Failed { name, error }) => {
            tracing::error!(page = %name, error = %error, "Stopped at failing page");
            ExitCode::FAILURE
        }
    })
}

/// Image files directly inside `folder`, sorted by file name.
async fn page_files(folder: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(folder)
        .await
        .with_context(|| format!("cannot read folder {}", folder.display()))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_page = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| PAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if is_page && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
