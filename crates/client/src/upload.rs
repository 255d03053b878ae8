//! Sequential batch upload of page files.
//!
//! Items are processed strictly in submission order: item *n+1* is read
//! only after item *n*'s upload has resolved, so at most one file is held in
//! memory and at most one request per queue is in flight. The cancellation
//! token is checked before each item; an upload already sent is never
//! interrupted. Separate queues share nothing and may run concurrently.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ims_core::types::DbId;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::models::Page;

/// Destination of page uploads.
#[async_trait]
pub trait PageSink: Send + Sync {
    /// Upload one page. `data` is base64.
    async fn upload(&self, name: &str, data: String) -> Result<Page, ClientError>;
}

/// Uploads into one release through the HTTP API.
#[derive(Debug, Clone)]
pub struct ReleasePageSink {
    pub client: ApiClient,
    pub project_id: DbId,
    pub release_id: DbId,
}

#[async_trait]
impl PageSink for ReleasePageSink {
    async fn upload(&self, name: &str, data: String) -> Result<Page, ClientError> {
        self.client
            .upload_page(self.project_id, self.release_id, name, data)
            .await
    }
}

/// Where an item's bytes come from. Files are read when the item's turn
/// comes, not when it is queued.
#[derive(Debug, Clone)]
pub enum PageSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Page name sent to the server.
    pub name: String,
    pub source: PageSource,
}

impl UploadItem {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: PageSource::File(path.into()),
        }
    }

    pub fn bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            source: PageSource::Bytes(bytes),
        }
    }

    async fn load(self) -> Result<(String, Vec<u8>), ClientError> {
        let bytes = match self.source {
            PageSource::Bytes(bytes) => bytes,
            PageSource::File(path) => tokio::fs::read(&path)
                .await
                .map_err(|source| ClientError::Io { path, source })?,
        };
        Ok((self.name, bytes))
    }
}

/// Why a queue run ended before its last item.
#[derive(Debug)]
pub enum Stopped {
    Cancelled,
    Failed { name: String, error: ClientError },
}

/// Outcome of a queue run.
#[derive(Debug)]
pub struct UploadReport {
    /// Pages created, in submission order.
    pub uploaded: Vec<Page>,
    /// Names of items that were never attempted.
    pub skipped: Vec<String>,
    /// `None` when every item was uploaded.
    pub stopped: Option<Stopped>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }

    pub fn was_cancelled(&self) -> bool {
        matches!(self.stopped, Some(Stopped::Cancelled))
    }

    /// Collapse into the created pages or the reason the run stopped.
    pub fn into_result(self) -> Result<Vec<Page>, ClientError> {
        match self.stopped {
            None => Ok(self.uploaded),
            Some(Stopped::Cancelled) => Err(ClientError::Cancelled),
            Some(Stopped::Failed { error, .. }) => Err(error),
        }
    }
}

/// A batch of page uploads processed one at a time.
pub struct UploadQueue<S> {
    sink: S,
    items: Vec<UploadItem>,
    cancel: CancellationToken,
}

impl<S: PageSink> UploadQueue<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            items: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Append an item; submission order is upload order.
    pub fn push(&mut self, item: UploadItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Token that stops the queue before its next item.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Upload every item in order, stopping at the first failure or when
    /// cancelled.
    pub async fn run(self) -> UploadReport {
        let total = self.items.len();
        let mut uploaded = Vec::with_capacity(total);
        let mut items = self.items.into_iter();

        while let Some(item) = items.next() {
            let name = item.name.clone();

            if self.cancel.is_cancelled() {
                tracing::info!(done = uploaded.len(), total, "Upload queue cancelled");
                return UploadReport {
                    uploaded,
                    skipped: std::iter::once(name)
                        .chain(items.map(|i| i.name))
                        .collect(),
                    stopped: Some(Stopped::Cancelled),
                };
            }

            let result = match item.load().await {
                Ok((name, bytes)) => self.sink.upload(&name, STANDARD.encode(bytes)).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(page) => {
                    tracing::info!(
                        page_id = page.id,
                        name = %page.name,
                        done = uploaded.len() + 1,
                        total,
                        "Page uploaded"
                    );
                    uploaded.push(page);
                }
                Err(e) => {
                    tracing::error!(name = %name, error = %e, "Page upload failed");
                    return UploadReport {
                        uploaded,
                        skipped: items.map(|i| i.name).collect(),
                        stopped: Some(Stopped::Failed { name, error: e }),
                    };
                }
            }
        }

        UploadReport {
            uploaded,
            skipped: Vec::new(),
            stopped: None,
        }
    }
}
