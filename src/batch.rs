//! Concurrent batch uploads.
//!
//! [`IvClient::batch_upload`] runs every upload of a batch together but
//! admits at most `max_concurrent` of them into flight at once.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::client::IvClient;
use crate::error::{ApiError, ErrorCode};
use crate::models::FileUploadResponse;
use crate::time::Sleeper;
use crate::transport::{FileSource, HttpClient, MultipartForm};

/// Default number of uploads in flight at once.
pub const DEFAULT_MAX_CONCURRENT: usize = 3;

/// A file to upload, with optional metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadItem {
    /// File name reported to the server.
    pub file_name: String,
    /// Where the file contents come from.
    pub source: FileSource,
    /// Metadata sent alongside the file.
    pub metadata: Option<serde_json::Value>,
}

impl UploadItem {
    /// Uploads the file at `path`, streamed from disk when sent.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            file_name,
            source: FileSource::Path(path),
            metadata: None,
        }
    }

    /// Uploads in-memory `bytes` as `file_name`.
    #[must_use]
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            source: FileSource::Bytes(bytes),
            metadata: None,
        }
    }

    /// Attaches metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns the source path, if the file is read from disk.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(path) => Some(path),
            FileSource::Bytes(_) => None,
        }
    }

    /// Builds the upload form: `file`, then `metadata` when present.
    #[must_use]
    pub fn into_form(self) -> MultipartForm {
        let form = MultipartForm::new().with_file("file", self.file_name, self.source);
        match &self.metadata {
            Some(metadata) => form.with_field("metadata", metadata),
            None => form,
        }
    }
}

/// Result of one upload in a batch.
#[derive(Debug)]
pub struct UploadOutcome {
    /// Position of the item in the input.
    pub index: usize,
    /// Upload response or the error that ended the upload.
    pub result: Result<FileUploadResponse, ApiError>,
}

impl UploadOutcome {
    /// Returns true if the upload succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

impl<H: HttpClient, S: Sleeper> IvClient<H, S> {
    /// Uploads `items` with at most `max_concurrent` uploads in flight.
    ///
    /// Returns one outcome per item, in input order. A failed upload does
    /// not affect the others. `max_concurrent` of 0 is treated as 1.
    ///
    /// Dropping the returned future cancels the uploads that have not
    /// finished; admission permits are released either way.
    pub async fn batch_upload(
        &self,
        items: Vec<UploadItem>,
        max_concurrent: usize,
    ) -> Vec<UploadOutcome> {
        let limit = max_concurrent.max(1);
        let gate = Semaphore::new(limit);
        tracing::debug!(items = items.len(), max_concurrent = limit, "Starting batch upload");

        let uploads = items.into_iter().enumerate().map(|(index, item)| {
            let gate = &gate;
            async move {
                let result = match gate.acquire().await {
                    Ok(_permit) => self.upload_file(item).await,
                    Err(e) => Err(ApiError::new(
                        format!("Request failed: {e}"),
                        ErrorCode::REQUEST_FAILED,
                        0,
                    )),
                };
                if let Err(error) = &result {
                    tracing::warn!(index, %error, "Batch upload item failed");
                }
                UploadOutcome { index, result }
            }
        });

        join_all(uploads).await
    }
}
