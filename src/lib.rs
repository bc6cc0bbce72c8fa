//! IV Ingestion: async client SDK for the IV Ingestion API.
//!
//! Upload inspection documents, follow their processing, fetch structured
//! inspection results and manage webhooks. Requests are authenticated,
//! retried on transient transport failures with exponential backoff, and
//! every failure is reported as a single normalized [`ApiError`].
//!
//! # Example
//!
//! ```no_run
//! use iv_ingestion::{ClientConfig, IvClient, UploadItem};
//! use tokio_stream::StreamExt;
//!
//! # async fn example() -> Result<(), iv_ingestion::ApiError> {
//! let client = IvClient::new(ClientConfig::default().with_api_key("iv_live_123"));
//!
//! let upload = client.upload_file(UploadItem::from_path("report.pdf")).await?;
//! let mut progress = client.monitor_processing(&upload.data.file_id);
//! while let Some(snapshot) = progress.next().await {
//!     println!("{} {:.0}%", snapshot.status, snapshot.progress);
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod rate_limit;
pub mod retry;
pub mod signature;
pub mod time;
pub mod transport;

pub use batch::{UploadItem, UploadOutcome};
pub use client::{ClientConfig, IvClient, Payload};
pub use error::{ApiError, ErrorCode, ErrorDetail};
pub use monitor::ProcessingStream;
pub use rate_limit::RateLimitSnapshot;
pub use retry::RetryPolicy;
