//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::models::{InspectionStatus, WebhookEventType};

/// IV Ingestion: command-line client for the IV Ingestion API
///
/// Uploads inspection documents, follows their processing, and manages
/// inspections and webhooks.
#[derive(Debug, Parser)]
#[command(name = "iv-ingestion")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// API base URL
    #[arg(long = "base-url", env = "IV_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// API key sent as X-API-Key
    #[arg(long = "api-key", env = "IV_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Bearer token (takes precedence over the API key)
    #[arg(long, env = "IV_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Maximum number of retries after a transport failure
    #[arg(long = "retry-max", global = true)]
    pub retry_max: Option<u32>,

    /// Delay before the first retry in seconds (doubled for each retry)
    #[arg(long = "retry-delay", global = true)]
    pub retry_delay: Option<f64>,

    /// Extra HTTP headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V", global = true)]
    pub headers: Vec<String>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log every API request and response
    #[arg(long, global = true)]
    pub debug: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for iv-ingestion
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path (default: the user config directory)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Check API health
    Health,

    /// Log in and print the issued token
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "IV_PASSWORD", hide_env_values = true)]
        password: String,

        /// Request a long-lived session
        #[arg(long = "remember-me")]
        remember_me: bool,
    },

    /// Upload one or more files
    Upload(UploadArgs),

    /// Show the processing status of a file
    Status {
        /// File id
        file_id: String,
    },

    /// Follow the processing of a file until it completes or fails
    Watch {
        /// File id
        file_id: String,
    },

    /// Download a processed file
    Download {
        /// File id
        file_id: String,

        /// Where to write the file
        #[arg(long, short)]
        output: PathBuf,
    },

    /// List inspections
    Inspections(InspectionsArgs),

    /// Show an inspection with its findings
    Inspection {
        /// Inspection id
        inspection_id: String,
    },

    /// Manage webhooks
    Webhooks {
        /// Webhook action
        #[command(subcommand)]
        action: WebhookCommand,
    },

    /// Show service metrics (admin only)
    Metrics,

    /// Show processing queues (admin only)
    Queues,

    /// Verify a webhook delivery against its signature
    VerifyWebhook {
        /// File holding the raw request body
        payload: PathBuf,

        /// Value of the signature header
        #[arg(long)]
        signature: String,

        /// Webhook secret
        #[arg(long, env = "IV_WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,
    },
}

/// Arguments of `upload`.
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// JSON metadata attached to every file
    #[arg(long)]
    pub metadata: Option<String>,

    /// Maximum number of uploads in flight
    #[arg(long = "max-concurrent", default_value_t = super::defaults::MAX_CONCURRENT_UPLOADS)]
    pub max_concurrent: usize,

    /// Follow processing of each uploaded file until it finishes
    #[arg(long)]
    pub watch: bool,
}

/// Arguments of `inspections`.
#[derive(Debug, Args)]
pub struct InspectionsArgs {
    /// Page number
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Page size
    #[arg(long, default_value_t = crate::models::InspectionQuery::DEFAULT_LIMIT)]
    pub limit: u32,

    /// Only inspections in this state
    #[arg(long, value_enum)]
    pub status: Option<InspectionStatusArg>,

    /// Earliest inspection date (YYYY-MM-DD)
    #[arg(long = "date-from")]
    pub date_from: Option<String>,

    /// Latest inspection date (YYYY-MM-DD)
    #[arg(long = "date-to")]
    pub date_to: Option<String>,
}

/// Webhook subcommands.
#[derive(Debug, Subcommand)]
pub enum WebhookCommand {
    /// List registered webhooks
    List,

    /// Register a webhook
    Create {
        /// Delivery URL
        url: String,

        /// Event to subscribe to (can be specified multiple times)
        #[arg(long = "event", required = true, value_parser = parse_event)]
        events: Vec<WebhookEventType>,

        /// Description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a webhook
    Delete {
        /// Webhook id
        webhook_id: String,
    },
}

/// Inspection status argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectionStatusArg {
    /// Waiting for processing
    Pending,
    /// Being processed
    Processing,
    /// Done
    Completed,
    /// Failed
    Failed,
}

impl From<InspectionStatusArg> for InspectionStatus {
    fn from(arg: InspectionStatusArg) -> Self {
        match arg {
            InspectionStatusArg::Pending => Self::Pending,
            InspectionStatusArg::Processing => Self::Processing,
            InspectionStatusArg::Completed => Self::Completed,
            InspectionStatusArg::Failed => Self::Failed,
        }
    }
}

fn parse_event(value: &str) -> Result<WebhookEventType, String> {
    WebhookEventType::from_name(value).ok_or_else(|| {
        let known: Vec<_> = WebhookEventType::ALL.iter().map(|e| e.as_str()).collect();
        format!("unknown event '{value}', expected one of: {}", known.join(", "))
    })
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Command::Init { .. })
    }
}
