//! Command execution.
//!
//! Each subcommand maps onto one or two [`IvClient`] calls; results are
//! printed to stdout as pretty JSON or short progress lines.

use std::path::{Path, PathBuf};

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tokio::signal;
use tokio_stream::StreamExt;

use iv_ingestion::config::{Command, InspectionsArgs, UploadArgs, ValidatedConfig, WebhookCommand};
use iv_ingestion::models::{
    InspectionQuery, LoginRequest, ProcessingStatus, ProgressSnapshot, WebhookCreateRequest,
};
use iv_ingestion::{ApiError, IvClient, UploadItem, UploadOutcome, signature};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for command execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A local input file could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    ReadFile {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A downloaded file could not be written.
    #[error("Failed to write '{}': {source}", path.display())]
    WriteFile {
        /// File that was written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// `--metadata` is not valid JSON.
    #[error("Invalid metadata JSON: {0}")]
    InvalidMetadata(#[source] serde_json::Error),

    /// A result could not be rendered as JSON.
    #[error("Failed to render output: {0}")]
    Output(#[source] serde_json::Error),

    /// Some uploads in a batch failed.
    #[error("{failed} of {total} upload(s) failed")]
    UploadsFailed {
        /// Number of failed uploads
        failed: usize,
        /// Number of files in the batch
        total: usize,
    },

    /// A watched file finished processing with status `failed`.
    #[error("Processing of file {file_id} failed")]
    ProcessingFailed {
        /// File whose processing failed
        file_id: String,
    },

    /// Ctrl+C arrived while following processing.
    #[error("Interrupted")]
    Interrupted,
}

/// Runs `command` against the API described by `config`.
///
/// # Errors
///
/// Returns the first error that ends the command.
pub async fn execute(config: ValidatedConfig, command: Command) -> Result<(), RunError> {
    let client = IvClient::new(config.client);
    let result = dispatch(&client, command).await;
    client.close();
    result
}

async fn dispatch(client: &IvClient, command: Command) -> Result<(), RunError> {
    match command {
        // Handled before the config is loaded
        Command::Init { .. } => Ok(()),
        Command::Health => print_json(&client.health().await?),
        Command::Login {
            email,
            password,
            remember_me,
        } => {
            let request = LoginRequest {
                remember_me,
                ..LoginRequest::new(email, password)
            };
            let response = client.login(&request).await?;
            print_json(&response.data)
        }
        Command::Upload(args) => upload(client, args).await,
        Command::Status { file_id } => print_json(&client.get_file_status(&file_id).await?),
        Command::Watch { file_id } => watch_all(client, vec![file_id]).await,
        Command::Download { file_id, output } => download(client, &file_id, output).await,
        Command::Inspections(args) => {
            let query = inspection_query(args);
            print_json(&client.list_inspections(&query).await?)
        }
        Command::Inspection { inspection_id } => {
            print_json(&client.get_inspection(&inspection_id).await?)
        }
        Command::Webhooks { action } => webhooks(client, action).await,
        Command::Metrics => print_json(&client.get_admin_metrics().await?),
        Command::Queues => print_json(&client.get_queue_status().await?),
        Command::VerifyWebhook {
            payload,
            signature: header,
            secret,
        } => verify_webhook(&payload, &header, &secret).await,
    }
}

/// Uploads the given files as one batch and optionally follows them.
async fn upload(client: &IvClient, args: UploadArgs) -> Result<(), RunError> {
    let metadata = args
        .metadata
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .map_err(RunError::InvalidMetadata)?;

    let items = build_upload_items(&args.files, metadata.as_ref());
    let total = items.len();
    tracing::info!("Uploading {total} file(s), at most {} at a time", args.max_concurrent);

    let outcomes = client.batch_upload(items, args.max_concurrent).await;
    let uploaded = report_outcomes(&args.files, &outcomes);

    let failed = total - uploaded.len();

    if args.watch && !uploaded.is_empty() {
        watch_all(client, uploaded).await?;
    }

    if failed > 0 {
        return Err(RunError::UploadsFailed { failed, total });
    }
    Ok(())
}

fn build_upload_items(files: &[PathBuf], metadata: Option<&serde_json::Value>) -> Vec<UploadItem> {
    files
        .iter()
        .map(|path| {
            let item = UploadItem::from_path(path);
            match metadata {
                Some(metadata) => item.with_metadata(metadata.clone()),
                None => item,
            }
        })
        .collect()
}

/// Prints one line per outcome and returns the ids of the uploaded files.
fn report_outcomes(files: &[PathBuf], outcomes: &[UploadOutcome]) -> Vec<String> {
    let mut uploaded = Vec::new();

    for outcome in outcomes {
        let name = files
            .get(outcome.index)
            .map_or_else(|| outcome.index.to_string(), |p| p.display().to_string());

        match &outcome.result {
            Ok(response) => {
                println!("{name}: uploaded as {}", response.data.file_id);
                uploaded.push(response.data.file_id.clone());
            }
            Err(e) => eprintln!("{name}: {e}"),
        }
    }

    uploaded
}

/// Follows every file until it reaches a terminal status or Ctrl+C arrives.
async fn watch_all(client: &IvClient, file_ids: Vec<String>) -> Result<(), RunError> {
    let follows = join_all(file_ids.iter().map(|id| follow(client, id)));

    let finals = tokio::select! {
        biased;

        () = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping...");
            return Err(RunError::Interrupted);
        }

        finals = follows => finals,
    };

    match finals
        .into_iter()
        .flatten()
        .find(|snapshot| snapshot.status == ProcessingStatus::Failed)
    {
        Some(snapshot) => Err(RunError::ProcessingFailed {
            file_id: snapshot.file_id,
        }),
        None => Ok(()),
    }
}

/// Prints every snapshot of `file_id` and returns the last one.
async fn follow(client: &IvClient, file_id: &str) -> Option<ProgressSnapshot> {
    let mut stream = client.monitor_processing(file_id);
    let mut last = None;

    while let Some(snapshot) = stream.next().await {
        println!("{}", progress_line(&snapshot));
        last = Some(snapshot);
    }

    last
}

fn progress_line(snapshot: &ProgressSnapshot) -> String {
    let mut line = format!(
        "{}: {} {:.0}% ({})",
        snapshot.file_id, snapshot.status, snapshot.progress, snapshot.current_step
    );
    if !snapshot.is_terminal() && snapshot.estimated_time_remaining > 0.0 {
        line.push_str(&format!(", ~{:.0}s left", snapshot.estimated_time_remaining));
    }
    line
}

async fn download(client: &IvClient, file_id: &str, output: PathBuf) -> Result<(), RunError> {
    let bytes = client.download_file(file_id).await?;

    tokio::fs::write(&output, &bytes)
        .await
        .map_err(|source| RunError::WriteFile {
            path: output.clone(),
            source,
        })?;

    println!("Wrote {} byte(s) to {}", bytes.len(), output.display());
    Ok(())
}

fn inspection_query(args: InspectionsArgs) -> InspectionQuery {
    InspectionQuery {
        page: args.page,
        limit: args.limit,
        status: args.status.map(Into::into),
        date_from: args.date_from,
        date_to: args.date_to,
    }
}

async fn webhooks(client: &IvClient, action: WebhookCommand) -> Result<(), RunError> {
    match action {
        WebhookCommand::List => print_json(&client.list_webhooks().await?.data.webhooks),
        WebhookCommand::Create {
            url,
            events,
            description,
        } => {
            let request = WebhookCreateRequest {
                url,
                events,
                description,
            };
            print_json(&client.create_webhook(&request).await?)
        }
        WebhookCommand::Delete { webhook_id } => {
            client.delete_webhook(&webhook_id).await?;
            println!("Deleted webhook {webhook_id}");
            Ok(())
        }
    }
}

async fn verify_webhook(payload: &Path, header: &str, secret: &str) -> Result<(), RunError> {
    let body = tokio::fs::read(payload)
        .await
        .map_err(|source| RunError::ReadFile {
            path: payload.to_path_buf(),
            source,
        })?;

    let event = signature::parse_and_verify(&body, header, secret)?;
    println!("Signature valid");
    print_json(&event)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), RunError> {
    let rendered = serde_json::to_string_pretty(value).map_err(RunError::Output)?;
    println!("{rendered}");
    Ok(())
}

/// Returns a future that completes when a shutdown signal is received.
///
/// If the handler cannot be installed the future never completes.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
}
