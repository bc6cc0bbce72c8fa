//! Typed API operations.

use std::collections::HashMap;

use http::Method;

use super::{IvClient, Payload};
use crate::batch::UploadItem;
use crate::error::ApiError;
use crate::models::{
    AdminMetrics, AdminQueuesResponse, Envelope, FileStatusResponse, FileUploadResponse,
    HealthStatusResponse, InspectionDetail, InspectionQuery, InspectionsListResponse,
    LoginRequest, LoginResponse, ProgressSnapshot, RegisterRequest, User, Webhook,
    WebhookCreateRequest, WebhookPayload, WebhooksListResponse,
};
use crate::monitor::{ProcessingStream, ProgressSource};
use crate::signature;
use crate::time::Sleeper;
use crate::transport::HttpClient;

impl<H: HttpClient, S: Sleeper> IvClient<H, S> {
    /// Checks API health (`GET /health`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn health(&self) -> Result<HealthStatusResponse, ApiError> {
        self.request_json(Method::GET, "/health", Payload::Empty)
            .await
    }

    /// Logs in (`POST /auth/login`) and stores the returned token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self
            .request_json(Method::POST, "/auth/login", Payload::json(credentials)?)
            .await?;
        self.store_token(&response);
        Ok(response)
    }

    /// Registers an account (`POST /auth/register`) and stores the returned token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn register(&self, account: &RegisterRequest) -> Result<LoginResponse, ApiError> {
        let response: LoginResponse = self
            .request_json(Method::POST, "/auth/register", Payload::json(account)?)
            .await?;
        self.store_token(&response);
        Ok(response)
    }

    fn store_token(&self, response: &LoginResponse) {
        if let Some(token) = &response.data.token {
            self.set_token(Some(token.clone()));
        }
    }

    /// Returns the authenticated user (`GET /auth/me`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn get_current_user(&self) -> Result<User, ApiError> {
        let envelope: Envelope<User> = self
            .request_json(Method::GET, "/auth/me", Payload::Empty)
            .await?;
        Ok(envelope.data)
    }

    /// Uploads a file for processing (`POST /files/upload`).
    ///
    /// The form carries the file as `file` and, when present, the metadata
    /// as a JSON-encoded `metadata` field.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn upload_file(&self, item: UploadItem) -> Result<FileUploadResponse, ApiError> {
        self.request_json(
            Method::POST,
            "/files/upload",
            Payload::Multipart(item.into_form()),
        )
        .await
    }

    /// Returns the processing status of a file (`GET /files/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn get_file_status(&self, file_id: &str) -> Result<FileStatusResponse, ApiError> {
        self.request_json(Method::GET, &format!("/files/{file_id}"), Payload::Empty)
            .await
    }

    /// Downloads the processed file (`GET /files/{id}/download`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .execute(
                Method::GET,
                &format!("/files/{file_id}/download"),
                Payload::Empty,
            )
            .await?;
        Ok(response.body)
    }

    /// Lists inspections (`GET /inspections`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn list_inspections(
        &self,
        query: &InspectionQuery,
    ) -> Result<InspectionsListResponse, ApiError> {
        self.request_json(
            Method::GET,
            &path_with_query("/inspections", query.to_pairs()),
            Payload::Empty,
        )
        .await
    }

    /// Returns an inspection with its findings (`GET /inspections/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn get_inspection(&self, inspection_id: &str) -> Result<InspectionDetail, ApiError> {
        let envelope: Envelope<InspectionDetail> = self
            .request_json(
                Method::GET,
                &format!("/inspections/{inspection_id}"),
                Payload::Empty,
            )
            .await?;
        Ok(envelope.data)
    }

    /// Registers a webhook (`POST /webhooks`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn create_webhook(&self, webhook: &WebhookCreateRequest) -> Result<Webhook, ApiError> {
        let envelope: Envelope<Webhook> = self
            .request_json(Method::POST, "/webhooks", Payload::json(webhook)?)
            .await?;
        Ok(envelope.data)
    }

    /// Lists registered webhooks (`GET /webhooks`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn list_webhooks(&self) -> Result<WebhooksListResponse, ApiError> {
        self.request_json(Method::GET, "/webhooks", Payload::Empty)
            .await
    }

    /// Deletes a webhook (`DELETE /webhooks/{id}`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<(), ApiError> {
        self.execute(
            Method::DELETE,
            &format!("/webhooks/{webhook_id}"),
            Payload::Empty,
        )
        .await?;
        Ok(())
    }

    /// Returns service metrics (`GET /admin/metrics`, admin only).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn get_admin_metrics(&self) -> Result<AdminMetrics, ApiError> {
        let envelope: Envelope<AdminMetrics> = self
            .request_json(Method::GET, "/admin/metrics", Payload::Empty)
            .await?;
        Ok(envelope.data)
    }

    /// Returns processing queue state (`GET /admin/queues`, admin only).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails.
    pub async fn get_queue_status(&self) -> Result<AdminQueuesResponse, ApiError> {
        self.request_json(Method::GET, "/admin/queues", Payload::Empty)
            .await
    }

    /// Streams processing progress of `file_id` until it completes or fails.
    ///
    /// Every snapshot is also stored in the status cache. Dropping the
    /// stream stops polling.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use iv_ingestion::{ClientConfig, IvClient};
    /// use tokio_stream::StreamExt;
    ///
    /// # async fn example() {
    /// let client = IvClient::new(ClientConfig::default().with_api_key("iv_live_123"));
    /// let mut progress = client.monitor_processing("file-123");
    /// while let Some(snapshot) = progress.next().await {
    ///     println!("{}: {:.0}% ({})", snapshot.status, snapshot.progress, snapshot.current_step);
    /// }
    /// # }
    /// ```
    #[must_use]
    pub fn monitor_processing(&self, file_id: &str) -> ProcessingStream<'_, Self, S> {
        ProcessingStream::new(
            self,
            &self.sleeper,
            &self.statuses,
            file_id,
            self.config.debug,
        )
    }
}

impl<H: HttpClient, S: Sleeper> ProgressSource for IvClient<H, S> {
    async fn fetch_progress(&self, file_id: &str) -> Result<ProgressSnapshot, ApiError> {
        let status = self.get_file_status(file_id).await?;
        Ok(ProgressSnapshot::from_status(file_id, status.data))
    }
}

impl<H, S> IvClient<H, S> {
    /// Returns the latest cached progress of `file_id`.
    #[must_use]
    pub fn get_processing_status(&self, file_id: &str) -> Option<ProgressSnapshot> {
        self.statuses.get(file_id)
    }

    /// Returns every cached progress snapshot, keyed by file id.
    #[must_use]
    pub fn get_all_processing_statuses(&self) -> HashMap<String, ProgressSnapshot> {
        self.statuses.all()
    }

    /// Removes the cached progress of `file_id`.
    pub fn forget_processing_status(&self, file_id: &str) -> Option<ProgressSnapshot> {
        self.statuses.forget(file_id)
    }

    /// Empties the status cache.
    pub fn clear_processing_statuses(&self) {
        self.statuses.clear();
    }

    /// Returns true if `signature` is the valid signature of `payload`.
    ///
    /// See [`signature::verify_signature`].
    #[must_use]
    pub fn verify_webhook_signature(&self, payload: &[u8], signature: &str, secret: &str) -> bool {
        signature::verify_signature(payload, signature, secret)
    }

    /// Verifies and decodes a webhook delivery.
    ///
    /// # Errors
    ///
    /// See [`signature::parse_and_verify`].
    pub fn parse_webhook_payload(
        &self,
        payload: &[u8],
        signature: &str,
        secret: &str,
    ) -> Result<WebhookPayload, ApiError> {
        signature::parse_and_verify(payload, signature, secret)
    }
}

/// Appends the url-encoded `pairs` to `path`, leaving it bare when there are none.
pub(super) fn path_with_query<K, V>(path: &str, pairs: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}
