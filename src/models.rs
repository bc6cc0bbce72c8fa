//! Wire models for the IV Ingestion API.
//!
//! Field names follow the API's camelCase JSON. Payloads documented as
//! open-ended objects are kept as [`serde_json::Value`] maps.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON object with arbitrary keys.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Standard success envelope: `{success, timestamp, data}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the server reports success.
    #[serde(default = "default_true")]
    pub success: bool,
    /// Server timestamp, if provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Response payload.
    pub data: T,
}

const fn default_true() -> bool {
    true
}

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user.
    User,
    /// Administrator.
    Admin,
    /// Inspector.
    Inspector,
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id.
    pub id: String,
    /// Email address.
    pub email: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Role.
    pub role: UserRole,
    /// Whether the email has been verified.
    pub is_email_verified: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Request a long-lived session.
    #[serde(default)]
    pub remember_me: bool,
}

impl LoginRequest {
    /// Creates a login request without "remember me".
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            remember_me: false,
        }
    }
}

/// Account details for `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
}

/// Payload of a login or registration response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    /// Authenticated user, when returned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Bearer token for subsequent requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Refresh token, when issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Response of login and registration.
pub type LoginResponse = Envelope<AuthData>;

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// Received, not yet picked up.
    Uploaded,
    /// Being processed.
    Processing,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl ProcessingStatus {
    /// Returns true for states after which the status never changes.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of `POST /files/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Id used to track the file.
    #[serde(alias = "id")]
    pub file_id: String,
    /// Initial processing status, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProcessingStatus>,
    /// Any other fields returned by the server.
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Response of `POST /files/upload`.
pub type FileUploadResponse = Envelope<UploadedFile>;

/// Payload of `GET /files/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatusData {
    /// Processing status.
    pub status: ProcessingStatus,
    /// Progress percentage, 0 to 100.
    #[serde(default)]
    pub progress: f64,
    /// Current processing step.
    #[serde(default = "unknown_step")]
    pub current_step: String,
    /// Estimated seconds until completion.
    #[serde(default)]
    pub estimated_time_remaining: f64,
    /// Any other fields returned by the server.
    #[serde(flatten)]
    pub extra: JsonObject,
}

fn unknown_step() -> String {
    "Unknown".to_string()
}

/// Response of `GET /files/{id}`.
pub type FileStatusResponse = Envelope<FileStatusData>;

/// One observation of a file's processing progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// File being processed.
    pub file_id: String,
    /// Processing status.
    pub status: ProcessingStatus,
    /// Progress percentage, 0 to 100.
    pub progress: f64,
    /// Current processing step.
    pub current_step: String,
    /// Estimated seconds until completion.
    pub estimated_time_remaining: f64,
}

impl ProgressSnapshot {
    /// Builds a snapshot from a file status payload.
    #[must_use]
    pub fn from_status(file_id: impl Into<String>, data: FileStatusData) -> Self {
        Self {
            file_id: file_id.into(),
            status: data.status,
            progress: data.progress,
            current_step: data.current_step,
            estimated_time_remaining: data.estimated_time_remaining,
        }
    }

    /// Returns true if the snapshot is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Finding category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingCategory {
    /// Electrical.
    Electrical,
    /// Plumbing.
    Plumbing,
    /// Structural.
    Structural,
    /// HVAC.
    Hvac,
    /// Roofing.
    Roofing,
    /// Interior.
    Interior,
    /// Exterior.
    Exterior,
    /// Safety.
    Safety,
    /// Anything else.
    Other,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingSeverity {
    /// Minor.
    Minor,
    /// Major.
    Major,
    /// Critical.
    Critical,
}

/// A single inspection finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Finding id.
    pub id: String,
    /// Category.
    pub category: FindingCategory,
    /// Severity.
    pub severity: FindingSeverity,
    /// Short title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Location in the property.
    pub location: String,
    /// Estimated repair cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    /// Priority, 1 to 10.
    pub priority: u8,
}

/// Property type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// Residential.
    Residential,
    /// Commercial.
    Commercial,
    /// Industrial.
    Industrial,
}

/// An inspected property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Property id.
    pub id: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// State.
    pub state: String,
    /// ZIP code.
    pub zip_code: String,
    /// Property type.
    pub property_type: PropertyType,
    /// Floor area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<u32>,
    /// Construction year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<u16>,
}

/// Inspection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectionStatus {
    /// Waiting.
    Pending,
    /// Being processed.
    Processing,
    /// Done.
    Completed,
    /// Failed.
    Failed,
}

impl InspectionStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Inspection summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    /// Inspection id.
    pub id: String,
    /// Inspected property id.
    pub property_id: String,
    /// State.
    pub status: InspectionStatus,
    /// When the inspection took place.
    pub inspection_date: DateTime<Utc>,
    /// When processing completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Number of findings.
    pub findings_count: u32,
    /// Number of critical findings.
    pub critical_findings: u32,
    /// Number of major findings.
    pub major_findings: u32,
    /// Number of minor findings.
    pub minor_findings: u32,
    /// Total estimated repair cost.
    pub estimated_cost: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Inspection with its findings and property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionDetail {
    /// Summary fields.
    #[serde(flatten)]
    pub inspection: Inspection,
    /// All findings.
    pub findings: Vec<Finding>,
    /// The inspected property.
    pub property: Property,
}

/// Pagination info of list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page, 1-based.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total number of items.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u32,
}

/// Payload of `GET /inspections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionList {
    /// Inspections on this page.
    pub inspections: Vec<Inspection>,
    /// Pagination info.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Response of `GET /inspections`.
pub type InspectionsListResponse = Envelope<InspectionList>;

/// Filters for `GET /inspections`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionQuery {
    /// Page number, 1-based.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Only inspections in this state.
    pub status: Option<InspectionStatus>,
    /// Inclusive lower date bound (`YYYY-MM-DD`).
    pub date_from: Option<String>,
    /// Inclusive upper date bound (`YYYY-MM-DD`).
    pub date_to: Option<String>,
}

impl InspectionQuery {
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 20;

    /// Returns the query as ordered `(name, value)` pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(from) = &self.date_from {
            pairs.push(("dateFrom", from.clone()));
        }
        if let Some(to) = &self.date_to {
            pairs.push(("dateTo", to.clone()));
        }
        pairs
    }
}

impl Default for InspectionQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
            status: None,
            date_from: None,
            date_to: None,
        }
    }
}

/// Webhook event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookEventType {
    /// Processing started.
    #[serde(rename = "processing.started")]
    ProcessingStarted,
    /// Processing progressed.
    #[serde(rename = "processing.progress")]
    ProcessingProgress,
    /// Processing completed.
    #[serde(rename = "processing.completed")]
    ProcessingCompleted,
    /// Processing failed.
    #[serde(rename = "processing.failed")]
    ProcessingFailed,
    /// Inspection created.
    #[serde(rename = "inspection.created")]
    InspectionCreated,
    /// Inspection updated.
    #[serde(rename = "inspection.updated")]
    InspectionUpdated,
    /// Finding added.
    #[serde(rename = "finding.added")]
    FindingAdded,
    /// User registered.
    #[serde(rename = "user.registered")]
    UserRegistered,
}

impl WebhookEventType {
    /// All known event types.
    pub const ALL: [Self; 8] = [
        Self::ProcessingStarted,
        Self::ProcessingProgress,
        Self::ProcessingCompleted,
        Self::ProcessingFailed,
        Self::InspectionCreated,
        Self::InspectionUpdated,
        Self::FindingAdded,
        Self::UserRegistered,
    ];

    /// Returns the wire name of the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProcessingStarted => "processing.started",
            Self::ProcessingProgress => "processing.progress",
            Self::ProcessingCompleted => "processing.completed",
            Self::ProcessingFailed => "processing.failed",
            Self::InspectionCreated => "inspection.created",
            Self::InspectionUpdated => "inspection.updated",
            Self::FindingAdded => "finding.added",
            Self::UserRegistered => "user.registered",
        }
    }

    /// Looks up an event type by wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    /// Webhook id.
    pub id: String,
    /// Delivery URL.
    pub url: String,
    /// Subscribed events.
    pub events: Vec<WebhookEventType>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether deliveries are enabled.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last delivery time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_triggered: Option<DateTime<Utc>>,
}

/// Body of `POST /webhooks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookCreateRequest {
    /// Delivery URL.
    pub url: String,
    /// Events to subscribe to.
    pub events: Vec<WebhookEventType>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payload of `GET /webhooks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookList {
    /// Registered webhooks.
    pub webhooks: Vec<Webhook>,
}

/// Response of `GET /webhooks`.
pub type WebhooksListResponse = Envelope<WebhookList>;

/// An inbound webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// Event type.
    pub event: WebhookEventType,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// Event data.
    pub data: JsonObject,
    /// Signature embedded by the sender, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Overall service health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All good.
    Healthy,
    /// Partially available.
    Degraded,
    /// Unavailable.
    Unhealthy,
}

/// Payload of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthData {
    /// Overall status.
    pub status: HealthStatus,
    /// Per-service details and anything else reported.
    #[serde(flatten)]
    pub extra: JsonObject,
}

/// Response of `GET /health`.
pub type HealthStatusResponse = Envelope<HealthData>;

/// Payload of `GET /admin/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMetrics {
    /// Files processed per period.
    pub files_processed: JsonObject,
    /// Queue depth per queue.
    pub queue_depth: JsonObject,
    /// Error rates.
    pub error_rate: JsonObject,
    /// Active users per period.
    pub active_users: JsonObject,
    /// Processing throughput.
    pub processing_rate: JsonObject,
}

/// Queue worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueWorkerStatus {
    /// Waiting for work.
    Idle,
    /// Processing a job.
    Working,
    /// Failed.
    Error,
}

/// A queue worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueWorker {
    /// Worker id.
    pub id: String,
    /// State.
    pub status: QueueWorkerStatus,
    /// Job in progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_job: Option<String>,
    /// Jobs completed.
    pub processed_jobs: u64,
    /// Jobs failed.
    pub failed_jobs: u64,
    /// Uptime in seconds.
    pub uptime: u64,
    /// Last heartbeat.
    pub last_heartbeat: DateTime<Utc>,
}

/// State of one processing queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    /// Queue name.
    pub name: String,
    /// Jobs waiting.
    pub waiting: u64,
    /// Jobs running.
    pub active: u64,
    /// Jobs completed.
    pub completed: u64,
    /// Jobs failed.
    pub failed: u64,
    /// Jobs delayed.
    pub delayed: u64,
    /// Workers serving the queue.
    #[serde(default)]
    pub workers: Vec<QueueWorker>,
}

/// Response of `GET /admin/queues`.
pub type AdminQueuesResponse = Envelope<Vec<QueueStatus>>;
