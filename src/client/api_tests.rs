//! End-to-end tests of the typed operations against a local mock server.

use super::*;
use crate::batch::UploadItem;
use crate::models::{
    InspectionQuery, InspectionStatus, LoginRequest, ProcessingStatus, WebhookCreateRequest,
    WebhookEventType,
};
use crate::signature::sign_payload;
use crate::time::InstantSleeper;
use serde_json::json;
use tokio_stream::StreamExt;
use wiremock::matchers::{body_json, header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> IvClient<ReqwestClient, InstantSleeper> {
    let config = ClientConfig::new(format!("{}/v1", server.uri()))
        .with_api_key("key-1")
        .with_retry_policy(crate::RetryPolicy::none());
    IvClient::new(config).with_sleeper(InstantSleeper)
}

fn envelope(data: &serde_json::Value) -> serde_json::Value {
    json!({"success": true, "timestamp": "2024-05-01T12:00:00Z", "data": data})
}

fn user_json() -> serde_json::Value {
    json!({
        "id": "u-1",
        "email": "a@b.c",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "role": "inspector",
        "isEmailVerified": true,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn login_stores_token_for_later_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/login"))
            .and(header("x-api-key", "key-1"))
            .and(body_json(json!({"email": "a@b.c", "password": "pw", "rememberMe": false})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(&json!({"token": "tok-1", "user": user_json()}))),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/auth/me"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&user_json())))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let login = client.login(&LoginRequest::new("a@b.c", "pw")).await.unwrap();
        assert_eq!(login.data.token.as_deref(), Some("tok-1"));
        assert_eq!(client.token().as_deref(), Some("tok-1"));

        let user = client.get_current_user().await.unwrap();
        assert_eq!(user.first_name, "Ada");
    }

    #[tokio::test]
    async fn failed_login_keeps_previous_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": "Invalid credentials", "code": "UNAUTHORIZED"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let error = client
            .login(&LoginRequest::new("a@b.c", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "UNAUTHORIZED (401): Invalid credentials");
        assert!(client.token().is_none());
    }

    #[tokio::test]
    async fn user_agent_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/health"))
            .and(header_regex("user-agent", "^iv-ingestion-rust/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(&json!({"status": "healthy"}))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let health = client_for(&server).health().await.unwrap();
        assert_eq!(health.data.status, crate::models::HealthStatus::Healthy);
    }
}

mod files {
    use super::*;

    #[tokio::test]
    async fn upload_sends_file_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/files/upload"))
            .and(header_regex("content-type", "^multipart/form-data"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-ratelimit-limit", "100")
                    .insert_header("x-ratelimit-remaining", "99")
                    .insert_header("x-ratelimit-reset", "1700000000")
                    .set_body_json(envelope(&json!({"fileId": "f-1", "status": "uploaded"}))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("house.pdf");
        std::fs::write(&file_path, b"%PDF-1.7 report").unwrap();

        let client = client_for(&server);
        let response = client
            .upload_file(UploadItem::from_path(&file_path).with_metadata(json!({"propertyId": "p-1"})))
            .await
            .unwrap();

        assert_eq!(response.data.file_id, "f-1");
        assert_eq!(response.data.status, Some(ProcessingStatus::Uploaded));
        assert_eq!(client.get_rate_limit_info().unwrap().remaining, 99);

        let received = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&received[0].body);
        assert!(body.contains("%PDF-1.7 report"));
        assert!(body.contains(r#"name="metadata""#));
        assert!(body.contains(r#"{"propertyId":"p-1"}"#));
    }

    #[tokio::test]
    async fn download_returns_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/files/f-1/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0_u8, 159, 146, 150]))
            .mount(&server)
            .await;

        let bytes = client_for(&server).download_file("f-1").await.unwrap();
        assert_eq!(bytes, vec![0_u8, 159, 146, 150]);
    }

    #[tokio::test]
    async fn missing_file_is_normalized_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/files/nope"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"error": "File not found", "code": "NOT_FOUND"})),
            )
            .mount(&server)
            .await;

        let error = client_for(&server).get_file_status("nope").await.unwrap_err();

        assert_eq!(error.status, 404);
        assert_eq!(error.code, "NOT_FOUND");
    }
}

mod monitoring {
    use super::*;

    #[tokio::test]
    async fn monitor_follows_status_to_completion_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/files/f-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&json!({
                "status": "processing",
                "progress": 30,
                "currentStep": "ocr"
            }))))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/files/f-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&json!({
                "status": "completed",
                "progress": 100
            }))))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let snapshots: Vec<_> = client.monitor_processing("f-1").collect().await;

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].current_step, "ocr");
        assert_eq!(snapshots[1].status, ProcessingStatus::Completed);
        assert_eq!(snapshots[1].current_step, "Unknown");

        let cached = client.get_processing_status("f-1").unwrap();
        assert_eq!(cached.status, ProcessingStatus::Completed);
        assert_eq!(client.get_all_processing_statuses().len(), 1);

        assert!(client.forget_processing_status("f-1").is_some());
        assert!(client.get_processing_status("f-1").is_none());
    }

    #[tokio::test]
    async fn monitor_survives_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/files/f-2"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/files/f-2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(&json!({"status": "failed", "progress": 12}))),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let snapshots: Vec<_> = client.monitor_processing("f-2").collect().await;

        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].status, ProcessingStatus::Failed);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }
}

mod inspections {
    use super::*;
    use crate::client::api::path_with_query;

    #[test]
    fn path_without_pairs_has_no_question_mark() {
        let pairs: Vec<(&str, String)> = Vec::new();
        assert_eq!(path_with_query("/inspections", pairs), "/inspections");
    }

    #[test]
    fn path_with_pairs_is_url_encoded() {
        let path = path_with_query("/inspections", [("status", "in progress"), ("page", "1")]);
        assert_eq!(path, "/inspections?status=in+progress&page=1");
    }

    #[tokio::test]
    async fn default_query_sends_page_and_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/inspections"))
            .and(query_param("page", "1"))
            .and(query_param("limit", InspectionQuery::DEFAULT_LIMIT.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&json!({
                "inspections": []
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let list = client_for(&server)
            .list_inspections(&InspectionQuery::default())
            .await
            .unwrap();

        assert!(list.data.inspections.is_empty());
    }

    #[tokio::test]
    async fn list_sends_filters_as_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/inspections"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "5"))
            .and(query_param("status", "completed"))
            .and(query_param("dateFrom", "2024-01-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&json!({
                "inspections": [],
                "pagination": {"page": 2, "limit": 5, "total": 5, "totalPages": 1}
            }))))
            .expect(1)
            .mount(&server)
            .await;

        let query = InspectionQuery {
            page: 2,
            limit: 5,
            status: Some(InspectionStatus::Completed),
            date_from: Some("2024-01-01".to_string()),
            date_to: None,
        };
        let list = client_for(&server).list_inspections(&query).await.unwrap();

        assert!(list.data.inspections.is_empty());
        assert_eq!(list.data.pagination.unwrap().total, 5);
    }
}

mod webhooks {
    use super::*;

    #[tokio::test]
    async fn create_list_and_delete() {
        let server = MockServer::start().await;
        let hook = json!({
            "id": "w-1",
            "url": "https://hooks.test/iv",
            "events": ["processing.completed"],
            "isActive": true,
            "createdAt": "2024-01-01T00:00:00Z"
        });
        Mock::given(method("POST"))
            .and(path("/v1/webhooks"))
            .and(body_json(json!({
                "url": "https://hooks.test/iv",
                "events": ["processing.completed"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(envelope(&hook)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/webhooks"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(envelope(&json!({"webhooks": [hook]}))),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/v1/webhooks/w-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let created = client
            .create_webhook(&WebhookCreateRequest {
                url: "https://hooks.test/iv".to_string(),
                events: vec![WebhookEventType::ProcessingCompleted],
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id, "w-1");

        let listed = client.list_webhooks().await.unwrap();
        assert_eq!(listed.data.webhooks, vec![created]);

        client.delete_webhook("w-1").await.unwrap();
    }

    #[test]
    fn client_delegates_signature_checks() {
        let client = IvClient::new(ClientConfig::default());
        let body = br#"{"event":"finding.added","timestamp":"2024-05-01T12:00:00Z","data":{}}"#;
        let signature = sign_payload(body, "s3cret");

        assert!(client.verify_webhook_signature(body, &signature, "s3cret"));
        assert!(!client.verify_webhook_signature(body, &signature, "other"));

        let payload = client.parse_webhook_payload(body, &signature, "s3cret").unwrap();
        assert_eq!(payload.event, WebhookEventType::FindingAdded);
    }
}

mod admin {
    use super::*;

    #[tokio::test]
    async fn metrics_and_queues() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/admin/metrics"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&json!({
                "filesProcessed": {"today": 12},
                "queueDepth": {"ocr": 3},
                "errorRate": {"today": 0.01},
                "activeUsers": {"today": 4},
                "processingRate": {"perHour": 20}
            }))))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/admin/queues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&json!([{
                "name": "ocr",
                "waiting": 1,
                "active": 2,
                "completed": 30,
                "failed": 0,
                "delayed": 0,
                "workers": [{
                    "id": "w1",
                    "status": "working",
                    "currentJob": "j-9",
                    "processedJobs": 30,
                    "failedJobs": 0,
                    "uptime": 3600,
                    "lastHeartbeat": "2024-05-01T12:00:00Z"
                }]
            }]))))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let metrics = client.get_admin_metrics().await.unwrap();
        assert_eq!(metrics.files_processed["today"], 12);

        let queues = client.get_queue_status().await.unwrap();
        assert_eq!(queues.data[0].name, "ocr");
        assert_eq!(queues.data[0].workers[0].current_job.as_deref(), Some("j-9"));
    }
}

#[tokio::test]
async fn close_releases_and_reopens_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(&json!({"status": "degraded"}))),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.health().await.unwrap();
    assert!(client.http_client().is_open());

    client.close();
    assert!(!client.http_client().is_open());

    client.health().await.unwrap();
    assert!(client.http_client().is_open());
}
