//! Tests for `ReqwestClient` against a local mock server.

use super::*;
use wiremock::matchers::{body_string, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn url_for(server: &MockServer, route: &str) -> url::Url {
    url::Url::parse(&format!("{}{route}", server.uri())).unwrap()
}

mod session {
    use super::*;

    #[test]
    fn new_client_has_no_open_session() {
        let client = ReqwestClient::new();
        assert!(!client.is_open());
    }

    #[test]
    fn from_client_starts_open() {
        let client = ReqwestClient::from_client(reqwest::Client::new());
        assert!(client.is_open());
    }

    #[test]
    fn client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestClient>();
    }

    #[tokio::test]
    async fn session_is_created_lazily_and_recreated_after_close() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let client = ReqwestClient::new().with_timeout(std::time::Duration::from_secs(5));
        client
            .request(HttpRequest::get(url_for(&server, "/health")))
            .await
            .unwrap();
        assert!(client.is_open());

        client.close();
        assert!(!client.is_open());

        client
            .request(HttpRequest::get(url_for(&server, "/health")))
            .await
            .unwrap();
        assert!(client.is_open());
    }
}

mod requests {
    use super::*;

    #[tokio::test]
    async fn sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(header("content-type", "application/json"))
            .and(header("x-api-key", "secret"))
            .and(body_string(r#"{"email":"a@b.c"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = ReqwestClient::new();
        let req = HttpRequest::post(url_for(&server, "/auth/login"))
            .with_header(
                ::http::header::CONTENT_TYPE,
                ::http::HeaderValue::from_static("application/json"),
            )
            .with_header(
                ::http::HeaderName::from_static("x-api-key"),
                ::http::HeaderValue::from_static("secret"),
            )
            .with_body(RequestBody::Bytes(br#"{"email":"a@b.c"}"#.to_vec()));

        let resp = client.request(req).await.unwrap();

        assert_eq!(resp.status, ::http::StatusCode::OK);
        assert_eq!(resp.body_text(), Some("ok"));
    }

    #[tokio::test]
    async fn default_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "iv-test/1.0"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut defaults = ::http::HeaderMap::new();
        defaults.insert(
            ::http::header::USER_AGENT,
            ::http::HeaderValue::from_static("iv-test/1.0"),
        );
        let client = ReqwestClient::new().with_default_headers(defaults);

        let resp = client
            .request(HttpRequest::get(url_for(&server, "/health")))
            .await
            .unwrap();
        assert_eq!(resp.status, ::http::StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn error_status_is_returned_as_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("x-ratelimit-limit", "100")
                    .set_body_string(r#"{"error":"missing"}"#),
            )
            .mount(&server)
            .await;

        let client = ReqwestClient::new();
        let resp = client
            .request(HttpRequest::get(url_for(&server, "/files/nope")))
            .await
            .unwrap();

        assert!(resp.is_error());
        assert_eq!(resp.headers.get("x-ratelimit-limit").unwrap(), "100");
        assert_eq!(resp.body_text(), Some(r#"{"error":"missing"}"#));
    }

    #[tokio::test]
    async fn multipart_form_streams_file_from_disk() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/files/upload"))
            .and(header_regex("content-type", "^multipart/form-data"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("inspection.pdf");
        std::fs::write(&file_path, b"file-bytes-on-disk").unwrap();

        let form = MultipartForm::new()
            .with_text("metadata", r#"{"propertyId":"p-1"}"#)
            .with_file_path("file", &file_path);
        let req = HttpRequest::post(url_for(&server, "/files/upload"))
            .with_body(RequestBody::Multipart(form));

        let resp = ReqwestClient::new().request(req).await.unwrap();
        assert_eq!(resp.status, ::http::StatusCode::CREATED);

        let received = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&received[0].body);
        assert!(body.contains("file-bytes-on-disk"));
        assert!(body.contains(r#"filename="inspection.pdf""#));
        assert!(body.contains(r#"{"propertyId":"p-1"}"#));
    }

    #[tokio::test]
    async fn missing_upload_file_is_a_file_error() {
        let form = MultipartForm::new().with_file(
            "file",
            "gone.pdf",
            FileSource::Path("/definitely/not/here/gone.pdf".into()),
        );
        let req = HttpRequest::post(url::Url::parse("http://127.0.0.1:9/files/upload").unwrap())
            .with_body(RequestBody::Multipart(form));

        let result = ReqwestClient::new().request(req).await;

        assert!(matches!(result, Err(HttpError::File { .. })));
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        // Bind then drop to obtain a port with nothing listening on it.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = url::Url::parse(&format!("http://127.0.0.1:{port}/health")).unwrap();

        let result = ReqwestClient::new().request(HttpRequest::get(url)).await;

        match result {
            Err(e @ HttpError::Connection(_)) => assert!(e.is_retryable()),
            other => panic!("Expected connection error, got {other:?}"),
        }
    }
}
