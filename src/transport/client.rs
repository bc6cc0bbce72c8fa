//! Production HTTP client implementation using reqwest.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::{
    FileSource, FormPart, HttpClient, HttpError, HttpRequest, HttpResponse, MultipartForm,
    RequestBody,
};

/// Production HTTP client using reqwest.
///
/// The underlying `reqwest::Client` (and its connection pool) is created
/// lazily on the first request and reused afterwards. [`ReqwestClient::close`]
/// drops the pool; the next request transparently creates a new one.
///
/// # Example
///
/// ```no_run
/// use iv_ingestion::transport::{HttpClient, HttpRequest, ReqwestClient};
/// use std::time::Duration;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::new().with_timeout(Duration::from_secs(10));
/// let url = Url::parse("https://api.iv-ingestion.com/v1/health")?;
/// let response = client.request(HttpRequest::get(url)).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReqwestClient {
    timeout: Option<Duration>,
    default_headers: http::HeaderMap,
    session: Mutex<Option<reqwest::Client>>,
}

impl ReqwestClient {
    /// Creates a new HTTP client with default configuration.
    ///
    /// No connection pool exists until the first request is sent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: None,
            default_headers: http::HeaderMap::new(),
            session: Mutex::new(None),
        }
    }

    /// Creates an HTTP client from an existing reqwest client.
    ///
    /// Useful when you need custom configuration (TLS, proxies, etc.).
    /// After [`ReqwestClient::close`] the replacement session is built from
    /// this wrapper's own settings, not from `client`.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            timeout: None,
            default_headers: http::HeaderMap::new(),
            session: Mutex::new(Some(client)),
        }
    }

    /// Sets the total request timeout for sessions created by this client.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets headers sent with every request.
    #[must_use]
    pub fn with_default_headers(mut self, headers: http::HeaderMap) -> Self {
        self.default_headers = headers;
        self
    }

    /// Returns true if a session is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drops the current session and its pooled connections.
    pub fn close(&self) {
        let closed = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if closed.is_some() {
            tracing::debug!("HTTP session closed");
        }
    }

    /// Returns the shared session, creating it on first use.
    fn session(&self) -> Result<reqwest::Client, HttpError> {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder().default_headers(self.default_headers.clone());
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;

        tracing::debug!("HTTP session created");
        *guard = Some(client.clone());
        Ok(client)
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a form description into a reqwest multipart form.
///
/// Path-backed files are opened here, so every retry streams the file anew.
async fn build_form(form: MultipartForm) -> Result<reqwest::multipart::Form, HttpError> {
    let mut multipart = reqwest::multipart::Form::new();

    for part in form.into_parts() {
        multipart = match part {
            FormPart::Text { name, value } => multipart.text(name, value),
            FormPart::File {
                name,
                file_name,
                content_type,
                source,
            } => {
                let mut file_part = match source {
                    FileSource::Bytes(bytes) => reqwest::multipart::Part::bytes(bytes),
                    FileSource::Path(path) => {
                        let opened = tokio::fs::File::open(&path).await;
                        let file = opened.map_err(|source| HttpError::File { path, source })?;
                        reqwest::multipart::Part::stream(reqwest::Body::from(file))
                    }
                }
                .file_name(file_name);

                if let Some(mime) = content_type {
                    file_part = file_part
                        .mime_str(&mime)
                        .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;
                }
                multipart.part(name, file_part)
            }
        };
    }

    Ok(multipart)
}

fn classify(error: reqwest::Error) -> HttpError {
    if error.is_timeout() {
        HttpError::Timeout
    } else if error.is_builder() {
        HttpError::InvalidRequest(error.to_string())
    } else {
        HttpError::Connection(Box::new(error))
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let session = self.session()?;
        let mut builder = session.request(req.method, req.url.as_str());

        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }

        builder = match req.body {
            RequestBody::Empty => builder,
            RequestBody::Bytes(bytes) => builder.body(bytes),
            RequestBody::Multipart(form) => builder.multipart(build_form(form).await?),
        };

        let response = builder.send().await.map_err(classify)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(classify)?.to_vec();

        Ok(HttpResponse::new(status, headers, body))
    }
}
