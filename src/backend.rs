//! The remote calls the chat client makes, and their HTTP implementation.

use std::time::{Duration, Instant};

use reqwest::{Client as ReqwestClient, Response, header};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{Error, Result};
use crate::observability::{BACKEND_REQUEST_DURATION, BACKEND_REQUEST_ERRORS, BACKEND_REQUESTS};
use crate::types::{
    ChatRequest, ChatResponse, ErrorResponse, HistoryResponse, Message, ModeResponse, SessionInfo,
    SessionInfoResponse,
};

/// Address of the backend in the reference deployment.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// The four calls the chat client makes against the backend.
///
/// Implementations report every failure as an [`Error`]; deciding how a failure
/// shows up on screen is the caller's business.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// `GET /session_info`: the opaque session metadata.
    async fn session_info(&self) -> Result<SessionInfo>;

    /// `GET /conversation_history`: every remembered entry, oldest first.
    async fn conversation_history(&self) -> Result<Vec<Message>>;

    /// `GET /current_mode`: the operating mode label.
    async fn current_mode(&self) -> Result<String>;

    /// `POST /chat`: send one user message and return the reply.
    async fn chat(&self, user_input: &str) -> Result<String>;
}

/// [`Backend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: ReqwestClient,
    base_url: Url,
    timeout: Option<Duration>,
}

impl HttpBackend {
    /// Create a backend talking to `base_url` with no request timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a backend with custom settings.
    ///
    /// `timeout` of `None` lets a request wait forever.
    pub fn with_options(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The normalized base address, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path against the base address.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn map_request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                self.timeout.map(|t| t.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(e.to_string(), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process a non-success response into an [`Error::Api`].
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        // An unreadable body is treated like an empty one.
        let body = response.text().await.unwrap_or_default();
        Error::api(status_code, ErrorResponse::failure_text(&body))
    }

    async fn read_json<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }
        let body = response.text().await.map_err(|e| self.map_request_error(e))?;
        serde_json::from_str(&body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        BACKEND_REQUESTS.click();
        let start = Instant::now();
        let result = match request.send().await {
            Ok(response) => self.read_json(response).await,
            Err(e) => Err(self.map_request_error(e)),
        };
        BACKEND_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        if result.is_err() {
            BACKEND_REQUEST_ERRORS.click();
        }
        result
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");
        self.execute(self.client.get(url)).await
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn session_info(&self) -> Result<SessionInfo> {
        let body: SessionInfoResponse = self.get("session_info").await?;
        body.session_info.ok_or_else(|| {
            Error::serialization("response has no session_info", None)
        })
    }

    async fn conversation_history(&self) -> Result<Vec<Message>> {
        let body: HistoryResponse = self.get("conversation_history").await?;
        Ok(body.history)
    }

    async fn current_mode(&self) -> Result<String> {
        let body: ModeResponse = self.get("current_mode").await?;
        Ok(body.mode)
    }

    async fn chat(&self, user_input: &str) -> Result<String> {
        let url = self.endpoint("chat")?;
        tracing::debug!(%url, "POST");
        let request = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&ChatRequest { user_input });
        let body: ChatResponse = self.execute(request).await?;
        Ok(body.response)
    }
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url.trim())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::url(
            format!("unsupported scheme {:?} in {}", url.scheme(), base_url),
            None,
        ));
    }
    if url.cannot_be_a_base() {
        return Err(Error::url(format!("{} cannot be a base", base_url), None));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
