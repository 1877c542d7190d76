//! JSON-over-HTTP binding to the remote post service
//!
//! Every service method maps to one HTTP request under the configured
//! endpoint:
//!
//! | Method        | Request                          | Response body                   |
//! |---------------|----------------------------------|---------------------------------|
//! | `getPosts`    | `GET  {endpoint}/getPosts`       | `[Post]`                        |
//! | `getPostById` | `GET  {endpoint}/getPostById/id` | `Post` or `null`                |
//! | `createPost`  | `POST {endpoint}/createPost`     | `{"ok": Post}` / `{"err": msg}` |
//! | `whoami`      | `GET  {endpoint}/whoami`         | JSON string                     |
//!
//! When an identity client with an active session is attached, every
//! request carries `Authorization: Bearer <access token>` so the service
//! can attribute new posts to the caller's principal.
//!
//! Non-success statuses, connection failures, timeouts, and bodies that do
//! not match the shape above are returned as
//! [`BlogError::Transport`](crate::error::BlogError::Transport).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{BlogError, Result};
use crate::identity::IdentityClient;
use crate::post::{CreatePostResult, NewPost, Post};
use crate::service::PostService;

/// HTTP binding to the remote post service.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use url::Url;
/// use cryptoblog::service::HttpPostService;
///
/// let service = HttpPostService::new(
///     Url::parse("http://127.0.0.1:4943/api/backend").unwrap(),
///     Duration::from_secs(30),
/// )
/// .unwrap();
/// ```
#[derive(Clone)]
pub struct HttpPostService {
    http_client: reqwest::Client,
    /// Endpoint without trailing slash; method names are appended to it.
    base_url: String,
    identity: Option<Arc<dyn IdentityClient>>,
}

impl fmt::Debug for HttpPostService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpPostService")
            .field("base_url", &self.base_url)
            .field("identity", &self.identity.is_some())
            .finish()
    }
}

impl HttpPostService {
    /// Construct a binding for `endpoint` with a per-request `timeout`.
    ///
    /// No network I/O is performed at construction time.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::Http`] if the HTTP client cannot be built.
    pub fn new(endpoint: url::Url, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(BlogError::Http)?;

        Ok(Self {
            http_client,
            base_url: endpoint.as_str().trim_end_matches('/').to_string(),
            identity: None,
        })
    }

    /// Present the session of `identity` on every request.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityClient>) -> Self {
        self.identity = Some(identity);
        self
    }

    fn method_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        if let Some(identity) = &self.identity {
            if let Some(token) = identity.access_token().await? {
                return Ok(request.bearer_auth(token));
            }
        }
        Ok(request)
    }

    async fn send(&self, method: &str, request: RequestBuilder) -> Result<Response> {
        tracing::debug!(method, "Calling post service");
        let request = self.authorize(request).await?;
        request.send().await.map_err(|e| {
            BlogError::Transport(format!("{} request failed: {}", method, e)).into()
        })
    }
}

/// Decode a successful response body, or turn the failure into a transport
/// error carrying the status and body.
async fn decode<T: DeserializeOwned>(method: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BlogError::Transport(format!(
            "{} returned HTTP {}: {}",
            method, status, body
        ))
        .into());
    }

    let body = response.text().await.map_err(|e| {
        BlogError::Transport(format!("{} response could not be read: {}", method, e))
    })?;
    serde_json::from_str(&body).map_err(|e| {
        BlogError::Transport(format!("{} returned an unexpected body: {}", method, e)).into()
    })
}

#[async_trait::async_trait]
impl PostService for HttpPostService {
    async fn get_posts(&self) -> Result<Vec<Post>> {
        let request = self.http_client.get(self.method_url("getPosts"));
        let response = self.send("getPosts", request).await?;
        decode("getPosts", response).await
    }

    async fn get_post_by_id(&self, id: u64) -> Result<Option<Post>> {
        let request = self
            .http_client
            .get(self.method_url(&format!("getPostById/{}", id)));
        let response = self.send("getPostById", request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode("getPostById", response).await
    }

    async fn create_post(&self, request: NewPost) -> Result<CreatePostResult> {
        let http_request = self
            .http_client
            .post(self.method_url("createPost"))
            .json(&request);
        let response = self.send("createPost", http_request).await?;
        decode("createPost", response).await
    }

    async fn whoami(&self) -> Result<String> {
        let request = self.http_client.get(self.method_url("whoami"));
        let response = self.send("whoami", request).await?;
        decode("whoami", response).await
    }
}
