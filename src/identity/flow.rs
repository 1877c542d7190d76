//! Browser redirect login against the identity provider
//!
//! # Flow overview
//!
//! 1. Bind a loopback TCP listener for the redirect callback.
//! 2. Generate a random `state` nonce.
//! 3. Build the provider URL (`redirect_uri`, `state`, `max_time_to_live`)
//!    and open it in the user's browser; it is also printed to stderr.
//! 4. Wait for the callback request and validate `state`.
//! 5. Read `principal`, `access_token` and `expires_in` from the callback,
//!    or fail with the provider's `error`.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::time::Duration;

use base64::Engine as _;
use chrono::Utc;
use url::Url;

use crate::error::{BlogError, Result};
use crate::identity::{Authorizer, LoginOptions, StoredSession};
use crate::post::Principal;

/// Path the provider redirects back to on the loopback listener.
const CALLBACK_PATH: &str = "/callback";

/// How long a callback connection may stay silent before it is dropped.
const CALLBACK_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Logs in by sending the user through the identity provider in a browser.
#[derive(Debug, Clone, Default)]
pub struct BrowserAuthorizer;

impl BrowserAuthorizer {
    /// Create a browser authorizer.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Authorizer for BrowserAuthorizer {
    async fn authorize(&self, options: &LoginOptions) -> Result<StoredSession> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", options.redirect_port))
            .await
            .map_err(|e| BlogError::Login(format!("failed to bind callback listener: {e}")))?;
        let port = listener
            .local_addr()
            .map_err(|e| BlogError::Login(format!("callback listener has no address: {e}")))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{port}{CALLBACK_PATH}");

        let state = generate_state();
        let url = build_authorization_url(
            &options.identity_provider,
            &redirect_uri,
            &state,
            options.max_time_to_live,
        );

        eprintln!("Open this URL to log in:\n\n  {url}\n");
        if options.open_browser {
            try_open_browser(url.as_str());
        }
        tracing::info!(redirect_uri = %redirect_uri, "Waiting for identity provider callback");

        let params = accept_callback(listener, &state, CALLBACK_READ_TIMEOUT).await?;
        session_from_callback(&params)
    }
}

/// Generates a cryptographically random state nonce.
///
/// 16 random bytes encoded as base64url without padding.
fn generate_state() -> String {
    use rand::RngCore as _;
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Builds the provider URL with the callback, nonce, and requested lifetime.
///
/// Providers that route on the URL fragment (`#authorize`) keep it; query
/// parameters are added before the fragment.
fn build_authorization_url(
    provider: &Url,
    redirect_uri: &str,
    state: &str,
    max_time_to_live: Duration,
) -> Url {
    let mut url = provider.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("redirect_uri", redirect_uri);
        query.append_pair("state", state);
        query.append_pair(
            "max_time_to_live",
            &max_time_to_live.as_nanos().to_string(),
        );
    }
    url
}

/// Attempts to open the URL in the user's default browser.
///
/// Errors are ignored; the URL has already been printed for manual use.
fn try_open_browser(url: &str) {
    #[cfg(target_os = "macos")]
    {
        let _ = std::process::Command::new("open").arg(url).spawn();
    }
    #[cfg(target_os = "linux")]
    {
        let _ = std::process::Command::new("xdg-open").arg(url).spawn();
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        let _ = url;
    }
}

/// Accepts connections on the callback listener until a request for
/// [`CALLBACK_PATH`] arrives, answers it with a plain-text page, and returns
/// its query parameters once `state` has been checked.
///
/// Other connections (browser preconnects, favicon requests, peers that
/// never send a request line within `read_timeout`) are dropped and the
/// listener keeps waiting.
async fn accept_callback(
    listener: tokio::net::TcpListener,
    expected_state: &str,
    read_timeout: Duration,
) -> Result<HashMap<String, String>> {
    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .map_err(|e| BlogError::Login(format!("failed to accept login callback: {e}")))?;

        let params = match read_callback(stream, read_timeout).await {
            Ok(Some(params)) => params,
            Ok(None) => {
                tracing::debug!(%peer, "Ignoring request outside the callback path");
                continue;
            }
            Err(e) => {
                tracing::debug!(%peer, error = %e, "Ignoring unreadable callback connection");
                continue;
            }
        };

        let state = params.get("state").map(String::as_str).unwrap_or_default();
        if state != expected_state {
            return Err(BlogError::Login("state mismatch in login callback".to_string()).into());
        }
        return Ok(params);
    }
}

/// Reads one HTTP request from `stream`.
///
/// Returns the query parameters when the request targets [`CALLBACK_PATH`],
/// `None` for any other request or an empty connection.
async fn read_callback(
    stream: tokio::net::TcpStream,
    read_timeout: Duration,
) -> Result<Option<HashMap<String, String>>> {
    tokio::task::spawn_blocking(move || -> Result<Option<HashMap<String, String>>> {
        let std_stream = stream
            .into_std()
            .map_err(|e| BlogError::Login(format!("stream conversion failed: {e}")))?;
        // tokio hands the socket over in non-blocking mode.
        std_stream
            .set_nonblocking(false)
            .map_err(|e| BlogError::Login(format!("stream mode change failed: {e}")))?;
        std_stream
            .set_read_timeout(Some(read_timeout))
            .map_err(|e| BlogError::Login(format!("stream timeout setup failed: {e}")))?;

        let mut write_stream = std_stream
            .try_clone()
            .map_err(|e| BlogError::Login(format!("stream clone failed: {e}")))?;

        let reader = BufReader::new(std_stream);
        let mut request_line = String::new();
        for line in reader.lines() {
            let line = line
                .map_err(|e| BlogError::Login(format!("failed to read callback request: {e}")))?;
            if line.is_empty() {
                break;
            }
            if request_line.is_empty() {
                request_line = line;
            }
        }

        // "GET /callback?principal=...&state=... HTTP/1.1"
        let Some(target) = request_line.split_whitespace().nth(1) else {
            return Ok(None);
        };
        let (path, query_string) = target.split_once('?').unwrap_or((target, ""));

        if path != CALLBACK_PATH {
            let _ = write_stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return Ok(None);
        }

        let params = parse_query_string(query_string);
        let body = if params.contains_key("error") {
            "Login failed. You may close this tab."
        } else {
            "Login successful. You may close this tab."
        };
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let _ = write_stream.write_all(response.as_bytes());

        Ok(Some(params))
    })
    .await
    .map_err(|e| BlogError::Login(format!("callback task panicked: {e}")))?
}

/// Turns callback parameters into a session.
fn session_from_callback(params: &HashMap<String, String>) -> Result<StoredSession> {
    if let Some(error) = params.get("error") {
        return Err(BlogError::Login(format!("identity provider returned: {error}")).into());
    }

    let principal = params
        .get("principal")
        .ok_or_else(|| BlogError::Login("principal missing from callback".to_string()))?;
    let principal = Principal::parse(principal)?;

    let access_token = params
        .get("access_token")
        .filter(|t| !t.is_empty())
        .cloned();

    let expires_at = match params.get("expires_in") {
        Some(secs) => {
            let invalid = || BlogError::Login(format!("invalid expires_in: {secs}"));
            let secs: i64 = secs.parse().map_err(|_| invalid())?;
            if secs < 0 {
                return Err(invalid().into());
            }
            let lifetime = chrono::Duration::try_seconds(secs).ok_or_else(invalid)?;
            Some(
                Utc::now()
                    .checked_add_signed(lifetime)
                    .ok_or_else(invalid)?,
            )
        }
        None => None,
    };

    Ok(StoredSession {
        principal,
        access_token,
        expires_at,
    })
}

/// Parses a URL query string into a key-value map.
///
/// Values are percent-decoded. Duplicate keys are overwritten by the last
/// occurrence.
fn parse_query_string(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_query_string_decodes_values() {
        let map = parse_query_string("principal=aaaaa-aa&state=a%2Bb&note=hello+world");
        assert_eq!(map.get("principal"), Some(&"aaaaa-aa".to_string()));
        assert_eq!(map.get("state"), Some(&"a+b".to_string()));
        assert_eq!(map.get("note"), Some(&"hello world".to_string()));
    }

    #[test]
    fn test_parse_query_string_empty_returns_empty_map() {
        assert!(parse_query_string("").is_empty());
    }

    #[test]
    fn test_generate_state_is_unique_and_unpadded() {
        let a = generate_state();
        let b = generate_state();
        assert_ne!(a, b);
        assert_eq!(a.len(), 22);
        assert!(!a.contains('='));
    }

    #[test]
    fn test_build_authorization_url_contains_required_params() {
        let provider = Url::parse("https://identity.example/authorize").unwrap();
        let url = build_authorization_url(
            &provider,
            "http://127.0.0.1:5555/callback",
            "nonce",
            Duration::from_secs(3600),
        );
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(query["redirect_uri"], "http://127.0.0.1:5555/callback");
        assert_eq!(query["state"], "nonce");
        assert_eq!(query["max_time_to_live"], "3600000000000");
    }

    #[test]
    fn test_build_authorization_url_keeps_fragment() {
        let provider = Url::parse("https://identity.ic0.app/#authorize").unwrap();
        let url = build_authorization_url(&provider, "http://x/cb", "s", Duration::from_secs(1));
        assert_eq!(url.fragment(), Some("authorize"));
        assert!(url.as_str().contains("?redirect_uri="));
    }

    #[test]
    fn test_session_from_callback_full() {
        let session = session_from_callback(&params(&[
            ("principal", "aaaaa-aa"),
            ("access_token", "tok"),
            ("expires_in", "3600"),
        ]))
        .unwrap();
        assert_eq!(session.principal.as_str(), "aaaaa-aa");
        assert_eq!(session.access_token.as_deref(), Some("tok"));
        assert!(!session.is_expired());
    }

    #[test]
    fn test_session_from_callback_without_token_or_expiry() {
        let session = session_from_callback(&params(&[("principal", "aaaaa-aa")])).unwrap();
        assert_eq!(session.access_token, None);
        assert_eq!(session.expires_at, None);
    }

    #[test]
    fn test_session_from_callback_provider_error() {
        let err = session_from_callback(&params(&[("error", "UserInterrupt")])).unwrap_err();
        assert!(err.to_string().contains("UserInterrupt"));
    }

    #[test]
    fn test_session_from_callback_missing_principal() {
        let err = session_from_callback(&params(&[("access_token", "tok")])).unwrap_err();
        assert!(err.to_string().contains("principal missing"));
    }

    #[test]
    fn test_session_from_callback_bad_expiry() {
        assert!(session_from_callback(&params(&[
            ("principal", "aaaaa-aa"),
            ("expires_in", "later")
        ]))
        .is_err());
    }

    async fn send_callback(port: u16, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(("127.0.0.1", port))
            .await
            .unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_accept_callback_returns_params_on_matching_state() {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let client = tokio::spawn(async move {
            send_callback(port, "/callback?state=abc&principal=aaaaa-aa").await
        });

        let params = accept_callback(listener, "abc", Duration::from_secs(5)).await.unwrap();
        assert_eq!(params["principal"], "aaaaa-aa");

        let response = client.await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("Login successful"));
    }

    #[tokio::test]
    async fn test_accept_callback_rejects_state_mismatch() {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let client =
            tokio::spawn(async move { send_callback(port, "/callback?state=evil").await });

        let err = accept_callback(listener, "abc", Duration::from_secs(5)).await.unwrap_err();
        assert!(err.to_string().contains("state mismatch"));
        client.await.unwrap();
    }

    #[test]
    fn test_session_from_callback_rejects_out_of_range_expiry() {
        for secs in ["9223372036854775807", "-1", "-9223372036854775808"] {
            let err = session_from_callback(&params(&[
                ("principal", "aaaaa-aa"),
                ("expires_in", secs),
            ]))
            .unwrap_err();
            assert!(err.to_string().contains("invalid expires_in"), "{secs}");
        }
    }

    #[tokio::test]
    async fn test_accept_callback_skips_stray_connections() {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let client = tokio::spawn(async move {
            // Connects and never sends a request line.
            let silent = tokio::net::TcpStream::connect(("127.0.0.1", port))
                .await
                .unwrap();
            let favicon = send_callback(port, "/favicon.ico").await;
            let callback = send_callback(port, "/callback?state=abc&principal=aaaaa-aa").await;
            drop(silent);
            (favicon, callback)
        });

        let params = accept_callback(listener, "abc", Duration::from_millis(200))
            .await
            .unwrap();
        assert_eq!(params["principal"], "aaaaa-aa");

        let (favicon, callback) = client.await.unwrap();
        assert!(favicon.starts_with("HTTP/1.1 404"));
        assert!(callback.contains("Login successful"));
    }
}
