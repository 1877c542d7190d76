//! Post service binding
//!
//! This module defines the [`PostService`] trait, the typed surface of the
//! remote post service. Concrete implementations live in submodules:
//!
//! - [`http::HttpPostService`] -- JSON-over-HTTP binding to the remote
//!   service.
//! - [`memory::InMemoryPostService`] -- in-process store with the same
//!   contract, used for offline mode and tests.
//!
//! Implementations forward calls and reshape results. They never retry or
//! mask transport failures; those surface as errors to the caller.

pub mod http;
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use crate::config::ServiceConfig;
use crate::error::{BlogError, Result};
use crate::identity::IdentityClient;
use crate::post::{CreatePostResult, NewPost, Post};

pub use http::HttpPostService;
pub use memory::InMemoryPostService;

/// Typed surface of the post service.
///
/// All operations are async and may fail with a transport error.
/// `create_post` additionally reports application-level failures (for
/// example a rejected title) through [`CreatePostResult::Err`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PostService: Send + Sync {
    /// All posts in the order the service returns them.
    async fn get_posts(&self) -> Result<Vec<Post>>;

    /// A single post, or `None` when no post has this id.
    async fn get_post_by_id(&self, id: u64) -> Result<Option<Post>>;

    /// Create a post; the service assigns its id and timestamp.
    async fn create_post(&self, request: NewPost) -> Result<CreatePostResult>;

    /// The caller's identity as seen by the service.
    async fn whoami(&self) -> Result<String>;
}

/// Create the post service for the configured backend
///
/// # Arguments
///
/// * `config` - Service configuration
/// * `identity` - Identity client whose session is presented to the service
///
/// # Errors
///
/// Returns error if the backend is unknown or the endpoint is invalid
pub fn create_service(
    config: &ServiceConfig,
    identity: Arc<dyn IdentityClient>,
) -> Result<Arc<dyn PostService>> {
    match config.backend.as_str() {
        "http" => {
            let endpoint = url::Url::parse(&config.endpoint).map_err(|e| {
                BlogError::Config(format!("invalid service endpoint: {}", e))
            })?;
            Ok(Arc::new(
                HttpPostService::new(endpoint, Duration::from_secs(config.timeout_seconds))?
                    .with_identity(identity),
            ))
        }
        "memory" => Ok(Arc::new(InMemoryPostService::new().with_identity(identity))),
        other => Err(BlogError::Config(format!("Unknown service backend: {}", other)).into()),
    }
}
