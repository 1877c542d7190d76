//! In-process post service
//!
//! [`InMemoryPostService`] implements the post service contract without a
//! network: it assigns ids and timestamps, rejects blank titles, and
//! attributes posts to the principal of an attached identity client.
//! Posts live only as long as the process.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::identity::IdentityClient;
use crate::post::{CreatePostResult, NewPost, Post, Principal};
use crate::service::PostService;

#[derive(Debug)]
struct Store {
    posts: Vec<Post>,
    next_id: u64,
}

/// Post service backed by process memory.
///
/// # Examples
///
/// ```
/// use cryptoblog::post::NewPost;
/// use cryptoblog::service::{InMemoryPostService, PostService};
///
/// # async fn example() -> cryptoblog::error::Result<()> {
/// let service = InMemoryPostService::new();
/// let created = service
///     .create_post(NewPost::new("Hello", "First post", None))
///     .await?
///     .into_result()
///     .unwrap();
/// assert_eq!(created.id, 1);
/// assert_eq!(service.get_posts().await?.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct InMemoryPostService {
    store: RwLock<Store>,
    identity: Option<Arc<dyn IdentityClient>>,
}

impl Default for InMemoryPostService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPostService {
    /// Create an empty store. The first post gets id 1.
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                posts: Vec::new(),
                next_id: 1,
            }),
            identity: None,
        }
    }

    /// Attribute calls to the principal of `identity`.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityClient>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Principal of the caller, `None` when anonymous.
    async fn caller(&self) -> Result<Option<Principal>> {
        match &self.identity {
            Some(identity) => Ok(identity.session().await?.principal),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl PostService for InMemoryPostService {
    async fn get_posts(&self) -> Result<Vec<Post>> {
        Ok(self.store.read().await.posts.clone())
    }

    async fn get_post_by_id(&self, id: u64) -> Result<Option<Post>> {
        Ok(self
            .store
            .read()
            .await
            .posts
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }

    async fn create_post(&self, request: NewPost) -> Result<CreatePostResult> {
        if request.title.trim().is_empty() {
            return Ok(CreatePostResult::Err("Title cannot be empty".to_string()));
        }

        let author_principal = self.caller().await?;
        let mut store = self.store.write().await;
        let post = Post {
            id: store.next_id,
            title: request.title,
            content: request.content,
            author: request.author,
            timestamp: Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX),
            author_principal,
        };
        store.next_id += 1;
        store.posts.push(post.clone());
        tracing::debug!(id = post.id, "Stored post");

        Ok(CreatePostResult::Ok(post))
    }

    async fn whoami(&self) -> Result<String> {
        Ok(self
            .caller()
            .await?
            .unwrap_or_else(Principal::anonymous)
            .to_string())
    }
}
