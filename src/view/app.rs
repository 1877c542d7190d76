//! Blog view handlers
//!
//! [`BlogApp`] owns the [`ViewState`] together with the post service and
//! identity client, and implements every transition of the view:
//!
//! ```text
//! Loading --fetch ok/err--> Ready | Error
//! Ready   --submit-->       Submitting --ok--> (refetch) Ready
//!                                      --err--> Ready | Error (dialog stays open)
//! ```
//!
//! Network failures are logged and swallowed here; the view falls back to
//! a safe state and the user re-triggers the action manually.

use std::sync::Arc;

use crate::error::Result;
use crate::identity::{AuthSession, IdentityClient, LoginOptions};
use crate::post::{CreatePostResult, Post};
use crate::service::PostService;
use crate::view::state::{DraftField, DraftPost, ViewPhase, ViewState};

/// Alert shown when an unauthenticated user tries to create a post.
pub const LOGIN_REQUIRED_ALERT: &str = "You must be logged in to create a post.";

/// Behavior switches for the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    /// Only logged-in users may submit posts
    pub require_login: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            require_login: true,
        }
    }
}

/// Result of a submit action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The post was created; the list has been refetched
    Created(Post),
    /// A precondition failed; nothing was sent. Carries the alert text.
    Rejected(String),
    /// The service rejected the post or could not be reached. The dialog
    /// stays open with the draft intact.
    Failed(String),
}

/// Result of looking up a single post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostLookup {
    Found(Post),
    NotFound(u64),
    Failed(String),
}

/// The blog view: state plus the clients it orchestrates.
pub struct BlogApp {
    service: Arc<dyn PostService>,
    identity: Arc<dyn IdentityClient>,
    options: ViewOptions,
    state: ViewState,
}

impl BlogApp {
    pub fn new(
        service: Arc<dyn PostService>,
        identity: Arc<dyn IdentityClient>,
        options: ViewOptions,
    ) -> Self {
        Self {
            service,
            identity,
            options,
            state: ViewState::default(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn options(&self) -> ViewOptions {
        self.options
    }

    /// Derive the auth session, then load the post list.
    pub async fn mount(&mut self) {
        self.refresh_auth().await;
        self.fetch_posts().await;
    }

    /// Reload the full post list.
    ///
    /// On failure the error is logged, the current list is kept (empty on
    /// first load), and the loading flag is cleared anyway.
    pub async fn fetch_posts(&mut self) {
        self.state.loading = true;
        match self.service.get_posts().await {
            Ok(posts) => {
                tracing::debug!(count = posts.len(), "Fetched posts");
                self.state.posts = posts;
                self.state.phase = ViewPhase::Ready;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching posts");
                self.state.phase = ViewPhase::Error;
            }
        }
        self.state.loading = false;
    }

    /// Show the new-post dialog.
    pub fn open_dialog(&mut self) {
        self.state.dialog_open = true;
    }

    /// Close the dialog and discard the draft.
    pub fn cancel_dialog(&mut self) {
        self.state.dialog_open = false;
        self.state.draft = DraftPost::default();
    }

    /// Edit one field of the draft.
    pub fn set_draft_field(&mut self, field: DraftField, value: &str) {
        self.state.draft.set(field, value);
    }

    /// Append a line to the draft content.
    pub fn append_draft_line(&mut self, line: &str) {
        self.state.draft.append_content_line(line);
    }

    /// Submit the draft.
    ///
    /// With the login gate on, an unauthenticated session is rejected
    /// before any network call. On success the draft is cleared, the
    /// dialog closed, and the list refetched from the service.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.options.require_login && !self.state.auth.authenticated {
            tracing::warn!("Rejected post creation without a session");
            return SubmitOutcome::Rejected(LOGIN_REQUIRED_ALERT.to_string());
        }

        self.state.phase = ViewPhase::Submitting;
        self.state.loading = true;

        let request = self.state.draft.to_request();
        let outcome = match self.service.create_post(request).await {
            Ok(CreatePostResult::Ok(post)) => {
                tracing::info!(id = post.id, "Created post");
                self.state.dialog_open = false;
                self.state.draft = DraftPost::default();
                self.fetch_posts().await;
                return SubmitOutcome::Created(post);
            }
            Ok(CreatePostResult::Err(message)) => {
                tracing::error!(error = %message, "Error creating post");
                self.state.phase = ViewPhase::Ready;
                SubmitOutcome::Failed(message)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error creating post");
                self.state.phase = ViewPhase::Error;
                SubmitOutcome::Failed(e.to_string())
            }
        };

        self.state.loading = false;
        outcome
    }

    /// Look up a single post.
    pub async fn find_post(&self, id: u64) -> PostLookup {
        match self.service.get_post_by_id(id).await {
            Ok(Some(post)) => PostLookup::Found(post),
            Ok(None) => PostLookup::NotFound(id),
            Err(e) => {
                tracing::error!(error = %e, id, "Error fetching post");
                PostLookup::Failed(e.to_string())
            }
        }
    }

    /// The caller as seen by the post service.
    pub async fn whoami(&self) -> Result<String> {
        self.service.whoami().await
    }

    /// Re-derive the auth session from the identity client.
    ///
    /// Identity errors are logged and treated as logged out.
    pub async fn refresh_auth(&mut self) -> &AuthSession {
        self.state.auth = match self.identity.session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!(error = %e, "Error reading identity session");
                AuthSession::anonymous()
            }
        };
        &self.state.auth
    }

    /// Log in through the identity client, then re-derive the session.
    pub async fn login(&mut self, options: &LoginOptions) -> Result<()> {
        let result = self.identity.login(options).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Login failed");
        }
        self.refresh_auth().await;
        result
    }

    /// Log out through the identity client, then re-derive the session.
    pub async fn logout(&mut self) -> Result<()> {
        let result = self.identity.logout().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Logout failed");
        }
        self.refresh_auth().await;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdentityConfig;
    use crate::error::BlogError;
    use crate::identity::MockIdentityClient;
    use crate::post::Principal;
    use crate::service::MockPostService;
    use mockall::Sequence;

    fn post(id: u64, title: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            content: "C".to_string(),
            author: Some("A".to_string()),
            timestamp: 1_700_000_000_000_000_000,
            author_principal: None,
        }
    }

    fn identity(authenticated: bool) -> MockIdentityClient {
        let mut identity = MockIdentityClient::new();
        identity.expect_session().returning(move || {
            Ok(if authenticated {
                AuthSession {
                    authenticated: true,
                    principal: Some(Principal::parse("aaaaa-aa").unwrap()),
                }
            } else {
                AuthSession::anonymous()
            })
        });
        identity
    }

    fn app(service: MockPostService, identity: MockIdentityClient) -> BlogApp {
        BlogApp::new(Arc::new(service), Arc::new(identity), ViewOptions::default())
    }

    async fn ready_app_with_dialog(service: MockPostService) -> BlogApp {
        let mut app = app(service, identity(true));
        app.mount().await;
        app.open_dialog();
        app.set_draft_field(DraftField::Title, "T");
        app.set_draft_field(DraftField::Content, "C");
        app.set_draft_field(DraftField::Author, "A");
        app
    }

    #[tokio::test]
    async fn test_mount_loads_posts() {
        let mut service = MockPostService::new();
        service
            .expect_get_posts()
            .times(1)
            .returning(|| Ok(vec![post(1, "one"), post(2, "two")]));

        let mut app = app(service, identity(true));
        app.mount().await;

        assert_eq!(app.state().phase(), ViewPhase::Ready);
        assert!(!app.state().is_loading());
        assert_eq!(app.state().posts().len(), 2);
        assert!(app.state().auth().authenticated);
    }

    #[tokio::test]
    async fn test_mount_fetch_failure_clears_loading_with_empty_list() {
        let mut service = MockPostService::new();
        service
            .expect_get_posts()
            .returning(|| Err(BlogError::Transport("connection refused".to_string()).into()));

        let mut app = app(service, identity(false));
        app.mount().await;

        assert_eq!(app.state().phase(), ViewPhase::Error);
        assert!(!app.state().is_loading());
        assert!(app.state().posts().is_empty());
    }

    #[tokio::test]
    async fn test_open_dialog_makes_no_network_call() {
        let mut service = MockPostService::new();
        service.expect_get_posts().times(1).returning(|| Ok(vec![]));
        service.expect_create_post().never();

        let mut app = app(service, identity(true));
        app.mount().await;
        app.open_dialog();
        assert!(app.state().is_dialog_open());
        assert_eq!(app.state().phase(), ViewPhase::Ready);
    }

    #[tokio::test]
    async fn test_cancel_discards_draft() {
        let mut service = MockPostService::new();
        service.expect_get_posts().returning(|| Ok(vec![]));
        let mut app = ready_app_with_dialog(service).await;

        app.cancel_dialog();
        assert!(!app.state().is_dialog_open());
        assert!(app.state().draft().is_empty());
    }

    #[tokio::test]
    async fn test_submit_success_resets_draft_and_refetches() {
        let mut seq = Sequence::new();
        let mut service = MockPostService::new();
        service
            .expect_get_posts()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![]));
        service
            .expect_create_post()
            .withf(|request| {
                request.title == "T"
                    && request.content == "C"
                    && request.author.as_deref() == Some("A")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(CreatePostResult::Ok(post(1, "T"))));
        service
            .expect_get_posts()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![post(1, "T")]));

        let mut app = ready_app_with_dialog(service).await;
        let outcome = app.submit().await;

        assert_eq!(outcome, SubmitOutcome::Created(post(1, "T")));
        assert!(!app.state().is_dialog_open());
        assert_eq!(app.state().draft(), &DraftPost::default());
        assert_eq!(app.state().posts(), &[post(1, "T")]);
        assert_eq!(app.state().phase(), ViewPhase::Ready);
        assert!(!app.state().is_loading());
    }

    #[tokio::test]
    async fn test_submit_application_failure_keeps_dialog_and_draft() {
        let mut service = MockPostService::new();
        service.expect_get_posts().times(1).returning(|| Ok(vec![]));
        service
            .expect_create_post()
            .times(1)
            .returning(|_| Ok(CreatePostResult::Err("invalid title".to_string())));

        let mut app = ready_app_with_dialog(service).await;
        let draft_before = app.state().draft().clone();
        let outcome = app.submit().await;

        assert_eq!(outcome, SubmitOutcome::Failed("invalid title".to_string()));
        assert!(app.state().is_dialog_open());
        assert_eq!(app.state().draft(), &draft_before);
        assert_eq!(app.state().phase(), ViewPhase::Ready);
        assert!(!app.state().is_loading());
    }

    #[tokio::test]
    async fn test_submit_transport_failure_keeps_dialog_and_draft() {
        let mut service = MockPostService::new();
        service.expect_get_posts().times(1).returning(|| Ok(vec![]));
        service
            .expect_create_post()
            .times(1)
            .returning(|_| Err(BlogError::Transport("timeout".to_string()).into()));

        let mut app = ready_app_with_dialog(service).await;
        let outcome = app.submit().await;

        assert!(matches!(outcome, SubmitOutcome::Failed(ref m) if m.contains("timeout")));
        assert!(app.state().is_dialog_open());
        assert_eq!(app.state().draft().title, "T");
        assert_eq!(app.state().phase(), ViewPhase::Error);
    }

    #[tokio::test]
    async fn test_submit_unauthenticated_is_rejected_without_network() {
        let mut service = MockPostService::new();
        service.expect_get_posts().times(1).returning(|| Ok(vec![]));
        service.expect_create_post().never();

        let mut app = app(service, identity(false));
        app.mount().await;
        app.open_dialog();
        app.set_draft_field(DraftField::Title, "T");
        let before = app.state().clone();

        let outcome = app.submit().await;

        assert_eq!(outcome, SubmitOutcome::Rejected(LOGIN_REQUIRED_ALERT.to_string()));
        assert_eq!(app.state(), &before);
    }

    #[tokio::test]
    async fn test_submit_without_login_gate() {
        let mut service = MockPostService::new();
        service.expect_get_posts().returning(|| Ok(vec![]));
        service
            .expect_create_post()
            .times(1)
            .returning(|_| Ok(CreatePostResult::Ok(post(7, "T"))));

        let mut app = BlogApp::new(
            Arc::new(service),
            Arc::new(identity(false)),
            ViewOptions {
                require_login: false,
            },
        );
        app.mount().await;
        app.open_dialog();
        app.set_draft_field(DraftField::Title, "T");

        assert!(matches!(app.submit().await, SubmitOutcome::Created(_)));
    }

    #[tokio::test]
    async fn test_find_post_variants() {
        let mut service = MockPostService::new();
        service
            .expect_get_post_by_id()
            .withf(|id| *id == 42)
            .returning(|_| Ok(None));
        service
            .expect_get_post_by_id()
            .withf(|id| *id == 1)
            .returning(|_| Ok(Some(post(1, "one"))));
        service
            .expect_get_post_by_id()
            .withf(|id| *id == 9)
            .returning(|_| Err(BlogError::Transport("down".to_string()).into()));

        let app = app(service, identity(false));
        assert_eq!(app.find_post(42).await, PostLookup::NotFound(42));
        assert_eq!(app.find_post(1).await, PostLookup::Found(post(1, "one")));
        assert!(matches!(app.find_post(9).await, PostLookup::Failed(_)));
    }

    #[tokio::test]
    async fn test_refresh_auth_error_is_logged_out() {
        let mut identity = MockIdentityClient::new();
        identity
            .expect_session()
            .returning(|| Err(BlogError::Authentication("keyring locked".to_string()).into()));

        let mut app = app(MockPostService::new(), identity);
        let session = app.refresh_auth().await.clone();
        assert_eq!(session, AuthSession::anonymous());
    }

    #[tokio::test]
    async fn test_login_rederives_session() {
        let mut seq = Sequence::new();
        let mut identity = MockIdentityClient::new();
        identity
            .expect_login()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        identity
            .expect_session()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| {
                Ok(AuthSession {
                    authenticated: true,
                    principal: Some(Principal::parse("aaaaa-aa").unwrap()),
                })
            });

        let mut app = app(MockPostService::new(), identity);
        let options = LoginOptions::from_config(&IdentityConfig::default()).unwrap();
        app.login(&options).await.unwrap();
        assert!(app.state().auth().authenticated);
    }

    #[tokio::test]
    async fn test_failed_login_still_rederives_session() {
        let mut identity = MockIdentityClient::new();
        identity
            .expect_login()
            .returning(|_| Err(BlogError::Login("UserInterrupt".to_string()).into()));
        identity
            .expect_session()
            .times(1)
            .returning(|| Ok(AuthSession::anonymous()));

        let mut app = app(MockPostService::new(), identity);
        let options = LoginOptions::from_config(&IdentityConfig::default()).unwrap();
        assert!(app.login(&options).await.is_err());
        assert!(!app.state().auth().authenticated);
    }

    #[tokio::test]
    async fn test_logout_rederives_session() {
        let mut identity = MockIdentityClient::new();
        identity.expect_logout().times(1).returning(|| Ok(()));
        identity
            .expect_session()
            .times(1)
            .returning(|| Ok(AuthSession::anonymous()));

        let mut app = app(MockPostService::new(), identity);
        app.logout().await.unwrap();
        assert!(!app.state().auth().authenticated);
    }
}
