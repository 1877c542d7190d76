//! View state container
//!
//! Everything the blog view knows lives in [`ViewState`]. Only
//! [`BlogApp`](crate::view::BlogApp) handlers mutate it, which keeps every
//! transition testable without rendering.

use std::fmt;

use crate::identity::AuthSession;
use crate::post::{NewPost, Post};

/// Lifecycle phase of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPhase {
    /// Posts not fetched yet
    #[default]
    Loading,
    /// Posts populated; the dialog may be open or closed
    Ready,
    /// A create-post request is in flight
    Submitting,
    /// The last fetch or create call failed; rendered like `Ready`
    Error,
}

impl fmt::Display for ViewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Submitting => write!(f, "submitting"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Editable field of the draft post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Content,
    Author,
}

/// Uncommitted post fields, held only until submission or cancel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftPost {
    pub title: String,
    pub content: String,
    pub author: String,
}

impl DraftPost {
    /// Returns `true` when no field has been filled in.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.content.is_empty() && self.author.is_empty()
    }

    /// Replace one field.
    pub fn set(&mut self, field: DraftField, value: &str) {
        match field {
            DraftField::Title => self.title = value.to_string(),
            DraftField::Content => self.content = value.to_string(),
            DraftField::Author => self.author = value.to_string(),
        }
    }

    /// Append a line to the content.
    pub fn append_content_line(&mut self, line: &str) {
        if !self.content.is_empty() {
            self.content.push('\n');
        }
        self.content.push_str(line);
    }

    /// The create request for this draft; a blank author becomes absent.
    pub fn to_request(&self) -> NewPost {
        NewPost::new(&self.title, &self.content, Some(&self.author))
    }
}

/// State of the blog view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub(crate) phase: ViewPhase,
    pub(crate) posts: Vec<Post>,
    pub(crate) loading: bool,
    pub(crate) dialog_open: bool,
    pub(crate) draft: DraftPost,
    pub(crate) auth: AuthSession,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            phase: ViewPhase::Loading,
            posts: Vec::new(),
            loading: true,
            dialog_open: false,
            draft: DraftPost::default(),
            auth: AuthSession::anonymous(),
        }
    }
}

impl ViewState {
    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open
    }

    pub fn draft(&self) -> &DraftPost {
        &self.draft
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }
}
