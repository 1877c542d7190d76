//! Post records and the request/response shapes of the post service
//!
//! These types mirror the remote service interface exactly. Optional
//! fields (`author`, `author_principal`) are `Option`s so that "absent" is
//! an explicit, checked state rather than an empty string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BlogError;

/// Textual form of the anonymous principal.
const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

/// Stable identity reference for a caller.
///
/// Principals are carried in their textual form (lowercase base32 groups
/// separated by dashes). Parsing only checks the character set; the
/// identity provider is the authority on what a principal means.
///
/// # Examples
///
/// ```
/// use cryptoblog::post::Principal;
///
/// let principal: Principal = "aaaaa-aa".parse().unwrap();
/// assert_eq!(principal.as_str(), "aaaaa-aa");
/// assert!(!principal.is_anonymous());
///
/// assert!("Not A Principal".parse::<Principal>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Parse a principal from its textual form.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::InvalidPrincipal`] when the text is empty or
    /// contains characters other than `a-z`, `0-9` and `-`.
    pub fn parse(text: &str) -> Result<Self, BlogError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BlogError::InvalidPrincipal(
                "principal cannot be empty".to_string(),
            ));
        }
        if text.starts_with('-') || text.ends_with('-') {
            return Err(BlogError::InvalidPrincipal(text.to_string()));
        }
        let valid = text
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(BlogError::InvalidPrincipal(text.to_string()));
        }
        Ok(Self(text.to_string()))
    }

    /// The principal used for callers without a session.
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL.to_string())
    }

    /// Returns `true` for the anonymous principal.
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL
    }

    /// Textual form of the principal.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = BlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = BlogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> Self {
        value.0
    }
}

/// A published blog post.
///
/// `id` and `timestamp` are assigned by the post service when the post is
/// created; the client never changes a received post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier, assigned monotonically by the service.
    pub id: u64,
    /// Post title. Never empty for posts accepted by the service.
    pub title: String,
    /// Post body.
    pub content: String,
    /// Optional display name chosen by the writer.
    #[serde(default)]
    pub author: Option<String>,
    /// Creation instant in nanoseconds since the Unix epoch.
    pub timestamp: i64,
    /// Principal of the caller that created the post, when authenticated.
    #[serde(default)]
    pub author_principal: Option<Principal>,
}

/// Arguments of a `createPost` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
}

impl NewPost {
    /// Build a request, normalizing a blank author to `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cryptoblog::post::NewPost;
    ///
    /// let request = NewPost::new("T", "C", Some("  "));
    /// assert_eq!(request.author, None);
    ///
    /// let request = NewPost::new("T", "C", Some("Ada"));
    /// assert_eq!(request.author.as_deref(), Some("Ada"));
    /// ```
    pub fn new(title: &str, content: &str, author: Option<&str>) -> Self {
        let author = author
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);
        Self {
            title: title.to_string(),
            content: content.to_string(),
            author,
        }
    }
}

/// Outcome of a `createPost` call as reported by the service.
///
/// On the wire this is the variant `{"ok": Post}` or `{"err": "message"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatePostResult {
    Ok(Post),
    Err(String),
}

impl CreatePostResult {
    /// Convert into a standard `Result`.
    pub fn into_result(self) -> std::result::Result<Post, String> {
        match self {
            Self::Ok(post) => Ok(post),
            Self::Err(message) => Err(message),
        }
    }
}

impl From<std::result::Result<Post, String>> for CreatePostResult {
    fn from(value: std::result::Result<Post, String>) -> Self {
        match value {
            Ok(post) => Self::Ok(post),
            Err(message) => Self::Err(message),
        }
    }
}
