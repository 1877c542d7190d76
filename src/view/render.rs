//! Text rendering of the blog view
//!
//! Pure functions from [`ViewState`] to terminal text. Each post becomes a
//! card with its title, content, creation time, and author when present.

use std::fmt::Write as _;

use chrono::{DateTime, Local};
use colored::Colorize;

use crate::post::Post;
use crate::view::app::PostLookup;
use crate::view::state::ViewState;

/// Application title shown in the header.
pub const APP_TITLE: &str = "Crypto Blog";

/// Rendering settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// `strftime` format for post timestamps
    pub date_format: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    }
}

/// Format a nanosecond timestamp in local time.
///
/// Falls back to RFC 3339 when `format` contains an invalid specifier.
pub fn format_timestamp(nanos: i64, format: &str) -> String {
    let time = DateTime::from_timestamp_nanos(nanos).with_timezone(&Local);
    let mut formatted = String::new();
    match write!(formatted, "{}", time.format(format)) {
        Ok(()) => formatted,
        Err(_) => time.to_rfc3339(),
    }
}

/// Render one post as a card.
pub fn render_card(post: &Post, options: &RenderOptions) -> String {
    let mut footer = format_timestamp(post.timestamp, &options.date_format)
        .dimmed()
        .to_string();
    if let Some(author) = &post.author {
        footer.push_str("  ");
        footer.push_str(&format!("by {}", author).italic().to_string());
    }

    format!(
        "{} {}\n{}\n{}",
        format!("#{}", post.id).dimmed(),
        post.title.bold(),
        post.content,
        footer
    )
}

/// One card per post, in list order.
pub fn cards(state: &ViewState, options: &RenderOptions) -> Vec<String> {
    state
        .posts()
        .iter()
        .map(|post| render_card(post, options))
        .collect()
}

/// Render the post list area: a loading indicator, an empty-state
/// message, or the cards separated by blank lines.
pub fn render_posts(state: &ViewState, options: &RenderOptions) -> String {
    if state.is_loading() {
        return "Loading posts...".to_string();
    }
    if state.posts().is_empty() {
        return "No posts yet.".to_string();
    }
    cards(state, options).join("\n\n")
}

/// Render the result of a single post lookup.
pub fn render_lookup(lookup: &PostLookup, options: &RenderOptions) -> String {
    match lookup {
        PostLookup::Found(post) => render_card(post, options),
        PostLookup::NotFound(id) => format!("Post #{} not found", id),
        PostLookup::Failed(message) => format!("Could not load post: {}", message),
    }
}

/// Header line with the session summary.
pub fn render_header(state: &ViewState) -> String {
    let session = match (&state.auth().authenticated, &state.auth().principal) {
        (true, Some(principal)) => format!("logged in as {}", principal),
        (true, None) => "logged in".to_string(),
        (false, _) => "not logged in".to_string(),
    };
    format!("{}  ({})", APP_TITLE.bold(), session)
}

/// Draft editor summary shown while the dialog is open.
pub fn render_draft(state: &ViewState) -> String {
    let draft = state.draft();
    let author = if draft.author.trim().is_empty() {
        "(none)".to_string()
    } else {
        draft.author.clone()
    };
    format!(
        "{}\n  Title:   {}\n  Content: {}\n  Author:  {}",
        "Create New Post".bold(),
        draft.title,
        draft.content.replace('\n', "\n           "),
        author
    )
}

/// Footer line.
pub fn render_footer() -> String {
    format!("© 2023 {}. All rights reserved.", APP_TITLE)
        .dimmed()
        .to_string()
}
