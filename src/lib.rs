//! Cryptoblog - terminal client library for the Crypto Blog post service
//!
//! This library provides the typed binding to the post service, the
//! identity client that gates post creation, and the blog view that ties
//! them together.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `post`: Post records, create requests and principals
//! - `service`: The post service trait with HTTP and in-memory backends
//! - `identity`: Login flow, session storage and the identity client
//! - `view`: View state, handlers and text rendering
//! - `commands`: CLI command handlers and the interactive browser
//! - `config`: Configuration management and validation
//! - `logging`: Tracing subscriber setup
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use cryptoblog::cli::Cli;
//! use cryptoblog::commands::build_app;
//! use cryptoblog::Config;
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cli = Cli::parse_from(["cryptoblog", "--offline"]);
//!     let config = Config::load("config.yaml", &cli)?;
//!     config.validate()?;
//!
//!     let mut app = build_app(&config)?;
//!     app.mount().await;
//!     println!("{} posts", app.state().posts().len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod post;
pub mod service;
pub mod view;

// Re-export commonly used types
pub use config::Config;
pub use error::{BlogError, Result};
pub use identity::{AuthSession, IdentityClient, LoginOptions};
pub use post::{CreatePostResult, NewPost, Post, Principal};
pub use service::PostService;
pub use view::{BlogApp, ViewState};
