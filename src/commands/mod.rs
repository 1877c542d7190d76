/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- [`browse`] -- the interactive blog browser
- one-shot handlers ([`list_posts`], [`show_post`], [`create_post`],
  [`whoami`], [`login`], [`logout`], [`status`]) that mount the view,
  perform one action, and print the result

Handlers write their user-facing output to the supplied writer so they can
be driven from tests; diagnostics go through `tracing`.
*/

use std::io::Write;

use colored::Colorize;

use crate::config::Config;
use crate::error::{BlogError, Result};
use crate::identity::{create_identity_client, LoginOptions};
use crate::service::create_service;
use crate::view::render::{render_lookup, render_posts};
use crate::view::{
    BlogApp, DraftField, PostLookup, RenderOptions, SubmitOutcome, ViewOptions, ViewPhase,
};

pub mod browse;
pub mod special_commands;

/// Build the blog view for the configured backend.
///
/// # Errors
///
/// Returns error if the identity client or post service cannot be created
pub fn build_app(config: &Config) -> Result<BlogApp> {
    let identity = create_identity_client(&config.service.backend, &config.identity)?;
    let service = create_service(&config.service, identity.clone())?;
    Ok(BlogApp::new(
        service,
        identity,
        ViewOptions {
            require_login: config.view.require_login,
        },
    ))
}

/// Rendering settings from the view configuration.
pub fn render_options(config: &Config) -> RenderOptions {
    RenderOptions {
        date_format: config.view.date_format.clone(),
    }
}

/// Print every post.
///
/// # Errors
///
/// Returns a transport error if the post list could not be loaded
pub async fn list_posts(
    app: &mut BlogApp,
    options: &RenderOptions,
    out: &mut impl Write,
) -> Result<()> {
    app.mount().await;
    if app.state().phase() == ViewPhase::Error {
        return Err(BlogError::Transport("could not load posts".to_string()).into());
    }
    writeln!(out, "{}", render_posts(app.state(), options))?;
    Ok(())
}

/// Print a single post.
///
/// # Errors
///
/// Returns error if the post does not exist or could not be loaded
pub async fn show_post(
    app: &mut BlogApp,
    id: u64,
    options: &RenderOptions,
    out: &mut impl Write,
) -> Result<()> {
    let lookup = app.find_post(id).await;
    writeln!(out, "{}", render_lookup(&lookup, options))?;
    match lookup {
        PostLookup::Found(_) => Ok(()),
        PostLookup::NotFound(id) => {
            Err(BlogError::NotFound(format!("post {} does not exist", id)).into())
        }
        PostLookup::Failed(message) => Err(BlogError::Transport(message).into()),
    }
}

/// Create a post from the given fields and print it.
///
/// # Errors
///
/// Returns [`BlogError::NotAuthenticated`] when the login gate rejects the
/// request, or the service's message when creation fails
pub async fn create_post(
    app: &mut BlogApp,
    title: &str,
    content: &str,
    author: Option<&str>,
    options: &RenderOptions,
    out: &mut impl Write,
) -> Result<()> {
    app.mount().await;
    app.open_dialog();
    app.set_draft_field(DraftField::Title, title);
    app.set_draft_field(DraftField::Content, content);
    app.set_draft_field(DraftField::Author, author.unwrap_or_default());

    match app.submit().await {
        SubmitOutcome::Created(post) => {
            writeln!(out, "{}", format!("Created post #{}", post.id).green())?;
            writeln!(out, "{}", crate::view::render::render_card(&post, options))?;
            Ok(())
        }
        SubmitOutcome::Rejected(alert) => Err(BlogError::NotAuthenticated(alert).into()),
        SubmitOutcome::Failed(message) => {
            Err(BlogError::Transport(format!("could not create post: {}", message)).into())
        }
    }
}

/// Print the caller as seen by the post service.
///
/// # Errors
///
/// Returns a transport error if the service cannot be reached
pub async fn whoami(app: &BlogApp, out: &mut impl Write) -> Result<()> {
    let principal = app.whoami().await?;
    writeln!(out, "{}", principal)?;
    Ok(())
}

/// Run the login flow and report the new session.
///
/// # Errors
///
/// Returns error if the login flow fails
pub async fn login(app: &mut BlogApp, config: &Config, out: &mut impl Write) -> Result<()> {
    let options = LoginOptions::from_config(&config.identity)?;
    app.login(&options).await?;
    match &app.state().auth().principal {
        Some(principal) => writeln!(out, "{}", format!("Logged in as {}", principal).green())?,
        None => writeln!(out, "{}", "Logged in".green())?,
    }
    Ok(())
}

/// Forget the current session.
///
/// # Errors
///
/// Returns error if the stored session cannot be removed
pub async fn logout(app: &mut BlogApp, out: &mut impl Write) -> Result<()> {
    app.logout().await?;
    writeln!(out, "Logged out")?;
    Ok(())
}

/// Print backend and session status.
///
/// # Errors
///
/// Returns error if the output cannot be written
pub async fn status(app: &mut BlogApp, config: &Config, out: &mut impl Write) -> Result<()> {
    app.refresh_auth().await;
    write_status(app, config, out)
}

pub(crate) fn write_status(app: &BlogApp, config: &Config, out: &mut impl Write) -> Result<()> {
    let auth = app.state().auth();
    writeln!(out, "Backend:       {}", config.service.backend)?;
    if config.service.backend == "http" {
        writeln!(out, "Endpoint:      {}", config.service.endpoint)?;
    }
    writeln!(
        out,
        "Session:       {}",
        if auth.authenticated {
            "logged in"
        } else {
            "not logged in"
        }
    )?;
    if let Some(principal) = &auth.principal {
        writeln!(out, "Principal:     {}", principal)?;
    }
    writeln!(
        out,
        "Login gate:    {}",
        if app.options().require_login {
            "on"
        } else {
            "off"
        }
    )?;
    Ok(())
}
