//! Interactive blog browser
//!
//! A readline loop over [`BlogApp`]: the post list is shown on start and
//! after every refresh, `/new` opens the draft dialog, and plain lines typed
//! while the dialog is open are appended to the draft content.

use std::io::Write;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::commands::special_commands::{help_text, parse_special_command, SpecialCommand};
use crate::commands::{build_app, render_options, write_status};
use crate::config::Config;
use crate::error::Result;
use crate::identity::LoginOptions;
use crate::view::render::{render_draft, render_footer, render_header, render_lookup, render_posts};
use crate::view::{BlogApp, DraftField, RenderOptions, SubmitOutcome};

/// Whether the loop keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Start the interactive browser.
///
/// # Errors
///
/// Returns error if the view cannot be built or the line editor fails to
/// start
pub async fn run_browse(config: Config) -> Result<()> {
    tracing::info!("Starting interactive browser");

    let mut app = build_app(&config)?;
    let options = render_options(&config);
    let mut rl = DefaultEditor::new()?;
    let mut stdout = std::io::stdout();

    app.mount().await;
    print_page(&app, &options, &mut stdout)?;
    println!("Type '/help' for available commands, 'exit' to quit\n");

    loop {
        let prompt = if app.state().is_dialog_open() {
            "new post> "
        } else {
            "blog> "
        };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match handle_line(&mut app, &config, &options, &line, &mut stdout).await {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(e) => {
                        tracing::error!(error = %e, "Command failed");
                        eprintln!("{}", format!("Error: {}", e).red());
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Handle one line of input.
///
/// # Errors
///
/// Returns error if the output cannot be written or a login/logout fails
pub async fn handle_line(
    app: &mut BlogApp,
    config: &Config,
    options: &RenderOptions,
    line: &str,
    out: &mut impl Write,
) -> Result<LoopControl> {
    let command = match parse_special_command(line) {
        Ok(command) => command,
        Err(e) => {
            writeln!(out, "{}", e.to_string().yellow())?;
            return Ok(LoopControl::Continue);
        }
    };

    match command {
        SpecialCommand::None => {
            if app.state().is_dialog_open() {
                app.append_draft_line(line.trim_end());
            } else {
                writeln!(
                    out,
                    "Type '/new' to write a post or '/help' for available commands"
                )?;
            }
        }
        SpecialCommand::NewPost => {
            app.open_dialog();
            writeln!(out, "{}", render_draft(app.state()))?;
            writeln!(
                out,
                "Set fields with /title, /content, /author; type lines to add content; /submit when done"
            )?;
        }
        SpecialCommand::SetTitle(text) => edit_draft(app, DraftField::Title, &text, out)?,
        SpecialCommand::SetContent(text) => edit_draft(app, DraftField::Content, &text, out)?,
        SpecialCommand::SetAuthor(text) => edit_draft(app, DraftField::Author, &text, out)?,
        SpecialCommand::Submit => {
            if !app.state().is_dialog_open() {
                writeln!(out, "No post is open. Type '/new' first")?;
                return Ok(LoopControl::Continue);
            }
            match app.submit().await {
                SubmitOutcome::Created(post) => {
                    writeln!(out, "{}", format!("Created post #{}", post.id).green())?;
                    print_page(app, options, out)?;
                }
                SubmitOutcome::Rejected(alert) => writeln!(out, "{}", alert.yellow())?,
                SubmitOutcome::Failed(message) => writeln!(
                    out,
                    "{}",
                    format!("Could not create post: {}", message).red()
                )?,
            }
        }
        SpecialCommand::Cancel => {
            app.cancel_dialog();
            writeln!(out, "Draft discarded")?;
        }
        SpecialCommand::Refresh => {
            app.fetch_posts().await;
            print_page(app, options, out)?;
        }
        SpecialCommand::Show(id) => {
            let lookup = app.find_post(id).await;
            writeln!(out, "{}", render_lookup(&lookup, options))?;
        }
        SpecialCommand::Whoami => match app.whoami().await {
            Ok(principal) => writeln!(out, "{}", principal)?,
            Err(e) => writeln!(out, "{}", format!("Could not reach service: {}", e).red())?,
        },
        SpecialCommand::Login => {
            let login_options = LoginOptions::from_config(&config.identity)?;
            app.login(&login_options).await?;
            writeln!(out, "{}", render_header(app.state()))?;
        }
        SpecialCommand::Logout => {
            app.logout().await?;
            writeln!(out, "{}", render_header(app.state()))?;
        }
        SpecialCommand::Status => {
            write_status(app, config, out)?;
            if app.state().is_dialog_open() {
                writeln!(out, "{}", render_draft(app.state()))?;
            }
        }
        SpecialCommand::Help => writeln!(out, "{}", help_text())?,
        SpecialCommand::Exit => return Ok(LoopControl::Exit),
    }

    Ok(LoopControl::Continue)
}

fn edit_draft(
    app: &mut BlogApp,
    field: DraftField,
    value: &str,
    out: &mut impl Write,
) -> Result<()> {
    app.open_dialog();
    app.set_draft_field(field, value);
    writeln!(out, "{}", render_draft(app.state()))?;
    Ok(())
}

fn print_page(app: &BlogApp, options: &RenderOptions, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}\n", render_header(app.state()))?;
    writeln!(out, "{}\n", render_posts(app.state(), options))?;
    writeln!(out, "{}", render_footer())?;
    Ok(())
}
