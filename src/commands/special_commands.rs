//! Special commands parser for the interactive blog browser
//!
//! Commands are prefixed with `/`; the command word is case-insensitive,
//! arguments keep their case. Plain text is not a command: while the new
//! post dialog is open it is appended to the draft content.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed in the interactive browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Open the new post dialog
    NewPost,

    /// Set the draft title
    SetTitle(String),

    /// Replace the draft content
    SetContent(String),

    /// Set the draft author; an empty value clears it
    SetAuthor(String),

    /// Submit the draft
    Submit,

    /// Close the dialog and discard the draft
    Cancel,

    /// Reload the post list
    Refresh,

    /// Show a single post
    Show(u64),

    /// Show how the service sees the caller
    Whoami,

    /// Log in with the identity provider
    Login,

    /// Forget the current session
    Logout,

    /// Show session and draft status
    Status,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use cryptoblog::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// let cmd = parse_special_command("/title Hello World").unwrap();
/// assert_eq!(cmd, SpecialCommand::SetTitle("Hello World".to_string()));
///
/// let cmd = parse_special_command("/show 42").unwrap();
/// assert_eq!(cmd, SpecialCommand::Show(42));
///
/// let cmd = parse_special_command("just some text").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    let no_argument = |command: SpecialCommand| {
        if rest.is_empty() {
            Ok(command)
        } else {
            Err(CommandError::UnsupportedArgument {
                command: word.clone(),
                arg: rest.to_string(),
            })
        }
    };

    match word.as_str() {
        "/new" => no_argument(SpecialCommand::NewPost),
        "/submit" | "/create" => no_argument(SpecialCommand::Submit),
        "/cancel" => no_argument(SpecialCommand::Cancel),
        "/refresh" | "/list" => no_argument(SpecialCommand::Refresh),
        "/whoami" => no_argument(SpecialCommand::Whoami),
        "/login" => no_argument(SpecialCommand::Login),
        "/logout" => no_argument(SpecialCommand::Logout),
        "/status" => no_argument(SpecialCommand::Status),
        "/help" | "/?" => no_argument(SpecialCommand::Help),
        "/exit" | "/quit" => no_argument(SpecialCommand::Exit),

        "/title" if rest.is_empty() => Err(CommandError::MissingArgument {
            command: "/title".to_string(),
            usage: "/title <text>".to_string(),
        }),
        "/title" => Ok(SpecialCommand::SetTitle(rest.to_string())),

        "/content" if rest.is_empty() => Err(CommandError::MissingArgument {
            command: "/content".to_string(),
            usage: "/content <text>".to_string(),
        }),
        "/content" => Ok(SpecialCommand::SetContent(rest.to_string())),

        "/author" => Ok(SpecialCommand::SetAuthor(rest.to_string())),

        "/show" if rest.is_empty() => Err(CommandError::MissingArgument {
            command: "/show".to_string(),
            usage: "/show <id>".to_string(),
        }),
        "/show" => rest
            .parse::<u64>()
            .map(SpecialCommand::Show)
            .map_err(|_| CommandError::UnsupportedArgument {
                command: "/show".to_string(),
                arg: rest.to_string(),
            }),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Help text for the interactive browser
pub fn help_text() -> &'static str {
    r#"
Commands for the Interactive Blog Browser
=========================================

READING:
  /refresh        - Reload all posts (alias: /list)
  /show <id>      - Show a single post

WRITING:
  /new            - Open the new post dialog
  /title <text>   - Set the title
  /content <text> - Replace the content
  /author [text]  - Set the author; leave empty to clear
  /submit         - Create the post (alias: /create)
  /cancel         - Close the dialog and discard the draft

SESSION:
  /login          - Log in with the identity provider
  /logout         - Forget the current session
  /whoami         - Show how the post service sees you
  /status         - Show session and draft status
  /help           - Show this help message (alias: /?)
  exit            - Leave the browser (alias: quit)

NOTES:
  - Command words are case-insensitive; arguments keep their case
  - While the dialog is open, plain text lines are appended to the content
  - Creating posts requires a login unless view.require_login is false
"#
}
