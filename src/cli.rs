//! Command-line interface definition for Cryptoblog
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive browser and one-shot post and session commands.

use clap::{Parser, Subcommand};

/// Cryptoblog - terminal client for the Crypto Blog post service
///
/// Lists posts, shows single posts, and creates new ones behind an
/// optional login gate.
#[derive(Parser, Debug, Clone)]
#[command(name = "cryptoblog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "CRYPTOBLOG_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the post service endpoint from config
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Use the in-process post store and a local identity instead of the
    /// remote service
    #[arg(long)]
    pub offline: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Command to execute (defaults to `browse`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for Cryptoblog
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Browse posts interactively and write new ones
    Browse,

    /// Print all posts
    List,

    /// Print a single post
    Show {
        /// Post identifier
        id: u64,
    },

    /// Create a new post
    Create {
        /// Post title
        #[arg(short, long)]
        title: String,

        /// Post content
        #[arg(short, long, default_value = "")]
        content: String,

        /// Optional author display name
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Show how the post service sees the caller
    Whoami,

    /// Log in with the identity provider
    Login,

    /// Forget the current session
    Logout,

    /// Show the current session
    Status,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The command to run, falling back to the interactive browser
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Browse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_command_defaults_to_browse() {
        let cli = Cli::try_parse_from(["cryptoblog"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.command_or_default(), Commands::Browse);
        assert!(!cli.offline);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_show() {
        let cli = Cli::try_parse_from(["cryptoblog", "show", "42"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Show { id: 42 }));
    }

    #[test]
    fn test_cli_parse_show_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["cryptoblog", "show", "abc"]).is_err());
    }

    #[test]
    fn test_cli_parse_create() {
        let cli = Cli::try_parse_from([
            "cryptoblog",
            "create",
            "--title",
            "T",
            "--content",
            "C",
            "--author",
            "A",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Create {
                title: "T".to_string(),
                content: "C".to_string(),
                author: Some("A".to_string()),
            })
        );
    }

    #[test]
    fn test_cli_parse_create_requires_title() {
        assert!(Cli::try_parse_from(["cryptoblog", "create", "--content", "C"]).is_err());
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "cryptoblog",
            "--offline",
            "--endpoint",
            "http://localhost:8000",
            "list",
        ])
        .unwrap();
        assert!(cli.offline);
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(cli.command, Some(Commands::List));
    }

    #[test]
    fn test_cli_parse_session_commands() {
        for (arg, expected) in [
            ("login", Commands::Login),
            ("logout", Commands::Logout),
            ("status", Commands::Status),
            ("whoami", Commands::Whoami),
        ] {
            let cli = Cli::try_parse_from(["cryptoblog", arg]).unwrap();
            assert_eq!(cli.command, Some(expected));
        }
    }
}
