//! Cryptoblog - terminal client for the Crypto Blog post service
//!
#![doc = "Cryptoblog - terminal client for the Crypto Blog post service"]
#![doc = "Main entry point for the cryptoblog application."]

use anyhow::Result;

use cryptoblog::cli::{Cli, Commands};
use cryptoblog::commands;
use cryptoblog::config::Config;
use cryptoblog::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    init_logging(&config.logging)?;
    tracing::debug!(backend = %config.service.backend, "Configuration loaded");

    let command = cli.command_or_default();
    if command == Commands::Browse {
        return commands::browse::run_browse(config).await;
    }

    let mut app = commands::build_app(&config)?;
    let options = commands::render_options(&config);
    let mut stdout = std::io::stdout();

    match command {
        Commands::Browse => Ok(()),
        Commands::List => commands::list_posts(&mut app, &options, &mut stdout).await,
        Commands::Show { id } => commands::show_post(&mut app, id, &options, &mut stdout).await,
        Commands::Create {
            title,
            content,
            author,
        } => {
            tracing::info!("Creating post");
            commands::create_post(
                &mut app,
                &title,
                &content,
                author.as_deref(),
                &options,
                &mut stdout,
            )
            .await
        }
        Commands::Whoami => commands::whoami(&app, &mut stdout).await,
        Commands::Login => {
            tracing::info!("Starting login");
            commands::login(&mut app, &config, &mut stdout).await
        }
        Commands::Logout => commands::logout(&mut app, &mut stdout).await,
        Commands::Status => commands::status(&mut app, &config, &mut stdout).await,
    }
}
