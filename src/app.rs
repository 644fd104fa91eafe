//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use std::process;

/// Checks if setup is needed (version mismatch or missing config) and runs setup if required.
///
/// Called early in the startup sequence, before command handling. Setup runs
/// when the config file is missing or carries an older version; a matching
/// version is a no-op.
async fn check_and_run_setup() -> Result<(), anyhow::Error> {
    let config_path = crate::config::config_path()?;

    let Some(old_version) = crate::setup::version::check_setup_needed(&config_path)? else {
        tracing::debug!("Config version up to date ({})", env!("CARGO_PKG_VERSION"));
        return Ok(());
    };

    tracing::info!(
        "Setup needed - migrating from version {} to {}",
        old_version,
        env!("CARGO_PKG_VERSION")
    );
    crate::setup::run_setup().map_err(|e| {
        tracing::error!("Setup failed: {e}");
        anyhow!("Setup failed: {e}")
    })?;
    crate::setup::version::update_config_version(&config_path).map_err(|e| {
        tracing::error!("Failed to update config version: {e}");
        anyhow!("Failed to update config version: {e}")
    })?;
    tracing::info!(
        "Setup completed - config now at version {}",
        env!("CARGO_PKG_VERSION")
    );

    Ok(())
}

/// A terminal voice recorder for the Storytime kids' story service
#[derive(Parser)]
#[command(name = "storytime")]
#[command(version)]
#[command(about = "\n\n ✶ storytime \n")]
#[command(long_about = "\n\n ✶ storytime \n\nRecord what happened in your day, let the Storytime service turn it into\nan illustrated story, and open the result in the browser.\n\nDEFAULT COMMAND:\n    If no command is specified, 'record' is used by default.\n\nEXAMPLES:\n    # Record a story idea and create a story\n    $ storytime\n    $ storytime record\n    \n    # Pick the mood for this session first\n    $ storytime mood\n    $ storytime mood excited\n    \n    # Re-submit a saved recording\n    $ storytime submit recording.webm\n    \n    # Browse the stories created so far\n    $ storytime history\n    \n    # Edit configuration file\n    $ storytime config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/storytime/storytime.toml\n    Logs:               ~/.local/state/storytime/storytime.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a story idea with real-time visualization (default)
    ///
    /// Press Enter to create your story, Space to pause/resume, 't' to switch
    /// to typing on the website, Escape/q to cancel.
    #[command(visible_alias = "r")]
    Record,

    /// Submit a previously recorded audio file
    ///
    /// Runs the same upload and story-creation sequence on an existing file.
    /// Useful when a submission failed and you don't want to re-record.
    ///
    /// Examples:
    ///   storytime submit recording.webm
    ///   storytime submit voice-memo.ogg
    #[command(visible_alias = "s")]
    Submit {
        /// Path to the audio file to submit
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show or set the session mood
    ///
    /// The mood colors the story that gets created. Without an argument an
    /// interactive picker is shown; with one, the value is stored directly.
    #[command(visible_alias = "m")]
    Mood {
        /// Mood value to store (e.g. "excited"); omit for the picker
        #[arg(value_name = "MOOD")]
        value: Option<String>,
    },

    /// View stories created so far
    ///
    /// Browse previous stories and reopen one in the browser.
    #[command(visible_alias = "h")]
    History,

    /// Open configuration file in your preferred editor
    ///
    /// Edit the service URLs, audio settings and child identifier.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in storytime.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Generate completion script for your shell. Save the output to your
    /// shell's completion directory or source it directly.
    ///
    /// Examples:
    ///   storytime completions bash > storytime.bash
    ///   storytime completions zsh > _storytime
    ///   storytime completions fish > storytime.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Exit Codes
/// - 0: Success
/// - 1: General error
/// - 2: Usage error (invalid arguments)
///
/// # Errors
/// - If setup fails
/// - If logging initialization fails
/// - If command execution fails (e.g., recording, submission, history viewing)
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging or config setup
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "storytime", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return exit_on_error(commands::handle_list_devices()),
        Some(Commands::Logs) => return exit_on_error(commands::handle_logs()),
        _ => {}
    }

    // Initialize logging for all other commands
    logging::init_logging()?;

    // Check if setup is needed (version check or missing config)
    check_and_run_setup().await?;

    // Route to appropriate command handler
    match cli.command {
        None | Some(Commands::Record) => {
            commands::handle_record().await?;
        }
        Some(Commands::Submit { file }) => {
            commands::handle_submit(file).await?;
        }
        Some(Commands::Mood { value }) => {
            if let Err(e) = commands::handle_mood(value).await {
                // Check if it's a cancellation error (cliclack already displayed the message)
                let err_msg = e.to_string();
                if err_msg.contains("cancelled") || err_msg.contains("interrupted") {
                    // Silent exit - cliclack already showed "Operation cancelled"
                    process::exit(0);
                } else {
                    return Err(e);
                }
            }
        }
        Some(Commands::History) => {
            commands::handle_history().await?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

/// Prints the error and exits non-zero; for commands that run before logging is up.
fn exit_on_error(result: Result<(), anyhow::Error>) -> Result<(), anyhow::Error> {
    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
    Ok(())
}
