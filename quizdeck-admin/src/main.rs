/*!
 * Quizdeck Administrative CLI Utility
 *
 * This is a command-line interface for administrative management of a
 * quizdeck instance's SQLite database. The utility provides user
 * management, session maintenance, and quiz management, including bulk
 * import of multiple-choice questions from the Open Trivia DB.
 *
 * The CLI leverages the ORM functions in quizdeck-api for all database
 * manipulations, ensuring consistent data access patterns across the API
 * server and this tool. Session cleanup in particular is the scheduled
 * counterpart of the API's idle-expiry policy: run `session cleanup` from
 * cron (or similar) to expire idle sessions out-of-band.
 *
 * For detailed usage information and available commands, run with --help.
 */

use clap::{Parser, Subcommand};

mod admin_cli;

use admin_cli::quiz_commands::{QuizAction, handle_quiz_command};
use admin_cli::session_commands::{SessionAction, handle_session_command};
use admin_cli::user_commands::{UserAction, handle_user_command};

#[derive(Parser)]
#[command(name = "quizdeck-admin")]
#[command(about = "Administrative CLI for quizdeck database management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    Quiz {
        #[command(subcommand)]
        action: QuizAction,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::User { action } => handle_user_command(action)?,
        Commands::Session { action } => handle_session_command(action)?,
        Commands::Quiz { action } => handle_quiz_command(action).await?,
    }

    Ok(())
}
