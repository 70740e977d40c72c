use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use quizdeck_api::orm::session::{cleanup_sessions, end_all_sessions, get_active_sessions};
use quizdeck_api::orm::user::get_user_by_email;

use super::utils::establish_connection;

#[derive(Subcommand)]
pub enum SessionAction {
    #[command(about = "Deactivate sessions idle for longer than the cutoff")]
    Cleanup {
        #[arg(long, default_value_t = 24, help = "Idle age in hours beyond which a session expires")]
        max_age_hours: i64,
    },
    #[command(about = "List a user's active sessions")]
    Ls {
        #[arg(short, long, help = "Email address of the user")]
        email: String,
    },
    #[command(about = "Deactivate all of a user's active sessions")]
    Revoke {
        #[arg(short, long, help = "Email address of the user")]
        email: String,
    },
}

pub fn handle_session_command(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = establish_connection()?;
    handle_session_command_with_conn(&mut conn, action)
}

pub fn handle_session_command_with_conn(
    conn: &mut SqliteConnection,
    action: SessionAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Cleanup { max_age_hours } => {
            cleanup_impl(conn, max_age_hours)?;
        }
        SessionAction::Ls { email } => {
            list_sessions_impl(conn, &email)?;
        }
        SessionAction::Revoke { email } => {
            revoke_sessions_impl(conn, &email)?;
        }
    }
    Ok(())
}

/// Runs the idle-expiry pass. This is the scheduled job the API's session
/// lifecycle relies on; wire it to cron with e.g.
/// `quizdeck-admin session cleanup --max-age-hours 24`.
pub fn cleanup_impl(
    conn: &mut SqliteConnection,
    max_age_hours: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let deactivated = cleanup_sessions(conn, max_age_hours)?;
    println!(
        "Deactivated {} session(s) idle for more than {} hour(s).",
        deactivated, max_age_hours
    );
    Ok(())
}

pub fn list_sessions_impl(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = get_user_by_email(conn, email)?
        .ok_or_else(|| format!("No user with email '{}'", email))?;
    let sessions = get_active_sessions(conn, user.id)?;

    if sessions.is_empty() {
        println!("No active sessions for {}.", email);
    } else {
        println!("Active sessions for {}:", email);
        for session in sessions {
            println!(
                "  ID: {}, IP: {}, Agent: {}, Last activity: {}",
                session.id,
                session.client_ip.as_deref().unwrap_or("-"),
                session.client_agent.as_deref().unwrap_or("-"),
                session.last_activity
            );
        }
    }

    Ok(())
}

pub fn revoke_sessions_impl(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = get_user_by_email(conn, email)?
        .ok_or_else(|| format!("No user with email '{}'", email))?;
    let revoked = end_all_sessions(conn, user.id, None)?;
    println!("Deactivated {} session(s) for {}.", revoked, email);
    Ok(())
}
