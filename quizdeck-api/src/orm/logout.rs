//! Database operations for user logout and session revocation.

use crate::DbConn;
use crate::orm::session::end_session;

/// Revokes a session by marking it inactive in the database.
///
/// The session record is retained for auditing; only the `is_active` flag
/// changes. Unknown or already-ended session ids are a no-op.
///
/// # Returns
/// * `Ok(bool)` - Whether a session was actually deactivated
/// * `Err(diesel::result::Error)` - Database operation failed
pub async fn revoke_session(db: &DbConn, session_id: &str) -> Result<bool, diesel::result::Error> {
    let session_id = session_id.to_string();
    db.run(move |conn| end_session(conn, &session_id)).await
}
