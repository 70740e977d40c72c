//! Database operations for the session lifecycle.
//!
//! Sessions bind the opaque token a client presents (via its cookie) to a
//! user account. All state transitions live here: creation at login,
//! activity bumps on every validated request, explicit and bulk revocation,
//! and age-based cleanup. Rows are flagged inactive rather than deleted so
//! the table doubles as a login audit trail.

use chrono::{Duration, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::client_info::ClientInfo;
use crate::models::{NewSession, Session, SessionInfo};

/// Creates a new active session for a user and returns the stored row.
///
/// The session id is a freshly generated v4 UUID, so it is unique among all
/// sessions ever created. `created_at` and `last_activity` both start at
/// now. Client metadata (IP address, user agent) is captured verbatim and
/// never updated afterwards.
pub fn create_session(
    conn: &mut SqliteConnection,
    owner_id: i32,
    client: &ClientInfo,
) -> Result<Session, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    let now = Utc::now().naive_utc();
    let new_session = NewSession {
        id: Uuid::new_v4().to_string(),
        user_id: owner_id,
        client_ip: client.ip_address.clone(),
        client_agent: client.user_agent.clone(),
        created_at: now,
        last_activity: now,
        is_active: true,
    };
    let token = new_session.id.clone();

    diesel::insert_into(sessions)
        .values(&new_session)
        .execute(conn)?;

    sessions.filter(id.eq(token)).first::<Session>(conn)
}

/// Validates a presented session token.
///
/// Returns `Ok(false)` when no session with that id exists or the session
/// has been deactivated. On success the session's `last_activity` is bumped
/// to now; this is the only path that extends a session's life. The bump and
/// the validity check are a single UPDATE, so concurrent validations of the
/// same session are last-write-wins on `last_activity` and nothing else.
pub fn validate_session(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    let updated = diesel::update(
        sessions.filter(id.eq(session_id)).filter(is_active.eq(true)),
    )
    .set(last_activity.eq(Utc::now().naive_utc()))
    .execute(conn)?;

    Ok(updated > 0)
}

/// Deactivates a single session.
///
/// Returns whether a row actually changed: `Ok(false)` for an unknown id or
/// a session that was already inactive, making the operation idempotent.
/// The row itself is retained for auditing.
pub fn end_session(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    let updated = diesel::update(
        sessions.filter(id.eq(session_id)).filter(is_active.eq(true)),
    )
    .set(is_active.eq(false))
    .execute(conn)?;

    Ok(updated > 0)
}

/// Deactivates every active session owned by a user, optionally sparing one.
///
/// The `except_session_id` form backs "log out other devices": the caller's
/// own session survives while everything else is revoked. The whole batch is
/// a single UPDATE statement, so a concurrently created session either sees
/// the update or doesn't; there is no partially processed state.
///
/// Returns the number of sessions deactivated.
pub fn end_all_sessions(
    conn: &mut SqliteConnection,
    owner_id: i32,
    except_session_id: Option<&str>,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    match except_session_id {
        Some(keep) => diesel::update(
            sessions
                .filter(user_id.eq(owner_id))
                .filter(is_active.eq(true))
                .filter(id.ne(keep)),
        )
        .set(is_active.eq(false))
        .execute(conn),
        None => diesel::update(
            sessions.filter(user_id.eq(owner_id)).filter(is_active.eq(true)),
        )
        .set(is_active.eq(false))
        .execute(conn),
    }
}

/// Deactivates every active session idle for longer than `max_age_hours`.
///
/// A session is idle when its `last_activity` is older than the cutoff;
/// there is no absolute expiry. This is the only mechanism that expires idle
/// sessions and is meant to run from a scheduled job (see quizdeck-admin),
/// not inline with request handling. One UPDATE statement; calling it twice
/// in a row deactivates nothing the second time.
///
/// Returns the number of sessions deactivated.
pub fn cleanup_sessions(
    conn: &mut SqliteConnection,
    max_age_hours: i64,
) -> Result<usize, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    let cutoff = Utc::now().naive_utc() - Duration::hours(max_age_hours);
    diesel::update(
        sessions
            .filter(is_active.eq(true))
            .filter(last_activity.lt(cutoff)),
    )
    .set(is_active.eq(false))
    .execute(conn)
}

/// Returns a user's active sessions, most recently active first.
pub fn get_active_sessions(
    conn: &mut SqliteConnection,
    owner_id: i32,
) -> Result<Vec<Session>, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    sessions
        .filter(user_id.eq(owner_id))
        .filter(is_active.eq(true))
        .order(last_activity.desc())
        .load::<Session>(conn)
}

/// Point lookup of a session by id, active or not.
pub fn get_session(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<Option<Session>, diesel::result::Error> {
    use crate::schema::sessions::dsl::*;

    sessions
        .filter(id.eq(session_id))
        .first::<Session>(conn)
        .optional()
}

/// Point lookup of a session with the owning user's name joined in.
///
/// Callers use this for the ownership check before permitting `end_session`
/// on a client-supplied id. Unknown ids yield `Ok(None)`, never an error.
pub fn get_session_info(
    conn: &mut SqliteConnection,
    session_id: &str,
) -> Result<Option<SessionInfo>, diesel::result::Error> {
    use crate::schema::{sessions, users};

    let row = sessions::table
        .inner_join(users::table)
        .filter(sessions::id.eq(session_id))
        .select((sessions::all_columns, users::username))
        .first::<(Session, String)>(conn)
        .optional()?;

    Ok(row.map(|(session, username)| SessionInfo {
        id: session.id,
        user_id: session.user_id,
        username,
        client_ip: session.client_ip,
        client_agent: session.client_agent,
        created_at: session.created_at,
        last_activity: session.last_activity,
        is_active: session.is_active,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, UserInput};
    use crate::orm::testing::setup_test_db;
    use crate::orm::user::insert_user;

    fn client() -> ClientInfo {
        ClientInfo {
            ip_address: Some("10.0.0.7".to_string()),
            user_agent: Some("test-agent/1.0".to_string()),
        }
    }

    fn insert_dummy_user(conn: &mut SqliteConnection, email: &str, username: &str) -> User {
        insert_user(
            conn,
            UserInput {
                email: email.to_string(),
                username: username.to_string(),
                password_hash: "hashedpassword".to_string(),
                is_admin: false,
            },
        )
        .expect("insert dummy user")
    }

    /// Backdates a session's last_activity so cleanup tests don't have to wait.
    fn backdate_activity(conn: &mut SqliteConnection, session_id: &str, hours: i64) {
        use crate::schema::sessions::dsl::*;
        let past = Utc::now().naive_utc() - Duration::hours(hours);
        diesel::update(sessions.filter(id.eq(session_id)))
            .set(last_activity.eq(past))
            .execute(conn)
            .expect("backdate session");
    }

    #[test]
    fn test_create_session_stores_metadata() {
        let mut conn = setup_test_db();
        let user = insert_dummy_user(&mut conn, "a@example.com", "a");

        let session = create_session(&mut conn, user.id, &client()).unwrap();

        assert_eq!(session.user_id, user.id);
        assert_eq!(session.client_ip.as_deref(), Some("10.0.0.7"));
        assert_eq!(session.client_agent.as_deref(), Some("test-agent/1.0"));
        assert!(session.is_active);
        assert_eq!(session.created_at, session.last_activity);
        assert!(!session.id.is_empty());
    }

    #[test]
    fn test_session_ids_are_unique() {
        let mut conn = setup_test_db();
        let user = insert_dummy_user(&mut conn, "a@example.com", "a");

        let first = create_session(&mut conn, user.id, &client()).unwrap();
        let second = create_session(&mut conn, user.id, &client()).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_validate_after_create() {
        let mut conn = setup_test_db();
        let user = insert_dummy_user(&mut conn, "a@example.com", "a");
        let session = create_session(&mut conn, user.id, &client()).unwrap();

        assert!(validate_session(&mut conn, &session.id).unwrap());

        // Validation bumps last_activity, monotonically.
        let reloaded = get_session(&mut conn, &session.id).unwrap().unwrap();
        assert!(reloaded.last_activity >= session.last_activity);
    }

    #[test]
    fn test_validate_unknown_session() {
        let mut conn = setup_test_db();
        assert!(!validate_session(&mut conn, "no-such-session").unwrap());
    }

    #[test]
    fn test_end_session_is_idempotent() {
        let mut conn = setup_test_db();
        let user = insert_dummy_user(&mut conn, "a@example.com", "a");
        let session = create_session(&mut conn, user.id, &client()).unwrap();

        assert!(end_session(&mut conn, &session.id).unwrap());
        assert!(!validate_session(&mut conn, &session.id).unwrap());

        // Second end is a no-op, not a fault.
        assert!(!end_session(&mut conn, &session.id).unwrap());

        // The row survives for auditing and stays inactive.
        let reloaded = get_session(&mut conn, &session.id).unwrap().unwrap();
        assert!(!reloaded.is_active);
    }

    #[test]
    fn test_end_nonexistent_session() {
        let mut conn = setup_test_db();
        assert!(!end_session(&mut conn, "no-such-session").unwrap());
    }

    #[test]
    fn test_end_all_sessions_spares_exception() {
        let mut conn = setup_test_db();
        let user = insert_dummy_user(&mut conn, "a@example.com", "a");
        let other = insert_dummy_user(&mut conn, "b@example.com", "b");

        let s1 = create_session(&mut conn, user.id, &client()).unwrap();
        let s2 = create_session(&mut conn, user.id, &client()).unwrap();
        let s3 = create_session(&mut conn, user.id, &client()).unwrap();
        let foreign = create_session(&mut conn, other.id, &client()).unwrap();

        let ended = end_all_sessions(&mut conn, user.id, Some(&s2.id)).unwrap();
        assert_eq!(ended, 2);

        assert!(!validate_session(&mut conn, &s1.id).unwrap());
        assert!(validate_session(&mut conn, &s2.id).unwrap());
        assert!(!validate_session(&mut conn, &s3.id).unwrap());

        // Another user's sessions are untouched.
        assert!(validate_session(&mut conn, &foreign.id).unwrap());
    }

    #[test]
    fn test_end_all_sessions_without_exception() {
        let mut conn = setup_test_db();
        let user = insert_dummy_user(&mut conn, "a@example.com", "a");

        let s1 = create_session(&mut conn, user.id, &client()).unwrap();
        let s2 = create_session(&mut conn, user.id, &client()).unwrap();

        let ended = end_all_sessions(&mut conn, user.id, None).unwrap();
        assert_eq!(ended, 2);
        assert!(!validate_session(&mut conn, &s1.id).unwrap());
        assert!(!validate_session(&mut conn, &s2.id).unwrap());
    }

    #[test]
    fn test_cleanup_deactivates_exactly_the_idle_set() {
        let mut conn = setup_test_db();
        let user = insert_dummy_user(&mut conn, "a@example.com", "a");

        let stale = create_session(&mut conn, user.id, &client()).unwrap();
        let fresh = create_session(&mut conn, user.id, &client()).unwrap();
        let already_ended = create_session(&mut conn, user.id, &client()).unwrap();
        backdate_activity(&mut conn, &stale.id, 48);
        backdate_activity(&mut conn, &already_ended.id, 48);
        end_session(&mut conn, &already_ended.id).unwrap();

        let cleaned = cleanup_sessions(&mut conn, 24).unwrap();
        assert_eq!(cleaned, 1);

        assert!(!validate_session(&mut conn, &stale.id).unwrap());
        assert!(validate_session(&mut conn, &fresh.id).unwrap());

        // Idempotent: nothing left to clean.
        assert_eq!(cleanup_sessions(&mut conn, 24).unwrap(), 0);
    }

    #[test]
    fn test_validation_keeps_session_out_of_cleanup() {
        let mut conn = setup_test_db();
        let user = insert_dummy_user(&mut conn, "a@example.com", "a");

        let session = create_session(&mut conn, user.id, &client()).unwrap();
        backdate_activity(&mut conn, &session.id, 48);

        // A successful validation is the sole life-extension path.
        assert!(validate_session(&mut conn, &session.id).unwrap());
        assert_eq!(cleanup_sessions(&mut conn, 24).unwrap(), 0);
        assert!(validate_session(&mut conn, &session.id).unwrap());
    }

    #[test]
    fn test_get_active_sessions_ordering() {
        let mut conn = setup_test_db();
        let user = insert_dummy_user(&mut conn, "a@example.com", "a");

        let oldest = create_session(&mut conn, user.id, &client()).unwrap();
        let middle = create_session(&mut conn, user.id, &client()).unwrap();
        let newest = create_session(&mut conn, user.id, &client()).unwrap();
        backdate_activity(&mut conn, &oldest.id, 3);
        backdate_activity(&mut conn, &middle.id, 2);
        backdate_activity(&mut conn, &newest.id, 1);

        let ended = create_session(&mut conn, user.id, &client()).unwrap();
        end_session(&mut conn, &ended.id).unwrap();

        let active = get_active_sessions(&mut conn, user.id).unwrap();
        let ids: Vec<&str> = active.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![newest.id.as_str(), middle.id.as_str(), oldest.id.as_str()]);
    }

    #[test]
    fn test_get_session_info_includes_username() {
        let mut conn = setup_test_db();
        let user = insert_dummy_user(&mut conn, "a@example.com", "ada");
        let session = create_session(&mut conn, user.id, &client()).unwrap();

        let info = get_session_info(&mut conn, &session.id).unwrap().unwrap();
        assert_eq!(info.username, "ada");
        assert_eq!(info.user_id, user.id);
        assert!(info.is_active);

        assert!(get_session_info(&mut conn, "no-such-session").unwrap().is_none());
    }
}
