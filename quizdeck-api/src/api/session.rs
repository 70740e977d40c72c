//! API endpoints for managing a user's login sessions.
//!
//! These endpoints back the "manage devices" view: listing active sessions,
//! terminating a single session, and logging out every other device. Every
//! operation acts on the authenticated caller's own sessions; terminating a
//! session owned by another account is rejected loudly rather than silently
//! ignored.

use rocket::{
    Route,
    http::Status,
    response,
    serde::json::{Json, Value, json},
};
use serde::Serialize;
use ts_rs::TS;

use crate::{
    models::Session,
    orm::{
        DbConn,
        session::{end_all_sessions, end_session, get_active_sessions, get_session_info},
    },
    session_guards::AuthenticatedUser,
};

/// Error response structure for session API failures.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// List Sessions endpoint.
///
/// - **URL:** `/api/1/sessions`
/// - **Method:** `GET`
/// - **Purpose:** Lists the caller's active sessions, most recently active
///   first
/// - **Authentication:** Required
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// [
///   {
///     "id": "7f8d6e6e-...",
///     "user_id": 1,
///     "client_ip": "203.0.113.9",
///     "client_agent": "Mozilla/5.0 ...",
///     "created_at": "2025-06-01T10:00:00",
///     "last_activity": "2025-06-01T10:30:00",
///     "is_active": true
///   }
/// ]
/// ```
#[get("/1/sessions")]
pub async fn list_sessions(
    db: DbConn,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Session>>, response::status::Custom<Json<ErrorResponse>>> {
    let owner_id = auth_user.user.id;
    db.run(move |conn| {
        get_active_sessions(conn, owner_id).map(Json).map_err(|e| {
            eprintln!("Error listing sessions: {:?}", e);
            let err = Json(ErrorResponse {
                error: "Internal server error while listing sessions".to_string(),
            });
            response::status::Custom(Status::InternalServerError, err)
        })
    })
    .await
}

/// End Session endpoint.
///
/// - **URL:** `/api/1/sessions/<session_id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Terminates one of the caller's sessions (e.g. a forgotten
///   device)
/// - **Authentication:** Required
/// - **Authorization:** The session must belong to the caller
///
/// The ownership check runs before the termination: an unknown session id
/// yields 404, and a session owned by a different account yields 403 with an
/// explicit error body so the rejection is visible to the user.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "message": "Session ended", "changed": true }
/// ```
/// `changed` is false when the session was already inactive; ending an
/// ended session is a no-op, not an error.
#[delete("/1/sessions/<session_id>")]
pub async fn end_session_endpoint(
    db: DbConn,
    auth_user: AuthenticatedUser,
    session_id: &str,
) -> Result<Json<Value>, response::status::Custom<Json<ErrorResponse>>> {
    let lookup_id = session_id.to_string();
    let info = db
        .run(move |conn| get_session_info(conn, &lookup_id))
        .await
        .map_err(|e| {
            eprintln!("Error looking up session: {:?}", e);
            let err = Json(ErrorResponse {
                error: "Internal server error while looking up session".to_string(),
            });
            response::status::Custom(Status::InternalServerError, err)
        })?;

    let info = match info {
        Some(info) => info,
        None => {
            let err = Json(ErrorResponse {
                error: "Session not found".to_string(),
            });
            return Err(response::status::Custom(Status::NotFound, err));
        }
    };

    // Ownership check before any mutation.
    if info.user_id != auth_user.user.id {
        let err = Json(ErrorResponse {
            error: "Forbidden: session belongs to another account".to_string(),
        });
        return Err(response::status::Custom(Status::Forbidden, err));
    }

    let target_id = session_id.to_string();
    let changed = db
        .run(move |conn| end_session(conn, &target_id))
        .await
        .map_err(|e| {
            eprintln!("Error ending session: {:?}", e);
            let err = Json(ErrorResponse {
                error: "Internal server error while ending session".to_string(),
            });
            response::status::Custom(Status::InternalServerError, err)
        })?;

    Ok(Json(json!({
        "message": "Session ended",
        "changed": changed
    })))
}

/// Revoke Other Sessions endpoint.
///
/// - **URL:** `/api/1/sessions/revoke-others`
/// - **Method:** `POST`
/// - **Purpose:** "Log out other devices": deactivates every active session
///   of the caller except the one backing this request
/// - **Authentication:** Required
///
/// The whole batch is one atomic update; a concurrently created session
/// either falls inside it or keeps its own lifecycle, never half of each.
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "message": "Other sessions revoked", "revoked": 2 }
/// ```
#[post("/1/sessions/revoke-others")]
pub async fn revoke_other_sessions(
    db: DbConn,
    auth_user: AuthenticatedUser,
) -> Result<Json<Value>, response::status::Custom<Json<ErrorResponse>>> {
    let owner_id = auth_user.user.id;
    let own_session_id = auth_user.session.id.clone();

    let revoked = db
        .run(move |conn| end_all_sessions(conn, owner_id, Some(&own_session_id)))
        .await
        .map_err(|e| {
            eprintln!("Error revoking sessions: {:?}", e);
            let err = Json(ErrorResponse {
                error: "Internal server error while revoking sessions".to_string(),
            });
            response::status::Custom(Status::InternalServerError, err)
        })?;

    Ok(Json(json!({
        "message": "Other sessions revoked",
        "revoked": revoked
    })))
}

/// Returns a vector of all routes defined in this module.
pub fn routes() -> Vec<Route> {
    routes![list_sessions, end_session_endpoint, revoke_other_sessions]
}
