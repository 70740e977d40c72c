//! API endpoint for user logout and session termination.

use crate::DbConn;
use crate::orm::logout::revoke_session;
use rocket::serde::json::{Json, Value, json};
use rocket::{
    Route,
    http::{Cookie, CookieJar},
};

/// Logout endpoint that terminates the current session.
///
/// - **URL:** `/api/1/logout`
/// - **Method:** `POST`
/// - **Purpose:** Deactivates the current session and removes the session
///   cookie
/// - **Authentication:** None required (works with or without valid session)
///
/// # Response
///
/// **Always returns HTTP 200 OK** - Success regardless of session state
///
/// # Behavior
/// - Extracts the session token from the "session" cookie
/// - Marks the session inactive in the database (the row is kept for audit)
/// - Removes the session cookie from the client
/// - Returns success even if no session cookie exists
#[post("/1/logout")]
pub async fn logout(db: DbConn, cookies: &CookieJar<'_>) -> Json<Value> {
    // Get the cookie value first without holding a reference
    let cookie_value = cookies.get("session").map(|c| c.value().to_string());

    if let Some(session_id) = cookie_value {
        // Mark session as inactive in DB
        if let Err(e) = revoke_session(&db, &session_id).await {
            error!("Error revoking session during logout: {:?}", e);
        }

        // Remove cookie
        cookies.remove(Cookie::from("session"));
    }

    Json(json!({
        "message": "Logout successful",
        "status": "ok"
    }))
}

/// Returns all logout-related API routes.
pub fn routes() -> Vec<Route> {
    routes![logout]
}
