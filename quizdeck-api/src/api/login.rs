//! API endpoints for user login and authentication.
//!
//! This module provides HTTP endpoints for user authentication and session
//! creation. It handles user login requests, generates session tokens bound
//! to the calling client, and provides an authenticated check endpoint.

use rocket::response;
use rocket::serde::{Deserialize, Serialize};
use rocket::{Route, http::CookieJar, serde::json::Json};
use ts_rs::TS;

use crate::DbConn;
use crate::client_info::ClientInfo;
use crate::orm::login::process_login;
use crate::session_guards::AuthenticatedUser;

/// Error response structure for authentication failures.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    error: String,
}

/// Login success response structure containing user information.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct LoginSuccessResponse {
    pub user_id: i32,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
}

impl From<crate::models::User> for LoginSuccessResponse {
    fn from(user: crate::models::User) -> Self {
        LoginSuccessResponse {
            user_id: user.id,
            email: user.email,
            username: user.username,
            is_admin: user.is_admin,
        }
    }
}

/// Login request structure containing user credentials.
#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login endpoint that authenticates users and creates sessions.
///
/// - **URL:** `/api/1/login`
/// - **Method:** `POST`
/// - **Purpose:** Authenticates a user by email and password, creates a
///   session bound to the caller's IP and user agent, and sets a secure
///   session cookie
/// - **Authentication:** None required
///
/// # Request Format
///
/// ```json
/// {
///   "email": "user@example.com",
///   "password": "userpassword"
/// }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "user_id": 1, "email": "user@example.com", "username": "user", "is_admin": false }
/// ```
/// Sets session cookie named `session` (HTTP-only, secure, SameSite=Lax).
///
/// **Failure (HTTP 401 Unauthorized):**
/// ```json
/// { "error": "Invalid credentials" }
/// ```
///
/// # Security
/// - Session cookies are HTTP-only, secure, and use SameSite=Lax
/// - Passwords are verified using Argon2 hashing
/// - Invalid credentials return generic error messages to prevent enumeration
#[post("/1/login", data = "<login>")]
pub async fn login(
    db: DbConn,
    cookies: &CookieJar<'_>,
    client: ClientInfo,
    login: Json<LoginRequest>,
) -> Result<Json<LoginSuccessResponse>, response::status::Custom<Json<ErrorResponse>>> {
    match process_login(&db, cookies, &client, &login).await {
        Ok(user) => Ok(Json(user.into())),
        Err(status) => {
            let err_json = Json(ErrorResponse {
                error: "Invalid credentials".to_string(),
            });
            Err(response::status::Custom(status, err_json))
        }
    }
}

/// Hello (Authentication Check) endpoint.
///
/// - **URL:** `/api/1/hello`
/// - **Method:** `GET`
/// - **Purpose:** Returns the authenticated user's profile; useful for
///   checking authentication status
/// - **Authentication:** Required
///
/// The `AuthenticatedUser` guard validates the session cookie, bumps the
/// session's activity timestamp, and returns 401 Unauthorized when the
/// session is missing, revoked, or expired by cleanup.
#[get("/1/hello")]
pub async fn secure_hello(auth_user: AuthenticatedUser) -> Json<LoginSuccessResponse> {
    Json(auth_user.user.into())
}

/// Returns all login-related API routes.
pub fn routes() -> Vec<Route> {
    routes![login, secure_hello]
}
