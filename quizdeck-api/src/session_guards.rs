//! Session-based authentication and authorization guards for Rocket routes.
//!
//! This module provides request guards that validate the session cookie
//! against the session store before a handler runs. The guard is the
//! composable capability check every authenticated route starts with:
//! adding it as a handler parameter is the whole opt-in.
//!
//! # Basic Authentication
//!
//! ```rust
//! use rocket::get;
//! use quizdeck_api::session_guards::AuthenticatedUser;
//!
//! #[get("/profile")]
//! fn get_profile(user: AuthenticatedUser) -> String {
//!     format!("Welcome, {}!", user.user.username)
//! }
//! ```
//!
//! # Admin-Only Routes
//!
//! ```rust
//! use rocket::get;
//! use quizdeck_api::session_guards::AdminUser;
//!
//! #[get("/admin")]
//! fn admin_only(user: AdminUser) -> String {
//!     format!("Admin access granted to {}", user.user.username)
//! }
//! ```

use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::DbConn;
use crate::models::{Session, User};
use crate::orm::session::{get_session, validate_session};
use crate::orm::user::get_user;

/// A request guard for routes that require an authenticated user.
///
/// The guard performs the following on every request:
///
/// 1. Extracts the session cookie from the request
/// 2. Validates the presented token against the session store; a successful
///    validation bumps the session's `last_activity` (the only thing that
///    keeps a session out of idle cleanup)
/// 3. Loads the session row and the owning user
///
/// A missing cookie, unknown token, or deactivated session all yield
/// `Status::Unauthorized`; the request boundary treats that as a forced
/// logout.
#[derive(Debug)]
pub struct AuthenticatedUser {
    /// The authenticated user from the database
    pub user: User,
    /// The validated session backing this request
    pub session: Session,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let cookies = request.cookies();
        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        // Get session cookie
        let session_cookie = match cookies.get("session") {
            Some(cookie) => cookie,
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        let session_id = session_cookie.value().to_string();

        // Validate the token; this is the activity bump.
        let token = session_id.clone();
        match db.run(move |conn| validate_session(conn, &token)).await {
            Ok(true) => {}
            Ok(false) => return Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error validating session: {:?}", e);
                return Outcome::Error((Status::Unauthorized, ()));
            }
        }

        // Load the session row for ownership checks downstream.
        let token = session_id.clone();
        let session = match db.run(move |conn| get_session(conn, &token)).await {
            Ok(Some(session)) => session,
            Ok(None) => return Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error loading session: {:?}", e);
                return Outcome::Error((Status::Unauthorized, ()));
            }
        };

        // Query the users table for the user associated with the session
        let owner_id = session.user_id;
        let user = match db.run(move |conn| get_user(conn, owner_id)).await {
            Ok(Some(user)) => user,
            Ok(None) => return Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                error!("Database error finding user: {:?}", e);
                return Outcome::Error((Status::Unauthorized, ()));
            }
        };

        Outcome::Success(AuthenticatedUser { user, session })
    }
}

/// A request guard that additionally requires the `is_admin` flag.
///
/// Authentication failures surface as `Status::Unauthorized`; an
/// authenticated non-admin gets `Status::Forbidden`.
#[derive(Debug)]
pub struct AdminUser {
    pub user: User,
    pub session: Session,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let auth_user = match AuthenticatedUser::from_request(request).await {
            Outcome::Success(user) => user,
            Outcome::Error(e) => return Outcome::Error(e),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        if auth_user.user.is_admin {
            Outcome::Success(AdminUser {
                user: auth_user.user,
                session: auth_user.session,
            })
        } else {
            Outcome::Error((Status::Forbidden, ()))
        }
    }
}
