//! Database operations for user authentication and session creation.
//!
//! This module provides database layer functions for user login, password
//! verification, and session storage. It abstracts database operations to
//! support both production and testing environments.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rocket::http::{Cookie, CookieJar, SameSite, Status};

use crate::DbConn;
use crate::client_info::ClientInfo;
use crate::models::{Session, User};
use crate::orm::session::create_session;
#[cfg(any(test, feature = "test-staging"))]
use crate::orm::testing::FakeDbConn;

/// Trait for abstracting database operations to support both production and
/// testing.
///
/// This trait allows the same functions to work with both `DbConn`
/// (production) and `FakeDbConn` (testing) by providing a unified interface
/// for database operations.
pub trait DbRunner {
    /// Executes a database operation with a connection.
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static;
}

impl DbRunner for DbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        DbConn::run(self, f)
    }
}

#[cfg(any(test, feature = "test-staging"))]
impl<'a> DbRunner for FakeDbConn<'a> {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        FakeDbConn::run(self, f)
    }
}

/// Finds a user by their email address (case-insensitive).
///
/// # Returns
/// * `Ok(Some(User))` - User found with matching email
/// * `Ok(None)` - No user found with that email
/// * `Err(Status::InternalServerError)` - Database query failed
pub async fn find_user_by_email<D: DbRunner>(db: &D, email: &str) -> Result<Option<User>, Status> {
    let email = email.to_owned();
    db.run(move |conn| crate::orm::user::get_user_by_email(conn, &email))
        .await
        .map_err(|_| Status::InternalServerError)
}

/// Verifies a password against a stored Argon2 hash.
///
/// Returns `false` both for a mismatching password and for a stored hash
/// that fails to parse, so a corrupt row cannot authenticate anyone.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// Creates a session bound to the client's metadata and stores it.
///
/// # Returns
/// * `Ok(Session)` - The stored session; its id goes into the cookie
/// * `Err(Status::InternalServerError)` - Database insertion failed
pub async fn create_and_store_session<D: DbRunner>(
    db: &D,
    user_id: i32,
    client: ClientInfo,
) -> Result<Session, Status> {
    db.run(move |conn| create_session(conn, user_id, &client))
        .await
        .map_err(|_| Status::InternalServerError)
}

/// Sets a secure session cookie in the response.
///
/// The cookie is HTTP-only, secure outside of tests, SameSite=Lax and valid
/// for the whole site.
pub fn set_session_cookie(cookies: &CookieJar<'_>, session_token: &str) {
    let secure_flag = !cfg!(test);
    let cookie = Cookie::build(("session", session_token.to_string()))
        .http_only(true)
        .secure(secure_flag)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    cookies.add(cookie);
}

/// Processes a complete login workflow including validation and session
/// creation.
///
/// Validates input, finds the user, verifies the password, creates a session
/// bound to the client metadata, and sets the session cookie.
///
/// # Returns
/// * `Ok(User)` - Login successful, session created and cookie set
/// * `Err(Status::BadRequest)` - Empty email or password provided
/// * `Err(Status::Unauthorized)` - Invalid credentials or user not found
/// * `Err(Status::InternalServerError)` - Database operation failed
///
/// # Security Notes
/// - Returns generic "Unauthorized" for both invalid users and wrong
///   passwords
/// - Uses secure password hashing for verification
pub async fn process_login<D: DbRunner>(
    db: &D,
    cookies: &CookieJar<'_>,
    client: &ClientInfo,
    login: &crate::api::login::LoginRequest,
) -> Result<User, Status> {
    // Check for empty fields
    if login.email.trim().is_empty() || login.password.trim().is_empty() {
        return Err(Status::BadRequest);
    }

    let user = match find_user_by_email(db, &login.email).await? {
        Some(user) => user,
        None => return Err(Status::Unauthorized),
    };

    if !verify_password(&login.password, &user.password_hash) {
        return Err(Status::Unauthorized);
    }

    let session = create_and_store_session(db, user.id, client.clone()).await?;
    set_session_cookie(cookies, &session.id);

    Ok(user)
}

/// Hashes a password using Argon2 with a random salt.
///
/// # Returns
/// Argon2 hash string suitable for database storage
pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("Hashing should succeed")
        .to_string()
}
