//! API endpoints for account registration.
//!
//! Registration enforces the password policy, rejects duplicate accounts,
//! and logs the new user straight in by creating a session.

use rocket::{
    Route,
    http::{CookieJar, Status},
    response,
    serde::json::Json,
};
use serde::Deserialize;
use ts_rs::TS;

use crate::{
    api::login::LoginSuccessResponse,
    client_info::ClientInfo,
    models::UserInput,
    orm::{
        DbConn,
        login::{create_and_store_session, hash_password, set_session_cookie},
        user::{get_user_by_email, get_user_by_username, insert_user},
    },
};

/// Error response structure for registration failures.
#[derive(serde::Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Registration request payload.
#[derive(Clone, Deserialize, TS)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Checks a candidate password against the account password policy.
///
/// Returns the first violated rule as a user-facing message.
fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number");
    }
    if !password.chars().any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c)) {
        return Err("Password must contain at least one special character");
    }
    Ok(())
}

fn bad_request(message: &str) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(
        Status::BadRequest,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Register endpoint.
///
/// - **URL:** `/api/1/register`
/// - **Method:** `POST`
/// - **Purpose:** Creates a new account and logs it in immediately
/// - **Authentication:** None required
///
/// # Request Format
///
/// ```json
/// {
///   "email": "new@example.com",
///   "username": "newbie",
///   "password": "Secret123!",
///   "confirm_password": "Secret123!"
/// }
/// ```
///
/// # Response
///
/// **Success (HTTP 200 OK):** same shape as the login response, with the
/// session cookie set.
///
/// **Failure (HTTP 400 Bad Request):** the violated validation rule in the
/// error body.
///
/// **Failure (HTTP 409 Conflict):** email or username already taken.
///
/// # Validation
/// - Email must contain an `@`
/// - Password: at least 8 characters with an uppercase letter, a lowercase
///   letter, a digit and a special character
/// - `password` and `confirm_password` must match
#[post("/1/register", data = "<register>")]
pub async fn register(
    db: DbConn,
    cookies: &CookieJar<'_>,
    client: ClientInfo,
    register: Json<RegisterRequest>,
) -> Result<Json<LoginSuccessResponse>, response::status::Custom<Json<ErrorResponse>>> {
    let request = register.into_inner();

    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(bad_request("Please enter a valid email address"));
    }
    if request.username.trim().is_empty() {
        return Err(bad_request("Please enter a username"));
    }
    if let Err(rule) = validate_password(&request.password) {
        return Err(bad_request(rule));
    }
    if request.password != request.confirm_password {
        return Err(bad_request("Passwords do not match"));
    }

    let email = request.email.clone();
    let existing_email = db
        .run(move |conn| get_user_by_email(conn, &email))
        .await
        .map_err(|e| {
            eprintln!("Error checking email uniqueness: {:?}", e);
            internal_error()
        })?;
    if existing_email.is_some() {
        return Err(response::status::Custom(
            Status::Conflict,
            Json(ErrorResponse {
                error: "Email already registered".to_string(),
            }),
        ));
    }

    let username = request.username.clone();
    let existing_username = db
        .run(move |conn| get_user_by_username(conn, &username))
        .await
        .map_err(|e| {
            eprintln!("Error checking username uniqueness: {:?}", e);
            internal_error()
        })?;
    if existing_username.is_some() {
        return Err(response::status::Custom(
            Status::Conflict,
            Json(ErrorResponse {
                error: "Username already taken".to_string(),
            }),
        ));
    }

    let new_user = UserInput {
        email: request.email,
        username: request.username,
        password_hash: hash_password(&request.password),
        is_admin: false,
    };
    let user = db
        .run(move |conn| insert_user(conn, new_user))
        .await
        .map_err(|e| {
            eprintln!("Error creating user: {:?}", e);
            internal_error()
        })?;

    // Log the fresh account straight in.
    let session = create_and_store_session(&db, user.id, client)
        .await
        .map_err(|_| internal_error())?;
    set_session_cookie(cookies, &session.id);

    Ok(Json(user.into()))
}

fn internal_error() -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(
        Status::InternalServerError,
        Json(ErrorResponse {
            error: "Internal server error during registration".to_string(),
        }),
    )
}

/// Returns a vector of all routes defined in this module.
pub fn routes() -> Vec<Route> {
    routes![register]
}
