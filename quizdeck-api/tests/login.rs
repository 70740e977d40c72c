#[macro_use]
extern crate time_test;

use rocket::http::Status;
use rocket::tokio;
use serde_json::json;

use quizdeck_api::orm::testing::{SEED_USER_PASSWORD, test_rocket};

#[tokio::test]
async fn test_login_success() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();
    time_test!("test_login_success");

    let response = client
        .post("/api/1/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": SEED_USER_PASSWORD
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    assert!(response.cookies().get("session").is_some());

    // Verify JSON response contains user information
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["username"], "alice");
    assert!(body["user_id"].is_number());
    assert_eq!(body["is_admin"], false);
}

#[tokio::test]
async fn test_wrong_email() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();
    time_test!("test_wrong_email");

    let response = client
        .post("/api/1/login")
        .json(&json!({
            "email": "nonexistent@example.com",
            "password": SEED_USER_PASSWORD
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Unauthorized);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_wrong_password() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();
    time_test!("test_wrong_password");

    let response = client
        .post("/api/1/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": "wrong_password"
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Unauthorized);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_empty_email() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();
    time_test!("test_empty_email");

    let response = client
        .post("/api/1/login")
        .json(&json!({
            "email": "",
            "password": SEED_USER_PASSWORD
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_empty_password() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();
    time_test!("test_empty_password");

    let response = client
        .post("/api/1/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": ""
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_secure_hello_requires_auth() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();
    time_test!("test_secure_hello_requires_auth");

    // 1. Test unauthenticated request fails
    let response = client.get("/api/1/hello").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    // 2. Login with correct credentials
    let response = client
        .post("/api/1/login")
        .json(&json!({
            "email": "alice@example.com",
            "password": SEED_USER_PASSWORD
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    // Verify session cookie was set
    let session_cookie = response
        .cookies()
        .get("session")
        .expect("Session cookie should be set");

    // 3. Test authenticated request succeeds
    let response = client
        .get("/api/1/hello")
        .cookie(session_cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["user_id"].is_number());
}

/// Login and hello must return the same structure for a given user so the
/// frontend can refresh its view of the account from either.
#[tokio::test]
async fn test_login_hello_data_consistency() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();
    time_test!("test_login_hello_data_consistency");

    let login_response = client
        .post("/api/1/login")
        .json(&json!({
            "email": "bob@example.com",
            "password": SEED_USER_PASSWORD
        }))
        .dispatch()
        .await;

    assert_eq!(login_response.status(), Status::Ok);

    let session_cookie = login_response
        .cookies()
        .get("session")
        .expect("Session cookie should be set")
        .clone();

    let login_body: serde_json::Value = login_response.into_json().await.unwrap();

    let hello_response = client
        .get("/api/1/hello")
        .cookie(session_cookie)
        .dispatch()
        .await;
    assert_eq!(hello_response.status(), Status::Ok);

    let hello_body: serde_json::Value = hello_response.into_json().await.unwrap();
    assert_eq!(login_body, hello_body);
}

#[tokio::test]
async fn test_admin_login() {
    let client = rocket::local::asynchronous::Client::tracked(test_rocket())
        .await
        .unwrap();
    time_test!("test_admin_login");

    let response = client
        .post("/api/1/login")
        .json(&json!({
            "email": "admin@quizdeck.io",
            "password": "admin"
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["is_admin"], true);
}
