#![cfg(any(test, feature = "test-staging"))]

//! Test harness: in-memory databases, a seeded Rocket instance, and the
//! fixture data integration tests rely on.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket, fairing::AdHoc};
use rocket_sync_db_pools::diesel;

use super::db::{DbConn, run_pending_migrations, set_foreign_keys};
use crate::admin_init_fairing::admin_init_fairing;
use crate::models::{QuestionInput, QuizInput, UserInput};
use crate::orm::login::hash_password;
use crate::orm::question::insert_question;
use crate::orm::quiz::{insert_quiz, list_all_quizzes};
use crate::orm::user::{get_user_by_email, insert_user};

/// Password shared by all seeded non-admin test users.
pub const SEED_USER_PASSWORD: &str = "password";
/// Seeded regular users (email, username).
pub const SEED_USERS: [(&str, &str); 3] = [
    ("alice@example.com", "alice"),
    ("bob@example.com", "bob"),
    ("carol@example.com", "carol"),
];

/// Default admin credentials as created by the admin init fairing.
pub const SEED_ADMIN_EMAIL: &str = "admin@quizdeck.io";
pub const SEED_ADMIN_PASSWORD: &str = "admin";

/// Seeded quizzes with their answer keys, in question order. Tests use
/// these to build submissions with a known score.
pub const SEED_GENERAL_QUIZ_TITLE: &str = "General Knowledge";
pub const SEED_GENERAL_ANSWERS: [&str; 5] = ["A", "C", "B", "D", "A"];
pub const SEED_RUST_QUIZ_TITLE: &str = "Rust Fundamentals";
pub const SEED_RUST_ANSWERS: [&str; 10] = ["A", "B", "C", "D", "A", "B", "C", "D", "A", "B"];

/// Configures SQLite with performance-optimized settings for testing.
///
/// Sets `synchronous = OFF` and `journal_mode = OFF`. These settings make
/// SQLite faster but less durable - only use for testing.
fn set_sqlite_test_pragmas(conn: &mut diesel::SqliteConnection) {
    conn.batch_execute(
        r#"
        PRAGMA synchronous = OFF;
        PRAGMA journal_mode = OFF;
        "#,
    )
    .expect("Failed to set SQLite PRAGMAs");
}

/// Creates a Rocket fairing that sets SQLite testing pragmas.
fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::on_ignite("Set SQLite Test Pragmas", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for migration");
        conn.run(|c| {
            set_sqlite_test_pragmas(c);
        })
        .await;
        rocket
    })
}

/// Creates a Rocket fairing that initializes standard test data.
///
/// This fairing creates a consistent set of users and quizzes that all
/// tests can rely on. It only exists under the `test-staging` feature so it
/// can never run in production.
fn test_data_init_fairing() -> AdHoc {
    AdHoc::on_ignite("Test Data Initialization", |rocket| async {
        let conn = DbConn::get_one(&rocket)
            .await
            .expect("database connection for test data initialization");

        conn.run(|c| {
            if let Err(e) = create_test_data(c) {
                eprintln!("[test-data-init] ERROR: Failed to create test data: {:?}", e);
            } else {
                eprintln!("[test-data-init] Test data initialization completed");
            }
        })
        .await;

        rocket
    })
}

/// Creates standard test data for all tests to use.
fn create_test_data(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    for (email, username) in SEED_USERS {
        create_test_user(conn, email, username)?;
    }

    // Only seed the quizzes once; fairings may run against a reused database.
    if list_all_quizzes(conn)?.is_empty() {
        create_test_quiz(
            conn,
            SEED_GENERAL_QUIZ_TITLE,
            "A little bit of everything.",
            15,
            &SEED_GENERAL_ANSWERS,
        )?;
        create_test_quiz(
            conn,
            SEED_RUST_QUIZ_TITLE,
            "Ownership, borrowing, and friends.",
            20,
            &SEED_RUST_ANSWERS,
        )?;
    }

    Ok(())
}

/// Creates a test user with the shared seed password.
fn create_test_user(
    conn: &mut SqliteConnection,
    email: &str,
    username: &str,
) -> Result<(), diesel::result::Error> {
    if get_user_by_email(conn, email)?.is_some() {
        println!("[test-data-init] User '{}' already exists", email);
        return Ok(());
    }

    let user = insert_user(
        conn,
        UserInput {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: hash_password(SEED_USER_PASSWORD),
            is_admin: false,
        },
    )?;
    println!("[test-data-init] Created user: '{}' (ID: {})", email, user.id);
    Ok(())
}

/// Creates a quiz whose questions have the given answer key, one question
/// per entry.
fn create_test_quiz(
    conn: &mut SqliteConnection,
    title: &str,
    description: &str,
    time_limit: i32,
    answers: &[&str],
) -> Result<(), diesel::result::Error> {
    let quiz = insert_quiz(
        conn,
        QuizInput {
            title: title.to_string(),
            description: description.to_string(),
            time_limit,
            created_by: None,
        },
    )?;

    for (index, answer) in answers.iter().enumerate() {
        insert_question(
            conn,
            quiz.id,
            QuestionInput {
                question_text: format!("{} question {}", title, index + 1),
                option_a: "Option A".to_string(),
                option_b: "Option B".to_string(),
                option_c: "Option C".to_string(),
                option_d: "Option D".to_string(),
                correct_answer: answer.to_string(),
                explanation: Some(format!("The answer to question {} is {}.", index + 1, answer)),
                points: None,
            },
        )?;
    }

    println!("[test-data-init] Created quiz: '{}'", title);
    Ok(())
}

/// Creates and configures a Rocket instance for testing with an in-memory
/// SQLite database.
///
/// The returned Rocket instance will have:
/// - An in-memory SQLite database configured (unique per call)
/// - Database connection pool attached
/// - Foreign keys enabled
/// - Testing pragmas set
/// - All migrations run
/// - Admin initialization completed
/// - Standard test data seeded
/// - All API routes mounted
pub fn test_rocket() -> Rocket<Build> {
    use uuid::Uuid;

    // Generate a unique database name for this test instance
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    // Configure the in-memory SQLite database
    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),  // Unique shared in-memory DB per test
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };

    let databases = map!["sqlite_db" => db_config];

    // Merge DB config into Rocket's figment
    let figment = rocket::Config::figment().merge(("databases", databases));

    // Build the Rocket instance with the DB fairing attached
    let rocket = rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(super::db::set_foreign_keys_fairing())
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(super::db::run_migrations_fairing())
        .attach(admin_init_fairing())
        .attach(test_data_init_fairing());

    crate::mount_api_routes(rocket)
}

/// Creates a synchronous in-memory SQLite database connection for unit
/// tests.
///
/// This function returns a `diesel::SqliteConnection` connected to an
/// in-memory SQLite database, runs all embedded Diesel migrations, and
/// enables foreign key support. Each call returns a new, independent
/// in-memory database.
pub fn setup_test_db() -> SqliteConnection {
    use diesel::Connection;

    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn);
    run_pending_migrations(&mut conn);
    conn
}

/// A minimal async-compatible wrapper for a synchronous SQLite connection.
///
/// This allows unit tests to drive functions that expect a Rocket-style
/// async `.run()` interface (such as the `DbRunner` consumers) against the
/// in-memory test database.
pub struct FakeDbConn<'a>(pub &'a mut diesel::SqliteConnection);

impl<'a> FakeDbConn<'a> {
    /// Executes a closure with a mutable reference to the underlying SQLite
    /// connection.
    ///
    /// # Safety
    /// This uses unsafe code to convert an immutable reference to mutable,
    /// which is safe in this controlled test environment where we know we
    /// have exclusive access.
    pub async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        unsafe {
            let conn_ptr =
                self.0 as *const diesel::SqliteConnection as *mut diesel::SqliteConnection;
            f(&mut *conn_ptr)
        }
    }
}

/// Creates a `FakeDbConn` for async-style testing with the given SQLite
/// connection.
pub fn setup_test_dbconn<'a>(conn: &'a mut diesel::SqliteConnection) -> FakeDbConn<'a> {
    FakeDbConn(conn)
}
