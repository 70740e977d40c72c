//! API endpoint for a user's own quiz results.

use chrono::NaiveDateTime;
use rocket::{Route, http::Status, response, serde::json::Json};
use serde::Serialize;
use ts_rs::TS;

use crate::{
    orm::{DbConn, quiz_result::get_results_for_user},
    session_guards::AuthenticatedUser,
};

/// Error response structure for result API failures.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// One of the caller's past attempts, with the quiz title denormalized in.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct MyResult {
    pub quiz_id: i32,
    pub quiz_title: String,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub time_taken: i32,
    #[ts(type = "string")]
    pub completed_at: NaiveDateTime,
}

/// My Results endpoint.
///
/// - **URL:** `/api/1/results`
/// - **Method:** `GET`
/// - **Purpose:** Returns the authenticated user's quiz results, newest
///   first
/// - **Authentication:** Required
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// [
///   {
///     "quiz_id": 3,
///     "quiz_title": "General Knowledge",
///     "score": 8,
///     "total_questions": 10,
///     "percentage": 80.0,
///     "time_taken": 240,
///     "completed_at": "2025-06-01T12:00:00"
///   }
/// ]
/// ```
#[get("/1/results")]
pub async fn my_results(
    db: DbConn,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<MyResult>>, response::status::Custom<Json<ErrorResponse>>> {
    let owner_id = auth_user.user.id;
    db.run(move |conn| {
        get_results_for_user(conn, owner_id).map(|rows| {
            let results = rows
                .into_iter()
                .map(|(result, quiz_title)| {
                    let percentage = if result.total_questions > 0 {
                        result.score as f64 / result.total_questions as f64 * 100.0
                    } else {
                        0.0
                    };
                    MyResult {
                        quiz_id: result.quiz_id,
                        quiz_title,
                        score: result.score,
                        total_questions: result.total_questions,
                        percentage,
                        time_taken: result.time_taken,
                        completed_at: result.completed_at,
                    }
                })
                .collect();
            Json(results)
        })
    })
    .await
    .map_err(|e| {
        eprintln!("Error listing results: {:?}", e);
        let err = Json(ErrorResponse {
            error: "Internal server error while listing results".to_string(),
        });
        response::status::Custom(Status::InternalServerError, err)
    })
}

/// Returns a vector of all routes defined in this module.
pub fn routes() -> Vec<Route> {
    routes![my_results]
}
