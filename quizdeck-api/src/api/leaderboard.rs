//! API endpoints for leaderboards and personal statistics.

use rocket::{Route, http::Status, response, serde::json::Json};
use serde::Serialize;
use ts_rs::TS;

use crate::{
    orm::{
        DbConn,
        leaderboard::{LEADERBOARD_LIMIT, LeaderboardEntry, Timeframe, UserStats, rank, user_stats},
    },
    session_guards::AuthenticatedUser,
};

/// Error response structure for leaderboard API failures.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Leaderboard endpoint.
///
/// - **URL:** `/api/1/leaderboard?quiz_id=<id>&timeframe=<tf>`
/// - **Method:** `GET`
/// - **Purpose:** Ranked best performances, optionally scoped to one quiz
///   and a recency window
/// - **Authentication:** None required
///
/// `timeframe` is one of `all`, `today`, `week`, `month` and defaults to
/// `all`. `today` means since the start of the current UTC day. The board
/// holds each user's single best attempt within scope, sorted by percentage
/// descending with the lower time taken breaking ties, and is capped at 100
/// entries.
#[get("/1/leaderboard?<quiz_id>&<timeframe>")]
pub async fn get_leaderboard(
    db: DbConn,
    quiz_id: Option<i32>,
    timeframe: Option<Timeframe>,
) -> Result<Json<Vec<LeaderboardEntry>>, response::status::Custom<Json<ErrorResponse>>> {
    let timeframe = timeframe.unwrap_or(Timeframe::All);
    db.run(move |conn| rank(conn, quiz_id, timeframe, LEADERBOARD_LIMIT))
        .await
        .map(Json)
        .map_err(|e| {
            eprintln!("Error computing leaderboard: {:?}", e);
            let err = Json(ErrorResponse {
                error: "Internal server error while computing leaderboard".to_string(),
            });
            response::status::Custom(Status::InternalServerError, err)
        })
}

/// My Stats endpoint.
///
/// - **URL:** `/api/1/leaderboard/me`
/// - **Method:** `GET`
/// - **Purpose:** The caller's attempt count, average and best percentages,
///   and rank among all users by average percentage
/// - **Authentication:** Required
///
/// A user with no results gets zeroed stats and a `null` rank rather than
/// an error.
#[get("/1/leaderboard/me")]
pub async fn my_stats(
    db: DbConn,
    auth_user: AuthenticatedUser,
) -> Result<Json<UserStats>, response::status::Custom<Json<ErrorResponse>>> {
    let target_id = auth_user.user.id;
    db.run(move |conn| user_stats(conn, target_id))
        .await
        .map(Json)
        .map_err(|e| {
            eprintln!("Error computing user stats: {:?}", e);
            let err = Json(ErrorResponse {
                error: "Internal server error while computing user stats".to_string(),
            });
            response::status::Custom(Status::InternalServerError, err)
        })
}

/// Returns a vector of all routes defined in this module.
pub fn routes() -> Vec<Route> {
    routes![get_leaderboard, my_stats]
}
