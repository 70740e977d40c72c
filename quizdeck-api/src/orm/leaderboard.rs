//! Ranking and statistics queries over stored quiz results.
//!
//! The aggregator only ever reads the result store. Results are filtered by
//! quiz and recency, reduced to each user's best attempt, and sorted; user
//! statistics additionally place a user among all users by average score.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use diesel::prelude::*;
use rocket::FromFormField;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::QuizResult;

/// How many entries a leaderboard query returns at most.
pub const LEADERBOARD_LIMIT: usize = 100;

/// Relative recency filter applied to result completion times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Timeframe {
    All,
    Today,
    Week,
    Month,
}

impl Timeframe {
    /// The completion-time cutoff for this timeframe, or `None` for no
    /// filter. `Today` means the start of the current UTC day, not a
    /// rolling 24 hours.
    pub fn cutoff(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Timeframe::All => None,
            Timeframe::Today => Some(NaiveDateTime::new(now.date(), NaiveTime::MIN)),
            Timeframe::Week => Some(now - Duration::days(7)),
            Timeframe::Month => Some(now - Duration::days(30)),
        }
    }
}

/// One row of a leaderboard: a user's best attempt within the queried scope.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct LeaderboardEntry {
    pub user_id: i32,
    pub username: String,
    pub quiz_id: i32,
    pub quiz_title: String,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub time_taken: i32,
    #[ts(type = "string")]
    pub completed_at: NaiveDateTime,
}

/// A user's own aggregate standing across all of their results.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct UserStats {
    pub total_attempts: usize,
    pub avg_percentage: f64,
    pub best_percentage: f64,
    /// 1-based position among all users ordered by average percentage,
    /// `None` when the user has no results yet.
    pub rank: Option<usize>,
}

fn percentage_of(result: &QuizResult) -> Option<f64> {
    // A zero question count cannot come out of grading, but a malformed row
    // must not take the whole board down.
    if result.total_questions <= 0 {
        warn!(
            "skipping quiz result {} with non-positive question count {}",
            result.id, result.total_questions
        );
        return None;
    }
    Some(result.score as f64 / result.total_questions as f64 * 100.0)
}

/// True when `candidate` is a strictly better attempt than `incumbent`:
/// higher percentage, or the same percentage in less time.
fn beats(candidate: (f64, i32), incumbent: (f64, i32)) -> bool {
    candidate.0 > incumbent.0 || (candidate.0 == incumbent.0 && candidate.1 < incumbent.1)
}

/// Computes the ranked view of best performances.
///
/// Results are filtered by `quiz_filter` (when given) and by the timeframe
/// cutoff, then reduced to one entry per user: that user's best surviving
/// attempt, where "best" is highest percentage with lowest `time_taken` as
/// the tie-break. Entries are sorted by the same criterion and truncated to
/// `limit`.
pub fn rank(
    conn: &mut SqliteConnection,
    quiz_filter: Option<i32>,
    timeframe: Timeframe,
    limit: usize,
) -> Result<Vec<LeaderboardEntry>, diesel::result::Error> {
    use crate::schema::{quiz_results, quizzes, users};

    let mut query = quiz_results::table
        .inner_join(users::table)
        .inner_join(quizzes::table)
        .select((quiz_results::all_columns, users::username, quizzes::title))
        .into_boxed();

    if let Some(quiz_id) = quiz_filter {
        query = query.filter(quiz_results::quiz_id.eq(quiz_id));
    }
    if let Some(cutoff) = timeframe.cutoff(Utc::now().naive_utc()) {
        query = query.filter(quiz_results::completed_at.ge(cutoff));
    }

    let rows = query.load::<(QuizResult, String, String)>(conn)?;

    // Best attempt per user. With a quiz filter every row shares the quiz,
    // so this is the per-(user, quiz) grouping; without one it is the
    // global per-user board.
    let mut best: HashMap<i32, LeaderboardEntry> = HashMap::new();
    for (result, username, quiz_title) in rows {
        let Some(pct) = percentage_of(&result) else {
            continue;
        };
        let candidate = LeaderboardEntry {
            user_id: result.user_id,
            username,
            quiz_id: result.quiz_id,
            quiz_title,
            score: result.score,
            total_questions: result.total_questions,
            percentage: pct,
            time_taken: result.time_taken,
            completed_at: result.completed_at,
        };
        match best.get(&result.user_id) {
            Some(incumbent)
                if !beats(
                    (candidate.percentage, candidate.time_taken),
                    (incumbent.percentage, incumbent.time_taken),
                ) => {}
            _ => {
                best.insert(result.user_id, candidate);
            }
        }
    }

    let mut entries: Vec<LeaderboardEntry> = best.into_values().collect();
    entries.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.time_taken.cmp(&b.time_taken))
    });
    entries.truncate(limit);
    Ok(entries)
}

/// Computes a user's aggregate statistics and their rank among all users.
///
/// The rank orders every user by their average percentage over all of their
/// results, descending, and reports this user's 1-based position. A user
/// with no results gets the zero stats and a `None` rank rather than an
/// error, and no division happens for them.
pub fn user_stats(
    conn: &mut SqliteConnection,
    target_user_id: i32,
) -> Result<UserStats, diesel::result::Error> {
    use crate::schema::quiz_results;

    let all: Vec<QuizResult> = quiz_results::table.load(conn)?;

    let mut per_user: HashMap<i32, Vec<f64>> = HashMap::new();
    for result in &all {
        if let Some(pct) = percentage_of(result) {
            per_user.entry(result.user_id).or_default().push(pct);
        }
    }

    let Some(own) = per_user.get(&target_user_id) else {
        return Ok(UserStats {
            total_attempts: 0,
            avg_percentage: 0.0,
            best_percentage: 0.0,
            rank: None,
        });
    };

    let total_attempts = own.len();
    let avg_percentage = own.iter().sum::<f64>() / total_attempts as f64;
    let best_percentage = own.iter().copied().fold(0.0_f64, f64::max);

    let mut averages: Vec<(i32, f64)> = per_user
        .iter()
        .map(|(user_id, percentages)| {
            (*user_id, percentages.iter().sum::<f64>() / percentages.len() as f64)
        })
        .collect();
    averages.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let rank = averages
        .iter()
        .position(|(user_id, _)| *user_id == target_user_id)
        .map(|idx| idx + 1);

    Ok(UserStats {
        total_attempts,
        avg_percentage,
        best_percentage,
        rank,
    })
}
