use crate::schema::quiz_results;
use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One completed quiz attempt. Rows are append-only: the grading path
/// inserts them and nothing in the core ever mutates or deletes one.
/// `total_questions` is a snapshot of the quiz size at attempt time and
/// may drift from the quiz if it is edited later.
#[derive(Deserialize, Queryable, Identifiable, Debug, Clone, Serialize, TS)]
#[diesel(table_name = quiz_results)]
#[ts(export)]
pub struct QuizResult {
    pub id: i32,
    pub user_id: i32,
    pub quiz_id: i32,
    pub score: i32,
    pub total_questions: i32,
    pub time_taken: i32, // Time taken in seconds
    #[ts(type = "string")]
    pub completed_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize)]
#[diesel(table_name = quiz_results)]
pub struct NewQuizResult {
    pub user_id: i32,
    pub quiz_id: i32,
    pub score: i32,
    pub total_questions: i32,
    pub time_taken: i32,
    pub completed_at: NaiveDateTime,
}
