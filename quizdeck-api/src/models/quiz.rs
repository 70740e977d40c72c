use crate::schema::quizzes;
use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Deserialize, Queryable, Identifiable, Debug, Clone, Serialize, TS)]
#[diesel(table_name = quizzes)]
#[ts(export)]
pub struct Quiz {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub time_limit: i32, // in minutes
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Deserialize)]
#[diesel(table_name = quizzes)]
pub struct NewQuiz {
    pub title: String,
    pub description: String,
    pub time_limit: i32,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
}

/// Insert payload without the database-assigned fields.
#[derive(Deserialize, Serialize, TS)]
#[ts(export)]
pub struct QuizInput {
    pub title: String,
    pub description: String,
    pub time_limit: i32,
    pub created_by: Option<i32>,
}
