use crate::schema::questions;
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Deserialize, Queryable, Identifiable, Debug, Clone, Serialize, TS)]
#[diesel(table_name = questions)]
#[ts(export)]
pub struct Question {
    pub id: i32,
    pub quiz_id: i32,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String, // 'A', 'B', 'C', or 'D'
    pub explanation: Option<String>,
    pub points: i32,
}

#[derive(Insertable, Deserialize)]
#[diesel(table_name = questions)]
pub struct NewQuestion {
    pub quiz_id: i32,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub points: i32,
}

/// Question payload as supplied by quiz authors; the quiz id is assigned
/// when the quiz is created.
#[derive(Deserialize, Serialize, Debug, Clone, TS)]
#[ts(export)]
pub struct QuestionInput {
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    #[serde(default)]
    pub points: Option<i32>,
}
