use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewQuestion, Question, QuestionInput};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a question into a quiz and returns the stored row.
pub fn insert_question(
    conn: &mut SqliteConnection,
    target_quiz_id: i32,
    input: QuestionInput,
) -> Result<Question, diesel::result::Error> {
    use crate::schema::questions::dsl::*;

    let insertable = NewQuestion {
        quiz_id: target_quiz_id,
        question_text: input.question_text,
        option_a: input.option_a,
        option_b: input.option_b,
        option_c: input.option_c,
        option_d: input.option_d,
        correct_answer: input.correct_answer,
        explanation: input.explanation,
        points: input.points.unwrap_or(1),
    };

    diesel::insert_into(questions)
        .values(&insertable)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    questions.filter(id.eq(last_id as i32)).first::<Question>(conn)
}

/// Returns a quiz's questions in insertion order.
pub fn get_questions_for_quiz(
    conn: &mut SqliteConnection,
    target_quiz_id: i32,
) -> Result<Vec<Question>, diesel::result::Error> {
    use crate::schema::questions::dsl::*;
    questions
        .filter(quiz_id.eq(target_quiz_id))
        .order(id.asc())
        .load::<Question>(conn)
}

/// Counts a quiz's questions without loading them.
pub fn count_questions(
    conn: &mut SqliteConnection,
    target_quiz_id: i32,
) -> Result<i64, diesel::result::Error> {
    use crate::schema::questions::dsl::*;
    questions
        .filter(quiz_id.eq(target_quiz_id))
        .count()
        .get_result::<i64>(conn)
}
