use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use crate::models::{NewQuizResult, QuizResult};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a completed quiz attempt.
///
/// Results are append-only: this is the only write the result store ever
/// sees from the core, and nothing updates or deletes rows afterwards.
pub fn insert_quiz_result(
    conn: &mut SqliteConnection,
    new_result: NewQuizResult,
) -> Result<QuizResult, diesel::result::Error> {
    use crate::schema::quiz_results::dsl::*;

    diesel::insert_into(quiz_results)
        .values(&new_result)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    quiz_results
        .filter(id.eq(last_id as i32))
        .first::<QuizResult>(conn)
}

/// Returns a user's results joined with the quiz titles, newest first.
pub fn get_results_for_user(
    conn: &mut SqliteConnection,
    target_user_id: i32,
) -> Result<Vec<(QuizResult, String)>, diesel::result::Error> {
    use crate::schema::{quiz_results, quizzes};

    quiz_results::table
        .inner_join(quizzes::table)
        .filter(quiz_results::user_id.eq(target_user_id))
        .order(quiz_results::completed_at.desc())
        .select((quiz_results::all_columns, quizzes::title))
        .load::<(QuizResult, String)>(conn)
}
