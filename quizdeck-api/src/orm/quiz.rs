use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

use chrono::Utc;

use crate::models::{NewQuiz, Quiz, QuizInput};

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Inserts a new quiz and returns the stored row.
pub fn insert_quiz(
    conn: &mut SqliteConnection,
    new_quiz: QuizInput,
) -> Result<Quiz, diesel::result::Error> {
    use crate::schema::quizzes::dsl::*;

    let insertable_quiz = NewQuiz {
        title: new_quiz.title,
        description: new_quiz.description,
        time_limit: new_quiz.time_limit,
        created_by: new_quiz.created_by,
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(quizzes)
        .values(&insertable_quiz)
        .execute(conn)?;

    let last_id = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?
        .last_insert_rowid;

    quizzes.filter(id.eq(last_id as i32)).first::<Quiz>(conn)
}

/// Returns all quizzes in ascending order by id.
pub fn list_all_quizzes(conn: &mut SqliteConnection) -> Result<Vec<Quiz>, diesel::result::Error> {
    use crate::schema::quizzes::dsl::*;
    quizzes.order(id.asc()).load::<Quiz>(conn)
}

/// Gets a single quiz by ID.
pub fn get_quiz(
    conn: &mut SqliteConnection,
    quiz_id: i32,
) -> Result<Option<Quiz>, diesel::result::Error> {
    use crate::schema::quizzes::dsl::*;
    quizzes.filter(id.eq(quiz_id)).first::<Quiz>(conn).optional()
}

/// Updates a quiz's fields. All fields are optional - only provided fields
/// will be updated.
pub fn update_quiz(
    conn: &mut SqliteConnection,
    quiz_id: i32,
    new_title: Option<String>,
    new_description: Option<String>,
    new_time_limit: Option<i32>,
) -> Result<Quiz, diesel::result::Error> {
    use crate::schema::quizzes::dsl::*;

    if let Some(title_val) = new_title {
        diesel::update(quizzes.filter(id.eq(quiz_id)))
            .set(title.eq(title_val))
            .execute(conn)?;
    }

    if let Some(description_val) = new_description {
        diesel::update(quizzes.filter(id.eq(quiz_id)))
            .set(description.eq(description_val))
            .execute(conn)?;
    }

    if let Some(time_limit_val) = new_time_limit {
        diesel::update(quizzes.filter(id.eq(quiz_id)))
            .set(time_limit.eq(time_limit_val))
            .execute(conn)?;
    }

    quizzes.filter(id.eq(quiz_id)).first::<Quiz>(conn)
}

/// Deletes a quiz together with its questions and results.
///
/// Runs in one transaction so a failure partway leaves everything in place.
/// Returns Ok(true) if the quiz existed, Ok(false) if not found.
pub fn delete_quiz(
    conn: &mut SqliteConnection,
    target_quiz_id: i32,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::{questions, quiz_results, quizzes};

    conn.transaction(|conn| {
        diesel::delete(questions::table.filter(questions::quiz_id.eq(target_quiz_id)))
            .execute(conn)?;
        diesel::delete(quiz_results::table.filter(quiz_results::quiz_id.eq(target_quiz_id)))
            .execute(conn)?;
        let deleted = diesel::delete(quizzes::table.filter(quizzes::id.eq(target_quiz_id)))
            .execute(conn)?;
        Ok(deleted > 0)
    })
}
