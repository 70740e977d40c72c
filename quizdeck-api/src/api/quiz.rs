//! API endpoints for quiz CRUD and grading.
//!
//! Listing is public; taking and authoring require authentication; editing
//! and deletion are admin-only. Question payloads returned to quiz takers
//! never include the correct answer or the explanation - those come back
//! only in grading feedback.

use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use diesel::Connection;
use rocket::{
    Route,
    http::Status,
    response,
    serde::json::Json,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{
    logged_json::LoggedJson,
    models::{NewQuizResult, QuestionInput, Quiz, QuizInput},
    orm::{
        DbConn,
        question::{count_questions, get_questions_for_quiz, insert_question},
        quiz::{delete_quiz, get_quiz, insert_quiz, list_all_quizzes, update_quiz},
        quiz_result::insert_quiz_result,
    },
    session_guards::{AdminUser, AuthenticatedUser},
};

/// Error response structure for quiz API failures.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

/// Quiz list entry with its question count.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct QuizSummary {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub time_limit: i32,
    pub question_count: i64,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

/// A question as shown to quiz takers: options without the answer key.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct QuestionPublic {
    pub id: i32,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub points: i32,
}

/// Quiz detail; `questions` is present only for authenticated callers.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct QuizDetail {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub time_limit: i32,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionPublic>>,
}

/// Create Quiz request: the quiz plus its questions in one payload.
#[derive(Deserialize, Serialize, Debug, TS)]
#[ts(export)]
pub struct CreateQuizRequest {
    pub title: String,
    pub description: String,
    pub time_limit: i32,
    pub questions: Vec<QuestionInput>,
}

/// Update Quiz Request structure for partial updates.
#[derive(Deserialize, Serialize, Debug, TS)]
#[ts(export)]
pub struct UpdateQuizRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub time_limit: Option<i32>,
}

/// Submission payload: chosen answer letter per question id.
#[derive(Deserialize, Debug, TS)]
#[ts(export)]
pub struct SubmitQuizRequest {
    #[ts(type = "Record<string, string>")]
    pub answers: HashMap<i32, String>,
    pub time_taken: i32,
}

/// Per-question grading feedback.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct AnswerFeedback {
    pub question_id: i32,
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub your_answer: Option<String>,
}

/// Grading outcome for a submitted attempt.
#[derive(Serialize, TS)]
#[ts(export)]
pub struct SubmitQuizResponse {
    pub score: i32,
    pub total: i32,
    pub percentage: f64,
    pub feedback: Vec<AnswerFeedback>,
}

fn internal_error(context: &str) -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(
        Status::InternalServerError,
        Json(ErrorResponse {
            error: format!("Internal server error while {context}"),
        }),
    )
}

fn not_found() -> response::status::Custom<Json<ErrorResponse>> {
    response::status::Custom(
        Status::NotFound,
        Json(ErrorResponse {
            error: "Quiz not found".to_string(),
        }),
    )
}

/// List Quizzes endpoint.
///
/// - **URL:** `/api/1/quizzes`
/// - **Method:** `GET`
/// - **Purpose:** Lists all quizzes with their question counts
/// - **Authentication:** None required
#[get("/1/quizzes")]
pub async fn list_quizzes(
    db: DbConn,
) -> Result<Json<Vec<QuizSummary>>, response::status::Custom<Json<ErrorResponse>>> {
    db.run(|conn| {
        let quizzes = list_all_quizzes(conn)?;
        let mut summaries = Vec::with_capacity(quizzes.len());
        for quiz in quizzes {
            let question_count = count_questions(conn, quiz.id)?;
            summaries.push(QuizSummary {
                id: quiz.id,
                title: quiz.title,
                description: quiz.description,
                time_limit: quiz.time_limit,
                question_count,
                created_at: quiz.created_at,
            });
        }
        Ok(Json(summaries))
    })
    .await
    .map_err(|e: diesel::result::Error| {
        eprintln!("Error listing quizzes: {:?}", e);
        internal_error("listing quizzes")
    })
}

/// Get Quiz endpoint.
///
/// - **URL:** `/api/1/quizzes/<quiz_id>`
/// - **Method:** `GET`
/// - **Purpose:** Returns quiz details; questions are included only for
///   authenticated callers, and never contain the answer key
/// - **Authentication:** Optional
#[get("/1/quizzes/<quiz_id>")]
pub async fn get_quiz_endpoint(
    db: DbConn,
    auth_user: Option<AuthenticatedUser>,
    quiz_id: i32,
) -> Result<Json<QuizDetail>, response::status::Custom<Json<ErrorResponse>>> {
    let authenticated = auth_user.is_some();
    db.run(move |conn| {
        let quiz = match get_quiz(conn, quiz_id)? {
            Some(quiz) => quiz,
            None => return Ok(Err(not_found())),
        };

        let questions = if authenticated {
            let loaded = get_questions_for_quiz(conn, quiz.id)?
                .into_iter()
                .map(|q| QuestionPublic {
                    id: q.id,
                    question_text: q.question_text,
                    option_a: q.option_a,
                    option_b: q.option_b,
                    option_c: q.option_c,
                    option_d: q.option_d,
                    points: q.points,
                })
                .collect();
            Some(loaded)
        } else {
            None
        };

        Ok(Ok(Json(QuizDetail {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            time_limit: quiz.time_limit,
            created_at: quiz.created_at,
            questions,
        })))
    })
    .await
    .map_err(|e: diesel::result::Error| {
        eprintln!("Error fetching quiz: {:?}", e);
        internal_error("fetching quiz")
    })?
}

/// Create Quiz endpoint.
///
/// - **URL:** `/api/1/quizzes`
/// - **Method:** `POST`
/// - **Purpose:** Creates a quiz together with its questions
/// - **Authentication:** Required; the caller is recorded as the author
///
/// Every question's `correct_answer` must be one of `A`-`D`. The quiz and
/// its questions are inserted in one transaction.
#[post("/1/quizzes", data = "<new_quiz>")]
pub async fn create_quiz(
    db: DbConn,
    auth_user: AuthenticatedUser,
    new_quiz: LoggedJson<CreateQuizRequest>,
) -> Result<Json<Quiz>, response::status::Custom<Json<ErrorResponse>>> {
    let request = new_quiz.into_inner();

    if request.title.trim().is_empty() {
        return Err(response::status::Custom(
            Status::BadRequest,
            Json(ErrorResponse {
                error: "Quiz title is required".to_string(),
            }),
        ));
    }
    for question in &request.questions {
        if !matches!(question.correct_answer.as_str(), "A" | "B" | "C" | "D") {
            return Err(response::status::Custom(
                Status::BadRequest,
                Json(ErrorResponse {
                    error: format!(
                        "Invalid correct_answer '{}': must be one of A, B, C, D",
                        question.correct_answer
                    ),
                }),
            ));
        }
    }

    let author_id = auth_user.user.id;
    db.run(move |conn| {
        conn.transaction(|conn| {
            let quiz = insert_quiz(
                conn,
                QuizInput {
                    title: request.title,
                    description: request.description,
                    time_limit: request.time_limit,
                    created_by: Some(author_id),
                },
            )?;
            for question in request.questions {
                insert_question(conn, quiz.id, question)?;
            }
            Ok(quiz)
        })
        .map(Json)
        .map_err(|e: diesel::result::Error| {
            eprintln!("Error creating quiz: {:?}", e);
            internal_error("creating quiz")
        })
    })
    .await
}

/// Update Quiz endpoint.
///
/// - **URL:** `/api/1/quizzes/<quiz_id>`
/// - **Method:** `PUT`
/// - **Purpose:** Partially updates a quiz's title, description or time
///   limit
/// - **Authentication:** Required
/// - **Authorization:** Admin only
#[put("/1/quizzes/<quiz_id>", data = "<update>")]
pub async fn update_quiz_endpoint(
    db: DbConn,
    _admin: AdminUser,
    quiz_id: i32,
    update: LoggedJson<UpdateQuizRequest>,
) -> Result<Json<Quiz>, response::status::Custom<Json<ErrorResponse>>> {
    let request = update.into_inner();
    db.run(move |conn| {
        if get_quiz(conn, quiz_id)?.is_none() {
            return Ok(Err(not_found()));
        }
        let quiz = update_quiz(
            conn,
            quiz_id,
            request.title,
            request.description,
            request.time_limit,
        )?;
        Ok(Ok(Json(quiz)))
    })
    .await
    .map_err(|e: diesel::result::Error| {
        eprintln!("Error updating quiz: {:?}", e);
        internal_error("updating quiz")
    })?
}

/// Delete Quiz endpoint.
///
/// - **URL:** `/api/1/quizzes/<quiz_id>`
/// - **Method:** `DELETE`
/// - **Purpose:** Removes a quiz, its questions, and its results
/// - **Authentication:** Required
/// - **Authorization:** Admin only
#[delete("/1/quizzes/<quiz_id>")]
pub async fn delete_quiz_endpoint(
    db: DbConn,
    _admin: AdminUser,
    quiz_id: i32,
) -> Result<Json<rocket::serde::json::Value>, response::status::Custom<Json<ErrorResponse>>> {
    let deleted = db
        .run(move |conn| delete_quiz(conn, quiz_id))
        .await
        .map_err(|e| {
            eprintln!("Error deleting quiz: {:?}", e);
            internal_error("deleting quiz")
        })?;

    if !deleted {
        return Err(not_found());
    }
    Ok(Json(rocket::serde::json::json!({
        "message": "Quiz deleted successfully"
    })))
}

/// Submit Quiz endpoint.
///
/// - **URL:** `/api/1/quizzes/<quiz_id>/submit`
/// - **Method:** `POST`
/// - **Purpose:** Grades a submitted attempt against the quiz's stored
///   questions, records the result, and returns per-question feedback
/// - **Authentication:** Required
///
/// # Request Format
///
/// ```json
/// { "answers": { "17": "A", "18": "C" }, "time_taken": 142 }
/// ```
///
/// # Grading
/// Every question of the quiz is graded; unanswered questions count as
/// wrong and appear in the feedback with `your_answer: null`. Answers keyed
/// by a question id outside this quiz are ignored. The recorded result is a
/// snapshot: the question count at submission time stays with the attempt
/// even if the quiz is edited later.
#[post("/1/quizzes/<quiz_id>/submit", data = "<submission>")]
pub async fn submit_quiz(
    db: DbConn,
    auth_user: AuthenticatedUser,
    quiz_id: i32,
    submission: Json<SubmitQuizRequest>,
) -> Result<Json<SubmitQuizResponse>, response::status::Custom<Json<ErrorResponse>>> {
    let request = submission.into_inner();

    if request.time_taken < 0 {
        return Err(response::status::Custom(
            Status::BadRequest,
            Json(ErrorResponse {
                error: "time_taken must not be negative".to_string(),
            }),
        ));
    }

    let taker_id = auth_user.user.id;
    db.run(move |conn| {
        let quiz = match get_quiz(conn, quiz_id)? {
            Some(quiz) => quiz,
            None => return Ok(Err(not_found())),
        };
        let questions = get_questions_for_quiz(conn, quiz.id)?;

        let mut score = 0;
        let mut feedback = Vec::with_capacity(questions.len());
        for question in &questions {
            let your_answer = request.answers.get(&question.id).cloned();
            let is_correct = your_answer.as_deref() == Some(question.correct_answer.as_str());
            if is_correct {
                score += 1;
            }
            feedback.push(AnswerFeedback {
                question_id: question.id,
                is_correct,
                correct_answer: question.correct_answer.clone(),
                explanation: question.explanation.clone(),
                your_answer,
            });
        }

        let total = questions.len() as i32;
        insert_quiz_result(
            conn,
            NewQuizResult {
                user_id: taker_id,
                quiz_id: quiz.id,
                score,
                total_questions: total,
                time_taken: request.time_taken,
                completed_at: Utc::now().naive_utc(),
            },
        )?;

        let percentage = if total > 0 {
            score as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Ok(Ok(Json(SubmitQuizResponse {
            score,
            total,
            percentage,
            feedback,
        })))
    })
    .await
    .map_err(|e: diesel::result::Error| {
        eprintln!("Error grading quiz submission: {:?}", e);
        internal_error("grading quiz submission")
    })?
}

/// Returns a vector of all routes defined in this module.
pub fn routes() -> Vec<Route> {
    routes![
        list_quizzes,
        get_quiz_endpoint,
        create_quiz,
        update_quiz_endpoint,
        delete_quiz_endpoint,
        submit_quiz
    ]
}
