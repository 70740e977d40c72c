use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::json;

use quizdeck_api::orm::testing::{
    SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD, SEED_GENERAL_ANSWERS, SEED_GENERAL_QUIZ_TITLE,
    SEED_RUST_QUIZ_TITLE, SEED_USER_PASSWORD, test_rocket,
};

async fn login(client: &Client, email: &str, password: &str) -> Cookie<'static> {
    let response = client
        .post("/api/1/login")
        .json(&json!({ "email": email, "password": password }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let cookie = response
        .cookies()
        .get("session")
        .expect("Session cookie should be set after login");
    Cookie::new("session", cookie.value().to_string())
}

/// Finds a seeded quiz's id by title via the public list endpoint.
async fn quiz_id_by_title(client: &Client, title: &str) -> i64 {
    let response = client.get("/api/1/quizzes").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let quizzes: serde_json::Value = response.into_json().await.unwrap();
    quizzes
        .as_array()
        .unwrap()
        .iter()
        .find(|quiz| quiz["title"] == title)
        .unwrap_or_else(|| panic!("seeded quiz '{title}' missing"))["id"]
        .as_i64()
        .unwrap()
}

/// Returns the quiz's question ids in question order.
async fn question_ids(client: &Client, cookie: &Cookie<'static>, quiz_id: i64) -> Vec<i64> {
    let response = client
        .get(format!("/api/1/quizzes/{quiz_id}"))
        .cookie(cookie.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let detail: serde_json::Value = response.into_json().await.unwrap();
    detail["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_quizzes_is_public() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let response = client.get("/api/1/quizzes").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let quizzes: serde_json::Value = response.into_json().await.unwrap();
    let quizzes = quizzes.as_array().unwrap();
    assert_eq!(quizzes.len(), 2);

    let general = quizzes
        .iter()
        .find(|q| q["title"] == SEED_GENERAL_QUIZ_TITLE)
        .unwrap();
    assert_eq!(general["question_count"], 5);

    let rust = quizzes
        .iter()
        .find(|q| q["title"] == SEED_RUST_QUIZ_TITLE)
        .unwrap();
    assert_eq!(rust["question_count"], 10);
}

#[tokio::test]
async fn test_quiz_detail_withholds_answer_key() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let quiz_id = quiz_id_by_title(&client, SEED_GENERAL_QUIZ_TITLE).await;

    // Unauthenticated detail has no questions at all.
    let response = client
        .get(format!("/api/1/quizzes/{quiz_id}"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let detail: serde_json::Value = response.into_json().await.unwrap();
    assert!(detail.get("questions").is_none() || detail["questions"].is_null());

    // Authenticated detail includes the questions, minus the answer key.
    let alice = login(&client, "alice@example.com", SEED_USER_PASSWORD).await;
    let response = client
        .get(format!("/api/1/quizzes/{quiz_id}"))
        .cookie(alice)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let detail: serde_json::Value = response.into_json().await.unwrap();
    let questions = detail["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 5);
    for question in questions {
        assert!(question.get("correct_answer").is_none());
        assert!(question.get("explanation").is_none());
        assert!(question["option_a"].is_string());
    }
}

#[tokio::test]
async fn test_get_unknown_quiz() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let response = client.get("/api/1/quizzes/99999").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}

#[tokio::test]
async fn test_create_quiz() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let alice = login(&client, "alice@example.com", SEED_USER_PASSWORD).await;

    let response = client
        .post("/api/1/quizzes")
        .cookie(alice.clone())
        .json(&json!({
            "title": "Oceans",
            "description": "Depths and tides",
            "time_limit": 10,
            "questions": [
                {
                    "question_text": "Which ocean is the largest?",
                    "option_a": "Atlantic",
                    "option_b": "Pacific",
                    "option_c": "Indian",
                    "option_d": "Arctic",
                    "correct_answer": "B",
                    "explanation": "The Pacific covers about a third of Earth."
                },
                {
                    "question_text": "What causes tides?",
                    "option_a": "Wind",
                    "option_b": "Earthquakes",
                    "option_c": "Gravity of the moon",
                    "option_d": "Ship traffic",
                    "correct_answer": "C",
                    "explanation": null
                }
            ]
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let quiz: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(quiz["title"], "Oceans");
    let new_id = quiz["id"].as_i64().unwrap();

    // The new quiz shows up with both questions.
    let ids = question_ids(&client, &alice, new_id).await;
    assert_eq!(ids.len(), 2);
}

#[tokio::test]
async fn test_create_quiz_rejects_bad_answer_letter() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let alice = login(&client, "alice@example.com", SEED_USER_PASSWORD).await;

    let response = client
        .post("/api/1/quizzes")
        .cookie(alice)
        .json(&json!({
            "title": "Broken",
            "description": "Bad answer key",
            "time_limit": 5,
            "questions": [
                {
                    "question_text": "?",
                    "option_a": "a",
                    "option_b": "b",
                    "option_c": "c",
                    "option_d": "d",
                    "correct_answer": "E",
                    "explanation": null
                }
            ]
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_create_quiz_requires_auth() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let response = client
        .post("/api/1/quizzes")
        .json(&json!({
            "title": "Nope",
            "description": "",
            "time_limit": 5,
            "questions": []
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_submit_quiz_grading() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let alice = login(&client, "alice@example.com", SEED_USER_PASSWORD).await;
    let quiz_id = quiz_id_by_title(&client, SEED_GENERAL_QUIZ_TITLE).await;
    let ids = question_ids(&client, &alice, quiz_id).await;

    // Answer everything correctly.
    let answers: serde_json::Map<String, serde_json::Value> = ids
        .iter()
        .zip(SEED_GENERAL_ANSWERS)
        .map(|(id, answer)| (id.to_string(), json!(answer)))
        .collect();

    let response = client
        .post(format!("/api/1/quizzes/{quiz_id}/submit"))
        .cookie(alice.clone())
        .json(&json!({ "answers": answers, "time_taken": 120 }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let graded: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(graded["score"], 5);
    assert_eq!(graded["total"], 5);
    assert_eq!(graded["percentage"], 100.0);
    let feedback = graded["feedback"].as_array().unwrap();
    assert_eq!(feedback.len(), 5);
    assert!(feedback.iter().all(|f| f["is_correct"] == true));
    // Feedback reveals the key and explanation after grading.
    assert_eq!(feedback[0]["correct_answer"], SEED_GENERAL_ANSWERS[0]);

    // The attempt landed in the caller's results.
    let response = client
        .get("/api/1/results")
        .cookie(alice)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let results: serde_json::Value = response.into_json().await.unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["quiz_title"], SEED_GENERAL_QUIZ_TITLE);
    assert_eq!(results[0]["score"], 5);
    assert_eq!(results[0]["percentage"], 100.0);
}

#[tokio::test]
async fn test_submit_quiz_partial_answers() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let bob = login(&client, "bob@example.com", SEED_USER_PASSWORD).await;
    let quiz_id = quiz_id_by_title(&client, SEED_GENERAL_QUIZ_TITLE).await;
    let ids = question_ids(&client, &bob, quiz_id).await;

    // Answer only the first two questions (correctly).
    let answers: serde_json::Map<String, serde_json::Value> = ids
        .iter()
        .zip(SEED_GENERAL_ANSWERS)
        .take(2)
        .map(|(id, answer)| (id.to_string(), json!(answer)))
        .collect();

    let response = client
        .post(format!("/api/1/quizzes/{quiz_id}/submit"))
        .cookie(bob)
        .json(&json!({ "answers": answers, "time_taken": 60 }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let graded: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(graded["score"], 2);
    assert_eq!(graded["total"], 5);
    let feedback = graded["feedback"].as_array().unwrap();
    assert_eq!(feedback.len(), 5);
    // Unanswered questions are graded wrong with a null answer.
    assert_eq!(feedback[4]["is_correct"], false);
    assert!(feedback[4]["your_answer"].is_null());
}

#[tokio::test]
async fn test_submit_rejects_negative_time() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let alice = login(&client, "alice@example.com", SEED_USER_PASSWORD).await;
    let quiz_id = quiz_id_by_title(&client, SEED_GENERAL_QUIZ_TITLE).await;

    let response = client
        .post(format!("/api/1/quizzes/{quiz_id}/submit"))
        .cookie(alice)
        .json(&json!({ "answers": {}, "time_taken": -5 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_quiz_admin_operations() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let alice = login(&client, "alice@example.com", SEED_USER_PASSWORD).await;
    let admin = login(&client, SEED_ADMIN_EMAIL, SEED_ADMIN_PASSWORD).await;
    let quiz_id = quiz_id_by_title(&client, SEED_GENERAL_QUIZ_TITLE).await;

    // Non-admins cannot update or delete.
    let response = client
        .put(format!("/api/1/quizzes/{quiz_id}"))
        .cookie(alice.clone())
        .json(&json!({ "title": "Hijacked" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let response = client
        .delete(format!("/api/1/quizzes/{quiz_id}"))
        .cookie(alice)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    // Admins can update...
    let response = client
        .put(format!("/api/1/quizzes/{quiz_id}"))
        .cookie(admin.clone())
        .json(&json!({ "title": "General Knowledge (revised)", "time_limit": 25 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(updated["title"], "General Knowledge (revised)");
    assert_eq!(updated["time_limit"], 25);
    assert_eq!(updated["description"], "A little bit of everything.");

    // ...and delete.
    let response = client
        .delete(format!("/api/1/quizzes/{quiz_id}"))
        .cookie(admin.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .get(format!("/api/1/quizzes/{quiz_id}"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);

    // Deleting a quiz that is already gone is a 404.
    let response = client
        .delete(format!("/api/1/quizzes/{quiz_id}"))
        .cookie(admin)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}
