use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use rand::seq::SliceRandom;
use serde::Deserialize;

use quizdeck_api::models::{QuestionInput, QuizInput};
use quizdeck_api::orm::question::{count_questions, insert_question};
use quizdeck_api::orm::quiz::{delete_quiz, insert_quiz, list_all_quizzes};

use super::utils::{confirm, establish_connection};

const TRIVIA_API_URL: &str = "https://opentdb.com/api.php";
const CATEGORY_API_URL: &str = "https://opentdb.com/api_category.php";

#[derive(Subcommand)]
pub enum QuizAction {
    #[command(about = "List quizzes")]
    Ls,
    #[command(about = "Remove a quiz with its questions and results")]
    Rm {
        #[arg(help = "Quiz ID to remove")]
        id: i32,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
    #[command(about = "List available trivia categories")]
    Categories,
    #[command(about = "Import a quiz from the Open Trivia DB")]
    Import {
        #[arg(short, long, help = "Trivia category ID (see `quiz categories`)")]
        category: Option<i32>,
        #[arg(short, long, help = "Difficulty: easy, medium or hard")]
        difficulty: Option<String>,
        #[arg(short, long, default_value_t = 10, help = "Number of questions to fetch")]
        amount: u8,
    },
}

pub async fn handle_quiz_command(action: QuizAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        QuizAction::Ls => {
            let mut conn = establish_connection()?;
            list_quizzes_impl(&mut conn)
        }
        QuizAction::Rm { id, yes } => {
            let mut conn = establish_connection()?;
            remove_quiz_impl(&mut conn, id, yes)
        }
        QuizAction::Categories => list_categories_impl().await,
        QuizAction::Import {
            category,
            difficulty,
            amount,
        } => {
            let mut conn = establish_connection()?;
            import_quiz_impl(&mut conn, category, difficulty, amount).await
        }
    }
}

pub fn list_quizzes_impl(conn: &mut SqliteConnection) -> Result<(), Box<dyn std::error::Error>> {
    let quizzes = list_all_quizzes(conn)?;

    if quizzes.is_empty() {
        println!("No quizzes found.");
    } else {
        println!("Quizzes:");
        for quiz in quizzes {
            let questions = count_questions(conn, quiz.id)?;
            println!(
                "  ID: {}, Title: {}, Questions: {}, Time limit: {} min, Created: {}",
                quiz.id, quiz.title, questions, quiz.time_limit, quiz.created_at
            );
        }
    }

    Ok(())
}

pub fn remove_quiz_impl(
    conn: &mut SqliteConnection,
    quiz_id: i32,
    yes: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !yes
        && !confirm(&format!(
            "Delete quiz {} with all of its questions and results?",
            quiz_id
        ))?
    {
        println!("Operation cancelled.");
        return Ok(());
    }

    if delete_quiz(conn, quiz_id)? {
        println!("Deleted quiz {}.", quiz_id);
    } else {
        println!("No quiz with ID {}.", quiz_id);
    }
    Ok(())
}

#[derive(Deserialize)]
struct CategoryListResponse {
    trivia_categories: Vec<TriviaCategory>,
}

#[derive(Deserialize)]
struct TriviaCategory {
    id: i32,
    name: String,
}

#[derive(Deserialize)]
struct TriviaResponse {
    response_code: i32,
    results: Vec<TriviaQuestion>,
}

#[derive(Deserialize)]
struct TriviaQuestion {
    category: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

async fn list_categories_impl() -> Result<(), Box<dyn std::error::Error>> {
    let response = reqwest::get(CATEGORY_API_URL)
        .await?
        .error_for_status()?
        .json::<CategoryListResponse>()
        .await?;

    println!("Trivia categories:");
    for category in response.trivia_categories {
        println!("  {}: {}", category.id, category.name);
    }
    Ok(())
}

/// Fetches multiple-choice questions from the Open Trivia DB and stores
/// them as a new quiz.
///
/// Answer options arrive as one correct answer plus three wrong ones; they
/// are shuffled before storage so the correct letter isn't always "A".
pub async fn import_quiz_impl(
    conn: &mut SqliteConnection,
    category: Option<i32>,
    difficulty: Option<String>,
    amount: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut params: Vec<(&str, String)> = vec![
        ("amount", amount.to_string()),
        ("type", "multiple".to_string()), // We only want multiple choice questions
    ];
    if let Some(category) = category {
        params.push(("category", category.to_string()));
    }
    if let Some(difficulty) = &difficulty {
        params.push(("difficulty", difficulty.clone()));
    }

    let client = reqwest::Client::new();
    let response = client
        .get(TRIVIA_API_URL)
        .query(&params)
        .send()
        .await?
        .error_for_status()?
        .json::<TriviaResponse>()
        .await?;

    if response.response_code != 0 {
        return Err(format!(
            "Trivia API returned response code {}",
            response.response_code
        )
        .into());
    }
    if response.results.is_empty() {
        return Err("Trivia API returned no questions".into());
    }

    let category_name = decode_html_entities(&response.results[0].category);
    let difficulty_text = difficulty
        .as_deref()
        .map(|d| {
            let mut capitalized = d.to_string();
            if let Some(first) = capitalized.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            format!(" ({})", capitalized)
        })
        .unwrap_or_default();

    let quiz = insert_quiz(
        conn,
        QuizInput {
            title: format!("{} Quiz{}", category_name, difficulty_text),
            description: format!("Test your knowledge in {}!", category_name),
            time_limit: 15, // 15 minutes default time limit
            created_by: None,
        },
    )?;

    let mut rng = rand::rng();
    for trivia in response.results {
        let question = build_question(&trivia, &mut rng);
        insert_question(conn, quiz.id, question)?;
    }

    println!("Imported quiz '{}' (ID: {}).", quiz.title, quiz.id);
    Ok(())
}

/// Shuffles the answer options and maps the correct one to its letter.
fn build_question<R: rand::Rng>(trivia: &TriviaQuestion, rng: &mut R) -> QuestionInput {
    let mut options: Vec<(String, bool)> = vec![(decode_html_entities(&trivia.correct_answer), true)];
    options.extend(
        trivia
            .incorrect_answers
            .iter()
            .map(|answer| (decode_html_entities(answer), false)),
    );
    options.shuffle(rng);

    let correct_index = options
        .iter()
        .position(|(_, is_correct)| *is_correct)
        .expect("shuffle preserves the correct answer");
    let correct_letter = char::from(b'A' + correct_index as u8).to_string();

    QuestionInput {
        question_text: decode_html_entities(&trivia.question),
        option_a: options[0].0.clone(),
        option_b: options[1].0.clone(),
        option_c: options[2].0.clone(),
        option_d: options[3].0.clone(),
        correct_answer: correct_letter,
        explanation: None,
        points: None,
    }
}

/// Decodes the HTML entities the trivia API emits in question and answer
/// text. The API uses a small, fixed set; anything else passes through.
fn decode_html_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&rsquo;", "\u{2019}")
        .replace("&lsquo;", "\u{2018}")
        .replace("&ldquo;", "\u{201c}")
        .replace("&rdquo;", "\u{201d}")
        .replace("&eacute;", "\u{e9}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
