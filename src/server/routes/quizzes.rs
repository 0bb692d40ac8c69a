use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions, Question},
    quiz,
    server::{app::AppState, error::ApiError},
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::{method_not_allowed, rejected_body, ApiResponse};

#[derive(Deserialize)]
struct QuizRequest {
    // missing means a fresh quiz, an explicit null is rejected
    #[serde(default = "fresh_quiz")]
    previous_questions: Option<Vec<i64>>,
    // kept raw so a malformed category is told apart from a missing one
    #[serde(default)]
    quiz_category: Option<serde_json::Value>,
}

fn fresh_quiz() -> Option<Vec<i64>> {
    Some(Vec::new())
}

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    question: Option<Question>,
}

async fn next_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<Json<QuizQuestion>> {
    let Json(request) = body.map_err(rejected_body)?;
    let (Some(previous_questions), Some(quiz_category)) =
        (request.previous_questions, request.quiz_category)
    else {
        return Err(ApiError::NotFound);
    };
    let category = QuizCategory::deserialize(quiz_category)
        .map_err(|e| ApiError::unprocessable(format!("Invalid quiz_category: {e}")))?;

    let filter = quiz::candidate_filter(category.id, &previous_questions);
    let candidates = questions::get_questions(&pool, &filter).await?;
    let question = quiz::select_next(&candidates, &mut rand::thread_rng()).cloned();

    match &question {
        Some(question) => {
            let label = category.id.to_string();
            QUIZ_QUESTIONS_SERVED
                .with_label_values(&[label.as_str()])
                .inc();
            tracing::debug!("Quiz in category {} served question {}", category.id, question.id);
        }
        None => tracing::debug!("Quiz in category {} exhausted", category.id),
    }

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question).fallback(method_not_allowed))
        .with_state(state)
}
