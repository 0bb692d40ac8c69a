mod categories;
mod questions;
mod quizzes;

use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use serde::Serialize;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use crate::db::{Category, Question};
use crate::pagination::PageParams;

use super::error::ApiError;

pub type ApiResponse<T> = Result<T, ApiError>;

/// Category id to display name, serialized as a JSON object with string keys.
type CategoryMap = BTreeMap<i64, String>;

#[derive(Serialize)]
struct QuestionList {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<CategoryMap>,
    current_category: Option<String>,
}

fn category_map(categories: Vec<Category>) -> CategoryMap {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

// an unparsable page falls back to the first one
fn page_params(page: Result<Query<PageParams>, QueryRejection>) -> PageParams {
    page.map(|Query(params)| params).unwrap_or_default()
}

fn rejected_body(rejection: JsonRejection) -> ApiError {
    ApiError::unprocessable(rejection.body_text())
}

pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
