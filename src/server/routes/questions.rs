use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions},
        NewQuestion, Question, QuestionFilter,
    },
    pagination::{PageParams, PageWindow},
    server::{app::AppState, deserializers::deserialize_present, error::ApiError},
};

use super::{
    category_map, method_not_allowed, page_params, rejected_body, ApiResponse, QuestionList,
};

/// Body of `POST /questions`. A `searchTerm` key, even a null one, turns the
/// request into a search.
#[derive(Deserialize)]
struct QuestionsBody {
    #[serde(rename = "searchTerm", default, deserialize_with = "deserialize_present")]
    search_term: Option<Option<String>>,
    question: Option<String>,
    answer: Option<String>,
    // the web form posts select values as strings
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm", default, deserialize_with = "deserialize_present")]
    search_term: Option<Option<String>>,
}

#[derive(Serialize)]
struct CreatedQuestion {
    success: bool,
    created: i64,
    questions: Vec<Question>,
    total_questions: i64,
    current_category: i64,
}

#[derive(Serialize)]
struct DeletedQuestion {
    success: bool,
    id: i64,
}

impl QuestionsBody {
    fn into_new_question(self) -> ApiResponse<NewQuestion> {
        let question = required_text(self.question, "question")?;
        let answer = required_text(self.answer, "answer")?;
        let category = self
            .category
            .ok_or_else(|| ApiError::unprocessable("category is required"))?;
        let difficulty = self
            .difficulty
            .ok_or_else(|| ApiError::unprocessable("difficulty is required"))?;
        Ok(NewQuestion {
            question,
            answer,
            category,
            difficulty,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> ApiResponse<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::unprocessable(format!("{field} is required"))),
    }
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    page: Result<Query<PageParams>, QueryRejection>,
) -> ApiResponse<Json<QuestionList>> {
    let filter = QuestionFilter::default();
    let window = PageWindow::from(page_params(page));
    let questions = questions::get_questions_page(&pool, &filter, window).await?;
    if questions.is_empty() {
        return Err(ApiError::unprocessable("requested page holds no questions"));
    }
    let total_questions = questions::count_questions(&pool, &filter).await?;
    let categories = get_all_categories(&pool).await?;

    Ok(Json(QuestionList {
        success: true,
        questions,
        total_questions,
        categories: Some(category_map(categories)),
        current_category: None,
    }))
}

async fn create_or_search(
    State(pool): State<SqlitePool>,
    page: Result<Query<PageParams>, QueryRejection>,
    body: Result<Json<QuestionsBody>, JsonRejection>,
) -> ApiResponse<Response> {
    let Json(body) = body.map_err(rejected_body)?;
    let params = page_params(page);
    match body.search_term {
        Some(term) => {
            let found = search(&pool, term.unwrap_or_default(), params).await?;
            Ok(Json(found).into_response())
        }
        None => {
            let created = create(&pool, body.into_new_question()?, params).await?;
            Ok(Json(created).into_response())
        }
    }
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    page: Result<Query<PageParams>, QueryRejection>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<Json<QuestionList>> {
    let Json(body) = body.map_err(rejected_body)?;
    let term = body
        .search_term
        .ok_or_else(|| ApiError::unprocessable("searchTerm is required"))?;
    let found = search(&pool, term.unwrap_or_default(), page_params(page)).await?;
    Ok(Json(found))
}

async fn search(pool: &SqlitePool, term: String, params: PageParams) -> ApiResponse<QuestionList> {
    let filter = QuestionFilter::matching(term);
    let questions = questions::get_questions_page(pool, &filter, params.into()).await?;
    let total_questions = questions::count_questions(pool, &filter).await?;
    Ok(QuestionList {
        success: true,
        questions,
        total_questions,
        categories: None,
        current_category: None,
    })
}

/// Inserts the question and answers with the requested page, or the last page
/// (which holds the new row) when none was asked for.
async fn create(
    pool: &SqlitePool,
    new_question: NewQuestion,
    params: PageParams,
) -> ApiResponse<CreatedQuestion> {
    let created = questions::create_question(pool, &new_question)
        .await
        .map_err(|e| ApiError::unprocessable(format!("Failed to insert question: {e}")))?;
    tracing::info!("Created question {created}");

    let filter = QuestionFilter::default();
    let total_questions = questions::count_questions(pool, &filter).await?;
    let window = match params.page {
        Some(page) => PageWindow::for_page(page),
        None => PageWindow::last(total_questions),
    };
    let questions = questions::get_questions_page(pool, &filter, window).await?;

    Ok(CreatedQuestion {
        success: true,
        created,
        questions,
        total_questions,
        current_category: new_question.category,
    })
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<DeletedQuestion>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    questions::delete_question(&pool, id).await?;
    tracing::info!("Deleted question {id}");
    Ok(Json(DeletedQuestion { success: true, id }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/questions",
            get(list_questions)
                .post(create_or_search)
                .fallback(method_not_allowed),
        )
        .route(
            "/questions/search",
            post(search_questions).fallback(method_not_allowed),
        )
        .route(
            "/questions/{id}",
            delete(delete_question).fallback(method_not_allowed),
        )
        .with_state(state)
}
