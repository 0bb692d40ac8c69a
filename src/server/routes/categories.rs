use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions,
        },
        QuestionFilter,
    },
    pagination::{PageParams, PageWindow},
    server::{app::AppState, error::ApiError},
};

use super::{category_map, method_not_allowed, page_params, ApiResponse, CategoryMap, QuestionList};

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: CategoryMap,
}

async fn list_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesResponse>> {
    let categories = get_all_categories(&pool).await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(categories),
    }))
}

async fn questions_by_category(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
    page: Result<Query<PageParams>, QueryRejection>,
) -> ApiResponse<Json<QuestionList>> {
    let Path(id) = id.map_err(|_| ApiError::NotFound)?;
    let category = get_category(&pool, id).await?;

    let filter = QuestionFilter::in_category(category.id);
    let window = PageWindow::from(page_params(page));
    let questions = questions::get_questions_page(&pool, &filter, window).await?;
    let total_questions = questions::count_questions(&pool, &filter).await?;

    Ok(Json(QuestionList {
        success: true,
        questions,
        total_questions,
        categories: None,
        current_category: Some(category.kind),
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/categories",
            get(list_categories).fallback(method_not_allowed),
        )
        .route(
            "/categories/{id}/questions",
            get(questions_by_category).fallback(method_not_allowed),
        )
        .with_state(state)
}
