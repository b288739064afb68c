use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::{
    server::app::AppState,
    store::{Question, QuestionStore},
};

use super::{categories_by_id, questions::PageQuery, ApiError, ApiResponse};

/// Category id meaning "every category".
const ALL_CATEGORIES: i64 = 0;

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: i64,
}

async fn get_categories<S: QuestionStore>(
    State(state): State<AppState<S>>,
) -> ApiResponse<Json<CategoriesResponse>> {
    let categories = state.query.store().categories().await?;
    if categories.is_empty() {
        return Err(ApiError::not_found());
    }
    Ok(Json(CategoriesResponse {
        success: true,
        categories: categories_by_id(categories),
    }))
}

async fn questions_for_category<S: QuestionStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<CategoryQuestionsResponse>> {
    let Path(id) = id.map_err(|_| ApiError::not_found())?;
    let Query(page) = page.map_err(ApiError::rejected)?;
    let scope = (id != ALL_CATEGORIES).then_some(id);

    let page = state
        .query
        .list(page.number(), state.per_page, scope)
        .await?;
    if page.total == 0 {
        return Err(ApiError::BadRequest(None));
    }
    if page.questions.is_empty() {
        return Err(ApiError::NotFound(Some(
            "No questions in selected page.".to_owned(),
        )));
    }

    Ok(Json(CategoryQuestionsResponse {
        success: true,
        questions: page.questions,
        total_questions: page.total,
        current_category: id,
    }))
}

pub fn category_router<S: QuestionStore + Clone + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/categories", get(get_categories::<S>))
        .route("/categories/{id}/questions", get(questions_for_category::<S>))
        .with_state(state)
}
