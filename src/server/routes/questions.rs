use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;

use crate::{
    server::app::AppState,
    store::{NewQuestion, Question, QuestionStore},
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{categories_by_id, ApiError, ApiResponse};

#[derive(Deserialize)]
pub(super) struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    /// Requested page. A missing or non-numeric `page` means the first one.
    pub(super) fn number(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|page| page.trim().parse().ok())
            .unwrap_or(1)
    }
}

// one endpoint serves both search and creation, told apart by `searchTerm`
#[derive(Deserialize)]
struct QuestionsBody {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: BTreeMap<i64, String>,
    current_category: Option<i64>,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<i64>,
}

#[derive(Serialize)]
struct Created {
    success: bool,
    created: i64,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
}

async fn list_questions<S: QuestionStore>(
    State(state): State<AppState<S>>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsPage>> {
    let Query(page) = page.map_err(ApiError::rejected)?;
    let page = state
        .query
        .list(page.number(), state.per_page, None)
        .await?;
    if page.questions.is_empty() {
        return Err(ApiError::not_found());
    }
    let categories = state.query.store().categories().await?;

    Ok(Json(QuestionsPage {
        success: true,
        questions: page.questions,
        total_questions: page.total,
        categories: categories_by_id(categories),
        current_category: None,
    }))
}

async fn delete_question<S: QuestionStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<Deleted>> {
    let Path(id) = id.map_err(|_| ApiError::not_found())?;
    state.query.store().delete(id).await?;
    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Question deleted");
    Ok(Json(Deleted {
        success: true,
        deleted: id,
    }))
}

async fn create_or_search_questions<S: QuestionStore>(
    State(state): State<AppState<S>>,
    page: Result<Query<PageQuery>, QueryRejection>,
    body: Result<Json<QuestionsBody>, JsonRejection>,
) -> ApiResponse<Response> {
    let Json(body) = body.map_err(ApiError::rejected)?;
    let Query(page) = page.map_err(ApiError::rejected)?;

    if let Some(term) = body.search_term {
        let questions = state.query.search(&term).await?;
        if questions.is_empty() {
            return Err(ApiError::not_found());
        }
        return Ok(Json(SearchResults {
            success: true,
            total_questions: questions.len(),
            questions,
            current_category: None,
        })
        .into_response());
    }

    let new_question = NewQuestion {
        question: body
            .question
            .ok_or_else(|| ApiError::bad_request("Question is a mandatory field"))?,
        answer: body
            .answer
            .ok_or_else(|| ApiError::bad_request("Answer is a mandatory field"))?,
        category: body
            .category
            .ok_or_else(|| ApiError::bad_request("Category is a mandatory field"))?,
        difficulty: body
            .difficulty
            .ok_or_else(|| ApiError::bad_request("Difficulty is a mandatory field"))?,
    };
    let created = state.query.store().create(new_question).await?;
    QUESTIONS_CREATED.inc();
    tracing::info!(id = created.id, category = created.category, "Question created");

    let page = state
        .query
        .list(page.number(), state.per_page, None)
        .await?;
    Ok(Json(Created {
        success: true,
        created: created.id,
        questions: page.questions,
        total_questions: page.total,
    })
    .into_response())
}

pub fn questions_router<S: QuestionStore + Clone + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route(
            "/questions",
            get(list_questions::<S>).post(create_or_search_questions::<S>),
        )
        .route("/questions/{id}", delete(delete_question::<S>))
        .with_state(state)
}
