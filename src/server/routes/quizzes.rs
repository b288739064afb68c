use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::{
    quiz::{Draw, QuizSession},
    server::{app::AppState, deserializers::deserialize_ids},
    store::{Question, QuestionStore},
};

use super::{ApiError, ApiResponse};

const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default, deserialize_with = "deserialize_ids")]
    previous_questions: Vec<i64>,
    quiz_category: Option<QuizCategory>,
}

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    /// `None` once every question in scope has been played.
    question: Option<Question>,
}

async fn play_quiz<S: QuestionStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<Json<QuizResponse>> {
    let Json(request) = body.map_err(|rejection| {
        tracing::warn!("Rejected quiz request: {rejection}");
        ApiError::bad_request(
            "Please provide a JSON body with previous question Ids and optional category.",
        )
    })?;
    let category = request
        .quiz_category
        .map(|c| c.id)
        .filter(|id| *id != ALL_CATEGORIES);

    let mut session = QuizSession::resume(category, request.previous_questions);
    let mut rng = StdRng::from_entropy();
    let question = match session.next(&state.query, &mut rng).await? {
        Draw::Question(question) => Some(question),
        Draw::Exhausted => None,
    };

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router<S: QuestionStore + Clone + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz::<S>))
        .with_state(state)
}
