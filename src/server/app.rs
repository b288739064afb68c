use std::path::PathBuf;

use anyhow::Context;
use axum::body::Body;
use axum::http::{header, Method, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Router};
use prometheus::{Encoder, TextEncoder};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::routes::{category_router, questions_router, quizzes_router, ApiError};
use crate::configuration::Settings;
use crate::query::QueryService;
use crate::store::{QuestionStore, SqliteStore};

#[derive(Clone)]
pub struct AppState<S> {
    pub query: QueryService<S>,
    pub per_page: i64,
}

impl<S: QuestionStore> AppState<S> {
    pub fn new(store: S, per_page: usize) -> Self {
        Self {
            query: QueryService::new(store),
            per_page: i64::try_from(per_page).unwrap_or(i64::MAX),
        }
    }
}

pub fn router<S: QuestionStore + Clone + 'static>(
    state: AppState<S>,
    static_dir: Option<PathBuf>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let mut app = Router::new()
        .route("/metrics", get(metrics))
        .merge(category_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(quizzes_router(state));
    if let Some(static_dir) = static_dir {
        app = app.nest_service("/static", ServeDir::new(static_dir));
    }

    app.fallback(|| async {
        tracing::info!("Fallback");
        ApiError::not_found()
    })
    .layer(middleware::map_response(method_not_allowed_as_json))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}

pub async fn run_server(settings: Settings, store: SqliteStore) -> anyhow::Result<()> {
    let addr = settings.application.address();
    let state = AppState::new(store, settings.questions.per_page);
    let app = router(state, settings.application.static_dir);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Serving on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

// axum answers a known path with the wrong method by itself, with an empty body
async fn method_not_allowed_as_json(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut json = ApiError::MethodNotAllowed.into_response();
    if let Some(allow) = allow {
        json.headers_mut().insert(header::ALLOW, allow);
    }
    json
}

async fn metrics() -> Result<Response, ApiError> {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    encoder.encode(&metrics, &mut buf).map_err(|err| {
        tracing::error!("Failed to encode metrics: {err}");
        ApiError::Internal
    })?;
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(Body::from(buf))
        .map_err(|err| {
            tracing::error!("Failed to build metrics response: {err}");
            ApiError::Internal
        })
}
