//! HTTP surface: `POST /api/chat` and `GET /health`.

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use runtime::{Backend, Driver, Outcome, ToolHost, EXHAUSTED_MESSAGE};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::ingest::{ingest, Ingested};

/// Largest accepted request body, uploads included.
pub const MAX_REQUEST_BYTES: usize = 32 * 1024 * 1024;

/// Shared, read-only state of the chat service.
pub struct AppState<B, T> {
    driver: Arc<Driver<B, T>>,
    turn_timeout: Duration,
}

impl<B, T> AppState<B, T> {
    pub fn new(driver: Driver<B, T>, turn_timeout: Duration) -> Self {
        Self {
            driver: Arc::new(driver),
            turn_timeout,
        }
    }
}

impl<B, T> Clone for AppState<B, T> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            turn_timeout: self.turn_timeout,
        }
    }
}

#[derive(Serialize)]
struct TextResponse {
    text: String,
}

pub fn router<B, T>(state: AppState<B, T>) -> Router
where
    B: Backend + 'static,
    T: ToolHost + 'static,
{
    Router::new()
        .route("/api/chat", post(chat::<B, T>))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn chat<B, T>(State(state): State<AppState<B, T>>, request: Request) -> Response
where
    B: Backend + 'static,
    T: ToolHost + 'static,
{
    let span = info_span!("turn", id = %Uuid::new_v4());
    match run_turn(&state, request).instrument(span).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn run_turn<B, T>(state: &AppState<B, T>, request: Request) -> ApiResult<Response>
where
    B: Backend,
    T: ToolHost,
{
    let Ingested { payload, upload } = ingest(request).await?;
    let (context, history) =
        runtime::prepare(payload, upload.as_ref().map(|u| u.path().to_path_buf()));
    info!(
        messages = history.len(),
        upload = upload.is_some(),
        "turn started"
    );

    let turn = tokio::time::timeout(state.turn_timeout, state.driver.run(&context, history))
        .await
        .map_err(|_| ApiError::Deadline(state.turn_timeout))??;

    // The upload directory is removed only after the last tool has run.
    drop(upload);

    info!(
        model_calls = turn.model_calls,
        rounds = turn.state.round,
        input_tokens = turn.usage.input_tokens,
        output_tokens = turn.usage.output_tokens,
        "turn finished"
    );

    let response = match turn.outcome {
        Outcome::Done(text) => Json(TextResponse { text }).into_response(),
        Outcome::Exhausted => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TextResponse {
                text: EXHAUSTED_MESSAGE.to_string(),
            }),
        )
            .into_response(),
    };
    Ok(response)
}
