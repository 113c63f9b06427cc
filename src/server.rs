//! HTTP front end: `POST /recognize` (multipart upload) and `GET /health`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::error::RecognitionError;
use crate::models::Side;
use crate::pipeline::{RecognizeOptions, Recognizer};

#[derive(Clone)]
pub struct AppState {
    pub recognizer: Arc<Recognizer>,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthBody {
    pub ok: bool,
    pub model_loaded: bool,
}

/// Failure of one `/recognize` request
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Recognition(RecognitionError),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Recognition(e) if e.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Recognition(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client; internal faults are not echoed
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Recognition(e) if e.is_client_error() => e.to_string(),
            ApiError::Recognition(_) | ApiError::Internal(_) => {
                "Internal recognition error".to_string()
            }
        }
    }
}

impl From<RecognitionError> for ApiError {
    fn from(e: RecognitionError) -> Self {
        ApiError::Recognition(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Recognition(e) => error!("Unexpected recognition error: {}", e),
                ApiError::Internal(msg) => error!("Unexpected error: {}", msg),
                ApiError::BadRequest(_) => {}
            }
        }
        (status, Json(ErrorBody { error: self.message() })).into_response()
    }
}

/// Side to move from the optional `turn` form field, `w` when absent
pub fn parse_turn(turn: Option<&str>) -> Result<Side, RecognitionError> {
    match turn {
        None => Ok(Side::White),
        Some(t) if t.trim().is_empty() => Ok(Side::White),
        Some(t) => t.parse(),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/recognize", post(recognize))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting on http://localhost:{}", port);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

pub async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        ok: true,
        model_loaded: state.model_loaded,
    })
}

pub async fn recognize(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut image: Option<Vec<u8>> = None;
    let mut turn: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => {
                if field.file_name().is_some_and(str::is_empty) {
                    return Err(ApiError::BadRequest("Empty filename".to_string()));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                image = Some(bytes.to_vec());
            }
            Some("turn") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                turn = Some(text);
            }
            _ => {}
        }
    }

    let Some(image) = image else {
        return Err(ApiError::BadRequest("No image field in request".to_string()));
    };
    let side = parse_turn(turn.as_deref())?;

    let recognizer = state.recognizer.clone();
    let result = tokio::task::spawn_blocking(move || {
        recognizer.recognize(&image, RecognizeOptions::new(side))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(result).into_response())
}
