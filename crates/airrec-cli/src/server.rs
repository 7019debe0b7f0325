use std::net::SocketAddr;

use airrec_core::{Prediction, RawRatings, RecommendationService, ServiceError};
use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

#[derive(Clone)]
pub struct ApiState {
    pub service: RecommendationService,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    BadRequest(String),
    Service(ServiceError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Service(ServiceError::InvalidRating(e)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_rating", e.to_string())
            }
            ApiError::Service(ServiceError::Prediction(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "prediction_failed", e.to_string())
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(service: RecommendationService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/predict", post(predict))
        .with_state(ApiState { service })
}

pub async fn serve(addr: &str, service: RecommendationService) -> anyhow::Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid listen address '{addr}'"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, model = service.oracle_kind(), "serving predictions");
    axum::serve(listener, router(service))
        .await
        .context("server terminated")?;
    Ok(())
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.service.oracle_kind().to_string(),
    })
}

async fn predict(
    State(state): State<ApiState>,
    payload: Result<Json<RawRatings>, JsonRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let Json(raw) = payload.map_err(|rejection| {
        tracing::warn!(reason = %rejection.body_text(), "rejected malformed request");
        ApiError::from(rejection)
    })?;

    match state.service.evaluate(&raw) {
        Ok(prediction) => {
            tracing::debug!(
                label = ?prediction.verdict.label,
                confidence = prediction.verdict.confidence,
                "prediction served"
            );
            Ok(Json(prediction))
        }
        Err(ServiceError::InvalidRating(e)) => {
            tracing::warn!(error = %e, "rejected rating");
            Err(ApiError::Service(ServiceError::InvalidRating(e)))
        }
        Err(ServiceError::Prediction(e)) => {
            tracing::error!(error = %e, "prediction failed");
            Err(ApiError::Service(ServiceError::Prediction(e)))
        }
    }
}
