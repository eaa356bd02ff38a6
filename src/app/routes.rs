use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::server::AppState;
use crate::domain::model::{
    CalculationRequest, DerivativeResponse, HealthResponse, IntegralResponse,
};
use crate::utils::error::Result;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/differentiate", post(differentiate))
        .route("/integrate", post(integrate))
        .route("/health", get(health))
        .with_state(state)
}

async fn differentiate(
    State(state): State<AppState>,
    Json(request): Json<CalculationRequest>,
) -> Result<Json<DerivativeResponse>> {
    tracing::info!("📐 differentiate d/d{} {}", request.variable, request.expression);
    let derivative = state
        .calculus
        .differentiate(&request.expression, &request.variable)
        .await?;
    Ok(Json(DerivativeResponse { derivative }))
}

async fn integrate(
    State(state): State<AppState>,
    Json(request): Json<CalculationRequest>,
) -> Result<Json<IntegralResponse>> {
    tracing::info!("∫ integrate {} d{}", request.expression, request.variable);
    let integral = state
        .calculus
        .integrate(&request.expression, &request.variable)
        .await?;
    Ok(Json(IntegralResponse { integral }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
