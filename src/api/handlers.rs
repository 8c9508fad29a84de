//! HTTP request handlers for the tax engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::compare;
use crate::error::EngineError;
use crate::models::{ComparisonReport, CountryCode, CountryResult};

use super::request::CalculationRequest;
use super::response::{ApiError, ApiErrorResponse, CountryInfo};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/countries", get(countries_handler))
        .with_state(state)
}

/// Handler for POST /calculate endpoint.
///
/// Accepts a calculation request and returns one rounded result per
/// requested country.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> impl IntoResponse {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    if body_text.contains("missing field") {
                        ApiError::new("VALIDATION_ERROR", body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json")],
                Json(error),
            )
                .into_response();
        }
    };

    let (input, countries) = match request.into_parts() {
        Ok(parts) => parts,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Unsupported code in request"
            );
            return error_response(err);
        }
    };

    let start_time = Instant::now();
    match compare(&input, &countries, state.config().tables()) {
        Ok(report) => {
            let report = rounded(report);
            info!(
                correlation_id = %correlation_id,
                calculation_id = %report.calculation_id,
                currency = %report.currency,
                countries = report.results.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(report),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            error_response(err)
        }
    }
}

/// Handler for GET /countries endpoint.
///
/// Lists the supported countries in display order.
async fn countries_handler() -> impl IntoResponse {
    let countries: Vec<CountryInfo> = CountryCode::ALL.into_iter().map(Into::into).collect();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        Json(countries),
    )
}

/// Rounds every result at the presentation boundary.
fn rounded(report: ComparisonReport) -> ComparisonReport {
    ComparisonReport {
        results: report.results.iter().map(CountryResult::rounded).collect(),
        ..report
    }
}

fn error_response(err: EngineError) -> Response {
    let api_error: ApiErrorResponse = err.into();
    (
        api_error.status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(api_error.error),
    )
        .into_response()
}
