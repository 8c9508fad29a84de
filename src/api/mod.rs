//! HTTP API module for the tax engine.
//!
//! This module provides the REST API endpoints for comparing income tax and
//! social security estimates across the supported countries.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::CalculationRequest;
pub use response::{ApiError, CountryInfo};
pub use state::AppState;
