//! Error types for the tax engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while estimating taxes.

use thiserror::Error;

/// The main error type for the tax engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use tax_engine::error::EngineError;
///
/// let error = EngineError::UnsupportedCountry {
///     code: "de".to_string(),
/// };
/// assert_eq!(error.to_string(), "Unsupported country: de");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A field of the tax input was invalid.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A bracket schedule violated its ordering or rate constraints.
    #[error("Invalid bracket schedule: {message}")]
    InvalidBrackets {
        /// A description of the violated constraint.
        message: String,
    },

    /// The requested country code has no rule adapter.
    #[error("Unsupported country: {code}")]
    UnsupportedCountry {
        /// The country code that was requested.
        code: String,
    },

    /// The requested currency has no rate in the exchange rate snapshot.
    #[error("Unsupported currency: {code}")]
    UnsupportedCurrency {
        /// The currency code that was requested.
        code: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`] error.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
