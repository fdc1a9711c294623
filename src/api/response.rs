//! Response types for the Payroll Engine API.
//!
//! This module defines the preview response, the error response structures
//! and the mapping from engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::Paystub;
use crate::payroll::PayRunProgress;

/// Response body for a pay run preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResponse {
    /// Calculated paystubs, in processing order.
    pub paystubs: Vec<Paystub>,
    /// Progress events reported during the run, one per employee.
    pub progress: Vec<PayRunProgress>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                )
            }
            EngineError::RateTableNotFound { tax_year } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "RATE_TABLE_NOT_FOUND",
                    message,
                    format!("No statutory rates are configured for {}", tax_year),
                ),
            ),
            EngineError::JurisdictionNotFound { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("JURISDICTION_NOT_FOUND", message),
            ),
            EngineError::MissingTd1 { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("MISSING_TD1", message),
            ),
            EngineError::ProfileNotFound { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("PROFILE_NOT_FOUND", message),
            ),
            EngineError::CodeNotFound { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::new("CODE_NOT_FOUND", message),
            ),
            EngineError::InvalidEmployee { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "INVALID_EMPLOYEE",
                    message,
                    "The employee data contains invalid information",
                ),
            ),
            EngineError::Validation { .. } => ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(message),
            ),
            EngineError::EmployeeCalculationFailed {
                employee_id,
                source,
            } => {
                let inner = ApiErrorResponse::from(*source);
                ApiErrorResponse::new(
                    inner.status,
                    ApiError::with_details(
                        "EMPLOYEE_CALCULATION_FAILED",
                        format!("Payroll calculation failed for employee '{}'", employee_id),
                        inner.error.message,
                    ),
                )
            }
            EngineError::EmployeeNotFound { .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new("EMPLOYEE_NOT_FOUND", message),
            ),
            EngineError::CompanySettingsNotFound { .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new("COMPANY_SETTINGS_NOT_FOUND", message),
            ),
            EngineError::PayRunNotFound { .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new("PAY_RUN_NOT_FOUND", message),
            ),
            EngineError::YtdNotFound { .. } => ApiErrorResponse::new(
                StatusCode::NOT_FOUND,
                ApiError::new("YTD_NOT_FOUND", message),
            ),
            EngineError::PayRunAlreadyCommitted { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("PAY_RUN_ALREADY_COMMITTED", message),
            ),
            EngineError::FinalizationBlocked { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("FINALIZATION_BLOCKED", message),
            ),
            EngineError::PaystubMismatch { .. } => ApiErrorResponse::new(
                StatusCode::CONFLICT,
                ApiError::new("PAYSTUB_MISMATCH", message),
            ),
            EngineError::Storage { .. } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Payroll store unavailable", message),
            ),
            EngineError::CalculationError { .. } => ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
        }
    }
}
