//! HTTP API module for the Payroll Engine.
//!
//! This module provides the REST endpoints for company settings, employees,
//! pay run preview and commit, remittance, and year-end slips.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CommitRequest, PreviewRequest, RoeRequest};
pub use response::{ApiError, ApiErrorResponse, PreviewResponse};
pub use state::AppState;
