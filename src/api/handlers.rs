//! HTTP request handlers for the Payroll Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{aggregate_remittance, generate_record_of_employment, generate_t4};
use crate::error::{EngineError, EngineResult};
use crate::models::{CompanySettings, Employee};
use crate::payroll::{PayRunRequest, commit_payroll_run, preview_pay_run};

use super::request::{CommitRequest, PreviewRequest, RoeRequest};
use super::response::{ApiError, ApiErrorResponse, PreviewResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/tenants/:tenant_id/settings", put(save_settings_handler))
        .route("/tenants/:tenant_id/employees", put(save_employee_handler))
        .route("/tenants/:tenant_id/pay-runs/preview", post(preview_handler))
        .route(
            "/tenants/:tenant_id/pay-runs",
            post(commit_handler).get(history_handler),
        )
        .route(
            "/tenants/:tenant_id/pay-runs/:run_id/remittance",
            get(remittance_handler),
        )
        .route(
            "/tenants/:tenant_id/employees/:employee_id/t4/:tax_year",
            get(t4_handler),
        )
        .route(
            "/tenants/:tenant_id/employees/:employee_id/roe",
            post(roe_handler),
        )
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
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
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for PUT /tenants/:tenant_id/settings.
async fn save_settings_handler(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    payload: Result<Json<CompanySettings>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tenant_id = %tenant_id, "Saving company settings");

    let settings = match payload {
        Ok(Json(settings)) => settings,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match state
        .store()
        .save_company_settings(&tenant_id, settings.clone())
    {
        Ok(()) => json_response(StatusCode::OK, settings),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /tenants/:tenant_id/employees.
///
/// Returns the stored record, which keeps the existing YTD ledger and
/// profile history of an employee that was already on file.
async fn save_employee_handler(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    payload: Result<Json<Employee>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tenant_id = %tenant_id, "Saving employee");

    let employee = match payload {
        Ok(Json(employee)) => employee,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match state.store().save_employee(&tenant_id, employee) {
        Ok(saved) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %saved.id,
                profile_count = saved.profiles.len(),
                "Employee saved"
            );
            json_response(StatusCode::OK, saved)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /tenants/:tenant_id/pay-runs/preview.
///
/// Calculates paystubs without changing any employee state.
async fn preview_handler(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tenant_id = %tenant_id, "Processing pay run preview");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match perform_preview(&state, &tenant_id, request) {
        Ok(response) => {
            info!(
                correlation_id = %correlation_id,
                paystub_count = response.paystubs.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Pay run preview completed"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

fn perform_preview(
    state: &AppState,
    tenant_id: &str,
    request: PreviewRequest,
) -> EngineResult<PreviewResponse> {
    let store = state.store();
    let settings = store.company_settings(tenant_id)?;
    let employees = match &request.employee_ids {
        Some(ids) => ids
            .iter()
            .map(|id| store.employee(tenant_id, id))
            .collect::<EngineResult<Vec<_>>>()?,
        None => store.employees(tenant_id)?,
    };

    let run = PayRunRequest {
        tenant_id: tenant_id.to_string(),
        pay_period_label: request.pay_period_label,
        pay_date: request.pay_date,
        employees,
    };

    let mut progress = Vec::with_capacity(run.employees.len());
    let paystubs = preview_pay_run(&run, &settings, state.config(), |event| {
        progress.push(event.clone())
    })?;

    Ok(PreviewResponse { paystubs, progress })
}

/// Handler for POST /tenants/:tenant_id/pay-runs.
async fn commit_handler(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
    payload: Result<Json<CommitRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, tenant_id = %tenant_id, "Committing pay run");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match commit_payroll_run(
        state.store(),
        state.config(),
        &tenant_id,
        &request.pay_period_label,
        request.pay_date,
        request.paystubs,
    ) {
        Ok(run) => {
            info!(
                correlation_id = %correlation_id,
                pay_run_id = %run.id,
                "Pay run committed"
            );
            json_response(StatusCode::CREATED, run)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /tenants/:tenant_id/pay-runs.
async fn history_handler(
    State(state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.store().history(&tenant_id) {
        Ok(history) => json_response(StatusCode::OK, history),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /tenants/:tenant_id/pay-runs/:run_id/remittance.
async fn remittance_handler(
    State(state): State<AppState>,
    Path((tenant_id, run_id)): Path<(String, Uuid)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        tenant_id = %tenant_id,
        pay_run_id = %run_id,
        "Aggregating remittance"
    );

    match state.store().pay_run(&tenant_id, run_id) {
        Ok(run) => json_response(StatusCode::OK, aggregate_remittance(&run)),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /tenants/:tenant_id/employees/:employee_id/t4/:tax_year.
async fn t4_handler(
    State(state): State<AppState>,
    Path((tenant_id, employee_id, tax_year)): Path<(String, String, i32)>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        tenant_id = %tenant_id,
        employee_id = %employee_id,
        tax_year,
        "Generating T4"
    );

    let store = state.store();
    let result = store.company_settings(&tenant_id).and_then(|company| {
        let employee = store.employee(&tenant_id, &employee_id)?;
        generate_t4(&employee, &company, tax_year)
    });

    match result {
        Ok(slip) => json_response(StatusCode::OK, slip),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /tenants/:tenant_id/employees/:employee_id/roe.
async fn roe_handler(
    State(state): State<AppState>,
    Path((tenant_id, employee_id)): Path<(String, String)>,
    payload: Result<Json<RoeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        tenant_id = %tenant_id,
        employee_id = %employee_id,
        "Generating record of employment"
    );

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let store = state.store();
    let result = store.company_settings(&tenant_id).and_then(|company| {
        let employee = store.employee(&tenant_id, &employee_id)?;
        generate_record_of_employment(&employee, &company, request.last_day_paid, request.reason)
    });

    match result {
        Ok(roe) => json_response(StatusCode::OK, roe),
        Err(err) => error_response(correlation_id, err),
    }
}
