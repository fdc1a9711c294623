//! Request types for the Payroll Engine API.
//!
//! Company settings and employees are accepted as their model types; the
//! structures here cover the pay run and year-end endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Paystub, RoeReason};

/// Request body for `POST /tenants/:tenant_id/pay-runs/preview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRequest {
    /// The pay period label (e.g., "Jan 6 - Jan 19").
    pub pay_period_label: String,
    /// The pay date; its year selects the rate table.
    pub pay_date: NaiveDate,
    /// Employees to include, in processing order.
    ///
    /// When omitted every employee of the tenant is included, ordered by ID.
    #[serde(default)]
    pub employee_ids: Option<Vec<String>>,
}

/// Request body for `POST /tenants/:tenant_id/pay-runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRequest {
    /// The pay period label; must match every paystub.
    pub pay_period_label: String,
    /// The pay date; must match every paystub.
    pub pay_date: NaiveDate,
    /// Previewed paystubs to commit.
    pub paystubs: Vec<Paystub>,
}

/// Request body for `POST /tenants/:tenant_id/employees/:employee_id/roe`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoeRequest {
    /// The last day for which the employee was paid.
    pub last_day_paid: NaiveDate,
    /// Reason for separation.
    pub reason: RoeReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_request_without_employee_ids() {
        let json = r#"{
            "pay_period_label": "Jan 6 - Jan 19",
            "pay_date": "2024-01-19"
        }"#;

        let request: PreviewRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.pay_period_label, "Jan 6 - Jan 19");
        assert_eq!(request.pay_date, NaiveDate::from_ymd_opt(2024, 1, 19).unwrap());
        assert!(request.employee_ids.is_none());
    }

    #[test]
    fn test_preview_request_with_employee_ids() {
        let json = r#"{
            "pay_period_label": "Jan 6 - Jan 19",
            "pay_date": "2024-01-19",
            "employee_ids": ["emp_002", "emp_001"]
        }"#;

        let request: PreviewRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.employee_ids,
            Some(vec!["emp_002".to_string(), "emp_001".to_string()])
        );
    }

    #[test]
    fn test_roe_request_parses_reason() {
        let json = r#"{"last_day_paid": "2024-04-30", "reason": "shortage_of_work"}"#;

        let request: RoeRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.reason, RoeReason::ShortageOfWork);
    }

    #[test]
    fn test_commit_request_requires_paystubs() {
        let json = r#"{"pay_period_label": "Jan 6 - Jan 19", "pay_date": "2024-01-19"}"#;

        let result: Result<CommitRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
