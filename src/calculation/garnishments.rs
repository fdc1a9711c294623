//! Garnishment resolution and application.
//!
//! An employee's garnishment assignments are flattened against the company's
//! garnishment configurations, then applied in ascending priority. Fixed
//! orders deduct their dollar amount; percentage orders deduct a share of
//! net-after-tax pay (gross less income tax, CPP and EI).
//!
//! Garnishments are not reduced when they exceed net-after-tax pay; a
//! warning is raised instead so the run can be reviewed before commit.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{
    AuditStep, AuditWarning, CompanySettings, DeductionCategory, DeductionLine, Employee,
    GarnishmentCalculation, Jurisdiction,
};

use super::round_money;

/// Warning code raised when garnishments exceed net-after-tax pay.
pub const GARNISHMENTS_EXCEED_NET_PAY: &str = "garnishments_exceed_net_pay";

/// A garnishment assignment joined with its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGarnishment {
    /// Configuration ID.
    pub configuration_id: String,
    /// Display name.
    pub name: String,
    /// Issuing authority.
    pub jurisdiction: Jurisdiction,
    /// Fixed amount or percentage.
    pub calculation: GarnishmentCalculation,
    /// Lower priorities are deducted first.
    pub priority: u32,
    /// Dollars or percent, per `calculation`.
    pub amount: Decimal,
}

/// Flattens an employee's garnishments against the company catalog.
///
/// # Errors
///
/// Returns `CodeNotFound` if an assignment references an unknown
/// configuration.
pub fn resolve_garnishments(
    employee: &Employee,
    settings: &CompanySettings,
) -> EngineResult<Vec<ResolvedGarnishment>> {
    employee
        .garnishments
        .iter()
        .map(|assignment| {
            let config = settings.garnishment_configuration(&assignment.configuration_id)?;
            Ok(ResolvedGarnishment {
                configuration_id: config.id.clone(),
                name: config.name.clone(),
                jurisdiction: config.jurisdiction,
                calculation: config.calculation,
                priority: config.priority,
                amount: assignment.amount,
            })
        })
        .collect()
}

/// The result of applying garnishments.
#[derive(Debug, Clone)]
pub struct GarnishmentResult {
    /// Deduction lines in the order applied.
    pub deduction_lines: Vec<DeductionLine>,
    /// Sum of the deduction lines.
    pub total: Decimal,
    /// Raised when the total exceeds net-after-tax pay.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Applies garnishments in priority order.
///
/// Ties keep their assignment order. Percentage garnishments are computed
/// on `net_after_tax`, floored at zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{apply_garnishments, ResolvedGarnishment};
/// use payroll_engine::models::{GarnishmentCalculation, Jurisdiction};
/// use rust_decimal::Decimal;
///
/// let orders = vec![ResolvedGarnishment {
///     configuration_id: "cra".to_string(),
///     name: "CRA Requirement to Pay".to_string(),
///     jurisdiction: Jurisdiction::Federal,
///     calculation: GarnishmentCalculation::Percentage,
///     priority: 1,
///     amount: Decimal::from(10),
/// }];
///
/// let result = apply_garnishments(&orders, Decimal::from(1500), 10);
/// assert_eq!(result.total, Decimal::new(15000, 2));
/// assert!(result.warning.is_none());
/// ```
pub fn apply_garnishments(
    garnishments: &[ResolvedGarnishment],
    net_after_tax: Decimal,
    step_number: u32,
) -> GarnishmentResult {
    let mut ordered: Vec<&ResolvedGarnishment> = garnishments.iter().collect();
    ordered.sort_by_key(|g| g.priority);

    let base = net_after_tax.max(Decimal::ZERO);
    let mut deduction_lines = Vec::with_capacity(ordered.len());
    let mut applied = Vec::with_capacity(ordered.len());

    for garnishment in &ordered {
        let amount = match garnishment.calculation {
            GarnishmentCalculation::FixedAmount => round_money(garnishment.amount),
            GarnishmentCalculation::Percentage => {
                round_money(base * garnishment.amount / Decimal::ONE_HUNDRED)
            }
        };

        applied.push(serde_json::json!({
            "configuration_id": garnishment.configuration_id,
            "priority": garnishment.priority,
            "amount": amount.to_string()
        }));
        deduction_lines.push(DeductionLine {
            category: DeductionCategory::Garnishment,
            code: garnishment.configuration_id.clone(),
            description: garnishment.name.clone(),
            amount,
        });
    }

    let total: Decimal = deduction_lines.iter().map(|l| l.amount).sum();

    let warning = (total > base).then(|| AuditWarning {
        code: GARNISHMENTS_EXCEED_NET_PAY.to_string(),
        message: format!(
            "Garnishments of ${} exceed net-after-tax pay of ${}",
            total, base
        ),
        severity: "high".to_string(),
    });

    let audit_step = AuditStep {
        step_number,
        rule_id: "garnishments".to_string(),
        rule_name: "Garnishments".to_string(),
        reference: "Garnishment orders by priority".to_string(),
        input: serde_json::json!({
            "net_after_tax": net_after_tax.to_string(),
            "order_count": garnishments.len()
        }),
        output: serde_json::json!({
            "applied": applied,
            "total": total.to_string()
        }),
        reasoning: if deduction_lines.is_empty() {
            "No garnishments".to_string()
        } else {
            format!(
                "{} garnishment(s) applied by priority totalling ${}",
                deduction_lines.len(),
                total
            )
        },
    };

    GarnishmentResult {
        deduction_lines,
        total,
        warning,
        audit_step,
    }
}
