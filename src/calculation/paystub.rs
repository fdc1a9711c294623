//! Per-employee gross-to-net calculation.
//!
//! [`calculate_paystub`] runs every step for one employee and one pay
//! period and assembles the resulting [`Paystub`]. Steps are numbered in
//! the order they run:
//!
//! 1. Profile, TD1 and jurisdiction resolution
//! 2. Regular pay
//! 3. Recurring earnings
//! 4. Vacation pay
//! 5. Recurring deductions
//! 6. Gross, pensionable, insurable and taxable earnings
//! 7. CPP
//! 8. EI
//! 9. Federal income tax
//! 10. Provincial income tax
//! 11. Garnishments
//! 12. Net pay
//!
//! The calculation is pure: it reads the employee's YTD totals to enforce
//! annual maximums but never changes them.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::config::RateTable;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, CompanySettings, DeductionCategory, DeductionLine, EarningLine, Employee,
    EmployerContributions, Paystub, Province,
};

use super::{
    ResolvedGarnishment, TaxableAmounts, apply_garnishments, calculate_cpp, calculate_ei,
    calculate_federal_tax, calculate_provincial_tax, calculate_regular_pay,
    calculate_vacation_pay, resolve_recurring_deductions, resolve_recurring_earnings,
};

/// Everything needed to calculate one employee's paystub.
#[derive(Debug, Clone, Copy)]
pub struct PaystubInput<'a> {
    /// The employee being paid.
    pub employee: &'a Employee,
    /// Pay period label (e.g., "Jan 1 - Jan 15").
    pub pay_period_label: &'a str,
    /// Pay date; selects the profile and the tax year.
    pub pay_date: NaiveDate,
    /// Company settings and code catalogs.
    pub settings: &'a CompanySettings,
    /// Rate table for the pay date's tax year.
    pub rate_table: &'a RateTable,
    /// Vacation pay percentage from the employee's vacation policy.
    pub vacation_rate_percent: Option<Decimal>,
    /// The employee's garnishments, already resolved.
    pub garnishments: &'a [ResolvedGarnishment],
}

/// Calculates one employee's paystub for one pay period.
///
/// # Errors
///
/// * `ProfileNotFound` - no profile is effective on the pay date
/// * `MissingTd1` - the employee has no TD1 information
/// * `JurisdictionNotFound` - the province of employment is not recognized
///   or has no rates for the tax year
/// * `CodeNotFound` - a recurring earning or deduction code is unknown
/// * `CalculationError` - the rate table is for a different tax year
pub fn calculate_paystub(input: &PaystubInput<'_>) -> EngineResult<Paystub> {
    let employee = input.employee;
    let table = input.rate_table;
    let tax_year = input.pay_date.year();
    let mut audit_steps: Vec<AuditStep> = Vec::new();
    let mut step_number: u32 = 1;

    if table.tax_year != tax_year {
        return Err(EngineError::CalculationError {
            message: format!(
                "rate table for {} cannot be used for pay date {}",
                table.tax_year, input.pay_date
            ),
        });
    }

    // Step 1: profile, TD1 and jurisdiction
    let profile = employee.profile_on(input.pay_date)?;
    let td1 = employee
        .payroll
        .as_ref()
        .ok_or_else(|| EngineError::MissingTd1 {
            employee_id: employee.id.clone(),
        })?;
    let jurisdiction_not_found = || EngineError::JurisdictionNotFound {
        jurisdiction: profile.province_of_employment.clone(),
        tax_year,
    };
    let province = Province::from_str(&profile.province_of_employment)
        .map_err(|_| jurisdiction_not_found())?;
    if !table.provinces.contains_key(&province) {
        return Err(jurisdiction_not_found());
    }
    let periods = profile.pay_frequency.periods_per_year();

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "profile_resolution".to_string(),
        rule_name: "Profile Resolution".to_string(),
        reference: "Employee profile history".to_string(),
        input: serde_json::json!({
            "employee_id": employee.id,
            "pay_date": input.pay_date.to_string()
        }),
        output: serde_json::json!({
            "profile_effective_date": profile.effective_date.to_string(),
            "province": province.code(),
            "pay_frequency": profile.pay_frequency,
            "tax_year": tax_year
        }),
        reasoning: format!(
            "Profile effective {} applies on {}; employed in {}, paid {} times a year",
            profile.effective_date,
            input.pay_date,
            province.code(),
            periods
        ),
    });
    step_number += 1;

    // Step 2: regular pay
    let regular = calculate_regular_pay(profile, step_number);
    audit_steps.push(regular.audit_step);
    step_number += 1;

    // Step 3: recurring earnings
    let recurring =
        resolve_recurring_earnings(&employee.recurring_earnings, input.settings, step_number)?;
    audit_steps.push(recurring.audit_step);
    step_number += 1;

    let mut earnings: Vec<EarningLine> = vec![regular.earning_line];
    earnings.extend(recurring.earning_lines);

    // Step 4: vacation pay on base earnings
    let base_earnings: Decimal = earnings.iter().map(|l| l.amount).sum();
    let vacation = calculate_vacation_pay(
        base_earnings,
        input.vacation_rate_percent,
        input.settings.vacation_payout_method,
        step_number,
    );
    audit_steps.push(vacation.audit_step);
    step_number += 1;
    earnings.extend(vacation.earning_line);

    // Step 5: recurring deductions
    let recurring_deductions =
        resolve_recurring_deductions(&employee.recurring_deductions, input.settings, step_number)?;
    audit_steps.push(recurring_deductions.audit_step);
    step_number += 1;

    // Step 6: earnings subject to each statutory deduction
    let gross_pay: Decimal = earnings.iter().map(|l| l.amount).sum();
    let pensionable_earnings: Decimal = earnings
        .iter()
        .filter(|l| l.pensionable)
        .map(|l| l.amount)
        .sum();
    let insurable_earnings: Decimal = earnings
        .iter()
        .filter(|l| l.insurable)
        .map(|l| l.amount)
        .sum();
    let taxable_earnings: Decimal = earnings
        .iter()
        .filter(|l| l.taxable)
        .map(|l| l.amount)
        .sum();
    let taxable_income =
        (taxable_earnings - recurring_deductions.pre_tax_total).max(Decimal::ZERO);

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "gross_pay".to_string(),
        rule_name: "Gross Pay".to_string(),
        reference: "Earning code flags".to_string(),
        input: serde_json::json!({
            "earning_lines": earnings.len(),
            "pre_tax_deductions": recurring_deductions.pre_tax_total.to_string()
        }),
        output: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "pensionable_earnings": pensionable_earnings.to_string(),
            "insurable_earnings": insurable_earnings.to_string(),
            "taxable_income": taxable_income.to_string()
        }),
        reasoning: format!(
            "Gross ${}; taxable ${} - ${} pre-tax deductions = ${}",
            gross_pay, taxable_earnings, recurring_deductions.pre_tax_total, taxable_income
        ),
    });
    step_number += 1;

    // Step 7: CPP
    let cpp = calculate_cpp(
        pensionable_earnings,
        periods,
        employee.ytd.cpp_for_year(tax_year),
        &table.cpp,
        step_number,
    );
    audit_steps.push(cpp.audit_step);
    step_number += 1;

    // Step 8: EI
    let ei = calculate_ei(
        insurable_earnings,
        employee.ytd.ei_for_year(tax_year),
        &table.ei,
        step_number,
    );
    audit_steps.push(ei.audit_step);
    step_number += 1;

    // Steps 9-10: income tax
    let amounts = TaxableAmounts {
        taxable_income,
        cpp: cpp.employee_contribution,
        ei: ei.employee_premium,
        periods_per_year: periods,
    };
    let federal = calculate_federal_tax(&amounts, td1.federal_claim_amount, table, step_number);
    audit_steps.push(federal.audit_step);
    step_number += 1;

    let provincial = calculate_provincial_tax(
        &amounts,
        td1.provincial_claim_amount,
        province,
        table,
        step_number,
    )
    .ok_or_else(jurisdiction_not_found)?;
    audit_steps.push(provincial.audit_step);
    step_number += 1;

    // Step 11: garnishments on net-after-tax
    let net_after_tax =
        gross_pay - federal.tax - provincial.tax - cpp.employee_contribution - ei.employee_premium;
    let garnishments = apply_garnishments(input.garnishments, net_after_tax, step_number);
    audit_steps.push(garnishments.audit_step);
    step_number += 1;

    let mut deductions = vec![
        DeductionLine {
            category: DeductionCategory::FederalTax,
            code: "FED_TAX".to_string(),
            description: "Federal Income Tax".to_string(),
            amount: federal.tax,
        },
        DeductionLine {
            category: DeductionCategory::ProvincialTax,
            code: format!("{}_TAX", province.code()),
            description: format!("{} Income Tax", province.code()),
            amount: provincial.tax,
        },
        DeductionLine {
            category: DeductionCategory::Cpp,
            code: "CPP".to_string(),
            description: "Canada Pension Plan".to_string(),
            amount: cpp.employee_contribution,
        },
        DeductionLine {
            category: DeductionCategory::Ei,
            code: "EI".to_string(),
            description: "Employment Insurance".to_string(),
            amount: ei.employee_premium,
        },
    ];
    deductions.extend(garnishments.deduction_lines);
    deductions.extend(recurring_deductions.deduction_lines);

    // Step 12: net pay
    let total_deductions: Decimal = deductions.iter().map(|d| d.amount).sum();
    let net_pay = gross_pay - total_deductions;

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        reference: "Gross less deductions".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "total_deductions": total_deductions.to_string()
        }),
        output: serde_json::json!({ "net_pay": net_pay.to_string() }),
        reasoning: format!(
            "${} - ${} = ${}",
            gross_pay, total_deductions, net_pay
        ),
    });

    Ok(Paystub {
        employee_id: employee.id.clone(),
        employee_name: profile.full_name(),
        pay_period_label: input.pay_period_label.to_string(),
        pay_date: input.pay_date,
        tax_year,
        province,
        pay_frequency: profile.pay_frequency,
        earnings,
        deductions,
        gross_pay,
        total_deductions,
        net_pay,
        pensionable_earnings,
        insurable_earnings,
        taxable_income,
        employer_contributions: EmployerContributions {
            cpp: cpp.employer_contribution,
            ei: ei.employer_premium,
        },
        vacation: vacation.vacation,
        warnings: garnishments.warning.into_iter().collect(),
        audit_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CppRates, EiRates, FederalTaxRates, ProvincialTaxRates, TaxBracket};
    use crate::models::{
        BankAccount, Compensation, DeductionCode, EarningCode, EarningKind, EmployeeProfile,
        GarnishmentCalculation, Jurisdiction, PayFrequency, PayrollInfo, RecurringDeduction,
        RecurringEarning, VacationPayoutMethod, YtdTotals,
    };
    use std::collections::BTreeMap;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bracket(threshold: &str, rate: &str) -> TaxBracket {
        TaxBracket {
            threshold: dec(threshold),
            rate: dec(rate),
        }
    }

    fn create_test_table() -> RateTable {
        let mut provinces = BTreeMap::new();
        provinces.insert(
            Province::Ontario,
            ProvincialTaxRates {
                basic_personal_amount: dec("12399"),
                brackets: vec![bracket("0", "0.0505"), bracket("51446", "0.0915")],
            },
        );

        RateTable {
            tax_year: 2024,
            cpp: CppRates {
                rate: dec("0.0595"),
                basic_exemption: dec("3500"),
                max_pensionable_earnings: dec("68500"),
                max_contribution: dec("3867.50"),
            },
            ei: EiRates {
                rate: dec("0.0166"),
                max_insurable_earnings: dec("63200"),
                max_premium: dec("1049.12"),
                employer_multiplier: dec("1.4"),
            },
            federal: FederalTaxRates {
                basic_personal_amount: dec("15705"),
                canada_employment_amount: dec("1433"),
                brackets: vec![bracket("0", "0.15"), bracket("55867", "0.205")],
            },
            provinces,
        }
    }

    fn create_test_settings(method: VacationPayoutMethod) -> CompanySettings {
        CompanySettings {
            legal_name: "Maple Widgets Inc.".to_string(),
            business_number: "123456789RP0001".to_string(),
            province: "ON".to_string(),
            pay_frequency: PayFrequency::BiWeekly,
            vacation_payout_method: method,
            earning_codes: vec![EarningCode {
                code: "BENEFIT".to_string(),
                name: "Taxable Benefit".to_string(),
                taxable: true,
                pensionable: true,
                insurable: false,
            }],
            deduction_codes: vec![DeductionCode {
                code: "RRSP".to_string(),
                name: "Group RRSP".to_string(),
                reduces_taxable_income: true,
            }],
            garnishment_configurations: vec![],
            time_off_policies: vec![],
        }
    }

    fn create_test_employee() -> Employee {
        Employee {
            id: "emp_001".to_string(),
            hire_date: date(2023, 1, 1),
            profiles: vec![EmployeeProfile {
                effective_date: date(2023, 1, 1),
                first_name: "Jane".to_string(),
                last_name: "Doe".to_string(),
                job_title: "Bookkeeper".to_string(),
                province_of_employment: "ON".to_string(),
                pay_frequency: PayFrequency::BiWeekly,
                compensation: Compensation::Salary {
                    annual_amount: dec("52000"),
                },
            }],
            payroll: Some(PayrollInfo {
                sin: "046454286".to_string(),
                federal_claim_amount: dec("15705"),
                provincial_claim_amount: dec("12399"),
            }),
            bank_accounts: vec![BankAccount {
                institution_number: "001".to_string(),
                transit_number: "12345".to_string(),
                account_number: "1234567".to_string(),
                allocation_percent: dec("100"),
            }],
            garnishments: vec![],
            recurring_earnings: vec![],
            recurring_deductions: vec![],
            time_off_balances: BTreeMap::new(),
            ytd: YtdTotals::default(),
            ytd_history: vec![],
        }
    }

    fn calculate(
        employee: &Employee,
        settings: &CompanySettings,
        vacation_rate_percent: Option<Decimal>,
        garnishments: &[ResolvedGarnishment],
    ) -> EngineResult<Paystub> {
        let table = create_test_table();
        calculate_paystub(&PaystubInput {
            employee,
            pay_period_label: "Jan 1 - Jan 14",
            pay_date: date(2024, 1, 19),
            settings,
            rate_table: &table,
            vacation_rate_percent,
            garnishments,
        })
    }

    /// PS-001: salaried employee gross to net
    #[test]
    fn test_salaried_gross_to_net() {
        let employee = create_test_employee();
        let settings = create_test_settings(VacationPayoutMethod::Accrue);

        let stub = calculate(&employee, &settings, None, &[]).unwrap();

        assert_eq!(stub.gross_pay, dec("2000.00"));
        assert_eq!(stub.cpp(), dec("110.99"));
        assert_eq!(stub.ei(), dec("33.20"));
        assert_eq!(stub.employer_contributions.cpp, dec("110.99"));
        assert_eq!(stub.employer_contributions.ei, dec("46.48"));
        assert_eq!(stub.net_pay, stub.gross_pay - stub.total_deductions);
        assert_eq!(
            stub.total_deductions,
            stub.deductions.iter().map(|d| d.amount).sum::<Decimal>()
        );
        assert_eq!(stub.province, Province::Ontario);
        assert_eq!(stub.employee_name, "Jane Doe");
        assert_eq!(stub.tax_year, 2024);
    }

    /// PS-002: audit steps are numbered sequentially
    #[test]
    fn test_audit_steps_sequential() {
        let employee = create_test_employee();
        let settings = create_test_settings(VacationPayoutMethod::Accrue);

        let stub = calculate(&employee, &settings, Some(dec("4")), &[]).unwrap();

        for (i, step) in stub.audit_steps.iter().enumerate() {
            assert_eq!(step.step_number, (i + 1) as u32);
        }
        let rule_ids: Vec<&str> = stub.audit_steps.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(
            rule_ids,
            vec![
                "profile_resolution",
                "regular_pay",
                "recurring_earnings",
                "vacation_pay",
                "recurring_deductions",
                "gross_pay",
                "cpp",
                "ei",
                "federal_tax",
                "provincial_tax",
                "garnishments",
                "net_pay"
            ]
        );
    }

    /// PS-003: accrued vacation stays out of earnings
    #[test]
    fn test_accrued_vacation_not_in_earnings() {
        let employee = create_test_employee();
        let settings = create_test_settings(VacationPayoutMethod::Accrue);

        let stub = calculate(&employee, &settings, Some(dec("4")), &[]).unwrap();

        assert_eq!(stub.vacation_accrued(), dec("80.00"));
        assert!(stub.earnings.iter().all(|l| l.kind != EarningKind::VacationPay));
        assert_eq!(stub.gross_pay, dec("2000.00"));
    }

    /// PS-004: paid-out vacation is added to gross
    #[test]
    fn test_payout_vacation_in_earnings() {
        let employee = create_test_employee();
        let settings = create_test_settings(VacationPayoutMethod::Payout);

        let stub = calculate(&employee, &settings, Some(dec("4")), &[]).unwrap();

        assert_eq!(stub.vacation_paid_out(), dec("80.00"));
        assert_eq!(stub.vacation_accrued(), Decimal::ZERO);
        assert!(stub.earnings.iter().any(|l| l.kind == EarningKind::VacationPay));
        assert_eq!(stub.gross_pay, dec("2080.00"));
    }

    /// PS-005: CPP and EI stop once YTD reaches the maximum
    #[test]
    fn test_ytd_at_maximum_stops_contributions() {
        let mut employee = create_test_employee();
        employee.ytd = YtdTotals::new(2024);
        employee.ytd.cpp = dec("3867.50");
        employee.ytd.ei = dec("1049.12");
        let settings = create_test_settings(VacationPayoutMethod::Accrue);

        let stub = calculate(&employee, &settings, None, &[]).unwrap();

        assert_eq!(stub.cpp(), Decimal::ZERO);
        assert_eq!(stub.ei(), Decimal::ZERO);
        assert_eq!(stub.employer_contributions.cpp, Decimal::ZERO);
        assert_eq!(stub.employer_contributions.ei, Decimal::ZERO);
    }

    /// PS-006: last year's YTD does not limit this year
    #[test]
    fn test_prior_year_ytd_ignored() {
        let mut employee = create_test_employee();
        employee.ytd = YtdTotals::new(2023);
        employee.ytd.cpp = dec("3754.45");
        let settings = create_test_settings(VacationPayoutMethod::Accrue);

        let stub = calculate(&employee, &settings, None, &[]).unwrap();
        assert_eq!(stub.cpp(), dec("110.99"));
    }

    /// PS-007: unknown province fails, never defaults
    #[test]
    fn test_unknown_province_fails() {
        let mut employee = create_test_employee();
        employee.profiles[0].province_of_employment = "ZZ".to_string();
        let settings = create_test_settings(VacationPayoutMethod::Accrue);

        match calculate(&employee, &settings, None, &[]) {
            Err(EngineError::JurisdictionNotFound {
                jurisdiction,
                tax_year,
            }) => {
                assert_eq!(jurisdiction, "ZZ");
                assert_eq!(tax_year, 2024);
            }
            other => panic!("Expected JurisdictionNotFound, got {:?}", other),
        }
    }

    /// PS-008: province without rates fails
    #[test]
    fn test_province_without_rates_fails() {
        let mut employee = create_test_employee();
        employee.profiles[0].province_of_employment = "QC".to_string();
        let settings = create_test_settings(VacationPayoutMethod::Accrue);

        assert!(matches!(
            calculate(&employee, &settings, None, &[]),
            Err(EngineError::JurisdictionNotFound { .. })
        ));
    }

    /// PS-009: missing TD1 fails
    #[test]
    fn test_missing_td1_fails() {
        let mut employee = create_test_employee();
        employee.payroll = None;
        let settings = create_test_settings(VacationPayoutMethod::Accrue);

        assert!(matches!(
            calculate(&employee, &settings, None, &[]),
            Err(EngineError::MissingTd1 { .. })
        ));
    }

    /// PS-010: earning flags and pre-tax deductions shape each base
    #[test]
    fn test_flags_and_pre_tax_deductions() {
        let mut employee = create_test_employee();
        employee.recurring_earnings = vec![RecurringEarning {
            code: "BENEFIT".to_string(),
            amount: dec("100"),
        }];
        employee.recurring_deductions = vec![RecurringDeduction {
            code: "RRSP".to_string(),
            amount: dec("150"),
        }];
        let settings = create_test_settings(VacationPayoutMethod::Accrue);

        let stub = calculate(&employee, &settings, None, &[]).unwrap();

        assert_eq!(stub.gross_pay, dec("2100.00"));
        assert_eq!(stub.pensionable_earnings, dec("2100.00"));
        assert_eq!(stub.insurable_earnings, dec("2000.00"));
        assert_eq!(stub.taxable_income, dec("1950.00"));
        assert_eq!(
            stub.deduction_total(DeductionCategory::RecurringDeduction),
            dec("150.00")
        );
        assert_eq!(stub.net_pay, stub.gross_pay - stub.total_deductions);
    }

    /// PS-011: garnishments become deduction lines and may warn
    #[test]
    fn test_garnishments_deducted_with_warning() {
        let employee = create_test_employee();
        let settings = create_test_settings(VacationPayoutMethod::Accrue);
        let orders = vec![ResolvedGarnishment {
            configuration_id: "fso".to_string(),
            name: "Family Support Order".to_string(),
            jurisdiction: Jurisdiction::Province(Province::Ontario),
            calculation: GarnishmentCalculation::FixedAmount,
            priority: 1,
            amount: dec("5000"),
        }];

        let stub = calculate(&employee, &settings, None, &orders).unwrap();

        assert_eq!(
            stub.deduction_total(DeductionCategory::Garnishment),
            dec("5000.00")
        );
        assert!(stub.net_pay < Decimal::ZERO);
        assert_eq!(stub.warnings.len(), 1);
        assert_eq!(stub.warnings[0].code, "garnishments_exceed_net_pay");
    }

    /// PS-012: rate table must match the pay date's year
    #[test]
    fn test_rate_table_year_mismatch() {
        let employee = create_test_employee();
        let settings = create_test_settings(VacationPayoutMethod::Accrue);
        let table = create_test_table();

        let result = calculate_paystub(&PaystubInput {
            employee: &employee,
            pay_period_label: "Dec 18 - Dec 31",
            pay_date: date(2025, 1, 3),
            settings: &settings,
            rate_table: &table,
            vacation_rate_percent: None,
            garnishments: &[],
        });
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    /// PS-013: same inputs give the same paystub
    #[test]
    fn test_calculation_is_deterministic() {
        let employee = create_test_employee();
        let settings = create_test_settings(VacationPayoutMethod::Payout);

        let first = calculate(&employee, &settings, Some(dec("6")), &[]).unwrap();
        let second = calculate(&employee, &settings, Some(dec("6")), &[]).unwrap();
        assert_eq!(first, second);
    }
}
