//! Performance benchmarks for the Payroll Engine.
//!
//! This benchmark suite measures:
//! - Single paystub calculation
//! - Pay run preview throughput at increasing employee counts
//! - Preview through the HTTP API for a 100 employee tenant
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::calculation::{PaystubInput, calculate_paystub};
use payroll_engine::config::ConfigLoader;
use payroll_engine::models::{
    AccrualMethod, BankAccount, CompanySettings, Compensation, Employee, EmployeeProfile,
    PayFrequency, PayrollInfo, TimeOffPolicy, VacationPayoutMethod, YtdTotals,
};
use payroll_engine::payroll::{InMemoryPayrollStore, PayRunRequest, PayrollStore, preview_pay_run};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const PROVINCES: [&str; 6] = ["ON", "BC", "AB", "MB", "NS", "SK"];

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/canada").expect("Failed to load config")
}

fn pay_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 19).unwrap()
}

fn create_settings() -> CompanySettings {
    CompanySettings {
        legal_name: "Maple Widgets Inc.".to_string(),
        business_number: "123456789RP0001".to_string(),
        province: "ON".to_string(),
        pay_frequency: PayFrequency::BiWeekly,
        vacation_payout_method: VacationPayoutMethod::Accrue,
        earning_codes: vec![],
        deduction_codes: vec![],
        garnishment_configurations: vec![],
        time_off_policies: vec![TimeOffPolicy {
            id: "vac4".to_string(),
            name: "Vacation 4%".to_string(),
            accrual_method: AccrualMethod::PerPayPeriod,
            accrual_rate: Decimal::new(308, 2),
            carryover_limit: None,
            is_vacation_policy: true,
            vacation_pay_percent: Some(Decimal::new(4, 0)),
        }],
    }
}

/// Creates an employee with a salary that varies with the index.
fn create_employee(index: usize) -> Employee {
    let mut time_off_balances = BTreeMap::new();
    time_off_balances.insert("vac4".to_string(), Decimal::ZERO);

    Employee {
        id: format!("emp_{:05}", index),
        hire_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        profiles: vec![EmployeeProfile {
            effective_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            first_name: "Bench".to_string(),
            last_name: format!("Employee{}", index),
            job_title: "Analyst".to_string(),
            province_of_employment: PROVINCES[index % PROVINCES.len()].to_string(),
            pay_frequency: PayFrequency::BiWeekly,
            compensation: Compensation::Salary {
                annual_amount: Decimal::from(40_000 + (index as i64 % 50) * 2_000),
            },
        }],
        payroll: Some(PayrollInfo {
            sin: "046454286".to_string(),
            federal_claim_amount: Decimal::from(15_705),
            provincial_claim_amount: Decimal::from(12_000),
        }),
        bank_accounts: vec![BankAccount {
            institution_number: "004".to_string(),
            transit_number: "12345".to_string(),
            account_number: "1234567".to_string(),
            allocation_percent: Decimal::ONE_HUNDRED,
        }],
        garnishments: vec![],
        recurring_earnings: vec![],
        recurring_deductions: vec![],
        time_off_balances,
        ytd: YtdTotals::default(),
        ytd_history: vec![],
    }
}

/// Benchmark: one employee's gross-to-net.
fn bench_single_paystub(c: &mut Criterion) {
    let config = load_config();
    let rate_table = config.get_rate_table(2024).unwrap();
    let settings = create_settings();
    let employee = create_employee(0);

    c.bench_function("single_paystub", |b| {
        b.iter(|| {
            let paystub = calculate_paystub(&PaystubInput {
                employee: black_box(&employee),
                pay_period_label: "Jan 6 - Jan 19",
                pay_date: pay_date(),
                settings: &settings,
                rate_table,
                vacation_rate_percent: Some(Decimal::new(4, 0)),
                garnishments: &[],
            });
            black_box(paystub)
        })
    });
}

/// Benchmark: preview throughput as the run grows.
fn bench_preview_scaling(c: &mut Criterion) {
    let config = load_config();
    let settings = create_settings();

    let mut group = c.benchmark_group("preview_pay_run");

    for employee_count in [1usize, 10, 100, 1000].iter() {
        let request = PayRunRequest {
            tenant_id: "bench".to_string(),
            pay_period_label: "Jan 6 - Jan 19".to_string(),
            pay_date: pay_date(),
            employees: (0..*employee_count).map(create_employee).collect(),
        };

        group.throughput(Throughput::Elements(*employee_count as u64));
        group.bench_with_input(
            BenchmarkId::new("employees", employee_count),
            employee_count,
            |b, _| {
                b.iter(|| {
                    let paystubs = preview_pay_run(&request, &settings, &config, |progress| {
                        black_box(progress);
                    });
                    black_box(paystubs)
                })
            },
        );
    }

    group.finish();
}

/// Benchmark: preview through the HTTP API.
fn bench_preview_http(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = Arc::new(InMemoryPayrollStore::new());
    store.save_company_settings("bench", create_settings()).unwrap();
    for index in 0..100 {
        store.save_employee("bench", create_employee(index)).unwrap();
    }
    let router = create_router(AppState::new(load_config(), store));
    let body = serde_json::json!({
        "pay_period_label": "Jan 6 - Jan 19",
        "pay_date": "2024-01-19"
    })
    .to_string();

    let mut group = c.benchmark_group("http");
    group.throughput(Throughput::Elements(100));
    group.bench_function("preview_100_employees", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/tenants/bench/pay-runs/preview")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_single_paystub,
    bench_preview_scaling,
    bench_preview_http,
);
criterion_main!(benches);
