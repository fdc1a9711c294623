//! Payroll Engine for Canadian employers
//!
//! This crate calculates gross-to-net pay (CPP, EI, federal and provincial
//! income tax, vacation pay, garnishments), runs and commits multi-employee
//! pay runs against year-to-date ledgers, aggregates CRA remittances, and
//! produces T4 slips and Records of Employment.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod payroll;
