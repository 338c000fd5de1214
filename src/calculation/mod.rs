//! Payroll calculation.
//!
//! This module folds attendance rows into per-employee totals, prices them
//! with the configured salary parameters and runs the whole computation over
//! the live stores. All arithmetic is exact decimal; rounding happens only
//! when a report is presented.

mod aggregation;
mod payroll;
mod salary;

pub use aggregation::{AttendanceTotals, aggregate_by_employee};
pub use payroll::{PayrollEngine, compute_salaries};
pub use salary::price_line;
