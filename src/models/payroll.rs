//! Payroll result models.
//!
//! This module contains the [`PayrollLine`] produced per employee by the
//! payroll engine and the [`PayrollReport`] wrapping a full export.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DepartmentId, EmployeeId};
use crate::error::{EngineError, EngineResult};

/// An inclusive range of workdays.
///
/// # Example
///
/// ```
/// use attendance_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let june = DateRange::new(
///     NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
/// )
/// .unwrap();
///
/// assert!(june.contains(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()));
/// assert!(!june.contains(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive).
    pub from: NaiveDate,
    /// Last day (inclusive).
    pub to: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting one that ends before it starts.
    pub fn new(from: NaiveDate, to: NaiveDate) -> EngineResult<Self> {
        if to < from {
            return Err(EngineError::validation(
                "to",
                format!("end date {} is before start date {}", to, from),
            ));
        }
        Ok(Self { from, to })
    }

    /// Checks if a given date falls within this range (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }
}

/// Which rows a payroll run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollQuery {
    /// The workday window.
    pub range: DateRange,
    /// Restrict to a single employee.
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    /// Restrict to one department.
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
}

/// Salary breakdown for one employee over one payroll window.
///
/// All amounts are unrounded; see [`PayrollLine::rounded`] for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollLine {
    /// The employee.
    pub employee_id: EmployeeId,
    /// Printable employee code, e.g. `NV0005`.
    pub employee_code: String,
    /// Display name used for ordering.
    pub full_name: String,
    /// Department name or `N/A`.
    pub department_name: String,
    /// Days with both check-in and check-out.
    pub worked_days: u32,
    /// Days flagged late.
    pub late_days: u32,
    /// Sum of recorded hours.
    pub total_hours: Decimal,
    /// Sum of approved overtime hours.
    pub overtime_hours: Decimal,
    /// Sum of deduction hours still in force.
    pub deduction_hours: Decimal,
    /// `daily_salary * worked_days`.
    pub base_salary_component: Decimal,
    /// `hourly_salary * overtime_rate * overtime_hours`.
    pub overtime_salary_component: Decimal,
    /// `hourly_salary * deduction_hours`.
    pub deduction_amount: Decimal,
    /// Base plus overtime minus deduction.
    pub total_salary: Decimal,
}

impl PayrollLine {
    /// Returns a copy with every monetary amount rounded to `dp` places.
    ///
    /// Hours are left untouched.
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            base_salary_component: self.base_salary_component.round_dp(dp),
            overtime_salary_component: self.overtime_salary_component.round_dp(dp),
            deduction_amount: self.deduction_amount.round_dp(dp),
            total_salary: self.total_salary.round_dp(dp),
            ..self.clone()
        }
    }
}

/// A payroll export: the lines plus the totals printed under them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReport {
    /// The window the report covers.
    pub range: DateRange,
    /// When the report was generated.
    pub generated_at: NaiveDateTime,
    /// Number of employees in the report.
    pub employee_count: usize,
    /// Sum of every line's unrounded total salary.
    pub grand_total: Decimal,
    /// Per-employee lines, ordered by display name.
    pub lines: Vec<PayrollLine>,
}

impl PayrollReport {
    /// Wraps computed lines into a report.
    pub fn new(range: DateRange, generated_at: NaiveDateTime, lines: Vec<PayrollLine>) -> Self {
        let grand_total = lines.iter().map(|l| l.total_salary).sum();
        Self {
            range,
            generated_at,
            employee_count: lines.len(),
            grand_total,
            lines,
        }
    }

    /// Returns the report with amounts rounded for presentation.
    ///
    /// The grand total is rounded from the unrounded sum, not re-summed from
    /// rounded lines.
    pub fn rounded(&self, dp: u32) -> Self {
        Self {
            grand_total: self.grand_total.round_dp(dp),
            lines: self.lines.iter().map(|l| l.rounded(dp)).collect(),
            ..self.clone()
        }
    }

    /// Suggested file name for the export, e.g. `Payroll_20240601_20240630_20240701093000`.
    pub fn file_stem(&self) -> String {
        format!(
            "Payroll_{}_{}_{}",
            self.range.from.format("%Y%m%d"),
            self.range.to.format("%Y%m%d"),
            self.generated_at.format("%Y%m%d%H%M%S")
        )
    }
}
