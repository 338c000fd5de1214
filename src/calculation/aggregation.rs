//! Attendance aggregation.
//!
//! This module folds attendance rows into per-employee totals: worked days,
//! late days, recorded hours, approved overtime and deduction hours.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

use crate::models::{Attendance, EmployeeId};

/// What one employee accumulated over a payroll window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceTotals {
    /// Rows with both check-in and check-out.
    pub worked_days: u32,
    /// Rows flagged late.
    pub late_days: u32,
    /// Sum of recorded hours; open rows contribute zero.
    pub total_hours: Decimal,
    /// Sum of approved overtime hours.
    pub overtime_hours: Decimal,
    /// Sum of deduction hours not waived by an approved late request.
    pub deduction_hours: Decimal,
}

impl AttendanceTotals {
    /// Adds one row.
    ///
    /// When `excused` is true the row's deduction hours are waived; the row
    /// still counts as a late day.
    ///
    /// # Examples
    ///
    /// ```
    /// use attendance_engine::calculation::AttendanceTotals;
    /// use attendance_engine::models::Attendance;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    /// let mut row = Attendance::new(1, 5, day, day.and_hms_opt(8, 30, 0).unwrap());
    /// row.check_in_time = Some(day.and_hms_opt(8, 30, 0).unwrap());
    /// row.is_late = true;
    /// row.deduction_hours = Decimal::ONE;
    ///
    /// let mut totals = AttendanceTotals::default();
    /// totals.add(&row, true);
    ///
    /// assert_eq!(totals.late_days, 1);
    /// assert_eq!(totals.deduction_hours, Decimal::ZERO);
    /// assert_eq!(totals.worked_days, 0);
    /// ```
    pub fn add(&mut self, row: &Attendance, excused: bool) {
        if row.is_completed() {
            self.worked_days += 1;
        }
        if row.is_late {
            self.late_days += 1;
        }
        self.total_hours += row.total_hours.unwrap_or(Decimal::ZERO);
        if row.is_overtime_approved {
            self.overtime_hours += row.approved_overtime_hours;
        }
        if !excused {
            self.deduction_hours += row.deduction_hours;
        }
    }
}

/// Groups rows by employee and totals each group.
///
/// `excused` holds the (employee, day) pairs whose deduction is waived.
pub fn aggregate_by_employee<'a>(
    rows: impl IntoIterator<Item = &'a Attendance>,
    excused: &HashSet<(EmployeeId, NaiveDate)>,
) -> BTreeMap<EmployeeId, AttendanceTotals> {
    let mut totals: BTreeMap<EmployeeId, AttendanceTotals> = BTreeMap::new();
    for row in rows {
        let waived = excused.contains(&(row.employee_id, row.work_date));
        totals.entry(row.employee_id).or_default().add(row, waived);
    }
    totals
}
