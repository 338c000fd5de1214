//! Salary pricing.
//!
//! Converts an employee's [`AttendanceTotals`] into a [`PayrollLine`]:
//!
//! ```text
//! daily_salary   = base_salary / work_days_per_month
//! hourly_salary  = daily_salary / standard_hours_per_day
//! base           = daily_salary * worked_days
//! overtime       = hourly_salary * overtime_rate * overtime_hours
//! deduction      = hourly_salary * deduction_hours
//! total          = base + overtime - deduction
//! ```
//!
//! Every step is exact decimal arithmetic. Nothing is rounded here.

use rust_decimal::Decimal;

use crate::config::PayrollSettings;
use crate::models::{Employee, EmployeeId, PayrollLine};

use super::aggregation::AttendanceTotals;

/// Prices one employee's totals.
///
/// `employee` supplies the display name and department; when the employee
/// is unknown the code doubles as the name and the department is `N/A`.
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::{AttendanceTotals, price_line};
/// use attendance_engine::config::{PayrollSettings, SettingsStore};
/// use rust_decimal::Decimal;
///
/// let settings = PayrollSettings::resolve(&SettingsStore::with_defaults()).unwrap();
/// let totals = AttendanceTotals {
///     worked_days: 26,
///     ..AttendanceTotals::default()
/// };
///
/// let line = price_line(5, None, &totals, &settings);
/// assert_eq!(line.employee_code, "NV0005");
/// assert_eq!(line.total_salary.round_dp(2), Decimal::from(5_000_000));
/// ```
pub fn price_line(
    employee_id: EmployeeId,
    employee: Option<&Employee>,
    totals: &AttendanceTotals,
    settings: &PayrollSettings,
) -> PayrollLine {
    let daily_salary = settings.daily_salary();
    let hourly_salary = settings.hourly_salary();

    let base_salary_component = daily_salary * Decimal::from(totals.worked_days);
    let overtime_salary_component = hourly_salary * settings.overtime_rate * totals.overtime_hours;
    let deduction_amount = hourly_salary * totals.deduction_hours;
    let total_salary = base_salary_component + overtime_salary_component - deduction_amount;

    let employee_code = Employee::code_for(employee_id);
    let (full_name, department_name) = match employee {
        Some(e) => (e.full_name.clone(), e.department_name().to_string()),
        None => (employee_code.clone(), "N/A".to_string()),
    };

    PayrollLine {
        employee_id,
        employee_code,
        full_name,
        department_name,
        worked_days: totals.worked_days,
        late_days: totals.late_days,
        total_hours: totals.total_hours,
        overtime_hours: totals.overtime_hours,
        deduction_hours: totals.deduction_hours,
        base_salary_component,
        overtime_salary_component,
        deduction_amount,
        total_salary,
    }
}
