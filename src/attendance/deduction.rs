//! Deduction hours recorded on an attendance row at check-in.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::config::AttendancePolicy;

/// Derives the hours to deduct for a check-in.
pub trait DeductionPolicy: Send + Sync {
    /// Hours deducted for a check-in at `check_in_time`.
    fn deduction_hours(
        &self,
        check_in_time: NaiveDateTime,
        is_late: bool,
        policy: &AttendancePolicy,
    ) -> Decimal;
}

/// Deducts the configured `LATE_DEDUCTION_HOURS` for any late arrival.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatLateDeduction;

impl DeductionPolicy for FlatLateDeduction {
    fn deduction_hours(
        &self,
        _check_in_time: NaiveDateTime,
        is_late: bool,
        policy: &AttendancePolicy,
    ) -> Decimal {
        if is_late {
            policy.late_deduction_hours
        } else {
            Decimal::ZERO
        }
    }
}
