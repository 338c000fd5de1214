//! Typed views over the settings used by the engine's components.
//!
//! Each view is resolved once per operation so a whole payroll run or a
//! whole check-in sees one consistent set of parameters.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use std::time::Duration;

use crate::error::{EngineError, EngineResult};
use crate::models::GeoPoint;

use super::provider::SettingsProvider;
use super::types::keys;

/// Photo extensions accepted as check-in/out evidence.
pub const ALLOWED_EVIDENCE_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

/// Salary parameters for a payroll run.
///
/// # Example
///
/// ```
/// use attendance_engine::config::{PayrollSettings, SettingsStore};
/// use rust_decimal::Decimal;
///
/// let store = SettingsStore::with_defaults();
/// let settings = PayrollSettings::resolve(&store).unwrap();
///
/// assert_eq!(settings.base_salary, Decimal::from(5_000_000));
/// assert_eq!(settings.work_days_per_month, Decimal::from(26));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayrollSettings {
    /// Monthly base salary.
    pub base_salary: Decimal,
    /// Multiplier for approved overtime hours.
    pub overtime_rate: Decimal,
    /// Hours in a standard day; divides the daily salary.
    pub standard_hours_per_day: Decimal,
    /// Paid days in a month; divides the base salary.
    pub work_days_per_month: Decimal,
}

impl PayrollSettings {
    /// Resolves every salary parameter, failing on the first unusable one.
    pub fn resolve(provider: &dyn SettingsProvider) -> EngineResult<Self> {
        let base_salary: Decimal = provider.get_typed(keys::BASE_SALARY, "5000000")?;
        let overtime_rate: Decimal = provider.get_typed(keys::OVERTIME_RATE, "1.5")?;
        let standard_hours_per_day: Decimal =
            provider.get_typed(keys::STANDARD_HOURS_PER_DAY, "8")?;
        let work_days_per_month: Decimal = provider.get_typed(keys::WORK_DAYS_PER_MONTH, "26")?;

        Ok(Self {
            base_salary,
            overtime_rate,
            standard_hours_per_day: positive(keys::STANDARD_HOURS_PER_DAY, standard_hours_per_day)?,
            work_days_per_month: positive(keys::WORK_DAYS_PER_MONTH, work_days_per_month)?,
        })
    }

    /// `base_salary / work_days_per_month`.
    pub fn daily_salary(&self) -> Decimal {
        self.base_salary / self.work_days_per_month
    }

    /// `daily_salary / standard_hours_per_day`.
    pub fn hourly_salary(&self) -> Decimal {
        self.daily_salary() / self.standard_hours_per_day
    }
}

fn positive(key: &str, value: Decimal) -> EngineResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(EngineError::InvalidSettingValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "positive decimal".to_string(),
        });
    }
    Ok(value)
}

/// Work-site boundary used for geofence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geofence {
    /// Centre of the work site.
    pub center: GeoPoint,
    /// Allowed distance from the centre, in metres.
    pub radius_m: Decimal,
}

/// Parameters for check-in and check-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendancePolicy {
    /// Check-ins strictly after this time of day are late.
    pub standard_check_in_time: NaiveTime,
    /// Largest accepted evidence upload, in bytes.
    pub max_evidence_bytes: usize,
    /// Accepted evidence extensions, lower-case with leading dot.
    pub allowed_extensions: Vec<String>,
    /// Upper bound on a reverse-geocoding lookup.
    pub geocoder_timeout: Duration,
    /// The enforced boundary, or `None` when geofencing is disabled.
    pub geofence: Option<Geofence>,
    /// Hours deducted for an unexcused late arrival.
    pub late_deduction_hours: Decimal,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            standard_check_in_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default(),
            max_evidence_bytes: 10 * 1024 * 1024,
            allowed_extensions: ALLOWED_EVIDENCE_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            geocoder_timeout: Duration::from_millis(3000),
            geofence: None,
            late_deduction_hours: Decimal::ZERO,
        }
    }
}

impl AttendancePolicy {
    /// Resolves the attendance parameters.
    pub fn resolve(provider: &dyn SettingsProvider) -> EngineResult<Self> {
        let standard_check_in_time: NaiveTime =
            provider.get_typed(keys::CHECK_IN_STANDARD_TIME, "08:00")?;
        let max_evidence_bytes: u64 = provider.get_typed(keys::MAX_EVIDENCE_BYTES, "10485760")?;
        let geocoder_timeout_ms: u64 = provider.get_typed(keys::GEOCODER_TIMEOUT_MS, "3000")?;
        let late_deduction_hours: Decimal =
            provider.get_typed(keys::LATE_DEDUCTION_HOURS, "0")?;
        if late_deduction_hours < Decimal::ZERO {
            return Err(EngineError::InvalidSettingValue {
                key: keys::LATE_DEDUCTION_HOURS.to_string(),
                value: late_deduction_hours.to_string(),
                expected: "non-negative decimal".to_string(),
            });
        }

        let enabled: bool = provider.get_typed(keys::GEOFENCE_ENABLED, "false")?;
        let geofence = if enabled {
            let latitude: Decimal = provider.get_typed(keys::OFFICE_LATITUDE, "10.7769")?;
            let longitude: Decimal = provider.get_typed(keys::OFFICE_LONGITUDE, "106.7009")?;
            let radius: Decimal = provider.get_typed(keys::GEOFENCE_RADIUS, "100")?;
            Some(Geofence {
                center: GeoPoint::new(latitude, longitude),
                radius_m: positive(keys::GEOFENCE_RADIUS, radius)?,
            })
        } else {
            None
        };

        Ok(Self {
            standard_check_in_time,
            max_evidence_bytes: usize::try_from(max_evidence_bytes).unwrap_or(usize::MAX),
            geocoder_timeout: Duration::from_millis(geocoder_timeout_ms),
            geofence,
            late_deduction_hours,
            ..Self::default()
        })
    }
}
