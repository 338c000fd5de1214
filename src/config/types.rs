//! Configuration types for the attendance engine.
//!
//! This module contains the strongly-typed setting records that are
//! deserialized from the YAML settings file, and the well-known keys.

use serde::{Deserialize, Serialize};

use crate::models::Employee;

/// Well-known setting keys.
pub mod keys {
    /// Monthly base salary.
    pub const BASE_SALARY: &str = "BASE_SALARY";
    /// Multiplier applied to the hourly salary for approved overtime.
    pub const OVERTIME_RATE: &str = "OVERTIME_RATE";
    /// Hours in a standard workday.
    pub const STANDARD_HOURS_PER_DAY: &str = "STANDARD_HOURS_PER_DAY";
    /// Paid workdays in a month.
    pub const WORK_DAYS_PER_MONTH: &str = "WORK_DAYS_PER_MONTH";
    /// Hours deducted for a late arrival.
    pub const LATE_DEDUCTION_HOURS: &str = "LATE_DEDUCTION_HOURS";
    /// Check-ins after this time of day are late.
    pub const CHECK_IN_STANDARD_TIME: &str = "CHECK_IN_STANDARD_TIME";
    /// Whether the geofence is enforced.
    pub const GEOFENCE_ENABLED: &str = "GEOFENCE_ENABLED";
    /// Geofence radius in metres.
    pub const GEOFENCE_RADIUS: &str = "GEOFENCE_RADIUS";
    /// Latitude of the work site.
    pub const OFFICE_LATITUDE: &str = "OFFICE_LATITUDE";
    /// Longitude of the work site.
    pub const OFFICE_LONGITUDE: &str = "OFFICE_LONGITUDE";
    /// Upper bound on a reverse-geocoding lookup.
    pub const GEOCODER_TIMEOUT_MS: &str = "GEOCODER_TIMEOUT_MS";
    /// Largest accepted photo upload.
    pub const MAX_EVIDENCE_BYTES: &str = "MAX_EVIDENCE_BYTES";
}

/// Declared interpretation of a setting's string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingDataType {
    /// Exact base-10 number.
    Decimal,
    /// Whole number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// Free text (including times of day).
    String,
}

/// A single system setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSetting {
    /// Lookup key, e.g. `BASE_SALARY`.
    pub key: String,
    /// Raw value.
    pub value: String,
    /// How the value is meant to be read.
    pub data_type: SettingDataType,
    /// Grouping shown on the settings page.
    #[serde(default)]
    pub category: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Inactive settings are ignored by lookups.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl SystemSetting {
    /// Creates an active setting.
    pub fn new(
        key: &str,
        value: &str,
        data_type: SettingDataType,
        category: &str,
        description: &str,
    ) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            data_type,
            category: Some(category.to_string()),
            description: Some(description.to_string()),
            is_active: true,
        }
    }
}

/// Settings file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsFile {
    /// Every setting in the file.
    pub settings: Vec<SystemSetting>,
}

/// Employee master data file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeesFile {
    /// Every employee in the file.
    pub employees: Vec<Employee>,
}

/// The settings seeded into a fresh installation.
pub fn default_settings() -> Vec<SystemSetting> {
    use SettingDataType::*;

    vec![
        SystemSetting::new(keys::BASE_SALARY, "5000000", Decimal, "Salary", "Default monthly base salary"),
        SystemSetting::new(keys::OVERTIME_RATE, "1.5", Decimal, "Salary", "Overtime pay multiplier"),
        SystemSetting::new(keys::STANDARD_HOURS_PER_DAY, "8", Decimal, "Salary", "Standard working hours per day"),
        SystemSetting::new(keys::WORK_DAYS_PER_MONTH, "26", Number, "Salary", "Working days per month"),
        SystemSetting::new(keys::LATE_DEDUCTION_HOURS, "0", Decimal, "Salary", "Hours deducted for a late arrival"),
        SystemSetting::new(keys::CHECK_IN_STANDARD_TIME, "08:00", String, "Attendance", "Standard check-in time, later is late"),
        SystemSetting::new(keys::GEOFENCE_ENABLED, "false", Boolean, "Attendance", "Enable location checks"),
        SystemSetting::new(keys::GEOFENCE_RADIUS, "100", Number, "Attendance", "Allowed radius in metres"),
        SystemSetting::new(keys::OFFICE_LATITUDE, "10.7769", Decimal, "Attendance", "Office latitude"),
        SystemSetting::new(keys::OFFICE_LONGITUDE, "106.7009", Decimal, "Attendance", "Office longitude"),
        SystemSetting::new(keys::GEOCODER_TIMEOUT_MS, "3000", Number, "Attendance", "Reverse geocoding timeout"),
        SystemSetting::new(keys::MAX_EVIDENCE_BYTES, "10485760", Number, "Attendance", "Largest accepted photo"),
    ]
}
