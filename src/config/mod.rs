//! Configuration loading and management for the attendance engine.
//!
//! Settings are plain key/value strings with a declared type. They are read
//! through the [`SettingsProvider`] trait and resolved into typed views
//! ([`PayrollSettings`], [`AttendancePolicy`]) at the start of an operation.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::{PayrollSettings, SettingsLoader};
//!
//! let store = SettingsLoader::load("./config/settings.yaml").unwrap();
//! let payroll = PayrollSettings::resolve(&store).unwrap();
//! println!("Hourly salary: {}", payroll.hourly_salary());
//! ```

mod loader;
mod policy;
mod provider;
mod types;

pub use loader::SettingsLoader;
pub use policy::{ALLOWED_EVIDENCE_EXTENSIONS, AttendancePolicy, Geofence, PayrollSettings};
pub use provider::{SettingValue, SettingsProvider, SettingsStore};
pub use types::{
    EmployeesFile, SettingDataType, SettingsFile, SystemSetting, default_settings, keys,
};
