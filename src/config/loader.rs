//! Configuration loading functionality.
//!
//! This module provides the [`SettingsLoader`] type for loading system
//! settings from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::Employee;

use super::provider::SettingsStore;
use super::types::{EmployeesFile, SettingsFile};

/// Loads system settings from disk.
///
/// # File Format
///
/// ```text
/// settings:
///   - key: BASE_SALARY
///     value: "5000000"
///     data_type: Decimal
///     category: Salary
///     description: Default monthly base salary
///   - key: GEOFENCE_ENABLED
///     value: "true"
///     data_type: Boolean
///     is_active: false      # ignored by lookups
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::{SettingsLoader, SettingsProvider};
///
/// let store = SettingsLoader::load("./config/settings.yaml")?;
/// println!("Base salary: {:?}", store.get_value("BASE_SALARY"));
/// # Ok::<(), attendance_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsLoader;

impl SettingsLoader {
    /// Loads settings from the given YAML file.
    ///
    /// Returns `ConfigNotFound` when the file cannot be read and
    /// `ConfigParseError` when it is not a valid settings document.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<SettingsStore> {
        let file = Self::load_yaml::<SettingsFile>(path.as_ref())?;
        Ok(SettingsStore::from_settings(file.settings))
    }

    /// Parses a settings document held in memory.
    pub fn from_yaml_str(content: &str) -> EngineResult<SettingsStore> {
        let file: SettingsFile =
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        Ok(SettingsStore::from_settings(file.settings))
    }

    /// Loads employee master data from a YAML file with a top-level
    /// `employees` list.
    pub fn load_employees<P: AsRef<Path>>(path: P) -> EngineResult<Vec<Employee>> {
        let file = Self::load_yaml::<EmployeesFile>(path.as_ref())?;
        Ok(file.employees)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }
}
