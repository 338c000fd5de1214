//! Settings lookup.
//!
//! [`SettingsProvider`] is the read-only seam the engine resolves its numeric
//! and string parameters through; [`SettingsStore`] is the in-process
//! implementation backed by the YAML file or the seeded defaults.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};

use super::types::{SystemSetting, default_settings};

/// Resolves named configuration values.
pub trait SettingsProvider: Send + Sync {
    /// Returns the raw value of an active setting.
    fn get_value(&self, key: &str) -> Option<String>;

    /// Returns the raw value, or `default` when the setting is absent.
    fn get_or(&self, key: &str, default: &str) -> String {
        self.get_value(key).unwrap_or_else(|| default.to_string())
    }
}

/// A type a setting's string value can be interpreted as.
pub trait SettingValue: Sized {
    /// Name of the type used in error messages.
    const EXPECTED: &'static str;

    /// Parses the raw value.
    fn parse_setting(raw: &str) -> Option<Self>;
}

impl SettingValue for Decimal {
    const EXPECTED: &'static str = "decimal";

    fn parse_setting(raw: &str) -> Option<Self> {
        Decimal::from_str(raw.trim()).ok()
    }
}

impl SettingValue for u32 {
    const EXPECTED: &'static str = "number";

    fn parse_setting(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl SettingValue for u64 {
    const EXPECTED: &'static str = "number";

    fn parse_setting(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }
}

impl SettingValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn parse_setting(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        }
    }
}

impl SettingValue for String {
    const EXPECTED: &'static str = "string";

    fn parse_setting(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl SettingValue for NaiveTime {
    const EXPECTED: &'static str = "time of day (HH:MM)";

    fn parse_setting(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .ok()
    }
}

impl dyn SettingsProvider + '_ {
    /// Resolves a setting and interprets it as `T`.
    ///
    /// The default is used when the key is absent; a value that does not
    /// parse is an error, never silently replaced by the default.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::config::{SettingsProvider, SettingsStore};
    /// use rust_decimal::Decimal;
    ///
    /// let store = SettingsStore::with_defaults();
    /// let provider: &dyn SettingsProvider = &store;
    /// let rate: Decimal = provider.get_typed("OVERTIME_RATE", "1").unwrap();
    /// assert_eq!(rate, Decimal::new(15, 1));
    /// ```
    pub fn get_typed<T: SettingValue>(&self, key: &str, default: &str) -> EngineResult<T> {
        let raw = self.get_or(key, default);
        T::parse_setting(&raw).ok_or_else(|| EngineError::InvalidSettingValue {
            key: key.to_string(),
            value: raw,
            expected: T::EXPECTED.to_string(),
        })
    }
}

/// In-process settings backed by a key/value map.
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    settings: HashMap<String, SystemSetting>,
}

impl SettingsStore {
    /// Creates a store holding the given settings.
    pub fn from_settings(settings: Vec<SystemSetting>) -> Self {
        Self {
            settings: settings.into_iter().map(|s| (s.key.clone(), s)).collect(),
        }
    }

    /// Creates a store holding the seeded defaults.
    pub fn with_defaults() -> Self {
        Self::from_settings(default_settings())
    }

    /// Returns the store with `key` set to `value`, keeping any existing metadata.
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.settings
            .entry(key.to_string())
            .and_modify(|s| {
                s.value = value.to_string();
                s.is_active = true;
            })
            .or_insert_with(|| SystemSetting {
                key: key.to_string(),
                value: value.to_string(),
                data_type: super::SettingDataType::String,
                category: None,
                description: None,
                is_active: true,
            });
        self
    }

    /// Returns every setting, ordered by category then key.
    pub fn all(&self) -> Vec<&SystemSetting> {
        let mut settings: Vec<_> = self.settings.values().collect();
        settings.sort_by(|a, b| (&a.category, &a.key).cmp(&(&b.category, &b.key)));
        settings
    }
}

impl SettingsProvider for SettingsStore {
    fn get_value(&self, key: &str) -> Option<String> {
        self.settings
            .get(key)
            .filter(|s| s.is_active)
            .map(|s| s.value.clone())
    }
}
