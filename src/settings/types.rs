//! Shared types for the settings store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Storage representation of a single tuning value.
///
/// Settings are either free text or numeric; the catalog fixes which.
/// Coercion to the runtime's expected types (lists, integers) happens
/// in the decode step, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Text(String),
    Number(f64),
}

impl SettingValue {
    /// The value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            SettingValue::Number(_) => None,
        }
    }

    /// The value as a number. Numeric text parses; anything else is
    /// `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SettingValue::Number(n) => Some(*n),
            SettingValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Whether this value counts as "not specified": empty text.
    pub fn is_unset(&self) -> bool {
        matches!(self, SettingValue::Text(s) if s.is_empty())
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        SettingValue::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        SettingValue::Text(s)
    }
}

impl From<f64> for SettingValue {
    fn from(n: f64) -> Self {
        SettingValue::Number(n)
    }
}

/// Change notification emitted by the store after a successful write.
#[derive(Debug, Clone, Serialize)]
pub struct SettingChange {
    pub namespace: String,
    pub name: String,
    pub value: SettingValue,
    /// RFC 3339 timestamp of the write.
    pub changed_at: String,
}

/// Immutable name-to-value view of one namespace, read fresh from the
/// store per call. Never written back.
#[derive(Debug, Clone, Default)]
pub struct SettingsSnapshot {
    values: HashMap<String, SettingValue>,
}

impl SettingsSnapshot {
    pub fn new(values: HashMap<String, SettingValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&SettingValue> {
        self.values.get(name)
    }

    /// Text value for `name`; empty text reads as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .filter(|v| !v.is_unset())
            .and_then(SettingValue::as_text)
    }

    /// Numeric value for `name`; empty or unparseable reads as absent.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(SettingValue::as_number)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
