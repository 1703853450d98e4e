//! Settings catalog for the Ollama helper namespace.
//!
//! The catalog is the fixed, enumerated set of tuning options this
//! adapter recognizes: their names, kinds, subgroups, and documented
//! defaults. The store seeds every entry on first open so a fresh
//! deployment starts with a complete, working configuration.

use super::types::SettingValue;

/// Namespace under which all helper settings are stored.
pub const HELPER_NAMESPACE: &str = "ollama_helper";

/// Subgroup for sampling/generation controls. Keys in this subgroup
/// feed the per-call options object; keys outside it (endpoint, model,
/// keep-alive) are resolved separately and never merged.
pub const OPTIONS_SUBGROUP: &str = "options";

/// Setting names, kept as constants so call sites can't drift from the
/// catalog.
pub mod keys {
    pub const API_URL: &str = "api_url";
    pub const MODEL: &str = "model";
    pub const KEEP_ALIVE: &str = "keep_alive";
    pub const MIROSTAT: &str = "mirostat";
    pub const MIROSTAT_ETA: &str = "mirostat_eta";
    pub const MIROSTAT_TAU: &str = "mirostat_tau";
    pub const NUM_CTX: &str = "num_ctx";
    pub const REPEAT_LAST_N: &str = "repeat_last_n";
    pub const REPEAT_PENALTY: &str = "repeat_penalty";
    pub const TEMPERATURE: &str = "temperature";
    pub const SEED: &str = "seed";
    pub const STOP: &str = "stop";
    pub const TFS_Z: &str = "tfs_z";
    pub const NUM_PREDICT: &str = "num_predict";
    pub const TOP_K: &str = "top_k";
    pub const TOP_P: &str = "top_p";
    pub const MIN_P: &str = "min_p";
}

/// Value kind of a catalog entry. Determines the coercion rules the
/// decode step applies to the stored representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Text,
    Number,
}

/// One entry in the settings catalog.
#[derive(Debug, Clone, Copy)]
pub struct SettingSpec {
    pub name: &'static str,
    pub subgroup: Option<&'static str>,
    pub kind: SettingKind,
    pub default_text: &'static str,
    pub default_number: f64,
}

impl SettingSpec {
    const fn text(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            subgroup: None,
            kind: SettingKind::Text,
            default_text: default,
            default_number: 0.0,
        }
    }

    const fn option_text(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            subgroup: Some(OPTIONS_SUBGROUP),
            kind: SettingKind::Text,
            default_text: default,
            default_number: 0.0,
        }
    }

    const fn option_number(name: &'static str, default: f64) -> Self {
        Self {
            name,
            subgroup: Some(OPTIONS_SUBGROUP),
            kind: SettingKind::Number,
            default_text: "",
            default_number: default,
        }
    }

    /// The default value for this entry, in storage representation.
    pub fn default_value(&self) -> SettingValue {
        match self.kind {
            SettingKind::Text => SettingValue::Text(self.default_text.to_string()),
            SettingKind::Number => SettingValue::Number(self.default_number),
        }
    }
}

/// The complete helper settings catalog with documented defaults.
pub const CATALOG: &[SettingSpec] = &[
    SettingSpec::text(keys::API_URL, "http://localhost:11434"),
    SettingSpec::text(keys::MODEL, "llama3.2"),
    SettingSpec::text(keys::KEEP_ALIVE, "5m"),
    SettingSpec::option_number(keys::MIROSTAT, 0.0),
    SettingSpec::option_number(keys::MIROSTAT_ETA, 0.1),
    SettingSpec::option_number(keys::MIROSTAT_TAU, 5.0),
    SettingSpec::option_number(keys::NUM_CTX, 2048.0),
    SettingSpec::option_number(keys::REPEAT_LAST_N, 64.0),
    SettingSpec::option_number(keys::REPEAT_PENALTY, 1.1),
    SettingSpec::option_number(keys::TEMPERATURE, 0.8),
    SettingSpec::option_number(keys::SEED, 0.0),
    SettingSpec::option_text(keys::STOP, "AI assistant:"),
    SettingSpec::option_number(keys::TFS_Z, 1.0),
    SettingSpec::option_number(keys::NUM_PREDICT, 20.0),
    SettingSpec::option_number(keys::TOP_K, 40.0),
    SettingSpec::option_number(keys::TOP_P, 0.9),
    SettingSpec::option_number(keys::MIN_P, 0.0),
];

/// Look up a catalog entry by name.
pub fn find(name: &str) -> Option<&'static SettingSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}
