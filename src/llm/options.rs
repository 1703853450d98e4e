//! Generation options: decode from stored settings, merge with
//! per-call overrides.
//!
//! Stored settings are loosely typed (text or number rows); the wire
//! wants concrete types. [`GenerationOptions::from_snapshot`] is the
//! single decode step between the two, and
//! [`GenerationOptions::merged_over`] combines a per-call override set
//! with the namespace-wide defaults. Both are pure: no I/O, inputs are
//! never mutated.

use serde::{Deserialize, Serialize};

use crate::settings::{keys, SettingsSnapshot};

// ─── GenerationOptions ───────────────────────────────────────────────────────

/// Sampling and generation controls for one runtime call.
///
/// Every field is optional; `None` means "not specified" and the field
/// is omitted from the wire body, letting the runtime apply its own
/// built-in default. Built fresh per call, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat_eta: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirostat_tau: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_last_n: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tfs_z: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_p: Option<f32>,
}

impl GenerationOptions {
    /// Decode the sampling controls from a namespace snapshot.
    ///
    /// Only `options`-subgroup keys are read; the connection keys
    /// (`api_url`, `model`, `keep_alive`) never reach the wire options
    /// object. Empty or unparseable stored values decode to `None`.
    pub fn from_snapshot(snapshot: &SettingsSnapshot) -> Self {
        Self {
            mirostat: snapshot.number(keys::MIROSTAT).map(|n| n as u8),
            mirostat_eta: snapshot.number(keys::MIROSTAT_ETA).map(|n| n as f32),
            mirostat_tau: snapshot.number(keys::MIROSTAT_TAU).map(|n| n as f32),
            num_ctx: snapshot.number(keys::NUM_CTX).map(|n| n as u32),
            repeat_last_n: snapshot.number(keys::REPEAT_LAST_N).map(|n| n as i32),
            repeat_penalty: snapshot.number(keys::REPEAT_PENALTY).map(|n| n as f32),
            temperature: snapshot.number(keys::TEMPERATURE).map(|n| n as f32),
            seed: snapshot.number(keys::SEED).map(|n| n as i64),
            stop: snapshot.text(keys::STOP).and_then(split_stop_sequences),
            tfs_z: snapshot.number(keys::TFS_Z).map(|n| n as f32),
            num_predict: snapshot.number(keys::NUM_PREDICT).map(|n| n as i32),
            top_k: snapshot.number(keys::TOP_K).map(|n| n as u32),
            top_p: snapshot.number(keys::TOP_P).map(|n| n as f32),
            min_p: snapshot.number(keys::MIN_P).map(|n| n as f32),
        }
    }

    /// Merge these per-call overrides over namespace-wide defaults.
    ///
    /// Field-wise precedence: a specified override wins, an unspecified
    /// one falls back to the default, and a field absent from both
    /// stays absent. Neither input is touched.
    pub fn merged_over(&self, defaults: &GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            mirostat: self.mirostat.or(defaults.mirostat),
            mirostat_eta: self.mirostat_eta.or(defaults.mirostat_eta),
            mirostat_tau: self.mirostat_tau.or(defaults.mirostat_tau),
            num_ctx: self.num_ctx.or(defaults.num_ctx),
            repeat_last_n: self.repeat_last_n.or(defaults.repeat_last_n),
            repeat_penalty: self.repeat_penalty.or(defaults.repeat_penalty),
            temperature: self.temperature.or(defaults.temperature),
            seed: self.seed.or(defaults.seed),
            stop: self.stop.clone().or_else(|| defaults.stop.clone()),
            tfs_z: self.tfs_z.or(defaults.tfs_z),
            num_predict: self.num_predict.or(defaults.num_predict),
            top_k: self.top_k.or(defaults.top_k),
            top_p: self.top_p.or(defaults.top_p),
            min_p: self.min_p.or(defaults.min_p),
        }
    }
}

/// Split a comma-delimited stop-sequence setting into an ordered list
/// of non-empty trimmed tokens. An input with no usable tokens yields
/// `None` so the key is omitted entirely.
pub fn split_stop_sequences(raw: &str) -> Option<Vec<String>> {
    let tokens: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens)
    }
}

// ─── CallOptions ─────────────────────────────────────────────────────────────

/// Per-call overrides supplied by the caller of a dispatcher method.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Keep-alive hint for this call; `None` or empty falls back to
    /// the stored `keep_alive` setting.
    pub keep_alive: Option<String>,
    /// Sampling overrides; unspecified fields fall back to the stored
    /// namespace defaults.
    pub options: GenerationOptions,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SettingValue, SettingsSnapshot};
    use std::collections::HashMap;

    fn snapshot(pairs: &[(&str, SettingValue)]) -> SettingsSnapshot {
        SettingsSnapshot::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_split_stop_sequences_basic() {
        assert_eq!(
            split_stop_sequences("a,b,c"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_split_stop_sequences_trims_and_drops_empty_tokens() {
        assert_eq!(
            split_stop_sequences(" User: , ,Bot:"),
            Some(vec!["User:".to_string(), "Bot:".to_string()])
        );
        assert_eq!(split_stop_sequences(""), None);
        assert_eq!(split_stop_sequences(" , ,"), None);
    }

    #[test]
    fn test_from_snapshot_decodes_typed_fields() {
        let snap = snapshot(&[
            (keys::TEMPERATURE, SettingValue::Number(0.8)),
            (keys::NUM_CTX, SettingValue::Number(2048.0)),
            (keys::TOP_K, SettingValue::Number(40.0)),
            (keys::STOP, SettingValue::Text("AI assistant:".into())),
        ]);
        let opts = GenerationOptions::from_snapshot(&snap);
        assert_eq!(opts.temperature, Some(0.8));
        assert_eq!(opts.num_ctx, Some(2048));
        assert_eq!(opts.top_k, Some(40));
        assert_eq!(opts.stop, Some(vec!["AI assistant:".to_string()]));
        assert_eq!(opts.top_p, None, "missing keys stay absent");
    }

    #[test]
    fn test_from_snapshot_empty_stop_omits_key() {
        let snap = snapshot(&[(keys::STOP, SettingValue::Text(String::new()))]);
        let opts = GenerationOptions::from_snapshot(&snap);
        assert_eq!(opts.stop, None);
    }

    #[test]
    fn test_from_snapshot_ignores_connection_keys() {
        let snap = snapshot(&[
            (keys::API_URL, SettingValue::Text("http://x:1".into())),
            (keys::MODEL, SettingValue::Text("m".into())),
            (keys::KEEP_ALIVE, SettingValue::Text("5m".into())),
        ]);
        let opts = GenerationOptions::from_snapshot(&snap);
        assert_eq!(opts, GenerationOptions::default());
    }

    #[test]
    fn test_merge_unspecified_override_falls_back() {
        // An empty stored override decodes to None, so the default wins.
        let override_snap = snapshot(&[(keys::TEMPERATURE, SettingValue::Text(String::new()))]);
        let overrides = GenerationOptions::from_snapshot(&override_snap);
        let defaults = GenerationOptions {
            temperature: Some(0.8),
            ..Default::default()
        };
        let merged = overrides.merged_over(&defaults);
        assert_eq!(merged.temperature, Some(0.8));
    }

    #[test]
    fn test_merge_specified_override_wins() {
        let overrides = GenerationOptions {
            temperature: Some(0.2),
            ..Default::default()
        };
        let defaults = GenerationOptions {
            temperature: Some(0.8),
            top_p: Some(0.9),
            ..Default::default()
        };
        let merged = overrides.merged_over(&defaults);
        assert_eq!(merged.temperature, Some(0.2));
        assert_eq!(merged.top_p, Some(0.9), "defaults-only keys are retained");
    }

    #[test]
    fn test_merge_absent_from_both_stays_absent() {
        let merged =
            GenerationOptions::default().merged_over(&GenerationOptions::default());
        assert_eq!(merged.seed, None);
        let json = serde_json::to_value(&merged).unwrap();
        assert_eq!(json, serde_json::json!({}), "absent fields stay off the wire");
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let overrides = GenerationOptions {
            top_k: Some(10),
            ..Default::default()
        };
        let defaults = GenerationOptions {
            top_k: Some(40),
            stop: Some(vec!["x".into()]),
            ..Default::default()
        };
        let before_overrides = overrides.clone();
        let before_defaults = defaults.clone();
        let _ = overrides.merged_over(&defaults);
        assert_eq!(overrides, before_overrides);
        assert_eq!(defaults, before_defaults);
    }

    #[test]
    fn test_stop_list_survives_merge_in_order() {
        let defaults = GenerationOptions {
            stop: Some(vec!["User:".into(), "Bot:".into()]),
            ..Default::default()
        };
        let merged = GenerationOptions::default().merged_over(&defaults);
        assert_eq!(
            merged.stop,
            Some(vec!["User:".to_string(), "Bot:".to_string()])
        );
    }

    #[test]
    fn test_wire_serialization_omits_none_fields() {
        let opts = GenerationOptions {
            temperature: Some(0.8),
            num_ctx: Some(2048),
            ..Default::default()
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"temperature": 0.8, "num_ctx": 2048})
        );
    }
}
