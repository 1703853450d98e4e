//! SQLite-backed settings store with change notifications.
//!
//! Uses `rusqlite` in synchronous mode behind a mutex; reads are
//! cheap point lookups, so callers on the async side use the store
//! directly. WAL mode is enabled for concurrent readers. Every
//! successful write is broadcast as a [`SettingChange`] so live
//! components (the request dispatcher in particular) can react to
//! hot updates without polling.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::broadcast;

use super::catalog::{SettingKind, SettingSpec, CATALOG, HELPER_NAMESPACE};
use super::errors::SettingsError;
use super::types::{SettingChange, SettingValue, SettingsSnapshot};

/// Capacity of the change-notification channel. Writes are rare
/// (operator edits a tuning value); a slow subscriber that lags past
/// this many events only misses intermediate values.
const CHANGE_CHANNEL_CAPACITY: usize = 32;

// ─── Store ──────────────────────────────────────────────────────────────────

/// Persistent store for named tuning options grouped by namespace.
pub struct SettingsStore {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<SettingChange>,
}

impl SettingsStore {
    /// Open (or create) the settings database at the given path and
    /// seed catalog defaults for any missing entry.
    ///
    /// Pass `":memory:"` for an in-memory store (tests).
    pub fn open(path: &str) -> Result<Self, SettingsError> {
        let conn = Connection::open(path)?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let store = Self {
            conn: Mutex::new(conn),
            changes,
        };
        store.create_tables()?;
        store.seed_defaults()?;
        Ok(store)
    }

    /// Create the settings table if it doesn't exist.
    fn create_tables(&self) -> Result<(), SettingsError> {
        let conn = self.lock_conn();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS settings (
                namespace TEXT NOT NULL,
                name TEXT NOT NULL,
                subgroup TEXT,
                kind TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (namespace, name)
            );
            ",
        )?;
        Ok(())
    }

    /// Insert every catalog entry that isn't already present, with its
    /// documented default. Existing rows (operator-tuned values) are
    /// left untouched.
    fn seed_defaults(&self) -> Result<(), SettingsError> {
        let conn = self.lock_conn();
        let mut seeded = 0u32;
        for spec in CATALOG {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO settings (namespace, name, subgroup, kind, value)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    HELPER_NAMESPACE,
                    spec.name,
                    spec.subgroup,
                    kind_label(spec.kind),
                    encode_value(&spec.default_value()),
                ],
            )?;
            seeded += inserted as u32;
        }
        if seeded > 0 {
            tracing::info!(seeded, namespace = HELPER_NAMESPACE, "seeded default settings");
        }
        Ok(())
    }

    // ─── Reads ──────────────────────────────────────────────────────────

    /// All settings of a namespace as an immutable snapshot.
    pub fn get_settings(&self, namespace: &str) -> Result<SettingsSnapshot, SettingsError> {
        let conn = self.lock_conn();
        let mut stmt =
            conn.prepare("SELECT name, kind, value FROM settings WHERE namespace = ?1")?;
        let rows = stmt.query_map(params![namespace], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut values = HashMap::new();
        for row in rows {
            let (name, kind, raw) = row?;
            let value = decode_value(&name, &kind, raw)?;
            values.insert(name, value);
        }
        Ok(SettingsSnapshot::new(values))
    }

    /// A single setting, if present.
    pub fn get(&self, namespace: &str, name: &str) -> Result<Option<SettingValue>, SettingsError> {
        let conn = self.lock_conn();
        let row = conn
            .query_row(
                "SELECT kind, value FROM settings WHERE namespace = ?1 AND name = ?2",
                params![namespace, name],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        match row {
            Some((kind, raw)) => Ok(Some(decode_value(name, &kind, raw)?)),
            None => Ok(None),
        }
    }

    // ─── Writes ─────────────────────────────────────────────────────────

    /// Upsert a setting and broadcast the change.
    ///
    /// For catalog entries the declared subgroup and kind are kept;
    /// unknown names are stored with a kind inferred from the value.
    pub fn set(
        &self,
        namespace: &str,
        name: &str,
        value: SettingValue,
    ) -> Result<(), SettingsError> {
        let spec = super::catalog::find(name);
        let subgroup = spec.and_then(|s: &SettingSpec| s.subgroup);
        let kind = spec.map(|s| s.kind).unwrap_or(match value {
            SettingValue::Text(_) => SettingKind::Text,
            SettingValue::Number(_) => SettingKind::Number,
        });

        {
            let conn = self.lock_conn();
            conn.execute(
                "INSERT INTO settings (namespace, name, subgroup, kind, value)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (namespace, name)
                 DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                params![namespace, name, subgroup, kind_label(kind), encode_value(&value)],
            )?;
        }

        tracing::debug!(namespace, name, "setting updated");

        // A send error only means nobody is subscribed right now.
        let _ = self.changes.send(SettingChange {
            namespace: namespace.to_string(),
            name: name.to_string(),
            value,
            changed_at: chrono::Utc::now().to_rfc3339(),
        });
        Ok(())
    }

    /// Subscribe to change notifications for all namespaces.
    pub fn subscribe(&self) -> broadcast::Receiver<SettingChange> {
        self.changes.subscribe()
    }

    fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned mutex means another thread panicked mid-statement;
        // the connection itself is still usable for new statements.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ─── Storage encoding ───────────────────────────────────────────────────────

fn kind_label(kind: SettingKind) -> &'static str {
    match kind {
        SettingKind::Text => "text",
        SettingKind::Number => "number",
    }
}

fn encode_value(value: &SettingValue) -> String {
    match value {
        SettingValue::Text(s) => s.clone(),
        SettingValue::Number(n) => n.to_string(),
    }
}

fn decode_value(name: &str, kind: &str, raw: String) -> Result<SettingValue, SettingsError> {
    match kind {
        "number" => raw
            .parse::<f64>()
            .map(SettingValue::Number)
            .map_err(|e| SettingsError::InvalidValue {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        _ => Ok(SettingValue::Text(raw)),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
