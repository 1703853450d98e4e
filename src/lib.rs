//! ollama-bridge: settings-driven Ollama client adapter for chat
//! applications.
//!
//! The crate wires a live settings store to a local Ollama runtime:
//! named tuning options (sampling controls, endpoint address, model,
//! keep-alive) are persisted per namespace, decoded into typed
//! parameters, merged with per-call overrides, and shipped as one
//! canonical request. The endpoint address is hot-reloadable; the
//! dispatcher swaps its client handle when that setting changes,
//! without disturbing in-flight calls.

pub mod llm;
pub mod settings;

pub use llm::{CallOptions, ConversationTurn, GenerationOptions, LlmError, LlmHelper, Originator};
pub use settings::{SettingValue, SettingsError, SettingsStore, HELPER_NAMESPACE};

/// Return the platform-standard data directory for the bridge.
///
/// - macOS: `~/Library/Application Support/ollama-bridge/`
/// - Windows: `{FOLDERID_RoamingAppData}\ollama-bridge\`
/// - Linux: `$XDG_DATA_HOME/ollama-bridge/` (fallback `~/.local/share/...`)
///
/// Falls back to `~/.ollama-bridge/` only if none of the above can be
/// resolved.
pub fn data_dir() -> std::path::PathBuf {
    if let Some(dir) = dirs::data_dir() {
        return dir.join("ollama-bridge");
    }
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".ollama-bridge")
}

/// Initialize the tracing subscriber for an embedding application.
///
/// Writes structured logs to `bridge.log` in the data directory:
/// 1. Rotates existing logs (bridge.log → bridge.log.1 → .2 → .3).
/// 2. Opens a fresh bridge.log with a line-flushing writer so entries
///    survive a crash.
/// 3. Logs a startup banner with the data directory path.
pub fn init_tracing() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = data_dir();
    let _ = std::fs::create_dir_all(&log_dir);

    let log_path = log_dir.join("bridge.log");

    // Rotate: bridge.log.2 → .3, .1 → .2, bridge.log → .1
    rotate_log_file(&log_path, 3);

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("failed to open bridge.log");

    let flushing_writer = FlushingWriter::new(log_file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ollama_bridge=info,warn"));

    fmt::fmt()
        .with_env_filter(filter)
        .with_writer(flushing_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    // Startup banner, makes it easy to find the right log file
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %log_dir.display(),
        log_file = %log_path.display(),
        pid = std::process::id(),
        "=== ollama-bridge starting ==="
    );
}

/// Rotate log files: `bridge.log` → `bridge.log.1` → `.2` → … → `.{keep}`.
///
/// Oldest file beyond `keep` is deleted. Missing files in the chain are
/// skipped.
fn rotate_log_file(base_path: &std::path::Path, keep: u32) {
    // Delete the oldest
    let oldest = format!("{}.{keep}", base_path.display());
    let _ = std::fs::remove_file(&oldest);

    // Shift: .{n-1} → .{n}
    for i in (1..keep).rev() {
        let from = format!("{}.{i}", base_path.display());
        let to = format!("{}.{}", base_path.display(), i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    // Current → .1
    if base_path.exists() {
        let to = format!("{}.1", base_path.display());
        let _ = std::fs::rename(base_path, &to);
    }
}

/// A writer that wraps `std::fs::File` and flushes after every write.
///
/// `tracing-subscriber` buffers log output internally. Without explicit
/// flushing, log entries may sit in OS buffers and be lost on crash.
/// This wrapper ensures each log line is on disk immediately. The cost
/// is negligible at this crate's log volume.
#[derive(Clone)]
struct FlushingWriter {
    file: std::sync::Arc<std::sync::Mutex<std::fs::File>>,
}

impl FlushingWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: std::sync::Arc::new(std::sync::Mutex::new(file)),
        }
    }
}

impl std::io::Write for FlushingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        let n = std::io::Write::write(&mut *f, buf)?;
        std::io::Write::flush(&mut *f)?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        std::io::Write::flush(&mut *f)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingWriter {
    type Writer = FlushingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
