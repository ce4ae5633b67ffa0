use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    profiled_env_opt(profile, key)
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub intervals: IntervalPolicy,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ROTA_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("ROTA_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            storage: StorageConfig::from_env_profiled(p),
            intervals: IntervalPolicy::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:     {}:{} (cors: {})", self.server.host, self.server.port, self.server.cors_origin);
        tracing::info!("  storage:    backend={}, data_dir={}", self.storage.backend, self.storage.data_dir.display());
        tracing::info!(
            "  intervals:  enforce_on_update={}, revalidate_tasks_on_narrowing={}, allow_task_overlap={}",
            self.intervals.enforce_on_update,
            self.intervals.revalidate_tasks_on_narrowing,
            self.intervals.allow_task_overlap,
        );
    }

    /// JSON view for the `config` CLI subcommand.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port, "cors_origin": self.server.cors_origin },
            "storage": { "backend": self.storage.backend, "data_dir": self.storage.data_dir },
            "intervals": self.intervals,
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 3000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "memory" or "file"
    pub backend: String,
    pub data_dir: PathBuf,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            backend: profiled_env_or(p, "STORAGE_BACKEND", "memory"),
            data_dir: PathBuf::from(profiled_env_or(p, "DATA_DIR", "data")),
        }
    }
}

// ── Interval rules ────────────────────────────────────────────

/// Which temporal rules apply beyond the always-on creation checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPolicy {
    /// Re-run task containment and overlap checks on updates, not just creation.
    /// A schedule's own `startTime < endTime` is always checked.
    pub enforce_on_update: bool,
    /// Refuse a schedule update whose new bounds would strand existing tasks.
    pub revalidate_tasks_on_narrowing: bool,
    /// Permit tasks of the same schedule to overlap each other.
    pub allow_task_overlap: bool,
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        Self {
            enforce_on_update: true,
            revalidate_tasks_on_narrowing: false,
            allow_task_overlap: true,
        }
    }
}

impl IntervalPolicy {
    fn from_env_profiled(p: &str) -> Self {
        let d = Self::default();
        Self {
            enforce_on_update: profiled_env_bool(p, "ENFORCE_INTERVAL_ON_UPDATE", d.enforce_on_update),
            revalidate_tasks_on_narrowing: profiled_env_bool(
                p,
                "REVALIDATE_TASKS_ON_NARROWING",
                d.revalidate_tasks_on_narrowing,
            ),
            allow_task_overlap: profiled_env_bool(p, "ALLOW_TASK_OVERLAP", d.allow_task_overlap),
        }
    }
}
