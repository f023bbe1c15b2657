//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--no-mouse`, `--log-file`)
//! 2. `--config <file>`
//! 3. `$TVT_CONFIG` environment variable (path to config file)
//! 4. Project-local `.tvt.toml` in the current working directory
//! 5. Global `<config_dir>/tvt/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Ask before removing a node and its subtree.
    pub confirm_delete: Option<bool>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// Demo child loader settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoaderConfig {
    /// Base latency of every load.
    pub delay_ms: Option<u64>,
    /// Upper bound of the per-node extra latency.
    pub jitter_ms: Option<u64>,
    /// Node ids whose loads always fail.
    pub fail_ids: Option<Vec<String>>,
}

/// Log file settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    pub file: Option<String>,
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark" or "light".
    pub scheme: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub loader: LoaderConfig,
    pub log: LogConfig,
    pub theme: ThemeConfig,
}

// ── Default constants ────────────────────────────────────────────────────────

pub const DEFAULT_DELAY_MS: u64 = 450;
pub const DEFAULT_JITTER_MS: u64 = 650;
pub const DEFAULT_LOG_FILE: &str = "tvt.log";
pub const DEFAULT_LOG_FILTER: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Candidate config file paths in priority order, excluding `--config`.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("TVT_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".tvt.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("tvt").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`: `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                confirm_delete: other.general.confirm_delete.or(self.general.confirm_delete),
                mouse: other.general.mouse.or(self.general.mouse),
            },
            loader: LoaderConfig {
                delay_ms: other.loader.delay_ms.or(self.loader.delay_ms),
                jitter_ms: other.loader.jitter_ms.or(self.loader.jitter_ms),
                fail_ids: other.loader.fail_ids.clone().or(self.loader.fail_ids),
            },
            log: LogConfig {
                file: other.log.file.clone().or(self.log.file),
                filter: other.log.filter.clone().or(self.log.filter),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Lowest priority first so later merges overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn confirm_delete(&self) -> bool {
        self.general.confirm_delete.unwrap_or(true)
    }

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    pub fn delay_ms(&self) -> u64 {
        self.loader.delay_ms.unwrap_or(DEFAULT_DELAY_MS)
    }

    pub fn jitter_ms(&self) -> u64 {
        self.loader.jitter_ms.unwrap_or(DEFAULT_JITTER_MS)
    }

    pub fn fail_ids(&self) -> &[String] {
        self.loader.fail_ids.as_deref().unwrap_or(&[])
    }

    pub fn log_file(&self) -> &str {
        self.log.file.as_deref().unwrap_or(DEFAULT_LOG_FILE)
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Theme scheme: "dark" or "light".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
