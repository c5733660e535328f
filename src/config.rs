//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. The `--config` path given on the command line
//! 2. `$POPCHECK_CONFIG` (environment variable)
//! 3. `~/.config/popcheck/config.toml` (Linux/macOS)
//!    `%APPDATA%\popcheck\config.toml` (Windows)
//! 4. Built-in defaults
//!
//! Command-line flags always win over values read here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default POP3 port.
pub const DEFAULT_PORT: u16 = 110;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mailbox connection defaults.
    pub server: ServerConfig,
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Display settings for the review screen.
    pub display: DisplayConfig,
    /// Performance tuning.
    pub performance: PerformanceConfig,
}

/// Mailbox connection defaults.
///
/// There is no password field; it comes from the command line or a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// POP3 host name.
    pub host: Option<String>,
    /// POP3 port.
    pub port: u16,
    /// Mailbox user name.
    pub user: Option<String>,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Color theme: "dark" or "light".
    pub theme: String,
}

/// Performance tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Size of the socket receive buffer in bytes (default: 8192).
    pub recv_buffer_size: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            user: None,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: crate::pop3::session::DEFAULT_RECV_BUFFER,
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration from `explicit` or the standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config(explicit: Option<&Path>) -> Config {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config_file_path(),
    };
    if let Some(path) = path {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("POPCHECK_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("popcheck").join("config.toml"))
}

/// Return the cache directory used for the log file.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("popcheck")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("popcheck.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 110);
        assert!(cfg.server.host.is_none());
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.display.theme, "dark");
        assert_eq!(cfg.performance.recv_buffer_size, 8192);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[server]
host = "pop.example.com"
user = "alice"

[display]
theme = "light"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.server.host.as_deref(), Some("pop.example.com"));
        assert_eq!(cfg.server.user.as_deref(), Some("alice"));
        assert_eq!(cfg.server.port, DEFAULT_PORT);
        assert_eq!(cfg.display.theme, "light");
        assert_eq!(cfg.performance.recv_buffer_size, 8192);
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 1110\n").expect("write config");
        let cfg = load_config(Some(&path));
        assert_eq!(cfg.server.port, 1110);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").expect("write config");
        let cfg = load_config(Some(&path));
        assert_eq!(cfg.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_log_file_under_cache_dir() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/popcheck-test"));
        assert_eq!(
            log_file_path(&cfg),
            PathBuf::from("/tmp/popcheck-test/popcheck.log")
        );
    }
}
