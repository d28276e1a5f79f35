//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.deepmock/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DeepmockConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub mockgen: MockgenConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Prompt default for the search root.
    pub search_dir: Option<String>,
    /// Prompt default for the output root.
    pub output_dir: Option<String>,
    pub accept_all: Option<bool>,
    pub skip_path_prompt: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MockgenConfig {
    pub binary: Option<String>,
    pub package: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SEARCH_DIR: &str = ".";
pub const DEFAULT_OUTPUT_DIR: &str = "mocks";
pub const DEFAULT_MOCKGEN_BINARY: &str = "mockgen";
pub const DEFAULT_LOG_FILE: &str = "deepmock.log";

const CONFIG_DIR: &str = ".deepmock";

// ============================================================================
// CLI overrides
// ============================================================================

/// Values taken from command-line flags. `None`/`false` = not specified.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub search_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub accept_all: bool,
    pub skip_path_prompt: bool,
    pub mockgen_binary: Option<String>,
    pub verbose: bool,
}

// ============================================================================
// Resolved Config (concrete values where a default exists)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Supplied by CLI or env; `None` means the operator is prompted.
    pub search_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Prefilled prompt defaults.
    pub search_dir_default: String,
    pub output_dir_default: String,
    pub accept_all: bool,
    pub skip_path_prompt: bool,
    pub mockgen_binary: String,
    pub mockgen_package: Option<String>,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.deepmock`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_DIR))
}

/// Returns the path to `~/.deepmock/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.deepmock/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `DeepmockConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<DeepmockConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(DeepmockConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(DeepmockConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<DeepmockConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: DeepmockConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# deepmock configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# search_dir = "."                   # prompt default when -S is not given
# output_dir = "mocks"               # prompt default when -O is not given
# accept_all = false                 # same as -A
# skip_path_prompt = false           # same as -P

# [mockgen]
# binary = "mockgen"                 # or set DEEPMOCK_MOCKGEN
# package = "mocks"                  # default: destination directory name

# [logging]
# file = "deepmock.log"              # relative to ~/.deepmock/
# level = "info"                     # "error", "warn", "info", "debug", "trace"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &DeepmockConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`] with an injectable environment lookup.
pub fn resolve_with_env(
    config: &DeepmockConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Roots: CLI → env. The config file only provides prompt defaults.
    let search_dir = cli
        .search_dir
        .clone()
        .or_else(|| env("DEEPMOCK_SEARCH_DIR").map(PathBuf::from));
    let output_dir = cli
        .output_dir
        .clone()
        .or_else(|| env("DEEPMOCK_OUTPUT_DIR").map(PathBuf::from));

    let search_dir_default = config
        .general
        .search_dir
        .clone()
        .unwrap_or_else(|| DEFAULT_SEARCH_DIR.to_string());
    let output_dir_default = config
        .general
        .output_dir
        .clone()
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

    // mockgen binary: CLI → env → config → default
    let mockgen_binary = cli
        .mockgen_binary
        .clone()
        .or_else(|| env("DEEPMOCK_MOCKGEN"))
        .or_else(|| config.mockgen.binary.clone())
        .unwrap_or_else(|| DEFAULT_MOCKGEN_BINARY.to_string());

    let log_file = config
        .logging
        .file
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
    let log_file = match config_dir() {
        Some(dir) => dir.join(log_file),
        None => PathBuf::from(log_file),
    };

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        config
            .logging
            .level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info)
    };

    ResolvedConfig {
        search_dir,
        output_dir,
        search_dir_default,
        output_dir_default,
        accept_all: cli.accept_all || config.general.accept_all.unwrap_or(false),
        skip_path_prompt: cli.skip_path_prompt
            || config.general.skip_path_prompt.unwrap_or(false),
        mockgen_binary,
        mockgen_package: config.mockgen.package.clone(),
        log_file,
        log_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&DeepmockConfig::default(), &CliOverrides::default(), no_env);
        assert_eq!(resolved.search_dir, None);
        assert_eq!(resolved.output_dir, None);
        assert_eq!(resolved.search_dir_default, DEFAULT_SEARCH_DIR);
        assert_eq!(resolved.output_dir_default, DEFAULT_OUTPUT_DIR);
        assert_eq!(resolved.mockgen_binary, DEFAULT_MOCKGEN_BINARY);
        assert!(!resolved.accept_all);
        assert!(!resolved.skip_path_prompt);
        assert_eq!(resolved.log_level, LevelFilter::Info);
        assert!(resolved.log_file.ends_with(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_config_values_become_prompt_defaults_only() {
        let config = DeepmockConfig {
            general: GeneralConfig {
                search_dir: Some("./internal".to_string()),
                output_dir: Some("./internal/mocks".to_string()),
                accept_all: Some(true),
                skip_path_prompt: None,
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.search_dir, None);
        assert_eq!(resolved.search_dir_default, "./internal");
        assert_eq!(resolved.output_dir_default, "./internal/mocks");
        assert!(resolved.accept_all);
        assert!(!resolved.skip_path_prompt);
    }

    #[test]
    fn test_env_fills_roots_and_binary() {
        let env = |key: &str| match key {
            "DEEPMOCK_SEARCH_DIR" => Some("/src".to_string()),
            "DEEPMOCK_MOCKGEN" => Some("/opt/bin/mockgen".to_string()),
            _ => None,
        };
        let resolved = resolve_with_env(&DeepmockConfig::default(), &CliOverrides::default(), env);
        assert_eq!(resolved.search_dir, Some(PathBuf::from("/src")));
        assert_eq!(resolved.output_dir, None);
        assert_eq!(resolved.mockgen_binary, "/opt/bin/mockgen");
    }

    #[test]
    fn test_cli_wins_over_env_and_config() {
        let config = DeepmockConfig {
            mockgen: MockgenConfig {
                binary: Some("config-mockgen".to_string()),
                package: Some("fakes".to_string()),
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            search_dir: Some(PathBuf::from("cli-src")),
            mockgen_binary: Some("cli-mockgen".to_string()),
            verbose: true,
            ..Default::default()
        };
        let env = |key: &str| match key {
            "DEEPMOCK_SEARCH_DIR" => Some("env-src".to_string()),
            "DEEPMOCK_MOCKGEN" => Some("env-mockgen".to_string()),
            _ => None,
        };
        let resolved = resolve_with_env(&config, &cli, env);
        assert_eq!(resolved.search_dir, Some(PathBuf::from("cli-src")));
        assert_eq!(resolved.mockgen_binary, "cli-mockgen");
        assert_eq!(resolved.mockgen_package.as_deref(), Some("fakes"));
        assert_eq!(resolved.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[mockgen]
package = "fakes"

[logging]
level = "debug"
"#;
        let config: DeepmockConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.mockgen.package.as_deref(), Some("fakes"));
        assert!(config.mockgen.binary.is_none());
        assert!(config.general.search_dir.is_none());

        let resolved = resolve_with_env(&config, &CliOverrides::default(), no_env);
        assert_eq!(resolved.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_load_config_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general\nsearch_dir = 1").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("config parse error"));
    }
}
