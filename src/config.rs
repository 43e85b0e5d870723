//! Configuration management for logos-format.
//!
//! This module provides the [`Config`] struct which controls the wrapper
//! (never clang-format's own style; that stays in `.clang-format`).
//! Configuration can be loaded from:
//! - TOML files (`logos-format.toml`)
//! - The `LOGOS_FORMAT_CLANG_FORMAT` environment variable
//! - CLI arguments (which override everything else)
//!
//! Config files are auto-discovered by searching from the filesystem root
//! down to the current directory, after the user's home directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::formatter::DEFAULT_FORMATTER;

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["logos-format.toml"];

/// Environment variable naming the formatter executable
pub const FORMATTER_ENV_VAR: &str = "LOGOS_FORMAT_CLANG_FORMAT";

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    // Fallback for Windows
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

fn default_clang_format() -> PathBuf {
    PathBuf::from(DEFAULT_FORMATTER)
}

/// Main configuration struct for logos-format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Formatter executable, a path or a name looked up on `PATH`
    #[serde(default = "default_clang_format")]
    pub clang_format: PathBuf,

    /// Keep the temporary workspace after the run (default: false)
    #[serde(default)]
    pub save_temps: bool,

    /// Log what the wrapper is doing (default: false)
    #[serde(default)]
    pub verbose: bool,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    pub clang_format: Option<PathBuf>,
    pub save_temps: Option<bool>,
    pub verbose: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            clang_format: default_clang_format(),
            save_temps: false,
            verbose: false,
        }
    }
}

impl PartialConfig {
    /// Read one TOML config file
    fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse '{}'", path.display()))
    }
}

impl Config {
    /// Validate configuration values
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.clang_format.as_os_str().is_empty() {
            return Some("clang_format must not be empty".to_string());
        }
        None
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = &partial.clang_format {
            self.clang_format.clone_from(v);
        }
        if let Some(v) = partial.save_temps {
            self.save_temps = v;
        }
        if let Some(v) = partial.verbose {
            self.verbose = v;
        }
    }

    /// Override the formatter from an environment variable value, if non-empty
    pub fn apply_env_formatter(&mut self, value: Option<&std::ffi::OsStr>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.clang_format = PathBuf::from(value);
        }
    }

    /// Discover config files for a working directory
    ///
    /// Returns the home directory config first (lowest priority), then configs
    /// from the root down to `start_dir`.
    #[must_use]
    pub fn discover_config_files(start_dir: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let mut ancestors: Vec<&Path> = start_dir.ancestors().collect();
        // Reverse so we go from root to current (less specific to more specific)
        ancestors.reverse();

        for ancestor in ancestors {
            for config_name in CONFIG_FILE_NAMES {
                let config_path = ancestor.join(config_name);
                if config_path.is_file() && !config_files.contains(&config_path) {
                    config_files.push(config_path);
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Unreadable or malformed files are skipped; one message per skipped
    /// file is returned alongside the config so the caller can report it
    /// once logging is up.
    #[must_use]
    pub fn from_discovered_files(start_dir: &Path) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut problems = Vec::new();
        for path in &Self::discover_config_files(start_dir) {
            match PartialConfig::from_toml_file(path) {
                Ok(partial) => config.apply_partial(&partial),
                Err(e) => problems.push(format!("{e:#}")),
            }
        }
        (config, problems)
    }

    /// Discovered config for `start_dir` with the environment applied
    #[must_use]
    pub fn load(start_dir: &Path) -> (Self, Vec<String>) {
        let (mut config, problems) = Self::from_discovered_files(start_dir);
        config.apply_env_formatter(std::env::var_os(FORMATTER_ENV_VAR).as_deref());
        (config, problems)
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.clang_format, PathBuf::from("clang-format"));
        assert!(!config.save_temps);
        assert!(!config.verbose);
        assert!(config.validate().is_none());
    }

    #[test]
    fn test_config_apply_partial() {
        let mut base = Config::default();
        let partial = PartialConfig {
            save_temps: Some(true),
            ..Default::default()
        };
        base.apply_partial(&partial);
        assert!(base.save_temps);
        // Other fields should remain at defaults
        assert!(!base.verbose);
        assert_eq!(base.clang_format, PathBuf::from("clang-format"));
    }

    #[test]
    fn test_config_apply_partial_preserves_unset() {
        let mut base = Config {
            verbose: true,
            ..Default::default()
        };
        let partial = PartialConfig {
            clang_format: Some(PathBuf::from("/opt/llvm/bin/clang-format")),
            ..Default::default()
        };
        base.apply_partial(&partial);
        assert!(base.verbose);
        assert_eq!(
            base.clang_format,
            PathBuf::from("/opt/llvm/bin/clang-format")
        );
    }

    #[test]
    fn test_partial_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logos-format.toml");
        std::fs::write(
            &path,
            "clang_format = \"clang-format-18\"\nsave_temps = true\n",
        )
        .unwrap();
        let partial = PartialConfig::from_toml_file(&path).unwrap();
        assert_eq!(partial.clang_format, Some(PathBuf::from("clang-format-18")));
        assert_eq!(partial.save_temps, Some(true));
        assert_eq!(partial.verbose, None);
    }

    #[test]
    fn test_partial_from_toml_file_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logos-format.toml");
        std::fs::write(&path, "indent = 4\n").unwrap();
        assert!(PartialConfig::from_toml_file(&path).is_err());
    }

    #[test]
    fn test_discovered_files_merge_closest_last() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("tweak").join("src");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            root.path().join("logos-format.toml"),
            "clang_format = \"outer\"\nverbose = true\n",
        )
        .unwrap();
        std::fs::write(
            root.path().join("tweak").join("logos-format.toml"),
            "clang_format = \"inner\"\n",
        )
        .unwrap();

        let files = Config::discover_config_files(&nested);
        let outer = files
            .iter()
            .position(|p| p == &root.path().join("logos-format.toml"))
            .unwrap();
        let inner = files
            .iter()
            .position(|p| p == &root.path().join("tweak").join("logos-format.toml"))
            .unwrap();
        assert!(outer < inner);

        let (config, problems) = Config::from_discovered_files(&nested);
        assert_eq!(config.clang_format, PathBuf::from("inner"));
        assert!(config.verbose);
        assert!(problems.is_empty());
    }

    #[test]
    fn test_malformed_discovered_file_reported() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("tweak");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("logos-format.toml"), "verbose = \"yes").unwrap();
        std::fs::write(nested.join("logos-format.toml"), "save_temps = true\n").unwrap();

        let (config, problems) = Config::from_discovered_files(&nested);
        assert_eq!(config.clang_format, Config::default().clang_format);
        assert!(!config.verbose);
        // The good file still applies
        assert!(config.save_temps);
        let reported: Vec<_> = problems
            .iter()
            .filter(|p| p.contains("Failed to parse"))
            .collect();
        assert_eq!(reported.len(), 1);
        assert!(reported[0].contains(&root.path().join("logos-format.toml").display().to_string()));
    }

    #[test]
    fn test_env_formatter_override() {
        let mut config = Config::default();
        config.apply_env_formatter(Some(OsStr::new("")));
        assert_eq!(config.clang_format, PathBuf::from("clang-format"));
        config.apply_env_formatter(None);
        assert_eq!(config.clang_format, PathBuf::from("clang-format"));
        config.apply_env_formatter(Some(OsStr::new("/usr/local/bin/clang-format")));
        assert_eq!(
            config.clang_format,
            PathBuf::from("/usr/local/bin/clang-format")
        );
    }

    #[test]
    fn test_validate_empty_program() {
        let config = Config {
            clang_format: PathBuf::new(),
            ..Default::default()
        };
        assert!(config.validate().unwrap().contains("clang_format"));
    }
}
