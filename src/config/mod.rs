//! Router configuration management for `docroute.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── routes     # [routes]
//! │   └── serve      # [serve]
//! ├── error          # ConfigError
//! ├── util           # Config file discovery
//! └── mod.rs         # RouterConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section     | Purpose                                            |
//! |-------------|----------------------------------------------------|
//! | `[routes]`  | Manifest location, fallback page, redirect limits  |
//! | `[serve]`   | Development session (interface, port, watching)    |
//!
//! A missing config file is not an error: every field has a default and the
//! project root becomes the current directory.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{RoutesConfig, ServeConfig};

use util::find_config_file;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, Commands};
use crate::log;
use crate::utils::normalize_path;

/// Root configuration structure representing docroute.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub routes: RoutesConfig,

    pub serve: ServeConfig,
}

impl RouterConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = path;
                config
            }
            None => {
                crate::debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    config_path: cwd.join(&cli.config),
                    root: cwd.clone(),
                    ..Self::default()
                }
            }
        };

        config.normalize_paths(&cwd, cli);
        config.apply_command_options(&cli.command);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Absolute path of the route manifest.
    pub fn manifest_path(&self) -> &Path {
        &self.routes.manifest
    }

    /// Check values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        self.routes.validate(&mut errors);
        self.serve.validate(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Resolve the manifest path. A `--manifest` flag is relative to cwd,
    /// the config value is relative to the project root.
    fn normalize_paths(&mut self, cwd: &Path, cli: &Cli) {
        self.root = normalize_path(&self.root);
        self.config_path = normalize_path(&self.config_path);

        let manifest = match cli.command.source().manifest {
            Some(ref manifest) => cwd.join(manifest),
            None => self.root.join(&self.routes.manifest),
        };
        self.routes.manifest = normalize_path(&manifest);
    }

    fn apply_command_options(&mut self, command: &Commands) {
        if let Commands::Serve {
            interface,
            port,
            watch,
            ..
        } = command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }
}

/// Parse a config snippet, failing the test on unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> RouterConfig {
    let (parsed, ignored) = RouterConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("docroute").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (config, ignored) =
            RouterConfig::parse_with_ignored("[routes]\ncache = true\n[theme]\ncolor = 1").unwrap();
        assert_eq!(config.routes, RoutesConfig::default());
        assert_eq!(ignored.len(), 2);
        assert!(ignored.iter().any(|f| f == "routes.cache"));
    }

    #[test]
    fn test_invalid_toml_type() {
        let err = RouterConfig::parse_with_ignored("[serve]\nport = \"high\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let config = test_parse_config(
            "[routes]\nmax_redirect_hops = 0\nnot_found = \"404.html\"\n[serve]\nport = 0",
        );
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_defaults_ok() {
        assert!(test_parse_config("").validate().is_ok());
    }

    #[test]
    fn test_manifest_relative_to_root() {
        let dir = TempDir::new().unwrap();
        let mut config = test_parse_config("[routes]\nmanifest = \"dist/routes.json\"");
        config.root = dir.path().to_path_buf();
        config.config_path = dir.path().join("docroute.toml");

        config.normalize_paths(Path::new("/elsewhere"), &cli(&["check"]));

        let root = normalize_path(dir.path());
        assert_eq!(config.manifest_path(), root.join("dist/routes.json"));
        assert_eq!(config.root, root);
    }

    #[test]
    fn test_cli_manifest_relative_to_cwd() {
        let dir = TempDir::new().unwrap();
        let mut config = test_parse_config("");
        config.root = PathBuf::from("/project");

        config.normalize_paths(dir.path(), &cli(&["check", "--manifest", "out.json"]));

        assert_eq!(
            config.manifest_path(),
            normalize_path(&dir.path().join("out.json"))
        );
    }

    #[test]
    fn test_serve_cli_overrides() {
        let mut config = test_parse_config("[serve]\nport = 9000\nwatch = true");
        let cli = cli(&["serve", "--port", "9100", "--watch", "false"]);

        config.apply_command_options(&cli.command);

        assert_eq!(config.serve.port, 9100);
        assert!(!config.serve.watch);
        assert_eq!(config.serve.interface, ServeConfig::default().interface);
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = RouterConfig::from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }
}
