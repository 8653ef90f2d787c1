//! Config file discovery and layered loading.
//!
//! 1. Parse the embedded `defaults.toml`
//! 2. Merge `~/.solwin/config.toml` (user)
//! 3. Merge `{workspace}/.solwin/config.toml` (workspace)
//! 4. Merge an explicitly named file, if any
//! 5. Apply `SOLWIN_*` environment fallbacks for fields no file set
//! 6. Deserialize and validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Where to look for configuration files.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Project root holding `.solwin/config.toml`. Skipped when `None`.
    pub workspace_root: Option<PathBuf>,
    /// Directory used instead of `~/.solwin`.
    pub solwin_home: Option<PathBuf>,
    /// Extra file merged above the workspace layer. Must exist.
    pub explicit_file: Option<PathBuf>,
}

impl LoadOptions {
    /// Options with a workspace root.
    #[must_use]
    pub fn workspace(root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Use `dir` instead of `~/.solwin`.
    #[must_use]
    pub fn with_solwin_home(mut self, dir: impl Into<PathBuf>) -> Self {
        self.solwin_home = Some(dir.into());
        self
    }

    /// Merge `path` above the discovered files.
    #[must_use]
    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }
}

/// Load the layered configuration using the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a config file cannot be read or parsed, or
/// the merged configuration fails validation.
pub fn load(options: &LoadOptions) -> ConfigResult<ResolvedConfig> {
    load_with_env(options, &collect_env_vars())
}

/// Load the layered configuration against an explicit environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a config file cannot be read or parsed, or
/// the merged configuration fails validation.
pub fn load_with_env<S: ::std::hash::BuildHasher>(
    options: &LoadOptions,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    let user_dir = match &options.solwin_home {
        Some(dir) => dir.clone(),
        None => home_directory()?.join(".solwin"),
    };
    let mut layers = vec![(user_dir.join("config.toml"), ConfigLayer::User)];
    if let Some(root) = &options.workspace_root {
        layers.push((
            root.join(".solwin").join("config.toml"),
            ConfigLayer::Workspace,
        ));
    }

    for (path, layer) in layers {
        if let Some(overlay) = try_load_file(&path)? {
            deep_merge_tracking(&mut merged, &overlay, "", &layer, &mut field_sources);
            info!(path = %path.display(), %layer, "loaded config");
            loaded_files.push(path.display().to_string());
        }
    }

    if let Some(path) = &options.explicit_file {
        let overlay = read_file(path)?;
        let layer = ConfigLayer::Explicit(path.display().to_string());
        deep_merge_tracking(&mut merged, &overlay, "", &layer, &mut field_sources);
        info!(path = %path.display(), "loaded explicit config");
        loaded_files.push(path.display().to_string());
    }

    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load one file on its own, without layering or environment fallbacks.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = read_file(path)?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Candidate config paths in precedence order, lowest first.
#[must_use]
pub fn config_paths(options: &LoadOptions) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let user_dir = options
        .solwin_home
        .clone()
        .or_else(|| home_directory().ok().map(|h| h.join(".solwin")));
    if let Some(dir) = user_dir {
        paths.push(dir.join("config.toml"));
    }
    if let Some(root) = &options.workspace_root {
        paths.push(root.join(".solwin").join("config.toml"));
    }
    if let Some(path) = &options.explicit_file {
        paths.push(path.clone());
    }
    paths
}

/// Read a file, returning `None` if it does not exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    match read_file(path) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            debug!(path = %path.display(), "config file not found, skipping");
            Ok(None)
        },
        Err(e) => Err(e),
    }
}

fn read_file(path: &Path) -> ConfigResult<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    // Size is checked after the read so there is no stat/read race.
    let len = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if len > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {len} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
            ),
        });
    }

    toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}
