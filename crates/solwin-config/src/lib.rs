//! Layered configuration for Solar Window services and tools.
//!
//! # Usage
//!
//! ```rust,no_run
//! use solwin_config::{Config, LoadOptions};
//!
//! let resolved = Config::load(&LoadOptions::workspace(".")).unwrap();
//! println!("serving on {}", resolved.config.server.bind);
//! ```
//!
//! # Precedence
//!
//! From highest to lowest:
//!
//! 1. **Explicit file** passed with `--config`
//! 2. **Workspace** (`{workspace}/.solwin/config.toml`)
//! 3. **User** (`~/.solwin/config.toml`)
//! 4. **Environment** (`SOLWIN_EIA_API_KEY`, `SOLWIN_MAPS_API_KEY`,
//!    `SOLWIN_LOG_LEVEL`, `SOLWIN_BIND`), only for fields no file set
//! 5. **Embedded defaults**
//!
//! This crate does not depend on the other solwin crates.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

/// Environment variable fallbacks.
pub mod env;
/// Configuration error types.
pub mod error;
/// File discovery and layered loading.
pub mod loader;
/// Layer merging and source tracking.
pub mod merge;
/// Annotated display.
pub mod show;
/// Configuration structs.
pub mod types;
/// Validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::LoadOptions;
pub use merge::{ConfigLayer, FieldSources};
pub use show::{ResolvedConfig, ShowFormat};
pub use types::*;

impl Config {
    /// Load with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the
    /// merged configuration fails validation.
    pub fn load(options: &LoadOptions) -> ConfigResult<ResolvedConfig> {
        loader::load(options)
    }

    /// Load a single file without layering.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or
    /// fails validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
