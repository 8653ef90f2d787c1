//! Environment variable fallbacks.
//!
//! Environment variables only fill fields that no config file set.

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "SOLWIN_EIA_API_KEY",
        field_path: "regional.eia_api_key",
    },
    EnvMapping {
        var_name: "SOLWIN_MAPS_API_KEY",
        field_path: "regional.maps_api_key",
    },
    EnvMapping {
        var_name: "SOLWIN_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "SOLWIN_BIND",
        field_path: "server.bind",
    },
];

/// Names of the environment variables consulted during loading.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_MAPPINGS.iter().map(|m| m.var_name).collect()
}

/// Apply fallbacks for fields not set by a config file. Empty values are
/// ignored. Returns how many were applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources.get(mapping.field_path).is_some_and(ConfigLayer::is_file) {
            continue;
        }
        let Some(val) = env_vars.get(mapping.var_name).filter(|v| !v.is_empty()) else {
            continue;
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        if set_string_field(merged, mapping.field_path, val) {
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Set `section.key` to a string, creating the section if needed.
fn set_string_field(root: &mut toml::Value, path: &str, val: &str) -> bool {
    let Some((section, key)) = path.split_once('.') else {
        return false;
    };
    let Some(root) = root.as_table_mut() else {
        return false;
    };
    let section = root
        .entry(section.to_owned())
        .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    match section.as_table_mut() {
        Some(table) => {
            table.insert(key.to_owned(), toml::Value::String(val.to_owned()));
            true
        },
        None => false,
    }
}

/// Snapshot of the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn base() -> toml::Value {
        toml::from_str("[server]\nbind = \"127.0.0.1:3000\"\n[logging]\nlevel = \"info\"\n").unwrap()
    }

    #[test]
    fn test_apply_env_fallbacks() {
        let mut merged = base();
        let mut sources = FieldSources::new();
        sources.insert("server.bind".into(), ConfigLayer::Defaults);
        let env = make_env(&[
            ("SOLWIN_EIA_API_KEY", "eia"),
            ("SOLWIN_BIND", "0.0.0.0:8080"),
        ]);

        assert_eq!(apply_env_fallbacks(&mut merged, &mut sources, &env), 2);
        assert_eq!(merged["regional"]["eia_api_key"].as_str(), Some("eia"));
        assert_eq!(merged["server"]["bind"].as_str(), Some("0.0.0.0:8080"));
        assert_eq!(
            sources.get("regional.eia_api_key"),
            Some(&ConfigLayer::Environment)
        );
    }

    #[test]
    fn test_env_fallback_skips_file_values() {
        let mut merged = base();
        let mut sources = FieldSources::new();
        sources.insert("logging.level".into(), ConfigLayer::User);
        let env = make_env(&[("SOLWIN_LOG_LEVEL", "trace")]);

        assert_eq!(apply_env_fallbacks(&mut merged, &mut sources, &env), 0);
        assert_eq!(merged["logging"]["level"].as_str(), Some("info"));
    }

    #[test]
    fn test_empty_env_value_ignored() {
        let mut merged = base();
        let mut sources = FieldSources::new();
        let env = make_env(&[("SOLWIN_MAPS_API_KEY", "")]);

        assert_eq!(apply_env_fallbacks(&mut merged, &mut sources, &env), 0);
        assert!(merged.get("regional").is_none());
    }
}
