//! `solwin config`.

use anyhow::{Result, anyhow};
use solwin_config::{LoadOptions, ResolvedConfig, ShowFormat, env, loader};

/// Print the resolved configuration with source annotations.
pub(crate) fn show_config(
    resolved: &ResolvedConfig,
    format: &str,
    section: Option<&str>,
) -> Result<()> {
    let show_format = match format {
        "json" => ShowFormat::Json,
        "toml" => ShowFormat::Toml,
        other => return Err(anyhow!("unsupported format '{other}'; expected toml or json")),
    };

    let output = resolved
        .show(show_format, section)
        .map_err(|e| anyhow!("failed to format config: {e}"))?;
    println!("{output}");
    Ok(())
}

/// Print every config path that is checked, and the env fallbacks.
pub(crate) fn show_paths(options: &LoadOptions) {
    println!("Configuration files checked (in precedence order):\n");
    for (i, path) in loader::config_paths(options).iter().enumerate() {
        let status = if path.exists() { "found" } else { "not found" };
        println!("  {}. {}  [{status}]", i.saturating_add(1), path.display());
    }

    println!("\nEnvironment variable fallbacks:");
    for name in env::env_var_names() {
        println!("  {name}");
    }
}
