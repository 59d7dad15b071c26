//! Configuration file loading, local overlay merging, and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// Name of the main configuration file in a project root.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Name of the optional per-machine overlay, merged over `kiln.toml`.
pub const LOCAL_CONFIG_FILE: &str = "kiln.local.toml";

/// Loads and validates the configuration from a project directory.
///
/// Reads `<project_dir>/kiln.toml` and, if present, merges
/// `<project_dir>/kiln.local.toml` over it before deserializing. Local
/// overlay values win key-by-key, so a developer can override e.g. the
/// signing identity without touching the checked-in file.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE))?;

    let local_path = project_dir.join(LOCAL_CONFIG_FILE);
    if local_path.exists() {
        let local = std::fs::read_to_string(&local_path)?;
        load_config_with_overlay(&content, &local)
    } else {
        load_config_from_str(&content)
    }
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Parses a base configuration with a local overlay merged over it.
pub fn load_config_with_overlay(
    base: &str,
    overlay: &str,
) -> Result<ProjectConfig, ConfigError> {
    let mut base_value: toml::Value =
        toml::from_str(base).map_err(|e| ConfigError::Parse(e.to_string()))?;
    let overlay_value: toml::Value =
        toml::from_str(overlay).map_err(|e| ConfigError::Parse(e.to_string()))?;

    merge_value(&mut base_value, overlay_value);

    let config: ProjectConfig = base_value
        .try_into()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Recursively merges `overlay` into `base`. Tables merge key-by-key;
/// any other value is replaced wholesale.
fn merge_value(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_value(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base_slot, other) => *base_slot = other,
    }
}

/// Validates that required fields are present and consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.paths.artifact_ext.is_empty() {
        return Err(ConfigError::MissingField("paths.artifact_ext".to_string()));
    }
    Ok(())
}
