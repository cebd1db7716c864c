use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PkConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub context: ContextConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

/// [context] section configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Default token budget for `pk context`
    #[serde(default = "default_budget")]
    pub budget: usize,
}

fn default_true() -> bool {
    true
}

fn default_budget() -> usize {
    2000
}

impl Default for PkConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            context: ContextConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { budget: default_budget() }
    }
}

/// Load config by merging global defaults with per-directory overrides.
/// Priority: local `.patchkit.toml` > global `~/.config/patchkit/config.toml`
/// > built-in defaults. Merging is deep: individual fields within sections
/// override independently.
pub fn load_config(dir: &str) -> PkConfig {
    let local_path = format!("{dir}/.patchkit.toml");
    let global_path = dirs::config_dir()
        .map(|d| d.join("patchkit/config.toml").to_string_lossy().to_string());

    let global_table = global_path
        .and_then(|p| std::fs::read_to_string(p).ok())
        .and_then(|c| c.parse::<toml::Value>().ok())
        .and_then(|v| match v {
            toml::Value::Table(t) => Some(t),
            _ => None,
        });

    let local_table = std::fs::read_to_string(&local_path)
        .ok()
        .and_then(|c| c.parse::<toml::Value>().ok())
        .and_then(|v| match v {
            toml::Value::Table(t) => Some(t),
            _ => None,
        });

    let merged = match (global_table, local_table) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            toml::Value::Table(global)
        }
        (Some(global), None) => toml::Value::Table(global),
        (None, Some(local)) => toml::Value::Table(local),
        (None, None) => return PkConfig::default(),
    };

    merged.try_into().unwrap_or_default()
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested tables
/// are merged recursively.
fn deep_merge(
    base: &mut toml::map::Map<String, toml::Value>,
    overlay: toml::map::Map<String, toml::Value>,
) {
    for (key, value) in overlay {
        match (base.get_mut(&key), &value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table.clone());
            }
            _ => {
                base.insert(key, value);
            }
        }
    }
}

/// Save config to the global config dir (~/.config/patchkit/config.toml).
#[allow(dead_code)]
pub fn save_config(config: &PkConfig) -> Result<()> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("patchkit");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("config.toml");
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the XDG override cannot race a parallel sibling
    #[test]
    fn load_config_layers_local_over_global() {
        let config_home = tempfile::tempdir().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", config_home.path());

        // No files at all → defaults
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().to_str().unwrap());
        assert!(config.output.pretty);
        assert_eq!(config.context.budget, 2000);

        // Local file overrides a single field, other sections keep defaults
        std::fs::write(dir.path().join(".patchkit.toml"), "[context]\nbudget = 512\n").unwrap();
        let config = load_config(dir.path().to_str().unwrap());
        assert_eq!(config.context.budget, 512);
        assert!(config.output.pretty);

        // Global file supplies what the local one does not mention
        let global_dir = config_home.path().join("patchkit");
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(global_dir.join("config.toml"), "[output]\npretty = false\n").unwrap();
        let config = load_config(dir.path().to_str().unwrap());
        assert_eq!(config.context.budget, 512);
        assert!(!config.output.pretty);

        // Malformed local file falls back instead of erroring
        std::fs::write(dir.path().join(".patchkit.toml"), "not [valid toml").unwrap();
        let config = load_config(dir.path().to_str().unwrap());
        assert!(!config.output.pretty);
    }

    #[test]
    fn deep_merge_prefers_overlay_values() {
        let mut base = "a = 1\n[t]\nx = 1\ny = 2\n"
            .parse::<toml::Value>()
            .unwrap();
        let overlay = "[t]\ny = 9\n".parse::<toml::Value>().unwrap();

        let (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) =
            (&mut base, overlay)
        else {
            panic!("expected tables");
        };
        deep_merge(base_table, overlay_table);

        assert_eq!(base_table["a"].as_integer(), Some(1));
        assert_eq!(base_table["t"]["x"].as_integer(), Some(1));
        assert_eq!(base_table["t"]["y"].as_integer(), Some(9));
    }
}
