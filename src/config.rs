use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Name of the optional project config file.
pub const CONFIG_FILE: &str = "gearsdoc.json";

/// `gearsdoc.json` schema. Every key is optional; CLI flags win over it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearsDocConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub input: Option<String>,

    #[serde(default)]
    pub output: Option<String>,

    #[serde(default)]
    pub ignore: Vec<String>,

    #[serde(default)]
    pub index: Option<String>,

    /// Header links in markdown form, `[Text](href)`.
    #[serde(default)]
    pub links: Vec<String>,

    /// Extensions scanned in addition to the built-in list.
    #[serde(default)]
    pub ext: Vec<String>,

    #[serde(default)]
    pub additional_docs: Option<String>,

    /// Replaces the built-in title prefix → style table when non-empty.
    #[serde(default)]
    pub contexts: Vec<ContextConfig>,
}

/// One title prefix → style tag rule.
#[derive(Debug, Deserialize)]
pub struct ContextConfig {
    pub prefix: String,
    pub context: String,
}

/// Load `explicit` if given, else `gearsdoc.json` from `dir`, else defaults.
pub fn load_config(dir: &Path, explicit: Option<&Path>) -> Result<GearsDocConfig> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => dir.join(CONFIG_FILE),
    };

    if config_path.exists() {
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: GearsDocConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        tracing::debug!(path = %config_path.display(), "config loaded");
        Ok(config)
    } else if explicit.is_some() {
        anyhow::bail!("Config file {} does not exist", config_path.display())
    } else {
        Ok(GearsDocConfig::default())
    }
}
