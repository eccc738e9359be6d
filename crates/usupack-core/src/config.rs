use std::io;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

// Optional per-user configuration. Command-line flags win over config
// values, config values win over built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    pub app_root: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub abi: Option<String>,
}

impl ManagerConfig {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse usupack config")?;
        if let Some(abi) = &config.abi {
            if abi.trim().is_empty() {
                return Err(anyhow!("config field 'abi' must not be empty"));
            }
        }
        if let Some(app_root) = &config.app_root {
            if app_root.as_os_str().is_empty() {
                return Err(anyhow!("config field 'app_root' must not be empty"));
            }
        }
        if let Some(assets_dir) = &config.assets_dir {
            if assets_dir.as_os_str().is_empty() {
                return Err(anyhow!("config field 'assets_dir' must not be empty"));
            }
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Option<Self>> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read config: {}", path.display()));
            }
        };
        let config = Self::from_toml_str(&raw)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(Some(config))
    }
}
