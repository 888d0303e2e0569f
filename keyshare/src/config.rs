use std::path::{Path, PathBuf};

use bon::Builder;
use keyshare_types::{InvalidParams, Params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct KeyshareConfig {
    /// Module parameters.
    #[builder(default)]
    #[serde(default)]
    pub(crate) params: Params,
}

impl KeyshareConfig {
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn validate(&self) -> Result<(), InvalidParams> {
        self.params.validate()
    }

    pub async fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError(path.into(), Box::new(e)))?;
        let c: Self = toml::from_str(&s).map_err(|e| ConfigError(path.into(), Box::new(e)))?;
        c.validate()
            .map_err(|e| ConfigError(path.into(), Box::new(e)))?;
        Ok(c)
    }

    pub async fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let s = toml::to_string_pretty(self).map_err(|e| ConfigError(path.into(), Box::new(e)))?;
        tokio::fs::write(path, s)
            .await
            .map_err(|e| ConfigError(path.into(), Box::new(e)))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("config error {0}: {1}")]
pub struct ConfigError(PathBuf, #[source] Box<dyn std::error::Error + Send + Sync>);
