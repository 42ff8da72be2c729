use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::EnrichError;

pub const DEFAULT_PROGRESS_EVERY: usize = 200;
pub const DEFAULT_OUTPUT_SUFFIX: &str = "enriched";
pub const DEFAULT_INDENT: usize = 2;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sdrf_root: Option<String>,
    #[serde(default)]
    pub progress_every: Option<usize>,
    #[serde(default)]
    pub output_suffix: Option<String>,
    #[serde(default)]
    pub indent: Option<usize>,
}

/// Values given on the command line. They take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub sdrf_root: Option<String>,
    pub progress_every: Option<usize>,
    pub output_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub sdrf_root: Option<String>,
    pub progress_every: usize,
    pub output_suffix: String,
    pub indent: usize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            sdrf_root: None,
            progress_every: DEFAULT_PROGRESS_EVERY,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            indent: DEFAULT_INDENT,
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, EnrichError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Config::default(),
        };
        Self::resolve_config(config, overrides)
    }

    pub fn load(path: &str) -> Result<Config, EnrichError> {
        let config_path = PathBuf::from(path);
        let content = fs::read_to_string(&config_path)
            .map_err(|_| EnrichError::ConfigRead(config_path.clone()))?;
        serde_json::from_str(&content).map_err(|err| EnrichError::ConfigParse(err.to_string()))
    }

    pub fn resolve_config(
        config: Config,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, EnrichError> {
        let progress_every = overrides
            .progress_every
            .or(config.progress_every)
            .unwrap_or(DEFAULT_PROGRESS_EVERY);
        if progress_every == 0 {
            return Err(EnrichError::InvalidConfig(
                "progress_every must be greater than zero".to_string(),
            ));
        }

        let output_suffix = overrides
            .output_suffix
            .or(config.output_suffix)
            .unwrap_or_else(|| DEFAULT_OUTPUT_SUFFIX.to_string());
        let output_suffix = output_suffix.trim_start_matches('.').to_string();
        if output_suffix.is_empty() {
            return Err(EnrichError::InvalidConfig(
                "output_suffix must not be empty".to_string(),
            ));
        }

        Ok(ResolvedConfig {
            sdrf_root: overrides.sdrf_root.or(config.sdrf_root),
            progress_every,
            output_suffix,
            indent: config.indent.unwrap_or(DEFAULT_INDENT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let resolved =
            ConfigLoader::resolve_config(Config::default(), ConfigOverrides::default()).unwrap();
        assert_eq!(resolved, ResolvedConfig::default());
    }
}
