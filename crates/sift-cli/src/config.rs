//! CLI configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "sift.config.yml";

/// Defaults for paths and timeouts; command-line flags override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Target manifest (universe + dependency edges).
    pub manifest: PathBuf,
    /// Environment manifest.
    pub environments: PathBuf,
    /// Per-assignment execution timeout, seconds.
    pub timeout_secs: u64,
    /// How long a queued target may wait for an environment, seconds.
    pub env_wait_secs: u64,
    /// Shell used by the test-process collaborator.
    pub shell: String,
    /// Command template applied to targets without an explicit command.
    pub command_template: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("sift.yml"),
            environments: PathBuf::from("environments.yml"),
            timeout_secs: 3600,
            env_wait_secs: 600,
            shell: "sh".to_string(),
            command_template: "{target}".to_string(),
        }
    }
}

impl CliConfig {
    /// Load `sift.config.yml` from the working directory if present.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("reading {CONFIG_FILE}"))?;
        serde_yaml::from_str(&input).with_context(|| format!("parsing {CONFIG_FILE}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.manifest, PathBuf::from("sift.yml"));
        assert_eq!(config.timeout_secs, 3600);
        assert_eq!(config.command_template, "{target}");
    }

    #[test]
    fn test_partial_config_parses() {
        let config: CliConfig = serde_yaml::from_str("timeout_secs: 120\n").unwrap();
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.env_wait_secs, 600);
    }
}
