//! `terrain.toml` configuration

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent
pub(crate) const DEFAULT_CONFIG_FILE: &str = "terrain.toml";

/// Drift defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DriftSection {
    /// Runs per measurement
    pub(crate) runs: u32,
    /// Base seed
    pub(crate) seed: u64,
}

impl Default for DriftSection {
    fn default() -> Self {
        Self {
            runs: 10,
            seed: 1234,
        }
    }
}

/// Defaults for every subcommand; flags override them
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TerrainConfig {
    /// Terrain root
    pub(crate) src: PathBuf,
    /// Map file
    pub(crate) doc: PathBuf,
    /// Quarantine root
    pub(crate) quarantine_dir: PathBuf,
    /// Subprocess step bound in seconds
    pub(crate) step_timeout_secs: u64,
    /// Drift defaults
    pub(crate) drift: DriftSection,
    /// Ratchet configuration file
    pub(crate) ratchet_config: PathBuf,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("product/src"),
            doc: PathBuf::from("product/docs/architecture.md"),
            quarantine_dir: PathBuf::from(".sdac/workflow-quarantine"),
            step_timeout_secs: 120,
            drift: DriftSection::default(),
            ratchet_config: PathBuf::from("governance/ratchets.json"),
        }
    }
}

impl TerrainConfig {
    /// Load the explicit file, or `terrain.toml` if present, or defaults
    ///
    /// An explicitly named file must exist.
    pub(crate) fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text; absent keys take their defaults
    pub(crate) fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// With Terrain root
    #[must_use]
    pub(crate) fn with_src(mut self, src: PathBuf) -> Self {
        self.src = src;
        self
    }

    /// With Map file
    #[must_use]
    pub(crate) fn with_doc(mut self, doc: PathBuf) -> Self {
        self.doc = doc;
        self
    }

    /// With quarantine root
    #[must_use]
    pub(crate) fn with_quarantine_dir(mut self, dir: PathBuf) -> Self {
        self.quarantine_dir = dir;
        self
    }

    /// With step timeout
    #[must_use]
    pub(crate) fn with_step_timeout_secs(mut self, secs: u64) -> Self {
        self.step_timeout_secs = secs;
        self
    }

    /// With ratchet configuration file
    #[must_use]
    pub(crate) fn with_ratchet_config(mut self, path: PathBuf) -> Self {
        self.ratchet_config = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(TerrainConfig::from_toml("").unwrap(), TerrainConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let config = TerrainConfig::from_toml(
            r#"
src = "app/src"
step_timeout_secs = 5

[drift]
runs = 3
"#,
        )
        .unwrap();

        assert_eq!(config.src, PathBuf::from("app/src"));
        assert_eq!(config.doc, PathBuf::from("product/docs/architecture.md"));
        assert_eq!(config.step_timeout_secs, 5);
        assert_eq!(config.drift, DriftSection { runs: 3, seed: 1234 });
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(TerrainConfig::from_toml("srcs = \"x\"").is_err());
    }

    #[test]
    fn builders_override() {
        let config = TerrainConfig::default()
            .with_src(PathBuf::from("s"))
            .with_doc(PathBuf::from("d.md"))
            .with_quarantine_dir(PathBuf::from("q"))
            .with_step_timeout_secs(1)
            .with_ratchet_config(PathBuf::from("r.json"));
        assert_eq!(config.src, PathBuf::from("s"));
        assert_eq!(config.doc, PathBuf::from("d.md"));
        assert_eq!(config.quarantine_dir, PathBuf::from("q"));
        assert_eq!(config.step_timeout_secs, 1);
        assert_eq!(config.ratchet_config, PathBuf::from("r.json"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(TerrainConfig::load(Some(Path::new("/nonexistent/terrain.toml"))).is_err());
    }
}
