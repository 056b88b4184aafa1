//! TOML configuration for `orbitctl`.
//!
//! Every section is optional; a missing file or section falls back to the
//! defaults below.

use std::path::Path;

use anyhow::Context;
use orbit_types::{HasherKind, RingConfig};
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring shape and membership.
    pub ring: RingSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ring]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RingSection {
    /// Virtual nodes placed per physical node.
    pub virtual_nodes: usize,
    /// Position hash function (`[ring.hasher]` table).
    pub hasher: HasherKind,
    /// Nodes placed on the ring by `resolve`, `distribution` and `plan`.
    pub nodes: Vec<String>,
}

impl Default for RingSection {
    fn default() -> Self {
        let ring = RingConfig::default();
        Self {
            virtual_nodes: ring.virtual_nodes,
            hasher: ring.hasher,
            nodes: Vec::new(),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                let config: CliConfig = toml::from_str(&content)
                    .with_context(|| format!("failed to parse {}", p.display()))?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Ring parameters for [`orbit_ring::Ring::from_config`].
    pub fn ring_config(&self) -> RingConfig {
        RingConfig {
            virtual_nodes: self.ring.virtual_nodes,
            hasher: self.ring.hasher,
        }
    }
}
