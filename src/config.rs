//! Repository configuration
//!
//! Loaded from YAML; every section and field is optional and falls back to
//! its default.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Materialization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializationConfig {
    /// Convenience attributes copied into entity headers
    pub header_attributes: Vec<String>,

    /// Abort the whole entity on an invalid relationship attribute instead of
    /// skipping that attribute
    pub strict_relationship_attributes: bool,
}

impl Default for MaterializationConfig {
    fn default() -> Self {
        Self {
            header_attributes: ["name", "description", "owner", "createTime"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            strict_relationship_attributes: false,
        }
    }
}

/// Propagation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Maximum vertices visited by one reachability traversal (None = unbounded)
    pub max_traversal_vertices: Option<usize>,

    /// Relationship edges in the DELETED state carry no propagation
    pub skip_deleted_relationships: bool,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_traversal_vertices: None,
            skip_deleted_relationships: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub materialization: MaterializationConfig,
    pub propagation: PropagationConfig,
}

impl RepositoryConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: RepositoryConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.propagation.max_traversal_vertices == Some(0) {
            return Err(ConfigError::Invalid(
                "propagation.max_traversal_vertices must be at least 1".to_string(),
            ));
        }
        if self.materialization.header_attributes.iter().any(|a| a.is_empty()) {
            return Err(ConfigError::Invalid(
                "materialization.header_attributes must not contain empty names".to_string(),
            ));
        }
        Ok(())
    }
}
