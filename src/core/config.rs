//! AI configuration loading
//!
//! Grid layout and search options in RON (preferred) or JSON.
//!
//! ```ron
//! (
//!     grid: (width: 16, height: 16, cell_size: 1.0, blocked: [(4, 4), (4, 5)]),
//!     pathfinding: (cut_corners: false),
//! )
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ai::PathfinderConfig;

/// Navigation grid layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Width in cells
    pub width: usize,
    /// Height in cells
    pub height: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// Cells that start out unwalkable
    pub blocked: Vec<(i32, i32)>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            cell_size: 1.0,
            blocked: Vec::new(),
        }
    }
}

/// Top-level AI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Navigation grid
    pub grid: GridConfig,
    /// A* options
    pub pathfinding: PathfinderConfig,
}

impl AiConfig {
    /// Parse configuration from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Load configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Render configuration as pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = AiConfig::from_ron_str(
            "(grid: (width: 8, height: 4, blocked: [(1, 2)]), pathfinding: (cut_corners: false))",
        )
        .unwrap();

        assert_eq!(config.grid.width, 8);
        assert_eq!(config.grid.height, 4);
        assert_eq!(config.grid.cell_size, 1.0);
        assert_eq!(config.grid.blocked, vec![(1, 2)]);
        assert!(!config.pathfinding.cut_corners);
        assert_eq!(config.pathfinding.max_iterations, None);
    }

    #[test]
    fn test_empty_ron_is_default() {
        let config = AiConfig::from_ron_str("()").unwrap();
        assert_eq!(config, AiConfig::default());
    }

    #[test]
    fn test_ron_roundtrip() {
        let mut config = AiConfig::default();
        config.pathfinding.max_iterations = Some(500);
        config.grid.blocked.push((3, 3));

        let text = config.to_ron_string().unwrap();
        let loaded = AiConfig::from_ron_str(&text).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_file() {
        let path = std::env::temp_dir().join("agent_ai_config_test.json");
        fs::write(
            &path,
            r#"{ "grid": { "width": 5, "height": 5, "cell_size": 2.0 } }"#,
        )
        .unwrap();

        let config = AiConfig::load_json(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(config.grid.cell_size, 2.0);
        assert!(config.pathfinding.cut_corners);
    }

    #[test]
    fn test_bad_input() {
        let err = AiConfig::from_ron_str("(grid: 7)").unwrap_err();
        assert!(matches!(err, ConfigError::DeserializeError(_)));

        let err = AiConfig::load_ron("/nonexistent/agent_ai.ron").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
        assert!(err.to_string().starts_with("IO error"));
    }
}
