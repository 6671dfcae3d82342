//! Configuration system
//!
//! Tuning for the partition and the collision pass lives in
//! [`PhysicsConfig`]. Every tolerance the crate uses is carried here and
//! handed to the structures that need it, so two trees configured
//! differently never influence each other.

pub use serde::{Serialize, Deserialize};

use crate::foundation::math::DEFAULT_EPSILON;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;
        
        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }
    
    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };
        
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
    
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// How a hitbox tests another hitbox during the collision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// Ray from the box centre along `velocity * delta` against the other
    /// box grown by this box's half extents
    #[default]
    Swept,
    
    /// Overlap test at the current positions only
    Static,
}

/// # Physics Configuration
///
/// Controls when leaves divide, how small cells may get, and the
/// tolerance used for float comparisons in the collision pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Elements a leaf holds before it divides on the next insert
    pub threshold: usize,
    /// Side length at or below which a leaf refuses to divide
    pub min_node_size: u32,
    /// Tolerance for zero-velocity and moved-geometry tests
    pub epsilon: f32,
    /// Pairwise test used by the collision pass
    pub sweep_mode: SweepMode,
    /// Capacity of the driver's body list
    pub max_bodies: usize,
}

impl PhysicsConfig {
    /// Create a configuration with engine defaults
    pub fn new() -> Self {
        Self {
            threshold: 4,
            min_node_size: 2,
            epsilon: DEFAULT_EPSILON,
            sweep_mode: SweepMode::Swept,
            max_bodies: 1024,
        }
    }
    
    /// Set the division threshold
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }
    
    /// Set the minimum node side length
    #[must_use]
    pub fn with_min_node_size(mut self, size: u32) -> Self {
        self.min_node_size = size;
        self
    }
    
    /// Set the float comparison tolerance
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }
    
    /// Set the pairwise test mode
    #[must_use]
    pub fn with_sweep_mode(mut self, mode: SweepMode) -> Self {
        self.sweep_mode = mode;
        self
    }
    
    /// Set the body capacity of the driver
    #[must_use]
    pub fn with_max_bodies(mut self, max_bodies: usize) -> Self {
        self.max_bodies = max_bodies;
        self
    }
    
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.threshold == 0 {
            return Err("Threshold must be at least 1".to_string());
        }
        
        if self.min_node_size == 0 {
            return Err("Minimum node size must be at least 1".to_string());
        }
        
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(format!("Epsilon must be positive and finite, got {}", self.epsilon));
        }
        
        if self.max_bodies == 0 {
            return Err("Body capacity must be at least 1".to_string());
        }
        
        Ok(())
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for PhysicsConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_defaults_are_valid() {
        let config = PhysicsConfig::default();
        assert_eq!(config.threshold, 4);
        assert_eq!(config.min_node_size, 2);
        assert_eq!(config.sweep_mode, SweepMode::Swept);
        assert!(config.validate().is_ok());
    }
    
    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(PhysicsConfig::new().with_threshold(0).validate().is_err());
        assert!(PhysicsConfig::new().with_min_node_size(0).validate().is_err());
        assert!(PhysicsConfig::new().with_epsilon(0.0).validate().is_err());
        assert!(PhysicsConfig::new().with_epsilon(f32::NAN).validate().is_err());
        assert!(PhysicsConfig::new().with_max_bodies(0).validate().is_err());
    }
    
    #[test]
    fn test_toml_partial_document_uses_defaults() {
        let config: PhysicsConfig = toml::from_str("threshold = 8\nsweep_mode = \"static\"\n").unwrap();
        assert_eq!(config.threshold, 8);
        assert_eq!(config.sweep_mode, SweepMode::Static);
        assert_eq!(config.min_node_size, 2);
        assert_eq!(config.max_bodies, 1024);
    }
    
    #[test]
    fn test_ron_round_trip() {
        let config = PhysicsConfig::new().with_threshold(6).with_epsilon(0.001);
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let parsed: PhysicsConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
    
    #[test]
    fn test_unsupported_extension() {
        let result = PhysicsConfig::default().save_to_file("physics.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
