//! Sandbox configuration

use quad_physics::config::{Config, Deserialize, PhysicsConfig, Serialize};
use quad_physics::foundation::math::Vec2;

/// Settings for one headless sandbox run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Bottom-left corner of the arena
    pub world_min: [f32; 2],
    
    /// Top-right corner of the arena
    pub world_max: [f32; 2],
    
    /// Movers scattered inside the walls
    pub body_count: usize,
    
    /// Width and height of every mover
    pub body_size: [f32; 2],
    
    /// Speed cap for the movers
    pub max_speed: f32,
    
    /// Frames to simulate
    pub frames: u32,
    
    /// Seconds per frame
    pub delta: f32,
    
    /// Log a partition summary every this many frames
    pub report_every: u32,
    
    /// Seed for scattering
    pub seed: u64,
    
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    
    /// Partition and collision tuning
    pub physics: PhysicsConfig,
}

impl SandboxConfig {
    /// Arena corners as vectors
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (Vec2::from(self.world_min), Vec2::from(self.world_max))
    }
    
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let (min, max) = self.bounds();
        if max.x <= min.x || max.y <= min.y {
            return Err("World max must exceed world min on both axes".to_string());
        }
        
        if self.body_size.iter().any(|&side| side <= 0.0) {
            return Err("Body size must be positive".to_string());
        }
        
        if !self.delta.is_finite() || self.delta <= 0.0 {
            return Err(format!("Frame delta must be positive, got {}", self.delta));
        }
        
        if self.body_count + 4 > self.physics.max_bodies {
            return Err(format!(
                "{} movers plus 4 walls exceed the body capacity of {}",
                self.body_count, self.physics.max_bodies
            ));
        }
        
        self.physics.validate()
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            world_min: [0.0, 0.0],
            world_max: [256.0, 256.0],
            body_count: 32,
            body_size: [6.0, 6.0],
            max_speed: 120.0,
            frames: 300,
            delta: 1.0 / 60.0,
            report_every: 60,
            seed: 42,
            log_level: "info".to_string(),
            physics: PhysicsConfig::default(),
        }
    }
}

impl Config for SandboxConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_default_is_valid() {
        assert!(SandboxConfig::default().validate().is_ok());
    }
    
    #[test]
    fn test_bundled_file_parses() {
        let config: SandboxConfig = toml::from_str(include_str!("../sandbox.toml")).unwrap();
        assert_eq!(config.body_count, 64);
        assert_eq!(config.physics.min_node_size, 4);
        assert!(config.validate().is_ok());
    }
    
    #[test]
    fn test_rejects_inverted_world() {
        let config = SandboxConfig {
            world_min: [10.0, 0.0],
            world_max: [0.0, 10.0],
            ..SandboxConfig::default()
        };
        assert!(config.validate().is_err());
    }
    
    #[test]
    fn test_rejects_crowd_over_capacity() {
        let mut config = SandboxConfig::default();
        config.physics.max_bodies = config.body_count;
        assert!(config.validate().is_err());
    }
}
