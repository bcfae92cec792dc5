//! Movement configuration loading from TOML files

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable movement parameters shared by every movement strategy.
///
/// Values are stored exactly as given: negative or zero speeds, radii and
/// heights are accepted without validation, and `air_control` outside
/// [0, 1] is not clamped. Callers that want sane behavior keep sane values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Maximum walking speed (m/s)
    pub max_walk_speed: f32,
    /// Maximum acceleration (m/s²)
    pub max_acceleration: f32,
    /// Braking deceleration when no input is held (m/s²)
    pub braking_deceleration: f32,
    /// Initial vertical jump velocity (m/s)
    pub jump_z_velocity: f32,
    /// Gravity multiplier
    pub gravity_scale: f32,
    /// Air control factor, by convention in [0, 1]
    pub air_control: f32,
    /// Ground friction coefficient
    pub ground_friction: f32,
    /// Maximum step height (m)
    pub max_step_height: f32,
    /// Maximum walkable slope (degrees)
    pub max_slope_angle: f32,
    /// Whether jumping is allowed
    pub can_jump: bool,
    /// Whether the character can walk off ledges
    pub can_walk_off_ledges: bool,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_walk_speed: 6.0,
            max_acceleration: 20.0,
            braking_deceleration: 20.0,
            jump_z_velocity: 10.0,
            gravity_scale: 1.0,
            air_control: 0.2,
            ground_friction: 8.0,
            max_step_height: 0.3,
            max_slope_angle: 45.0,
            can_jump: true,
            can_walk_off_ledges: true,
        }
    }
}

impl MovementConfig {
    /// Load movement configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, MovementConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MovementConfigError::IoError(path.to_path_buf(), e))?;

        toml::from_str(&content)
            .map_err(|e| MovementConfigError::ParseError(path.to_path_buf(), e))
    }
}

/// Errors that can occur when loading movement configuration
#[derive(Debug)]
pub enum MovementConfigError {
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, toml::de::Error),
}

impl std::fmt::Display for MovementConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementConfigError::IoError(path, e) => {
                write!(f, "Failed to read {}: {}", path.display(), e)
            }
            MovementConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for MovementConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MovementConfig::default();
        assert_eq!(config.max_walk_speed, 6.0);
        assert_eq!(config.jump_z_velocity, 10.0);
        assert_eq!(config.air_control, 0.2);
        assert!(config.can_jump);
        assert!(config.can_walk_off_ledges);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
            max_walk_speed = 8.5
            can_jump = false
        "#;
        let config: MovementConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_walk_speed, 8.5);
        assert!(!config.can_jump);
        // Unspecified fields fall back to defaults
        assert_eq!(config.max_acceleration, 20.0);
        assert_eq!(config.max_slope_angle, 45.0);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            max_walk_speed = 6.0
            max_acceleration = 30.0
            braking_deceleration = 25.0
            jump_z_velocity = 12.0
            gravity_scale = 1.5
            air_control = 0.35
            ground_friction = 10.0
            max_step_height = 0.45
            max_slope_angle = 60.0
            can_jump = true
            can_walk_off_ledges = false
        "#;
        let config: MovementConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_acceleration, 30.0);
        assert_eq!(config.max_slope_angle, 60.0);
        assert!(!config.can_walk_off_ledges);
    }

    #[test]
    fn test_degenerate_values_stored_verbatim() {
        // The config layer performs no validation: tooling and tests rely
        // on degenerate values being stored exactly as given.
        let toml = r#"
            max_walk_speed = -6.0
            jump_z_velocity = 0.0
            air_control = 2.5
        "#;
        let config: MovementConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_walk_speed, -6.0);
        assert_eq!(config.jump_z_velocity, 0.0);
        assert_eq!(config.air_control, 2.5);
    }
}
