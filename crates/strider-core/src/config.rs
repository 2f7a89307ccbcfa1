use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_terrain_plane_resolution() -> f64 {
    0.04
}
const fn default_terrain_height_resolution() -> f64 {
    0.02
}
const fn default_obstacle_plane_resolution() -> f64 {
    0.04
}
const fn default_obstacle_height_resolution() -> f64 {
    0.02
}
const fn default_state_position_resolution() -> f64 {
    0.04
}
const fn default_state_angular_resolution() -> f64 {
    // pi / 32 rad, about 5.6 degrees per yaw bucket
    0.098_174_770_424_681_04
}
const fn default_computation_time() -> f64 {
    f64::INFINITY
}
const fn default_contact_horizon() -> usize {
    0
}
const fn default_gravity() -> f64 {
    9.81
}
const fn default_mass() -> f64 {
    85.0
}
const fn default_stiffness() -> f64 {
    15_000.0
}

// ---------------------------------------------------------------------------
// PlannerConfig
// ---------------------------------------------------------------------------

/// Main planner configuration.
///
/// All resolutions are in meters (angular resolution in radians) and must be
/// strictly positive; [`PlannerConfig::from_toml_str`] rejects invalid values
/// before they can reach a discretization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Terrain cost/height map resolution in the horizontal plane (default: 0.04).
    #[serde(default = "default_terrain_plane_resolution")]
    pub terrain_plane_resolution: f64,

    /// Terrain height bucketing resolution (default: 0.02).
    #[serde(default = "default_terrain_height_resolution")]
    pub terrain_height_resolution: f64,

    /// Obstacle map resolution in the horizontal plane (default: 0.04).
    #[serde(default = "default_obstacle_plane_resolution")]
    pub obstacle_plane_resolution: f64,

    /// Obstacle height bucketing resolution (default: 0.02).
    #[serde(default = "default_obstacle_height_resolution")]
    pub obstacle_height_resolution: f64,

    /// Position resolution for planner state-space queries (default: 0.04).
    #[serde(default = "default_state_position_resolution")]
    pub state_position_resolution: f64,

    /// Yaw resolution for planner state-space queries (default: pi/32).
    #[serde(default = "default_state_angular_resolution")]
    pub state_angular_resolution: f64,

    /// Computation-time budget for the contact search in seconds
    /// (default: unbounded).
    #[serde(default = "default_computation_time")]
    pub computation_time: f64,

    /// Number of lookahead contacts beyond the next one (default: 0 = greedy
    /// single-step planning).
    #[serde(default = "default_contact_horizon")]
    pub contact_horizon: usize,

    /// Reduced-order body model constants.
    #[serde(default)]
    pub slip: SlipConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            terrain_plane_resolution: default_terrain_plane_resolution(),
            terrain_height_resolution: default_terrain_height_resolution(),
            obstacle_plane_resolution: default_obstacle_plane_resolution(),
            obstacle_height_resolution: default_obstacle_height_resolution(),
            state_position_resolution: default_state_position_resolution(),
            state_angular_resolution: default_state_angular_resolution(),
            computation_time: default_computation_time(),
            contact_horizon: default_contact_horizon(),
            slip: SlipConfig::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("terrain_plane_resolution", self.terrain_plane_resolution),
            ("terrain_height_resolution", self.terrain_height_resolution),
            ("obstacle_plane_resolution", self.obstacle_plane_resolution),
            (
                "obstacle_height_resolution",
                self.obstacle_height_resolution,
            ),
            ("state_position_resolution", self.state_position_resolution),
            ("state_angular_resolution", self.state_angular_resolution),
            ("slip.gravity", self.slip.gravity),
            ("slip.mass", self.slip.mass),
            ("slip.stiffness", self.slip.stiffness),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("{value} (must be > 0)"),
                });
            }
        }
        if self.computation_time <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "computation_time",
                message: format!("{} (must be > 0)", self.computation_time),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SlipConfig
// ---------------------------------------------------------------------------

/// Physical constants of the reduced-order body model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlipConfig {
    /// Gravitational acceleration magnitude in m/s^2 (default: 9.81).
    #[serde(default = "default_gravity")]
    pub gravity: f64,

    /// Total robot mass in kg (default: 85.0).
    #[serde(default = "default_mass")]
    pub mass: f64,

    /// Vertical spring stiffness in N/m (default: 15000.0).
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,
}

impl Default for SlipConfig {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            mass: default_mass(),
            stiffness: default_stiffness(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PlannerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.contact_horizon, 0);
        assert!(config.computation_time.is_infinite());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let config = PlannerConfig::from_toml_str(
            r#"
            terrain_plane_resolution = 0.1
            contact_horizon = 3

            [slip]
            mass = 30.0
            "#,
        )
        .unwrap();
        assert!((config.terrain_plane_resolution - 0.1).abs() < 1e-12);
        assert_eq!(config.contact_horizon, 3);
        assert!((config.slip.mass - 30.0).abs() < 1e-12);
        // Untouched fields keep their defaults
        assert!((config.slip.gravity - 9.81).abs() < 1e-12);
    }

    #[test]
    fn non_positive_resolution_is_rejected() {
        let err = PlannerConfig::from_toml_str("terrain_plane_resolution = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "terrain_plane_resolution",
                ..
            }
        ));
    }

    #[test]
    fn non_positive_slip_mass_is_rejected() {
        let err = PlannerConfig::from_toml_str("slip = { mass = -1.0 }").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "slip.mass",
                ..
            }
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = PlannerConfig::from_toml_str("terrain_plane_resolution = ").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
