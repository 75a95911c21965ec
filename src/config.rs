//! Scenario description loaded from TOML.
//!
//! ```toml
//! [simulation]
//! dt = 0.016666668
//! ticks = 600
//!
//! [[paths]]
//! name = "perimeter"
//! waypoints = [[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [20.0, 0.0, 0.0]]
//!
//! [[units]]
//! name = "sentry"
//! role = "enemy"
//! position = [9.0, 0.0, 0.0]
//! path = "perimeter"
//! detect_radius = 5.0
//!
//! [units.transitions]
//! patrol = ["follow_target"]
//! follow_target = ["patrol"]
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path as FsPath;

use glam::Vec3;
use serde::Deserialize;

use crate::components::Role;
use crate::error::AiError;
use crate::fsm::AiStateType;
use crate::navigation::Direction;

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub paths: Vec<PathConfig>,
    #[serde(default)]
    pub units: Vec<UnitConfig>,
}

impl ScenarioConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, AiError> {
        Ok(toml::from_str(src)?)
    }

    pub fn load(path: impl AsRef<FsPath>) -> Result<Self, AiError> {
        let src = std::fs::read_to_string(path)?;
        Self::from_toml_str(&src)
    }

    /// Reject values the simulation can't run with: a non-positive or
    /// non-finite step, duplicate path names, non-finite coordinates, and
    /// negative or non-finite radii, speeds and health.
    pub fn validate(&self) -> Result<(), AiError> {
        let dt = self.simulation.dt;
        if !(dt.is_finite() && dt > 0.0) {
            return Err(invalid("simulation.dt", format!("must be positive, got {dt}")));
        }

        let mut seen = HashSet::new();
        for path in &self.paths {
            if !seen.insert(path.name.as_str()) {
                return Err(invalid(format!("paths.{}", path.name), "duplicate path name"));
            }
            if path.waypoints.iter().flatten().any(|c| !c.is_finite()) {
                return Err(invalid(
                    format!("paths.{}.waypoints", path.name),
                    "coordinates must be finite",
                ));
            }
        }

        for unit in &self.units {
            unit.validate()?;
        }
        Ok(())
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> AiError {
    AiError::InvalidConfig {
        field: field.into(),
        reason: reason.into(),
    }
}

fn non_negative(unit: &str, field: &str, value: f32) -> Result<(), AiError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(
            format!("units.{unit}.{field}"),
            format!("must be finite and non-negative, got {value}"),
        ))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed step in seconds.
    pub dt: f32,
    pub ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            ticks: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathConfig {
    pub name: String,
    pub waypoints: Vec<[f32; 3]>,
    #[serde(default)]
    pub closed: bool,
}

impl PathConfig {
    pub fn positions(&self) -> Vec<Vec3> {
        self.waypoints.iter().copied().map(Vec3::from).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitConfig {
    pub name: String,
    pub role: Role,
    pub position: [f32; 3],

    #[serde(default = "default_health")]
    pub health: i32,
    #[serde(default = "default_collider_radius")]
    pub collider_radius: f32,
    /// Constant drift for units without an AI controller.
    #[serde(default)]
    pub velocity: Option<[f32; 3]>,

    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_detect_radius")]
    pub detect_radius: f32,
    /// Defaults to `detect_radius`.
    #[serde(default)]
    pub arrive_radius: Option<f32>,
    /// Defaults to twice `detect_radius`.
    #[serde(default)]
    pub lose_radius: Option<f32>,
    #[serde(default)]
    pub stop_distance: Option<f32>,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_turn_speed")]
    pub turn_speed: f32,
    /// Defaults to Patrol with a path, Idle without.
    #[serde(default)]
    pub initial_state: Option<AiStateType>,
    /// Legal transitions per state. A state with no entry may not leave.
    /// When the whole table is omitted the built-in defaults apply.
    #[serde(default)]
    pub transitions: Option<HashMap<AiStateType, Vec<AiStateType>>>,
}

impl UnitConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    fn validate(&self) -> Result<(), AiError> {
        let name = self.name.as_str();
        if self.health <= 0 {
            return Err(invalid(
                format!("units.{name}.health"),
                format!("must be positive, got {}", self.health),
            ));
        }
        let mut coords = self.position.iter().chain(self.velocity.iter().flatten());
        if coords.any(|c| !c.is_finite()) {
            return Err(invalid(
                format!("units.{name}"),
                "position and velocity must be finite",
            ));
        }

        non_negative(name, "collider_radius", self.collider_radius)?;
        non_negative(name, "detect_radius", self.detect_radius)?;
        non_negative(name, "speed", self.speed)?;
        non_negative(name, "turn_speed", self.turn_speed)?;
        let optional = [
            ("arrive_radius", self.arrive_radius),
            ("lose_radius", self.lose_radius),
            ("stop_distance", self.stop_distance),
        ];
        for (field, value) in optional {
            if let Some(value) = value {
                non_negative(name, field, value)?;
            }
        }
        Ok(())
    }
}

fn default_health() -> i32 {
    3
}

fn default_collider_radius() -> f32 {
    0.5
}

fn default_detect_radius() -> f32 {
    5.0
}

fn default_speed() -> f32 {
    3.0
}

fn default_turn_speed() -> f32 {
    std::f32::consts::PI
}
