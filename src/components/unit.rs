use hecs::Entity;

use crate::fsm::StateMachine;
use crate::sensor::{Layer, LayerMask};

/// Which side a unit fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player,
    Enemy,
}

impl Role {
    /// Sensor layer the unit's colliders live on.
    pub fn layer(self) -> Layer {
        match self {
            Self::Player => Layer::Player,
            Self::Enemy => Layer::Enemy,
        }
    }
}

/// Display name used in logs and events.
#[derive(Debug, Clone)]
pub struct UnitName(pub String);

/// Sensing and steering parameters of an AI-driven unit, plus the target it
/// is currently pursuing.
#[derive(Debug, Clone)]
pub struct AiUnit {
    /// Radius of the proximity query used to spot targets.
    pub detect_radius: f32,
    /// Distance at which a patrol waypoint counts as reached.
    pub arrive_radius: f32,
    /// A pursued target farther than this is given up.
    pub lose_radius: f32,
    /// Pursuit stops closing in at this distance.
    pub stop_distance: f32,
    pub target_mask: LayerMask,
    pub target: Option<Entity>,
}

impl AiUnit {
    /// Arrive radius defaults to the detection radius and the lose radius
    /// to twice that.
    pub fn new(detect_radius: f32) -> Self {
        Self {
            detect_radius,
            arrive_radius: detect_radius,
            lose_radius: detect_radius * 2.0,
            stop_distance: 1.5,
            target_mask: Layer::Player.mask(),
            target: None,
        }
    }

    pub fn with_arrive_radius(mut self, radius: f32) -> Self {
        self.arrive_radius = radius;
        self
    }

    pub fn with_lose_radius(mut self, radius: f32) -> Self {
        self.lose_radius = radius;
        self
    }

    pub fn with_stop_distance(mut self, distance: f32) -> Self {
        self.stop_distance = distance;
        self
    }

    pub fn with_target_mask(mut self, mask: LayerMask) -> Self {
        self.target_mask = mask;
        self
    }
}

/// Movement limits consumed by the kinematic motion primitive.
#[derive(Debug, Clone, Copy)]
pub struct Mover {
    /// Meters per second.
    pub speed: f32,
    /// Radians per second.
    pub turn_speed: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Negative amounts heal, never past `max`.
    pub fn take_damage(&mut self, amount: i32) {
        self.current = self.current.saturating_sub(amount).min(self.max).max(0);
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }
}

/// FSM component attached to every AI-driven unit.
pub type AiController = StateMachine;

/// Emitted when a unit's health reaches zero and it leaves the simulation.
#[derive(Debug, Clone)]
pub struct UnitDied {
    pub entity: Entity,
    pub name: Option<String>,
    pub role: Role,
}
