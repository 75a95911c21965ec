//! Concrete AI behaviors and the context they run in.
//!
//! Every state sees its unit through an [`AiContext`]: the unit's sensing
//! parameters and target slot, a [`Locomotion`] handle for moving it, and the
//! sensor / tracker collaborators for the current tick. Nothing here reaches
//! for global state.

mod follow;
mod idle;
mod patrol;
#[cfg(test)]
pub(crate) mod testing;

pub use follow::FollowTargetState;
pub use idle::IdleState;
pub use patrol::PatrolState;

use std::collections::HashMap;

use glam::Vec3;
use hecs::Entity;

use crate::components::AiUnit;
use crate::fsm::{AiStateType, TransitionSet};
use crate::sensor::{ProximitySensor, TargetTracker};

/// Motion primitive a state drives its unit with. Implemented outside the
/// AI core; see `systems::Kinematic`.
pub trait Locomotion {
    fn position(&self) -> Vec3;

    /// Translate toward `point`, at most one step's worth of distance.
    fn move_toward(&mut self, point: Vec3, dt: f32);

    /// Turn to face `point`, at most one step's worth of rotation.
    fn rotate_toward(&mut self, point: Vec3, dt: f32);
}

/// Everything a state may touch during one hook call.
pub struct AiContext<'a> {
    pub entity: Entity,
    pub unit: &'a mut AiUnit,
    pub body: &'a mut dyn Locomotion,
    pub sensor: &'a dyn ProximitySensor,
    pub tracker: &'a dyn TargetTracker,
    pub dt: f32,
}

/// First unit (other than ourselves) the sensor reports inside the
/// detection radius on the target layers.
pub fn sense_target(ctx: &AiContext<'_>) -> Option<Entity> {
    ctx.sensor
        .query(ctx.body.position(), ctx.unit.detect_radius, ctx.unit.target_mask)
        .into_iter()
        .map(|hit| hit.owner)
        .find(|&owner| owner != ctx.entity)
}

/// Transition table used when a scenario doesn't author one.
///
/// Units with a route patrol and chase; units without one stand guard and
/// chase.
pub fn default_transitions(has_path: bool) -> HashMap<AiStateType, TransitionSet> {
    let back = if has_path {
        AiStateType::Patrol
    } else {
        AiStateType::Idle
    };

    let mut table = HashMap::new();
    table.insert(AiStateType::Idle, TransitionSet::of(&[AiStateType::FollowTarget]));
    table.insert(AiStateType::FollowTarget, TransitionSet::of(&[back]));
    if has_path {
        table.insert(AiStateType::Patrol, TransitionSet::of(&[AiStateType::FollowTarget]));
    }
    table
}
