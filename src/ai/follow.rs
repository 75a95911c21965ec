use std::any::Any;

use tracing::debug;

use super::AiContext;
use crate::fsm::{AiState, AiStateType, TransitionGate, TransitionSet};

/// Chases `AiUnit::target`.
///
/// The target is dropped once it disappears from the world or gets farther
/// than the lose radius; the state then hands back to Patrol, or Idle for
/// units without a route. If neither is declared the unit holds position.
pub struct FollowTargetState {
    transitions: TransitionSet,
}

impl FollowTargetState {
    pub fn new(transitions: TransitionSet) -> Self {
        Self { transitions }
    }
}

impl AiState for FollowTargetState {
    fn kind(&self) -> AiStateType {
        AiStateType::FollowTarget
    }

    fn transitions(&self) -> TransitionSet {
        self.transitions
    }

    fn update(&mut self, ctx: &mut AiContext<'_>, gate: &mut TransitionGate) {
        let position = ctx.body.position();
        let lose_sq = ctx.unit.lose_radius * ctx.unit.lose_radius;
        let tracked = ctx
            .unit
            .target
            .and_then(|target| ctx.tracker.locate(target))
            .filter(|at| at.distance_squared(position) <= lose_sq);

        let Some(goal) = tracked else {
            if let Some(lost) = ctx.unit.target.take() {
                debug!(unit = ?ctx.entity, target = ?lost, "target lost");
            }
            for fallback in [AiStateType::Patrol, AiStateType::Idle] {
                if gate.request(fallback).is_accepted() {
                    return;
                }
            }
            return;
        };

        ctx.body.rotate_toward(goal, ctx.dt);
        let stop_sq = ctx.unit.stop_distance * ctx.unit.stop_distance;
        if goal.distance_squared(position) > stop_sq {
            ctx.body.move_toward(goal, ctx.dt);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::ai::testing::Harness;
    use crate::ai::IdleState;
    use crate::fsm::StateMachine;

    fn chasing(harness: &mut Harness, back_to: AiStateType) -> StateMachine {
        let mut fsm = StateMachine::builder(AiStateType::FollowTarget)
            .with_state(FollowTargetState::new(TransitionSet::of(&[back_to])))
            .with_state(IdleState::new(TransitionSet::of(&[AiStateType::FollowTarget])))
            .build()
            .unwrap();
        fsm.activate(AiStateType::FollowTarget, &mut harness.ctx())
            .unwrap();
        fsm
    }

    #[test]
    fn closes_in_on_target() {
        let mut harness = Harness::new().with_detect_radius(5.0);
        let target = harness.add_target(Vec3::new(4.0, 0.0, 0.0));
        harness.unit.target = Some(target);
        let mut fsm = chasing(&mut harness, AiStateType::Idle);

        assert_eq!(fsm.tick(&mut harness.ctx()).unwrap(), None);
        assert_eq!(harness.body.moved_toward, vec![Vec3::new(4.0, 0.0, 0.0)]);
        assert_eq!(harness.body.rotated_toward, vec![Vec3::new(4.0, 0.0, 0.0)]);
    }

    #[test]
    fn stops_at_stop_distance_but_keeps_facing() {
        let mut harness = Harness::new().with_detect_radius(5.0);
        let target = harness.add_target(Vec3::new(1.0, 0.0, 0.0));
        harness.unit.target = Some(target);
        let mut fsm = chasing(&mut harness, AiStateType::Idle);

        fsm.tick(&mut harness.ctx()).unwrap();
        assert!(harness.body.moved_toward.is_empty());
        assert_eq!(harness.body.rotated_toward.len(), 1);
    }

    #[test]
    fn gives_up_beyond_lose_radius() {
        let mut harness = Harness::new().with_detect_radius(5.0);
        let target = harness.add_target(Vec3::new(4.0, 0.0, 0.0));
        harness.unit.target = Some(target);
        let mut fsm = chasing(&mut harness, AiStateType::Idle);
        fsm.tick(&mut harness.ctx()).unwrap();

        harness.move_target(target, Vec3::new(11.0, 0.0, 0.0));
        let switched = fsm.tick(&mut harness.ctx()).unwrap();

        assert_eq!(switched, Some(AiStateType::Idle));
        assert_eq!(harness.unit.target, None);
    }

    #[test]
    fn vanished_target_is_dropped() {
        let mut harness = Harness::new().with_detect_radius(5.0);
        let target = harness.add_target(Vec3::new(4.0, 0.0, 0.0));
        harness.unit.target = Some(target);
        let mut fsm = chasing(&mut harness, AiStateType::Idle);

        harness.remove_target(target);
        assert_eq!(fsm.tick(&mut harness.ctx()).unwrap(), Some(AiStateType::Idle));
        assert!(harness.body.moved_toward.is_empty());
    }

    #[test]
    fn holds_when_no_fallback_is_declared() {
        let mut harness = Harness::new();
        let mut fsm = StateMachine::builder(AiStateType::FollowTarget)
            .with_state(FollowTargetState::new(TransitionSet::EMPTY))
            .build()
            .unwrap();

        assert_eq!(fsm.tick(&mut harness.ctx()).unwrap(), None);
        assert!(fsm.is_in(AiStateType::FollowTarget));
        assert!(harness.body.moved_toward.is_empty());
    }
}
