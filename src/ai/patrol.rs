use std::any::Any;
use std::sync::Arc;

use tracing::trace;

use super::{sense_target, AiContext};
use crate::fsm::{AiState, AiStateType, TransitionGate, TransitionSet};
use crate::navigation::{Direction, Path, RouteCursor, Waypoint};

/// Walks a shared route until a target shows up.
///
/// Each tick: sense first, and hand over to `FollowTarget` if anything is in
/// range. Otherwise advance the cursor once the current waypoint is within
/// the arrive radius, then steer toward the cursor's waypoint.
pub struct PatrolState {
    path: Arc<Path>,
    cursor: RouteCursor,
    transitions: TransitionSet,
}

impl PatrolState {
    pub fn new(path: Arc<Path>, direction: Direction, transitions: TransitionSet) -> Self {
        Self {
            path,
            cursor: RouteCursor::new(0, direction),
            transitions,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cursor(&self) -> RouteCursor {
        self.cursor
    }

    pub fn current_waypoint(&self) -> &Waypoint {
        self.path.waypoint(self.cursor.index)
    }
}

impl AiState for PatrolState {
    fn kind(&self) -> AiStateType {
        AiStateType::Patrol
    }

    fn transitions(&self) -> TransitionSet {
        self.transitions
    }

    /// Resume from wherever the unit is, not from the start of the route.
    fn on_activate(&mut self, ctx: &mut AiContext<'_>) {
        self.cursor.index = self.path.closest_waypoint(ctx.body.position());
        trace!(
            unit = ?ctx.entity,
            waypoint = %self.current_waypoint().name,
            "patrol anchored"
        );
    }

    fn update(&mut self, ctx: &mut AiContext<'_>, gate: &mut TransitionGate) {
        if let Some(target) = sense_target(ctx) {
            ctx.unit.target = Some(target);
            if gate.request(AiStateType::FollowTarget).is_accepted() {
                return;
            }
        }

        let position = ctx.body.position();
        let arrive_sq = ctx.unit.arrive_radius * ctx.unit.arrive_radius;
        if position.distance_squared(self.current_waypoint().position) <= arrive_sq {
            self.cursor = self.path.advance(self.cursor);
            trace!(
                unit = ?ctx.entity,
                waypoint = %self.current_waypoint().name,
                direction = ?self.cursor.direction,
                "waypoint reached"
            );
        }

        let goal = self.current_waypoint().position;
        ctx.body.move_toward(goal, ctx.dt);
        ctx.body.rotate_toward(goal, ctx.dt);
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
    use crate::ai::FollowTargetState;
    use crate::fsm::StateMachine;

    fn route() -> Arc<Path> {
        Arc::new(
            Path::from_positions(
                "route",
                &[
                    Vec3::new(0.0, 0.0, 0.0),
                    Vec3::new(10.0, 0.0, 0.0),
                    Vec3::new(20.0, 0.0, 0.0),
                ],
                false,
            )
            .unwrap(),
        )
    }

    fn patrol() -> PatrolState {
        PatrolState::new(
            route(),
            Direction::Forward,
            TransitionSet::of(&[AiStateType::FollowTarget]),
        )
    }

    fn machine() -> StateMachine {
        StateMachine::builder(AiStateType::Patrol)
            .with_state(patrol())
            .with_state(FollowTargetState::new(TransitionSet::of(&[AiStateType::Patrol])))
            .build()
            .unwrap()
    }

    fn cursor(fsm: &StateMachine) -> RouteCursor {
        fsm.state::<PatrolState>(AiStateType::Patrol).unwrap().cursor()
    }

    #[test]
    fn activation_anchors_to_closest_waypoint() {
        let mut state = patrol();
        let mut harness = Harness::at(Vec3::new(18.0, 0.0, 1.0));
        state.on_activate(&mut harness.ctx());
        assert_eq!(state.cursor().index, 2);
        assert_eq!(state.current_waypoint().name, "route#2");
    }

    #[test]
    fn reaching_a_waypoint_advances_forward() {
        let mut fsm = machine();
        let mut harness = Harness::at(Vec3::new(9.0, 0.0, 0.0)).with_detect_radius(5.0);

        assert_eq!(fsm.tick(&mut harness.ctx()).unwrap(), None);
        assert_eq!(cursor(&fsm), RouteCursor::new(2, Direction::Forward));
        assert_eq!(harness.body.moved_toward, vec![Vec3::new(20.0, 0.0, 0.0)]);
        assert_eq!(harness.body.rotated_toward, vec![Vec3::new(20.0, 0.0, 0.0)]);
    }

    #[test]
    fn reaching_the_last_waypoint_turns_back() {
        let mut fsm = machine();
        let mut harness = Harness::at(Vec3::new(20.0, 0.0, 0.0)).with_detect_radius(5.0);

        fsm.tick(&mut harness.ctx()).unwrap();
        assert_eq!(cursor(&fsm), RouteCursor::new(1, Direction::Backward));
        assert_eq!(harness.body.moved_toward, vec![Vec3::new(10.0, 0.0, 0.0)]);
    }

    #[test]
    fn far_from_waypoint_keeps_heading_there() {
        let mut fsm = machine();
        let mut harness = Harness::at(Vec3::new(3.0, 0.0, 8.0)).with_detect_radius(2.0);

        fsm.tick(&mut harness.ctx()).unwrap();
        assert_eq!(cursor(&fsm).index, 0);
        assert_eq!(harness.body.moved_toward, vec![Vec3::ZERO]);
    }

    #[test]
    fn arrive_radius_is_independent_of_detection() {
        let mut fsm = machine();
        let mut harness = Harness::at(Vec3::new(9.0, 0.0, 0.0)).with_detect_radius(5.0);
        harness.unit.arrive_radius = 0.5;

        fsm.tick(&mut harness.ctx()).unwrap();
        assert_eq!(cursor(&fsm).index, 1);
    }

    #[test]
    fn single_waypoint_route_holds_position() {
        let post = Arc::new(Path::from_positions("post", &[Vec3::new(1.0, 0.0, 0.0)], false).unwrap());
        let mut fsm = StateMachine::builder(AiStateType::Patrol)
            .with_state(PatrolState::new(post, Direction::Forward, TransitionSet::EMPTY))
            .build()
            .unwrap();
        let mut harness = Harness::at(Vec3::ZERO).with_detect_radius(5.0);

        for _ in 0..3 {
            fsm.tick(&mut harness.ctx()).unwrap();
        }
        assert_eq!(cursor(&fsm), RouteCursor::new(0, Direction::Forward));
    }

    #[test]
    fn sensed_target_preempts_route_advance() {
        let mut fsm = machine();
        let mut harness = Harness::at(Vec3::new(9.0, 0.0, 0.0)).with_detect_radius(5.0);
        fsm.tick(&mut harness.ctx()).unwrap();
        harness.body.moved_toward.clear();
        let before = cursor(&fsm);

        let player = harness.add_target(Vec3::new(12.0, 0.0, 0.0));
        let switched = fsm.tick(&mut harness.ctx()).unwrap();

        assert_eq!(switched, Some(AiStateType::FollowTarget));
        assert_eq!(harness.unit.target, Some(player));
        assert_eq!(cursor(&fsm), before);
        assert!(harness.body.moved_toward.is_empty());
    }

    #[test]
    fn rejected_chase_keeps_patrolling() {
        let mut fsm = StateMachine::builder(AiStateType::Patrol)
            .with_state(PatrolState::new(route(), Direction::Forward, TransitionSet::EMPTY))
            .build()
            .unwrap();
        let mut harness = Harness::at(Vec3::new(9.0, 0.0, 0.0)).with_detect_radius(5.0);
        harness.add_target(Vec3::new(12.0, 0.0, 0.0));

        assert_eq!(fsm.tick(&mut harness.ctx()).unwrap(), None);
        assert!(fsm.is_in(AiStateType::Patrol));
        assert_eq!(cursor(&fsm).index, 2);
        assert_eq!(harness.body.moved_toward.len(), 1);
    }

    #[test]
    fn reentry_anchors_to_current_position() {
        let mut fsm = machine();
        let mut harness = Harness::at(Vec3::new(1.0, 0.0, 0.0)).with_detect_radius(2.0);
        fsm.tick(&mut harness.ctx()).unwrap();
        assert_eq!(cursor(&fsm).index, 1);

        let chase = fsm
            .request_transition(AiStateType::FollowTarget, &mut harness.ctx())
            .unwrap();
        assert!(chase.is_accepted());
        harness.body.position = Vec3::new(19.0, 0.0, 0.0);
        let back = fsm
            .request_transition(AiStateType::Patrol, &mut harness.ctx())
            .unwrap();

        assert!(back.is_accepted());
        assert_eq!(cursor(&fsm).index, 2);
    }
}
