use std::any::Any;

use tracing::trace;

use super::{sense_target, AiContext};
use crate::fsm::{AiState, AiStateType, TransitionGate, TransitionSet};

/// Stands guard in place and pursues anything that comes into range.
pub struct IdleState {
    transitions: TransitionSet,
}

impl IdleState {
    pub fn new(transitions: TransitionSet) -> Self {
        Self { transitions }
    }
}

impl AiState for IdleState {
    fn kind(&self) -> AiStateType {
        AiStateType::Idle
    }

    fn transitions(&self) -> TransitionSet {
        self.transitions
    }

    fn update(&mut self, ctx: &mut AiContext<'_>, gate: &mut TransitionGate) {
        if let Some(target) = sense_target(ctx) {
            ctx.unit.target = Some(target);
            if gate.request(AiStateType::FollowTarget).is_accepted() {
                return;
            }
            trace!(unit = ?ctx.entity, ?target, "holding position, pursuit not allowed");
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
