use hecs::{Entity, World};
use tracing::warn;

use crate::ai::AiContext;
use crate::components::{AiController, AiUnit, LocalTransform, Mover};
use crate::fsm::AiStateType;
use crate::sensor::SpatialIndex;

use super::motion::Kinematic;

/// One accepted transition, reported for logging and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub entity: Entity,
    pub from: Option<AiStateType>,
    pub to: AiStateType,
}

/// Tick every AI controller once.
///
/// All units sense against the same `index` snapshot, so a unit that moves
/// earlier in the pass is seen at its old position by later ones. Each unit's
/// controller is borrowed mutably for the whole of its tick; nothing else can
/// switch its state mid-tick.
pub fn ai_system(world: &mut World, index: &SpatialIndex, dt: f32) -> Vec<StateChange> {
    let mut changes = Vec::new();

    for (entity, (local, unit, fsm, mover)) in world.query_mut::<(
        &mut LocalTransform,
        &mut AiUnit,
        &mut AiController,
        &Mover,
    )>() {
        let before = fsm.active();
        let mut body = Kinematic::new(local, mover);
        let mut ctx = AiContext {
            entity,
            unit,
            body: &mut body,
            sensor: index,
            tracker: index,
            dt,
        };

        match fsm.tick(&mut ctx) {
            Ok(Some(to)) => changes.push(StateChange {
                entity,
                from: before.or(fsm.previous()),
                to,
            }),
            Ok(None) => {}
            Err(err) => warn!(unit = ?entity, %err, "ai tick failed"),
        }
    }

    changes
}
