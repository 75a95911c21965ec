use hecs::{Entity, World};
use tracing::{info, warn};

use crate::ai::AiContext;
use crate::components::{subtree, AiController, AiUnit, Health, LocalTransform, Mover, Role, UnitDied, UnitName};
use crate::sensor::SpatialIndex;

use super::motion::Kinematic;

/// Remove every unit whose health has run out.
///
/// AI units get their state machine shut down first, so the active state's
/// deactivation hook runs against an empty sensor. The unit and all of its
/// children are then despawned, which also drops their colliders from the
/// next spatial index snapshot.
pub fn death_system(world: &mut World) -> Vec<UnitDied> {
    let dead: Vec<(Entity, Role, Option<String>)> = world
        .query::<(&Health, &Role, Option<&UnitName>)>()
        .iter()
        .filter(|(_, (health, _, _))| !health.is_alive())
        .map(|(entity, (_, role, name))| (entity, *role, name.map(|n| n.0.clone())))
        .collect();

    let detached = SpatialIndex::default();
    let mut events = Vec::with_capacity(dead.len());

    for (entity, role, name) in dead {
        if let Ok((local, unit, fsm, mover)) = world.query_one_mut::<(
            &mut LocalTransform,
            &mut AiUnit,
            &mut AiController,
            &Mover,
        )>(entity)
        {
            let mut body = Kinematic::new(local, mover);
            let mut ctx = AiContext {
                entity,
                unit,
                body: &mut body,
                sensor: &detached,
                tracker: &detached,
                dt: 0.0,
            };
            fsm.shutdown(&mut ctx);
        }

        for part in subtree(world, entity) {
            if let Err(err) = world.despawn(part) {
                warn!(unit = ?entity, ?part, %err, "teardown could not despawn part");
            }
        }

        info!(unit = ?entity, name = name.as_deref().unwrap_or("-"), ?role, "unit died");
        events.push(UnitDied { entity, name, role });
    }

    events
}
