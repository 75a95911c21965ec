use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use hecs::{Entity, World};

use crate::ai::{default_transitions, FollowTargetState, IdleState, PatrolState};
use crate::components::*;
use crate::config::UnitConfig;
use crate::error::AiError;
use crate::fsm::{AiStateType, StateMachine, TransitionSet};
use crate::navigation::Path;

/// Hull collider sits slightly above the unit's origin, like a turret ring.
const HULL_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 0.0);

// ---------------------------------------------------------------------------
// Shared body: root transform + hull collider child
// ---------------------------------------------------------------------------

/// Spawn the root entity and attach a sphere hull on the role's sensor layer.
/// Sensor hits on the hull resolve back to the root through `Parent`.
fn spawn_body(world: &mut World, cfg: &UnitConfig) -> Result<Entity, AiError> {
    let root = world.spawn((
        LocalTransform::new(cfg.position()),
        GlobalTransform::default(),
        cfg.role,
        UnitName(cfg.name.clone()),
        Health::new(cfg.health),
    ));

    let hull = world.spawn((
        LocalTransform::new(HULL_OFFSET),
        GlobalTransform::default(),
        Collider::Sphere {
            radius: cfg.collider_radius,
        },
        cfg.role.layer(),
    ));
    add_child(world, root, hull)?;

    Ok(root)
}

// ---------------------------------------------------------------------------
// Prefabs
// ---------------------------------------------------------------------------

/// A unit driven from outside the AI: it drifts at its configured velocity,
/// or sits still.
pub fn spawn_player(world: &mut World, cfg: &UnitConfig) -> Result<Entity, AiError> {
    let entity = spawn_body(world, cfg)?;
    if let Some(velocity) = cfg.velocity {
        world.insert_one(entity, Velocity(Vec3::from(velocity)))?;
    }
    Ok(entity)
}

/// An AI unit. Patrols `path` when it has one, otherwise stands guard.
/// Either way it chases whatever it detects on the opposing layer.
pub fn spawn_patroller(
    world: &mut World,
    cfg: &UnitConfig,
    path: Option<Arc<Path>>,
) -> Result<Entity, AiError> {
    let controller = build_controller(cfg, path)?;

    let mut unit = AiUnit::new(cfg.detect_radius);
    if let Some(radius) = cfg.arrive_radius {
        unit = unit.with_arrive_radius(radius);
    }
    if let Some(radius) = cfg.lose_radius {
        unit = unit.with_lose_radius(radius);
    }
    if let Some(distance) = cfg.stop_distance {
        unit = unit.with_stop_distance(distance);
    }
    let opposing = match cfg.role {
        Role::Player => Role::Enemy,
        Role::Enemy => Role::Player,
    };
    unit = unit.with_target_mask(opposing.layer().mask());

    let entity = spawn_body(world, cfg)?;
    world.insert(
        entity,
        (
            unit,
            Mover {
                speed: cfg.speed,
                turn_speed: cfg.turn_speed,
            },
            controller,
        ),
    )?;
    Ok(entity)
}

/// Assemble a unit's state machine from its config.
///
/// Idle and FollowTarget are always registered; Patrol only when there is a
/// route to walk. An authored transition table replaces the defaults
/// wholesale, and the builder rejects any edge into an unregistered state.
pub fn build_controller(cfg: &UnitConfig, path: Option<Arc<Path>>) -> Result<AiController, AiError> {
    let initial = cfg.initial_state.unwrap_or(if path.is_some() {
        AiStateType::Patrol
    } else {
        AiStateType::Idle
    });
    if initial == AiStateType::Patrol && path.is_none() {
        return Err(AiError::MissingPath {
            unit: cfg.name.clone(),
        });
    }

    let table: HashMap<AiStateType, TransitionSet> = match &cfg.transitions {
        Some(authored) => authored
            .iter()
            .map(|(from, to)| (*from, to.iter().copied().collect()))
            .collect(),
        None => default_transitions(path.is_some()),
    };
    let edges = |kind: AiStateType| table.get(&kind).copied().unwrap_or_default();

    let mut builder = StateMachine::builder(initial)
        .with_state(IdleState::new(edges(AiStateType::Idle)))
        .with_state(FollowTargetState::new(edges(AiStateType::FollowTarget)));
    if let Some(path) = path {
        builder = builder.with_state(PatrolState::new(
            path,
            cfg.direction,
            edges(AiStateType::Patrol),
        ));
    }
    builder.build()
}
