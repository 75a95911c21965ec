mod physics;
mod unit;

pub use physics::{Collider, Velocity};
pub use unit::{AiController, AiUnit, Health, Mover, Role, UnitDied, UnitName};

use glam::{Mat4, Quat, Vec3};
use hecs::{Entity, World};

use crate::error::AiError;

/// Spatial transform with position, rotation, and scale (local space).
#[derive(Debug, Clone, Copy)]
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl LocalTransform {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Unit vector the entity is facing (local -Z).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

/// Computed world-space transform matrix, updated by the propagation system.
#[derive(Debug, Clone, Copy)]
pub struct GlobalTransform(pub Mat4);

impl GlobalTransform {
    pub fn translation(&self) -> Vec3 {
        self.0.w_axis.truncate()
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

/// Points to the parent entity in the transform hierarchy.
pub struct Parent(pub Entity);

/// Lists child entities in the transform hierarchy.
pub struct Children(pub Vec<Entity>);

/// Attach `child` under `parent` in the transform hierarchy. Rejects an
/// entity as its own parent and any attachment under one of its own
/// descendants, so parent chains always end at a root.
pub fn add_child(world: &mut World, parent: Entity, child: Entity) -> Result<(), AiError> {
    if ancestors(world, parent).contains(&child) {
        return Err(AiError::HierarchyCycle { parent, child });
    }

    let attached = match world.get::<&mut Children>(parent) {
        Ok(mut children) => {
            if !children.0.contains(&child) {
                children.0.push(child);
            }
            true
        }
        Err(_) => false,
    };
    if !attached {
        world.insert_one(parent, Children(vec![child]))?;
    }

    world.insert_one(child, Parent(parent))?;
    Ok(())
}

/// `entity` and each of its ancestors, nearest first.
fn ancestors(world: &World, entity: Entity) -> Vec<Entity> {
    let mut chain = vec![entity];
    let mut current = entity;
    while let Ok(parent) = world.get::<&Parent>(current) {
        current = parent.0;
        chain.push(current);
    }
    chain
}

/// Walk up the Parent chain to find the root entity.
pub fn find_root(world: &World, entity: Entity) -> Entity {
    let mut current = entity;
    while let Ok(parent) = world.get::<&Parent>(current) {
        current = parent.0;
    }
    current
}

/// `entity` followed by every descendant, depth first.
pub fn subtree(world: &World, entity: Entity) -> Vec<Entity> {
    let mut out = Vec::new();
    let mut stack = vec![entity];
    while let Some(next) = stack.pop() {
        out.push(next);
        if let Ok(children) = world.get::<&Children>(next) {
            stack.extend(children.0.iter().copied());
        }
    }
    out
}
