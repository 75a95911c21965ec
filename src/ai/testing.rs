//! In-memory collaborators for exercising states without a `hecs::World`
//! full of colliders.

use glam::Vec3;
use hecs::{Entity, World};

use super::{AiContext, Locomotion};
use crate::components::AiUnit;
use crate::sensor::{LayerMask, ProximitySensor, SensorHit, TargetTracker};

/// Records motion requests instead of applying them.
#[derive(Default)]
pub struct FakeBody {
    pub position: Vec3,
    pub moved_toward: Vec<Vec3>,
    pub rotated_toward: Vec<Vec3>,
}

impl Locomotion for FakeBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn move_toward(&mut self, point: Vec3, _dt: f32) {
        self.moved_toward.push(point);
    }

    fn rotate_toward(&mut self, point: Vec3, _dt: f32) {
        self.rotated_toward.push(point);
    }
}

/// Point targets; ignores layers.
#[derive(Default)]
pub struct FakeSensor {
    pub targets: Vec<(Entity, Vec3)>,
}

impl ProximitySensor for FakeSensor {
    fn query(&self, position: Vec3, radius: f32, mask: LayerMask) -> Vec<SensorHit> {
        if mask == LayerMask::NONE {
            return Vec::new();
        }
        self.targets
            .iter()
            .filter(|(_, p)| p.distance(position) <= radius)
            .map(|&(entity, _)| SensorHit {
                collider: entity,
                owner: entity,
            })
            .collect()
    }
}

impl TargetTracker for FakeSensor {
    fn locate(&self, entity: Entity) -> Option<Vec3> {
        self.targets
            .iter()
            .find(|(e, _)| *e == entity)
            .map(|&(_, p)| p)
    }
}

pub struct Harness {
    world: World,
    pub entity: Entity,
    pub unit: AiUnit,
    pub body: FakeBody,
    pub sensor: FakeSensor,
    pub dt: f32,
}

impl Harness {
    pub fn new() -> Self {
        Self::at(Vec3::ZERO)
    }

    pub fn at(position: Vec3) -> Self {
        let mut world = World::new();
        let entity = world.spawn(());
        Self {
            world,
            entity,
            unit: AiUnit::new(5.0),
            body: FakeBody {
                position,
                ..FakeBody::default()
            },
            sensor: FakeSensor::default(),
            dt: 1.0 / 60.0,
        }
    }

    pub fn with_detect_radius(mut self, radius: f32) -> Self {
        self.unit = AiUnit::new(radius);
        self
    }

    /// Place a sensable entity and return it.
    pub fn add_target(&mut self, position: Vec3) -> Entity {
        let entity = self.world.spawn(());
        self.sensor.targets.push((entity, position));
        entity
    }

    pub fn move_target(&mut self, entity: Entity, position: Vec3) {
        if let Some(slot) = self.sensor.targets.iter_mut().find(|(e, _)| *e == entity) {
            slot.1 = position;
        }
    }

    pub fn remove_target(&mut self, entity: Entity) {
        self.sensor.targets.retain(|(e, _)| *e != entity);
    }

    pub fn ctx(&mut self) -> AiContext<'_> {
        AiContext {
            entity: self.entity,
            unit: &mut self.unit,
            body: &mut self.body,
            sensor: &self.sensor,
            tracker: &self.sensor,
            dt: self.dt,
        }
    }
}
