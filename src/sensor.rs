use std::collections::HashMap;

use glam::Vec3;
use hecs::{Entity, World};

use crate::components::{find_root, Collider, GlobalTransform};

/// Collision category an entity's collider belongs to. Sensor queries filter
/// on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Player,
    Enemy,
    Collectable,
}

impl Layer {
    pub fn mask(self) -> LayerMask {
        LayerMask(1 << (self as u32))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    pub fn of(layers: &[Layer]) -> Self {
        layers.iter().fold(Self::NONE, |mask, &layer| mask.with(layer))
    }

    pub fn with(self, layer: Layer) -> Self {
        Self(self.0 | layer.mask().0)
    }

    pub fn contains(self, layer: Layer) -> bool {
        self.0 & layer.mask().0 != 0
    }
}

/// One collider overlapping a query sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorHit {
    /// The entity carrying the collider.
    pub collider: Entity,
    /// Root of the collider's parent chain: the game unit it belongs to.
    pub owner: Entity,
}

/// "Which colliders on these layers overlap this sphere?"
///
/// Results follow the index's own order. Callers treat the first hit as any
/// hit. An empty result is a normal outcome.
pub trait ProximitySensor {
    fn query(&self, position: Vec3, radius: f32, mask: LayerMask) -> Vec<SensorHit>;
}

/// Resolves where a previously sensed entity is now.
pub trait TargetTracker {
    fn locate(&self, entity: Entity) -> Option<Vec3>;
}

struct Proxy {
    collider: Entity,
    owner: Entity,
    layer: Layer,
    center: Vec3,
    shape: Collider,
}

/// Point-in-time snapshot of every collider in the world, rebuilt once per
/// tick. Queries are brute force over the snapshot.
#[derive(Default)]
pub struct SpatialIndex {
    proxies: Vec<Proxy>,
    positions: HashMap<Entity, Vec3>,
}

impl SpatialIndex {
    /// Snapshot entities with `GlobalTransform + Collider + Layer`. Run after
    /// transform propagation so world positions are current.
    pub fn build(world: &World) -> Self {
        let positions = world
            .query::<&GlobalTransform>()
            .iter()
            .map(|(entity, global)| (entity, global.translation()))
            .collect();

        let proxies = world
            .query::<(&GlobalTransform, &Collider, &Layer)>()
            .iter()
            .map(|(entity, (global, collider, layer))| Proxy {
                collider: entity,
                owner: find_root(world, entity),
                layer: *layer,
                center: global.translation(),
                shape: *collider,
            })
            .collect();

        Self { proxies, positions }
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

impl ProximitySensor for SpatialIndex {
    fn query(&self, position: Vec3, radius: f32, mask: LayerMask) -> Vec<SensorHit> {
        self.proxies
            .iter()
            .filter(|p| mask.contains(p.layer))
            .filter(|p| overlaps_sphere(p, position, radius))
            .map(|p| SensorHit {
                collider: p.collider,
                owner: p.owner,
            })
            .collect()
    }
}

impl TargetTracker for SpatialIndex {
    fn locate(&self, entity: Entity) -> Option<Vec3> {
        self.positions.get(&entity).copied()
    }
}

fn closest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Touching counts as overlapping.
fn overlaps_sphere(proxy: &Proxy, center: Vec3, radius: f32) -> bool {
    match proxy.shape {
        Collider::Sphere { radius: r } => {
            let reach = radius + r;
            proxy.center.distance_squared(center) <= reach * reach
        }
        Collider::Capsule { radius: r, height } => {
            let half = Vec3::Y * (height * 0.5);
            let closest = closest_point_on_segment(proxy.center - half, proxy.center + half, center);
            let reach = radius + r;
            closest.distance_squared(center) <= reach * reach
        }
        Collider::Box { half_extents } => {
            let closest = center.clamp(proxy.center - half_extents, proxy.center + half_extents);
            closest.distance_squared(center) <= radius * radius
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{add_child, LocalTransform};
    use crate::systems::transform_propagation_system;

    fn spawn_collider(world: &mut World, at: Vec3, collider: Collider, layer: Layer) -> Entity {
        world.spawn((
            LocalTransform::new(at),
            GlobalTransform::default(),
            collider,
            layer,
        ))
    }

    fn snapshot(world: &mut World) -> SpatialIndex {
        transform_propagation_system(world);
        SpatialIndex::build(world)
    }

    #[test]
    fn miss_is_empty() {
        let mut world = World::new();
        spawn_collider(&mut world, Vec3::new(50.0, 0.0, 0.0), Collider::Sphere { radius: 1.0 }, Layer::Player);
        let index = snapshot(&mut world);
        assert!(index.query(Vec3::ZERO, 5.0, Layer::Player.mask()).is_empty());
    }

    #[test]
    fn sphere_overlap_includes_collider_radius() {
        let mut world = World::new();
        let e = spawn_collider(&mut world, Vec3::new(5.5, 0.0, 0.0), Collider::Sphere { radius: 0.5 }, Layer::Player);
        let index = snapshot(&mut world);
        let hits = index.query(Vec3::ZERO, 5.0, Layer::Player.mask());
        assert_eq!(hits, vec![SensorHit { collider: e, owner: e }]);
    }

    #[test]
    fn mask_filters_layers() {
        let mut world = World::new();
        spawn_collider(&mut world, Vec3::X, Collider::Sphere { radius: 0.5 }, Layer::Enemy);
        let player = spawn_collider(&mut world, Vec3::Z, Collider::Sphere { radius: 0.5 }, Layer::Player);
        let index = snapshot(&mut world);

        let hits = index.query(Vec3::ZERO, 5.0, Layer::Player.mask());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].owner, player);
        assert_eq!(index.query(Vec3::ZERO, 5.0, LayerMask::ALL).len(), 2);
        assert!(index.query(Vec3::ZERO, 5.0, LayerMask::NONE).is_empty());
    }

    #[test]
    fn capsule_and_box_overlaps() {
        let mut world = World::new();
        spawn_collider(
            &mut world,
            Vec3::new(0.0, 4.0, 3.0),
            Collider::Capsule { radius: 0.5, height: 8.0 },
            Layer::Player,
        );
        spawn_collider(
            &mut world,
            Vec3::new(-4.0, 0.0, 0.0),
            Collider::Box { half_extents: Vec3::splat(1.0) },
            Layer::Player,
        );
        let index = snapshot(&mut world);

        // Capsule segment runs from y=0 to y=8; the near side is 2.5 away.
        assert_eq!(index.query(Vec3::ZERO, 2.5, Layer::Player.mask()).len(), 1);
        // Box face at x=-3.
        assert_eq!(index.query(Vec3::ZERO, 3.0, Layer::Player.mask()).len(), 2);
        assert!(index.query(Vec3::ZERO, 2.0, Layer::Player.mask()).is_empty());
    }

    #[test]
    fn hits_resolve_to_owning_unit() {
        let mut world = World::new();
        let tank = world.spawn((LocalTransform::new(Vec3::new(3.0, 0.0, 0.0)), GlobalTransform::default()));
        let hull = spawn_collider(&mut world, Vec3::Y, Collider::Sphere { radius: 0.5 }, Layer::Player);
        add_child(&mut world, tank, hull).unwrap();
        let index = snapshot(&mut world);

        let hits = index.query(Vec3::ZERO, 5.0, Layer::Player.mask());
        assert_eq!(hits, vec![SensorHit { collider: hull, owner: tank }]);
        // The child sits one unit above its parent in world space.
        assert_eq!(index.locate(hull), Some(Vec3::new(3.0, 1.0, 0.0)));
        assert_eq!(index.locate(tank), Some(Vec3::new(3.0, 0.0, 0.0)));
    }
}
