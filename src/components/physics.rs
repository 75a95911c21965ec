use glam::Vec3;

/// Linear velocity in world space. Drives units that have no AI controller.
#[derive(Debug, Clone, Copy)]
pub struct Velocity(pub Vec3);

/// Collision shape attached to an entity. Sensor queries overlap against it.
#[derive(Debug, Clone, Copy)]
pub enum Collider {
    Sphere { radius: f32 },
    Capsule { radius: f32, height: f32 },
    /// Axis-aligned; entity rotation is ignored.
    Box { half_extents: Vec3 },
}
