use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};
use hecs::World;

use crate::ai::Locomotion;
use crate::components::{AiController, LocalTransform, Mover, Velocity};

/// Direct kinematic motion for AI units: no physics, no overshoot.
/// Turning is yaw-only so units stay upright.
pub struct Kinematic<'a> {
    transform: &'a mut LocalTransform,
    mover: &'a Mover,
}

impl<'a> Kinematic<'a> {
    pub fn new(transform: &'a mut LocalTransform, mover: &'a Mover) -> Self {
        Self { transform, mover }
    }
}

/// Yaw that turns -Z onto `dir` (XZ plane).
fn yaw_of(dir: Vec3) -> f32 {
    (-dir.x).atan2(-dir.z)
}

impl Locomotion for Kinematic<'_> {
    fn position(&self) -> Vec3 {
        self.transform.position
    }

    fn move_toward(&mut self, point: Vec3, dt: f32) {
        let to = point - self.transform.position;
        let dist = to.length();
        let step = self.mover.speed * dt;
        if dist <= step {
            self.transform.position = point;
        } else {
            self.transform.position += to / dist * step;
        }
    }

    fn rotate_toward(&mut self, point: Vec3, dt: f32) {
        let to = point - self.transform.position;
        let flat = Vec3::new(to.x, 0.0, to.z);
        if flat.length_squared() < 1e-8 {
            return;
        }

        let current = yaw_of(self.transform.forward());
        let mut delta = (yaw_of(flat) - current) % TAU;
        if delta > PI {
            delta -= TAU;
        } else if delta < -PI {
            delta += TAU;
        }
        let step = self.mover.turn_speed * dt;
        self.transform.rotation = Quat::from_rotation_y(current + delta.clamp(-step, step));
    }
}

/// Integrate velocity for units that aren't steered by an AI controller.
pub fn kinematic_step(world: &mut World, dt: f32) {
    for (_entity, (local, vel, controller)) in
        world.query_mut::<(&mut LocalTransform, &Velocity, Option<&AiController>)>()
    {
        if controller.is_some() {
            continue;
        }
        local.position += vel.0 * dt;
    }
}
