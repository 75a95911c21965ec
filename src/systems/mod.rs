mod ai;
mod death;
mod motion;
mod transform;

pub use ai::{ai_system, StateChange};
pub use death::death_system;
pub use motion::{kinematic_step, Kinematic};
pub use transform::transform_propagation_system;
