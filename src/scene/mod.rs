pub mod prefabs;
pub mod scenario;

pub use scenario::{default_scenario, load_scenario, Scene};
