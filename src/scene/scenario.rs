use std::collections::HashMap;
use std::sync::Arc;

use hecs::{Entity, World};
use tracing::{debug, info};

use crate::components::Role;
use crate::config::ScenarioConfig;
use crate::error::AiError;
use crate::navigation::Path;
use crate::scene::prefabs::{spawn_patroller, spawn_player};

const ARENA: &str = include_str!("../../scenarios/arena.toml");

/// What a loaded scenario put into the world.
pub struct Scene {
    /// Routes by name, shared with every patrol state walking them.
    pub paths: HashMap<String, Arc<Path>>,
    /// Spawned units by name, in config order.
    pub units: Vec<(String, Entity)>,
}

impl Scene {
    pub fn unit(&self, name: &str) -> Option<Entity> {
        self.units
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entity)| *entity)
    }
}

/// The bundled arena: two patrolling sentries, a stationary guard, and a
/// player driving through.
pub fn default_scenario() -> Result<ScenarioConfig, AiError> {
    ScenarioConfig::from_toml_str(ARENA)
}

/// Validate the config, build every path, then spawn every unit. Enemies
/// get an AI controller; players are plain bodies. Bad values are rejected
/// before anything is spawned; a bad path or state reference fails on that
/// unit, leaving whatever was spawned before it in the world.
pub fn load_scenario(world: &mut World, config: &ScenarioConfig) -> Result<Scene, AiError> {
    config.validate()?;

    let mut paths = HashMap::new();
    for path in &config.paths {
        let built = Path::from_positions(path.name.clone(), &path.positions(), path.closed)?;
        debug!(path = %path.name, waypoints = built.len(), closed = path.closed, "path built");
        paths.insert(path.name.clone(), Arc::new(built));
    }

    let mut units = Vec::with_capacity(config.units.len());
    for unit in &config.units {
        let route = match &unit.path {
            Some(name) => Some(paths.get(name).cloned().ok_or_else(|| AiError::UnknownPath {
                unit: unit.name.clone(),
                path: name.clone(),
            })?),
            None => None,
        };

        let entity = match unit.role {
            Role::Enemy => spawn_patroller(world, unit, route)?,
            Role::Player => spawn_player(world, unit)?,
        };
        debug!(unit = %unit.name, ?entity, role = ?unit.role, "unit spawned");
        units.push((unit.name.clone(), entity));
    }

    info!(paths = paths.len(), units = units.len(), "scenario loaded");
    Ok(Scene { paths, units })
}
