use thiserror::Error;

use hecs::Entity;

use crate::fsm::AiStateType;

/// Setup-time failures. Runtime contention (illegal transitions, sensor
/// misses) is expressed as values, never as one of these.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("no state registered for {0:?}")]
    UnregisteredState(AiStateType),

    #[error("path `{name}` has no waypoints")]
    EmptyPath { name: String },

    #[error("unit `{unit}` references unknown path `{path}`")]
    UnknownPath { unit: String, path: String },

    #[error("unit `{unit}` starts in Patrol but has no path")]
    MissingPath { unit: String },

    #[error("invalid scenario: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("attaching {child:?} under {parent:?} would make a cycle")]
    HierarchyCycle { parent: Entity, child: Entity },

    #[error(transparent)]
    NoSuchEntity(#[from] hecs::NoSuchEntity),

    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),
}
