use glam::Vec3;

use crate::error::AiError;

/// A single authored point on a patrol route.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub name: String,
    pub position: Vec3,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

/// Which way a unit is walking its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Per-unit traversal state: the waypoint being headed for and the
/// direction the route is being walked in. Never shared between units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteCursor {
    pub index: usize,
    pub direction: Direction,
}

impl RouteCursor {
    pub fn new(index: usize, direction: Direction) -> Self {
        Self { index, direction }
    }
}

/// An ordered, read-only route of waypoints.
///
/// Open routes are walked ping-pong: running off either end reverses the
/// direction. Closed routes wrap around and never reverse.
#[derive(Debug, Clone)]
pub struct Path {
    name: String,
    waypoints: Vec<Waypoint>,
    closed: bool,
}

impl Path {
    /// Fails with [`AiError::EmptyPath`] when `waypoints` is empty.
    pub fn new(
        name: impl Into<String>,
        waypoints: Vec<Waypoint>,
        closed: bool,
    ) -> Result<Self, AiError> {
        let name = name.into();
        if waypoints.is_empty() {
            return Err(AiError::EmptyPath { name });
        }
        Ok(Self {
            name,
            waypoints,
            closed,
        })
    }

    /// Build a path from bare positions, naming waypoints `<path>#<index>`.
    pub fn from_positions(
        name: impl Into<String>,
        positions: &[Vec3],
        closed: bool,
    ) -> Result<Self, AiError> {
        let name = name.into();
        let waypoints = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| Waypoint::new(format!("{name}#{i}"), p))
            .collect();
        Self::new(name, waypoints, closed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Panics if `index` is out of range; cursors only ever hold indices
    /// produced by this path.
    pub fn waypoint(&self, index: usize) -> &Waypoint {
        &self.waypoints[index]
    }

    /// Index of the waypoint nearest to `position`. Ties go to the lowest index.
    pub fn closest_waypoint(&self, position: Vec3) -> usize {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (i, wp) in self.waypoints.iter().enumerate() {
            let d = wp.position.distance_squared(position);
            // Strict comparison keeps the earliest index on ties.
            if d < best_dist {
                best = i;
                best_dist = d;
            }
        }
        best
    }

    /// The waypoint after `index` when walking in `direction`, together with
    /// the direction to keep walking in.
    pub fn next_waypoint(&self, index: usize, direction: Direction) -> (usize, Direction) {
        let len = self.waypoints.len();
        if len == 1 {
            return (index, direction);
        }

        if self.closed {
            let next = match direction {
                Direction::Forward => (index + 1) % len,
                Direction::Backward => (index + len - 1) % len,
            };
            return (next, direction);
        }

        match direction {
            Direction::Forward if index + 1 < len => (index + 1, direction),
            Direction::Forward => (index - 1, Direction::Backward),
            Direction::Backward if index > 0 => (index - 1, direction),
            Direction::Backward => (index + 1, Direction::Forward),
        }
    }

    pub fn advance(&self, cursor: RouteCursor) -> RouteCursor {
        let (index, direction) = self.next_waypoint(cursor.index, cursor.direction);
        RouteCursor { index, direction }
    }
}
