use std::collections::BTreeMap;
use std::time::Duration;

use glam::Vec3;
use hecs::{Entity, World};
use tracing::{debug, info};

use crate::components::{AiController, Health, LocalTransform, UnitDied, UnitName};
use crate::config::ScenarioConfig;
use crate::engine::time::{FixedStep, FrameTimer};
use crate::error::AiError;
use crate::fsm::AiStateType;
use crate::scene::{load_scenario, Scene};
use crate::sensor::SpatialIndex;
use crate::systems::{
    ai_system, death_system, kinematic_step, transform_propagation_system, StateChange,
};

/// Realtime runs never simulate more than this many steps per frame.
const MAX_STEPS_PER_FRAME: u32 = 8;

/// What happened during one simulation tick.
#[derive(Debug, Default)]
pub struct TickReport {
    pub tick: u64,
    pub changes: Vec<StateChange>,
    pub deaths: Vec<UnitDied>,
}

/// Running totals over a whole run.
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub ticks: u64,
    pub transitions: usize,
    pub deaths: usize,
    /// Accepted transitions by destination state.
    pub entered: BTreeMap<AiStateType, usize>,
}

/// Owns the world and steps every system in order at a fixed `dt`.
pub struct SimulationApp {
    world: World,
    scene: Scene,
    dt: f32,
    tick: u64,
    stats: RunStats,
}

impl SimulationApp {
    pub fn new(config: &ScenarioConfig) -> Result<Self, AiError> {
        let mut world = World::new();
        let scene = load_scenario(&mut world, config)?;
        Ok(Self {
            world,
            scene,
            dt: config.simulation.dt,
            tick: 0,
            stats: RunStats::default(),
        })
    }

    /// One fixed step: bury the dead, propagate transforms, snapshot
    /// colliders, think, then move. Units killed between steps are gone
    /// before anything can sense them or act on their behalf.
    pub fn step(&mut self) -> TickReport {
        let deaths = death_system(&mut self.world);

        transform_propagation_system(&mut self.world);
        let index = SpatialIndex::build(&self.world);

        let changes = ai_system(&mut self.world, &index, self.dt);
        kinematic_step(&mut self.world, self.dt);

        self.tick += 1;
        for change in &changes {
            info!(
                tick = self.tick,
                unit = self.name_of(change.entity),
                from = ?change.from,
                to = ?change.to,
                "state changed"
            );
            *self.stats.entered.entry(change.to).or_default() += 1;
        }
        self.stats.ticks = self.tick;
        self.stats.transitions += changes.len();
        self.stats.deaths += deaths.len();

        TickReport {
            tick: self.tick,
            changes,
            deaths,
        }
    }

    /// Step `ticks` times as fast as possible.
    pub fn run_fixed(&mut self, ticks: u32) -> &RunStats {
        for _ in 0..ticks {
            self.step();
        }
        self.log_summary();
        &self.stats
    }

    /// Step `ticks` times paced against the wall clock.
    pub fn run_realtime(&mut self, ticks: u32) -> &RunStats {
        let mut timer = FrameTimer::new();
        let mut fixed = FixedStep::new(self.dt, MAX_STEPS_PER_FRAME);
        let target = self.tick + u64::from(ticks);

        while self.tick < target {
            timer.tick();
            let steps = fixed.advance(timer.dt);
            for _ in 0..steps {
                if self.tick >= target {
                    break;
                }
                self.step();
            }
            if steps == 0 {
                std::thread::sleep(Duration::from_secs_f32(fixed.step() / 4.0));
            }
        }
        self.log_summary();
        &self.stats
    }

    /// Returns `false` when `entity` has no health to lose.
    pub fn apply_damage(&mut self, entity: Entity, amount: i32) -> bool {
        match self.world.get::<&mut Health>(entity) {
            Ok(mut health) => {
                health.take_damage(amount);
                debug!(unit = ?entity, amount, left = health.current, "damage applied");
                true
            }
            Err(_) => false,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn position(&self, entity: Entity) -> Option<Vec3> {
        self.world
            .get::<&LocalTransform>(entity)
            .ok()
            .map(|t| t.position)
    }

    pub fn active_state(&self, entity: Entity) -> Option<AiStateType> {
        self.world
            .get::<&AiController>(entity)
            .ok()
            .and_then(|fsm| fsm.active())
    }

    fn name_of(&self, entity: Entity) -> String {
        self.world
            .get::<&UnitName>(entity)
            .map(|n| n.0.clone())
            .unwrap_or_else(|_| format!("{entity:?}"))
    }

    fn log_summary(&self) {
        info!(
            ticks = self.stats.ticks,
            transitions = self.stats.transitions,
            deaths = self.stats.deaths,
            entered = ?self.stats.entered,
            "run finished"
        );
    }
}
