//! Patrol and pursuit AI for arena units.
//!
//! Units are `hecs` entities. Each AI unit carries a [`fsm::StateMachine`]
//! whose states ([`ai::IdleState`], [`ai::PatrolState`],
//! [`ai::FollowTargetState`]) sense through a [`sensor::ProximitySensor`],
//! walk shared [`navigation::Path`]s and steer through a
//! [`ai::Locomotion`] primitive. [`app::SimulationApp`] wires the systems
//! together and steps them at a fixed rate.

pub mod ai;
pub mod app;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod fsm;
pub mod navigation;
pub mod scene;
pub mod sensor;
pub mod systems;
