use std::any::Any;
use std::collections::HashMap;

use tracing::{debug, trace};

use crate::ai::AiContext;
use crate::error::AiError;

/// Identifies a behavior mode. The state machine maps each type to exactly
/// one registered state instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiStateType {
    Idle,
    Patrol,
    FollowTarget,
}

impl AiStateType {
    pub const ALL: [AiStateType; 3] = [Self::Idle, Self::Patrol, Self::FollowTarget];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// The states a state is allowed to hand control to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionSet(u8);

impl TransitionSet {
    pub const EMPTY: Self = Self(0);

    pub fn of(types: &[AiStateType]) -> Self {
        types.iter().copied().collect()
    }

    pub fn with(self, kind: AiStateType) -> Self {
        Self(self.0 | kind.bit())
    }

    pub fn contains(self, kind: AiStateType) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = AiStateType> {
        AiStateType::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<AiStateType> for TransitionSet {
    fn from_iter<I: IntoIterator<Item = AiStateType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Outcome of a transition request.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Accepted,
    Rejected,
}

impl Transition {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

/// Handed to the active state for the duration of its `update`.
///
/// Requests are checked against the active state's [`TransitionSet`] on the
/// spot. Once a request is accepted the state must return without acting
/// further; the machine finishes the switch before `tick` returns. Only one
/// request can be accepted per tick.
pub struct TransitionGate {
    from: AiStateType,
    allowed: TransitionSet,
    accepted: Option<AiStateType>,
}

impl TransitionGate {
    fn new(from: AiStateType, allowed: TransitionSet) -> Self {
        Self {
            from,
            allowed,
            accepted: None,
        }
    }

    pub fn request(&mut self, to: AiStateType) -> Transition {
        if self.accepted.is_some() || !self.allowed.contains(to) {
            trace!(from = ?self.from, to = ?to, "transition rejected");
            return Transition::Rejected;
        }
        self.accepted = Some(to);
        Transition::Accepted
    }

    pub fn accepted(&self) -> Option<AiStateType> {
        self.accepted
    }
}

/// A behavior the machine can run.
pub trait AiState: Send + Sync {
    fn kind(&self) -> AiStateType;

    fn transitions(&self) -> TransitionSet;

    /// Called once each time the state becomes active.
    fn on_activate(&mut self, _ctx: &mut AiContext<'_>) {}

    /// Called once each time the state stops being active.
    fn on_deactivate(&mut self, _ctx: &mut AiContext<'_>) {}

    /// Called once per simulation tick while active.
    fn update(&mut self, ctx: &mut AiContext<'_>, gate: &mut TransitionGate);

    fn as_any(&self) -> &dyn Any;
}

/// Per-unit transition authority.
///
/// Owns one instance per [`AiStateType`], keeps exactly one of them active
/// and only switches along edges the active state declares. The machine
/// also tracks the previous state and how long it has been in the current
/// one.
pub struct StateMachine {
    states: HashMap<AiStateType, Box<dyn AiState>>,
    initial: AiStateType,
    active: Option<AiStateType>,
    previous: Option<AiStateType>,
    /// Seconds spent in the current state. Reset to 0.0 on each transition.
    elapsed: f32,
    entered_this_frame: bool,
    halted: bool,
}

impl StateMachine {
    pub fn builder(initial: AiStateType) -> StateMachineBuilder {
        StateMachineBuilder {
            initial,
            states: HashMap::new(),
        }
    }

    /// Run one tick: activate the initial state if nothing is active yet,
    /// update the active state, then perform any transition it requested.
    /// Returns the state switched to, if any.
    pub fn tick(&mut self, ctx: &mut AiContext<'_>) -> Result<Option<AiStateType>, AiError> {
        if self.halted {
            return Ok(None);
        }
        self.entered_this_frame = false;

        let current = match self.active {
            Some(kind) => kind,
            None => {
                self.activate(self.initial, ctx)?;
                self.initial
            }
        };

        let state = self
            .states
            .get_mut(&current)
            .ok_or(AiError::UnregisteredState(current))?;
        let mut gate = TransitionGate::new(current, state.transitions());
        state.update(ctx, &mut gate);
        self.elapsed += ctx.dt;

        match gate.accepted() {
            Some(next) => {
                self.activate(next, ctx)?;
                Ok(Some(next))
            }
            None => Ok(None),
        }
    }

    /// Make `kind` the active state, running the outgoing state's
    /// deactivation hook before the incoming state's activation hook.
    pub fn activate(&mut self, kind: AiStateType, ctx: &mut AiContext<'_>) -> Result<(), AiError> {
        if !self.states.contains_key(&kind) {
            return Err(AiError::UnregisteredState(kind));
        }

        let from = self.active.take();
        if let Some(old) = from {
            if let Some(state) = self.states.get_mut(&old) {
                state.on_deactivate(ctx);
            }
            self.previous = Some(old);
        }

        self.active = Some(kind);
        self.elapsed = 0.0;
        self.entered_this_frame = true;
        self.halted = false;
        if let Some(state) = self.states.get_mut(&kind) {
            state.on_activate(ctx);
        }

        debug!(unit = ?ctx.entity, from = ?from, to = ?kind, "state activated");
        Ok(())
    }

    /// Transition on behalf of the active state. Rejected, with no side
    /// effects, unless the active state declares `kind`.
    pub fn request_transition(
        &mut self,
        kind: AiStateType,
        ctx: &mut AiContext<'_>,
    ) -> Result<Transition, AiError> {
        let allowed = self
            .active
            .and_then(|current| self.states.get(&current))
            .map(|state| state.transitions())
            .unwrap_or_default();

        if !allowed.contains(kind) {
            trace!(unit = ?ctx.entity, from = ?self.active, to = ?kind, "transition rejected");
            return Ok(Transition::Rejected);
        }

        self.activate(kind, ctx)?;
        Ok(Transition::Accepted)
    }

    /// Deactivate the active state and stop ticking. Used when the owning
    /// unit is removed from the simulation.
    pub fn shutdown(&mut self, ctx: &mut AiContext<'_>) {
        if let Some(old) = self.active.take() {
            if let Some(state) = self.states.get_mut(&old) {
                state.on_deactivate(ctx);
            }
            self.previous = Some(old);
            debug!(unit = ?ctx.entity, from = ?old, "state machine shut down");
        }
        self.halted = true;
    }

    pub fn active(&self) -> Option<AiStateType> {
        self.active
    }

    pub fn previous(&self) -> Option<AiStateType> {
        self.previous
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Returns `true` only for the tick in which the current state was entered.
    pub fn just_entered(&self) -> bool {
        self.entered_this_frame
    }

    pub fn is_in(&self, kind: AiStateType) -> bool {
        self.active == Some(kind)
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Borrow the concrete instance registered for `kind`.
    pub fn state<S: AiState + 'static>(&self, kind: AiStateType) -> Option<&S> {
        self.states.get(&kind)?.as_any().downcast_ref::<S>()
    }
}

pub struct StateMachineBuilder {
    initial: AiStateType,
    states: HashMap<AiStateType, Box<dyn AiState>>,
}

impl StateMachineBuilder {
    /// Register a state under its own [`AiState::kind`], replacing any
    /// earlier registration for that type.
    pub fn with_state<S: AiState + 'static>(mut self, state: S) -> Self {
        self.states.insert(state.kind(), Box::new(state));
        self
    }

    /// Fails if the initial state, or any state named in a transition set,
    /// has no registered instance.
    pub fn build(self) -> Result<StateMachine, AiError> {
        if !self.states.contains_key(&self.initial) {
            return Err(AiError::UnregisteredState(self.initial));
        }
        for state in self.states.values() {
            if let Some(missing) = state
                .transitions()
                .iter()
                .find(|kind| !self.states.contains_key(kind))
            {
                return Err(AiError::UnregisteredState(missing));
            }
        }

        Ok(StateMachine {
            states: self.states,
            initial: self.initial,
            active: None,
            previous: None,
            elapsed: 0.0,
            entered_this_frame: false,
            halted: false,
        })
    }
}
