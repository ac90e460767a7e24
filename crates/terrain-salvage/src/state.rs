//! Salvage attempt state machine

use serde::Serialize;

use crate::error::SalvageError;

/// State of one salvage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalvageState {
    /// Original Map bytes captured, nothing run yet
    Start,
    /// Effector ran in apply mode
    EffectApplied,
    /// Both steps succeeded; mutation kept
    ValidatedOk,
    /// A step failed
    ValidatedFail,
    /// Map restored to its original bytes
    Reverted,
    /// Attempt evidence persisted
    Quarantined,
}

impl SalvageState {
    /// States reachable in one step from `self`
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [SalvageState] {
        use SalvageState::{EffectApplied, Quarantined, Reverted, Start, ValidatedFail, ValidatedOk};
        match self {
            Start => &[EffectApplied],
            EffectApplied => &[ValidatedOk, ValidatedFail],
            ValidatedFail => &[Reverted],
            Reverted => &[Quarantined],
            ValidatedOk | Quarantined => &[],
        }
    }

    /// Whether no further transition is possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

/// Current state plus the path taken to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StateTrail {
    states: Vec<SalvageState>,
}

impl StateTrail {
    pub(crate) fn new() -> Self {
        Self {
            states: vec![SalvageState::Start],
        }
    }

    pub(crate) fn current(&self) -> SalvageState {
        self.states
            .last()
            .copied()
            .unwrap_or(SalvageState::Start)
    }

    pub(crate) fn advance(&mut self, to: SalvageState) -> Result<(), SalvageError> {
        let from = self.current();
        if !from.allowed_transitions().contains(&to) {
            return Err(SalvageError::IllegalTransition { from, to });
        }
        tracing::debug!("salvage {:?} -> {:?}", from, to);
        self.states.push(to);
        Ok(())
    }

    pub(crate) fn into_states(self) -> Vec<SalvageState> {
        self.states
    }
}
