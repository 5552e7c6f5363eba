//! Run phase state machine

use crate::error::MigrationError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Phases of one migration run, in order
///
/// Transitions only move forward by exactly one step. Unit failures during
/// `Dispatching` do not change the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    #[default]
    Init,
    Discovering,
    Indexing,
    Dispatching,
    Packaging,
    Validating,
    Reporting,
    Done,
}

impl RunPhase {
    /// All phases in order
    pub const ALL: [RunPhase; 8] = [
        RunPhase::Init,
        RunPhase::Discovering,
        RunPhase::Indexing,
        RunPhase::Dispatching,
        RunPhase::Packaging,
        RunPhase::Validating,
        RunPhase::Reporting,
        RunPhase::Done,
    ];

    /// The phase after this one
    #[must_use]
    pub fn next(self) -> Option<Self> {
        let idx = Self::ALL.iter().position(|p| *p == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    /// Move to `to`
    ///
    /// # Errors
    /// Returns [`MigrationError::InvalidTransition`] unless `to` is the
    /// immediate successor.
    pub fn advance(&mut self, to: RunPhase) -> Result<(), MigrationError> {
        if self.next() != Some(to) {
            return Err(MigrationError::InvalidTransition { from: *self, to });
        }
        tracing::info!(from = %self, to = %to, "phase");
        *self = to;
        Ok(())
    }

    /// Check if the run has finished
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Done
    }

    /// Lower-case phase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Discovering => "discovering",
            Self::Indexing => "indexing",
            Self::Dispatching => "dispatching",
            Self::Packaging => "packaging",
            Self::Validating => "validating",
            Self::Reporting => "reporting",
            Self::Done => "done",
        }
    }
}

impl Display for RunPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn walks_every_phase_once() {
        let mut phase = RunPhase::default();
        for to in &RunPhase::ALL[1..] {
            phase.advance(*to).unwrap();
        }
        assert!(phase.is_terminal());
        assert!(phase.advance(RunPhase::Done).is_err());
    }

    #[test]
    fn cannot_skip_validation() {
        let mut phase = RunPhase::Packaging;
        assert!(phase.advance(RunPhase::Reporting).is_err());
        assert_eq!(phase, RunPhase::Packaging);
    }

    proptest! {
        #[test]
        fn only_the_successor_is_accepted(from in 0usize..8, to in 0usize..8) {
            let mut phase = RunPhase::ALL[from];
            let accepted = phase.advance(RunPhase::ALL[to]).is_ok();
            prop_assert_eq!(accepted, to == from + 1);
        }
    }
}
