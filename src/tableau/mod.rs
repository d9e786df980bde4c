pub mod solver;

use std::hash::Hash;
use std::time::Duration;

use thiserror::Error;

use crate::store::Assignment;

pub use solver::{Goals, Tableau, solve, solve_goals};

/// Result of a completed search. `Unsatisfiable` is an ordinary answer.
#[derive(Debug, Clone)]
pub enum Outcome<V> {
    Satisfiable(Assignment<V>),
    Unsatisfiable,
}

impl<V> Outcome<V> {
    pub fn is_sat(&self) -> bool {
        matches!(self, Outcome::Satisfiable(_))
    }

    pub fn assignment(&self) -> Option<&Assignment<V>> {
        match self {
            Outcome::Satisfiable(a) => Some(a),
            Outcome::Unsatisfiable => None,
        }
    }

    pub fn into_assignment(self) -> Option<Assignment<V>> {
        match self {
            Outcome::Satisfiable(a) => Some(a),
            Outcome::Unsatisfiable => None,
        }
    }
}

impl<V: Eq + Hash> PartialEq for Outcome<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Outcome::Satisfiable(a), Outcome::Satisfiable(b)) => a == b,
            (Outcome::Unsatisfiable, Outcome::Unsatisfiable) => true,
            _ => false,
        }
    }
}

impl<V: Eq + Hash> Eq for Outcome<V> {}

/// Optional bounds on a single search. The default is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveOptions {
    pub max_depth: Option<usize>,
    pub timeout: Option<Duration>,
}

/// Reported when a bound from `SolveOptions` stops the search early.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("search exceeded depth limit of {limit}")]
    DepthLimit { limit: usize },
    #[error("search timed out after {after:?}")]
    Timeout { after: Duration },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// expansion steps, one per recursive call
    pub steps: usize,
    /// `Or` goals expanded
    pub branches: usize,
    pub conflicts: usize,
    /// literal goals that added a new binding
    pub assignments: usize,
    pub max_depth: usize,
}
