use std::fmt;
use std::hash::Hash;
use std::time::Instant;

use log::{debug, trace};

use crate::formula::Formula;
use crate::store::{BindingStore, ConsList};

use super::{Outcome, SolveError, SolveOptions, SolveStats};

/// Outstanding goals, all of which must hold. The head is expanded first.
pub type Goals<'a, V> = ConsList<&'a Formula<V>>;

// how many steps pass between wall-clock checks
const CLOCK_CHECK_INTERVAL: usize = 256;

/// Decides `formula` with an unbounded search.
///
/// `Or` goals try the left side first and only fall back to the right side
/// when the left branch closes, so the model returned for a formula with
/// several models is always the same one. Worst case is exponential in the
/// number of `Or` nodes, and recursion depth grows with formula size.
pub fn solve<V>(formula: &Formula<V>) -> Outcome<V>
where
    V: Clone + Eq + Hash + fmt::Debug,
{
    let goals = Goals::singleton(formula);
    match solve_goals(&goals, &BindingStore::new()) {
        Some(store) => Outcome::Satisfiable(store.to_assignment()),
        None => Outcome::Unsatisfiable,
    }
}

/// Runs the search from an arbitrary worklist and store. Returns the
/// completed store, or `None` when every branch closes.
pub fn solve_goals<V>(goals: &Goals<'_, V>, store: &BindingStore<V>) -> Option<BindingStore<V>>
where
    V: Clone + Eq + fmt::Debug,
{
    let options = SolveOptions::default();
    let mut search = Search::new(&options);
    search.expand(goals, store, 0)
}

/// Bounded search with statistics.
#[derive(Debug, Clone, Default)]
pub struct Tableau {
    options: SolveOptions,
    stats: SolveStats,
}

impl Tableau {
    pub fn new(options: SolveOptions) -> Self {
        Self {
            options,
            stats: SolveStats::default(),
        }
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// Statistics of the most recent `solve` call.
    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    pub fn solve<V>(&mut self, formula: &Formula<V>) -> Result<Outcome<V>, SolveError>
    where
        V: Clone + Eq + Hash + fmt::Debug,
    {
        let mut search = Search::new(&self.options);
        let goals = Goals::singleton(formula);
        let found = search.expand(&goals, &BindingStore::new(), 0);
        self.stats = search.stats;

        if let Some(err) = search.aborted {
            debug!("search aborted: {}", err);
            return Err(err);
        }
        debug!(
            "search finished: sat={} steps={} branches={} conflicts={}",
            found.is_some(),
            self.stats.steps,
            self.stats.branches,
            self.stats.conflicts
        );
        Ok(match found {
            Some(store) => Outcome::Satisfiable(store.to_assignment()),
            None => Outcome::Unsatisfiable,
        })
    }
}

struct Search<'o> {
    options: &'o SolveOptions,
    started: Instant,
    stats: SolveStats,
    aborted: Option<SolveError>,
}

impl<'o> Search<'o> {
    fn new(options: &'o SolveOptions) -> Self {
        Self {
            options,
            started: Instant::now(),
            stats: SolveStats::default(),
            aborted: None,
        }
    }

    fn check_limits(&self, depth: usize) -> Option<SolveError> {
        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                return Some(SolveError::DepthLimit { limit });
            }
        }
        if let Some(timeout) = self.options.timeout {
            if (self.stats.steps - 1) % CLOCK_CHECK_INTERVAL == 0 {
                let after = self.started.elapsed();
                if after >= timeout {
                    return Some(SolveError::Timeout { after });
                }
            }
        }
        None
    }

    fn expand<'a, V>(
        &mut self,
        goals: &Goals<'a, V>,
        store: &BindingStore<V>,
        depth: usize,
    ) -> Option<BindingStore<V>>
    where
        V: Clone + Eq + fmt::Debug,
    {
        self.stats.steps += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);
        if let Some(err) = self.check_limits(depth) {
            self.aborted = Some(err);
            return None;
        }

        let Some((&goal, rest)) = goals.uncons() else {
            return Some(store.clone());
        };
        trace!("depth={} goals={} store={}", depth, goals.len(), store.len());

        match goal {
            Formula::Literal { var, positive } => match store.try_assign(var.clone(), *positive) {
                Ok(next) => {
                    if next.len() > store.len() {
                        self.stats.assignments += 1;
                    }
                    self.expand(&rest, &next, depth + 1)
                }
                Err(conflict) => {
                    self.stats.conflicts += 1;
                    debug!(
                        "conflict on {:?}: bound {}, needed {}",
                        conflict.var, conflict.bound, positive
                    );
                    None
                }
            },
            Formula::And(left, right) => {
                let expanded = rest.push(right.as_ref()).push(left.as_ref());
                self.expand(&expanded, store, depth + 1)
            }
            Formula::Or(left, right) => {
                self.stats.branches += 1;
                if let Some(model) = self.expand(&rest.push(left.as_ref()), store, depth + 1) {
                    return Some(model);
                }
                if self.aborted.is_some() {
                    return None;
                }
                debug!("left branch closed at depth {}, trying right", depth);
                // the store from the failed left branch is simply dropped
                self.expand(&rest.push(right.as_ref()), store, depth + 1)
            }
        }
    }
}
