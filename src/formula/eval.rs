use std::hash::Hash;

use anyhow::{Result, bail};
use indexmap::IndexMap;

use super::expr::Formula;

pub const MAX_BRUTE_FORCE_VARS: usize = 20;

impl<V> Formula<V> {
    /// Evaluates under a total assignment. `And`/`Or` short-circuit left to right.
    pub fn eval<F: Fn(&V) -> bool>(&self, value: &F) -> bool {
        match self {
            Formula::Literal { var, positive } => value(var) == *positive,
            Formula::And(l, r) => l.eval(value) && r.eval(value),
            Formula::Or(l, r) => l.eval(value) || r.eval(value),
        }
    }

    /// Kleene three-valued evaluation. `None` means the partial assignment
    /// does not decide the formula.
    pub fn eval_partial<F: Fn(&V) -> Option<bool>>(&self, value: &F) -> Option<bool> {
        match self {
            Formula::Literal { var, positive } => value(var).map(|v| v == *positive),
            Formula::And(l, r) => match (l.eval_partial(value), r.eval_partial(value)) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            Formula::Or(l, r) => match (l.eval_partial(value), r.eval_partial(value)) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
        }
    }
}

impl<V: Clone + Eq + Hash> Formula<V> {
    /// Truth-table search over `variables()`. Returns the first model in
    /// binary counting order, where the first variable is the low bit.
    pub fn brute_force_model(&self) -> Result<Option<IndexMap<V, bool>>> {
        let vars = self.variables();
        if vars.len() > MAX_BRUTE_FORCE_VARS {
            bail!(
                "truth table over {} variables exceeds limit of {}",
                vars.len(),
                MAX_BRUTE_FORCE_VARS
            );
        }

        for bits in 0u64..(1u64 << vars.len()) {
            let row = vars
                .iter()
                .enumerate()
                .map(|(i, v)| (v.clone(), (bits >> i) & 1 == 1))
                .collect::<IndexMap<_, _>>();
            // every variable is present in the row
            if self.eval(&|v| row.get(v).copied().unwrap_or(false)) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    pub fn brute_force_sat(&self) -> Result<bool> {
        Ok(self.brute_force_model()?.is_some())
    }
}
