use std::fmt;
use std::hash::Hash;

use indexmap::IndexSet;

/// A propositional formula over literals, conjunction and disjunction.
///
/// Formulas are immutable once built. Variables are opaque; the solver only
/// compares and hashes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Formula<V = String> {
    Literal { var: V, positive: bool },
    And(Box<Formula<V>>, Box<Formula<V>>),
    Or(Box<Formula<V>>, Box<Formula<V>>),
}

impl<V> Formula<V> {
    pub fn lit(var: V, positive: bool) -> Self {
        Formula::Literal { var, positive }
    }

    pub fn pos(var: V) -> Self {
        Self::lit(var, true)
    }

    pub fn neg(var: V) -> Self {
        Self::lit(var, false)
    }

    pub fn and(left: Formula<V>, right: Formula<V>) -> Self {
        Formula::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Formula<V>, right: Formula<V>) -> Self {
        Formula::Or(Box::new(left), Box::new(right))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Formula::Literal { .. })
    }

    /// Number of `And`/`Or` nodes in the tree.
    pub fn num_connectives(&self) -> usize {
        match self {
            Formula::Literal { .. } => 0,
            Formula::And(l, r) | Formula::Or(l, r) => 1 + l.num_connectives() + r.num_connectives(),
        }
    }

    pub fn num_literals(&self) -> usize {
        match self {
            Formula::Literal { .. } => 1,
            Formula::And(l, r) | Formula::Or(l, r) => l.num_literals() + r.num_literals(),
        }
    }

    /// Longest root-to-leaf path, counting the leaf. A lone literal has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Formula::Literal { .. } => 1,
            Formula::And(l, r) | Formula::Or(l, r) => 1 + l.depth().max(r.depth()),
        }
    }
}

impl<V: Clone + Eq + Hash> Formula<V> {
    /// Distinct variables in first-occurrence order, left to right.
    pub fn variables(&self) -> IndexSet<V> {
        let mut out = IndexSet::<V>::new();
        collect_vars(self, &mut out);
        out
    }
}

fn collect_vars<V: Clone + Eq + Hash>(f: &Formula<V>, out: &mut IndexSet<V>) {
    match f {
        Formula::Literal { var, .. } => {
            if !out.contains(var) {
                out.insert(var.clone());
            }
        }
        Formula::And(l, r) | Formula::Or(l, r) => {
            collect_vars(l, out);
            collect_vars(r, out);
        }
    }
}

impl<V: fmt::Display> fmt::Display for Formula<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Literal { var, positive: true } => write!(f, "{}", var),
            Formula::Literal { var, positive: false } => write!(f, "!{}", var),
            Formula::And(l, r) => write!(f, "({} && {})", l, r),
            Formula::Or(l, r) => write!(f, "({} || {})", l, r),
        }
    }
}
