use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

use super::list::ConsList;

/// Raised when a variable would have to hold both truth values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict<V> {
    pub var: V,
    pub bound: bool,
}

/// Immutable partial assignment of variables to truth values.
///
/// Every binding lives in a shared association list, so extending a store is
/// O(1) and leaves the original untouched. Lookups are linear, which is fine
/// for the formula sizes the tableau search is meant for.
#[derive(Debug)]
pub struct BindingStore<V> {
    bindings: ConsList<(V, bool)>,
}

impl<V> Clone for BindingStore<V> {
    fn clone(&self) -> Self {
        Self {
            bindings: self.bindings.clone(),
        }
    }
}

impl<V: Eq> BindingStore<V> {
    pub fn new() -> Self {
        Self {
            bindings: ConsList::new(),
        }
    }

    pub fn lookup(&self, var: &V) -> Option<bool> {
        self.bindings
            .iter()
            .find(|(v, _)| v == var)
            .map(|&(_, value)| value)
    }

    pub fn contains(&self, var: &V) -> bool {
        self.lookup(var).is_some()
    }

    /// Panics if `var` is unbound; check `contains` first.
    pub fn get(&self, var: &V) -> bool {
        match self.lookup(var) {
            Some(value) => value,
            None => panic!("variable is not bound in this store"),
        }
    }

    /// Raw extension. The variable must not already be bound.
    pub fn add(&self, var: V, value: bool) -> Self {
        debug_assert!(!self.contains(&var), "variable is already bound");
        Self {
            bindings: self.bindings.push((var, value)),
        }
    }

    pub fn try_assign(&self, var: V, value: bool) -> Result<Self, Conflict<V>> {
        match self.lookup(&var) {
            None => Ok(self.add(var, value)),
            Some(bound) if bound == value => Ok(self.clone()),
            Some(bound) => Err(Conflict { var, bound }),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in the order they were made, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (&V, bool)> {
        let mut all = self.bindings.iter().collect::<Vec<_>>();
        all.reverse();
        all.into_iter().map(|(v, b)| (v, *b))
    }
}

impl<V: Eq> Default for BindingStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Eq + Hash + Clone> BindingStore<V> {
    pub fn to_assignment(&self) -> Assignment<V> {
        Assignment {
            values: self.iter().map(|(v, b)| (v.clone(), b)).collect(),
        }
    }
}

/// Read-only view of a satisfying assignment, in assignment order.
#[derive(Debug, Clone)]
pub struct Assignment<V> {
    values: IndexMap<V, bool>,
}

// equality ignores assignment order
impl<V: Eq + Hash> PartialEq for Assignment<V> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl<V: Eq + Hash> Eq for Assignment<V> {}

impl<V: Eq + Hash> FromIterator<(V, bool)> for Assignment<V> {
    fn from_iter<I: IntoIterator<Item = (V, bool)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<V: Eq + Hash> Assignment<V> {
    pub fn contains(&self, var: &V) -> bool {
        self.values.contains_key(var)
    }

    /// Panics if `var` is not assigned; check `contains` first.
    pub fn get(&self, var: &V) -> bool {
        match self.values.get(var) {
            Some(&value) => value,
            None => panic!("variable is not assigned"),
        }
    }

    pub fn value(&self, var: &V) -> Option<bool> {
        self.values.get(var).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&V, bool)> {
        self.values.iter().map(|(v, b)| (v, *b))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &IndexMap<V, bool> {
        &self.values
    }

    pub fn into_map(self) -> IndexMap<V, bool> {
        self.values
    }
}

impl<V: fmt::Display> fmt::Display for Assignment<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (var, value)) in self.values.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", var, value)?;
        }
        write!(f, "}}")
    }
}
