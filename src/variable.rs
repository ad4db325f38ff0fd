//! Definition of the variable module
//!
//! A `Variable` represents a discrete random variable in a Bayesian network. `Variable`s are
//! lightweight handles: a process-unique id and a cardinality. Names and value labels belong to
//! the `Network` that declares the `Variable`.

use indexmap::IndexMap;
use indexmap::map::Iter;
use itertools::{Either, Itertools};

use std::fmt;
use std::iter::{self, FromIterator};
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);


/// A discrete random variable with values `0..cardinality`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    /// unique identifier of the `Variable`
    id: usize,

    /// number of values the `Variable` can take on
    card: usize
}

impl Variable {

    /// Construct a new binary `Variable`. Value `0` means true and value `1` means false.
    pub fn binary() -> Self {
        Variable::discrete(2)
    }

    /// Construct a new discrete `Variable` with `cardinality` values
    pub fn discrete(cardinality: usize) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Variable { id, card: cardinality }
    }

    /// Get the number of values this `Variable` takes on
    pub fn cardinality(&self) -> usize {
        self.card
    }

    /// Check if `value` is in the domain of this `Variable`
    pub fn contains(&self, value: usize) -> bool {
        value < self.card
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl fmt::Display for Variable {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "X{}", self.id)
    }

}


/// An `Assignment` of values to some set of `Variable`s. Values are indices into each
/// `Variable`'s domain. Iteration order is insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    values: IndexMap<Variable, usize>
}

impl Assignment {

    /// Construct an empty `Assignment`
    pub fn new() -> Self {
        Assignment { values: IndexMap::new() }
    }

    /// Assign `value` to `var`, replacing any previous assignment
    pub fn set(&mut self, var: &Variable, value: usize) {
        self.values.insert(*var, value);
    }

    /// Get the value assigned to `var`, if any
    pub fn get(&self, var: &Variable) -> Option<&usize> {
        self.values.get(var)
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.values.contains_key(var)
    }

    /// The `Variable`s that have been assigned
    pub fn keys(&self) -> impl Iterator<Item = &Variable> {
        self.values.keys()
    }

    pub fn iter(&self) -> Iter<'_, Variable, usize> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check if every assignment in `other` agrees with this `Assignment`
    pub fn is_consistent_with(&self, other: &Assignment) -> bool {
        other.iter().all(|(v, val)| self.get(v).map_or(true, |mine| mine == val))
    }
}

impl FromIterator<(Variable, usize)> for Assignment {

    fn from_iter<I: IntoIterator<Item = (Variable, usize)>>(iter: I) -> Self {
        Assignment { values: iter.into_iter().collect() }
    }

}

impl<'a> IntoIterator for &'a Assignment {
    type Item = (&'a Variable, &'a usize);
    type IntoIter = Iter<'a, Variable, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}


/// Enumerate every complete `Assignment` to `scope`, in row-major order (the last `Variable`
/// varies fastest). An empty scope has exactly one assignment: the empty one.
pub fn all_assignments(scope: &[Variable]) -> impl Iterator<Item = Assignment> {
    if scope.is_empty() {
        return Either::Left(iter::once(Assignment::new()));
    }

    let vars = scope.to_vec();
    let assignments = scope.iter()
                           .map(|v| 0..v.cardinality())
                           .multi_cartesian_product()
                           .map(move |vals| vars.iter().cloned().zip(vals).collect());

    Either::Right(assignments)
}
