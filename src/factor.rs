//! Definition of the factor module
//!
//! A `Factor` represents a relationship between some set of `Variable`s: a non-negative real value
//! for every joint assignment of its scope. Conditional probability tables and the intermediate
//! products of variable elimination are both `Factor`s.
//!
//! `Factor`s are immutable. Every operation returns a new `Factor`.

use crate::util::{InferError, Result};
use crate::variable::{all_assignments, Assignment, Variable};

use itertools::Itertools;
use ndarray::{ArrayD, Axis, IxDyn};

/// Alias f64 ndarray::ArrayD as Table
pub type Table = ArrayD<f64>;

/// Tolerance used when checking that a CPT's conditional distributions sum to one
pub const CPD_TOLERANCE: f64 = 1e-6;


/// A table factor as described in Koller & Friedman Section 4.2.1. Axis `i` of the table
/// corresponds to `scope[i]`; entries are laid out in row-major order.
///
/// A `Factor` with an empty scope is a scalar. The identity `Factor` is the scalar `1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Factor {
    /// The scope of the `Factor`
    scope: Vec<Variable>,

    /// The values of the `Factor` table
    table: Table
}


impl Factor {

    /// Get the identity factor
    pub fn identity() -> Self {
        Factor::scalar(1.0)
    }


    /// Create a `Factor` with an empty scope and the given value
    pub fn scalar(value: f64) -> Self {
        Factor { scope: vec![], table: Table::from_elem(IxDyn(&[]), value) }
    }


    /// Create a new `Factor`
    ///
    /// # Errors
    /// * `InferError::InvalidFactor` if the table does not have one axis per scope `Variable`,
    ///   an axis length differs from its `Variable`'s cardinality, a `Variable` appears twice, or
    ///   an entry is negative or not finite
    pub fn new(scope: Vec<Variable>, table: Table) -> Result<Self> {
        if scope.len() != table.ndim() {
            return Err(InferError::InvalidFactor(
                format!("scope has {} variables but the table has {} dimensions", scope.len(), table.ndim())
            ));
        }

        if scope.iter().unique().count() != scope.len() {
            return Err(InferError::InvalidFactor(String::from("scope contains a duplicate variable")));
        }

        for (v, &t) in scope.iter().zip(table.shape().iter()) {
            if v.cardinality() != t {
                return Err(InferError::InvalidFactor(
                    format!("{} has cardinality {} but its axis has length {}", v, v.cardinality(), t)
                ));
            }
        }

        // factors may not have negative values
        if table.iter().any(|&v| v < 0.0 || !v.is_finite()) {
            return Err(InferError::InvalidFactor(String::from("entries must be finite and non-negative")));
        }

        Ok(Factor { scope, table })
    }


    /// Create a new `Factor` from a flat list of values in row-major order
    pub fn from_values(scope: Vec<Variable>, values: Vec<f64>) -> Result<Self> {
        let shape: Vec<usize> = scope.iter().map(|v| v.cardinality()).collect();
        let table = Table::from_shape_vec(IxDyn(&shape), values).map_err(|e| {
            InferError::InvalidFactor(format!("values do not fit the scope: {}", e))
        })?;

        Factor::new(scope, table)
    }


    /// Create a conditional probability table ```P(var | parents)```. The scope of the result is
    /// ```parents ++ [var]```, so `var` is the last axis of `table`.
    ///
    /// # Errors
    /// * `InferError::InvalidCpt` if the table is not a valid factor, or if some assignment to the
    ///   parents does not yield a distribution over `var`
    pub fn cpd(var: Variable, parents: Vec<Variable>, table: Table) -> Result<Self> {
        let mut scope = parents;
        scope.push(var);

        let factor = Factor::new(scope, table)
            .map_err(|e| InferError::invalid_cpt(var.to_string(), e.to_string()))?;
        factor.check_cpd(var)?;

        Ok(factor)
    }


    /// Verify that, for every assignment to the rest of the scope, the values of `child` sum to 1.
    ///
    /// # Errors
    /// * `InferError::VariableNotInScope` if `child` is not in the scope
    /// * `InferError::InvalidCpt` if some conditional distribution does not sum to 1
    pub fn check_cpd(&self, child: Variable) -> Result<()> {
        let axis = self.axis_of(child)?;
        let sums = self.table.sum_axis(Axis(axis));

        match sums.iter().find(|&&s| (s - 1.0).abs() > CPD_TOLERANCE) {
            Some(s) => Err(InferError::invalid_cpt(
                child.to_string(),
                format!("a conditional distribution sums to {} instead of 1", s)
            )),
            None => Ok(())
        }
    }


    /// Check if the `Factor` is the identity `Factor`
    pub fn is_identity(&self) -> bool {
        self.scope.is_empty() && self.sum() == 1.0
    }


    /// Retrieve the scope of the `Factor`.
    pub fn scope(&self) -> &[Variable] {
        &self.scope
    }


    /// Retrieve the raw table of the `Factor`
    pub fn table(&self) -> &Table {
        &self.table
    }


    /// Check if `var` is in the scope of this `Factor`
    pub fn contains(&self, var: &Variable) -> bool {
        self.scope.contains(var)
    }


    /// The sum of every entry in the table
    pub fn sum(&self) -> f64 {
        self.table.sum()
    }


    /// Retrieve the value for a complete assignment over the scope of this `Factor`
    ///
    /// # Args
    /// assignment: a full assignment to the scope of a `Factor`. The assignment's scope may be a
    ///             superset of the `Factor`s scope.
    ///
    /// # Errors
    /// * `InferError::IncompleteAssignment`, if assignment is not a complete assignment to the
    ///   scope of the `Factor`
    /// * `InferError::InvalidQuery`, if an assigned value is outside its `Variable`'s domain
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        let mut idx = Vec::with_capacity(self.scope.len());

        for v in self.scope.iter() {
            match assignment.get(v) {
                Some(&val) if v.contains(val) => idx.push(val),
                Some(&val) => return Err(out_of_domain(v, val)),
                None => return Err(InferError::IncompleteAssignment)
            }
        }

        Ok(self.table[IxDyn(&idx)])
    }


    /// Product of this `Factor` and another `Factor`.
    ///
    /// Defined in Koller & Friedman Section 4.2.1
    ///
    /// The scope of the result is the scope of `self`, followed by the `Variable`s of `other` that
    /// `self` does not contain, in `other`'s order. Scopes need not intersect.
    pub fn multiply(&self, other: &Self) -> Self {
        let mut scope = self.scope.clone();

        // the axis of the result that each of other's variables maps to
        let other_axes: Vec<usize> = other.scope.iter().map(|v| {
            match scope.iter().position(|u| u == v) {
                Some(i) => i,
                None => {
                    scope.push(*v);
                    scope.len() - 1
                }
            }
        }).collect();

        let shape: Vec<usize> = scope.iter().map(|v| v.cardinality()).collect();
        let mine = self.scope.len();

        let table = Table::from_shape_fn(IxDyn(&shape), |idx| {
            let i1: Vec<usize> = (0..mine).map(|i| idx[i]).collect();
            let i2: Vec<usize> = other_axes.iter().map(|&i| idx[i]).collect();

            self.table[IxDyn(&i1)] * other.table[IxDyn(&i2)]
        });

        Factor { scope, table }
    }


    /// Restrict the `Factor` to the rows consistent with ```var = value```. The result's scope
    /// drops `var`.
    ///
    /// Defined in Koller & Friedman 4.2.3
    ///
    /// # Errors
    /// * `InferError::VariableNotInScope` if `var` is not in the scope
    /// * `InferError::InvalidQuery` if `value` is outside the domain of `var`
    pub fn restrict(&self, var: Variable, value: usize) -> Result<Self> {
        let axis = self.axis_of(var)?;
        if !var.contains(value) {
            return Err(out_of_domain(&var, value));
        }

        let table = self.table.index_axis(Axis(axis), value).to_owned();
        let mut scope = self.scope.clone();
        scope.remove(axis);

        Ok(Factor { scope, table })
    }


    /// Reduce the `Factor` to the given partial assignment by restricting every assigned
    /// `Variable` in its scope. Assigned `Variable`s outside the scope are ignored.
    pub fn reduce(&self, assignment: &Assignment) -> Result<Self> {
        let mut reduced = self.clone();

        for v in self.scope.iter() {
            if let Some(&val) = assignment.get(v) {
                reduced = reduced.restrict(*v, val)?;
            }
        }

        Ok(reduced)
    }


    /// Sum the `Factor` over the given `Variable`, removing it from the scope
    ///
    /// Defined in Koller & Friedman 9.3.1
    ///
    /// # Errors
    /// * `InferError::VariableNotInScope` if `var` is not in the scope
    pub fn sum_out(&self, var: Variable) -> Result<Self> {
        let axis = self.axis_of(var)?;

        let table = self.table.sum_axis(Axis(axis));
        let mut scope = self.scope.clone();
        scope.remove(axis);

        Ok(Factor { scope, table })
    }


    /// Scale the `Factor` so its entries sum to 1
    ///
    /// # Errors
    /// * `InferError::DegenerateDistribution` if the entries sum to zero
    pub fn normalize(&self) -> Result<Self> {
        let z = self.sum();
        if !(z > 0.0 && z.is_finite()) {
            return Err(InferError::DegenerateDistribution);
        }

        Ok(Factor { scope: self.scope.clone(), table: self.table.mapv(|v| v / z) })
    }


    /// Compare two `Factor`s entry by entry, regardless of the order of their scopes.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        if self.scope.len() != other.scope.len() || !self.scope.iter().all(|v| other.contains(v)) {
            return false;
        }

        all_assignments(&self.scope).all(|assn| {
            match (self.value(&assn), other.value(&assn)) {
                (Ok(x), Ok(y)) => (x - y).abs() <= tolerance,
                _ => false
            }
        })
    }


    /// Position of `var` in the scope
    fn axis_of(&self, var: Variable) -> Result<usize> {
        self.scope.iter()
                  .position(|&v| v == var)
                  .ok_or_else(|| InferError::VariableNotInScope(var.to_string()))
    }

}


fn out_of_domain(var: &Variable, value: usize) -> InferError {
    InferError::InvalidQuery(
        format!("value {} is outside the domain of {} (cardinality {})", value, var, var.cardinality())
    )
}
