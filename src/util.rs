//! Defines the `Error` type for the fraud-infer library

use std::result;

use thiserror::Error;

pub type Result<T> = result::Result<T, InferError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum InferError {

    /// A factor operation named a variable that is not in the factor's scope. Given a well formed
    /// `Network` this is unreachable; if it surfaces it is a defect, not bad input.
    #[error("variable {0} is not in the scope of the factor")]
    VariableNotInScope(String),

    /// The declared parent graph contains a cycle. The value holds the names of the variables
    /// that could not be placed in a topological order.
    #[error("cyclic dependency among variables {0:?}")]
    CyclicDependency(Vec<String>),

    /// A CPT (or the structure around it) is not a valid conditional distribution
    #[error("invalid CPT for {variable}: {reason}")]
    InvalidCpt { variable: String, reason: String },

    /// The query could not be answered as posed: unknown variable, value outside its domain, or a
    /// query variable that is also observed
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Every entry of the factor being normalized is zero. Reachable when the evidence has zero
    /// probability under the model.
    #[error("degenerate distribution: the evidence has zero probability under the model")]
    DegenerateDistribution,

    /// Elimination finished with something other than the query variable in scope
    #[error("elimination invariant violated: {0}")]
    EliminationInvariantViolated(String),

    /// Represents a table that does not fit the scope it was paired with
    #[error("invalid factor: {0}")]
    InvalidFactor(String),

    /// Represents an incomplete assignment where a complete assignment was required
    #[error("missing assignments to the required variables")]
    IncompleteAssignment,

    /// Represents a variable that was present multiple times in a situation where it should only
    /// have been present once
    #[error("variable {0} was declared more than once")]
    DuplicateVariable(String),

    /// Represents an attempt to initialize a variable with an incompatible `Initialization`
    #[error("invalid initialization for {0}")]
    InvalidInitialization(String),
}

impl InferError {

    /// Shorthand for an `InvalidCpt` error
    pub fn invalid_cpt<S: Into<String>, R: Into<String>>(variable: S, reason: R) -> Self {
        InferError::InvalidCpt { variable: variable.into(), reason: reason.into() }
    }

    /// `true` for the errors that signal a defect in this library rather than bad input
    pub fn is_internal(&self) -> bool {
        match self {
            InferError::VariableNotInScope(_) | InferError::EliminationInvariantViolated(_) => true,
            _ => false
        }
    }
}
