//! Exact inference on discrete Bayesian networks, and the credit-card fraud network built on it.

pub mod variable;
pub mod factor;
pub mod init;
pub mod network;
pub mod inference;
pub mod fraud;
pub mod query;
pub mod logging;
pub mod util;

pub use util::{InferError, Result};
pub use variable::{all_assignments, Assignment, Variable};
pub use factor::Factor;
pub use init::Initialization;
pub use network::{Network, NetworkBuilder};
pub use inference::{
    ConditionalInferenceEngine, DeclarationOrder, EliminationOrdering, EnumerationEngine, MaxCardinality,
    MinFill, VariableEliminationEngine,
};
