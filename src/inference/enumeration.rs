//! Defines a `ConditionalInferenceEngine` that answers queries by summing the full joint
//! distribution over every assignment consistent with the evidence.
//!
//! Enumeration is exponential in the number of variables, but it is exact and has no moving
//! parts, which makes it the reference the other engines are checked against.

use crate::factor::Factor;
use crate::network::Network;
use crate::util::{InferError, Result};
use crate::variable::{all_assignments, Assignment, Variable};
use super::{validate_query, ConditionalInferenceEngine};

use tracing::{debug, instrument};

pub struct EnumerationEngine<'a> {

    /// the `Network` whose joint distribution is enumerated
    network: &'a Network

}

impl<'a> EnumerationEngine<'a> {

    pub fn new(network: &'a Network) -> Self {
        EnumerationEngine { network }
    }

}

impl<'a> ConditionalInferenceEngine for EnumerationEngine<'a> {

    #[instrument(level = "debug", skip(self, evidence))]
    fn infer(&self, query: Variable, evidence: &Assignment) -> Result<Factor> {
        validate_query(self.network, query, evidence)?;

        let free: Vec<Variable> = self.network.variables()
                                              .into_iter()
                                              .filter(|v| !evidence.contains(v))
                                              .collect();

        let mut table = vec![0.0; query.cardinality()];
        let mut rows = 0;

        for mut assn in all_assignments(&free) {
            for (v, &val) in evidence.iter() {
                assn.set(v, val);
            }

            let q = *assn.get(&query).ok_or(InferError::IncompleteAssignment)?;
            table[q] += self.network.probability(&assn)?;
            rows += 1;
        }

        debug!(rows, "enumerated joint assignments");
        Factor::from_values(vec![query], table)?.normalize()
    }

}
