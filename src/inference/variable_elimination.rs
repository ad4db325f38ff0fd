//! Defines a `ConditionalInferenceEngine` that uses exact inference by variable elimination to
//! answer conditional inference queries.
//!
//! Implementation of Koller & Friedman Algorithm 9.1 - Sum-Product-VE

use crate::factor::Factor;
use crate::network::Network;
use crate::util::{InferError, Result};
use crate::variable::{Assignment, Variable};
use super::ordering::{DeclarationOrder, EliminationOrdering};
use super::{validate_query, ConditionalInferenceEngine};

use tracing::{debug, instrument, warn};

/// Answers ```P(Y | E = e)``` for a single query variable `Y` by restricting every CPT to the
/// evidence, summing out the hidden variables one at a time, and normalizing what is left.
///
/// The engine only borrows the `Network`; every intermediate `Factor` is local to one call of
/// `infer`, so a single engine can answer any number of queries, from any number of threads.
pub struct VariableEliminationEngine<'a> {

    /// the `Network` to query
    network: &'a Network,

    /// decides the order in which hidden variables are summed out
    ordering: Box<dyn EliminationOrdering + 'a>

}


impl<'a> VariableEliminationEngine<'a> {

    /// An engine that eliminates in the network's declaration order
    pub fn new(network: &'a Network) -> Self {
        VariableEliminationEngine::with_ordering(network, Box::new(DeclarationOrder))
    }

    /// An engine that eliminates in the order chosen by `ordering`
    pub fn with_ordering(network: &'a Network, ordering: Box<dyn EliminationOrdering + 'a>) -> Self {
        VariableEliminationEngine { network, ordering }
    }

}


impl<'a> ConditionalInferenceEngine for VariableEliminationEngine<'a> {

    #[instrument(level = "debug", skip(self, evidence), fields(ordering = self.ordering.name()))]
    fn infer(&self, query: Variable, evidence: &Assignment) -> Result<Factor> {
        // check input arguments before doing any work
        validate_query(self.network, query, evidence)?;

        // reduce every CPT with the evidence
        let mut phis = self.network.cpts()
                                   .map(|cpt| cpt.reduce(evidence))
                                   .collect::<Result<Vec<Factor>>>()?;
        debug!(factors = phis.len(), evidence = evidence.len(), "reduced CPTs by evidence");

        let hidden: Vec<Variable> = self.network.variables()
                                                .into_iter()
                                                .filter(|v| *v != query && !evidence.contains(v))
                                                .collect();

        let order = self.ordering.order(self.network, &phis, &hidden);
        if order.len() != hidden.len() || !hidden.iter().all(|v| order.contains(v)) {
            warn!(ordering = self.ordering.name(), "ordering did not return a permutation of the hidden variables");
            return Err(InferError::EliminationInvariantViolated(
                format!("the {} ordering did not return each hidden variable exactly once", self.ordering.name())
            ));
        }

        for var in order {
            let (phi_1prime, phi_2prime): (Vec<Factor>, Vec<Factor>) = phis.into_iter()
                                                                          .partition(|f| f.contains(&var));
            phis = phi_2prime;

            if phi_1prime.is_empty() {
                debug!(variable = %self.network.name_of(&var), "no factor mentions variable, skipping");
                continue;
            }

            // product step - multiply factors with var
            let psi = phi_1prime.iter().fold(Factor::identity(), |acc, phi| acc.multiply(phi));

            // sum step - marginalize psi over var
            let tau = psi.sum_out(var)?;
            debug!(
                variable = %self.network.name_of(&var),
                multiplied = phi_1prime.len(),
                scope = tau.scope().len(),
                "eliminated variable"
            );

            phis.push(tau);
        }

        // multiply together remaining phis
        let phi_star = phis.iter().fold(Factor::identity(), |acc, phi| acc.multiply(phi));

        if phi_star.scope().len() != 1 || phi_star.scope()[0] != query {
            let left: Vec<String> = phi_star.scope().iter().map(|v| self.network.name_of(v)).collect();
            return Err(InferError::EliminationInvariantViolated(
                format!("elimination left scope {:?}, expected only {}", left, self.network.name_of(&query))
            ));
        }

        // now we have an unnormalized distribution. We need the partition function to return a
        // conditional probability.
        phi_star.normalize().map_err(|e| {
            warn!(query = %self.network.name_of(&query), "evidence has zero probability under the network");
            e
        })
    }

}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::Initialization;
    use crate::network::NetworkBuilder;

    /// Orders the hidden variables but drops the last one
    struct Forgetful;

    impl EliminationOrdering for Forgetful {
        fn order(&self, _: &Network, _: &[Factor], hidden: &[Variable]) -> Vec<Variable> {
            hidden.iter().take(hidden.len().saturating_sub(1)).cloned().collect()
        }

        fn name(&self) -> &'static str {
            "forgetful"
        }
    }

    fn chain() -> (Network, Variable, Variable, Variable) {
        let a = Variable::binary();
        let b = Variable::binary();
        let c = Variable::binary();

        let model = NetworkBuilder::new()
            .with_named_variable(&a, "A", &[], Initialization::Binomial(0.3))
            .with_named_variable(&b, "B", &[a], Initialization::Values(vec![0.9, 0.1, 0.2, 0.8]))
            .with_named_variable(&c, "C", &[b], Initialization::Values(vec![0.6, 0.4, 0.1, 0.9]))
            .build()
            .unwrap();

        (model, a, b, c)
    }

    #[test]
    fn chain_marginal() {
        let (model, a, _, c) = chain();
        let engine = VariableEliminationEngine::new(&model);

        // P(+b) = 0.3 * 0.9 + 0.7 * 0.2 = 0.41, P(+c) = 0.41 * 0.6 + 0.59 * 0.1 = 0.305
        let f = engine.infer(c, &Assignment::new()).unwrap();
        assert_eq!(vec![c], f.scope());

        let assn: Assignment = vec![(c, 0)].into_iter().collect();
        assert!((f.value(&assn).unwrap() - 0.305).abs() < 1e-12);

        // the root's marginal is its CPT
        let f = engine.infer(a, &Assignment::new()).unwrap();
        assert!(f.approx_eq(model.cpt(&a).unwrap(), 1e-12));
    }

    #[test]
    fn chain_diagnostic() {
        let (model, a, _, c) = chain();
        let engine = VariableEliminationEngine::new(&model);

        // P(+a | +c) = 0.3 * (0.9 * 0.6 + 0.1 * 0.1) / 0.305
        let evidence: Assignment = vec![(c, 0)].into_iter().collect();
        let f = engine.infer(a, &evidence).unwrap();

        let assn: Assignment = vec![(a, 0)].into_iter().collect();
        let expected = 0.3 * (0.9 * 0.6 + 0.1 * 0.1) / 0.305;
        assert!((f.value(&assn).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn misbehaving_ordering() {
        let (model, a, _, _) = chain();
        let engine = VariableEliminationEngine::with_ordering(&model, Box::new(Forgetful));

        match engine.infer(a, &Assignment::new()) {
            Err(e @ InferError::EliminationInvariantViolated(_)) => assert!(e.is_internal()),
            other => panic!("wrong result {:?}", other)
        };
    }
}
