//! Defines the interface to inference engines

use crate::factor::Factor;
use crate::network::Network;
use crate::util::{InferError, Result};
use crate::variable::{Assignment, Variable};

mod enumeration;
mod ordering;
mod variable_elimination;

pub use self::enumeration::EnumerationEngine;
pub use self::ordering::{DeclarationOrder, EliminationOrdering, MaxCardinality, MinFill};
pub use self::variable_elimination::VariableEliminationEngine;


/// A `ConditionalInferenceEngine` is capable of answering Conditional Probability Queries of the form:
///     ```P(Y | E = e)```
///
/// Engines borrow the `Network` they query and keep no state between calls, so the evidence is
/// an argument of each query rather than of construction.
pub trait ConditionalInferenceEngine {

    /// Infer the distribution ```P(query | evidence)```
    ///
    /// # Returns
    /// a normalized `Factor` whose scope is exactly ```[query]```
    ///
    /// # Errors
    /// * `InferError::InvalidQuery` if `query` or an evidence variable is not in the network, an
    ///   evidence value is outside its variable's domain, or `query` is itself observed
    /// * `InferError::DegenerateDistribution` if the evidence has zero probability
    fn infer(&self, query: Variable, evidence: &Assignment) -> Result<Factor>;

}


/// Check a query against `network` before any factor work is done
pub(crate) fn validate_query(network: &Network, query: Variable, evidence: &Assignment) -> Result<()> {
    if !network.contains(&query) {
        return Err(InferError::InvalidQuery(format!("query variable {} is not in the network", query)));
    }

    if evidence.contains(&query) {
        return Err(InferError::InvalidQuery(format!(
            "query variable {} is also observed",
            network.name_of(&query)
        )));
    }

    for (v, &val) in evidence.iter() {
        if !network.contains(v) {
            return Err(InferError::InvalidQuery(format!("evidence variable {} is not in the network", v)));
        }

        if !v.contains(val) {
            return Err(InferError::InvalidQuery(format!(
                "value {} is outside the domain of {}",
                val,
                network.name_of(v)
            )));
        }
    }

    Ok(())
}


#[cfg(test)]
/// Tests for the inference engines in this module. Tests are hoisted here to avoid duplication.
/// Any tests specific to the inference engine are held within that submodule's tests module.
///
/// Example derived from Koller & Friedman's student example. Koller & Friedman do not offer an
/// example of the results of the exact inference on the student (or extended-student) example.
///
/// However, example 6d of [1] provides the results of exact (via variable elimination) and
/// approximate (via particle methods) inference of P(I | D=0, L=1, S=0) on a modified version
/// of the K&F Student example. We use that result here to test our implementation.
///
/// [1] https://www.uni-oldenburg.de/en/lcs/probabilistic-programming/webchurch-and-openbugs/
mod tests {
    use super::*;
    use crate::init::Initialization;
    use crate::network::NetworkBuilder;
    use ndarray::array;

    /// Utility function to build the student inference example
    fn build_student_example() -> (Variable, Network, Assignment) {
        let d = Variable::binary();
        let i = Variable::binary();
        let g = Variable::binary();
        let s = Variable::binary();
        let l = Variable::binary();

        let cpd_g = Factor::cpd(
            g,
            vec![i, d],
            array![[[0.3, 0.7], [0.05, 0.95]],
                   [[0.9, 0.1], [0.5, 0.5]]].into_dyn()
        ).unwrap();

        let cpd_s = Factor::cpd(s, vec![i], array![[0.95, 0.05], [0.2, 0.8]].into_dyn()).unwrap();
        let cpd_l = Factor::cpd(l, vec![g], array![[0.9, 0.1], [0.4, 0.6]].into_dyn()).unwrap();

        let model = NetworkBuilder::new()
            .with_named_variable(&d, "D", &[], Initialization::Binomial(0.6))
            .with_named_variable(&i, "I", &[], Initialization::Binomial(0.7))
            .with_named_variable(&g, "G", &[i, d], Initialization::Table(cpd_g))
            .with_named_variable(&s, "S", &[i], Initialization::Table(cpd_s))
            .with_named_variable(&l, "L", &[g], Initialization::Table(cpd_l))
            .build()
            .unwrap();

        let mut evidence = Assignment::new();
        evidence.set(&d, 0);
        evidence.set(&l, 1);
        evidence.set(&s, 0);

        (i, model, evidence)
    }

    /// Utility method to test the actual inference task
    fn test_inference(i: Variable, engine: &dyn ConditionalInferenceEngine, evidence: &Assignment) {
        let f = engine.infer(i, evidence);

        assert!(! f.is_err());

        let f = f.unwrap();
        assert_eq!(vec![i], f.scope());
        assert!((f.sum() - 1.0).abs() < 1e-9);

        let mut assn = Assignment::new();
        assn.set(&i, 1);

        let expected = 0.02919708;
        assert!((f.value(&assn).unwrap() - expected).abs() < 0.00000001);
    }

    #[test]
    /// Test variable elimination
    fn variable_elimination() {
        let (i, model, evidence) = build_student_example();
        let engine = VariableEliminationEngine::new(&model);

        // the result should be the same on subsequent iterations
        for _ in 0..10 {
            test_inference(i, &engine, &evidence);
        }
    }

    #[test]
    fn variable_elimination_orderings() {
        let (i, model, evidence) = build_student_example();

        let strategies: Vec<Box<dyn EliminationOrdering>> = vec![
            Box::new(DeclarationOrder),
            Box::new(MinFill),
            Box::new(MaxCardinality)
        ];

        for ordering in strategies {
            let engine = VariableEliminationEngine::with_ordering(&model, ordering);
            test_inference(i, &engine, &evidence);
        }
    }

    #[test]
    /// Test inference by enumeration
    fn enumeration() {
        let (i, model, evidence) = build_student_example();
        let engine = EnumerationEngine::new(&model);

        for _ in 0..10 {
            test_inference(i, &engine, &evidence);
        }
    }

    #[test]
    fn invalid_queries() {
        let (i, model, evidence) = build_student_example();
        let outsider = Variable::binary();
        let engines: Vec<Box<dyn ConditionalInferenceEngine + '_>> = vec![
            Box::new(VariableEliminationEngine::new(&model)),
            Box::new(EnumerationEngine::new(&model))
        ];

        for engine in engines.iter() {
            // query variable not in the network
            match engine.infer(outsider, &evidence) {
                Err(InferError::InvalidQuery(_)) => (),
                other => panic!("wrong result {:?}", other)
            };

            // query variable observed
            let mut observed = evidence.clone();
            observed.set(&i, 0);
            match engine.infer(i, &observed) {
                Err(InferError::InvalidQuery(_)) => (),
                other => panic!("wrong result {:?}", other)
            };

            // evidence variable not in the network
            let mut foreign = evidence.clone();
            foreign.set(&outsider, 0);
            match engine.infer(i, &foreign) {
                Err(InferError::InvalidQuery(_)) => (),
                other => panic!("wrong result {:?}", other)
            };

            // evidence value out of domain
            let g = *model.lookup_variable("G").unwrap();
            let mut out_of_domain = evidence.clone();
            out_of_domain.set(&g, 2);
            match engine.infer(i, &out_of_domain) {
                Err(InferError::InvalidQuery(_)) => (),
                other => panic!("wrong result {:?}", other)
            };
        }
    }

    #[test]
    fn no_evidence_is_the_prior() {
        let (i, model, _) = build_student_example();
        let engine = VariableEliminationEngine::new(&model);

        let f = engine.infer(i, &Assignment::new()).unwrap();
        assert!(f.approx_eq(model.cpt(&i).unwrap(), 1e-12));
    }
}
