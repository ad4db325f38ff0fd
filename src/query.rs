//! The query runner: turns named queries over a `Network` into probability distributions.
//!
//! Queries refer to variables by name and to values by their literal labels (```+fp```,
//! ```-trav```, ...), so they can come straight from a command line.

use crate::factor::Factor;
use crate::inference::{
    ConditionalInferenceEngine, DeclarationOrder, EliminationOrdering, EnumerationEngine,
    VariableEliminationEngine,
};
use crate::network::Network;
use crate::util::{InferError, Result};
use crate::variable::{Assignment, Variable};

use serde::Serialize;
use tracing::info;

use std::fmt;


/// A query against a `Network`, by variable name
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    /// ```P(target)```
    Marginal { target: String },

    /// ```P(target | evidence)```, where the evidence is a list of (variable name, value literal)
    Conditional { target: String, evidence: Vec<(String, String)> },
}

impl Query {

    /// Build a query, `Marginal` when `evidence` is empty
    pub fn new(target: &str, evidence: Vec<(String, String)>) -> Self {
        if evidence.is_empty() {
            Query::Marginal { target: String::from(target) }
        } else {
            Query::Conditional { target: String::from(target), evidence }
        }
    }

    pub fn target(&self) -> &str {
        match self {
            Query::Marginal { target } | Query::Conditional { target, .. } => target
        }
    }

    pub fn evidence(&self) -> &[(String, String)] {
        match self {
            Query::Marginal { .. } => &[],
            Query::Conditional { evidence, .. } => evidence
        }
    }
}

impl fmt::Display for Query {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Query::Marginal { target } => write!(f, "P({})", target),
            Query::Conditional { target, evidence } => {
                let given: Vec<&str> = evidence.iter().map(|(_, lit)| lit.as_str()).collect();
                write!(f, "P({} | {})", target, given.join(", "))
            }
        }
    }

}


/// Parse evidence of the form ```FP=+fp,Trav=-trav```. Whitespace around names and literals is
/// ignored, as are empty items.
///
/// # Errors
/// * `InferError::InvalidQuery` if an item is not ```name=literal```
pub fn parse_evidence(text: &str) -> Result<Vec<(String, String)>> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            match item.split_once('=') {
                Some((name, lit)) if !name.trim().is_empty() && !lit.trim().is_empty() => {
                    Ok((String::from(name.trim()), String::from(lit.trim())))
                },
                _ => Err(InferError::InvalidQuery(format!("evidence '{}' is not of the form name=value", item)))
            }
        })
        .collect()
}


/// A named entry of the query catalog
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub id: u32,
    pub slug: &'static str,
    pub description: &'static str,
    pub query: Query,
}

impl Scenario {

    /// Find a scenario by its numeric id or its slug
    pub fn find(key: &str) -> Option<Scenario> {
        let key = key.trim();
        scenarios().into_iter()
                   .find(|s| s.slug.eq_ignore_ascii_case(key) || key.parse::<u32>() == Ok(s.id))
    }

}


fn given(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|&(n, l)| (String::from(n), String::from(l))).collect()
}


/// The queries the fraud network is built to answer
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: 1,
            slug: "fraud-prior",
            description: "prior probability of fraud, before anything about the transaction is known",
            query: Query::new("Fraud", vec![]),
        },
        Scenario {
            id: 2,
            slug: "ip-given-fp-notrav-crp",
            description: "internet purchase, for a foreign purchase by a cardholder at home with a recent computer-related purchase",
            query: Query::new("IP", given(&[("FP", "+fp"), ("Trav", "-trav"), ("CRP", "+crp")])),
        },
        Scenario {
            id: 3,
            slug: "fraud-given-fp-trav",
            description: "fraud, for a foreign purchase by a travelling cardholder",
            query: Query::new("Fraud", given(&[("FP", "+fp"), ("Trav", "+trav")])),
        },
        Scenario {
            id: 4,
            slug: "fraud-given-fp-oc",
            description: "fraud, for a foreign purchase by a cardholder who owns a computer",
            query: Query::new("Fraud", given(&[("FP", "+fp"), ("OC", "+oc")])),
        },
        Scenario {
            id: 5,
            slug: "fraud-given-fp-noip-crp",
            description: "fraud, for a foreign purchase made offline after a recent computer-related purchase",
            query: Query::new("Fraud", given(&[("FP", "+fp"), ("IP", "-ip"), ("CRP", "+crp")])),
        },
    ]
}


/// The inference engine a `QueryRunner` dispatches to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    VariableElimination,
    Enumeration,
}


/// A posterior distribution over the values of one variable
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Distribution {
    pub variable: String,

    /// the observed values, as labels
    pub evidence: Vec<String>,

    /// (label, probability) for every value of the variable, in domain order
    pub entries: Vec<(String, f64)>,
}

impl Distribution {

    /// Label the values of `factor`, a distribution over `var` alone
    pub fn from_factor(network: &Network, var: Variable, factor: &Factor, evidence: Vec<String>) -> Result<Self> {
        let entries = (0..var.cardinality())
            .map(|i| {
                let label = network.label(&var, i).map(String::from).unwrap_or_else(|| i.to_string());
                let assn: Assignment = vec![(var, i)].into_iter().collect();
                factor.value(&assn).map(|p| (label, p))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Distribution { variable: network.name_of(&var), evidence, entries })
    }

    /// The probability of the value labelled `label`
    pub fn probability(&self, label: &str) -> Option<f64> {
        self.entries.iter().find(|(l, _)| l == label).map(|&(_, p)| p)
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|&(_, p)| p).sum()
    }
}

impl fmt::Display for Distribution {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.evidence.is_empty() {
            writeln!(f, "P({})", self.variable)?;
        } else {
            writeln!(f, "P({} | {})", self.variable, self.evidence.join(", "))?;
        }

        let width = self.entries.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
        for (label, p) in self.entries.iter() {
            writeln!(f, "  {:<width$}  {:.5}", label, p, width = width)?;
        }

        Ok(())
    }

}


/// Resolves named queries against a `Network` and runs them on an inference engine.
///
/// A `QueryRunner` is `Send + Sync`; one runner may serve queries from many threads.
pub struct QueryRunner<'a> {
    network: &'a Network,
    kind: EngineKind,
    engine: Box<dyn ConditionalInferenceEngine + Send + Sync + 'a>,
}

impl<'a> QueryRunner<'a> {

    /// A runner using variable elimination in declaration order
    pub fn new(network: &'a Network) -> Self {
        QueryRunner::with_engine(network, EngineKind::VariableElimination, Box::new(DeclarationOrder))
    }

    /// A runner using the engine `kind`. `ordering` only applies to variable elimination.
    pub fn with_engine(network: &'a Network, kind: EngineKind, ordering: Box<dyn EliminationOrdering + 'a>) -> Self {
        let engine: Box<dyn ConditionalInferenceEngine + Send + Sync + 'a> = match kind {
            EngineKind::VariableElimination => Box::new(VariableEliminationEngine::with_ordering(network, ordering)),
            EngineKind::Enumeration => Box::new(EnumerationEngine::new(network)),
        };

        QueryRunner { network, kind, engine }
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    /// Answer `query`.
    ///
    /// # Errors
    /// * `InferError::InvalidQuery` if a variable name or value literal is unknown, or a variable
    ///   is observed twice, in addition to the errors of `ConditionalInferenceEngine::infer`
    pub fn run(&self, query: &Query) -> Result<Distribution> {
        let target = self.resolve_variable(query.target())?;

        let mut evidence = Assignment::new();
        let mut labels = Vec::with_capacity(query.evidence().len());
        for (name, literal) in query.evidence() {
            let var = self.resolve_variable(name)?;
            if evidence.contains(&var) {
                return Err(InferError::InvalidQuery(format!("{} is observed more than once", name)));
            }

            let value = resolve_literal(self.network, var, literal)?;
            evidence.set(&var, value);
            labels.push(self.network.label(&var, value).map(String::from).unwrap_or_else(|| literal.clone()));
        }

        info!(query = %query, engine = ?self.kind, "running query");
        let factor = self.engine.infer(target, &evidence)?;

        Distribution::from_factor(self.network, target, &factor, labels)
    }

    fn resolve_variable(&self, name: &str) -> Result<Variable> {
        if let Some(v) = self.network.lookup_variable(name) {
            return Ok(*v);
        }

        // fall back to a case-insensitive match
        self.network
            .variables()
            .into_iter()
            .find(|v| self.network.name_of(v).eq_ignore_ascii_case(name))
            .ok_or_else(|| InferError::InvalidQuery(format!("unknown variable '{}'", name)))
    }
}


/// Find the value index that `literal` names in the domain of `var`. Labels match without regard
/// to case; binary variables also accept ```+```/```true``` for value 0 and ```-```/```false```
/// for value 1.
fn resolve_literal(network: &Network, var: Variable, literal: &str) -> Result<usize> {
    if let Some(i) = network.value_index(&var, literal) {
        return Ok(i);
    }

    let domain = network.domain(&var).unwrap_or(&[]);
    if let Some(i) = domain.iter().position(|l| l.eq_ignore_ascii_case(literal)) {
        return Ok(i);
    }

    if var.cardinality() == 2 {
        match literal.to_ascii_lowercase().as_str() {
            "+" | "true" => return Ok(0),
            "-" | "false" => return Ok(1),
            _ => ()
        }
    }

    Err(InferError::InvalidQuery(format!(
        "'{}' is not a value of {}; expected one of {:?}",
        literal,
        network.name_of(&var),
        domain
    )))
}
