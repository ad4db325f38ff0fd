//! Defines a `Network`, a Bayesian network representing the factorization of a probability
//! distribution P over a fixed set of discrete `Variable`s.

use crate::factor::Factor;
use crate::init::Initialization;
use crate::util::{InferError, Result};
use crate::variable::{Assignment, Variable};

use bidir_map::BidirMap;
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::debug;

use std::collections::HashMap;
use std::fmt;


/// Represents a Bayesian Network - a Directed Probabilistic Graphical Model.
///
/// # Representation
/// The network is represented as a Directed Acyclic Graph (DAG). A traditional graph data
/// structure is not used; instead, the Conditional Probability Table (CPT) of each `Variable`
/// implicitly defines the edges of the graph. The `Variable`s are held in topological order,
/// which is also the default elimination order for inference.
///
/// A `Network` is immutable once built and may be shared across threads.
pub struct Network {

    /// The `Variable`s comprising the scope of the `Network` and their associated CPTs. Note
    /// that the `Factor` associated with a `Variable` ```X``` has scope ```X U Pa(X)```, where
    /// ```Pa(X)``` are the parents of ```X```. Therefore, in the DAG represented by this map,
    /// there are edges ```P -> X forall P in X.scope() where P != X```
    graph: IndexMap<Variable, Factor>,

    /// The user-defined names of each `Variable`. This is a two way lookup ```(`Variable`->Name)```
    /// and ```(Name->`Variable`)```
    names: BidirMap<Variable, String>,

    /// The value labels of each `Variable`, indexed by value
    domains: HashMap<Variable, Vec<String>>

}

impl Network {

    /// Get the CPT for the given variable in this network.
    pub fn cpt(&self, v: &Variable) -> Option<&Factor> {
        self.graph.get(v)
    }

    /// Every CPT in the network, in topological order
    pub fn cpts(&self) -> impl Iterator<Item = &Factor> {
        self.graph.values()
    }

    /// Get the parents of `v`, in the order of its CPT's scope
    pub fn parents(&self, v: &Variable) -> Vec<Variable> {
        self.cpt(v)
            .map(|f| f.scope().iter().cloned().filter(|p| p != v).collect())
            .unwrap_or_default()
    }

    /// Get the children of `v`, in topological order
    pub fn children(&self, v: &Variable) -> Vec<Variable> {
        self.graph.iter()
                  .filter(|&(c, f)| c != v && f.contains(v))
                  .map(|(&c, _)| c)
                  .collect()
    }

    /// Get the value labels of `v`
    pub fn domain(&self, v: &Variable) -> Option<&[String]> {
        self.domains.get(v).map(|d| d.as_slice())
    }

    /// Get all `Variable`s in the network, in topological order. Unless the declaration order
    /// was not topological, this is the order in which they were declared.
    pub fn variables(&self) -> Vec<Variable> {
        self.graph.keys().cloned().collect()
    }

    /// Get the number of `Variable`s in the the `Network`
    pub fn num_variables(&self) -> usize {
        self.graph.len()
    }

    /// Check if `v` belongs to this `Network`
    pub fn contains(&self, v: &Variable) -> bool {
        self.graph.contains_key(v)
    }

    /// Lookup a `Variable` in the `Network` based on the name
    pub fn lookup_variable(&self, name: &str) -> Option<&Variable> {
        self.names.get_by_second(&String::from(name))
    }

    /// Lookup a `Variable`'s name in the `Network`.
    pub fn lookup_name(&self, var: &Variable) -> Option<&String> {
        self.names.get_by_first(var)
    }

    /// The name of `var`, or its anonymous display form if it is not in the network
    pub fn name_of(&self, var: &Variable) -> String {
        self.lookup_name(var).cloned().unwrap_or_else(|| var.to_string())
    }

    /// Find the value index of the label `label` in the domain of `var`
    pub fn value_index(&self, var: &Variable, label: &str) -> Option<usize> {
        self.domain(var).and_then(|d| d.iter().position(|l| l == label))
    }

    /// Get the label of value `index` of `var`
    pub fn label(&self, var: &Variable, index: usize) -> Option<&str> {
        self.domain(var).and_then(|d| d.get(index)).map(|l| l.as_str())
    }

    /// Determine the probability of a full `Assignment` to the `Variable`s in the `Network`.
    ///
    /// Specifically, this computes ```P(zeta)```, where ```zeta``` is a full assignment.
    ///
    /// # Errors
    /// * `InferError::IncompleteAssignment` if `assignment` does not assign every `Variable`
    pub fn probability(&self, assignment: &Assignment) -> Result<f64> {
        // for every variable in the graph
        self.graph.values()
                  // get the probability of the assignment
                  .map(|cpt| cpt.value(assignment))
                  // and multiply those probability by the chain rule
                  // but if there are any errors, just return the error
                  .fold(Ok(1.0), |acc, val| acc.and_then(|p| val.map(|v| p * v)))
    }
}

impl fmt::Debug for Network {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = f.debug_map();
        for v in self.graph.keys() {
            s.entry(&self.name_of(v), &self.parents(v).iter().map(|p| self.name_of(p)).collect::<Vec<_>>());
        }
        s.finish()
    }

}


/// A `Variable` as declared to a `NetworkBuilder`, before validation
struct Declaration<'a> {
    var: Variable,
    name: String,
    labels: Option<Vec<String>>,
    parents: Vec<Variable>,
    init: Initialization<'a>
}


/// An implementation of the [builder pattern] for creating a `Network`.
///
/// `Variable`s may be declared in any order; `build` arranges them topologically. Errors are
/// latched: the first error encountered is the one `build` reports.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct NetworkBuilder<'a> {

    /// The declared `Variable`s, in declaration order
    decls: Vec<Declaration<'a>>,

    /// The error state of the builder
    err: Option<InferError>

}


impl<'a> Default for NetworkBuilder<'a> {

    fn default() -> Self {
        NetworkBuilder::new()
    }

}


impl<'a> NetworkBuilder<'a> {

    /// Construct a new `NetworkBuilder` representing an empty `Network`
    pub fn new() -> Self {
        NetworkBuilder {
            decls: Vec::new(),
            err: None
        }
    }


    /// Add an anonymous `Variable` to the `Network`.
    ///
    /// # Args
    /// * `var`: the variable to add to the network
    /// * `parents`: the parent variables, in the order their axes appear in the CPT.
    /// * `init`: the initialization mechanism for the CPT of `var` in the network.
    pub fn with_variable(self, var: &Variable, parents: &[Variable], init: Initialization<'a>) -> Self {
        let name = var.to_string();
        self.add_variable(var, name, None, parents, init)
    }


    /// Add a named `Variable` to the `Network`. A binary `Variable` named `Foo` gets the value
    /// labels ```["+foo", "-foo"]```; any other `Variable` is labelled ```"0", "1", ...```.
    pub fn with_named_variable(
        self,
        var: &Variable,
        name: &str,
        parents: &[Variable],
        init: Initialization<'a>,
    ) -> Self {
        self.add_variable(var, String::from(name), None, parents, init)
    }


    /// Add a named `Variable` with explicit value labels to the `Network`.
    pub fn with_labeled_variable(
        self,
        var: &Variable,
        name: &str,
        labels: &[&str],
        parents: &[Variable],
        init: Initialization<'a>,
    ) -> Self {
        let labels = labels.iter().map(|l| String::from(*l)).collect();
        self.add_variable(var, String::from(name), Some(labels), parents, init)
    }


    /// Complete building the network.
    ///
    /// # Returns
    /// the `Network`, or an error if one was generated during the building process
    ///
    /// # Errors
    /// * `InferError::DuplicateVariable` if a `Variable` or a name was declared twice
    /// * `InferError::InvalidCpt` if a domain is malformed, a parent was never declared, a CPT is
    ///   not a conditional distribution, or a `Variable` is disconnected from the rest
    /// * `InferError::CyclicDependency` if the parent graph has a cycle
    ///
    /// # Postcondition
    /// This call consumes the `NetworkBuilder`
    pub fn build(self) -> Result<Network> {
        if let Some(e) = self.err {
            return Err(e);
        }

        let decls = self.decls;

        ///////////////////////////////////////////////////////////////////////
        // 1) Names must be unique
        if let Some(name) = decls.iter().map(|d| &d.name).duplicates().next() {
            return Err(InferError::DuplicateVariable(name.clone()));
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Domains must be non-empty with unique labels
        let mut domains = HashMap::new();
        for d in decls.iter() {
            let labels = d.labels.clone().unwrap_or_else(|| default_labels(&d.var, &d.name));
            validate_domain(&d.var, &d.name, &labels)?;
            domains.insert(d.var, labels);
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) Every parent must have been declared
        let declared: Vec<Variable> = decls.iter().map(|d| d.var).collect();
        for d in decls.iter() {
            if d.parents.iter().unique().count() != d.parents.len() {
                return Err(InferError::invalid_cpt(d.name.as_str(), "a parent is listed twice"));
            }

            if let Some(p) = d.parents.iter().find(|p| !declared.contains(p)) {
                return Err(InferError::invalid_cpt(
                    d.name.as_str(),
                    format!("parent {} has no CPT in the network", p)
                ));
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 4) Arrange topologically
        let order = topological_order(&decls)?;

        ///////////////////////////////////////////////////////////////////////
        // 5) Build and validate each CPT
        let mut slots: Vec<Option<Declaration>> = decls.into_iter().map(Some).collect();
        let mut graph = IndexMap::new();
        let mut names = BidirMap::new();

        for i in order {
            let d = match slots[i].take() {
                Some(d) => d,
                None => continue
            };

            let cpt = d.init.build_cpd(d.var, d.parents).map_err(|e| named(e, &d.name))?;
            graph.insert(d.var, cpt);
            names.insert(d.var, d.name);
        }

        let network = Network { graph, names, domains };

        ///////////////////////////////////////////////////////////////////////
        // 6) No variable may be disconnected from the rest of the network
        if network.num_variables() > 1 {
            for v in network.graph.keys() {
                if network.parents(v).is_empty() && network.children(v).is_empty() {
                    return Err(InferError::invalid_cpt(
                        network.name_of(v),
                        "the variable is disconnected from the rest of the network"
                    ));
                }
            }
        }

        debug!(variables = ?network, "built network");
        Ok(network)
    }

    /// Internal function that records a variable declaration
    fn add_variable(
        mut self,
        var: &Variable,
        name: String,
        labels: Option<Vec<String>>,
        parents: &[Variable],
        init: Initialization<'a>,
    ) -> Self {
        // if we are in an error state, do nothing
        if self.err.is_some() {
            return self;
        }

        if self.decls.iter().any(|d| d.var == *var) {
            self.err = Some(InferError::DuplicateVariable(name));
            return self;
        }

        self.decls.push(Declaration { var: *var, name, labels, parents: parents.to_vec(), init });
        self
    }
}


/// `["+name", "-name"]` for binary variables, `"0".."n-1"` otherwise
fn default_labels(var: &Variable, name: &str) -> Vec<String> {
    if var.cardinality() == 2 {
        let name = name.to_lowercase();
        vec![format!("+{}", name), format!("-{}", name)]
    } else {
        (0..var.cardinality()).map(|i| i.to_string()).collect()
    }
}


fn validate_domain(var: &Variable, name: &str, labels: &[String]) -> Result<()> {
    if var.cardinality() == 0 {
        return Err(InferError::invalid_cpt(name, "the domain is empty"));
    }

    if labels.len() != var.cardinality() {
        return Err(InferError::invalid_cpt(
            name,
            format!("{} labels given for {} values", labels.len(), var.cardinality())
        ));
    }

    if labels.iter().any(|l| l.is_empty()) {
        return Err(InferError::invalid_cpt(name, "a value label is empty"));
    }

    if labels.iter().unique().count() != labels.len() {
        return Err(InferError::invalid_cpt(name, "value labels are not unique"));
    }

    Ok(())
}


/// Kahn's algorithm, always taking the earliest declared ready variable, so an already
/// topological declaration order is preserved.
fn topological_order(decls: &[Declaration]) -> Result<Vec<usize>> {
    let mut pending: Vec<usize> = decls.iter().map(|d| d.parents.len()).collect();
    let mut placed = vec![false; decls.len()];
    let mut order = Vec::with_capacity(decls.len());

    let children: Vec<Vec<usize>> = decls.iter().map(|d| {
        decls.iter()
             .enumerate()
             .filter(|(_, c)| c.parents.contains(&d.var))
             .map(|(i, _)| i)
             .collect()
    }).collect();

    while order.len() < decls.len() {
        let next = (0..decls.len()).find(|&i| !placed[i] && pending[i] == 0);

        match next {
            Some(i) => {
                placed[i] = true;
                order.push(i);
                for &c in children[i].iter() {
                    pending[c] -= 1;
                }
            },
            None => {
                let stuck = (0..decls.len()).filter(|&i| !placed[i]).map(|i| decls[i].name.clone()).collect();
                return Err(InferError::CyclicDependency(stuck));
            }
        }
    }

    Ok(order)
}


/// Replace the anonymous variable display in CPT errors with the declared name
fn named(err: InferError, name: &str) -> InferError {
    match err {
        InferError::InvalidCpt { reason, .. } => InferError::invalid_cpt(name, reason),
        InferError::InvalidInitialization(_) => InferError::InvalidInitialization(String::from(name)),
        other => other
    }
}
