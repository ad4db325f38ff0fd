//! Elimination orderings for variable elimination.
//!
//! The cost of variable elimination is governed by the largest intermediate factor, which depends
//! entirely on the order in which hidden variables are summed out. The default follows the
//! network's declaration order, which is adequate for networks with a handful of variables. The
//! greedy heuristics of Koller & Friedman Section 9.4.3 are available for larger networks.

use crate::factor::Factor;
use crate::network::Network;
use crate::variable::Variable;

use std::collections::{HashMap, HashSet};

/// A strategy that decides the order in which hidden variables are eliminated.
pub trait EliminationOrdering: Send + Sync {

    /// Order `hidden` for elimination.
    ///
    /// # Args
    /// * `network`: the network being queried
    /// * `factors`: the working set of factors, already reduced by the evidence
    /// * `hidden`: the variables to eliminate, in the network's enumeration order
    ///
    /// # Returns
    /// a permutation of `hidden`
    fn order(&self, network: &Network, factors: &[Factor], hidden: &[Variable]) -> Vec<Variable>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}


/// Eliminate in the network's enumeration (declaration) order
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclarationOrder;

impl EliminationOrdering for DeclarationOrder {

    fn order(&self, _network: &Network, _factors: &[Factor], hidden: &[Variable]) -> Vec<Variable> {
        hidden.to_vec()
    }

    fn name(&self) -> &'static str {
        "declaration"
    }
}


/// Greedy min-fill: repeatedly eliminate the variable whose elimination adds the fewest new edges
/// to the interaction graph. Ties go to the variable that comes first in enumeration order.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinFill;

impl EliminationOrdering for MinFill {

    fn order(&self, _network: &Network, factors: &[Factor], hidden: &[Variable]) -> Vec<Variable> {
        let mut neighbors = interaction_graph(factors, hidden);
        let mut remaining = hidden.to_vec();
        let mut order = Vec::with_capacity(hidden.len());

        while !remaining.is_empty() {
            let (pos, _) = remaining.iter()
                                    .enumerate()
                                    .map(|(i, v)| (i, fill_in(&neighbors, v)))
                                    .fold((0, usize::MAX), |best, cur| if cur.1 < best.1 { cur } else { best });

            let var = remaining.remove(pos);
            let adjacent: Vec<Variable> = neighbors[&var].iter().cloned().collect();

            // connect the neighbors of var to each other, then drop var from the graph
            for a in adjacent.iter() {
                for b in adjacent.iter() {
                    if a != b {
                        neighbors.entry(*a).or_default().insert(*b);
                    }
                }
                if let Some(n) = neighbors.get_mut(a) {
                    n.remove(&var);
                }
            }
            neighbors.remove(&var);
            order.push(var);
        }

        order
    }

    fn name(&self) -> &'static str {
        "min-fill"
    }
}


/// Maximum cardinality search (Koller & Friedman Algorithm 9.3): repeatedly mark the unmarked
/// variable with the most marked neighbors, then eliminate in the reverse of the marking order.
#[derive(Clone, Copy, Debug, Default)]
pub struct MaxCardinality;

impl EliminationOrdering for MaxCardinality {

    fn order(&self, _network: &Network, factors: &[Factor], hidden: &[Variable]) -> Vec<Variable> {
        let neighbors = interaction_graph(factors, hidden);

        // set of marked variables
        let mut marked = HashSet::new();
        // the (reverse) elimination order
        let mut elimination = Vec::with_capacity(hidden.len());

        for _ in 0..hidden.len() {
            let mut best: Option<(Variable, usize)> = None;

            for v in hidden.iter().filter(|v| !marked.contains(*v)) {
                // count the number of marked neighbors
                let ct = neighbors[v].iter().filter(|n| marked.contains(*n)).count();

                match best {
                    Some((_, max)) if ct <= max => (),
                    _ => best = Some((*v, ct))
                }
            }

            if let Some((v, _)) = best {
                elimination.push(v);
                marked.insert(v);
            }
        }

        // we need to reverse the elimination order before returning
        elimination.reverse();
        elimination
    }

    fn name(&self) -> &'static str {
        "max-cardinality"
    }
}


/// Build the undirected interaction graph of `factors`: two variables are adjacent when some
/// factor mentions both. Every variable in `hidden` has an entry, even when isolated.
fn interaction_graph(factors: &[Factor], hidden: &[Variable]) -> HashMap<Variable, HashSet<Variable>> {
    let mut neighbors: HashMap<Variable, HashSet<Variable>> = hidden.iter()
                                                                    .map(|v| (*v, HashSet::new()))
                                                                    .collect();

    for f in factors.iter() {
        let scope = f.scope();
        for (i, vi) in scope.iter().enumerate() {
            for vj in scope[i + 1..].iter() {
                neighbors.entry(*vi).or_default().insert(*vj);
                neighbors.entry(*vj).or_default().insert(*vi);
            }
        }
    }

    neighbors
}


/// Number of edges eliminating `var` would add between its neighbors
fn fill_in(neighbors: &HashMap<Variable, HashSet<Variable>>, var: &Variable) -> usize {
    let adjacent: Vec<&Variable> = neighbors[var].iter().collect();
    let mut count = 0;

    for (i, a) in adjacent.iter().enumerate() {
        for b in adjacent[i + 1..].iter() {
            if !neighbors[*a].contains(*b) {
                count += 1;
            }
        }
    }

    count
}
