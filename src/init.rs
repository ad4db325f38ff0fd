//! Module containing the ways a `Variable`'s CPT can be supplied to a `Network`.

use crate::factor::{Factor, Table};
use crate::util::{InferError, Result};
use crate::variable::Variable;

use ndarray::{Axis, IxDyn};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Defines possible ways to initialize a `Variable`s CPT.
#[derive(Clone, Debug)]
pub enum Initialization<'a> {
    /// A uniform distribution over the values of the `Variable`, for every parent assignment
    Uniform,

    /// Randomly initialize the weights of the CPT.
    Random,

    /// Randomly initialize the weights of the CPT from a seeded generator, so the same seed always
    /// yields the same table
    Seeded(u64),

    /// Initialize the CPT as a Binomial distribution with parameter ```p = P(X = 0)```.
    /// Note that this `Initialization` is valid only for a binary `Variable` with no parents.
    Binomial(f64),

    /// Initialize the CPT as a Multinomial distribution with parameters ```p_0, p_1...```.
    /// Note that this `Initialization` is valid only for a `Variable` with no parents.
    Multinomial(&'a [f64]),

    /// CPT values listed in row-major order over ```parents ++ [var]```
    Values(Vec<f64>),

    /// User defined CPT
    Table(Factor)
}


impl<'a> Initialization<'a> {

    /// Construct a CPT, initialized based on ```self```
    ///
    /// # Args
    /// * `var`: the `Variable` the CPT is a distribution over
    /// * `parents`: the parents of `var`
    ///
    /// # Returns
    /// a `Factor` with scope ```parents ++ [var]```, except for `Initialization::Table`, which keeps
    /// the scope order of the supplied `Factor`.
    ///
    /// # Errors
    /// * `InferError::InvalidInitialization` if `self` cannot describe a CPT for `var`
    /// * `InferError::InvalidCpt` if the resulting table is not a conditional distribution
    pub fn build_cpd(self, var: Variable, parents: Vec<Variable>) -> Result<Factor> {
        ///////////////////////////////////////////////////////////////////////////////
        // Trivial cases

        // if this is a user defined factor, it just needs to be verified and returned
        if let Initialization::Table(f) = self {
            let s = f.scope();
            if parents.iter().all(|v| s.contains(v)) && s.len() == parents.len() + 1 && s.contains(&var) {
                f.check_cpd(var)?;
                return Ok(f);
            } else {
                return Err(InferError::invalid_cpt(
                    var.to_string(),
                    "the table's scope is not the variable and its parents"
                ));
            }
        }

        ///////////////////////////////////////////////////////////////////////////////
        // Check for errors
        match self {
            // A binomial/multinomial on a non-unit scope
            Initialization::Binomial(_) | Initialization::Multinomial(_) if !parents.is_empty() => {
                return Err(InferError::InvalidInitialization(var.to_string()));
            },

            // A binomial distribution on a non-binary variable
            Initialization::Binomial(_) if var.cardinality() != 2 => {
                return Err(InferError::InvalidInitialization(var.to_string()));
            },

            // A multinomial distribution with an incorrect number of parameters
            Initialization::Multinomial(ps) if ps.len() != var.cardinality() => {
                return Err(InferError::InvalidInitialization(var.to_string()));
            },

            _ => ()
        }

        ///////////////////////////////////////////////////////////////////////////////
        // now, build CPD
        let mut shape: Vec<usize> = parents.iter().map(|v| v.cardinality()).collect();
        shape.push(var.cardinality());
        let child = Axis(shape.len() - 1);

        let tbl = match self {
            Initialization::Uniform => {
                // normalizing constant is just the number of values
                let val = 1. / (var.cardinality() as f64);
                Table::from_elem(IxDyn(&shape), val)
            },
            Initialization::Random => {
                let tbl = Table::random(IxDyn(&shape), Uniform::new(1.0, 100.0));
                normalized_along(tbl, child)
            },
            Initialization::Seeded(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                let tbl = Table::random_using(IxDyn(&shape), Uniform::new(1.0, 100.0), &mut rng);
                normalized_along(tbl, child)
            },
            Initialization::Binomial(p) => {
                Table::from_shape_vec(IxDyn(&shape), vec![p, 1.0 - p])
                    .map_err(|_| InferError::InvalidInitialization(var.to_string()))?
            },
            Initialization::Multinomial(p) => {
                Table::from_shape_vec(IxDyn(&shape), p.to_vec())
                    .map_err(|_| InferError::InvalidInitialization(var.to_string()))?
            },
            Initialization::Values(values) => {
                Table::from_shape_vec(IxDyn(&shape), values).map_err(|e| {
                    InferError::invalid_cpt(var.to_string(), format!("values do not fit the scope: {}", e))
                })?
            },
            Initialization::Table(_) => unreachable!("handled above")
        };

        Factor::cpd(var, parents, tbl)
    }
}


/// Scale every lane along `axis` so it sums to 1
fn normalized_along(mut tbl: Table, axis: Axis) -> Table {
    for mut lane in tbl.lanes_mut(axis) {
        let z = lane.sum();
        lane.mapv_inplace(|e| e / z);
    }

    tbl
}
