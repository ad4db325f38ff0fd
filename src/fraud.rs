//! The credit-card fraud network.
//!
//! Six binary variables:
//!
//! ```text
//!   Trav        OC
//!    |  \      /  \
//!    |  Fraud     CRP
//!    |  /   \
//!    FP      IP <- OC
//! ```
//!
//! * `Trav`: the cardholder is travelling
//! * `Fraud`: the transaction is fraudulent
//! * `OC`: the cardholder owns a computer
//! * `CRP`: a computer-related purchase was made in the past week
//! * `FP`: the transaction is a foreign purchase
//! * `IP`: the transaction is an internet purchase
//!
//! Each table is listed parents-major with the `+` value before the `-` value, which is the
//! `parents ++ [child]` layout of a CPT.

use crate::init::Initialization;
use crate::network::{Network, NetworkBuilder};
use crate::util::Result;
use crate::variable::Variable;

use tracing::debug;

/// The CPT values of the fraud network
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FraudParameters {
    pub name: &'static str,

    /// ```P(Trav)```
    pub trav: [f64; 2],

    /// ```P(Fraud | Trav)```
    pub fraud: [f64; 4],

    /// ```P(OC)```
    pub oc: [f64; 2],

    /// ```P(CRP | OC)```
    pub crp: [f64; 4],

    /// ```P(FP | Trav, Fraud)```
    pub fp: [f64; 8],

    /// ```P(IP | OC, Fraud)```
    pub ip: [f64; 8],
}

impl FraudParameters {

    /// The parameters of the classic textbook exercise
    pub const TEXTBOOK: FraudParameters = FraudParameters {
        name: "textbook",
        trav: [0.05, 0.95],
        fraud: [0.05, 0.95,
                0.01, 0.99],
        oc: [0.9, 0.1],
        crp: [0.7, 0.3,
              0.2, 0.8],
        fp: [0.95, 0.05,
             0.9, 0.1,
             0.1, 0.9,
             0.01, 0.99],
        ip: [0.1, 0.9,
             0.85, 0.15,
             0.05, 0.95,
             0.6, 0.4],
    };

    /// Revised parameters: fraud is rarer, travellers buy abroad more, and fraudsters buy online
    pub const REALISTIC: FraudParameters = FraudParameters {
        name: "realistic",
        trav: [0.10, 0.90],
        fraud: [0.02, 0.98,
                0.005, 0.995],
        oc: [0.95, 0.05],
        crp: [0.80, 0.20,
              0.30, 0.70],
        fp: [0.98, 0.02,
             0.20, 0.80,
             0.95, 0.05,
             0.03, 0.97],
        ip: [0.05, 0.95,
             0.01, 0.99,
             0.90, 0.10,
             0.40, 0.60],
    };

    /// Look up a parameter set by name
    pub fn by_name(name: &str) -> Option<FraudParameters> {
        [FraudParameters::TEXTBOOK, FraudParameters::REALISTIC]
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned()
    }
}

impl Default for FraudParameters {

    fn default() -> Self {
        FraudParameters::TEXTBOOK
    }

}


/// The fraud `Network` together with handles to each of its variables
#[derive(Debug)]
pub struct FraudNetwork {
    pub network: Network,
    pub trav: Variable,
    pub fraud: Variable,
    pub oc: Variable,
    pub crp: Variable,
    pub fp: Variable,
    pub ip: Variable,
}

impl FraudNetwork {

    /// Build the fraud network from `params`.
    ///
    /// # Errors
    /// * `InferError::InvalidCpt` if a table of `params` is not a conditional distribution
    pub fn build(params: &FraudParameters) -> Result<Self> {
        let trav = Variable::binary();
        let fraud = Variable::binary();
        let oc = Variable::binary();
        let crp = Variable::binary();
        let fp = Variable::binary();
        let ip = Variable::binary();

        let network = NetworkBuilder::new()
            .with_named_variable(&trav, "Trav", &[], Initialization::Values(params.trav.to_vec()))
            .with_named_variable(&fraud, "Fraud", &[trav], Initialization::Values(params.fraud.to_vec()))
            .with_named_variable(&oc, "OC", &[], Initialization::Values(params.oc.to_vec()))
            .with_named_variable(&crp, "CRP", &[oc], Initialization::Values(params.crp.to_vec()))
            .with_named_variable(&fp, "FP", &[trav, fraud], Initialization::Values(params.fp.to_vec()))
            .with_named_variable(&ip, "IP", &[oc, fraud], Initialization::Values(params.ip.to_vec()))
            .build()?;

        debug!(parameters = params.name, "built fraud network");
        Ok(FraudNetwork { network, trav, fraud, oc, crp, fp, ip })
    }

}
