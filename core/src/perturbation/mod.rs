//! Sensitivity and elasticity of λ to matrix entries, transition types and
//! underlying vital rates.

pub mod matrix;
pub mod trans;
pub mod vr;

use serde::{Deserialize, Serialize};

pub use matrix::{perturb_matrix, sens_elas, Perturbation};
pub use trans::{perturb_trans, TransitionPerturbation};
pub use vr::{perturb_vr, VrPerturbation};

/// Absolute (sensitivity) or proportional (elasticity) perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbType {
    /// `∂λ / ∂a_ij`.
    #[default]
    Sensitivity,
    /// `(a_ij / λ) ∂λ / ∂a_ij`.
    Elasticity,
}
