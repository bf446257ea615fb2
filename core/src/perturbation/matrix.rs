use ndarray::{Array2, ArrayView2, Axis};
use serde::Serialize;

use crate::math::eigen::EigenHelper;
use crate::perturbation::PerturbType;
use crate::prelude::MpmResult;

/// Sensitivities and elasticities of λ to every entry of `A`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Perturbation {
    pub lambda: f64,
    pub sensitivity: Array2<f64>,
    pub elasticity: Array2<f64>,
}

impl Perturbation {
    pub fn get(&self, kind: PerturbType) -> &Array2<f64> {
        match kind {
            PerturbType::Sensitivity => &self.sensitivity,
            PerturbType::Elasticity => &self.elasticity,
        }
    }
}

/// Computes `s_ij = v_i w_j / <v, w>` and `e_ij = s_ij a_ij / λ`.
///
/// Sensitivities are reported for every entry, including structural zeros.
pub fn sens_elas(a: ArrayView2<f64>) -> MpmResult<Perturbation> {
    let eig = EigenHelper::dominant(a)?;
    // left is already scaled so that left . right == 1
    let sensitivity = eig
        .left
        .view()
        .insert_axis(Axis(1))
        .dot(&eig.right.view().insert_axis(Axis(0)));
    let elasticity = &sensitivity * &a / eig.lambda;
    Ok(Perturbation {
        lambda: eig.lambda,
        sensitivity,
        elasticity,
    })
}

pub fn perturb_matrix(a: ArrayView2<f64>, kind: PerturbType) -> MpmResult<Array2<f64>> {
    let perturbation = sens_elas(a)?;
    Ok(match kind {
        PerturbType::Sensitivity => perturbation.sensitivity,
        PerturbType::Elasticity => perturbation.elasticity,
    })
}
