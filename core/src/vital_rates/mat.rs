use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::Serialize;

use crate::math::matrix::MatrixHelper;
use crate::prelude::MpmResult;
use crate::validation;

/// A matrix split into column survival and rates conditional on survival.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionalRates {
    /// Column sums of `U`.
    pub survival: Array1<f64>,
    /// Entries divided by their column survival. Columns with zero survival
    /// are left at zero.
    pub rates: Array2<f64>,
    /// Columns whose conditional rates are undefined.
    pub undefined: Vec<usize>,
}

impl ConditionalRates {
    /// Multiplies the rates back by column survival.
    pub fn recompose(&self) -> Array2<f64> {
        &self.rates * &self.survival.view().insert_axis(Axis(0))
    }
}

fn condition_on_survival(
    survival: Array1<f64>,
    m: ArrayView2<f64>,
) -> ConditionalRates {
    let mut rates = m.to_owned();
    let mut undefined = Vec::new();
    for (j, mut column) in rates.axis_iter_mut(Axis(1)).enumerate() {
        let sigma = survival[j];
        if sigma > 0.0 {
            column.mapv_inplace(|v| v / sigma);
        } else {
            column.fill(0.0);
            undefined.push(j);
        }
    }
    ConditionalRates {
        survival,
        rates,
        undefined,
    }
}

/// Transition probabilities conditional on survival.
pub fn vr_mat_u(u: ArrayView2<f64>) -> MpmResult<ConditionalRates> {
    validation::ensure_survival(u)?;
    Ok(condition_on_survival(MatrixHelper::column_sums(u), u))
}

/// Reproduction per surviving individual of each stage, `R_ij / σ_j`.
///
/// This assumes reproduction happens after survival (a post-breeding
/// census); stages that reproduce without surviving are reported as
/// undefined.
pub fn vr_mat_r(u: ArrayView2<f64>, r: ArrayView2<f64>) -> MpmResult<ConditionalRates> {
    validation::ensure_pair(u, r)?;
    Ok(condition_on_survival(MatrixHelper::column_sums(u), r))
}
