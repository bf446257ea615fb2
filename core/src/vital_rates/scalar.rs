use ndarray::{ArrayView1, ArrayView2};

use crate::math::stats::StatsHelper;
use crate::prelude::MpmResult;
use crate::vital_rates::vector::{self, conditional_rates};
use crate::vital_rates::{Transition, VrOptions, Weights};

fn reduce(values: Vec<Option<f64>>, weights: &Weights, opts: &VrOptions) -> MpmResult<f64> {
    StatsHelper::weighted_mean(&values, weights.as_slice()?, &opts.exclude_col)
}

/// Mean survival across stages.
pub fn vr_survival(u: ArrayView2<f64>, weights: &Weights, opts: &VrOptions) -> MpmResult<f64> {
    reduce(vector::vr_vec_survival(u, opts)?, weights, opts)
}

pub fn vr_growth(u: ArrayView2<f64>, weights: &Weights, opts: &VrOptions) -> MpmResult<f64> {
    reduce(conditional_rates(u, Transition::Growth, &[], opts)?, weights, opts)
}

pub fn vr_stasis(u: ArrayView2<f64>, weights: &Weights, opts: &VrOptions) -> MpmResult<f64> {
    reduce(conditional_rates(u, Transition::Stasis, &[], opts)?, weights, opts)
}

pub fn vr_shrinkage(u: ArrayView2<f64>, weights: &Weights, opts: &VrOptions) -> MpmResult<f64> {
    reduce(conditional_rates(u, Transition::Shrinkage, &[], opts)?, weights, opts)
}

/// Mean dormancy entry over active stages.
pub fn vr_dorm_enter(
    u: ArrayView2<f64>,
    dormant: &[usize],
    weights: &Weights,
    opts: &VrOptions,
) -> MpmResult<f64> {
    reduce(
        conditional_rates(u, Transition::DormEnter, dormant, opts)?,
        weights,
        opts,
    )
}

/// Mean dormancy exit over dormant stages.
pub fn vr_dorm_exit(
    u: ArrayView2<f64>,
    dormant: &[usize],
    weights: &Weights,
    opts: &VrOptions,
) -> MpmResult<f64> {
    reduce(
        conditional_rates(u, Transition::DormExit, dormant, opts)?,
        weights,
        opts,
    )
}

/// Mean per-capita reproduction.
///
/// Stages that never reproduce still count towards the mean; exclude them
/// through `opts.exclude_col` to average over reproductive stages only.
pub fn vr_reproduction(
    u: ArrayView2<f64>,
    r: ArrayView2<f64>,
    weights_row: Option<ArrayView1<f64>>,
    weights: &Weights,
    opts: &VrOptions,
) -> MpmResult<f64> {
    reduce(
        vector::vr_vec_reproduction(u, r, weights_row, opts)?,
        weights,
        opts,
    )
}
