use ndarray::{ArrayView1, ArrayView2};

use crate::prelude::{MpmError, MpmResult};
use crate::validation;
use crate::vital_rates::{Transition, VrOptions};

/// Column survival `σ_j = Σ_i U_ij`; `None` for excluded columns.
pub fn vr_vec_survival(u: ArrayView2<f64>, opts: &VrOptions) -> MpmResult<Vec<Option<f64>>> {
    let n = validation::ensure_survival(u)?;
    opts.validate(n)?;
    Ok((0..n)
        .map(|j| {
            if opts.exclude_col.contains(&j) {
                None
            } else {
                Some(u.column(j).sum())
            }
        })
        .collect())
}

pub(crate) fn conditional_rates(
    u: ArrayView2<f64>,
    kind: Transition,
    dormant: &[usize],
    opts: &VrOptions,
) -> MpmResult<Vec<Option<f64>>> {
    let n = validation::ensure_survival(u)?;
    opts.validate(n)?;
    validation::ensure_stages(dormant, n)?;
    opts.warn_dormant_overlap(dormant);

    Ok((0..n)
        .map(|j| {
            if opts.exclude_col.contains(&j) || !kind.applies_to(j, dormant) {
                return None;
            }
            let column = u.column(j);
            let survival = column.sum();
            if survival <= 0.0 {
                return None;
            }
            if opts.surv_only_na && column.iter().filter(|v| **v > 0.0).count() == 1 {
                return None;
            }
            let moved: f64 = column
                .iter()
                .enumerate()
                .filter(|(i, _)| !opts.exclude_row.contains(i) && kind.selects(*i, j, dormant))
                .map(|(_, v)| *v)
                .sum();
            Some(moved / survival)
        })
        .collect())
}

/// Probability of moving to a later stage, conditional on survival.
pub fn vr_vec_growth(u: ArrayView2<f64>, opts: &VrOptions) -> MpmResult<Vec<Option<f64>>> {
    conditional_rates(u, Transition::Growth, &[], opts)
}

/// Probability of remaining in the same stage, conditional on survival.
pub fn vr_vec_stasis(u: ArrayView2<f64>, opts: &VrOptions) -> MpmResult<Vec<Option<f64>>> {
    conditional_rates(u, Transition::Stasis, &[], opts)
}

/// Probability of moving to an earlier stage, conditional on survival.
pub fn vr_vec_shrinkage(u: ArrayView2<f64>, opts: &VrOptions) -> MpmResult<Vec<Option<f64>>> {
    conditional_rates(u, Transition::Shrinkage, &[], opts)
}

/// Probability that a surviving active individual enters dormancy.
pub fn vr_vec_dorm_enter(
    u: ArrayView2<f64>,
    dormant: &[usize],
    opts: &VrOptions,
) -> MpmResult<Vec<Option<f64>>> {
    conditional_rates(u, Transition::DormEnter, dormant, opts)
}

/// Probability that a surviving dormant individual becomes active.
pub fn vr_vec_dorm_exit(
    u: ArrayView2<f64>,
    dormant: &[usize],
    opts: &VrOptions,
) -> MpmResult<Vec<Option<f64>>> {
    conditional_rates(u, Transition::DormExit, dormant, opts)
}

/// Offspring per individual of each stage, `Σ_i w_i R_ij`.
///
/// `weights_row` weights offspring by the stage they are born into (for
/// example by reproductive value); by default every offspring counts once.
pub fn vr_vec_reproduction(
    u: ArrayView2<f64>,
    r: ArrayView2<f64>,
    weights_row: Option<ArrayView1<f64>>,
    opts: &VrOptions,
) -> MpmResult<Vec<Option<f64>>> {
    let n = validation::ensure_pair(u, r)?;
    opts.validate(n)?;
    if let Some(w) = weights_row {
        if w.len() != n {
            return Err(MpmError::DimensionMismatch(format!(
                "{} row weights for {} stages",
                w.len(),
                n
            )));
        }
    }
    Ok((0..n)
        .map(|j| {
            if opts.exclude_col.contains(&j) {
                return None;
            }
            let offspring = r
                .column(j)
                .iter()
                .enumerate()
                .filter(|(i, _)| !opts.exclude_row.contains(i))
                .map(|(i, v)| weights_row.map_or(1.0, |w| w[i]) * v)
                .sum();
            Some(offspring)
        })
        .collect())
}
