use log::debug;
use ndarray::{Array1, ArrayView2};

use crate::lifetable::trajectory::project_cohort;
use crate::lifetable::AgeLimits;
use crate::math::matrix::MatrixHelper;
use crate::prelude::{MpmError, MpmResult, Start};
use crate::validation;

/// Mean life expectancy from `start`, in model time steps.
///
/// Column sums of the fundamental matrix `(I - U)^-1`, weighted by the start
/// vector. Individuals are counted as alive in the time step they start in,
/// so a stage with survival `s` and no other transitions gives `1 / (1 - s)`.
pub fn life_expect(u: ArrayView2<f64>, start: &Start) -> MpmResult<f64> {
    let n = validation::ensure_survival(u)?;
    let start = start.vector(n)?;
    let fundamental = MatrixHelper::fundamental(u)?;
    let expectancy = MatrixHelper::column_sums(fundamental.view()).dot(&start);
    debug!("life_expect: {:.6}", expectancy);
    Ok(expectancy)
}

/// Variance of lifespan from `start`: `1ᵀ(2N² - N) - (1ᵀN)²`.
pub fn life_expect_var(u: ArrayView2<f64>, start: &Start) -> MpmResult<f64> {
    let n = validation::ensure_survival(u)?;
    let start = start.vector(n)?;
    let fundamental = MatrixHelper::fundamental(u)?;
    let mean_by_stage = MatrixHelper::column_sums(fundamental.view());
    let second_moment: Array1<f64> = MatrixHelper::column_sums(
        (2.0 * fundamental.dot(&fundamental) - &fundamental).view(),
    );
    let mean = mean_by_stage.dot(&start);
    let variance = second_moment.dot(&start) - mean * mean;
    Ok(variance.max(0.0))
}

/// First age at which survivorship from `start` drops below `limits.lx_crit`.
pub fn longevity(u: ArrayView2<f64>, start: &Start, limits: AgeLimits) -> MpmResult<usize> {
    let n = validation::ensure_survival(u)?;
    limits.validate()?;
    let cohort = project_cohort(u, None, start.vector(n)?, &limits);
    if cohort.lx.len() > limits.xmax {
        return Err(MpmError::Undefined(format!(
            "survivorship stays above {} up to xmax = {}",
            limits.lx_crit, limits.xmax
        )));
    }
    Ok(cohort.lx.len())
}
