use log::debug;
use ndarray::{Array1, ArrayView2};

use crate::lifetable::{convert, AgeLimits};
use crate::prelude::{MpmResult, Start};
use crate::validation;

/// Cohort followed from a start vector until survivorship drops below
/// `lx_crit`, reaches zero, or the age cap is hit.
pub(crate) struct Cohort {
    pub lx: Vec<f64>,
    /// Offspring produced at each age by the surviving cohort (empty without F).
    pub fertility: Vec<f64>,
    /// Survivorship one age past the last retained one.
    pub next_lx: f64,
}

pub(crate) fn project_cohort(
    u: ArrayView2<f64>,
    f: Option<ArrayView2<f64>>,
    start: Array1<f64>,
    limits: &AgeLimits,
) -> Cohort {
    let mut cohort = start;
    let mut lx = Vec::new();
    let mut fertility = Vec::new();
    for _ in 0..=limits.xmax {
        let survivors = cohort.sum();
        if survivors <= 0.0 || survivors < limits.lx_crit {
            break;
        }
        lx.push(survivors);
        if let Some(f) = f {
            fertility.push(f.dot(&cohort).sum());
        }
        cohort = u.dot(&cohort);
    }
    Cohort {
        lx,
        fertility,
        next_lx: cohort.sum(),
    }
}

/// Survivorship `lx` from age 0: the probability that an individual in the
/// start stage(s) is still alive at each age.
pub fn mpm_to_lx(u: ArrayView2<f64>, start: &Start, limits: AgeLimits) -> MpmResult<Array1<f64>> {
    let n = validation::ensure_survival(u)?;
    limits.validate()?;
    let cohort = project_cohort(u, None, start.vector(n)?, &limits);
    debug!("mpm_to_lx: {} ages retained", cohort.lx.len());
    Ok(Array1::from(cohort.lx))
}

/// Age-specific survival probability, `lx_to_px ∘ mpm_to_lx`.
pub fn mpm_to_px(u: ArrayView2<f64>, start: &Start, limits: AgeLimits) -> MpmResult<Array1<f64>> {
    let lx = mpm_to_lx(u, start, limits)?;
    convert::lx_to_px(lx.view())
}

/// Age-specific mortality hazard, `lx_to_hx ∘ mpm_to_lx`.
pub fn mpm_to_hx(u: ArrayView2<f64>, start: &Start, limits: AgeLimits) -> MpmResult<Array1<f64>> {
    let lx = mpm_to_lx(u, start, limits)?;
    convert::lx_to_hx(lx.view())
}

/// Age-specific fecundity per survivor, aligned with [`mpm_to_lx`].
pub fn mpm_to_mx(
    u: ArrayView2<f64>,
    f: ArrayView2<f64>,
    start: &Start,
    limits: AgeLimits,
) -> MpmResult<Array1<f64>> {
    let n = validation::ensure_pair(u, f)?;
    limits.validate()?;
    let cohort = project_cohort(u, Some(f), start.vector(n)?, &limits);
    Ok(cohort
        .fertility
        .iter()
        .zip(cohort.lx.iter())
        .map(|(offspring, survivors)| offspring / survivors)
        .collect())
}
