use ndarray::ArrayView2;
use serde::Serialize;

use crate::lifetable::trajectory::project_cohort;
use crate::lifetable::AgeLimits;
use crate::prelude::{MpmResult, Start};
use crate::validation;

/// Cohort life table derived from a stage-structured model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifeTable {
    pub x: Vec<usize>,
    pub lx: Vec<f64>,
    pub dx: Vec<f64>,
    pub qx: Vec<f64>,
    pub px: Vec<f64>,
    /// Person-years lived between x and x+1.
    #[serde(rename = "Lx")]
    pub big_lx: Vec<f64>,
    /// Person-years lived beyond age x (within the table).
    #[serde(rename = "Tx")]
    pub tx: Vec<f64>,
    pub ex: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mx: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lxmx: Option<Vec<f64>>,
}

impl LifeTable {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Builds a life table for the cohort starting at `start`.
///
/// The table ends at the last age retained by `limits`; survivorship one
/// age beyond it is projected through `U` so the final `dx`/`qx` are real
/// values rather than a forced total die-off.
pub fn mpm_to_table(
    u: ArrayView2<f64>,
    f: Option<ArrayView2<f64>>,
    start: &Start,
    limits: AgeLimits,
) -> MpmResult<LifeTable> {
    let n = match f {
        Some(f) => validation::ensure_pair(u, f)?,
        None => validation::ensure_survival(u)?,
    };
    limits.validate()?;
    let cohort = project_cohort(u, f, start.vector(n)?, &limits);
    let lx = cohort.lx;
    let ages = lx.len();

    let next: Vec<f64> = lx
        .iter()
        .skip(1)
        .copied()
        .chain(std::iter::once(cohort.next_lx))
        .collect();
    let dx: Vec<f64> = lx.iter().zip(&next).map(|(now, after)| now - after).collect();
    let qx: Vec<f64> = dx.iter().zip(&lx).map(|(d, l)| d / l).collect();
    let px: Vec<f64> = qx.iter().map(|q| 1.0 - q).collect();
    let big_lx: Vec<f64> = lx
        .iter()
        .zip(&next)
        .map(|(now, after)| 0.5 * (now + after))
        .collect();
    let mut tx = vec![0.0; ages];
    let mut remaining = 0.0;
    for age in (0..ages).rev() {
        remaining += big_lx[age];
        tx[age] = remaining;
    }
    let ex: Vec<f64> = tx.iter().zip(&lx).map(|(t, l)| t / l).collect();

    let (mx, lxmx) = if f.is_some() {
        let mx: Vec<f64> = cohort
            .fertility
            .iter()
            .zip(&lx)
            .map(|(offspring, l)| offspring / l)
            .collect();
        let lxmx = mx.iter().zip(&lx).map(|(m, l)| m * l).collect();
        (Some(mx), Some(lxmx))
    } else {
        (None, None)
    };

    Ok(LifeTable {
        x: (0..ages).collect(),
        lx,
        dx,
        qx,
        px,
        big_lx,
        tx,
        ex,
        mx,
        lxmx,
    })
}
