//! Structural transformations of a model: collapsing stages, splitting a
//! projection matrix, reordering stages and standardising to a common
//! stage set.

pub mod collapse;
pub mod rearrange;
pub mod split;
pub mod standardize;

use ndarray::{Array2, ArrayView2};

use crate::prelude::{Mpm, MpmResult};

pub use collapse::mpm_collapse;
pub use rearrange::{mpm_rearrange, Rearranged};
pub use split::mpm_split;
pub use standardize::{mpm_standardize, standard_stages, StageGroup, StandardStage, Standardized};

/// Applies the same matrix transformation to every component of `mpm`.
fn map_components<F>(mpm: &Mpm, transform: F) -> MpmResult<Mpm>
where
    F: Fn(ArrayView2<f64>) -> Array2<f64>,
{
    let u = transform(mpm.u());
    let f = transform(mpm.f());
    match mpm.c() {
        Some(c) => Mpm::with_clonal(u, f, transform(c)),
        None => Mpm::new(u, f),
    }
}
