//! Decomposition of `U` (and reproduction matrices) into stage-specific
//! vital rates.
//!
//! Stages are assumed to be ordered by developmental rank, so rows below the
//! diagonal of a column are growth, the diagonal is stasis and rows above it
//! are shrinkage. Transition rates are conditional on survival.
//!
//! Three layers share one categorisation ([`Transition`]):
//! - `vr_vec_*` return one `Option<f64>` per stage (`None` when the rate is
//!   undefined or the stage is excluded);
//! - `vr_*` reduce those vectors to a scalar through
//!   [`StatsHelper::weighted_mean`](crate::math::stats::StatsHelper::weighted_mean);
//! - `vr_mat_*` return whole matrices of rates conditional on survival.

pub mod mat;
pub mod scalar;
pub mod vector;

use log::warn;
use ndarray::{Array1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::math::eigen::EigenHelper;
use crate::prelude::{MpmError, MpmResult};
use crate::validation;

pub use mat::{vr_mat_r, vr_mat_u, ConditionalRates};
pub use scalar::{
    vr_dorm_enter, vr_dorm_exit, vr_growth, vr_reproduction, vr_shrinkage, vr_stasis,
    vr_survival,
};
pub use vector::{
    vr_vec_dorm_enter, vr_vec_dorm_exit, vr_vec_growth, vr_vec_reproduction, vr_vec_shrinkage,
    vr_vec_stasis, vr_vec_survival,
};

/// Stage exclusions applied before rates are computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VrOptions {
    /// Transitions into these stages are not counted.
    pub exclude_row: Vec<usize>,
    /// Rates for these stages are not reported (and not averaged).
    pub exclude_col: Vec<usize>,
    /// Treat a column with a single possible transition as pure survival,
    /// leaving its conditional rates undefined.
    pub surv_only_na: bool,
}

impl Default for VrOptions {
    fn default() -> Self {
        Self {
            exclude_row: Vec::new(),
            exclude_col: Vec::new(),
            surv_only_na: true,
        }
    }
}

impl VrOptions {
    /// Excludes `stages` both as origins and as destinations.
    pub fn excluding(stages: &[usize]) -> Self {
        Self {
            exclude_row: stages.to_vec(),
            exclude_col: stages.to_vec(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self, stages: usize) -> MpmResult<()> {
        validation::ensure_stages(&self.exclude_row, stages)?;
        validation::ensure_stages(&self.exclude_col, stages)
    }

    /// Logs stages that are both dormant and excluded; exclusion wins.
    pub(crate) fn warn_dormant_overlap(&self, dormant: &[usize]) {
        let overlap: Vec<usize> = dormant
            .iter()
            .copied()
            .filter(|stage| self.exclude_col.contains(stage) || self.exclude_row.contains(stage))
            .collect();
        if !overlap.is_empty() {
            warn!(
                "stages {:?} are both dormant and excluded; treating them as excluded",
                overlap
            );
        }
    }
}

/// Stage weights for scalar summaries.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Weights {
    #[default]
    Unweighted,
    Custom(Array1<f64>),
}

impl Weights {
    /// Weights by the stable stage distribution of `a`.
    pub fn stable(a: ArrayView2<f64>) -> MpmResult<Self> {
        Ok(Weights::Custom(EigenHelper::stable_dist(a)?))
    }

    pub(crate) fn as_slice(&self) -> MpmResult<Option<&[f64]>> {
        match self {
            Weights::Unweighted => Ok(None),
            Weights::Custom(w) => w
                .as_slice()
                .map(Some)
                .ok_or_else(|| MpmError::InvalidInput("weights are not contiguous".into())),
        }
    }
}

/// Kinds of transitions a survivor can make out of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Growth,
    Stasis,
    Shrinkage,
    /// Active stage into a dormant one.
    DormEnter,
    /// Dormant stage into an active one.
    DormExit,
}

impl Transition {
    /// Whether the rate is defined for origin stage `col`.
    pub(crate) fn applies_to(self, col: usize, dormant: &[usize]) -> bool {
        match self {
            Transition::DormEnter => !dormant.contains(&col),
            Transition::DormExit => dormant.contains(&col),
            _ => true,
        }
    }

    /// Whether a move from `col` into `row` belongs to this category.
    pub(crate) fn selects(self, row: usize, col: usize, dormant: &[usize]) -> bool {
        match self {
            Transition::Growth => row > col,
            Transition::Stasis => row == col,
            Transition::Shrinkage => row < col,
            Transition::DormEnter => dormant.contains(&row),
            Transition::DormExit => !dormant.contains(&row),
        }
    }
}
