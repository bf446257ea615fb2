//! Age-based views of a stage-structured model: survivorship and fecundity
//! trajectories, conversions between them, full life tables and convergence
//! to the quasi-stationary distribution.

pub mod convert;
pub mod qsd;
pub mod table;
pub mod trajectory;

use serde::{Deserialize, Serialize};

use crate::prelude::{MpmError, MpmResult};

pub use convert::{hx_to_lx, hx_to_px, lx_to_hx, lx_to_px, px_to_hx, px_to_lx};
pub use qsd::{qsd_converge, QsdOptions, QsdOutcome};
pub use table::{mpm_to_table, LifeTable};
pub use trajectory::{mpm_to_hx, mpm_to_lx, mpm_to_mx, mpm_to_px};

/// Largest `xmax` accepted. A cohort that never dies out with `lx_crit = 0`
/// is projected all the way to `xmax`.
pub const MAX_XMAX: usize = 100_000;

/// Bounds on how far a cohort is followed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeLimits {
    /// Hard cap on the last age computed.
    pub xmax: usize,
    /// Ages whose survivorship falls below this value are dropped.
    pub lx_crit: f64,
}

impl Default for AgeLimits {
    fn default() -> Self {
        Self {
            xmax: 1000,
            lx_crit: 0.01,
        }
    }
}

impl AgeLimits {
    pub fn validate(&self) -> MpmResult<()> {
        if !(0.0..1.0).contains(&self.lx_crit) {
            return Err(MpmError::InvalidInput(format!(
                "lx_crit must lie in [0, 1), got {}",
                self.lx_crit
            )));
        }
        if self.xmax > MAX_XMAX {
            return Err(MpmError::InvalidInput(format!(
                "xmax must not exceed {}, got {}",
                MAX_XMAX, self.xmax
            )));
        }
        Ok(())
    }
}
