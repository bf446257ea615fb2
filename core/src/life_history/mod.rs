//! Scalar life-history traits derived from a model's survival and
//! reproduction matrices or from its age trajectories.

pub mod entropy;
pub mod expectancy;
pub mod maturity;
pub mod reproduction;
pub mod shape;

pub use entropy::{entropy_d, entropy_k, Integration};
pub use expectancy::{life_expect, life_expect_var, longevity};
pub use maturity::{mature_age, mature_distrib, mature_prob, repro_stages};
pub use reproduction::{gen_time, net_repro_rate, GenTimeMethod, R0Method};
pub use shape::{shape_rep, shape_surv};
