//! Demographic analysis core for matrix population models (MPMs).
//!
//! A model is split into a survival matrix `U`, a sexual reproduction matrix
//! `F` and an optional clonal reproduction matrix `C`. The modules derive age
//! trajectories and life tables, life-history traits, stage-specific vital
//! rates, perturbation analyses and structural transformations from them.
//! Every operation is a pure function over `ndarray` inputs returning
//! [`MpmResult`].

pub mod life_history;
pub mod lifetable;
pub mod math;
pub mod perturbation;
pub mod prelude;
pub mod transform;
pub mod validation;
pub mod vital_rates;

pub use prelude::{Mpm, MpmError, MpmResult, StageClass, Start};
