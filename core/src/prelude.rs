use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::validation;

/// Matrix population model split into its survival and reproduction parts.
///
/// `u` holds growth/survival transitions, `f` sexual reproduction and `c`
/// (optional) clonal reproduction. All three share the same `N×N` shape and
/// the column sums of `u` never exceed one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mpm {
    u: Array2<f64>,
    f: Array2<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    c: Option<Array2<f64>>,
}

impl Mpm {
    pub fn new(u: Array2<f64>, f: Array2<f64>) -> MpmResult<Self> {
        validation::ensure_pair(u.view(), f.view())?;
        Ok(Self { u, f, c: None })
    }

    /// Builds a model that also carries a clonal reproduction matrix.
    pub fn with_clonal(u: Array2<f64>, f: Array2<f64>, c: Array2<f64>) -> MpmResult<Self> {
        validation::ensure_pair(u.view(), f.view())?;
        validation::ensure_pair(u.view(), c.view())?;
        Ok(Self { u, f, c: Some(c) })
    }

    /// Converts row-major nested vectors (as read from config files) into a matrix.
    pub fn matrix_from_rows(rows: &[Vec<f64>], label: &str) -> MpmResult<Array2<f64>> {
        let nrows = rows.len();
        let ncols = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|row| row.len() != ncols) {
            return Err(MpmError::DimensionMismatch(format!(
                "{} row {} has {} entries, expected {}",
                label,
                bad,
                rows[bad].len(),
                ncols
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Array2::from_shape_vec((nrows, ncols), flat)
            .map_err(|err| MpmError::DimensionMismatch(format!("{}: {}", label, err)))
    }

    pub fn stages(&self) -> usize {
        self.u.nrows()
    }

    pub fn u(&self) -> ArrayView2<'_, f64> {
        self.u.view()
    }

    pub fn f(&self) -> ArrayView2<'_, f64> {
        self.f.view()
    }

    pub fn c(&self) -> Option<ArrayView2<'_, f64>> {
        self.c.as_ref().map(|c| c.view())
    }

    /// Total reproduction `F + C`.
    pub fn reproduction(&self) -> Array2<f64> {
        match &self.c {
            Some(c) => &self.f + c,
            None => self.f.clone(),
        }
    }

    /// Full projection matrix `A = U + F + C`.
    pub fn projection(&self) -> Array2<f64> {
        &self.u + &self.reproduction()
    }
}

/// Initial cohort for age-based calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Start {
    /// Every individual starts in one stage (0-based index).
    Stage(usize),
    /// Arbitrary non-negative starting distribution, rescaled to sum to one.
    Distribution(Array1<f64>),
}

impl Start {
    /// Materialises the start as a distribution vector of length `stages`.
    pub fn vector(&self, stages: usize) -> MpmResult<Array1<f64>> {
        match self {
            Start::Stage(index) => {
                validation::ensure_stage(*index, stages)?;
                let mut unit = Array1::zeros(stages);
                unit[*index] = 1.0;
                Ok(unit)
            }
            Start::Distribution(dist) => {
                if dist.len() != stages {
                    return Err(MpmError::DimensionMismatch(format!(
                        "start distribution has {} entries for {} stages",
                        dist.len(),
                        stages
                    )));
                }
                if dist.iter().any(|v| !v.is_finite() || *v < 0.0) {
                    return Err(MpmError::InvalidInput(
                        "start distribution must be finite and non-negative".into(),
                    ));
                }
                let total = dist.sum();
                if total <= 0.0 {
                    return Err(MpmError::InvalidInput(
                        "start distribution sums to zero".into(),
                    ));
                }
                Ok(dist / total)
            }
        }
    }
}

impl Default for Start {
    fn default() -> Self {
        Start::Stage(0)
    }
}

impl From<usize> for Start {
    fn from(index: usize) -> Self {
        Start::Stage(index)
    }
}

/// Coarse life-cycle role of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StageClass {
    #[serde(rename = "prop", alias = "propagule")]
    Propagule,
    #[default]
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "dorm", alias = "dormant")]
    Dormant,
}

/// Common error type for demographic calculations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MpmError {
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("invalid stage index {index} for a model with {stages} stages")]
    InvalidIndex { index: usize, stages: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("singular matrix: {0}")]
    SingularMatrix(String),
    #[error("non-ergodic projection matrix: {0}")]
    NonErgodic(String),
    #[error("invalid partition: {0}")]
    InvalidPartition(String),
    #[error("undefined result: {0}")]
    Undefined(String),
}

pub type MpmResult<T> = Result<T, MpmError>;
