pub mod eigen;
pub mod matrix;
pub mod stats;

pub use eigen::{DominantEigen, EigenHelper};
pub use matrix::MatrixHelper;
pub use stats::StatsHelper;
