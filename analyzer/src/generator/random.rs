use crate::workflow::config::ModelConfig;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for generating synthetic stage-structured models.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub stages: usize,
    pub seed: u64,
    /// Column survival is drawn uniformly from this range.
    pub min_survival: f64,
    pub max_survival: f64,
    /// Upper bound on per-stage fecundity.
    pub max_fecundity: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            stages: 5,
            seed: 0,
            min_survival: 0.3,
            max_survival: 0.9,
            max_fecundity: 5.0,
        }
    }
}

impl GeneratorConfig {
    fn normalized_stages(&self) -> usize {
        self.stages.max(1)
    }
}

/// Builds a random Lefkovitch model.
///
/// Survivors of stage `j` stay, shrink to `j - 1` or grow to `j + 1`; every
/// one of those moves has positive probability. The later half of the stages
/// reproduce into the first stage, so the model is always primitive.
pub fn random_model(config: &GeneratorConfig) -> ModelConfig {
    let n = config.normalized_stages();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let low = config.min_survival.clamp(0.0, 1.0);
    let high = config.max_survival.clamp(0.0, 1.0);
    let (low, high) = if low < high { (low, high) } else { (0.3, 0.9) };

    let mut u = vec![vec![0.0; n]; n];
    for j in 0..n {
        let survival = rng.gen_range(low..=high);
        let targets: Vec<usize> = (j.saturating_sub(1)..=(j + 1).min(n - 1)).collect();
        let weights: Vec<f64> = targets.iter().map(|_| rng.gen_range(0.1..1.0)).collect();
        let total: f64 = weights.iter().sum();
        for (&i, weight) in targets.iter().zip(&weights) {
            u[i][j] = survival * weight / total;
        }
    }

    let mut f = vec![vec![0.0; n]; n];
    for j in n / 2..n {
        f[0][j] = rng.gen_range(0.5..config.max_fecundity.max(1.0));
    }

    ModelConfig {
        name: format!("random-{}-{}", n, config.seed),
        u,
        f,
        c: None,
        classes: None,
    }
}
