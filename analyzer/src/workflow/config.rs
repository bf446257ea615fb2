use anyhow::Context;
use mpmcore::lifetable::AgeLimits;
use mpmcore::{Mpm, StageClass, Start};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Analyses the runner knows how to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    LifeExpect,
    LifeExpectVar,
    Longevity,
    LifeTable,
    QsdConverge,
    Eigen,
    NetReproRate,
    GenTime,
    MatureProb,
    MatureAge,
    MatureDistrib,
    EntropyK,
    EntropyD,
    ShapeSurv,
    ShapeRep,
    VitalRates,
    Elasticity,
    PerturbTrans,
    PerturbVr,
    Standardize,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 20] = [
        AnalysisKind::LifeExpect,
        AnalysisKind::LifeExpectVar,
        AnalysisKind::Longevity,
        AnalysisKind::LifeTable,
        AnalysisKind::QsdConverge,
        AnalysisKind::Eigen,
        AnalysisKind::NetReproRate,
        AnalysisKind::GenTime,
        AnalysisKind::MatureProb,
        AnalysisKind::MatureAge,
        AnalysisKind::MatureDistrib,
        AnalysisKind::EntropyK,
        AnalysisKind::EntropyD,
        AnalysisKind::ShapeSurv,
        AnalysisKind::ShapeRep,
        AnalysisKind::VitalRates,
        AnalysisKind::Elasticity,
        AnalysisKind::PerturbTrans,
        AnalysisKind::PerturbVr,
        AnalysisKind::Standardize,
    ];

    /// Key used for this analysis in reports.
    pub fn key(self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|value| value.as_str().map(str::to_owned))
            .unwrap_or_else(|| format!("{:?}", self))
    }
}

/// One model as written in a workflow file: matrices are row-major.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub u: Vec<Vec<f64>>,
    pub f: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub c: Option<Vec<Vec<f64>>>,
    /// Stage classes used by standardisation; every stage is active when
    /// omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<StageClass>>,
}

impl ModelConfig {
    pub fn to_mpm(&self) -> anyhow::Result<Mpm> {
        let u = Mpm::matrix_from_rows(&self.u, "U")?;
        let f = Mpm::matrix_from_rows(&self.f, "F")?;
        let mpm = match &self.c {
            Some(c) => Mpm::with_clonal(u, f, Mpm::matrix_from_rows(c, "C")?),
            None => Mpm::new(u, f),
        };
        mpm.with_context(|| format!("building model {}", self.name))
    }

    pub fn stage_classes(&self, stages: usize) -> Vec<StageClass> {
        self.classes
            .clone()
            .unwrap_or_else(|| vec![StageClass::Active; stages])
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Starting stage (0-based) for age-based analyses.
    pub start: usize,
    pub xmax: usize,
    pub lx_crit: f64,
    pub analyses: Vec<AnalysisKind>,
    pub models: Vec<ModelConfig>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let limits = AgeLimits::default();
        Self {
            start: 0,
            xmax: limits.xmax,
            lx_crit: limits.lx_crit,
            analyses: AnalysisKind::ALL.to_vec(),
            models: Vec::new(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(start: usize, xmax: usize, lx_crit: f64, models: Vec<ModelConfig>) -> Self {
        Self {
            start,
            xmax,
            lx_crit,
            models,
            ..Default::default()
        }
    }

    pub fn limits(&self) -> AgeLimits {
        AgeLimits {
            xmax: self.xmax,
            lx_crit: self.lx_crit,
        }
    }

    pub fn start(&self) -> Start {
        Start::Stage(self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_runs_every_analysis() {
        let cfg = WorkflowConfig::from_args(1, 200, 0.05, Vec::new());
        assert_eq!(cfg.limits().xmax, 200);
        assert_eq!(cfg.start(), Start::Stage(1));
        assert_eq!(cfg.analyses.len(), AnalysisKind::ALL.len());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"start: 1\nanalyses: [life_expect, perturb_trans]\nmodels:\n  - name: two-stage\n    u: [[0.2, 0.0], [0.3, 0.5]]\n    f: [[0.0, 2.0], [0.0, 0.0]]\n    classes: [prop, active]\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.start, 1);
        assert_eq!(cfg.xmax, 1000);
        assert_eq!(
            cfg.analyses,
            vec![AnalysisKind::LifeExpect, AnalysisKind::PerturbTrans]
        );
        let model = &cfg.models[0];
        assert_eq!(model.to_mpm().unwrap().stages(), 2);
        assert_eq!(model.stage_classes(2)[0], StageClass::Propagule);
    }

    #[test]
    fn ragged_matrices_are_reported() {
        let model = ModelConfig {
            name: "ragged".into(),
            u: vec![vec![0.2, 0.0], vec![0.3]],
            f: vec![vec![0.0, 2.0], vec![0.0, 0.0]],
            c: None,
            classes: None,
        };
        assert!(model.to_mpm().is_err());
    }

    #[test]
    fn analysis_keys_are_snake_case() {
        assert_eq!(AnalysisKind::LifeExpectVar.key(), "life_expect_var");
    }
}
