use crate::workflow::config::{AnalysisKind, WorkflowConfig};
use crate::workflow::metrics::{Counts, RunMetrics};
use anyhow::Context;
use log::{info, warn};
use mpmcore::life_history::{
    entropy_d, entropy_k, gen_time, life_expect, life_expect_var, longevity, mature_age,
    mature_distrib, mature_prob, net_repro_rate, repro_stages, shape_rep, shape_surv,
    GenTimeMethod, Integration, R0Method,
};
use mpmcore::lifetable::{mpm_to_lx, mpm_to_mx, mpm_to_table, qsd_converge, QsdOptions};
use mpmcore::math::EigenHelper;
use mpmcore::perturbation::{perturb_matrix, perturb_trans, perturb_vr, PerturbType};
use mpmcore::transform::mpm_standardize;
use mpmcore::vital_rates::{
    vr_dorm_enter, vr_dorm_exit, vr_growth, vr_reproduction, vr_shrinkage, vr_stasis,
    vr_survival, VrOptions, Weights,
};
use mpmcore::{Mpm, MpmResult, StageClass};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Results for one model; failed analyses carry their error message.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub name: String,
    pub stages: usize,
    pub results: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub reports: Vec<ModelReport>,
    pub metrics: Counts,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

/// Value of one analysis plus the sub-results it could not compute.
struct Outcome {
    value: Value,
    failures: Vec<(&'static str, String)>,
}

/// Keeps a failed sub-result as `null` and remembers why it failed.
fn partial(
    name: &'static str,
    result: MpmResult<f64>,
    failures: &mut Vec<(&'static str, String)>,
) -> Option<f64> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            failures.push((name, err.to_string()));
            None
        }
    }
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        self.config
            .limits()
            .validate()
            .context("validating age limits")?;
        let metrics = RunMetrics::new();
        let mut reports = Vec::with_capacity(self.config.models.len());

        for model in &self.config.models {
            let mpm = model.to_mpm()?;
            metrics.record_model();
            let classes = model.stage_classes(mpm.stages());
            let mut report = ModelReport {
                name: model.name.clone(),
                stages: mpm.stages(),
                results: BTreeMap::new(),
                errors: BTreeMap::new(),
            };
            for &kind in &self.config.analyses {
                match self.analyse(kind, &mpm, &classes) {
                    Ok(Outcome { value, failures }) => {
                        metrics.record_completed();
                        for (part, err) in failures {
                            metrics.record_failed();
                            let key = format!("{}.{}", kind.key(), part);
                            warn!("{} failed for model {}: {}", key, model.name, err);
                            report.errors.insert(key, err);
                        }
                        report.results.insert(kind.key(), value);
                    }
                    Err(err) => {
                        metrics.record_failed();
                        warn!("{} failed for model {}: {:#}", kind.key(), model.name, err);
                        report.errors.insert(kind.key(), format!("{:#}", err));
                    }
                }
            }
            info!(
                "model {}: {} analyses completed, {} failed",
                report.name,
                report.results.len(),
                report.errors.len()
            );
            reports.push(report);
        }

        Ok(WorkflowResult {
            reports,
            metrics: metrics.snapshot(),
        })
    }

    fn analyse(
        &self,
        kind: AnalysisKind,
        mpm: &Mpm,
        classes: &[StageClass],
    ) -> anyhow::Result<Outcome> {
        let start = self.config.start();
        let limits = self.config.limits();
        let (u, f) = (mpm.u(), mpm.f());
        let r = mpm.reproduction();
        let mut failures = Vec::new();

        let value = match kind {
            AnalysisKind::LifeExpect => json!(life_expect(u, &start)?),
            AnalysisKind::LifeExpectVar => json!(life_expect_var(u, &start)?),
            AnalysisKind::Longevity => json!(longevity(u, &start, limits)?),
            AnalysisKind::LifeTable => {
                serde_json::to_value(mpm_to_table(u, Some(f), &start, limits)?)?
            }
            AnalysisKind::QsdConverge => {
                serde_json::to_value(qsd_converge(u, &start, QsdOptions::default())?)?
            }
            AnalysisKind::Eigen => {
                serde_json::to_value(EigenHelper::dominant(mpm.projection().view())?)?
            }
            AnalysisKind::NetReproRate => {
                json!(net_repro_rate(u, r.view(), &start, R0Method::Generation)?)
            }
            AnalysisKind::GenTime => json!(gen_time(u, r.view(), &GenTimeMethod::R0)?),
            AnalysisKind::MatureProb => json!(mature_prob(u, r.view(), &start)?),
            AnalysisKind::MatureAge => json!(mature_age(u, r.view(), &start)?),
            AnalysisKind::MatureDistrib => {
                serde_json::to_value(mature_distrib(u, r.view(), &start)?)?
            }
            AnalysisKind::EntropyK => {
                let lx = mpm_to_lx(u, &start, limits)?;
                json!(entropy_k(lx.view(), Integration::Sum)?)
            }
            AnalysisKind::EntropyD => {
                let lx = mpm_to_lx(u, &start, limits)?;
                let mx = mpm_to_mx(u, f, &start, limits)?;
                json!(entropy_d(lx.view(), mx.view())?)
            }
            AnalysisKind::ShapeSurv => {
                let lx = mpm_to_lx(u, &start, limits)?;
                json!(shape_surv(lx.view())?)
            }
            AnalysisKind::ShapeRep => {
                let mx = mpm_to_mx(u, f, &start, limits)?;
                json!(shape_rep(mx.view())?)
            }
            AnalysisKind::VitalRates => {
                let opts = VrOptions::default();
                let weights = Weights::Unweighted;
                let dormant: Vec<usize> = classes
                    .iter()
                    .enumerate()
                    .filter(|(_, class)| **class == StageClass::Dormant)
                    .map(|(stage, _)| stage)
                    .collect();
                let non_reproductive: Vec<usize> = {
                    let reproductive = repro_stages(r.view())?;
                    (0..mpm.stages())
                        .filter(|stage| !reproductive.contains(stage))
                        .collect()
                };
                let repro_opts = VrOptions {
                    exclude_col: non_reproductive,
                    ..VrOptions::default()
                };
                let rates = [
                    ("survival", vr_survival(u, &weights, &opts)),
                    ("growth", vr_growth(u, &weights, &opts)),
                    ("stasis", vr_stasis(u, &weights, &opts)),
                    ("shrinkage", vr_shrinkage(u, &weights, &opts)),
                    ("dorm_enter", vr_dorm_enter(u, &dormant, &weights, &opts)),
                    ("dorm_exit", vr_dorm_exit(u, &dormant, &weights, &opts)),
                    (
                        "reproduction",
                        vr_reproduction(u, r.view(), None, &weights, &repro_opts),
                    ),
                ];
                let values: serde_json::Map<String, Value> = rates
                    .into_iter()
                    .map(|(name, result)| {
                        (name.to_string(), json!(partial(name, result, &mut failures)))
                    })
                    .collect();
                Value::Object(values)
            }
            AnalysisKind::Elasticity => serde_json::to_value(perturb_matrix(
                mpm.projection().view(),
                PerturbType::Elasticity,
            )?)?,
            AnalysisKind::PerturbTrans => {
                serde_json::to_value(perturb_trans(mpm, &[], PerturbType::Elasticity)?)?
            }
            AnalysisKind::PerturbVr => {
                serde_json::to_value(perturb_vr(mpm, PerturbType::Elasticity)?)?
            }
            AnalysisKind::Standardize => {
                let reproductive = repro_stages(r.view())?;
                serde_json::to_value(mpm_standardize(mpm, &reproductive, classes)?)?
            }
        };
        Ok(Outcome { value, failures })
    }
}
