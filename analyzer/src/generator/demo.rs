use crate::workflow::config::ModelConfig;
use mpmcore::StageClass;

/// Five-stage perennial plant: seed, small, medium, large and dormant.
///
/// Medium and large plants reproduce; small, medium and large plants can
/// enter dormancy and dormant plants re-emerge into the active stages.
pub fn demo_model() -> ModelConfig {
    ModelConfig {
        name: "perennial-demo".into(),
        u: vec![
            vec![0.10, 0.00, 0.00, 0.00, 0.00],
            vec![0.20, 0.30, 0.05, 0.00, 0.10],
            vec![0.00, 0.30, 0.40, 0.10, 0.10],
            vec![0.00, 0.00, 0.30, 0.60, 0.05],
            vec![0.00, 0.05, 0.05, 0.10, 0.30],
        ],
        f: vec![
            vec![0.0, 0.0, 2.0, 5.0, 0.0],
            vec![0.0; 5],
            vec![0.0; 5],
            vec![0.0; 5],
            vec![0.0; 5],
        ],
        c: None,
        classes: Some(vec![
            StageClass::Propagule,
            StageClass::Active,
            StageClass::Active,
            StageClass::Active,
            StageClass::Dormant,
        ]),
    }
}
