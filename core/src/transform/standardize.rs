use serde::{Deserialize, Serialize};

use crate::prelude::{Mpm, MpmError, MpmResult, StageClass};
use crate::transform::collapse::mpm_collapse;
use crate::transform::rearrange::mpm_rearrange;
use crate::validation;

/// Standard life-cycle stages shared by every standardised model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardStage {
    Propagule,
    PreReproductive,
    Reproductive,
    PostReproductive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageGroup {
    pub stage: StandardStage,
    pub members: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standardized {
    pub mpm: Mpm,
    /// Label of each stage of the collapsed model.
    pub stages: Vec<StandardStage>,
}

/// Assigns every stage to a standard stage.
///
/// Propagule stages keep their own group wherever they sit. Of the others,
/// stages before the first reproductive stage are pre-reproductive, stages
/// from the first to the last reproductive stage are reproductive and the
/// rest post-reproductive. Empty groups are omitted.
pub fn standard_stages(
    reproductive: &[usize],
    classes: &[StageClass],
) -> MpmResult<Vec<StageGroup>> {
    let n = classes.len();
    validation::ensure_stages(reproductive, n)?;
    let (first, last) = match (reproductive.iter().min(), reproductive.iter().max()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            return Err(MpmError::InvalidInput(
                "standardisation needs at least one reproductive stage".into(),
            ))
        }
    };

    let classify = |stage: usize| {
        if classes[stage] == StageClass::Propagule {
            StandardStage::Propagule
        } else if stage < first {
            StandardStage::PreReproductive
        } else if stage <= last {
            StandardStage::Reproductive
        } else {
            StandardStage::PostReproductive
        }
    };

    Ok([
        StandardStage::Propagule,
        StandardStage::PreReproductive,
        StandardStage::Reproductive,
        StandardStage::PostReproductive,
    ]
    .into_iter()
    .map(|stage| StageGroup {
        stage,
        members: (0..n).filter(|&i| classify(i) == stage).collect(),
    })
    .filter(|group| !group.members.is_empty())
    .collect())
}

/// Rearranges `mpm` and collapses it into standard stages.
pub fn mpm_standardize(
    mpm: &Mpm,
    reproductive: &[usize],
    classes: &[StageClass],
) -> MpmResult<Standardized> {
    let rearranged = mpm_rearrange(mpm, reproductive, classes)?;
    let groups = standard_stages(&rearranged.reproductive, &rearranged.classes)?;
    let partition: Vec<Vec<usize>> = groups.iter().map(|g| g.members.clone()).collect();
    Ok(Standardized {
        mpm: mpm_collapse(&rearranged.mpm, &partition)?,
        stages: groups.into_iter().map(|g| g.stage).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::eigen::EigenHelper;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn model() -> Mpm {
        let u = array![
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [0.3, 0.2, 0.0, 0.0, 0.0],
            [0.0, 0.4, 0.3, 0.1, 0.0],
            [0.0, 0.0, 0.4, 0.5, 0.0],
            [0.0, 0.0, 0.1, 0.2, 0.4]
        ];
        let f = array![
            [0.0, 0.0, 1.0, 3.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0, 0.0]
        ];
        Mpm::new(u, f).unwrap()
    }

    fn classes() -> Vec<StageClass> {
        let mut classes = vec![StageClass::Active; 5];
        classes[0] = StageClass::Propagule;
        classes
    }

    #[test]
    fn stages_are_grouped_by_position() {
        let groups = standard_stages(&[2, 3], &classes()).unwrap();
        let labels: Vec<StandardStage> = groups.iter().map(|g| g.stage).collect();
        assert_eq!(
            labels,
            vec![
                StandardStage::Propagule,
                StandardStage::PreReproductive,
                StandardStage::Reproductive,
                StandardStage::PostReproductive
            ]
        );
        assert_eq!(groups[2].members, vec![2, 3]);
        assert_eq!(groups[3].members, vec![4]);
    }

    #[test]
    fn empty_groups_are_dropped() {
        let groups = standard_stages(&[1, 2], &[StageClass::Active; 3]).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].stage, StandardStage::PreReproductive);
        assert_eq!(groups[1].members, vec![1, 2]);
    }

    #[test]
    fn no_reproduction_cannot_be_standardised() {
        assert!(matches!(
            standard_stages(&[], &[StageClass::Active; 3]),
            Err(MpmError::InvalidInput(_))
        ));
    }

    #[test]
    fn standardised_model_keeps_lambda() {
        let mpm = model();
        let out = mpm_standardize(&mpm, &[2, 3], &classes()).unwrap();
        assert_eq!(out.stages.len(), 4);
        assert_eq!(out.mpm.stages(), 4);
        let before = EigenHelper::lambda(mpm.projection().view()).unwrap();
        let after = EigenHelper::lambda(out.mpm.projection().view()).unwrap();
        assert_abs_diff_eq!(after, before, epsilon = 1e-6);
    }
}
