use ndarray::Axis;
use serde::Serialize;

use crate::prelude::{Mpm, MpmError, MpmResult, StageClass};
use crate::transform::map_components;
use crate::validation;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rearranged {
    pub mpm: Mpm,
    /// `order[k]` is the original index of new stage `k`.
    pub order: Vec<usize>,
    /// Stage classes in the new order.
    pub classes: Vec<StageClass>,
    /// Reproductive stages, as new indices.
    pub reproductive: Vec<usize>,
    /// Original indices of the stages moved to the end.
    pub moved: Vec<usize>,
}

/// Moves non-reproductive stages lying between the first and the last
/// reproductive stage to the end, keeping relative order otherwise.
///
/// Afterwards the reproductive stages form one contiguous block.
pub fn mpm_rearrange(
    mpm: &Mpm,
    reproductive: &[usize],
    classes: &[StageClass],
) -> MpmResult<Rearranged> {
    let n = mpm.stages();
    validation::ensure_stages(reproductive, n)?;
    if classes.len() != n {
        return Err(MpmError::DimensionMismatch(format!(
            "{} stage classes for {} stages",
            classes.len(),
            n
        )));
    }

    let moved: Vec<usize> = match (reproductive.iter().min(), reproductive.iter().max()) {
        (Some(&first), Some(&last)) => (first..=last)
            .filter(|stage| !reproductive.contains(stage))
            .collect(),
        _ => Vec::new(),
    };
    let order: Vec<usize> = (0..n)
        .filter(|stage| !moved.contains(stage))
        .chain(moved.iter().copied())
        .collect();

    let permuted = map_components(mpm, |m| {
        m.select(Axis(0), &order).select(Axis(1), &order)
    })?;
    let new_reproductive: Vec<usize> = order
        .iter()
        .enumerate()
        .filter(|(_, original)| reproductive.contains(*original))
        .map(|(k, _)| k)
        .collect();

    Ok(Rearranged {
        mpm: permuted,
        classes: order.iter().map(|&i| classes[i]).collect(),
        reproductive: new_reproductive,
        order,
        moved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn model() -> Mpm {
        let u = array![
            [0.0, 0.0, 0.0, 0.0],
            [0.5, 0.2, 0.0, 0.0],
            [0.0, 0.3, 0.4, 0.2],
            [0.0, 0.0, 0.3, 0.5]
        ];
        // Stages 1 and 3 reproduce; stage 2 sits between them.
        let f = array![
            [0.0, 1.0, 0.0, 2.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0]
        ];
        Mpm::new(u, f).unwrap()
    }

    #[test]
    fn inter_reproductive_stage_moves_to_the_end() {
        let classes = vec![
            StageClass::Propagule,
            StageClass::Active,
            StageClass::Dormant,
            StageClass::Active,
        ];
        let out = mpm_rearrange(&model(), &[1, 3], &classes).unwrap();
        assert_eq!(out.order, vec![0, 1, 3, 2]);
        assert_eq!(out.moved, vec![2]);
        assert_eq!(out.reproductive, vec![1, 2]);
        assert_eq!(out.classes[3], StageClass::Dormant);
        assert_eq!(out.mpm.f()[[0, 2]], 2.0);
        assert_eq!(out.mpm.u()[[3, 2]], 0.2);
    }

    #[test]
    fn contiguous_reproduction_keeps_the_order() {
        let classes = vec![StageClass::Active; 4];
        let out = mpm_rearrange(&model(), &[3], &classes).unwrap();
        assert_eq!(out.order, vec![0, 1, 2, 3]);
        assert!(out.moved.is_empty());
        let u: Array2<f64> = out.mpm.u().to_owned();
        assert_eq!(u, model().u());
    }

    #[test]
    fn metadata_must_match_the_model() {
        assert!(matches!(
            mpm_rearrange(&model(), &[1], &[StageClass::Active]),
            Err(MpmError::DimensionMismatch(_))
        ));
        assert!(matches!(
            mpm_rearrange(&model(), &[4], &[StageClass::Active; 4]),
            Err(MpmError::InvalidIndex { .. })
        ));
    }
}
