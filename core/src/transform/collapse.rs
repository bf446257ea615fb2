use log::debug;
use ndarray::Array2;

use crate::math::eigen::EigenHelper;
use crate::prelude::{Mpm, MpmError, MpmResult};
use crate::transform::map_components;
use crate::validation;

/// Checks that `groups` is a partition of `0..stages`.
fn ensure_partition(groups: &[Vec<usize>], stages: usize) -> MpmResult<()> {
    if groups.is_empty() {
        return Err(MpmError::InvalidPartition("no groups given".into()));
    }
    let mut owner: Vec<Option<usize>> = vec![None; stages];
    for (g, group) in groups.iter().enumerate() {
        if group.is_empty() {
            return Err(MpmError::InvalidPartition(format!("group {} is empty", g)));
        }
        validation::ensure_stages(group, stages)?;
        for &stage in group {
            if let Some(previous) = owner[stage].replace(g) {
                return Err(MpmError::InvalidPartition(format!(
                    "stage {} appears in groups {} and {}",
                    stage, previous, g
                )));
            }
        }
    }
    let missing: Vec<usize> = (0..stages).filter(|s| owner[*s].is_none()).collect();
    if !missing.is_empty() {
        return Err(MpmError::InvalidPartition(format!(
            "stages {:?} are not assigned to any group",
            missing
        )));
    }
    Ok(())
}

/// Merges each group of stages into a single stage.
///
/// With `P` the `Q×N` indicator of group membership and `Q` the `N×Q` matrix
/// of within-group stable-distribution weights, every component is replaced
/// by `P X Q`. The collapsed projection matrix keeps λ. A group with no
/// stable mass is weighted uniformly.
pub fn mpm_collapse(mpm: &Mpm, groups: &[Vec<usize>]) -> MpmResult<Mpm> {
    let n = mpm.stages();
    ensure_partition(groups, n)?;
    let w = EigenHelper::stable_dist(mpm.projection().view())?;

    let mut p = Array2::<f64>::zeros((groups.len(), n));
    let mut q = Array2::<f64>::zeros((n, groups.len()));
    for (g, group) in groups.iter().enumerate() {
        let mass: f64 = group.iter().map(|&i| w[i]).sum();
        for &i in group {
            p[[g, i]] = 1.0;
            q[[i, g]] = if mass > 0.0 {
                w[i] / mass
            } else {
                1.0 / group.len() as f64
            };
        }
    }
    debug!("collapsing {} stages into {}", n, groups.len());
    map_components(mpm, |m| p.dot(&m).dot(&q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn model() -> Mpm {
        let u = array![
            [0.1, 0.0, 0.0, 0.0],
            [0.4, 0.3, 0.0, 0.0],
            [0.0, 0.4, 0.5, 0.1],
            [0.0, 0.0, 0.3, 0.6]
        ];
        let f = array![
            [0.0, 0.0, 1.5, 4.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0]
        ];
        Mpm::new(u, f).unwrap()
    }

    #[test]
    fn collapse_preserves_lambda() {
        let mpm = model();
        let before = EigenHelper::lambda(mpm.projection().view()).unwrap();
        for groups in [
            vec![vec![0, 1], vec![2, 3]],
            vec![vec![0], vec![1, 2], vec![3]],
            vec![vec![3, 0], vec![1], vec![2]],
        ] {
            let collapsed = mpm_collapse(&mpm, &groups).unwrap();
            assert_eq!(collapsed.stages(), groups.len());
            let after = EigenHelper::lambda(collapsed.projection().view()).unwrap();
            assert_abs_diff_eq!(after, before, epsilon = 1e-6);
        }
    }

    #[test]
    fn identity_partition_is_a_no_op() {
        let mpm = model();
        let groups: Vec<Vec<usize>> = (0..4).map(|i| vec![i]).collect();
        let collapsed = mpm_collapse(&mpm, &groups).unwrap();
        for (got, want) in collapsed.u().iter().zip(mpm.u().iter()) {
            assert_abs_diff_eq!(*got, *want, epsilon = 1e-12);
        }
    }

    #[test]
    fn malformed_partitions_are_rejected() {
        let mpm = model();
        let overlap = vec![vec![0, 1], vec![1, 2, 3]];
        let gap = vec![vec![0, 1], vec![3]];
        let empty = vec![vec![0, 1, 2, 3], vec![]];
        for groups in [overlap, gap, empty, Vec::new()] {
            assert!(matches!(
                mpm_collapse(&mpm, &groups),
                Err(MpmError::InvalidPartition(_))
            ));
        }
        assert!(matches!(
            mpm_collapse(&mpm, &[vec![0, 1], vec![2, 3, 4]]),
            Err(MpmError::InvalidIndex { index: 4, stages: 4 })
        ));
    }

    #[test]
    fn clonal_component_is_collapsed_too() {
        let u = array![[0.2, 0.0], [0.3, 0.5]];
        let f = array![[0.0, 2.0], [0.0, 0.0]];
        let c = array![[0.0, 0.0], [0.0, 0.2]];
        let mpm = Mpm::with_clonal(u, f, c).unwrap();
        let collapsed = mpm_collapse(&mpm, &[vec![0, 1]]).unwrap();
        let c = collapsed.c().unwrap();
        assert_eq!(c.dim(), (1, 1));
        assert!(c[[0, 0]] > 0.0);
    }
}
