//! Pareto dominance comparison and non-dominated set reduction.
//!
//! All scores are lower-is-better (see [`crate::schema::Direction`]).

use rayon::prelude::*;

use crate::schema::ScoreVector;

use super::error::DominanceError;

/// Active sets at least this large are reduced in parallel.
const PARALLEL_THRESHOLD: usize = 512;

/// True if `q` dominates `p`: no component of `q` is greater than the
/// corresponding component of `p`, and at least one is strictly less.
///
/// Both vectors must have the same length; see [`check_shape`].
pub fn dominates(q: &ScoreVector, p: &ScoreVector) -> bool {
    let mut strictly_better = false;
    for (qv, pv) in q.values().zip(p.values()) {
        if qv > pv {
            return false;
        }
        if qv < pv {
            strictly_better = true;
        }
    }
    strictly_better
}

/// Verify every vector has the same number of objectives.
pub fn check_shape<'a>(
    vectors: impl IntoIterator<Item = &'a ScoreVector>,
) -> Result<(), DominanceError> {
    let mut expected = None;
    for vector in vectors {
        match expected {
            None => expected = Some(vector.len()),
            Some(len) if len != vector.len() => {
                return Err(DominanceError::DimensionMismatch {
                    expected: len,
                    found: vector.len(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Keys of the members not dominated by any other member, in input order.
///
/// Pairwise O(n²) reduction. Equal vectors do not dominate each other, so
/// duplicates survive together. Applying it to its own output is a no-op.
pub fn non_dominated<K>(members: &[(K, &ScoreVector)]) -> Result<Vec<K>, DominanceError>
where
    K: Copy + Send + Sync,
{
    check_shape(members.iter().map(|(_, v)| *v))?;

    let survives = |p: &ScoreVector| !members.iter().any(|(_, q)| dominates(q, p));

    let keys = if members.len() >= PARALLEL_THRESHOLD {
        members
            .par_iter()
            .filter(|(_, p)| survives(p))
            .map(|(k, _)| *k)
            .collect()
    } else {
        members
            .iter()
            .filter(|(_, p)| survives(p))
            .map(|(k, _)| *k)
            .collect()
    };
    Ok(keys)
}
