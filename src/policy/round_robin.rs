//! RoundRobinPolicy — deterministic load-balanced manager selection.

use crate::domain::Manager;
use crate::error::RouterError;

/// Deterministic round-robin pick from a (possibly unsorted) candidate list.
///
/// 1. Sort candidates by `(current_load asc, id asc)` for stable ordering.
/// 2. Use `counter mod len(candidates)` to select the index.
/// 3. Return the chosen manager and the incremented counter.
///
/// An empty candidate list is a programmer error — callers are expected to
/// have already confirmed at least one eligible manager exists.
pub fn pick_next(candidates: &[Manager], counter: i64) -> Result<(&Manager, i64), RouterError> {
    if candidates.is_empty() {
        return Err(RouterError::NoCandidates);
    }

    let mut sorted: Vec<&Manager> = candidates.iter().collect();
    sorted.sort_by_key(|m| (m.current_load, m.id));

    let index = (counter.rem_euclid(sorted.len() as i64)) as usize;
    let chosen = sorted[index];

    Ok((chosen, counter + 1))
}
