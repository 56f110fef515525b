use crate::error::{MatchError, Result};
use rand::Rng;

/// Number of slots each cohort is expanded to
#[inline]
pub fn slot_total(mentors: usize, mentees: usize, max_connections: usize) -> usize {
    mentors.min(mentees) * max_connections
}

/// Randomly distribute `max_total` slots over `n` participants
///
/// Everyone starts with one slot. Each remaining slot goes to a participant
/// drawn uniformly from those still below `cap`, so nobody is favoured for
/// extra partners. The result differs between runs unless `rng` is seeded.
///
/// Fails when the target cannot be met: fewer slots than participants, or
/// more slots than `n * cap`.
pub fn distribute_capacity<R: Rng + ?Sized>(
    n: usize,
    max_total: usize,
    cap: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let infeasible = || MatchError::InfeasibleCapacity {
        participants: n,
        total: max_total,
        cap,
    };

    if max_total < n || cap.saturating_mul(n) < max_total {
        return Err(infeasible());
    }

    let mut counts = vec![1usize; n];
    let mut eligible: Vec<usize> = (0..n).filter(|_| cap > 1).collect();
    let mut remaining = max_total - n;

    while remaining > 0 {
        if eligible.is_empty() {
            return Err(infeasible());
        }
        let pick = rng.gen_range(0..eligible.len());
        let idx = eligible[pick];
        counts[idx] += 1;
        remaining -= 1;
        if counts[idx] == cap {
            eligible.swap_remove(pick);
        }
    }

    Ok(counts)
}
