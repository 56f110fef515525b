use crate::core::ports::MatchingSolver;
use crate::core::slots::{SlotGraph, SlotPair};
use crate::error::{MatchError, Result};

/// Kuhn-Munkres assignment over the slot graph
///
/// Each present edge scores `BIG + weight`, where `BIG` exceeds the weight
/// of any possible matching, and absent pairs score 0. The optimal
/// assignment therefore uses as many real edges as possible and, among
/// those, the heaviest ones. Assignments landing on absent pairs or padding
/// are dropped. O(n^3) in the number of slots per side.
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl HungarianSolver {
    pub fn new() -> Self {
        Self
    }
}

impl MatchingSolver for HungarianSolver {
    fn solve(&self, graph: &SlotGraph) -> Result<Vec<SlotPair>> {
        let rows = graph.mentee_slots().len();
        let cols = graph.mentor_slots().len();
        let n = rows.max(cols);
        if n == 0 || graph.edges().is_empty() {
            return Ok(Vec::new());
        }

        let mut best_per_row = vec![0.0f64; rows];
        for edge in graph.edges() {
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(MatchError::Solver(format!(
                    "edge ({}, {}) has invalid weight {}",
                    edge.mentee_slot, edge.mentor_slot, edge.weight
                )));
            }
            let best = &mut best_per_row[edge.mentee_slot];
            *best = best.max(edge.weight);
        }
        let big = 1.0 + best_per_row.iter().sum::<f64>();

        let mut score = vec![vec![0.0f64; n]; n];
        for edge in graph.edges() {
            score[edge.mentee_slot][edge.mentor_slot] = big + edge.weight;
        }

        let max_score = 2.0 * big;
        let cost: Vec<Vec<f64>> = score
            .iter()
            .map(|row| row.iter().map(|s| max_score - s).collect())
            .collect();

        let assignment = min_cost_assignment(&cost);

        let mut pairs: Vec<SlotPair> = assignment
            .into_iter()
            .enumerate()
            .filter(|&(row, col)| row < rows && col < cols)
            .map(|(row, col)| SlotPair {
                mentee_slot: row,
                mentor_slot: col,
            })
            .filter(|&pair| graph.weight(pair).is_some())
            .collect();
        pairs.sort();

        Ok(pairs)
    }

    fn name(&self) -> &str {
        "hungarian"
    }
}

/// Minimum-cost perfect assignment on a square matrix, row -> column
///
/// Potentials-based Hungarian method with 1-based internal indexing.
fn min_cost_assignment(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}
