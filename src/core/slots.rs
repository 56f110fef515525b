use crate::core::matrix::CompatibilityMatrix;
use crate::error::{MatchError, Result};
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// One matchable copy of a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    /// Position of the owner in its cohort
    pub participant: usize,
    /// Copy number, `0..capacity`
    pub index: usize,
}

/// Weighted edge between a mentee slot and a mentor slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotEdge {
    pub mentee_slot: usize,
    pub mentor_slot: usize,
    pub weight: f64,
}

/// A matched (mentee slot, mentor slot) pair, as positions in the slot lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotPair {
    pub mentee_slot: usize,
    pub mentor_slot: usize,
}

/// The slot copies chosen to carry the real weight between two participants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Designation {
    pub mentee: usize,
    pub mentor: usize,
    pub mentee_index: usize,
    pub mentor_index: usize,
}

/// Bipartite graph over participant slots
///
/// For every mentee/mentor pair exactly one slot pair (the designated one)
/// carries the aggregate compatibility. Every pair of their non-designated
/// slots is joined with weight 0, and a designated slot is never joined to a
/// non-designated slot of the same counterpart. Real weight is therefore
/// counted at most once per participant pair, while spare slots can still be
/// filled.
#[derive(Debug, Clone)]
pub struct SlotGraph {
    mentee_slots: Vec<Slot>,
    mentor_slots: Vec<Slot>,
    mentee_offsets: Vec<usize>,
    mentor_offsets: Vec<usize>,
    edges: Vec<SlotEdge>,
    edge_index: HashMap<SlotPair, usize>,
    designations: Vec<Designation>,
}

impl SlotGraph {
    /// Build the slot graph from the aggregate matrix and per-side capacities
    ///
    /// Designated slot indices are drawn from `rng`, mentee side first, for
    /// every pair in row-major order.
    pub fn build<R: Rng + ?Sized>(
        aggregate: &CompatibilityMatrix,
        mentee_capacity: &[usize],
        mentor_capacity: &[usize],
        rng: &mut R,
    ) -> Result<Self> {
        if aggregate.rows() != mentee_capacity.len() || aggregate.cols() != mentor_capacity.len() {
            return Err(MatchError::ShapeMismatch {
                name: "aggregate".to_string(),
                expected_rows: mentee_capacity.len(),
                expected_cols: mentor_capacity.len(),
                rows: aggregate.rows(),
                cols: aggregate.cols(),
            });
        }
        for capacity in [mentee_capacity, mentor_capacity] {
            if capacity.contains(&0) {
                return Err(MatchError::InfeasibleCapacity {
                    participants: capacity.len(),
                    total: capacity.iter().sum(),
                    cap: 0,
                });
            }
        }

        let (mentee_slots, mentee_offsets) = expand(mentee_capacity);
        let (mentor_slots, mentor_offsets) = expand(mentor_capacity);

        let mut graph = Self {
            mentee_slots,
            mentor_slots,
            mentee_offsets,
            mentor_offsets,
            edges: Vec::new(),
            edge_index: HashMap::new(),
            designations: Vec::with_capacity(aggregate.rows() * aggregate.cols()),
        };

        for (i, &mentee_cap) in mentee_capacity.iter().enumerate() {
            for (j, &mentor_cap) in mentor_capacity.iter().enumerate() {
                let d_i = rng.gen_range(0..mentee_cap);
                let d_j = rng.gen_range(0..mentor_cap);

                for k in (0..mentee_cap).filter(|&k| k != d_i) {
                    for l in (0..mentor_cap).filter(|&l| l != d_j) {
                        graph.add_edge(i, k, j, l, 0.0);
                    }
                }
                graph.add_edge(i, d_i, j, d_j, aggregate.get(i, j));

                graph.designations.push(Designation {
                    mentee: i,
                    mentor: j,
                    mentee_index: d_i,
                    mentor_index: d_j,
                });
            }
        }

        Ok(graph)
    }

    fn add_edge(&mut self, mentee: usize, k: usize, mentor: usize, l: usize, weight: f64) {
        let pair = SlotPair {
            mentee_slot: self.mentee_offsets[mentee] + k,
            mentor_slot: self.mentor_offsets[mentor] + l,
        };
        self.edge_index.insert(pair, self.edges.len());
        self.edges.push(SlotEdge {
            mentee_slot: pair.mentee_slot,
            mentor_slot: pair.mentor_slot,
            weight,
        });
    }

    pub fn mentee_slots(&self) -> &[Slot] {
        &self.mentee_slots
    }

    pub fn mentor_slots(&self) -> &[Slot] {
        &self.mentor_slots
    }

    pub fn edges(&self) -> &[SlotEdge] {
        &self.edges
    }

    pub fn designations(&self) -> &[Designation] {
        &self.designations
    }

    /// Weight of the edge joining two slots, `None` if they are not adjacent
    pub fn weight(&self, pair: SlotPair) -> Option<f64> {
        self.edge_index.get(&pair).map(|&idx| self.edges[idx].weight)
    }

    /// Position of a mentee slot in [`Self::mentee_slots`]
    pub fn mentee_slot_position(&self, participant: usize, index: usize) -> usize {
        self.mentee_offsets[participant] + index
    }

    /// Position of a mentor slot in [`Self::mentor_slots`]
    pub fn mentor_slot_position(&self, participant: usize, index: usize) -> usize {
        self.mentor_offsets[participant] + index
    }

    /// Check that `pairs` is a matching on this graph
    pub fn validate_matching(&self, pairs: &[SlotPair]) -> Result<()> {
        let mut mentee_used = HashSet::new();
        let mut mentor_used = HashSet::new();

        for pair in pairs {
            if !self.edge_index.contains_key(pair) {
                return Err(MatchError::Solver(format!(
                    "pair ({}, {}) is not an edge of the slot graph",
                    pair.mentee_slot, pair.mentor_slot
                )));
            }
            if !mentee_used.insert(pair.mentee_slot) || !mentor_used.insert(pair.mentor_slot) {
                return Err(MatchError::Solver(format!(
                    "slot reused in pair ({}, {})",
                    pair.mentee_slot, pair.mentor_slot
                )));
            }
        }
        Ok(())
    }
}

fn expand(capacity: &[usize]) -> (Vec<Slot>, Vec<usize>) {
    let mut slots = Vec::with_capacity(capacity.iter().sum());
    let mut offsets = Vec::with_capacity(capacity.len());
    for (participant, &count) in capacity.iter().enumerate() {
        offsets.push(slots.len());
        slots.extend((0..count).map(|index| Slot { participant, index }));
    }
    (slots, offsets)
}
