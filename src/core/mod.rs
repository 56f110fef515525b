// Core algorithm exports
pub mod aggregate;
pub mod capacity;
pub mod matcher;
pub mod matrix;
pub mod ports;
pub mod projector;
pub mod schema;
pub mod scoring;
pub mod slots;
pub mod solver;

pub use aggregate::aggregate;
pub use capacity::{distribute_capacity, slot_total};
pub use matcher::{rng_from_seed, Compatibility, MatchMaker, MatchOutcome};
pub use matrix::CompatibilityMatrix;
pub use ports::{EmbeddingError, EmbeddingProvider, MatchingSolver};
pub use projector::project;
pub use schema::AttributeSchema;
pub use scoring::{score_attribute, ScoredAttribute};
pub use slots::{Designation, Slot, SlotEdge, SlotGraph, SlotPair};
pub use solver::HungarianSolver;
