//! Mentor Match - capacity-constrained mentor/mentee matching
//!
//! Scores every mentor/mentee pair from survey answers, gives each
//! participant a random number of connection slots and solves a maximum
//! weight matching over those slots.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{rng_from_seed, AttributeSchema, HungarianSolver, MatchMaker, MatchOutcome};
pub use error::{MatchError, Result};
pub use models::{Assignments, Participant, Role};
