// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Assignments, AttributeKind, AttributeScorer, ChoiceRule, Cohorts, MatchSummary, Participant,
    Role, WeightedAttribute,
};
pub use requests::RunMatchingRequest;
pub use responses::{ErrorResponse, HealthResponse};
