use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

static NULL: Value = Value::Null;

/// Which cohort a participant belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mentor,
    Mentee,
}

impl Role {
    /// Parse the role discriminator of an input record
    ///
    /// Accepts the survey terms ("veterane", "bixe") as well as the plain
    /// English ones, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "veterane" | "mentor" => Some(Role::Mentor),
            "bixe" | "mentee" => Some(Role::Mentee),
            _ => None,
        }
    }
}

/// A single survey respondent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub answers: Map<String, Value>,
}

impl Participant {
    /// Raw answer for an attribute, `Null` when the field is absent
    pub fn answer(&self, attribute: &str) -> &Value {
        self.answers.get(attribute).unwrap_or(&NULL)
    }
}

/// The two cohorts of a run, each in input order
#[derive(Debug, Clone)]
pub struct Cohorts {
    pub mentors: Vec<Participant>,
    pub mentees: Vec<Participant>,
}

/// Kind of a configured survey column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Identifier,
    Role,
    Binary,
    MultipleChoice,
    Numeric,
    FreeText,
}

impl AttributeKind {
    /// Parse a kind name as written in configuration
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "uuid" | "identifier" | "id" => Some(AttributeKind::Identifier),
            "role" => Some(AttributeKind::Role),
            "binary" => Some(AttributeKind::Binary),
            "multiple_choice" | "multiple-choice" => Some(AttributeKind::MultipleChoice),
            "numeric" => Some(AttributeKind::Numeric),
            "embedding" | "free_text" | "free-text" => Some(AttributeKind::FreeText),
            _ => None,
        }
    }

    /// Identifier and role columns never contribute to compatibility
    pub fn is_weighted(self) -> bool {
        !matches!(self, AttributeKind::Identifier | AttributeKind::Role)
    }
}

/// Comparison rule for a multiple-choice attribute
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceRule {
    /// 1 when the two answer sets share any option, else 0
    Overlap,
    /// Overlap, else 0 when the mentor uses `reference` and the mentee does not, else 0.3
    Pronoun { reference: String },
    /// Overlap, else 0 when only the mentee declared an identity, else 0.6
    IdentityGroup,
}

/// Similarity function selected for a weighted attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeScorer {
    Binary,
    Numeric,
    MultipleChoice(ChoiceRule),
    FreeText,
}

/// A weighted attribute after schema resolution
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedAttribute {
    pub name: String,
    pub importance: u32,
    pub scorer: AttributeScorer,
}

/// Final assignment: mentor id -> mentee ids, in a stable key order
pub type Assignments = BTreeMap<String, Vec<String>>;

/// Summary of a completed run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchSummary {
    pub mentors: usize,
    pub mentees: usize,
    #[serde(rename = "slotsPerCohort")]
    pub slots_per_cohort: usize,
    pub edges: usize,
    #[serde(rename = "matchedPairs")]
    pub matched_pairs: usize,
    #[serde(rename = "totalWeight")]
    pub total_weight: f64,
    #[serde(rename = "degradedAttributes")]
    pub degraded_attributes: Vec<String>,
}
