use crate::config::{AttributeConfig, SchemaSettings};
use crate::error::{MatchError, Result};
use crate::models::{AttributeKind, AttributeScorer, ChoiceRule, Cohorts, Participant, Role, WeightedAttribute};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Pronoun a mentee is expected to share with the mentor under the `pronoun` rule
pub const DEFAULT_REFERENCE_PRONOUN: &str = "Ele/Dele";

/// Resolved survey schema
///
/// Built once from configuration: every weighted column already carries the
/// scorer it will be compared with, so no kind lookup happens during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    identifier: String,
    role: String,
    attributes: Vec<WeightedAttribute>,
}

impl AttributeSchema {
    pub fn from_settings(settings: &SchemaSettings) -> Result<Self> {
        Self::from_columns(&settings.attributes)
    }

    pub fn from_columns(columns: &[AttributeConfig]) -> Result<Self> {
        let mut identifier = None;
        let mut role = None;
        let mut attributes = Vec::new();
        let mut seen = HashSet::new();

        for column in columns {
            if !seen.insert(column.name.as_str()) {
                return Err(MatchError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }

            let kind = AttributeKind::parse(&column.kind).ok_or_else(|| {
                MatchError::UnknownAttributeKind {
                    attribute: column.name.clone(),
                    kind: column.kind.clone(),
                }
            })?;

            if column.rule.is_some() && kind != AttributeKind::MultipleChoice {
                return Err(MatchError::InvalidSchema(format!(
                    "column '{}' has a choice rule but is not multiple_choice",
                    column.name
                )));
            }

            let scorer = match kind {
                AttributeKind::Identifier => {
                    set_once(&mut identifier, &column.name, "identifier")?;
                    continue;
                }
                AttributeKind::Role => {
                    set_once(&mut role, &column.name, "role")?;
                    continue;
                }
                AttributeKind::Binary => AttributeScorer::Binary,
                AttributeKind::Numeric => AttributeScorer::Numeric,
                AttributeKind::FreeText => AttributeScorer::FreeText,
                AttributeKind::MultipleChoice => AttributeScorer::MultipleChoice(parse_rule(column)?),
            };

            let importance = match column.weight {
                Some(weight) if weight > 0 => weight,
                _ => {
                    return Err(MatchError::InvalidSchema(format!(
                        "column '{}' needs a positive weight",
                        column.name
                    )))
                }
            };

            attributes.push(WeightedAttribute {
                name: column.name.clone(),
                importance,
                scorer,
            });
        }

        let identifier = identifier
            .ok_or_else(|| MatchError::InvalidSchema("no identifier column".to_string()))?;
        let role = role.ok_or_else(|| MatchError::InvalidSchema("no role column".to_string()))?;
        if attributes.is_empty() {
            return Err(MatchError::InvalidSchema("no weighted columns".to_string()));
        }

        Ok(Self {
            identifier,
            role,
            attributes,
        })
    }

    pub fn attributes(&self) -> &[WeightedAttribute] {
        &self.attributes
    }

    pub fn total_importance(&self) -> u32 {
        self.attributes.iter().map(|a| a.importance).sum()
    }

    /// Turn raw records into the two cohorts
    ///
    /// Checks run in order: empty table, no mentors, no mentees.
    pub fn split_cohorts(&self, records: &[Map<String, Value>]) -> Result<Cohorts> {
        if records.is_empty() {
            return Err(MatchError::EmptyInput);
        }

        let mut mentors = Vec::new();
        let mut mentees = Vec::new();

        for (position, record) in records.iter().enumerate() {
            let id = match record.get(&self.identifier) {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    return Err(MatchError::InvalidRecord {
                        position,
                        reason: format!("missing identifier '{}'", self.identifier),
                    })
                }
            };

            let role = record
                .get(&self.role)
                .and_then(Value::as_str)
                .and_then(Role::parse)
                .ok_or_else(|| MatchError::InvalidRecord {
                    position,
                    reason: format!("'{}' must be veterane or bixe", self.role),
                })?;

            let participant = Participant {
                id,
                role,
                answers: record.clone(),
            };

            match role {
                Role::Mentor => mentors.push(participant),
                Role::Mentee => mentees.push(participant),
            }
        }

        if mentors.is_empty() {
            return Err(MatchError::NoMentors);
        }
        if mentees.is_empty() {
            return Err(MatchError::NoMentees);
        }

        Ok(Cohorts { mentors, mentees })
    }
}

impl Default for AttributeSchema {
    fn default() -> Self {
        // The built-in column list is known to resolve.
        match Self::from_settings(&SchemaSettings::default()) {
            Ok(schema) => schema,
            Err(e) => unreachable!("default schema is invalid: {}", e),
        }
    }
}

fn set_once(slot: &mut Option<String>, name: &str, what: &str) -> Result<()> {
    if slot.is_some() {
        return Err(MatchError::InvalidSchema(format!("more than one {} column", what)));
    }
    *slot = Some(name.to_string());
    Ok(())
}

fn parse_rule(column: &AttributeConfig) -> Result<ChoiceRule> {
    match column.rule.as_deref().map(str::trim) {
        None | Some("overlap") => Ok(ChoiceRule::Overlap),
        Some("pronoun") => Ok(ChoiceRule::Pronoun {
            reference: column
                .reference
                .clone()
                .unwrap_or_else(|| DEFAULT_REFERENCE_PRONOUN.to_string()),
        }),
        Some("identity_group") => Ok(ChoiceRule::IdentityGroup),
        Some(other) => Err(MatchError::InvalidSchema(format!(
            "unknown rule '{}' on column '{}'",
            other, column.name
        ))),
    }
}
