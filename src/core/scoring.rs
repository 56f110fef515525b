use crate::core::matrix::CompatibilityMatrix;
use crate::core::ports::{EmbeddingError, EmbeddingProvider};
use crate::models::{AttributeScorer, ChoiceRule, Cohorts, WeightedAttribute};
use serde_json::Value;
use tracing::{debug, warn};

/// Midpoint used for unanswered numeric questions
const NUMERIC_MISSING: f64 = 5.0;
/// Top of the numeric answer scale
const NUMERIC_SCALE: f64 = 10.0;
/// Score when neither side's pronouns overlap and the reference rule does not apply
const PRONOUN_PARTIAL: f64 = 0.3;
/// Score when identity answers do not overlap but the mentee is not left alone
const IDENTITY_PARTIAL: f64 = 0.6;

/// Row-normalized compatibility of one attribute
#[derive(Debug, Clone)]
pub struct ScoredAttribute {
    pub name: String,
    pub importance: u32,
    pub matrix: CompatibilityMatrix,
    /// Set when the embedding oracle failed and the matrix is all zero
    pub degraded: Option<String>,
}

/// Score one weighted attribute over both cohorts
///
/// Builds the raw `mentees x mentors` matrix with the attribute's scorer and
/// row-normalizes it. An oracle failure on a free-text attribute yields an
/// all-zero matrix and a diagnostic; it is not an error.
pub fn score_attribute(
    attribute: &WeightedAttribute,
    cohorts: &Cohorts,
    embedder: &dyn EmbeddingProvider,
) -> ScoredAttribute {
    let mentees: Vec<&Value> = cohorts.mentees.iter().map(|p| p.answer(&attribute.name)).collect();
    let mentors: Vec<&Value> = cohorts.mentors.iter().map(|p| p.answer(&attribute.name)).collect();

    let (raw, degraded) = match &attribute.scorer {
        AttributeScorer::Binary => (binary_similarity(&mentees, &mentors), None),
        AttributeScorer::Numeric => (numeric_similarity(&mentees, &mentors), None),
        AttributeScorer::MultipleChoice(rule) => (choice_similarity(&mentees, &mentors, rule), None),
        AttributeScorer::FreeText => match free_text_similarity(&mentees, &mentors, embedder) {
            Ok(matrix) => (matrix, None),
            Err(e) => {
                warn!(
                    attribute = %attribute.name,
                    provider = embedder.name(),
                    error = %e,
                    "Embedding failed, attribute scored as zero compatibility"
                );
                (
                    CompatibilityMatrix::zeros(mentees.len(), mentors.len()),
                    Some(e.to_string()),
                )
            }
        },
    };

    debug!(attribute = %attribute.name, rows = raw.rows(), cols = raw.cols(), "Scored attribute");

    ScoredAttribute {
        name: attribute.name.clone(),
        importance: attribute.importance,
        matrix: raw.normalize_rows(),
        degraded,
    }
}

/// 1 when both answers are equal, else 0
pub fn binary_similarity(mentees: &[&Value], mentors: &[&Value]) -> CompatibilityMatrix {
    CompatibilityMatrix::from_fn(mentees.len(), mentors.len(), |i, j| {
        if mentees[i] == mentors[j] { 1.0 } else { 0.0 }
    })
}

/// `1 - (a - b)^2` on answers rescaled from 0..10 to 0..1
pub fn numeric_similarity(mentees: &[&Value], mentors: &[&Value]) -> CompatibilityMatrix {
    let mentees: Vec<f64> = mentees.iter().map(|v| numeric_answer(v) / NUMERIC_SCALE).collect();
    let mentors: Vec<f64> = mentors.iter().map(|v| numeric_answer(v) / NUMERIC_SCALE).collect();

    CompatibilityMatrix::from_fn(mentees.len(), mentors.len(), |i, j| {
        1.0 - (mentees[i] - mentors[j]).powi(2)
    })
}

/// Multiple-choice compatibility under the attribute's rule
pub fn choice_similarity(
    mentees: &[&Value],
    mentors: &[&Value],
    rule: &ChoiceRule,
) -> CompatibilityMatrix {
    let mentees: Vec<Vec<String>> = mentees.iter().map(|v| choice_answer(v)).collect();
    let mentors: Vec<Vec<String>> = mentors.iter().map(|v| choice_answer(v)).collect();

    CompatibilityMatrix::from_fn(mentees.len(), mentors.len(), |i, j| {
        choice_score(&mentees[i], &mentors[j], rule)
    })
}

#[inline]
fn choice_score(mentee: &[String], mentor: &[String], rule: &ChoiceRule) -> f64 {
    if mentee.iter().any(|option| mentor.contains(option)) {
        return 1.0;
    }

    match rule {
        ChoiceRule::Overlap => 0.0,
        ChoiceRule::Pronoun { reference } => {
            if !mentee.contains(reference) && mentor.contains(reference) {
                0.0
            } else {
                PRONOUN_PARTIAL
            }
        }
        ChoiceRule::IdentityGroup => {
            if !mentee.is_empty() && mentor.is_empty() {
                0.0
            } else {
                IDENTITY_PARTIAL
            }
        }
    }
}

/// Cosine similarity of oracle embeddings, negatives clamped to 0
///
/// The oracle is called once per cohort with the whole column.
pub fn free_text_similarity(
    mentees: &[&Value],
    mentors: &[&Value],
    embedder: &dyn EmbeddingProvider,
) -> Result<CompatibilityMatrix, EmbeddingError> {
    let mentor_texts: Vec<String> = mentors.iter().map(|v| text_answer(v)).collect();
    let mentee_texts: Vec<String> = mentees.iter().map(|v| text_answer(v)).collect();

    let mentor_vectors = embedder.encode(&mentor_texts)?;
    let mentee_vectors = embedder.encode(&mentee_texts)?;

    if mentor_vectors.len() != mentor_texts.len() || mentee_vectors.len() != mentee_texts.len() {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {} + {} vectors, got {} + {}",
            mentee_texts.len(),
            mentor_texts.len(),
            mentee_vectors.len(),
            mentor_vectors.len()
        )));
    }

    let dims = mentee_vectors.first().or(mentor_vectors.first()).map_or(0, Vec::len);
    if mentee_vectors.iter().chain(&mentor_vectors).any(|v| v.len() != dims) {
        return Err(EmbeddingError::InvalidResponse(
            "vectors have inconsistent dimensions".to_string(),
        ));
    }

    Ok(CompatibilityMatrix::from_fn(mentee_vectors.len(), mentor_vectors.len(), |i, j| {
        cosine_similarity(&mentee_vectors[i], &mentor_vectors[j]).max(0.0)
    }))
}

/// Cosine similarity between two vectors.
/// Returns 0.0 for zero-length or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut mag_a, mut mag_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    let denom = mag_a.sqrt() * mag_b.sqrt();
    if denom < f64::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}

/// Numeric answer on the 0..10 scale, truncated to an integer
pub fn numeric_answer(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(x) if x.is_finite() => x.trunc().clamp(0.0, NUMERIC_SCALE),
        _ => NUMERIC_MISSING,
    }
}

/// Selected options of a multiple-choice answer
pub fn choice_answer(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(text_answer).collect(),
        Value::String(s) => vec![s.clone()],
        other => vec![other.to_string()],
    }
}

/// Free-text answer, empty when missing
pub fn text_answer(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
