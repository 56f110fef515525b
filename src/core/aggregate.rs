use crate::core::matrix::CompatibilityMatrix;
use crate::core::schema::AttributeSchema;
use crate::core::scoring::ScoredAttribute;
use crate::error::{MatchError, Result};

/// Blend per-attribute matrices into the aggregate compatibility matrix
///
/// aggregate = sum(importance_i * matrix_i) / sum(importance_i)
///
/// Every weighted attribute of `schema` must have a scored matrix of shape
/// `rows x cols`; extra scored attributes not in the schema are ignored.
pub fn aggregate(
    schema: &AttributeSchema,
    scored: &[ScoredAttribute],
    rows: usize,
    cols: usize,
) -> Result<CompatibilityMatrix> {
    let mut total = CompatibilityMatrix::zeros(rows, cols);
    let mut weight_sum = 0u64;

    for attribute in schema.attributes() {
        let entry = scored
            .iter()
            .find(|s| s.name == attribute.name)
            .ok_or_else(|| MatchError::InvalidSchema(format!(
                "no compatibility matrix for '{}'",
                attribute.name
            )))?;

        if entry.matrix.rows() != rows || entry.matrix.cols() != cols {
            return Err(MatchError::ShapeMismatch {
                name: attribute.name.clone(),
                expected_rows: rows,
                expected_cols: cols,
                rows: entry.matrix.rows(),
                cols: entry.matrix.cols(),
            });
        }

        total.add_scaled(&entry.matrix, attribute.importance as f64);
        weight_sum += attribute.importance as u64;
    }

    if weight_sum == 0 {
        return Err(MatchError::InvalidSchema("weights sum to zero".to_string()));
    }

    total.scale(1.0 / weight_sum as f64);
    Ok(total)
}
