/// Dense `mentees x mentors` compatibility matrix, stored row-major
///
/// Row `i` belongs to the i-th mentee and column `j` to the j-th mentor,
/// both in cohort order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompatibilityMatrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl CompatibilityMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut values = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                values.push(f(i, j));
            }
        }
        Self { rows, cols, values }
    }

    /// Build from nested rows; `None` if the rows are ragged
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            values: rows.iter().flatten().copied().collect(),
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn same_shape(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Divide every row by its sum
    ///
    /// A row summing to zero is left untouched, so an all-zero row stays
    /// all-zero instead of turning into NaN.
    pub fn normalize_rows(mut self) -> Self {
        if self.cols == 0 {
            return self;
        }
        for row in self.values.chunks_mut(self.cols) {
            let sum: f64 = row.iter().sum();
            if sum == 0.0 {
                continue;
            }
            for value in row.iter_mut() {
                *value /= sum;
            }
        }
        self
    }

    /// `self += factor * other`; shapes must already agree
    pub(crate) fn add_scaled(&mut self, other: &Self, factor: f64) {
        debug_assert!(self.same_shape(other));
        for (acc, value) in self.values.iter_mut().zip(&other.values) {
            *acc += factor * value;
        }
    }

    pub(crate) fn scale(&mut self, factor: f64) {
        for value in &mut self.values {
            *value *= factor;
        }
    }
}
