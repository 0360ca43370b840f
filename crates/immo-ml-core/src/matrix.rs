use crate::error::{MlError, MlResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense row-major 2-D matrix of `f64`, the feature-matrix type used across immo-ml.
///
/// Stores data in a flat contiguous `Vec<f64>` with row-major layout.
/// Row `i` is one sample, column `j` one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Matrix {
    /// Create a matrix from raw row-major data.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> MlResult<Self> {
        if data.len() != rows * cols {
            return Err(MlError::ShapeMismatch {
                expected: (rows, cols),
                got: (data.len(), 1),
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Create a matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Identity matrix of size `n × n`.
    pub fn eye(n: usize) -> Self {
        let mut m = Matrix::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Build from nested rows. All rows must share the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> MlResult<Self> {
        let n = rows.len();
        let p = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n * p);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != p {
                return Err(MlError::DimensionMismatch(format!(
                    "row {} has {} values, expected {}",
                    i,
                    row.len(),
                    p
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Matrix { data, rows: n, cols: p })
    }

    /// Build a single-column matrix from a slice.
    pub fn column_vector(values: &[f64]) -> Self {
        Matrix {
            data: values.to_vec(),
            rows: values.len(),
            cols: 1,
        }
    }
}

// ─── Accessors ──────────────────────────────────────────────────────────────

impl Matrix {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    pub fn get(&self, row: usize, col: usize) -> MlResult<f64> {
        self.check_index(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> MlResult<()> {
        self.check_index(row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Unchecked element read for hot loops; callers guarantee bounds.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Borrow row `i` as a slice.
    pub fn row(&self, i: usize) -> MlResult<&[f64]> {
        if i >= self.rows {
            return Err(MlError::IndexOutOfBounds {
                row: i,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Copy column `j` out.
    pub fn col(&self, j: usize) -> MlResult<Vec<f64>> {
        if j >= self.cols {
            return Err(MlError::IndexOutOfBounds {
                row: 0,
                col: j,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + j]).collect())
    }

    fn check_index(&self, row: usize, col: usize) -> MlResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(MlError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

// ─── Shape operations ───────────────────────────────────────────────────────

impl Matrix {
    /// Transpose.
    pub fn t(&self) -> Matrix {
        let mut out = vec![0.0; self.data.len()];
        for i in 0..self.rows {
            for j in 0..self.cols {
                out[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Matrix {
            data: out,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Gather rows by index (indices may repeat, as in bootstrap samples).
    pub fn select_rows(&self, indices: &[usize]) -> MlResult<Matrix> {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i)?);
        }
        Matrix::new(data, indices.len(), self.cols)
    }

    /// Concatenate matrices side by side. All parts must have equal row counts.
    pub fn hconcat(parts: &[&Matrix]) -> MlResult<Matrix> {
        let rows = match parts.first() {
            Some(m) => m.rows,
            None => return Ok(Matrix::zeros(0, 0)),
        };
        for m in parts {
            if m.rows != rows {
                return Err(MlError::DimensionMismatch(format!(
                    "hconcat: {} rows vs {} rows",
                    rows, m.rows
                )));
            }
        }
        let cols: usize = parts.iter().map(|m| m.cols).sum();
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for m in parts {
                data.extend_from_slice(&m.data[i * m.cols..(i + 1) * m.cols]);
            }
        }
        Matrix::new(data, rows, cols)
    }
}

// ─── Arithmetic ─────────────────────────────────────────────────────────────

impl Matrix {
    /// Matrix product `self · other`.
    pub fn matmul(&self, other: &Matrix) -> MlResult<Matrix> {
        if self.cols != other.rows {
            return Err(MlError::DimensionMismatch(format!(
                "matmul: ({}, {}) x ({}, {})",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let (n, k, m) = (self.rows, self.cols, other.cols);
        let mut out = vec![0.0; n * m];
        for i in 0..n {
            for p in 0..k {
                let a = self.data[i * k + p];
                if a == 0.0 {
                    continue;
                }
                let b_row = &other.data[p * m..(p + 1) * m];
                let out_row = &mut out[i * m..(i + 1) * m];
                for (o, &b) in out_row.iter_mut().zip(b_row) {
                    *o += a * b;
                }
            }
        }
        Matrix::new(out, n, m)
    }

    /// Matrix-vector product `self · v`.
    pub fn matvec(&self, v: &[f64]) -> MlResult<Vec<f64>> {
        if v.len() != self.cols {
            return Err(MlError::DimensionMismatch(format!(
                "matvec: matrix has {} columns, vector has {} values",
                self.cols,
                v.len()
            )));
        }
        Ok(self
            .data
            .chunks(self.cols.max(1))
            .take(self.rows)
            .map(|row| row.iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }

    /// Column means.
    pub fn mean_cols(&self) -> MlResult<Vec<f64>> {
        if self.rows == 0 {
            return Err(MlError::EmptyInput);
        }
        let mut sums = vec![0.0; self.cols];
        for row in self.data.chunks(self.cols.max(1)) {
            for (s, v) in sums.iter_mut().zip(row) {
                *s += v;
            }
        }
        let n = self.rows as f64;
        Ok(sums.into_iter().map(|s| s / n).collect())
    }

    /// Population standard deviation of each column.
    pub fn std_cols(&self) -> MlResult<Vec<f64>> {
        let means = self.mean_cols()?;
        let mut sq = vec![0.0; self.cols];
        for row in self.data.chunks(self.cols.max(1)) {
            for j in 0..self.cols {
                let d = row[j] - means[j];
                sq[j] += d * d;
            }
        }
        let n = self.rows as f64;
        Ok(sq.into_iter().map(|s| (s / n).sqrt()).collect())
    }

    pub fn has_nan(&self) -> bool {
        self.data.iter().any(|v| v.is_nan())
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "matrix([")?;
        for i in 0..self.rows.min(8) {
            write!(f, "  [")?;
            for j in 0..self.cols.min(8) {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.4}", self.data[i * self.cols + j])?;
            }
            if self.cols > 8 {
                write!(f, ", ...")?;
            }
            writeln!(f, "],")?;
        }
        if self.rows > 8 {
            writeln!(f, "  ...")?;
        }
        write!(f, "], shape=({}, {}))", self.rows, self.cols)
    }
}
