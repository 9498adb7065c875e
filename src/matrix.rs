//! Dense matrices.
//!
//! [`Matrix`] owns a contiguous row-major buffer and is the only type that can be
//! written to. [`MatrixView`] is a borrowed, read-only window over a buffer described
//! by row/column strides; transposition and column slicing just rearrange the
//! strides, so they are O(1) and never copy.
//!
//! Every in-place operation takes `&mut self` as the destination and its operands as
//! views. The borrow checker therefore rules out a destination aliasing one of its
//! operands, and nothing can be mutated through a transposed view.
//!
//! All binary operations check shapes and return [`Error::DimensionMismatch`] on
//! incompatible operands.

use std::ops::Range;

use rand::Rng;
use rand::distributions::{Bernoulli, Distribution, Uniform};
use rayon::prelude::*;

use crate::matmul::{Strided, gemm_f32};
use crate::{Error, Result};

/// Owned, row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

/// Borrowed read-only view: element `(i, j)` is `data[i * row_stride + j * col_stride]`.
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
    row_stride: usize,
    col_stride: usize,
}

impl Matrix {
    /// A `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Wraps a row-major buffer of length `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::DimensionMismatch(format!(
                "buffer of length {} cannot hold a {rows}x{cols} matrix",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// An `(n x 1)` matrix.
    pub fn column_vector(values: Vec<f32>) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values,
        }
    }

    /// A `(1 x n)` matrix.
    pub fn row_vector(values: Vec<f32>) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            data: values,
        }
    }

    /// Stacks equally sized vectors side by side: vector `j` becomes column `j`.
    pub fn horizontal_stack(vectors: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(Error::DimensionMismatch(
                "cannot stack an empty list of vectors".to_owned(),
            ));
        };

        let rows = first.len();
        let cols = vectors.len();
        if let Some((j, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != rows) {
            return Err(Error::DimensionMismatch(format!(
                "vector {j} has length {}, expected {rows}",
                v.len()
            )));
        }

        let mut out = Self::zeros(rows, cols);
        for (j, vector) in vectors.iter().enumerate() {
            for (i, &v) in vector.iter().enumerate() {
                out.data[i * cols + j] = v;
            }
        }
        Ok(out)
    }

    /// Independent draws, uniform over `[0, scale)`.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, scale: f32, rng: &mut R) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "random scale must be finite and > 0, got {scale}"
            )));
        }

        let dist = Uniform::new(0.0_f32, scale);
        let data = (0..rows * cols).map(|_| dist.sample(&mut *rng)).collect();
        Ok(Self { rows, cols, data })
    }

    /// Independent Bernoulli(`prob`) draws: every entry is exactly 0 or 1.
    pub fn random_unit<R: Rng + ?Sized>(rows: usize, cols: usize, prob: f32, rng: &mut R) -> Result<Self> {
        let mut out = Self::zeros(rows, cols);
        out.fill_bernoulli(prob, rng)?;
        Ok(out)
    }

    /// Overwrites every entry with an independent Bernoulli(`prob`) draw (0 or 1).
    pub fn fill_bernoulli<R: Rng + ?Sized>(&mut self, prob: f32, rng: &mut R) -> Result<()> {
        let dist = Bernoulli::new(f64::from(prob)).map_err(|_| {
            Error::InvalidConfig(format!("bernoulli probability must be in [0,1], got {prob}"))
        })?;
        for v in &mut self.data {
            *v = if dist.sample(&mut *rng) { 1.0 } else { 0.0 };
        }
        Ok(())
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major backing buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Panics if `row >= rows` or `col >= cols`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        self.data[row * self.cols + col]
    }

    /// Panics if `row >= rows` or `col >= cols`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        self.data[row * self.cols + col] = value;
    }

    #[inline]
    pub fn view(&self) -> MatrixView<'_> {
        MatrixView {
            data: &self.data,
            rows: self.rows,
            cols: self.cols,
            row_stride: self.cols,
            col_stride: 1,
        }
    }

    /// O(1) transposed view sharing this matrix's storage.
    #[inline]
    pub fn transpose(&self) -> MatrixView<'_> {
        self.view().transpose()
    }

    /// Zero-copy view of the columns in `range`.
    pub fn columns(&self, range: Range<usize>) -> Result<MatrixView<'_>> {
        self.view().columns(range)
    }

    /// `self[i,j] = f(src[i,j])`.
    pub fn elementwise<F>(&mut self, src: MatrixView<'_>, f: F) -> Result<()>
    where
        F: Fn(f32) -> f32,
    {
        self.check_same_dims("elementwise", src.dims())?;

        if let Some(values) = src.as_contiguous() {
            for (out, &v) in self.data.iter_mut().zip(values) {
                *out = f(v);
            }
        } else {
            let cols = self.cols;
            for (idx, out) in self.data.iter_mut().enumerate() {
                *out = f(src.at(idx / cols, idx % cols));
            }
        }
        Ok(())
    }

    /// `self[i,j] = f(self[i,j])`.
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(f32) -> f32,
    {
        for v in &mut self.data {
            *v = f(*v);
        }
    }

    /// `self[i,j] = f(a[i,j], b[i,j])`.
    pub fn combine<F>(&mut self, a: MatrixView<'_>, b: MatrixView<'_>, f: F) -> Result<()>
    where
        F: Fn(f32, f32) -> f32,
    {
        self.check_same_dims("combine (lhs)", a.dims())?;
        self.check_same_dims("combine (rhs)", b.dims())?;

        match (a.as_contiguous(), b.as_contiguous()) {
            (Some(xs), Some(ys)) => {
                for ((out, &x), &y) in self.data.iter_mut().zip(xs).zip(ys) {
                    *out = f(x, y);
                }
            }
            _ => {
                let cols = self.cols;
                for (idx, out) in self.data.iter_mut().enumerate() {
                    let (i, j) = (idx / cols, idx % cols);
                    *out = f(a.at(i, j), b.at(i, j));
                }
            }
        }
        Ok(())
    }

    /// `self[i,j] = f(self[i,j], other[i,j])`.
    pub fn combine_assign<F>(&mut self, other: MatrixView<'_>, f: F) -> Result<()>
    where
        F: Fn(f32, f32) -> f32,
    {
        self.check_same_dims("combine_assign", other.dims())?;

        if let Some(ys) = other.as_contiguous() {
            for (out, &y) in self.data.iter_mut().zip(ys) {
                *out = f(*out, y);
            }
        } else {
            let cols = self.cols;
            for (idx, out) in self.data.iter_mut().enumerate() {
                *out = f(*out, other.at(idx / cols, idx % cols));
            }
        }
        Ok(())
    }

    /// `self = a · b`.
    pub fn multiply_into(&mut self, a: MatrixView<'_>, b: MatrixView<'_>) -> Result<()> {
        if a.cols != b.rows || self.rows != a.rows || self.cols != b.cols {
            return Err(Error::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{} into {}x{}",
                a.rows, a.cols, b.rows, b.cols, self.rows, self.cols
            )));
        }
        if self.data.is_empty() {
            return Ok(());
        }
        if a.cols == 0 {
            self.data.fill(0.0);
            return Ok(());
        }

        gemm_f32(a.rows, b.cols, a.cols, a.strided(), b.strided(), &mut self.data);
        Ok(())
    }

    /// `self[i,j] = a[i,j] + bias[i,0]`, broadcasting the `(rows x 1)` bias over columns.
    pub fn add_column_vector(&mut self, a: MatrixView<'_>, bias: MatrixView<'_>) -> Result<()> {
        self.check_same_dims("add_column_vector", a.dims())?;
        self.check_column_vector("add_column_vector", bias)?;

        let cols = self.cols;
        for (i, row) in self.data.chunks_mut(cols.max(1)).enumerate() {
            let b = bias.at(i, 0);
            for (j, out) in row.iter_mut().enumerate() {
                *out = a.at(i, j) + b;
            }
        }
        Ok(())
    }

    /// In-place variant of [`Matrix::add_column_vector`]: `self[i,j] += bias[i,0]`.
    pub fn add_column_vector_assign(&mut self, bias: MatrixView<'_>) -> Result<()> {
        self.check_column_vector("add_column_vector_assign", bias)?;

        let cols = self.cols;
        for (i, row) in self.data.chunks_mut(cols.max(1)).enumerate() {
            let b = bias.at(i, 0);
            for out in row {
                *out += b;
            }
        }
        Ok(())
    }

    /// Writes the sum of each row of `src` into this `(src.rows x 1)` column vector,
    /// divided by the column count when `normalize` is set.
    ///
    /// Rows are summed in parallel; each worker reads one row of `src` and writes one
    /// entry of `self`, and the call returns once every row is done.
    pub fn row_sum(&mut self, src: MatrixView<'_>, normalize: bool) -> Result<()> {
        if self.cols != 1 || self.rows != src.rows {
            return Err(Error::DimensionMismatch(format!(
                "row_sum of a {}x{} matrix needs a {}x1 destination, got {}x{}",
                src.rows, src.cols, src.rows, self.rows, self.cols
            )));
        }

        let cols = src.cols;
        self.data.par_iter_mut().enumerate().for_each(|(row, out)| {
            let sum: f32 = (0..cols).map(|col| src.at(row, col)).sum();
            *out = if normalize && cols > 0 {
                sum / cols as f32
            } else {
                sum
            };
        });
        Ok(())
    }

    /// Sum of squared entries.
    pub fn frobenius_norm_squared(&self) -> f32 {
        self.data.iter().map(|v| v * v).sum()
    }

    fn check_same_dims(&self, op: &str, dims: (usize, usize)) -> Result<()> {
        if dims != self.dims() {
            return Err(Error::DimensionMismatch(format!(
                "{op}: operand is {}x{}, destination is {}x{}",
                dims.0, dims.1, self.rows, self.cols
            )));
        }
        Ok(())
    }

    fn check_column_vector(&self, op: &str, bias: MatrixView<'_>) -> Result<()> {
        if bias.dims() != (self.rows, 1) {
            return Err(Error::DimensionMismatch(format!(
                "{op}: bias is {}x{}, expected {}x1",
                bias.rows, bias.cols, self.rows
            )));
        }
        Ok(())
    }
}

impl<'a> MatrixView<'a> {
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Panics if `row >= rows` or `col >= cols`.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} view",
            self.rows,
            self.cols
        );
        self.data[row * self.row_stride + col * self.col_stride]
    }

    /// Swaps rows and columns without touching the underlying buffer.
    #[inline]
    pub fn transpose(self) -> MatrixView<'a> {
        MatrixView {
            data: self.data,
            rows: self.cols,
            cols: self.rows,
            row_stride: self.col_stride,
            col_stride: self.row_stride,
        }
    }

    /// Zero-copy view of the columns in `range`.
    ///
    /// Fails with [`Error::OutOfRange`] unless `range` is non-empty and inside `[0, cols)`.
    pub fn columns(self, range: Range<usize>) -> Result<MatrixView<'a>> {
        if range.start >= range.end || range.end > self.cols {
            return Err(Error::OutOfRange(format!(
                "column range {range:?} is outside [0, {})",
                self.cols
            )));
        }
        Ok(MatrixView {
            data: &self.data[range.start * self.col_stride..],
            rows: self.rows,
            cols: range.len(),
            row_stride: self.row_stride,
            col_stride: self.col_stride,
        })
    }

    /// Copies the view into a new row-major matrix.
    pub fn to_matrix(&self) -> Matrix {
        let mut data = Vec::with_capacity(self.rows * self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                data.push(self.at(i, j));
            }
        }
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }

    /// The view's elements in row-major order, if they are laid out that way.
    fn as_contiguous(&self) -> Option<&'a [f32]> {
        let row_major = (self.col_stride == 1 || self.cols <= 1)
            && (self.row_stride == self.cols || self.rows <= 1);
        let len = self.rows * self.cols;
        (row_major && self.data.len() >= len).then(|| &self.data[..len])
    }

    pub(crate) fn strided(&self) -> Strided<'a> {
        Strided {
            data: self.data,
            row_stride: self.row_stride,
            col_stride: self.col_stride,
        }
    }
}

impl<'a> From<&'a Matrix> for MatrixView<'a> {
    fn from(matrix: &'a Matrix) -> Self {
        matrix.view()
    }
}
