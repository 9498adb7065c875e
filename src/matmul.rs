//! Strided GEMM kernel behind `Matrix::multiply_into`.
//!
//! Operands are described by a base slice plus row/column strides, so a
//! transposed view or a column range of a larger buffer is multiplied in place
//! without materializing a copy.
//!
//! - default: a simple, safe triple-loop implementation
//! - optional: a faster backend via the `matrixmultiply` feature

/// A read-only operand: element `(i, j)` lives at `data[i * row_stride + j * col_stride]`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Strided<'a> {
    pub data: &'a [f32],
    pub row_stride: usize,
    pub col_stride: usize,
}

/// Computes `c = a · b` with overwrite semantics.
///
/// Shapes: `a` is `(m, k)`, `b` is `(k, n)`, `c` is row-major `(m, n)`.
/// Callers validate dimensions; this only checks them in debug builds.
#[inline]
pub(crate) fn gemm_f32(m: usize, n: usize, k: usize, a: Strided<'_>, b: Strided<'_>, c: &mut [f32]) {
    debug_assert!(m > 0 && n > 0 && k > 0);
    debug_assert_eq!(c.len(), m * n);
    debug_assert!(a.data.len() > (m - 1) * a.row_stride + (k - 1) * a.col_stride);
    debug_assert!(b.data.len() > (k - 1) * b.row_stride + (n - 1) * b.col_stride);

    #[cfg(feature = "matrixmultiply")]
    {
        // matrixmultiply supports arbitrary strides; with beta = 0 the previous
        // contents of `c` are never read.
        unsafe {
            matrixmultiply::sgemm(
                m,
                k,
                n,
                1.0,
                a.data.as_ptr(),
                a.row_stride as isize,
                a.col_stride as isize,
                b.data.as_ptr(),
                b.row_stride as isize,
                b.col_stride as isize,
                0.0,
                c.as_mut_ptr(),
                n as isize,
                1,
            );
        }
    }

    #[cfg(not(feature = "matrixmultiply"))]
    for i in 0..m {
        let a0 = i * a.row_stride;
        let row = &mut c[i * n..(i + 1) * n];
        for (j, out) in row.iter_mut().enumerate() {
            let b0 = j * b.col_stride;
            let mut acc = 0.0_f32;
            for p in 0..k {
                let av = a.data[a0 + p * a.col_stride];
                let bv = b.data[p * b.row_stride + b0];
                acc = av.mul_add(bv, acc);
            }
            *out = acc;
        }
    }
}
