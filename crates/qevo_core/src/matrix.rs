//! Dense complex square matrices
//!
//! Gate generators, Kraus operators, and fused unitaries are all small
//! dense matrices over `Complex64`, stored row-major in a flat `Vec`.

use crate::error::{QevoError, QevoResult};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// SquareMatrix
// ============================================================================

/// Row-major dense square matrix of complex amplitudes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquareMatrix {
    dim: usize,
    data: Vec<Complex64>,
}

impl SquareMatrix {
    /// Create from a flat row-major vector of length `dim * dim`
    pub fn from_vec(dim: usize, data: Vec<Complex64>) -> QevoResult<Self> {
        if data.len() != dim * dim {
            return Err(QevoError::Shape {
                expected: dim * dim,
                actual: data.len(),
            });
        }
        Ok(Self { dim, data })
    }

    /// Zero matrix of the given dimension
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            data: vec![Complex64::new(0.0, 0.0); dim * dim],
        }
    }

    /// Identity matrix of the given dimension
    pub fn identity(dim: usize) -> Self {
        let mut m = Self::zeros(dim);
        for i in 0..dim {
            m.data[i * dim + i] = Complex64::new(1.0, 0.0);
        }
        m
    }

    /// Matrix dimension (rows == columns)
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of qubit axes this matrix spans, if the dimension is a
    /// power of two at least 2
    pub fn num_qubits(&self) -> Option<usize> {
        if self.dim >= 2 && self.dim.is_power_of_two() {
            Some(self.dim.trailing_zeros() as usize)
        } else {
            None
        }
    }

    /// Element at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * self.dim + col]
    }

    /// Set element at (row, col)
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Complex64) {
        self.data[row * self.dim + col] = value;
    }

    /// Flat row-major element slice
    #[inline]
    pub fn data(&self) -> &[Complex64] {
        &self.data
    }

    /// Matrix product `self * other`
    pub fn matmul(&self, other: &Self) -> QevoResult<Self> {
        if self.dim != other.dim {
            return Err(QevoError::Shape {
                expected: self.dim,
                actual: other.dim,
            });
        }
        let n = self.dim;
        let mut out = Self::zeros(n);
        for i in 0..n {
            for k in 0..n {
                let a = self.data[i * n + k];
                if a.norm_sqr() == 0.0 {
                    continue;
                }
                for j in 0..n {
                    out.data[i * n + j] += a * other.data[k * n + j];
                }
            }
        }
        Ok(out)
    }

    /// Elementwise sum `self + other`
    pub fn add(&self, other: &Self) -> QevoResult<Self> {
        if self.dim != other.dim {
            return Err(QevoError::Shape {
                expected: self.dim,
                actual: other.dim,
            });
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a + b)
            .collect();
        Ok(Self {
            dim: self.dim,
            data,
        })
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> Self {
        let n = self.dim;
        let mut out = Self::zeros(n);
        for i in 0..n {
            for j in 0..n {
                out.data[j * n + i] = self.data[i * n + j].conj();
            }
        }
        out
    }

    /// Elementwise complex conjugate (no transpose)
    pub fn conjugate(&self) -> Self {
        Self {
            dim: self.dim,
            data: self.data.iter().map(|z| z.conj()).collect(),
        }
    }

    /// Scale every element by a complex factor
    pub fn scale(&self, factor: Complex64) -> Self {
        Self {
            dim: self.dim,
            data: self.data.iter().map(|z| z * factor).collect(),
        }
    }

    /// Kronecker product `self ⊗ other`
    ///
    /// The left factor indexes the high bits of the composite index, the
    /// right factor the low bits.
    pub fn kron(&self, other: &Self) -> Self {
        let (na, nb) = (self.dim, other.dim);
        let n = na * nb;
        let mut out = Self::zeros(n);
        for ia in 0..na {
            for ja in 0..na {
                let a = self.data[ia * na + ja];
                if a.norm_sqr() == 0.0 {
                    continue;
                }
                for ib in 0..nb {
                    for jb in 0..nb {
                        out.data[(ia * nb + ib) * n + (ja * nb + jb)] =
                            a * other.data[ib * nb + jb];
                    }
                }
            }
        }
        out
    }

    /// Largest absolute deviation of `U† U` from the identity
    pub fn unitarity_deviation(&self) -> f64 {
        let n = self.dim;
        let mut max_dev: f64 = 0.0;
        for i in 0..n {
            for j in 0..n {
                // (U†U)[i,j] = Σ_k conj(U[k,i]) * U[k,j]
                let mut acc = Complex64::new(0.0, 0.0);
                for k in 0..n {
                    acc += self.data[k * n + i].conj() * self.data[k * n + j];
                }
                let target = if i == j { 1.0 } else { 0.0 };
                max_dev = max_dev.max((acc - target).norm());
            }
        }
        max_dev
    }

    /// Check unitarity within an absolute tolerance
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        self.unitarity_deviation() <= tolerance
    }

    /// Validate unitarity, surfacing the deviation on failure
    pub fn check_unitary(&self, tolerance: f64) -> QevoResult<()> {
        let deviation = self.unitarity_deviation();
        if deviation > tolerance {
            return Err(QevoError::Unitarity {
                deviation,
                tolerance,
            });
        }
        Ok(())
    }

    /// Check that every element is a finite number
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|z| z.re.is_finite() && z.im.is_finite())
    }

    /// Largest absolute elementwise difference to another matrix
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for SquareMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.dim {
            for col in 0..self.dim {
                let z = self.get(row, col);
                if col > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{:+.4}{:+.4}i", z.re, z.im)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn pauli_x() -> SquareMatrix {
        SquareMatrix::from_vec(2, vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)])
            .unwrap()
    }

    fn pauli_y() -> SquareMatrix {
        SquareMatrix::from_vec(2, vec![c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)])
            .unwrap()
    }

    #[test]
    fn test_from_vec_shape_check() {
        let err = SquareMatrix::from_vec(2, vec![c(1.0, 0.0); 3]).unwrap_err();
        assert!(matches!(err, QevoError::Shape { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_identity() {
        let id = SquareMatrix::identity(4);
        for i in 0..4 {
            for j in 0..4 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(id.get(i, j).re, expected);
                assert_abs_diff_eq!(id.get(i, j).im, 0.0);
            }
        }
    }

    #[test]
    fn test_matmul_pauli_algebra() {
        // X * Y = iZ
        let xy = pauli_x().matmul(&pauli_y()).unwrap();
        assert_abs_diff_eq!(xy.get(0, 0).im, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(xy.get(1, 1).im, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(xy.get(0, 1).norm(), 0.0, epsilon = 1e-12);

        // X * X = I
        let xx = pauli_x().matmul(&pauli_x()).unwrap();
        assert!(xx.max_abs_diff(&SquareMatrix::identity(2)) < 1e-12);
    }

    #[test]
    fn test_matmul_dim_mismatch() {
        let err = pauli_x().matmul(&SquareMatrix::identity(4)).unwrap_err();
        assert!(matches!(err, QevoError::Shape { .. }));
    }

    #[test]
    fn test_adjoint() {
        let y = pauli_y();
        let ydag = y.adjoint();
        // Y is Hermitian
        assert!(y.max_abs_diff(&ydag) < 1e-12);

        let m = SquareMatrix::from_vec(
            2,
            vec![c(1.0, 2.0), c(3.0, 4.0), c(5.0, 6.0), c(7.0, 8.0)],
        )
        .unwrap();
        let a = m.adjoint();
        assert_eq!(a.get(0, 1), c(5.0, -6.0));
        assert_eq!(a.get(1, 0), c(3.0, -4.0));
    }

    #[test]
    fn test_kron_dimensions_and_layout() {
        let x = pauli_x();
        let id = SquareMatrix::identity(2);
        let xi = x.kron(&id);
        assert_eq!(xi.dim(), 4);
        // X ⊗ I swaps the high bit: |00> -> |10>
        assert_abs_diff_eq!(xi.get(2, 0).re, 1.0);
        assert_abs_diff_eq!(xi.get(0, 2).re, 1.0);
        assert_abs_diff_eq!(xi.get(1, 3).re, 1.0);
        assert_abs_diff_eq!(xi.get(0, 0).re, 0.0);
    }

    #[test]
    fn test_unitarity() {
        assert!(pauli_x().is_unitary(1e-12));
        assert!(pauli_y().is_unitary(1e-12));
        assert!(SquareMatrix::identity(8).is_unitary(1e-12));

        let not_unitary = pauli_x().scale(c(2.0, 0.0));
        assert!(!not_unitary.is_unitary(1e-6));
        let err = not_unitary.check_unitary(1e-6).unwrap_err();
        assert!(matches!(err, QevoError::Unitarity { .. }));
    }

    #[test]
    fn test_num_qubits() {
        assert_eq!(SquareMatrix::identity(2).num_qubits(), Some(1));
        assert_eq!(SquareMatrix::identity(4).num_qubits(), Some(2));
        assert_eq!(SquareMatrix::identity(8).num_qubits(), Some(3));
        assert_eq!(SquareMatrix::identity(3).num_qubits(), None);
        assert_eq!(SquareMatrix::identity(1).num_qubits(), None);
    }

    #[test]
    fn test_is_finite() {
        assert!(pauli_x().is_finite());
        let mut bad = SquareMatrix::identity(2);
        bad.set(0, 0, c(f64::NAN, 0.0));
        assert!(!bad.is_finite());
    }
}
