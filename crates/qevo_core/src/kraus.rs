//! Kraus operator sets
//!
//! A noise channel is a finite set of equal-dimension Kraus matrices
//! {K_i} satisfying the completeness relation Σ K_i† K_i = I. The
//! relation is validated at construction so execution never sees a
//! non-trace-preserving channel.

use crate::constants::tol;
use crate::error::{QevoError, QevoResult};
use crate::matrix::SquareMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// KrausSet
// ============================================================================

/// Validated set of Kraus operators describing a quantum channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrausSet {
    label: String,
    num_qubits: usize,
    ops: Vec<SquareMatrix>,
}

impl KrausSet {
    /// Create a Kraus set, validating completeness at the default tolerance
    pub fn new(label: impl Into<String>, ops: Vec<SquareMatrix>) -> QevoResult<Self> {
        Self::with_tolerance(label, ops, tol::KRAUS)
    }

    /// Create a Kraus set with an explicit completeness tolerance
    pub fn with_tolerance(
        label: impl Into<String>,
        ops: Vec<SquareMatrix>,
        tolerance: f64,
    ) -> QevoResult<Self> {
        if ops.is_empty() {
            return Err(QevoError::EmptyKrausSet);
        }
        let dim = ops[0].dim();
        let num_qubits = match ops[0].num_qubits() {
            Some(k) => k,
            None => {
                return Err(QevoError::Shape {
                    expected: 2,
                    actual: dim,
                })
            }
        };
        for op in &ops[1..] {
            if op.dim() != dim {
                return Err(QevoError::Shape {
                    expected: dim,
                    actual: op.dim(),
                });
            }
        }

        let deviation = completeness_deviation(&ops)?;
        if deviation > tolerance {
            return Err(QevoError::Unitarity {
                deviation,
                tolerance,
            });
        }

        Ok(Self {
            label: label.into(),
            num_qubits,
            ops,
        })
    }

    /// Wrap a single unitary as a degenerate one-operator channel
    pub fn from_unitary(
        label: impl Into<String>,
        matrix: SquareMatrix,
        tolerance: f64,
    ) -> QevoResult<Self> {
        matrix.check_unitary(tolerance)?;
        Self::with_tolerance(label, vec![matrix], tolerance)
    }

    /// Human-readable channel label (e.g. "bit_flip")
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of qubits the channel acts on
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Matrix dimension of each operator
    #[inline]
    pub fn dim(&self) -> usize {
        1 << self.num_qubits
    }

    /// Number of Kraus operators
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Always false: validated sets contain at least one operator
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// The Kraus operators in application order
    pub fn operators(&self) -> &[SquareMatrix] {
        &self.ops
    }
}

impl fmt::Display for KrausSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} Kraus ops, {} qubit(s))",
            self.label,
            self.ops.len(),
            self.num_qubits
        )
    }
}

/// Largest absolute deviation of Σ K† K from the identity
fn completeness_deviation(ops: &[SquareMatrix]) -> QevoResult<f64> {
    let dim = ops[0].dim();
    let mut acc = SquareMatrix::zeros(dim);
    for op in ops {
        let term = op.adjoint().matmul(op)?;
        acc = acc.add(&term)?;
    }
    Ok(acc.max_abs_diff(&SquareMatrix::identity(dim)))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn identity_pair(p: f64) -> Vec<SquareMatrix> {
        // √(1-p)·I and √p·X partition the identity
        let a = (1.0 - p).sqrt();
        let b = p.sqrt();
        vec![
            SquareMatrix::from_vec(2, vec![c(a, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(a, 0.0)])
                .unwrap(),
            SquareMatrix::from_vec(2, vec![c(0.0, 0.0), c(b, 0.0), c(b, 0.0), c(0.0, 0.0)])
                .unwrap(),
        ]
    }

    #[test]
    fn test_valid_set() {
        let ks = KrausSet::new("flip", identity_pair(0.25)).unwrap();
        assert_eq!(ks.len(), 2);
        assert_eq!(ks.num_qubits(), 1);
        assert_eq!(ks.dim(), 2);
        assert_eq!(ks.label(), "flip");
    }

    #[test]
    fn test_empty_set_rejected() {
        let err = KrausSet::new("empty", vec![]).unwrap_err();
        assert!(matches!(err, QevoError::EmptyKrausSet));
    }

    #[test]
    fn test_incomplete_set_rejected() {
        // Only the √(1-p)·I part: Σ K†K = (1-p)·I ≠ I
        let mut ops = identity_pair(0.25);
        ops.truncate(1);
        let err = KrausSet::new("partial", ops).unwrap_err();
        assert!(matches!(err, QevoError::Unitarity { .. }));
    }

    #[test]
    fn test_dim_mismatch_rejected() {
        let ops = vec![SquareMatrix::identity(2), SquareMatrix::identity(4)];
        let err = KrausSet::new("mixed", ops).unwrap_err();
        assert!(matches!(err, QevoError::Shape { .. }));
    }

    #[test]
    fn test_non_power_of_two_rejected() {
        let err = KrausSet::new("odd", vec![SquareMatrix::identity(3)]).unwrap_err();
        assert!(matches!(err, QevoError::Shape { .. }));
    }

    #[test]
    fn test_tolerance_is_configurable() {
        // Slightly off-complete set passes only at a loose tolerance
        let mut ops = identity_pair(0.25);
        ops.truncate(1);
        let k = &ops[0];
        let scaled = k.scale(c(1.0 / (0.75f64).sqrt() * (1.0 + 1e-5), 0.0));
        assert!(KrausSet::with_tolerance("loose", vec![scaled.clone()], 1e-3).is_ok());
        assert!(KrausSet::with_tolerance("tight", vec![scaled], 1e-8).is_err());
    }

    #[test]
    fn test_from_unitary() {
        let x =
            SquareMatrix::from_vec(2, vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)])
                .unwrap();
        let ks = KrausSet::from_unitary("x", x, 1e-8).unwrap();
        assert_eq!(ks.len(), 1);

        let stretched = SquareMatrix::identity(2).scale(c(1.5, 0.0));
        assert!(KrausSet::from_unitary("bad", stretched, 1e-8).is_err());
    }
}
