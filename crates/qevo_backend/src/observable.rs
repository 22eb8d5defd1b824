//! Pauli-string observables
//!
//! A `PauliString` assigns one Pauli operator to every qubit of a
//! register. String forms follow the bitstring convention used for
//! measurement outcomes: the leftmost character is the highest qubit.

use num_complex::Complex64;
use qevo_core::{QevoError, QevoResult, QubitId, SquareMatrix};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Single-Qubit Paulis
// ============================================================================

/// One Pauli operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity
    I,
    /// Bit flip
    X,
    /// Bit and phase flip
    Y,
    /// Phase flip
    Z,
}

impl Pauli {
    /// Parse a single Pauli letter
    pub fn from_char(c: char) -> QevoResult<Self> {
        match c {
            'I' | 'i' => Ok(Pauli::I),
            'X' | 'x' => Ok(Pauli::X),
            'Y' | 'y' => Ok(Pauli::Y),
            'Z' | 'z' => Ok(Pauli::Z),
            other => Err(QevoError::InvalidPauli(other.to_string())),
        }
    }

    /// The canonical letter
    pub fn as_char(&self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    /// The 2x2 matrix
    pub fn matrix(&self) -> SquareMatrix {
        let mut m = SquareMatrix::zeros(2);
        match self {
            Pauli::I => {
                m.set(0, 0, Complex64::new(1.0, 0.0));
                m.set(1, 1, Complex64::new(1.0, 0.0));
            }
            Pauli::X => {
                m.set(0, 1, Complex64::new(1.0, 0.0));
                m.set(1, 0, Complex64::new(1.0, 0.0));
            }
            Pauli::Y => {
                m.set(0, 1, Complex64::new(0.0, -1.0));
                m.set(1, 0, Complex64::new(0.0, 1.0));
            }
            Pauli::Z => {
                m.set(0, 0, Complex64::new(1.0, 0.0));
                m.set(1, 1, Complex64::new(-1.0, 0.0));
            }
        }
        m
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============================================================================
// Pauli Strings
// ============================================================================

/// Tensor product of single-qubit Paulis over a full register
///
/// Index `q` of the underlying list is the operator on qubit `q`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PauliString {
    paulis: Vec<Pauli>,
}

/// Bit masks driving the expectation kernels
///
/// `flip` marks qubits whose Pauli permutes the basis (X, Y), `sign`
/// marks qubits contributing a parity sign (Y, Z), and `phase` is the
/// global i^(number of Y) factor.
pub(crate) struct PauliMasks {
    pub(crate) flip: usize,
    pub(crate) sign: usize,
    pub(crate) phase: Complex64,
}

impl PauliString {
    /// The identity string on n qubits
    pub fn identity(num_qubits: usize) -> Self {
        Self {
            paulis: vec![Pauli::I; num_qubits],
        }
    }

    /// Build from per-qubit operators, index = qubit id
    pub fn from_paulis(paulis: Vec<Pauli>) -> Self {
        Self { paulis }
    }

    /// Parse a string like `"ZZI"`; the leftmost letter is the highest
    /// qubit, matching the outcome-bitstring convention
    pub fn parse(s: &str) -> QevoResult<Self> {
        if s.is_empty() {
            return Err(QevoError::InvalidPauli(s.to_string()));
        }
        let mut paulis = Vec::with_capacity(s.len());
        for c in s.chars().rev() {
            paulis.push(Pauli::from_char(c)?);
        }
        Ok(Self { paulis })
    }

    /// A single non-identity operator on one qubit
    pub fn single(num_qubits: usize, qubit: QubitId, pauli: Pauli) -> QevoResult<Self> {
        Self::identity(num_qubits).with_pauli(qubit, pauli)
    }

    /// Set the operator on one qubit
    pub fn with_pauli(mut self, qubit: QubitId, pauli: Pauli) -> QevoResult<Self> {
        if qubit >= self.paulis.len() {
            return Err(QevoError::QubitOutOfRange {
                qubit,
                num_qubits: self.paulis.len(),
            });
        }
        self.paulis[qubit] = pauli;
        Ok(self)
    }

    /// Register width
    pub fn num_qubits(&self) -> usize {
        self.paulis.len()
    }

    /// Operator acting on one qubit
    pub fn pauli(&self, qubit: QubitId) -> Pauli {
        self.paulis[qubit]
    }

    /// Per-qubit operators, index = qubit id
    pub fn paulis(&self) -> &[Pauli] {
        &self.paulis
    }

    /// Number of non-identity operators
    pub fn weight(&self) -> usize {
        self.paulis.iter().filter(|p| **p != Pauli::I).count()
    }

    /// True when every operator is the identity
    pub fn is_identity(&self) -> bool {
        self.weight() == 0
    }

    /// The full 2^n x 2^n matrix; intended for small-register tests
    pub fn matrix(&self) -> SquareMatrix {
        let mut m = SquareMatrix::identity(1);
        for pauli in self.paulis.iter().rev() {
            m = m.kron(&pauli.matrix());
        }
        m
    }

    pub(crate) fn masks(&self) -> PauliMasks {
        let mut flip = 0usize;
        let mut sign = 0usize;
        let mut num_y = 0usize;
        for (q, pauli) in self.paulis.iter().enumerate() {
            match pauli {
                Pauli::I => {}
                Pauli::X => flip |= 1 << q,
                Pauli::Y => {
                    flip |= 1 << q;
                    sign |= 1 << q;
                    num_y += 1;
                }
                Pauli::Z => sign |= 1 << q,
            }
        }
        let phase = match num_y % 4 {
            0 => Complex64::new(1.0, 0.0),
            1 => Complex64::new(0.0, 1.0),
            2 => Complex64::new(-1.0, 0.0),
            _ => Complex64::new(0.0, -1.0),
        };
        PauliMasks { flip, sign, phase }
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pauli in self.paulis.iter().rev() {
            write!(f, "{}", pauli.as_char())?;
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
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_display_roundtrip() {
        let obs = PauliString::parse("XIZy").unwrap();
        assert_eq!(obs.num_qubits(), 4);
        assert_eq!(obs.to_string(), "XIZY");
        // leftmost char is the highest qubit
        assert_eq!(obs.pauli(3), Pauli::X);
        assert_eq!(obs.pauli(0), Pauli::Y);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(PauliString::parse("XQZ").is_err());
        assert!(PauliString::parse("").is_err());
    }

    #[test]
    fn test_weight_and_identity() {
        assert!(PauliString::identity(3).is_identity());
        let obs = PauliString::single(3, 1, Pauli::Z).unwrap();
        assert_eq!(obs.weight(), 1);
        assert!(!obs.is_identity());
        assert!(PauliString::single(3, 7, Pauli::Z).is_err());
    }

    #[test]
    fn test_zz_matrix_diagonal() {
        let m = PauliString::parse("ZZ").unwrap().matrix();
        assert_eq!(m.dim(), 4);
        let expected = [1.0, -1.0, -1.0, 1.0];
        for (i, want) in expected.iter().enumerate() {
            assert_relative_eq!(m.get(i, i).re, *want);
        }
    }

    #[test]
    fn test_masks() {
        let masks = PauliString::parse("XYZ").unwrap().masks();
        // qubit 2 = X, qubit 1 = Y, qubit 0 = Z
        assert_eq!(masks.flip, 0b110);
        assert_eq!(masks.sign, 0b011);
        assert_relative_eq!(masks.phase.im, 1.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let obs = PauliString::parse("IZXY").unwrap();
        let json = serde_json::to_string(&obs).unwrap();
        let back: PauliString = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, back);
    }
}
