//! State representations
//!
//! Two concrete representations share one bit-layout convention: qubit
//! `q` lives at bit `q` of a flat amplitude index. A `StateVector`
//! holds 2^n amplitudes; a `DensityMatrix` holds a row-major 2^n x 2^n
//! grid, so its flat index carries the bra qubit `q` at bit `q` and
//! the ket qubit `q` at bit `q + n`.

use num_complex::Complex64;
use qevo_core::{QevoError, QevoResult, QubitId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest state-vector register a backend will allocate
pub const MAX_VECTOR_QUBITS: usize = 30;

/// Largest density-matrix register a backend will allocate
pub const MAX_DENSITY_QUBITS: usize = 15;

// ============================================================================
// State Kind
// ============================================================================

/// Representation tag carried alongside a [`State`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateKind {
    /// Pure-state amplitude vector, length 2^n
    Vector,
    /// Density matrix, 2^n x 2^n row-major
    Density,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKind::Vector => write!(f, "vector"),
            StateKind::Density => write!(f, "density"),
        }
    }
}

// ============================================================================
// State Vector
// ============================================================================

/// Pure-state amplitude vector over n qubits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    num_qubits: usize,
    amps: Vec<Complex64>,
}

impl StateVector {
    /// The all-zeros computational basis state |0...0>
    pub fn zero(num_qubits: usize) -> QevoResult<Self> {
        check_register_size(num_qubits, StateKind::Vector)?;
        let mut amps = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amps[0] = Complex64::new(1.0, 0.0);
        Ok(Self { num_qubits, amps })
    }

    /// Build from raw amplitudes; the length must be 2^n
    pub fn from_amplitudes(num_qubits: usize, amps: Vec<Complex64>) -> QevoResult<Self> {
        check_register_size(num_qubits, StateKind::Vector)?;
        let expected = 1usize << num_qubits;
        if amps.len() != expected {
            return Err(QevoError::Shape {
                expected,
                actual: amps.len(),
            });
        }
        Ok(Self { num_qubits, amps })
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Hilbert-space dimension 2^n
    pub fn dim(&self) -> usize {
        self.amps.len()
    }

    /// Read-only amplitudes, basis index bit q = qubit q
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amps
    }

    pub(crate) fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amps
    }

    /// Sum of squared magnitudes; 1 for a normalized state
    pub fn squared_norm(&self) -> f64 {
        self.amps.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Rescale to unit norm
    pub fn normalize(&mut self) -> QevoResult<()> {
        let norm = self.squared_norm().sqrt();
        if norm <= 0.0 || !norm.is_finite() {
            return Err(QevoError::InvalidState(format!(
                "cannot normalize state with norm {}",
                norm
            )));
        }
        let scale = Complex64::new(1.0 / norm, 0.0);
        for a in &mut self.amps {
            *a *= scale;
        }
        Ok(())
    }

    /// True when every amplitude is finite
    pub fn is_finite(&self) -> bool {
        self.amps.iter().all(|a| a.re.is_finite() && a.im.is_finite())
    }

    /// Probability of the computational basis state `index`
    pub fn probability(&self, index: usize) -> f64 {
        self.amps[index].norm_sqr()
    }

    /// Largest elementwise amplitude difference to another vector
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.amps
            .iter()
            .zip(other.amps.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }
}

// ============================================================================
// Density Matrix
// ============================================================================

/// Density operator over n qubits, stored row-major
///
/// The flat element index places the column (bra) qubit `q` at bit `q`
/// and the row (ket) qubit `q` at bit `q + n`, so the same contraction
/// kernels that walk a state vector walk a density matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityMatrix {
    num_qubits: usize,
    elems: Vec<Complex64>,
}

impl DensityMatrix {
    /// The pure projector |0...0><0...0|
    pub fn zero(num_qubits: usize) -> QevoResult<Self> {
        check_register_size(num_qubits, StateKind::Density)?;
        let dim = 1usize << num_qubits;
        let mut elems = vec![Complex64::new(0.0, 0.0); dim * dim];
        elems[0] = Complex64::new(1.0, 0.0);
        Ok(Self { num_qubits, elems })
    }

    /// The maximally mixed state I / 2^n
    pub fn maximally_mixed(num_qubits: usize) -> QevoResult<Self> {
        check_register_size(num_qubits, StateKind::Density)?;
        let dim = 1usize << num_qubits;
        let mut elems = vec![Complex64::new(0.0, 0.0); dim * dim];
        let weight = Complex64::new(1.0 / dim as f64, 0.0);
        for i in 0..dim {
            elems[i * dim + i] = weight;
        }
        Ok(Self { num_qubits, elems })
    }

    /// Build from raw row-major elements; the length must be 4^n
    pub fn from_elements(num_qubits: usize, elems: Vec<Complex64>) -> QevoResult<Self> {
        check_register_size(num_qubits, StateKind::Density)?;
        let dim = 1usize << num_qubits;
        if elems.len() != dim * dim {
            return Err(QevoError::Shape {
                expected: dim * dim,
                actual: elems.len(),
            });
        }
        Ok(Self { num_qubits, elems })
    }

    /// The projector psi psi-dagger of a pure state
    pub fn from_vector(vector: &StateVector) -> QevoResult<Self> {
        check_register_size(vector.num_qubits(), StateKind::Density)?;
        let dim = vector.dim();
        let amps = vector.amplitudes();
        let mut elems = vec![Complex64::new(0.0, 0.0); dim * dim];
        for row in 0..dim {
            for col in 0..dim {
                elems[row * dim + col] = amps[row] * amps[col].conj();
            }
        }
        Ok(Self {
            num_qubits: vector.num_qubits(),
            elems,
        })
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Matrix dimension 2^n
    pub fn dim(&self) -> usize {
        1 << self.num_qubits
    }

    /// Read-only elements, row-major
    pub fn elements(&self) -> &[Complex64] {
        &self.elems
    }

    pub(crate) fn elements_mut(&mut self) -> &mut [Complex64] {
        &mut self.elems
    }

    /// Element at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.elems[row * self.dim() + col]
    }

    /// Real part of the trace; 1 for a normalized state
    pub fn trace(&self) -> f64 {
        let dim = self.dim();
        (0..dim).map(|i| self.elems[i * dim + i].re).sum()
    }

    /// tr(rho^2); 1 for pure states, 1/2^n for the maximally mixed state
    pub fn purity(&self) -> f64 {
        // Hermitian rho: tr(rho^2) = sum |rho_ij|^2
        self.elems.iter().map(|e| e.norm_sqr()).sum()
    }

    /// Rescale to unit trace
    pub fn normalize(&mut self) -> QevoResult<()> {
        let trace = self.trace();
        if trace <= 0.0 || !trace.is_finite() {
            return Err(QevoError::InvalidState(format!(
                "cannot normalize state with trace {}",
                trace
            )));
        }
        let scale = Complex64::new(1.0 / trace, 0.0);
        for e in &mut self.elems {
            *e *= scale;
        }
        Ok(())
    }

    /// True when every element is finite
    pub fn is_finite(&self) -> bool {
        self.elems
            .iter()
            .all(|e| e.re.is_finite() && e.im.is_finite())
    }

    /// Largest elementwise difference to another density matrix
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.elems
            .iter()
            .zip(other.elems.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }
}

// ============================================================================
// State
// ============================================================================

/// A quantum state in either representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum State {
    /// Pure-state amplitude vector
    Vector(StateVector),
    /// Density operator
    Density(DensityMatrix),
}

impl State {
    /// The all-zeros state in the requested representation
    pub fn zero(num_qubits: usize, kind: StateKind) -> QevoResult<Self> {
        match kind {
            StateKind::Vector => Ok(State::Vector(StateVector::zero(num_qubits)?)),
            StateKind::Density => Ok(State::Density(DensityMatrix::zero(num_qubits)?)),
        }
    }

    /// Representation tag
    pub fn kind(&self) -> StateKind {
        match self {
            State::Vector(_) => StateKind::Vector,
            State::Density(_) => StateKind::Density,
        }
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        match self {
            State::Vector(v) => v.num_qubits(),
            State::Density(d) => d.num_qubits(),
        }
    }

    /// Hilbert-space dimension 2^n
    pub fn dim(&self) -> usize {
        1 << self.num_qubits()
    }

    /// Borrow the vector representation, if that is what this is
    pub fn vector(&self) -> Option<&StateVector> {
        match self {
            State::Vector(v) => Some(v),
            State::Density(_) => None,
        }
    }

    /// Borrow the density representation, if that is what this is
    pub fn density(&self) -> Option<&DensityMatrix> {
        match self {
            State::Vector(_) => None,
            State::Density(d) => Some(d),
        }
    }

    /// Norm for a vector, trace for a density matrix
    ///
    /// Both are 1 for a physical state, which makes this the quantity
    /// the engine watches for numerical drift.
    pub fn normalization(&self) -> f64 {
        match self {
            State::Vector(v) => v.squared_norm(),
            State::Density(d) => d.trace(),
        }
    }

    /// Rescale to unit normalization
    pub fn normalize(&mut self) -> QevoResult<()> {
        match self {
            State::Vector(v) => v.normalize(),
            State::Density(d) => d.normalize(),
        }
    }

    /// True when every entry is finite
    pub fn is_finite(&self) -> bool {
        match self {
            State::Vector(v) => v.is_finite(),
            State::Density(d) => d.is_finite(),
        }
    }

    /// Lift to a density matrix; a vector becomes its projector
    pub fn promote(self) -> QevoResult<Self> {
        match self {
            State::Vector(v) => Ok(State::Density(DensityMatrix::from_vector(&v)?)),
            density => Ok(density),
        }
    }

    /// Validate shape against an expected register width
    pub fn check_shape(&self, num_qubits: usize) -> QevoResult<()> {
        if self.num_qubits() != num_qubits {
            return Err(QevoError::QubitCountMismatch {
                left: num_qubits,
                right: self.num_qubits(),
            });
        }
        Ok(())
    }

    /// Expectation value of a Pauli-string observable
    pub fn expectation(&self, observable: &crate::observable::PauliString) -> QevoResult<f64> {
        crate::kernels::expectation(self, observable)
    }

    /// Marginal outcome probabilities for a qubit subset
    ///
    /// Returns 2^k probabilities where bit `j` of the outcome index is
    /// the measured value of `qubits[j]`. The qubits must be distinct
    /// and in range.
    pub fn probabilities(&self, qubits: &[QubitId]) -> QevoResult<Vec<f64>> {
        let n = self.num_qubits();
        let mut seen = 0usize;
        for &q in qubits {
            if q >= n {
                return Err(QevoError::QubitOutOfRange {
                    qubit: q,
                    num_qubits: n,
                });
            }
            if seen & (1 << q) != 0 {
                return Err(QevoError::DuplicateQubit(q));
            }
            seen |= 1 << q;
        }

        let mut probs = vec![0.0; 1 << qubits.len()];
        let sub_index = |full: usize| -> usize {
            let mut sub = 0usize;
            for (j, &q) in qubits.iter().enumerate() {
                sub |= ((full >> q) & 1) << j;
            }
            sub
        };
        match self {
            State::Vector(v) => {
                for (i, amp) in v.amplitudes().iter().enumerate() {
                    probs[sub_index(i)] += amp.norm_sqr();
                }
            }
            State::Density(d) => {
                let dim = d.dim();
                for i in 0..dim {
                    probs[sub_index(i)] += d.elements()[i * dim + i].re;
                }
            }
        }
        Ok(probs)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} state on {} qubits", self.kind(), self.num_qubits())
    }
}

fn check_register_size(num_qubits: usize, kind: StateKind) -> QevoResult<()> {
    let max = match kind {
        StateKind::Vector => MAX_VECTOR_QUBITS,
        StateKind::Density => MAX_DENSITY_QUBITS,
    };
    if num_qubits == 0 {
        return Err(QevoError::InvalidState(
            "state must cover at least one qubit".to_string(),
        ));
    }
    if num_qubits > max {
        return Err(QevoError::InvalidState(format!(
            "{} qubits exceeds the {} limit for {} states",
            num_qubits, max, kind
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_zero_vector_is_normalized() {
        let state = StateVector::zero(3).unwrap();
        assert_eq!(state.dim(), 8);
        assert_relative_eq!(state.squared_norm(), 1.0);
        assert_relative_eq!(state.probability(0), 1.0);
    }

    #[test]
    fn test_zero_density_is_normalized() {
        let state = DensityMatrix::zero(2).unwrap();
        assert_relative_eq!(state.trace(), 1.0);
        assert_relative_eq!(state.purity(), 1.0);
    }

    #[test]
    fn test_register_size_limits() {
        assert!(StateVector::zero(0).is_err());
        assert!(StateVector::zero(MAX_VECTOR_QUBITS + 1).is_err());
        assert!(DensityMatrix::zero(MAX_DENSITY_QUBITS + 1).is_err());
    }

    #[test]
    fn test_from_amplitudes_shape() {
        let err = StateVector::from_amplitudes(2, vec![c(1.0, 0.0); 3]).unwrap_err();
        assert!(matches!(err, QevoError::Shape { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_promote_pure_state() {
        let inv = 0.5f64.sqrt();
        let plus = StateVector::from_amplitudes(1, vec![c(inv, 0.0), c(inv, 0.0)]).unwrap();
        let state = State::Vector(plus).promote().unwrap();
        let rho = state.density().unwrap();
        assert_relative_eq!(rho.trace(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(rho.purity(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(rho.get(0, 1).re, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_maximally_mixed() {
        let rho = DensityMatrix::maximally_mixed(2).unwrap();
        assert_relative_eq!(rho.trace(), 1.0);
        assert_relative_eq!(rho.purity(), 0.25);
    }

    #[test]
    fn test_marginal_probabilities_vector() {
        // (|00> + |11>) / sqrt(2), qubit 1 is the high bit
        let inv = 0.5f64.sqrt();
        let bell = StateVector::from_amplitudes(
            2,
            vec![c(inv, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(inv, 0.0)],
        )
        .unwrap();
        let state = State::Vector(bell);

        let joint = state.probabilities(&[0, 1]).unwrap();
        assert_relative_eq!(joint[0b00], 0.5, epsilon = 1e-12);
        assert_relative_eq!(joint[0b11], 0.5, epsilon = 1e-12);
        assert_relative_eq!(joint[0b01], 0.0);

        let single = state.probabilities(&[1]).unwrap();
        assert_relative_eq!(single[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(single[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_marginal_probabilities_density() {
        let state = State::Density(DensityMatrix::maximally_mixed(2).unwrap());
        let probs = state.probabilities(&[0]).unwrap();
        assert_relative_eq!(probs[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(probs[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_probabilities_rejects_bad_qubits() {
        let state = State::zero(2, StateKind::Vector).unwrap();
        assert!(state.probabilities(&[2]).is_err());
        assert!(state.probabilities(&[0, 0]).is_err());
    }

    #[test]
    fn test_normalize_recovers_unit_norm() {
        let mut state = State::Vector(
            StateVector::from_amplitudes(1, vec![c(3.0, 0.0), c(4.0, 0.0)]).unwrap(),
        );
        assert_relative_eq!(state.normalization(), 25.0);
        state.normalize().unwrap();
        assert_relative_eq!(state.normalization(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_state_json_roundtrip() {
        let state = State::zero(2, StateKind::Density).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: State = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
