//! Standard noise channels
//!
//! Constructors for the common Kraus channels. Every constructor
//! validates its probabilities and returns a completeness-checked
//! `KrausSet`, so a channel that reaches a circuit is always trace
//! preserving.

use num_complex::Complex64;
use qevo_core::{KrausSet, Probability, QevoError, QevoResult, SquareMatrix};

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn pauli(index: usize) -> SquareMatrix {
    let mut m = SquareMatrix::zeros(2);
    match index {
        0 => {
            m.set(0, 0, c(1.0, 0.0));
            m.set(1, 1, c(1.0, 0.0));
        }
        1 => {
            m.set(0, 1, c(1.0, 0.0));
            m.set(1, 0, c(1.0, 0.0));
        }
        2 => {
            m.set(0, 1, c(0.0, -1.0));
            m.set(1, 0, c(0.0, 1.0));
        }
        _ => {
            m.set(0, 0, c(1.0, 0.0));
            m.set(1, 1, c(-1.0, 0.0));
        }
    }
    m
}

// ============================================================================
// Pauli-Type Channels
// ============================================================================

/// Bit flip: X with probability p
pub fn bit_flip(p: f64) -> QevoResult<KrausSet> {
    let p = Probability::new(p)?.value();
    KrausSet::new(
        "bit_flip",
        vec![
            SquareMatrix::identity(2).scale(c((1.0 - p).sqrt(), 0.0)),
            pauli(1).scale(c(p.sqrt(), 0.0)),
        ],
    )
}

/// Phase flip: Z with probability p
pub fn phase_flip(p: f64) -> QevoResult<KrausSet> {
    let p = Probability::new(p)?.value();
    KrausSet::new(
        "phase_flip",
        vec![
            SquareMatrix::identity(2).scale(c((1.0 - p).sqrt(), 0.0)),
            pauli(3).scale(c(p.sqrt(), 0.0)),
        ],
    )
}

/// General Pauli channel: X, Y, Z with probabilities px, py, pz
pub fn pauli_channel(px: f64, py: f64, pz: f64) -> QevoResult<KrausSet> {
    let px = Probability::new(px)?.value();
    let py = Probability::new(py)?.value();
    let pz = Probability::new(pz)?.value();
    let total = px + py + pz;
    if total > 1.0 {
        return Err(QevoError::InvalidProbability(total));
    }
    KrausSet::new(
        "pauli",
        vec![
            SquareMatrix::identity(2).scale(c((1.0 - total).sqrt(), 0.0)),
            pauli(1).scale(c(px.sqrt(), 0.0)),
            pauli(2).scale(c(py.sqrt(), 0.0)),
            pauli(3).scale(c(pz.sqrt(), 0.0)),
        ],
    )
}

/// Single-qubit depolarizing channel, uniform over X, Y, Z
///
/// ρ → (1-p)·ρ + p/3·(XρX + YρY + ZρZ). Fully depolarizing at p = 3/4,
/// where the output is I/2 for every input.
pub fn depolarizing(p: f64) -> QevoResult<KrausSet> {
    let p = Probability::new(p)?.value();
    let share = (p / 3.0).sqrt();
    KrausSet::new(
        "depolarizing",
        vec![
            SquareMatrix::identity(2).scale(c((1.0 - p).sqrt(), 0.0)),
            pauli(1).scale(c(share, 0.0)),
            pauli(2).scale(c(share, 0.0)),
            pauli(3).scale(c(share, 0.0)),
        ],
    )
}

/// n-qubit depolarizing channel, uniform over the 4^n - 1 non-identity
/// Pauli strings
///
/// Fully depolarizing at p = (4^n - 1)/4^n, where the output is I/2^n.
pub fn depolarizing_n(num_qubits: usize, p: f64) -> QevoResult<KrausSet> {
    if num_qubits == 0 {
        return Err(QevoError::Shape {
            expected: 2,
            actual: 1,
        });
    }
    let p = Probability::new(p)?.value();
    let strings = 4usize.pow(num_qubits as u32);
    let share = (p / (strings - 1) as f64).sqrt();

    let mut ops = Vec::with_capacity(strings);
    let identity_dim = 1usize << num_qubits;
    ops.push(SquareMatrix::identity(identity_dim).scale(c((1.0 - p).sqrt(), 0.0)));
    for code in 1..strings {
        // base-4 digit j selects the Pauli on qubit j (bit j of the index)
        let mut m = SquareMatrix::identity(1);
        for j in (0..num_qubits).rev() {
            let digit = (code >> (2 * j)) & 0b11;
            m = m.kron(&pauli(digit));
        }
        ops.push(m.scale(c(share, 0.0)));
    }
    KrausSet::new("depolarizing", ops)
}

// ============================================================================
// Damping Channels
// ============================================================================

/// Amplitude damping: |1⟩ decays to |0⟩ with probability γ
pub fn amplitude_damping(gamma: f64) -> QevoResult<KrausSet> {
    let gamma = Probability::new(gamma)?.value();
    KrausSet::new(
        "amplitude_damping",
        vec![
            SquareMatrix::from_vec(
                2,
                vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c((1.0 - gamma).sqrt(), 0.0)],
            )?,
            SquareMatrix::from_vec(
                2,
                vec![c(0.0, 0.0), c(gamma.sqrt(), 0.0), c(0.0, 0.0), c(0.0, 0.0)],
            )?,
        ],
    )
}

/// Amplitude damping from a gate duration and T1 time (same units):
/// γ = 1 - exp(-t/T1)
pub fn amplitude_damping_from_t1(gate_time: f64, t1: f64) -> QevoResult<KrausSet> {
    if !(t1 > 0.0) || !t1.is_finite() {
        return Err(QevoError::InvalidParameterValue(t1));
    }
    if !(gate_time >= 0.0) || !gate_time.is_finite() {
        return Err(QevoError::InvalidParameterValue(gate_time));
    }
    amplitude_damping(1.0 - (-gate_time / t1).exp())
}

/// Phase damping: coherence decays with probability λ, populations kept
pub fn phase_damping(lambda: f64) -> QevoResult<KrausSet> {
    let lambda = Probability::new(lambda)?.value();
    KrausSet::new(
        "phase_damping",
        vec![
            SquareMatrix::from_vec(
                2,
                vec![
                    c(1.0, 0.0),
                    c(0.0, 0.0),
                    c(0.0, 0.0),
                    c((1.0 - lambda).sqrt(), 0.0),
                ],
            )?,
            SquareMatrix::from_vec(
                2,
                vec![c(0.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(lambda.sqrt(), 0.0)],
            )?,
        ],
    )
}

/// Reset to |0⟩: amplitude damping at γ = 1
pub fn reset() -> QevoResult<KrausSet> {
    KrausSet::new(
        "reset",
        vec![
            SquareMatrix::from_vec(
                2,
                vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)],
            )?,
            SquareMatrix::from_vec(
                2,
                vec![c(0.0, 0.0), c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)],
            )?,
        ],
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_bit_flip_structure() {
        let ks = bit_flip(0.1).unwrap();
        assert_eq!(ks.len(), 2);
        assert_eq!(ks.num_qubits(), 1);
        assert_eq!(ks.label(), "bit_flip");
        // K1 = √0.1 · X
        assert_abs_diff_eq!(ks.operators()[1].get(0, 1).re, 0.1f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_probability_rejected() {
        assert!(bit_flip(-0.1).is_err());
        assert!(bit_flip(1.5).is_err());
        assert!(depolarizing(2.0).is_err());
        assert!(phase_damping(f64::NAN).is_err());
    }

    #[test]
    fn test_pauli_channel_budget() {
        assert!(pauli_channel(0.1, 0.1, 0.1).is_ok());
        let err = pauli_channel(0.5, 0.4, 0.3).unwrap_err();
        assert!(matches!(err, QevoError::InvalidProbability(_)));
    }

    #[test]
    fn test_depolarizing_edge_probabilities() {
        // p = 0 degenerates to the identity channel, p = 3/4 fully mixes
        assert_eq!(depolarizing(0.0).unwrap().len(), 4);
        assert!(depolarizing(0.75).is_ok());
        assert!(depolarizing(1.0).is_ok());
    }

    #[test]
    fn test_depolarizing_n_operator_count() {
        let ks = depolarizing_n(2, 0.3).unwrap();
        assert_eq!(ks.len(), 16);
        assert_eq!(ks.num_qubits(), 2);
        assert_eq!(ks.dim(), 4);

        assert!(depolarizing_n(0, 0.1).is_err());
    }

    #[test]
    fn test_depolarizing_n_matches_single_qubit_form() {
        let a = depolarizing(0.3).unwrap();
        let b = depolarizing_n(1, 0.3).unwrap();
        assert_eq!(a.len(), b.len());
        for (ka, kb) in a.operators().iter().zip(b.operators()) {
            assert!(ka.max_abs_diff(kb) < 1e-12);
        }
    }

    #[test]
    fn test_amplitude_damping_from_t1() {
        // t = T1 gives γ = 1 - 1/e
        let ks = amplitude_damping_from_t1(50.0, 50.0).unwrap();
        let gamma = 1.0 - (-1.0f64).exp();
        assert_abs_diff_eq!(ks.operators()[1].get(0, 1).re, gamma.sqrt(), epsilon = 1e-12);

        assert!(amplitude_damping_from_t1(1.0, 0.0).is_err());
        assert!(amplitude_damping_from_t1(-1.0, 10.0).is_err());
    }

    #[test]
    fn test_reset_maps_everything_to_zero() {
        let ks = reset().unwrap();
        // K0 |0⟩ = |0⟩, K1 |1⟩ = |0⟩
        assert_abs_diff_eq!(ks.operators()[0].get(0, 0).re, 1.0);
        assert_abs_diff_eq!(ks.operators()[1].get(0, 1).re, 1.0);
        assert_abs_diff_eq!(ks.operators()[0].get(1, 1).re, 0.0);
    }

    #[test]
    fn test_phase_damping_keeps_populations() {
        let ks = phase_damping(0.4).unwrap();
        for k in ks.operators() {
            // no off-diagonal transfer between |0⟩ and |1⟩
            assert_abs_diff_eq!(k.get(0, 1).norm(), 0.0);
            assert_abs_diff_eq!(k.get(1, 0).norm(), 0.0);
        }
    }
}
