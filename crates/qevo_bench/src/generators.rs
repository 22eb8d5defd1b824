//! Circuit generators and random test-state tooling
//!
//! Standard benchmark circuits (Bell, GHZ, W, QFT, layered random) plus
//! seeded random states and unitaries for exercising backends.

use num_complex::Complex64;
use qevo_backend::{DensityMatrix, StateVector};
use qevo_core::{Circuit, CircuitBuilder, Generator, QevoError, QevoResult, SquareMatrix};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

// ============================================================================
// CircuitGenerator
// ============================================================================

/// Circuit generator for benchmarks
pub struct CircuitGenerator {
    /// Random seed for the randomized generators
    seed: Option<u64>,
}

impl CircuitGenerator {
    /// Create new generator
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// Create generator with seed
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    // ========================================================================
    // Standard Circuits
    // ========================================================================

    /// Bell pair circuit
    pub fn bell(&self) -> Circuit {
        CircuitBuilder::new(2).h(0).cnot(0, 1).build()
    }

    /// GHZ state preparation circuit
    /// |GHZ⟩ = (|00...0⟩ + |11...1⟩) / √2
    pub fn ghz(&self, num_qubits: usize) -> Circuit {
        CircuitBuilder::new(num_qubits).h(0).cx_chain().build()
    }

    /// W state preparation circuit
    /// |W⟩ = (|100...0⟩ + |010...0⟩ + ... + |00...01⟩) / √n
    pub fn w_state(&self, num_qubits: usize) -> Circuit {
        let mut builder = CircuitBuilder::new(num_qubits).x(0);

        // walk the excitation down the register, splitting off 1/(n-i)
        // of the remaining weight at each step
        for i in 0..num_qubits.saturating_sub(1) {
            let share = 1.0 / ((num_qubits - i) as f64).sqrt();
            let theta = 2.0 * share.acos();
            builder = builder
                .controlled(Generator::Ry(theta.into()), vec![i], vec![i + 1])
                .cnot(i + 1, i);
        }

        builder.build()
    }

    /// Quantum Fourier Transform circuit with final reordering swaps
    pub fn qft(&self, num_qubits: usize) -> Circuit {
        self.qft_with_swaps(num_qubits, true)
    }

    /// QFT circuit; `swaps` controls the final qubit-reversal swaps
    pub fn qft_with_swaps(&self, num_qubits: usize, swaps: bool) -> Circuit {
        let mut builder = CircuitBuilder::new(num_qubits);

        for i in 0..num_qubits {
            builder = builder.h(i);
            for j in (i + 1)..num_qubits {
                let theta = PI / (1u64 << (j - i)) as f64;
                builder = builder.cphase(j, i, theta);
            }
        }

        if swaps {
            for i in 0..num_qubits / 2 {
                builder = builder.swap(i, num_qubits - 1 - i);
            }
        }

        builder.build()
    }

    // ========================================================================
    // Randomized Circuits
    // ========================================================================

    /// Hardware-efficient ansatz: rotation layers with CNOT chains
    pub fn hea(&self, num_qubits: usize, depth: usize) -> Circuit {
        let mut builder = CircuitBuilder::new(num_qubits);
        let mut rng = self.rng();

        for _ in 0..depth {
            for q in 0..num_qubits {
                let rx_angle: f64 = rng.gen::<f64>() * 2.0 * PI;
                let ry_angle: f64 = rng.gen::<f64>() * 2.0 * PI;
                builder = builder.rx(q, rx_angle).ry(q, ry_angle);
            }
            builder = builder.cx_chain();
        }

        builder.build()
    }

    /// Layered random circuit: one random single-qubit gate per qubit per
    /// layer, with CNOTs placed between neighbours at random
    pub fn random(&self, num_qubits: usize, depth: usize) -> Circuit {
        let mut builder = CircuitBuilder::new(num_qubits);
        let mut rng = self.rng();

        for _ in 0..depth {
            for q in 0..num_qubits {
                builder = match rng.gen_range(0..6) {
                    0 => builder.h(q),
                    1 => builder.x(q),
                    2 => builder.s(q),
                    3 => builder.t(q),
                    4 => builder.rx(q, rng.gen::<f64>() * 2.0 * PI),
                    _ => builder.ry(q, rng.gen::<f64>() * 2.0 * PI),
                };
            }
            for q in 0..num_qubits.saturating_sub(1) {
                if rng.gen::<f64>() < 0.5 {
                    builder = builder.cnot(q, q + 1);
                }
            }
        }

        builder.build()
    }

    /// Uniform-superposition circuit: Hadamard on every qubit
    pub fn h_layer(&self, num_qubits: usize) -> Circuit {
        CircuitBuilder::new(num_qubits).h_layer().build()
    }

    // ========================================================================
    // Scaling Families
    // ========================================================================

    /// GHZ circuits from 2 qubits up to `max_qubits`
    pub fn qubit_scaling(&self, max_qubits: usize) -> Vec<Circuit> {
        (2..=max_qubits).map(|n| self.ghz(n)).collect()
    }

    /// Random layered circuits of increasing depth
    pub fn depth_scaling(&self, num_qubits: usize, max_depth: usize) -> Vec<Circuit> {
        (1..=max_depth).map(|d| self.hea(num_qubits, d)).collect()
    }

    // ========================================================================
    // Utility
    // ========================================================================

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

impl Default for CircuitGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Random State Tooling
// ============================================================================

/// Seeded random state vector
///
/// Amplitudes are √p·e^{iφ} with uniform normalized probabilities and
/// uniform phases; always unit norm.
pub fn random_statevector(num_qubits: usize, seed: u64) -> QevoResult<StateVector> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dim = 1usize << num_qubits;

    let mut probabilities: Vec<f64> = (0..dim).map(|_| rng.gen::<f64>()).collect();
    let total: f64 = probabilities.iter().sum();
    for p in probabilities.iter_mut() {
        *p /= total;
    }

    let amps = probabilities
        .iter()
        .map(|&p| Complex64::from_polar(p.sqrt(), 2.0 * PI * rng.gen::<f64>()))
        .collect();
    StateVector::from_amplitudes(num_qubits, amps)
}

/// Seeded random density matrix, ρ = AA†/tr(AA†) for Gaussian A
///
/// Positive semidefinite with unit trace by construction.
pub fn random_density_matrix(num_qubits: usize, seed: u64) -> QevoResult<DensityMatrix> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dim = 1usize << num_qubits;

    let mut a = SquareMatrix::zeros(dim);
    for row in 0..dim {
        for col in 0..dim {
            a.set(row, col, gaussian_complex(&mut rng));
        }
    }

    let rho = a.matmul(&a.adjoint())?;
    let trace: f64 = (0..dim).map(|i| rho.get(i, i).re).sum();
    let rho = rho.scale(Complex64::new(1.0 / trace, 0.0));
    DensityMatrix::from_elements(num_qubits, rho.data().to_vec())
}

/// Seeded Haar-random unitary: orthonormalized Gaussian matrix
pub fn random_unitary(num_qubits: usize, seed: u64) -> QevoResult<SquareMatrix> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dim = 1usize << num_qubits;

    let mut cols: Vec<Vec<Complex64>> = (0..dim)
        .map(|_| (0..dim).map(|_| gaussian_complex(&mut rng)).collect())
        .collect();

    // modified Gram-Schmidt over the columns; the triangular factor's
    // diagonal stays real positive
    for j in 0..dim {
        let (done, rest) = cols.split_at_mut(j);
        let current = &mut rest[0];
        for q in done.iter() {
            let proj: Complex64 = q
                .iter()
                .zip(current.iter())
                .map(|(qi, ai)| qi.conj() * ai)
                .sum();
            for (ai, qi) in current.iter_mut().zip(q.iter()) {
                *ai -= proj * qi;
            }
        }
        let norm = current.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        if norm < 1e-12 {
            return Err(QevoError::InvalidState(
                "degenerate random matrix in orthogonalization".to_string(),
            ));
        }
        for ai in current.iter_mut() {
            *ai /= norm;
        }
    }

    let mut m = SquareMatrix::zeros(dim);
    for (col, column) in cols.iter().enumerate() {
        for (row, &value) in column.iter().enumerate() {
            m.set(row, col, value);
        }
    }
    Ok(m)
}

/// One standard complex Gaussian sample (Box-Muller)
fn gaussian_complex<R: Rng>(rng: &mut R) -> Complex64 {
    let u1: f64 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.gen();
    let radius = (-2.0 * u1.ln()).sqrt();
    let angle = 2.0 * PI * u2;
    Complex64::new(radius * angle.cos(), radius * angle.sin())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qevo_engine::EvolutionEngine;

    #[test]
    fn test_ghz() {
        let gen = CircuitGenerator::new();
        let circuit = gen.ghz(5);

        assert_eq!(circuit.num_qubits(), 5);
        assert_eq!(circuit.count_1q_gates(), 1);
        assert_eq!(circuit.count_2q_gates(), 4);
    }

    #[test]
    fn test_bell_probabilities() {
        let circuit = CircuitGenerator::new().bell();
        let result = EvolutionEngine::with_defaults()
            .execute(&circuit, None)
            .unwrap();
        let probs = result.state().probabilities(&[0, 1]).unwrap();
        assert_relative_eq!(probs[0b00], 0.5, epsilon = 1e-12);
        assert_relative_eq!(probs[0b11], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_w_state_single_excitation() {
        let circuit = CircuitGenerator::new().w_state(3);
        let result = EvolutionEngine::with_defaults()
            .execute(&circuit, None)
            .unwrap();
        let probs = result.state().probabilities(&[0, 1, 2]).unwrap();

        for idx in [0b001, 0b010, 0b100] {
            assert_relative_eq!(probs[idx], 1.0 / 3.0, epsilon = 1e-9);
        }
        for idx in [0b000, 0b011, 0b101, 0b110, 0b111] {
            assert_relative_eq!(probs[idx], 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_qft_on_zero_is_uniform() {
        let circuit = CircuitGenerator::new().qft(4);
        let result = EvolutionEngine::with_defaults()
            .execute(&circuit, None)
            .unwrap();
        let probs = result.state().probabilities(&[0, 1, 2, 3]).unwrap();
        for p in probs {
            assert_relative_eq!(p, 1.0 / 16.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_qft_swaps_optional() {
        let gen = CircuitGenerator::new();
        let with_swaps = gen.qft_with_swaps(4, true);
        let without = gen.qft_with_swaps(4, false);
        assert_eq!(with_swaps.count_gates(), without.count_gates() + 2);
    }

    #[test]
    fn test_random_reproducibility() {
        let c1 = CircuitGenerator::with_seed(42).random(5, 3);
        let c2 = CircuitGenerator::with_seed(42).random(5, 3);
        assert_eq!(c1.len(), c2.len());
        for (a, b) in c1.ops().iter().zip(c2.ops().iter()) {
            assert_eq!(a.name(), b.name());
            assert_eq!(a.targets(), b.targets());
        }
    }

    #[test]
    fn test_hea_depth_grows() {
        let gen = CircuitGenerator::with_seed(7);
        let circuits = gen.depth_scaling(4, 4);
        assert_eq!(circuits.len(), 4);

        let depths: Vec<usize> = circuits.iter().map(|c| c.depth()).collect();
        for pair in depths.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
    }

    #[test]
    fn test_qubit_scaling_family() {
        let circuits = CircuitGenerator::new().qubit_scaling(6);
        assert_eq!(circuits.len(), 5);
        for (i, c) in circuits.iter().enumerate() {
            assert_eq!(c.num_qubits(), i + 2);
        }
    }

    #[test]
    fn test_random_statevector_normalized() {
        let state = random_statevector(4, 11).unwrap();
        assert_relative_eq!(state.squared_norm(), 1.0, epsilon = 1e-12);

        let again = random_statevector(4, 11).unwrap();
        assert!(state.max_abs_diff(&again) < 1e-15);
    }

    #[test]
    fn test_random_density_matrix_valid() {
        let rho = random_density_matrix(3, 23).unwrap();
        assert_relative_eq!(rho.trace(), 1.0, epsilon = 1e-12);
        assert!(rho.purity() <= 1.0 + 1e-12);

        // hermiticity
        for row in 0..rho.dim() {
            for col in 0..rho.dim() {
                let a = rho.get(row, col);
                let b = rho.get(col, row).conj();
                assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
                assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_random_unitary_is_unitary() {
        let u = random_unitary(2, 37).unwrap();
        assert!(u.is_unitary(1e-9));

        let again = random_unitary(2, 37).unwrap();
        assert!(u.max_abs_diff(&again) < 1e-15);
    }
}
