//! Dense contraction kernels
//!
//! One algorithm drives everything: a k-qubit matrix is contracted
//! against the target bit-axes of a flat amplitude array by gathering
//! the 2^k amplitudes of each index group, multiplying, and scattering
//! the results back. A density matrix is the same array with twice the
//! bits (bra qubit q at bit q, ket qubit q at bit q + n), so a unitary
//! becomes two passes (U on the ket bits, conj(U) on the bra bits) and
//! a channel accumulates one such double pass per Kraus operator.
//!
//! Parallel variants split the array with `par_chunks_mut` on a chunk
//! length closed over the highest target bit, so every index group
//! stays inside one chunk.

use num_complex::Complex64;
use qevo_core::{KrausSet, OpKind, Operation, QevoError, QevoResult, QubitId, SquareMatrix};
use rayon::prelude::*;

use crate::observable::{PauliMasks, PauliString};
use crate::state::State;

/// Outcomes below this probability cannot be collapsed onto
pub(crate) const MIN_OUTCOME_PROBABILITY: f64 = 1e-12;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

// ============================================================================
// Index Arithmetic
// ============================================================================

/// Spread a group index over the non-target bits by inserting a zero
/// bit at every target position (positions must be sorted ascending)
fn expand_index(group: usize, sorted_targets: &[usize]) -> usize {
    let mut index = group;
    for &t in sorted_targets {
        let low = index & ((1usize << t) - 1);
        index = ((index >> t) << (t + 1)) | low;
    }
    index
}

/// Offsets of the 2^k group members: bit j of the matrix index maps to
/// bit `targets[j]` of the amplitude index
fn target_offsets(targets: &[usize]) -> Vec<usize> {
    let dim = 1usize << targets.len();
    (0..dim)
        .map(|s| {
            let mut offset = 0usize;
            for (j, &t) in targets.iter().enumerate() {
                offset |= ((s >> j) & 1) << t;
            }
            offset
        })
        .collect()
}

fn control_mask(controls: &[QubitId]) -> usize {
    controls.iter().fold(0usize, |mask, &c| mask | (1usize << c))
}

// ============================================================================
// Single-Qubit Kernels
// ============================================================================

fn apply_single_qubit_sequential(
    amps: &mut [Complex64],
    matrix: &SquareMatrix,
    qubit: usize,
    controls: usize,
) {
    let stride = 1usize << qubit;
    let m00 = matrix.get(0, 0);
    let m01 = matrix.get(0, 1);
    let m10 = matrix.get(1, 0);
    let m11 = matrix.get(1, 1);

    let mut i = 0usize;
    while i < amps.len() {
        for j in 0..stride {
            let idx0 = i + j;
            if idx0 & controls != controls {
                continue;
            }
            let idx1 = idx0 + stride;
            let a0 = amps[idx0];
            let a1 = amps[idx1];
            amps[idx0] = m00 * a0 + m01 * a1;
            amps[idx1] = m10 * a0 + m11 * a1;
        }
        i += stride * 2;
    }
}

fn apply_single_qubit_parallel(
    amps: &mut [Complex64],
    matrix: &SquareMatrix,
    qubit: usize,
    controls: usize,
) {
    let stride = 1usize << qubit;
    let m00 = matrix.get(0, 0);
    let m01 = matrix.get(0, 1);
    let m10 = matrix.get(1, 0);
    let m11 = matrix.get(1, 1);

    amps.par_chunks_mut(stride * 2)
        .enumerate()
        .for_each(|(chunk, pair)| {
            let base = chunk * stride * 2;
            for j in 0..stride {
                if (base | j) & controls != controls {
                    continue;
                }
                let a0 = pair[j];
                let a1 = pair[j + stride];
                pair[j] = m00 * a0 + m01 * a1;
                pair[j + stride] = m10 * a0 + m11 * a1;
            }
        });
}

// ============================================================================
// Multi-Qubit Kernels
// ============================================================================

fn apply_multi_qubit_sequential(
    amps: &mut [Complex64],
    matrix: &SquareMatrix,
    targets: &[usize],
    controls: usize,
) {
    let k = targets.len();
    let dim = 1usize << k;
    let mut sorted = targets.to_vec();
    sorted.sort_unstable();
    let offsets = target_offsets(targets);

    let mut gathered = vec![ZERO; dim];
    for group in 0..(amps.len() >> k) {
        let base = expand_index(group, &sorted);
        if base & controls != controls {
            continue;
        }
        for (s, slot) in gathered.iter_mut().enumerate() {
            *slot = amps[base | offsets[s]];
        }
        for row in 0..dim {
            let mut acc = ZERO;
            for (col, &amp) in gathered.iter().enumerate() {
                acc += matrix.get(row, col) * amp;
            }
            amps[base | offsets[row]] = acc;
        }
    }
}

fn apply_multi_qubit_parallel(
    amps: &mut [Complex64],
    matrix: &SquareMatrix,
    targets: &[usize],
    controls: usize,
) {
    let k = targets.len();
    let dim = 1usize << k;
    let top = targets.iter().copied().max().unwrap_or(0);
    // groups never straddle a chunk that covers the highest target bit
    let chunk_len = 1usize << (top + 1);
    let mut sorted = targets.to_vec();
    sorted.sort_unstable();
    let offsets = target_offsets(targets);

    amps.par_chunks_mut(chunk_len)
        .enumerate()
        .for_each(|(chunk, slice)| {
            let start = chunk * chunk_len;
            let mut gathered = vec![ZERO; dim];
            for group in 0..(chunk_len >> k) {
                let base = expand_index(group, &sorted);
                if (start | base) & controls != controls {
                    continue;
                }
                for (s, slot) in gathered.iter_mut().enumerate() {
                    *slot = slice[base | offsets[s]];
                }
                for row in 0..dim {
                    let mut acc = ZERO;
                    for (col, &amp) in gathered.iter().enumerate() {
                        acc += matrix.get(row, col) * amp;
                    }
                    slice[base | offsets[row]] = acc;
                }
            }
        });
}

// ============================================================================
// Dispatch
// ============================================================================

/// Contract a unitary against target bits of a flat amplitude array
pub(crate) fn apply_unitary(
    amps: &mut [Complex64],
    matrix: &SquareMatrix,
    targets: &[usize],
    controls: usize,
    parallel: bool,
) {
    match (targets.len(), parallel) {
        (1, false) => apply_single_qubit_sequential(amps, matrix, targets[0], controls),
        (1, true) => apply_single_qubit_parallel(amps, matrix, targets[0], controls),
        (_, false) => apply_multi_qubit_sequential(amps, matrix, targets, controls),
        (_, true) => apply_multi_qubit_parallel(amps, matrix, targets, controls),
    }
}

/// rho -> U rho U-dagger over the doubled index space
pub(crate) fn apply_unitary_density(
    elems: &mut [Complex64],
    num_qubits: usize,
    matrix: &SquareMatrix,
    targets: &[usize],
    op_controls: &[QubitId],
    parallel: bool,
) {
    let ket_targets: Vec<usize> = targets.iter().map(|&t| t + num_qubits).collect();
    let ket_controls = op_controls
        .iter()
        .fold(0usize, |mask, &c| mask | (1usize << (c + num_qubits)));
    let bra_controls = control_mask(op_controls);

    apply_unitary(elems, matrix, &ket_targets, ket_controls, parallel);
    apply_unitary(elems, &matrix.conjugate(), targets, bra_controls, parallel);
}

/// rho -> sum_i K_i rho K_i-dagger, one double pass per operator
pub(crate) fn apply_channel_density(
    elems: &mut [Complex64],
    num_qubits: usize,
    kraus: &KrausSet,
    targets: &[usize],
    parallel: bool,
) {
    let ket_targets: Vec<usize> = targets.iter().map(|&t| t + num_qubits).collect();
    let mut acc = vec![ZERO; elems.len()];
    let mut work = vec![ZERO; elems.len()];
    for op in kraus.operators() {
        work.copy_from_slice(elems);
        apply_unitary(&mut work, op, &ket_targets, 0, parallel);
        apply_unitary(&mut work, &op.conjugate(), targets, 0, parallel);
        for (a, w) in acc.iter_mut().zip(work.iter()) {
            *a += *w;
        }
    }
    elems.copy_from_slice(&acc);
}

// ============================================================================
// Measurement Collapse
// ============================================================================

fn outcome_masks(qubits: &[usize], outcome: usize) -> (usize, usize) {
    let mut mask = 0usize;
    let mut want = 0usize;
    for (j, &q) in qubits.iter().enumerate() {
        mask |= 1usize << q;
        if (outcome >> j) & 1 == 1 {
            want |= 1usize << q;
        }
    }
    (mask, want)
}

/// Project a vector onto `outcome` and renormalize; returns the
/// pre-collapse probability, leaving the state untouched when it is
/// too small to divide by
fn collapse_vector(amps: &mut [Complex64], qubits: &[usize], outcome: usize) -> f64 {
    let (mask, want) = outcome_masks(qubits, outcome);
    let mut p = 0.0;
    for (i, a) in amps.iter().enumerate() {
        if i & mask == want {
            p += a.norm_sqr();
        }
    }
    if p <= MIN_OUTCOME_PROBABILITY {
        return p;
    }
    let scale = Complex64::new(1.0 / p.sqrt(), 0.0);
    for (i, a) in amps.iter_mut().enumerate() {
        if i & mask == want {
            *a *= scale;
        } else {
            *a = ZERO;
        }
    }
    p
}

/// rho -> P rho P / p for the projector P onto `outcome`
fn collapse_density(
    elems: &mut [Complex64],
    num_qubits: usize,
    qubits: &[usize],
    outcome: usize,
) -> f64 {
    let (mask, want) = outcome_masks(qubits, outcome);
    let dim = 1usize << num_qubits;
    let mut p = 0.0;
    for i in 0..dim {
        if i & mask == want {
            p += elems[i * dim + i].re;
        }
    }
    if p <= MIN_OUTCOME_PROBABILITY {
        return p;
    }
    let scale = Complex64::new(1.0 / p, 0.0);
    for row in 0..dim {
        let keep_row = row & mask == want;
        for col in 0..dim {
            let idx = row * dim + col;
            if keep_row && col & mask == want {
                elems[idx] *= scale;
            } else {
                elems[idx] = ZERO;
            }
        }
    }
    p
}

// ============================================================================
// Pauli Expectation
// ============================================================================

fn expectation_vector(amps: &[Complex64], masks: &PauliMasks) -> f64 {
    let mut acc = ZERO;
    for (i, a) in amps.iter().enumerate() {
        let src = i ^ masks.flip;
        let mut term = a.conj() * amps[src];
        if (src & masks.sign).count_ones() % 2 == 1 {
            term = -term;
        }
        acc += term;
    }
    (masks.phase * acc).re
}

fn expectation_density(elems: &[Complex64], num_qubits: usize, masks: &PauliMasks) -> f64 {
    let dim = 1usize << num_qubits;
    let mut acc = ZERO;
    // tr(rho P) pairs rho[row][col] with <col|P|row>, whose parity
    // sign reads off the input index row
    for row in 0..dim {
        let col = row ^ masks.flip;
        let mut term = elems[row * dim + col];
        if (row & masks.sign).count_ones() % 2 == 1 {
            term = -term;
        }
        acc += term;
    }
    (masks.phase * acc).re
}

// ============================================================================
// State-Level Entry Points
// ============================================================================

/// Apply a gate or channel to a state in place
pub(crate) fn apply_operation(
    state: &mut State,
    op: &Operation,
    parallel: bool,
) -> QevoResult<()> {
    let num_qubits = state.num_qubits();
    if let Some(max) = op.max_qubit() {
        if max >= num_qubits {
            return Err(QevoError::QubitOutOfRange {
                qubit: max,
                num_qubits,
            });
        }
    }
    match op.kind() {
        OpKind::Gate(generator) => {
            let matrix = generator.matrix()?;
            match state {
                State::Vector(v) => apply_unitary(
                    v.amplitudes_mut(),
                    &matrix,
                    op.targets(),
                    control_mask(op.controls()),
                    parallel,
                ),
                State::Density(d) => apply_unitary_density(
                    d.elements_mut(),
                    num_qubits,
                    &matrix,
                    op.targets(),
                    op.controls(),
                    parallel,
                ),
            }
            Ok(())
        }
        OpKind::Channel(kraus) => match state {
            State::Vector(_) => Err(QevoError::InvalidState(
                "Kraus channels need a density-matrix state".to_string(),
            )),
            State::Density(d) => {
                apply_channel_density(
                    d.elements_mut(),
                    num_qubits,
                    kraus,
                    op.targets(),
                    parallel,
                );
                Ok(())
            }
        },
        OpKind::Measure { .. } => Err(QevoError::Internal(
            "measurements are routed through collapse_measure".to_string(),
        )),
    }
}

/// Collapse measured qubits onto a drawn outcome; returns its probability
pub(crate) fn collapse(
    state: &mut State,
    qubits: &[QubitId],
    outcome: usize,
) -> QevoResult<f64> {
    let num_qubits = state.num_qubits();
    if qubits.is_empty() {
        return Err(QevoError::InvalidState(
            "measurement needs at least one qubit".to_string(),
        ));
    }
    let mut seen = 0usize;
    for &q in qubits {
        if q >= num_qubits {
            return Err(QevoError::QubitOutOfRange {
                qubit: q,
                num_qubits,
            });
        }
        if seen & (1usize << q) != 0 {
            return Err(QevoError::DuplicateQubit(q));
        }
        seen |= 1usize << q;
    }
    if outcome >> qubits.len() != 0 {
        return Err(QevoError::InvalidState(format!(
            "outcome {} does not fit {} measured qubits",
            outcome,
            qubits.len()
        )));
    }

    let p = match state {
        State::Vector(v) => collapse_vector(v.amplitudes_mut(), qubits, outcome),
        State::Density(d) => collapse_density(d.elements_mut(), num_qubits, qubits, outcome),
    };
    if p <= MIN_OUTCOME_PROBABILITY {
        return Err(QevoError::InvalidState(format!(
            "cannot collapse onto outcome {} with probability {:.3e}",
            outcome, p
        )));
    }
    Ok(p)
}

/// Expectation value of a Pauli string
pub(crate) fn expectation(state: &State, observable: &PauliString) -> QevoResult<f64> {
    if observable.num_qubits() != state.num_qubits() {
        return Err(QevoError::QubitCountMismatch {
            left: state.num_qubits(),
            right: observable.num_qubits(),
        });
    }
    let masks = observable.masks();
    Ok(match state {
        State::Vector(v) => expectation_vector(v.amplitudes(), &masks),
        State::Density(d) => expectation_density(d.elements(), d.num_qubits(), &masks),
    })
}

// ============================================================================
// Tests
// ============================================================================
