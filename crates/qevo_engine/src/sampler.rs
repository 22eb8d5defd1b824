//! Measurement sampling
//!
//! Outcome distributions come from squared amplitudes (vectors) or the
//! diagonal partial trace (density matrices); categorical draws go
//! through a Walker alias table, O(1) per shot after O(2^k) setup. All
//! randomness flows through `ChaCha8Rng`, so identical seeds give
//! identical counts on every platform.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use qevo_backend::State;
use qevo_core::{Bitstring, Counts, QevoError, QevoResult, QubitId};

/// Tolerance on the sum of a probability distribution
const DISTRIBUTION_TOL: f64 = 1e-8;

// ============================================================================
// Alias Table
// ============================================================================

/// Walker alias table over a finite outcome distribution
#[derive(Debug, Clone)]
pub struct AliasTable {
    prob: Vec<f64>,
    alias: Vec<usize>,
}

impl AliasTable {
    /// Build from outcome probabilities; they are normalized internally
    pub fn new(probs: &[f64]) -> QevoResult<Self> {
        if probs.is_empty() {
            return Err(QevoError::InvalidState(
                "cannot sample an empty distribution".to_string(),
            ));
        }
        for &p in probs {
            if !p.is_finite() || p < -DISTRIBUTION_TOL {
                return Err(QevoError::InvalidProbability(p));
            }
        }
        let total: f64 = probs.iter().sum();
        if !(total > 0.0) || !total.is_finite() {
            return Err(QevoError::InvalidState(format!(
                "distribution sums to {}",
                total
            )));
        }

        let n = probs.len();
        let mut scaled: Vec<f64> = probs
            .iter()
            .map(|&p| p.max(0.0) * n as f64 / total)
            .collect();
        let mut small = Vec::new();
        let mut large = Vec::new();
        for (i, &s) in scaled.iter().enumerate() {
            if s < 1.0 {
                small.push(i);
            } else {
                large.push(i);
            }
        }

        // leftovers in either worklist keep probability 1.0
        let mut prob = vec![1.0; n];
        let mut alias: Vec<usize> = (0..n).collect();
        loop {
            let (Some(s), Some(l)) = (small.pop(), large.pop()) else {
                break;
            };
            prob[s] = scaled[s];
            alias[s] = l;
            scaled[l] += scaled[s] - 1.0;
            if scaled[l] < 1.0 {
                small.push(l);
            } else {
                large.push(l);
            }
        }

        Ok(Self { prob, alias })
    }

    /// Number of outcomes
    pub fn len(&self) -> usize {
        self.prob.len()
    }

    /// True for a zero-outcome table (never constructed)
    pub fn is_empty(&self) -> bool {
        self.prob.is_empty()
    }

    /// Draw one outcome index
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let slot = rng.gen_range(0..self.len());
        let coin: f64 = rng.gen();
        if coin < self.prob[slot] {
            slot
        } else {
            self.alias[slot]
        }
    }
}

// ============================================================================
// Sampling
// ============================================================================

/// Sample outcome counts for a qubit subset of a state
///
/// Keys are bitstrings whose j-th bit (counting from the least
/// significant, rightmost character) is the value of `qubits[j]`; with
/// an ascending qubit list the leftmost character is the highest
/// qubit. Identical seeds give identical counts.
pub fn sample(state: &State, qubits: &[QubitId], shots: u64, seed: u64) -> QevoResult<Counts> {
    let probs = state.probabilities(qubits)?;
    let table = AliasTable::new(&probs)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut counts = Counts::new();
    for _ in 0..shots {
        let outcome = table.sample(&mut rng);
        let key = Bitstring::from_index(outcome, qubits.len()).to_string();
        *counts.entry(key).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Draw a single outcome index from the marginal distribution
///
/// Used for mid-circuit measurement, where one draw decides the branch
/// the state collapses onto. Bit `j` of the result is the value of
/// `qubits[j]`.
pub fn sample_once<R: Rng>(
    state: &State,
    qubits: &[QubitId],
    rng: &mut R,
) -> QevoResult<usize> {
    let probs = state.probabilities(qubits)?;
    let total: f64 = probs.iter().sum();
    if !(total > 0.0) || !total.is_finite() {
        return Err(QevoError::InvalidState(format!(
            "distribution sums to {}",
            total
        )));
    }

    let draw: f64 = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for (index, &p) in probs.iter().enumerate() {
        cumulative += p;
        if draw < cumulative {
            return Ok(index);
        }
    }
    Ok(probs.len() - 1)
}

// ============================================================================
// Distribution Diagnostics
// ============================================================================

/// Shannon entropy (base 2) of a probability distribution
///
/// Zero-probability outcomes contribute nothing; the distribution must
/// sum to 1.
pub fn shannon_entropy(probs: &[f64]) -> QevoResult<f64> {
    let mut total = 0.0;
    for &p in probs {
        if !p.is_finite() || !(-DISTRIBUTION_TOL..=1.0 + DISTRIBUTION_TOL).contains(&p) {
            return Err(QevoError::InvalidProbability(p));
        }
        total += p;
    }
    if (total - 1.0).abs() > DISTRIBUTION_TOL {
        return Err(QevoError::InvalidState(format!(
            "distribution sums to {}, expected 1",
            total
        )));
    }

    let entropy: f64 = probs
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| -p * p.log2())
        .sum();
    // abs() turns a rounded -0.0 into 0.0
    Ok(entropy.abs())
}

/// Shannon entropy of sampled counts, in bits
pub fn counts_entropy(counts: &Counts) -> QevoResult<f64> {
    let total: u64 = counts.values().sum();
    if total == 0 {
        return Ok(0.0);
    }
    let probs: Vec<f64> = counts
        .values()
        .map(|&c| c as f64 / total as f64)
        .collect();
    shannon_entropy(&probs)
}

/// The most frequently observed outcome; ties break to the
/// lexicographically smallest key
pub fn most_frequent(counts: &Counts) -> Option<(&str, u64)> {
    let mut best: Option<(&str, u64)> = None;
    for (key, &count) in counts {
        let better = match best {
            None => true,
            Some((best_key, best_count)) => {
                count > best_count || (count == best_count && key.as_str() < best_key)
            }
        };
        if better {
            best = Some((key.as_str(), count));
        }
    }
    best
}

// ============================================================================
// Tests
// ============================================================================
