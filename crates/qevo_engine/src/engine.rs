//! State evolution engine
//!
//! The engine owns the run loop: it allocates or validates the initial
//! state, applies operations through a shared backend handle, draws
//! mid-circuit measurement outcomes, gates classically conditioned
//! operations against its register file, and watches for numerical
//! drift and cancellation at every operation boundary.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use qevo_backend::{default_backend, Backend, Precision, State, StateKind, Tolerances};
use qevo_core::{Bitstring, Circuit, Counts, OpKind, QevoError, QevoResult, QubitId};

use crate::result::{ClassicalRegisters, ExecutionMetadata, ExecutionResult};
use crate::sampler;

// ============================================================================
// Cancellation
// ============================================================================

/// Shared flag cancelling executions at operation boundaries
///
/// Clones share one flag, so a single token can stop a whole sweep.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; running executions stop at the next
    /// operation boundary with `QevoError::Cancelled`
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Evolution Engine
// ============================================================================

/// Circuit executor bound to one backend handle
#[derive(Clone)]
pub struct EvolutionEngine {
    backend: Arc<dyn Backend>,
    seed: Option<u64>,
    cancel: Option<CancelToken>,
    precision: Precision,
    tolerances: Tolerances,
}

impl EvolutionEngine {
    /// Build an engine over a backend handle
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            seed: None,
            cancel: None,
            precision: Precision::Double,
            tolerances: Tolerances::double(),
        }
    }

    /// Build over the default backend
    pub fn with_defaults() -> Self {
        Self::new(default_backend())
    }

    /// Fix the random seed; seeded engines are fully reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Attach a cancellation token
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Select a precision profile; tolerances follow the profile
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self.tolerances = Tolerances::for_precision(precision);
        self
    }

    /// Override the numerical tolerances
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// The backend this engine executes on
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// The configured seed, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Clone with a seed offset, for independent derived executions
    pub(crate) fn derive(&self, offset: u64) -> Self {
        let mut engine = self.clone();
        engine.seed = self.seed.map(|seed| seed.wrapping_add(offset));
        engine
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Execute a circuit once, evolving a single state to the end
    ///
    /// `initial` defaults to the all-zeros state in the representation
    /// the circuit requires; a supplied state is validated and, when
    /// the circuit carries channels, promoted to a density matrix.
    /// Terminal and mid-circuit measurements alike draw one outcome,
    /// collapse the state, and record into the named register.
    pub fn execute(
        &self,
        circuit: &Circuit,
        initial: Option<State>,
    ) -> QevoResult<ExecutionResult> {
        if circuit.is_empty() {
            return Err(QevoError::EmptyCircuit);
        }
        if circuit.is_parametrized() {
            let symbol = circuit.parameters().into_iter().next().unwrap_or_default();
            return Err(QevoError::UnboundParameter(symbol));
        }

        let num_qubits = circuit.num_qubits();
        let required = if circuit.requires_density() {
            StateKind::Density
        } else {
            StateKind::Vector
        };
        let mut state = match initial {
            None => {
                self.check_supported(required)?;
                self.backend.allocate_state(num_qubits, required)?
            }
            Some(provided) => self.prepare_initial(provided, num_qubits, required)?,
        };

        let started = Instant::now();
        let mut rng = self.rng();
        let mut registers = ClassicalRegisters::new();
        let mut applied = 0usize;
        let mut max_drift = 0.0f64;

        for (step, op) in circuit.ops().iter().enumerate() {
            self.check_cancelled()?;

            if let Some(condition) = op.condition() {
                let value = registers
                    .get(&condition.register)
                    .ok_or_else(|| QevoError::UnknownRegister(condition.register.clone()))?;
                if value != condition.value {
                    continue;
                }
            }

            match op.kind() {
                OpKind::Measure { register } => {
                    let outcome = sampler::sample_once(&state, op.targets(), &mut rng)?;
                    self.backend
                        .collapse_measure(&mut state, op.targets(), outcome)?;
                    registers.set(register.clone(), outcome as u64, op.targets().len());
                }
                _ => self.backend.apply_operation(&mut state, op)?,
            }
            applied += 1;

            if !state.is_finite() {
                return Err(QevoError::NumericalInstability {
                    step,
                    detail: "state contains non-finite entries".to_string(),
                });
            }
            let drift = (state.normalization() - 1.0).abs();
            if drift > self.tolerances.norm_drift {
                return Err(QevoError::NumericalInstability {
                    step,
                    detail: format!("normalization drifted by {:.3e}", drift),
                });
            }
            max_drift = max_drift.max(drift);
        }
        self.check_cancelled()?;

        let metadata = ExecutionMetadata {
            backend: self.backend.name().to_string(),
            precision: self.precision,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
            applied_ops: applied,
            norm_drift: max_drift,
            seed: self.seed,
        };
        log::debug!("execution finished: {}", metadata);
        Ok(ExecutionResult::new(state, registers, metadata))
    }

    /// Collect outcome counts over many shots
    ///
    /// Circuits whose measurements are all terminal are executed once
    /// (gates only) and sampled `shots` times. Circuits with
    /// mid-circuit measurement or conditioned measurements run `shots`
    /// independent executions with per-shot derived seeds; counts are
    /// identical for identical seeds regardless of scheduling.
    pub fn run_shots(&self, circuit: &Circuit, shots: u64) -> QevoResult<Counts> {
        let per_shot = circuit.has_mid_circuit_measurement()
            || circuit
                .ops()
                .iter()
                .any(|op| op.is_measurement() && op.condition().is_some());
        if per_shot {
            return self.run_shots_individually(circuit, shots);
        }

        let mut qubits = circuit.measured_qubits();
        if qubits.is_empty() {
            qubits = (0..circuit.num_qubits()).collect();
        }
        let gates_only = strip_measurements(circuit)?;
        let state = if gates_only.is_empty() {
            let kind = if circuit.requires_density() {
                StateKind::Density
            } else {
                StateKind::Vector
            };
            self.check_supported(kind)?;
            self.backend.allocate_state(circuit.num_qubits(), kind)?
        } else {
            self.execute(&gates_only, None)?.into_state()
        };
        sampler::sample(&state, &qubits, shots, self.effective_seed())
    }

    fn run_shots_individually(&self, circuit: &Circuit, shots: u64) -> QevoResult<Counts> {
        let sources = final_bit_sources(circuit);
        let width = sources.len();
        let base = self.effective_seed();

        let keys = (0..shots)
            .into_par_iter()
            .map(|shot| -> QevoResult<String> {
                let mut engine = self.clone();
                engine.seed = Some(base.wrapping_add(shot));
                let result = engine.execute(circuit, None)?;

                let mut index = 0usize;
                for (j, (_, register, bit)) in sources.iter().enumerate() {
                    // a conditioned measurement that never fired reads as 0
                    let value = result.register(register).unwrap_or(0);
                    index |= (((value >> bit) & 1) as usize) << j;
                }
                Ok(Bitstring::from_index(index, width).to_string())
            })
            .collect::<QevoResult<Vec<String>>>()?;

        let mut counts = Counts::new();
        for key in keys {
            *counts.entry(key).or_insert(0) += 1;
        }
        Ok(counts)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn prepare_initial(
        &self,
        state: State,
        num_qubits: usize,
        required: StateKind,
    ) -> QevoResult<State> {
        state.check_shape(num_qubits)?;
        if !state.is_finite() {
            return Err(QevoError::InvalidState(
                "initial state has non-finite entries".to_string(),
            ));
        }
        let drift = (state.normalization() - 1.0).abs();
        if drift > self.tolerances.norm_drift {
            return Err(QevoError::InvalidState(format!(
                "initial state normalization is off by {:.3e}",
                drift
            )));
        }
        let state = if required == StateKind::Density {
            state.promote()?
        } else {
            state
        };
        self.check_supported(state.kind())?;
        Ok(state)
    }

    fn check_supported(&self, kind: StateKind) -> QevoResult<()> {
        if !self.backend.supports(kind) {
            return Err(QevoError::Unsupported {
                backend: self.backend.name().to_string(),
                what: format!("{} states", kind),
            });
        }
        Ok(())
    }

    fn check_cancelled(&self) -> QevoResult<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(QevoError::Cancelled),
            _ => Ok(()),
        }
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    fn effective_seed(&self) -> u64 {
        match self.seed {
            Some(seed) => seed,
            None => ChaCha8Rng::from_entropy().gen(),
        }
    }
}

impl fmt::Debug for EvolutionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvolutionEngine")
            .field("backend", &self.backend.name())
            .field("seed", &self.seed)
            .field("precision", &self.precision)
            .finish()
    }
}

/// Copy of the circuit with every measurement removed
fn strip_measurements(circuit: &Circuit) -> QevoResult<Circuit> {
    let mut gates = Circuit::new(circuit.num_qubits());
    for op in circuit.ops() {
        if !op.is_measurement() {
            gates.push(op.clone())?;
        }
    }
    Ok(gates)
}

/// Last (register, bit) written for each measured qubit, ascending
fn final_bit_sources(circuit: &Circuit) -> Vec<(QubitId, String, usize)> {
    let mut last: BTreeMap<QubitId, (String, usize)> = BTreeMap::new();
    for op in circuit.ops() {
        if let OpKind::Measure { register } = op.kind() {
            for (bit, &q) in op.targets().iter().enumerate() {
                last.insert(q, (register.clone(), bit));
            }
        }
    }
    last.into_iter()
        .map(|(qubit, (register, bit))| (qubit, register, bit))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
