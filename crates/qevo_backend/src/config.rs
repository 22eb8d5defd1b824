//! Backend configuration
//!
//! A `BackendConfig` is built once, handed to `construct_backend`, and
//! shared read-only by every execution that uses the resulting handle.

use qevo_core::{tol, tol_single};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registers at or above this many qubits use the parallel kernels
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 14;

// ============================================================================
// Backend Kind
// ============================================================================

/// Which backend implementation to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// Sequential dense CPU kernels
    Dense,
    /// Dense kernels parallelised with rayon above a size threshold
    Batched,
    /// Defers to a concrete backend, refusing unbound parameters
    Symbolic,
}

impl BackendKind {
    /// Lowercase name used in logs and metadata
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Dense => "dense",
            BackendKind::Batched => "batched",
            BackendKind::Symbolic => "symbolic",
        }
    }

    /// Whether this kind is worth selecting by default on this host
    pub fn is_available(&self) -> bool {
        match self {
            BackendKind::Dense => true,
            BackendKind::Batched => std::thread::available_parallelism()
                .map(|p| p.get() > 1)
                .unwrap_or(false),
            // only ever an explicit choice
            BackendKind::Symbolic => false,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Precision
// ============================================================================

/// Numerical precision profile
///
/// Storage is always `Complex64`; the profile selects the tolerance
/// defaults and is recorded in execution metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// Relaxed tolerances for single-precision-grade workloads
    Single,
    /// Full double-precision tolerances
    Double,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "single"),
            Precision::Double => write!(f, "double"),
        }
    }
}

// ============================================================================
// Tolerances
// ============================================================================

/// Numerical validation thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Largest accepted deviation from U U-dagger = I
    pub unitarity: f64,
    /// Largest accepted deviation from sum K-dagger K = I
    pub kraus: f64,
    /// Largest accepted drift of norm / trace from 1 during evolution
    pub norm_drift: f64,
}

impl Tolerances {
    /// Double-precision defaults
    pub fn double() -> Self {
        Self {
            unitarity: tol::UNITARITY,
            kraus: tol::KRAUS,
            norm_drift: tol::NORM_DRIFT,
        }
    }

    /// Relaxed single-precision defaults
    pub fn single() -> Self {
        Self {
            unitarity: tol_single::UNITARITY,
            kraus: tol_single::KRAUS,
            norm_drift: tol_single::NORM_DRIFT,
        }
    }

    /// Defaults matching a precision profile
    pub fn for_precision(precision: Precision) -> Self {
        match precision {
            Precision::Single => Self::single(),
            Precision::Double => Self::double(),
        }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::double()
    }
}

// ============================================================================
// Backend Config
// ============================================================================

/// Full backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Implementation to construct
    pub kind: BackendKind,
    /// Precision profile
    pub precision: Precision,
    /// Qubit count at which the batched backend goes parallel
    pub parallel_threshold: usize,
    /// Validation thresholds
    pub tolerances: Tolerances,
}

impl BackendConfig {
    /// Default configuration: batched kernels, double precision
    pub fn new() -> Self {
        Self {
            kind: BackendKind::Batched,
            precision: Precision::Double,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            tolerances: Tolerances::double(),
        }
    }

    /// Sequential dense configuration
    pub fn dense() -> Self {
        Self::new().with_kind(BackendKind::Dense)
    }

    /// Select a backend kind
    pub fn with_kind(mut self, kind: BackendKind) -> Self {
        self.kind = kind;
        self
    }

    /// Select a precision profile; tolerances follow the profile
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self.tolerances = Tolerances::for_precision(precision);
        self
    }

    /// Override the parallel threshold (in qubits)
    pub fn with_parallel_threshold(mut self, qubits: usize) -> Self {
        self.parallel_threshold = qubits;
        self
    }

    /// Override individual tolerances
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
