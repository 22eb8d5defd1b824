//! Numeric constants for QEVO
//!
//! Default tolerances for the validation checks scattered through the
//! workspace. Every check that uses one of these also accepts an explicit
//! override, so nothing is pinned to a single global value.

/// Default numerical tolerances (double precision)
pub mod tol {
    /// Unitarity check: max |(U†U − I)_ij| allowed for a user-supplied matrix
    pub const UNITARITY: f64 = 1e-8;

    /// Kraus completeness check: max |(Σ K†K − I)_ij| allowed at construction
    pub const KRAUS: f64 = 1e-8;

    /// Norm/trace drift allowed during evolution before aborting a run
    pub const NORM_DRIFT: f64 = 1e-6;

    /// Cross-backend agreement expected of all backend variants
    pub const BACKEND_AGREEMENT: f64 = 1e-6;
}

/// Widened tolerances for single-precision configurations
pub mod tol_single {
    /// Unitarity check tolerance at single precision
    pub const UNITARITY: f64 = 1e-4;

    /// Kraus completeness tolerance at single precision
    pub const KRAUS: f64 = 1e-4;

    /// Norm drift tolerance at single precision
    pub const NORM_DRIFT: f64 = 1e-3;
}

// ============================================================================
// Tests
// ============================================================================
