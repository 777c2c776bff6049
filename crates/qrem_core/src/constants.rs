//! Constants for QREM
//!
//! Gantree: L0_Foundation → Constants
//!
//! Size limits and calibration defaults.

// ============================================================================
// Limits
// Gantree: limits // 크기 제한
// ============================================================================

pub mod limits {
    //! Hard size limits

    /// Widest label a [`BasisIndexer`](crate::BasisIndexer) accepts
    pub const MAX_LABEL_QUBITS: usize = 32;

    /// Largest register the full calibration matrix is built for (4096 x 4096)
    pub const MAX_CALIBRATION_QUBITS: usize = 12;

    /// Largest register the reference simulator holds as a state vector
    pub const MAX_SIMULATOR_QUBITS: usize = 20;

    /// Default per-execution shot ceiling for backends
    pub const DEFAULT_MAX_SHOTS: u64 = 100_000;
}

// ============================================================================
// Calibration Defaults
// Gantree: calibration // 캘리브레이션 기본값
// ============================================================================

pub mod calibration {
    //! Defaults for calibration and correction

    /// Shots per calibration circuit
    pub const DEFAULT_SHOTS: u64 = 8192;

    /// Smallest pivot magnitude accepted during inversion
    pub const DEFAULT_SINGULAR_TOLERANCE: f64 = 1e-10;

    /// Largest 1-norm condition number accepted during inversion
    pub const DEFAULT_MAX_CONDITION: f64 = 1e8;

    /// Condition number above which a warning is logged
    pub const WARN_CONDITION: f64 = 1e3;

    /// Retries per calibration circuit after the first attempt
    pub const DEFAULT_MAX_RETRIES: usize = 2;

    /// Calibration cache time-to-live (seconds)
    pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

    /// Projected-gradient iterations for the least-squares solver
    pub const LSQ_MAX_ITERATIONS: usize = 5000;

    /// Relative step size below which the least-squares solver stops
    pub const LSQ_TOLERANCE: f64 = 1e-12;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_consistent() {
        assert!(limits::MAX_CALIBRATION_QUBITS <= limits::MAX_SIMULATOR_QUBITS);
        assert!(limits::MAX_SIMULATOR_QUBITS <= limits::MAX_LABEL_QUBITS);
        assert!(calibration::DEFAULT_SHOTS <= limits::DEFAULT_MAX_SHOTS);
    }

    #[test]
    fn test_tolerances_ordered() {
        assert!(calibration::DEFAULT_SINGULAR_TOLERANCE < 1e-6);
        assert!(calibration::WARN_CONDITION < calibration::DEFAULT_MAX_CONDITION);
    }
}
