//! Error types for QREM
//!
//! Gantree: L0_Foundation → Errors
//!
//! Every variant that can be traced back to a basis state carries the label,
//! since bit-order mix-ups are the most common defect in readout mitigation.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QREM
/// Gantree: QremError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QremError {
    // ========================================================================
    // Mitigation Errors
    // ========================================================================
    /// Calibration matrix is not invertible within tolerance
    /// Gantree: SingularCalibration{{label,pivot,cond}} // 특이 행렬
    #[error(
        "Singular calibration matrix at basis state '{label}' \
         (pivot {pivot:.3e}, condition number {condition:.3e})"
    )]
    SingularCalibration {
        label: String,
        pivot: f64,
        condition: f64,
    },

    /// Measured label inconsistent with the declared qubit count
    /// Gantree: OutOfRangeLabel{{label,n}} // 라벨 범위
    #[error("Basis label '{label}' is not a valid {num_qubits}-qubit outcome ({context})")]
    OutOfRangeLabel {
        label: String,
        num_qubits: usize,
        context: String,
    },

    /// Non-positive or oversized shot count
    /// Gantree: InvalidShotCount{{shots,max}} // 샷 수
    #[error("Invalid shot count {shots}: must be in range [1, {max}]")]
    InvalidShotCount { shots: u64, max: u64 },

    /// Backend call failed or missed its deadline
    /// Gantree: BackendUnavailable{{backend,label}} // 백엔드 불가
    #[error("Backend '{backend}' unavailable while preparing '{label}': {reason}")]
    BackendUnavailable {
        backend: String,
        label: String,
        reason: String,
    },

    /// Frequency table does not add up to the requested shots
    #[error("Counts for prepared state '{label}' sum to {actual}, expected {expected}")]
    InconsistentCounts {
        label: String,
        expected: u64,
        actual: u64,
    },

    /// Vector or matrix has the wrong dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// Probability value out of range [0, 1]
    #[error("Invalid probability {0}: must be in range [0, 1]")]
    InvalidProbability(f64),

    /// Qubit index out of range
    #[error("Qubit {qubit} out of range: max is {max}")]
    QubitOutOfRange { qubit: usize, max: usize },

    /// Gate on non-existent qubit
    #[error("Gate references qubit {qubit} but circuit has only {num_qubits} qubits")]
    GateQubitMismatch { qubit: usize, num_qubits: usize },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// Backend execution error
    #[error("Backend error: {0}")]
    BackendError(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),
}

/// Result type alias for QREM operations
/// Gantree: QremResult<T> // type alias
pub type QremResult<T> = Result<T, QremError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QremError {
    fn from(err: serde_json::Error) -> Self {
        QremError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for QremError {
    fn from(err: std::io::Error) -> Self {
        QremError::FileError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QremError {
    /// Check if retrying the same operation can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            QremError::BackendUnavailable { .. } | QremError::BackendError(_)
        )
    }

    /// Check if error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            QremError::OutOfRangeLabel { .. }
                | QremError::InvalidShotCount { .. }
                | QremError::InvalidProbability(_)
                | QremError::QubitOutOfRange { .. }
                | QremError::GateQubitMismatch { .. }
                | QremError::DimensionMismatch { .. }
                | QremError::InvalidConfig(_)
        )
    }

    /// Basis label associated with this error, if any
    pub fn label(&self) -> Option<&str> {
        match self {
            QremError::SingularCalibration { label, .. }
            | QremError::OutOfRangeLabel { label, .. }
            | QremError::BackendUnavailable { label, .. }
            | QremError::InconsistentCounts { label, .. } => Some(label.as_str()),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_display_names_label() {
        let err = QremError::SingularCalibration {
            label: "101".into(),
            pivot: 0.0,
            condition: f64::INFINITY,
        };
        assert!(err.to_string().contains("'101'"));
        assert_eq!(err.label(), Some("101"));
    }

    #[test]
    fn test_out_of_range_label() {
        let err = QremError::OutOfRangeLabel {
            label: "1000".into(),
            num_qubits: 3,
            context: "wrong width".into(),
        };
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("3-qubit"));
    }

    #[test]
    fn test_invalid_shot_count() {
        let err = QremError::InvalidShotCount {
            shots: 0,
            max: 100_000,
        };
        assert!(err.to_string().contains('0'));
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_is_recoverable() {
        let err = QremError::BackendUnavailable {
            backend: "sim".into(),
            label: "00".into(),
            reason: "timeout".into(),
        };
        assert!(err.is_recoverable());
        assert!(!QremError::InvalidProbability(1.5).is_recoverable());
    }

    #[test]
    fn test_json_conversion() {
        let json_err = serde_json::from_str::<Vec<f64>>("not json").unwrap_err();
        let err: QremError = json_err.into();
        assert!(matches!(err, QremError::JsonError(_)));
    }
}
