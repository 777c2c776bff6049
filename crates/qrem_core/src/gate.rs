//! Quantum gate definitions for QREM
//!
//! Gantree: L1_Circuit → Gate
//!
//! A deliberately small gate set: enough to prepare calibration states and
//! the Bell/GHZ walkthrough circuits. Transpilation to native gates is left
//! to the backend.

use crate::types::{Angle, QubitId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantum gate enumeration
/// Gantree: Gate // 게이트 enum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================
    /// Hadamard gate
    H(QubitId),
    /// Pauli-X gate (NOT)
    X(QubitId),
    /// Pauli-Y gate
    Y(QubitId),
    /// Pauli-Z gate
    Z(QubitId),
    /// S gate (sqrt(Z))
    S(QubitId),
    /// S-dagger gate
    Sdg(QubitId),
    /// Rotation around X-axis
    Rx(QubitId, Angle),
    /// Rotation around Y-axis
    Ry(QubitId, Angle),
    /// Rotation around Z-axis
    Rz(QubitId, Angle),

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================
    /// Controlled-NOT (control, target)
    Cnot(QubitId, QubitId),
    /// Controlled-Z
    Cz(QubitId, QubitId),
    /// SWAP gate
    Swap(QubitId, QubitId),

    // ========================================================================
    // Measurement and Control
    // ========================================================================
    /// Single qubit measurement
    Measure(QubitId),
    /// Measure all qubits
    MeasureAll,
    /// Barrier (empty = all qubits)
    Barrier(Vec<QubitId>),
}

impl Gate {
    /// Get qubits involved in this gate
    /// Gantree: qubits(&self) -> Vec<QubitId> // 관련 큐비트
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::H(q)
            | Gate::X(q)
            | Gate::Y(q)
            | Gate::Z(q)
            | Gate::S(q)
            | Gate::Sdg(q)
            | Gate::Rx(q, _)
            | Gate::Ry(q, _)
            | Gate::Rz(q, _)
            | Gate::Measure(q) => vec![*q],

            Gate::Cnot(a, b) | Gate::Cz(a, b) | Gate::Swap(a, b) => vec![*a, *b],

            Gate::MeasureAll => vec![],
            Gate::Barrier(qs) => qs.clone(),
        }
    }

    /// Check if gate is a single-qubit unitary
    pub fn is_single_qubit(&self) -> bool {
        matches!(
            self,
            Gate::H(_)
                | Gate::X(_)
                | Gate::Y(_)
                | Gate::Z(_)
                | Gate::S(_)
                | Gate::Sdg(_)
                | Gate::Rx(_, _)
                | Gate::Ry(_, _)
                | Gate::Rz(_, _)
        )
    }

    /// Check if gate is a two-qubit unitary
    pub fn is_two_qubit(&self) -> bool {
        matches!(self, Gate::Cnot(_, _) | Gate::Cz(_, _) | Gate::Swap(_, _))
    }

    /// Check if gate is a measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self, Gate::Measure(_) | Gate::MeasureAll)
    }

    /// Get gate name
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::X(_) => "x",
            Gate::Y(_) => "y",
            Gate::Z(_) => "z",
            Gate::S(_) => "s",
            Gate::Sdg(_) => "sdg",
            Gate::Rx(_, _) => "rx",
            Gate::Ry(_, _) => "ry",
            Gate::Rz(_, _) => "rz",
            Gate::Cnot(_, _) => "cx",
            Gate::Cz(_, _) => "cz",
            Gate::Swap(_, _) => "swap",
            Gate::Measure(_) | Gate::MeasureAll => "measure",
            Gate::Barrier(_) => "barrier",
        }
    }

    /// Convert to an OpenQASM 2.0 statement
    /// Gantree: to_qasm(&self) -> String // QASM 변환
    pub fn to_qasm(&self) -> String {
        match self {
            Gate::Rx(q, a) | Gate::Ry(q, a) | Gate::Rz(q, a) => {
                format!("{}({}) q[{}];", self.name(), a, q)
            }
            Gate::Cnot(a, b) | Gate::Cz(a, b) | Gate::Swap(a, b) => {
                format!("{} q[{}],q[{}];", self.name(), a, b)
            }
            Gate::Measure(q) => format!("measure q[{}] -> c[{}];", q, q),
            Gate::MeasureAll => "measure q -> c;".to_string(),
            Gate::Barrier(qs) if qs.is_empty() => "barrier q;".to_string(),
            Gate::Barrier(qs) => {
                let args: Vec<String> = qs.iter().map(|q| format!("q[{}]", q)).collect();
                format!("barrier {};", args.join(","))
            }
            Gate::H(q) | Gate::X(q) | Gate::Y(q) | Gate::Z(q) | Gate::S(q) | Gate::Sdg(q) => {
                format!("{} q[{}];", self.name(), q)
            }
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_qasm())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_qubits() {
        assert_eq!(Gate::X(2).qubits(), vec![2]);
        assert_eq!(Gate::Cnot(0, 1).qubits(), vec![0, 1]);
        assert!(Gate::MeasureAll.qubits().is_empty());
    }

    #[test]
    fn test_gate_classification() {
        assert!(Gate::H(0).is_single_qubit());
        assert!(!Gate::H(0).is_two_qubit());
        assert!(Gate::Cz(0, 1).is_two_qubit());
        assert!(Gate::Measure(0).is_measurement());
        assert!(Gate::MeasureAll.is_measurement());
        assert!(!Gate::Barrier(vec![]).is_single_qubit());
    }

    #[test]
    fn test_gate_qasm() {
        assert_eq!(Gate::X(1).to_qasm(), "x q[1];");
        assert_eq!(Gate::Cnot(0, 2).to_qasm(), "cx q[0],q[2];");
        assert_eq!(Gate::Rz(0, 0.5).to_qasm(), "rz(0.5) q[0];");
        assert_eq!(Gate::Measure(3).to_qasm(), "measure q[3] -> c[3];");
        assert_eq!(Gate::Barrier(vec![0, 1]).to_qasm(), "barrier q[0],q[1];");
    }
}
