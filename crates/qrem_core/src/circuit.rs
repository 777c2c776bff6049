//! Quantum circuit structure for QREM
//!
//! Gantree: L1_Circuit → Circuit
//!
//! An ordered gate list over a fixed qubit register. This is the opaque
//! "circuit description" handed to a [`Backend`](../../qrem_backend) together
//! with a shot count.

use crate::error::{QremError, QremResult};
use crate::gate::Gate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantum circuit
/// Gantree: Circuit // 회로 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Number of qubits
    num_qubits: usize,

    /// Gate sequence
    gates: Vec<Gate>,

    /// Optional circuit name
    name: Option<String>,
}

impl Circuit {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a new empty circuit
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
            name: None,
        }
    }

    /// Create a circuit with a name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
            name: Some(name.into()),
        }
    }

    /// Create from a vector of gates
    pub fn from_gates(num_qubits: usize, gates: Vec<Gate>) -> QremResult<Self> {
        let mut circuit = Self::new(num_qubits);
        circuit.add_gates(gates)?;
        Ok(circuit)
    }

    // ========================================================================
    // Basic Operations
    // ========================================================================

    /// Add a gate to the circuit
    /// Gantree: add_gate(&mut, Gate) -> Result // 게이트 추가
    pub fn add_gate(&mut self, gate: Gate) -> QremResult<()> {
        for &qubit in &gate.qubits() {
            if qubit >= self.num_qubits {
                return Err(QremError::GateQubitMismatch {
                    qubit,
                    num_qubits: self.num_qubits,
                });
            }
        }
        self.gates.push(gate);
        Ok(())
    }

    /// Add multiple gates
    pub fn add_gates(&mut self, gates: impl IntoIterator<Item = Gate>) -> QremResult<()> {
        for gate in gates {
            self.add_gate(gate)?;
        }
        Ok(())
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get gates
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Get circuit name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set circuit name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Check if circuit is empty
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    // ========================================================================
    // Circuit Analysis
    // ========================================================================

    /// Calculate circuit depth (longest path)
    /// Gantree: depth(&self) -> usize // 깊이 계산
    pub fn depth(&self) -> usize {
        let mut qubit_depths = vec![0usize; self.num_qubits];

        for gate in &self.gates {
            let qubits = gate.qubits();
            if qubits.is_empty() {
                // MeasureAll or global barrier
                let max_depth = qubit_depths.iter().copied().max().unwrap_or(0);
                qubit_depths.iter_mut().for_each(|d| *d = max_depth + 1);
            } else {
                let max_depth = qubits
                    .iter()
                    .filter_map(|&q| qubit_depths.get(q))
                    .copied()
                    .max()
                    .unwrap_or(0);
                for &q in &qubits {
                    qubit_depths[q] = max_depth + 1;
                }
            }
        }

        qubit_depths.into_iter().max().unwrap_or(0)
    }

    /// Get total gate count
    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    /// Count single-qubit gates
    pub fn count_1q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_single_qubit()).count()
    }

    /// Count two-qubit gates
    pub fn count_2q(&self) -> usize {
        self.gates.iter().filter(|g| g.is_two_qubit()).count()
    }

    /// Check if the circuit measures anything
    pub fn has_measurement(&self) -> bool {
        self.gates.iter().any(|g| g.is_measurement())
    }

    // ========================================================================
    // QASM Conversion
    // ========================================================================

    /// Convert to OpenQASM 2.0 string
    /// Gantree: to_qasm(&self) -> String // QASM2 출력
    pub fn to_qasm(&self) -> String {
        let mut lines = vec![
            "OPENQASM 2.0;".to_string(),
            "include \"qelib1.inc\";".to_string(),
            String::new(),
            format!("qreg q[{}];", self.num_qubits),
            format!("creg c[{}];", self.num_qubits),
            String::new(),
        ];
        lines.extend(self.gates.iter().map(Gate::to_qasm));
        lines.join("\n")
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Circuit({}, qubits={}, gates={}, depth={})",
            self.name.as_deref().unwrap_or("unnamed"),
            self.num_qubits,
            self.gate_count(),
            self.depth()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_gate_validates_qubits() {
        let mut circuit = Circuit::new(2);
        assert!(circuit.add_gate(Gate::X(1)).is_ok());
        let err = circuit.add_gate(Gate::Cnot(0, 2)).unwrap_err();
        assert_eq!(
            err,
            QremError::GateQubitMismatch {
                qubit: 2,
                num_qubits: 2,
            }
        );
        assert_eq!(circuit.gate_count(), 1);
    }

    #[test]
    fn test_depth() {
        let gates = vec![Gate::H(0), Gate::Cnot(0, 1), Gate::X(2), Gate::MeasureAll];
        let circuit = Circuit::from_gates(3, gates).unwrap();
        // H, CX on {0,1}; X on 2 in parallel; measure on top
        assert_eq!(circuit.depth(), 3);
        assert_eq!(Circuit::new(3).depth(), 0);
    }

    #[test]
    fn test_counts() {
        let gates = vec![
            Gate::H(0),
            Gate::Cnot(0, 1),
            Gate::Rz(1, 0.3),
            Gate::MeasureAll,
        ];
        let circuit = Circuit::from_gates(2, gates).unwrap();
        assert_eq!(circuit.count_1q(), 2);
        assert_eq!(circuit.count_2q(), 1);
        assert!(circuit.has_measurement());
    }

    #[test]
    fn test_qasm_output() {
        let mut circuit = Circuit::with_name(2, "bell");
        circuit
            .add_gates(vec![Gate::H(0), Gate::Cnot(0, 1), Gate::MeasureAll])
            .unwrap();
        let qasm = circuit.to_qasm();
        assert!(qasm.starts_with("OPENQASM 2.0;"));
        assert!(qasm.contains("qreg q[2];"));
        assert!(qasm.contains("cx q[0],q[1];"));
        assert!(circuit.to_string().contains("bell"));
    }
}
