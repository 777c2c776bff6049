//! Circuit builder for QREM
//!
//! Gantree: L1_Circuit → CircuitBuilder
//!
//! Fluent builder for circuits, including the basis-state preparation
//! circuits used for readout calibration.

use crate::circuit::Circuit;
use crate::error::{QremError, QremResult};
use crate::gate::Gate;
use crate::types::{Angle, QubitId};

/// Fluent circuit builder (consuming self pattern)
/// Gantree: CircuitBuilder // 빌더 패턴
///
/// Invalid gates are not added; the first failure is kept and reported by
/// [`build_validated`](CircuitBuilder::build_validated).
pub struct CircuitBuilder {
    circuit: Circuit,
    error: Option<QremError>,
}

impl CircuitBuilder {
    /// Create a new circuit builder
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: Circuit::new(num_qubits),
            error: None,
        }
    }

    /// Create with circuit name
    pub fn with_name(num_qubits: usize, name: impl Into<String>) -> Self {
        Self {
            circuit: Circuit::with_name(num_qubits, name),
            error: None,
        }
    }

    fn push(mut self, gate: Gate) -> Self {
        if let Err(err) = self.circuit.add_gate(gate) {
            self.error.get_or_insert(err);
        }
        self
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    /// Add Hadamard gate
    pub fn h(self, qubit: QubitId) -> Self {
        self.push(Gate::H(qubit))
    }

    /// Add Pauli-X gate
    pub fn x(self, qubit: QubitId) -> Self {
        self.push(Gate::X(qubit))
    }

    /// Add Pauli-Y gate
    pub fn y(self, qubit: QubitId) -> Self {
        self.push(Gate::Y(qubit))
    }

    /// Add Pauli-Z gate
    pub fn z(self, qubit: QubitId) -> Self {
        self.push(Gate::Z(qubit))
    }

    /// Add S gate
    pub fn s(self, qubit: QubitId) -> Self {
        self.push(Gate::S(qubit))
    }

    /// Add S-dagger gate
    pub fn sdg(self, qubit: QubitId) -> Self {
        self.push(Gate::Sdg(qubit))
    }

    /// Add Rx rotation
    pub fn rx(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Gate::Rx(qubit, angle))
    }

    /// Add Ry rotation
    pub fn ry(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Gate::Ry(qubit, angle))
    }

    /// Add Rz rotation
    pub fn rz(self, qubit: QubitId, angle: Angle) -> Self {
        self.push(Gate::Rz(qubit, angle))
    }

    // ========================================================================
    // Two-Qubit Gates
    // ========================================================================

    /// Add CNOT gate
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.push(Gate::Cnot(control, target))
    }

    /// Alias for CNOT
    pub fn cx(self, control: QubitId, target: QubitId) -> Self {
        self.cnot(control, target)
    }

    /// Add CZ gate
    pub fn cz(self, control: QubitId, target: QubitId) -> Self {
        self.push(Gate::Cz(control, target))
    }

    /// Add SWAP gate
    pub fn swap(self, qubit1: QubitId, qubit2: QubitId) -> Self {
        self.push(Gate::Swap(qubit1, qubit2))
    }

    // ========================================================================
    // Measurement and Control
    // ========================================================================

    /// Measure a single qubit
    pub fn measure(self, qubit: QubitId) -> Self {
        self.push(Gate::Measure(qubit))
    }

    /// Measure all qubits
    pub fn measure_all(self) -> Self {
        self.push(Gate::MeasureAll)
    }

    /// Barrier on all qubits
    pub fn barrier(self) -> Self {
        self.push(Gate::Barrier(Vec::new()))
    }

    // ========================================================================
    // Composite Patterns
    // ========================================================================

    /// Prepare computational basis state `index` (X on every set bit)
    /// Gantree: prepare_basis_state(index) -> Self // 기저 상태 준비
    ///
    /// Bit `q` of `index` is the state of qubit `q`, independent of how
    /// labels are later formatted.
    pub fn prepare_basis_state(mut self, index: usize) -> Self {
        let n = self.circuit.num_qubits();
        if n < usize::BITS as usize && index >> n != 0 {
            self.error.get_or_insert(QremError::QubitOutOfRange {
                qubit: (usize::BITS - index.leading_zeros()) as usize - 1,
                max: n.saturating_sub(1),
            });
            return self;
        }
        let width = n.min(usize::BITS as usize);
        for q in (0..width).filter(|&q| (index >> q) & 1 == 1) {
            self = self.x(q);
        }
        self
    }

    /// Bell pair on (a, b): H(a), CX(a, b)
    pub fn bell_pair(self, a: QubitId, b: QubitId) -> Self {
        self.h(a).cnot(a, b)
    }

    /// GHZ state over all qubits: H(0) followed by a CX chain
    pub fn ghz(mut self) -> Self {
        let n = self.circuit.num_qubits();
        if n == 0 {
            return self;
        }
        self = self.h(0);
        for q in 0..n - 1 {
            self = self.cnot(q, q + 1);
        }
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build and return the circuit (invalid gates were dropped)
    pub fn build(self) -> Circuit {
        self.circuit
    }

    /// Build, failing on the first invalid gate or an empty circuit
    pub fn build_validated(self) -> QremResult<Circuit> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.circuit.is_empty() {
            return Err(QremError::InvalidConfig("circuit is empty".to_string()));
        }
        Ok(self.circuit)
    }

    /// Get reference to current circuit state
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }
}

// ============================================================================
// Tests
// ============================================================================
