//! # QREM Backend
//!
//! Backend abstraction and a reference simulator with readout noise.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qrem_backend // L3: Backend (완료)
//!     BackendTrait // 백엔드 인터페이스 (완료)
//!         execute(circuit, shots), execute_batch, bit_order, max_shots
//!     ExecutionResult // 실행 결과 (완료)
//!     SimulatorBackend // 상태벡터 + 측정 노이즈 (완료)
//!         ideal(), with_bit_flip(), ibm_typical()
//!         with_seed(), with_bit_order(), with_latency(), with_max_shots()
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qrem_backend::prelude::*;
//! use qrem_core::CircuitBuilder;
//!
//! // Create ideal simulator
//! let backend = SimulatorBackend::ideal(3).with_seed(42);
//!
//! // Prepare |101> and read it back
//! let circuit = CircuitBuilder::new(3).prepare_basis_state(5).measure_all().build();
//! let result = backend.execute(&circuit, 1000).unwrap();
//! assert_eq!(result.counts["101"], 1000);
//! ```
//!
//! ## Noisy Readout
//!
//! ```rust
//! use qrem_backend::prelude::*;
//! use qrem_core::CircuitBuilder;
//!
//! // 5% symmetric bit flips at readout
//! let backend = SimulatorBackend::with_bit_flip(2, 0.05)
//!     .unwrap()
//!     .with_seed(42);
//!
//! let circuit = CircuitBuilder::new(2).bell_pair(0, 1).measure_all().build();
//! let result = backend.execute(&circuit, 1000).unwrap();
//! println!("P(01) + P(10) = {:.4}", result.probability("01") + result.probability("10"));
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Execution types and backend trait (Gantree: L3_Backend)
pub mod execution;

/// Simulator backend (Gantree: L3_Backend → SimulatorBackend)
pub mod simulator;

// ============================================================================
// Re-exports
// ============================================================================

pub use execution::{Backend, ExecutionMetadata, ExecutionResult};
pub use simulator::SimulatorBackend;

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qrem_backend::prelude::*;
    //! ```

    pub use crate::execution::{Backend, ExecutionMetadata, ExecutionResult};
    pub use crate::simulator::SimulatorBackend;
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_abs_diff_eq;
    use qrem_core::{BasisIndexer, BitOrder, CircuitBuilder};
    use qrem_noise::{ReadoutError, ReadoutNoise};

    #[test]
    fn test_ghz_state_ideal() {
        let backend = SimulatorBackend::ideal(4).with_seed(42);
        let circuit = CircuitBuilder::new(4).ghz().measure_all().build();

        let result = backend.execute(&circuit, 2000).unwrap();
        assert_eq!(result.counts.len(), 2);
        assert_abs_diff_eq!(result.probability("0000"), 0.5, epsilon = 0.05);
        assert_abs_diff_eq!(result.probability("1111"), 0.5, epsilon = 0.05);
    }

    #[test]
    fn test_every_basis_state_round_trips_ideal() {
        for order in [BitOrder::MsbFirst, BitOrder::LsbFirst] {
            let backend = SimulatorBackend::ideal(3)
                .with_seed(1)
                .with_bit_order(order);
            let indexer = BasisIndexer::new(3, order).unwrap();

            for i in 0..8 {
                let circuit = CircuitBuilder::new(3)
                    .prepare_basis_state(i)
                    .measure_all()
                    .build();
                let result = backend.execute(&circuit, 64).unwrap();
                let label = indexer.label(i).unwrap();
                assert_eq!(result.counts.get(&label), Some(&64), "{} {}", order, label);
            }
        }
    }

    #[test]
    fn test_noisy_readout_matches_transition_model() {
        let noise = ReadoutNoise::asymmetric(0.02, 0.08).unwrap();
        let backend = SimulatorBackend::new(2, noise.clone()).with_seed(5);
        let circuit = CircuitBuilder::new(2)
            .prepare_basis_state(0b11)
            .measure_all()
            .build();

        let result = backend.execute(&circuit, 50_000).unwrap();
        for (measured, label) in ["00", "01", "10", "11"].iter().enumerate() {
            let expected = noise.transition_probability(0b11, measured, 2);
            assert_abs_diff_eq!(result.probability(label), expected, epsilon = 0.01);
        }
    }

    #[test]
    fn test_stuck_qubit() {
        let noise = ReadoutNoise::ideal()
            .with_qubit(1, ReadoutError::new(0.0, 1.0).unwrap())
            .unwrap();
        let backend = SimulatorBackend::new(2, noise).with_seed(9);

        let circuit = CircuitBuilder::new(2)
            .prepare_basis_state(0b10)
            .measure_all()
            .build();
        let result = backend.execute(&circuit, 100).unwrap();
        assert_eq!(result.counts["00"], 100);
    }

    #[test]
    fn test_execute_batch() {
        let backend = SimulatorBackend::ideal(2).with_seed(42);
        let circuits: Vec<_> = (0..4)
            .map(|i| CircuitBuilder::new(2).prepare_basis_state(i).build())
            .collect();

        let results = backend.execute_batch(&circuits, 10).unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.is_consistent()));
        assert_eq!(results[2].counts["10"], 10);
    }

    #[test]
    fn test_backend_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SimulatorBackend>();

        let backend: Box<dyn Backend> = Box::new(SimulatorBackend::ideal(1).with_name("boxed"));
        assert_eq!(backend.name(), "boxed");
        assert!(backend.is_simulator());
    }
}
