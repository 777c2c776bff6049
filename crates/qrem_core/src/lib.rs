//! # QREM Core
//!
//! Foundation types for calibration-matrix readout error mitigation:
//! the error taxonomy, basis-state labels, and a minimal circuit model.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qrem_core // L0+L1: Foundation + Circuit (완료)
//!     L0_Foundation // 기반 타입/상수/에러 (완료)
//!         CoreTypes // Counts, Probability (완료)
//!         BasisIndexer // 라벨<->인덱스, BitOrder (완료)
//!         Constants // 한계값/캘리브레이션 기본값 (완료)
//!         Errors // QremError (완료)
//!     L1_Circuit // 회로 구조 (완료)
//!         Gate // 게이트 enum (완료)
//!         Circuit // 회로 구조체 (완료)
//!         CircuitBuilder // 빌더 패턴 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qrem_core::prelude::*;
//!
//! let circuit = CircuitBuilder::new(2)
//!     .bell_pair(0, 1)
//!     .measure_all()
//!     .build();
//! assert_eq!(circuit.count_2q(), 1);
//! println!("{}", circuit.to_qasm());
//! ```
//!
//! ## Basis Labels
//!
//! ```rust
//! use qrem_core::prelude::*;
//!
//! let msb = BasisIndexer::new(3, BitOrder::MsbFirst).unwrap();
//! let lsb = BasisIndexer::new(3, BitOrder::LsbFirst).unwrap();
//!
//! // Same basis state (qubits 1 and 2 set), two spellings
//! assert_eq!(msb.label(6).unwrap(), "110");
//! assert_eq!(lsb.label(6).unwrap(), "011");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Basis labels (Gantree: L0_Foundation → BasisIndexer)
pub mod basis;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Quantum gates (Gantree: L1_Circuit → Gate)
pub mod gate;

/// Circuit structure (Gantree: L1_Circuit → Circuit)
pub mod circuit;

/// Circuit builder (Gantree: L1_Circuit → CircuitBuilder)
pub mod builder;

// ============================================================================
// Re-exports
// ============================================================================

pub use basis::{hamming_distance, BasisIndexer, BitOrder};
pub use builder::CircuitBuilder;
pub use circuit::Circuit;
pub use constants::{calibration, limits};
pub use error::{QremError, QremResult};
pub use gate::Gate;
pub use types::{total_counts, Angle, Counts, Probability, QubitId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qrem_core::prelude::*;
    //! ```

    pub use crate::basis::{hamming_distance, BasisIndexer, BitOrder};
    pub use crate::builder::CircuitBuilder;
    pub use crate::circuit::Circuit;
    pub use crate::constants::{calibration, limits};
    pub use crate::error::{QremError, QremResult};
    pub use crate::gate::Gate;
    pub use crate::types::{total_counts, Angle, Counts, Probability, QubitId};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================
