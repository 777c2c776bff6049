//! # QREM Noise
//!
//! Readout (assignment) error models used by simulated backends.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qrem_noise // L2: Noise Model (완료)
//!     ReadoutError // 큐비트별 p01/p10 (완료)
//!     ReadoutNoise // 레지스터 노이즈 (완료)
//!         ideal(), symmetric(), asymmetric(), ibm_typical()
//!         with_qubit(), transition_probability()
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qrem_noise::prelude::*;
//!
//! // 5% independent bit flips on every qubit
//! let noise = ReadoutNoise::symmetric(0.05).unwrap();
//!
//! // Exact probability of reading "100" after preparing "101" (one flip)
//! let p = noise.transition_probability(0b101, 0b100, 3);
//! assert!((p - 0.05 * 0.95 * 0.95).abs() < 1e-12);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Readout noise model (Gantree: L2_Noise → ReadoutNoise)
pub mod readout_noise;

// ============================================================================
// Re-exports
// ============================================================================

pub use readout_noise::{ReadoutError, ReadoutNoise};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qrem_noise::prelude::*;
    //! ```

    pub use crate::readout_noise::{ReadoutError, ReadoutNoise};
}

// ============================================================================
// Integration Tests
// ============================================================================
