//! Core types for QREM
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Type aliases and validated wrapper types shared by every crate.

use crate::error::{QremError, QremResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Rotation angle in radians
pub type Angle = f64;

/// Outcome frequency table: basis label -> count
/// Gantree: Counts // pub type Counts = HashMap<String, u64>
pub type Counts = HashMap<String, u64>;

/// Sum of all counts in a frequency table
pub fn total_counts(counts: &Counts) -> u64 {
    counts.values().sum()
}

// ============================================================================
// Probability (Validated Wrapper)
// ============================================================================

/// Probability value in range [0, 1]
/// Gantree: Probability // 범위 검증 구조체
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probability(f64);

impl Probability {
    /// Create a new Probability with validation
    pub fn new(value: f64) -> QremResult<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(QremError::InvalidProbability(value));
        }
        Ok(Self(value))
    }

    /// Get the probability value
    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Get the complement (1 - p)
    #[inline]
    pub fn complement(&self) -> f64 {
        1.0 - self.0
    }

    /// Zero probability
    pub const ZERO: Self = Self(0.0);

    /// Certainty (p = 1)
    pub const ONE: Self = Self(1.0);
}

impl Default for Probability {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

impl TryFrom<f64> for Probability {
    type Error = QremError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

// ============================================================================
// Tests
// ============================================================================
