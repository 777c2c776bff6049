//! Readout noise model for QREM
//!
//! Gantree: L2_Noise → ReadoutNoise
//!
//! Classical assignment errors applied after an ideal measurement. Each qubit
//! flips independently: `0 -> 1` with `p01`, `1 -> 0` with `p10`.

use qrem_core::error::{QremError, QremResult};
use qrem_core::QubitId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Assignment error of a single qubit
/// Gantree: ReadoutError // 큐비트별 측정 에러
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ReadoutError {
    /// P(read 1 | true 0)
    pub p01: f64,
    /// P(read 0 | true 1)
    pub p10: f64,
}

impl ReadoutError {
    /// Create with validation
    pub fn new(p01: f64, p10: f64) -> QremResult<Self> {
        let err = Self { p01, p10 };
        err.validate()?;
        Ok(err)
    }

    /// Same flip probability in both directions
    pub fn symmetric(p: f64) -> QremResult<Self> {
        Self::new(p, p)
    }

    /// No assignment error
    pub const IDEAL: Self = Self { p01: 0.0, p10: 0.0 };

    /// Validate both probabilities lie in [0, 1]
    pub fn validate(&self) -> QremResult<()> {
        for p in [self.p01, self.p10] {
            if !(0.0..=1.0).contains(&p) {
                return Err(QremError::InvalidProbability(p));
            }
        }
        Ok(())
    }

    /// Probability of flipping a qubit whose true value is `bit`
    #[inline]
    pub fn flip_probability(&self, bit: bool) -> f64 {
        if bit {
            self.p10
        } else {
            self.p01
        }
    }

    /// Probability of reading `measured` when the true value is `prepared`
    #[inline]
    pub fn transition(&self, prepared: bool, measured: bool) -> f64 {
        let flip = self.flip_probability(prepared);
        if prepared == measured {
            1.0 - flip
        } else {
            flip
        }
    }

    /// Mean probability of reading the true value
    pub fn assignment_fidelity(&self) -> f64 {
        1.0 - 0.5 * (self.p01 + self.p10)
    }

    /// True when both flip probabilities are zero
    pub fn is_ideal(&self) -> bool {
        self.p01 == 0.0 && self.p10 == 0.0
    }
}

/// Readout noise over a qubit register
/// Gantree: ReadoutNoise // 측정 노이즈 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReadoutNoise {
    /// Error applied to qubits without an override
    default: ReadoutError,

    /// Per-qubit overrides
    per_qubit: BTreeMap<QubitId, ReadoutError>,
}

impl ReadoutNoise {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Noiseless readout
    pub fn ideal() -> Self {
        Self::default()
    }

    /// Independent symmetric bit flips with probability `p` on every qubit
    pub fn symmetric(p: f64) -> QremResult<Self> {
        Ok(Self {
            default: ReadoutError::symmetric(p)?,
            per_qubit: BTreeMap::new(),
        })
    }

    /// Independent asymmetric bit flips on every qubit
    pub fn asymmetric(p01: f64, p10: f64) -> QremResult<Self> {
        Ok(Self {
            default: ReadoutError::new(p01, p10)?,
            per_qubit: BTreeMap::new(),
        })
    }

    /// Typical superconducting readout: 1 -> 0 relaxation dominates
    pub fn ibm_typical() -> Self {
        Self {
            default: ReadoutError {
                p01: 0.01,
                p10: 0.03,
            },
            per_qubit: BTreeMap::new(),
        }
    }

    /// Override the error of one qubit
    /// Gantree: with_qubit(q, err) -> Self // 큐비트별 설정
    pub fn with_qubit(mut self, qubit: QubitId, error: ReadoutError) -> QremResult<Self> {
        error.validate()?;
        self.per_qubit.insert(qubit, error);
        Ok(self)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Error applied to `qubit`
    pub fn error_for(&self, qubit: QubitId) -> ReadoutError {
        self.per_qubit.get(&qubit).copied().unwrap_or(self.default)
    }

    /// Default (non-overridden) error
    pub fn default_error(&self) -> ReadoutError {
        self.default
    }

    /// True when no qubit has any assignment error
    pub fn is_ideal(&self) -> bool {
        self.default.is_ideal() && self.per_qubit.values().all(ReadoutError::is_ideal)
    }

    /// Validate all contained probabilities
    pub fn validate(&self) -> QremResult<()> {
        self.default.validate()?;
        self.per_qubit.values().try_for_each(ReadoutError::validate)
    }

    // ========================================================================
    // Derived Quantities
    // ========================================================================

    /// Exact P(measured | prepared) over an `n`-qubit register
    /// Gantree: transition_probability(i,j,n) -> f64 // 해석적 전이 확률
    ///
    /// Indices use bit `q` = qubit `q`. This is the matrix entry a calibration
    /// with infinitely many shots converges to.
    pub fn transition_probability(
        &self,
        prepared: usize,
        measured: usize,
        num_qubits: usize,
    ) -> f64 {
        (0..num_qubits)
            .map(|q| {
                let p = (prepared >> q) & 1 == 1;
                let m = (measured >> q) & 1 == 1;
                self.error_for(q).transition(p, m)
            })
            .product()
    }

    /// Mean assignment fidelity over `n` qubits
    pub fn mean_assignment_fidelity(&self, num_qubits: usize) -> f64 {
        if num_qubits == 0 {
            return 1.0;
        }
        (0..num_qubits)
            .map(|q| self.error_for(q).assignment_fidelity())
            .sum::<f64>()
            / num_qubits as f64
    }
}

impl fmt::Display for ReadoutNoise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReadoutNoise(p01={:.4}, p10={:.4}, overrides={})",
            self.default.p01,
            self.default.p10,
            self.per_qubit.len()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
