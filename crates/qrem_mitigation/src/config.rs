//! Mitigation configuration
//!
//! Gantree: L4_Mitigation → MitigationConfig
//!
//! One configuration value shared by the calibration builder and the readout
//! corrector, so both sides agree on shots, bit order and tolerances.

use qrem_core::{calibration, BitOrder, QremError, QremResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// How the corrected vector is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CorrectionMethod {
    /// `raw · C⁻¹`
    #[default]
    Inverse,
    /// Non-negative, sum-preserving least squares
    LeastSquares,
}

/// Post-processing applied to an inverse-corrected vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PostProcess {
    /// Keep the raw result (may contain negative entries)
    #[default]
    None,
    /// Set negative entries to zero
    ClipNegatives,
    /// Clip, then rescale to the raw shot total
    ClipAndRenormalize,
}

/// Readout mitigation configuration
/// Gantree: MitigationConfig // 완화 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MitigationConfig {
    // ========================================================================
    // Calibration Parameters
    // ========================================================================
    /// Shots per calibration circuit
    pub shots: u64,

    /// Label convention; `None` adopts the backend's
    pub bit_order: Option<BitOrder>,

    /// Dispatch calibration circuits on the rayon pool (feature `parallel`)
    pub parallel: bool,

    /// Retries per calibration circuit after the first attempt
    pub max_retries: usize,

    /// Per-call deadline in milliseconds
    ///
    /// Checked after `Backend::execute` returns: a late result counts as a
    /// failed attempt, but a call that never returns is not interrupted.
    pub call_timeout_ms: Option<u64>,

    // ========================================================================
    // Correction Parameters
    // ========================================================================
    /// Correction method
    pub method: CorrectionMethod,

    /// Post-processing for the inverse method
    pub post_process: PostProcess,

    /// Smallest accepted pivot magnitude
    pub singular_tolerance: f64,

    /// Largest accepted 1-norm condition number
    pub max_condition_number: f64,

    /// Iteration cap for the least-squares solver
    pub lsq_max_iterations: usize,

    /// Convergence threshold for the least-squares solver
    pub lsq_tolerance: f64,

    // ========================================================================
    // Caching
    // ========================================================================
    /// Calibration cache time-to-live (seconds)
    pub cache_ttl_secs: u64,
}

impl MitigationConfig {
    // ========================================================================
    // Presets
    // ========================================================================

    /// Low-shot calibration without retries
    pub fn fast() -> Self {
        Self {
            shots: 1024,
            max_retries: 0,
            ..Self::default()
        }
    }

    /// High-shot calibration with physical (non-negative, normalized) output
    pub fn precise() -> Self {
        Self {
            shots: 32_768,
            post_process: PostProcess::ClipAndRenormalize,
            max_condition_number: 1e6,
            ..Self::default()
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set shots per calibration circuit
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = shots;
        self
    }

    /// Pin the label convention
    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = Some(bit_order);
        self
    }

    /// Enable or disable parallel dispatch
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set retry count
    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set per-call deadline
    ///
    /// The backend call itself is not cancelled; see [`Self::call_timeout_ms`].
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Set correction method
    pub fn with_method(mut self, method: CorrectionMethod) -> Self {
        self.method = method;
        self
    }

    /// Set post-processing policy
    pub fn with_post_process(mut self, post_process: PostProcess) -> Self {
        self.post_process = post_process;
        self
    }

    /// Set pivot tolerance
    pub fn with_singular_tolerance(mut self, tolerance: f64) -> Self {
        self.singular_tolerance = tolerance;
        self
    }

    /// Set condition-number ceiling
    pub fn with_max_condition_number(mut self, max: f64) -> Self {
        self.max_condition_number = max;
        self
    }

    /// Set cache TTL
    pub fn with_cache_ttl(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Per-call deadline
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_ms.map(Duration::from_millis)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    pub fn validate(&self) -> QremResult<()> {
        if self.shots == 0 {
            return Err(QremError::InvalidShotCount {
                shots: 0,
                max: qrem_core::limits::DEFAULT_MAX_SHOTS,
            });
        }

        let tol = self.singular_tolerance;
        if tol.is_nan() || tol <= 0.0 || tol >= 1.0 {
            return Err(QremError::InvalidConfig(format!(
                "singular_tolerance must be in (0, 1), got {}",
                tol
            )));
        }

        if self.max_condition_number.is_nan() || self.max_condition_number < 1.0 {
            return Err(QremError::InvalidConfig(format!(
                "max_condition_number must be >= 1, got {}",
                self.max_condition_number
            )));
        }

        if self.method == CorrectionMethod::LeastSquares && self.lsq_max_iterations == 0 {
            return Err(QremError::InvalidConfig(
                "lsq_max_iterations must be > 0".to_string(),
            ));
        }

        if self.call_timeout_ms == Some(0) {
            return Err(QremError::InvalidConfig(
                "call_timeout_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> QremResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> QremResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> QremResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read from a JSON file
    pub fn load(path: impl AsRef<Path>) -> QremResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl Default for MitigationConfig {
    fn default() -> Self {
        Self {
            shots: calibration::DEFAULT_SHOTS,
            bit_order: None,
            parallel: true,
            max_retries: calibration::DEFAULT_MAX_RETRIES,
            call_timeout_ms: None,
            method: CorrectionMethod::Inverse,
            post_process: PostProcess::None,
            singular_tolerance: calibration::DEFAULT_SINGULAR_TOLERANCE,
            max_condition_number: calibration::DEFAULT_MAX_CONDITION,
            lsq_max_iterations: calibration::LSQ_MAX_ITERATIONS,
            lsq_tolerance: calibration::LSQ_TOLERANCE,
            cache_ttl_secs: calibration::DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl fmt::Display for MitigationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self
            .bit_order
            .map(|o| o.to_string())
            .unwrap_or_else(|| "backend".to_string());
        write!(
            f,
            "MitigationConfig(shots={}, order={}, method={:?}, post={:?}, retries={})",
            self.shots, order, self.method, self.post_process, self.max_retries
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
