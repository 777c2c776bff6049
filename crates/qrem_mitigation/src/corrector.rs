//! Readout corrector
//!
//! Gantree: L4_Mitigation → ReadoutCorrector
//!
//! Inverts the calibration matrix once and applies it to raw frequency
//! tables. Frequency vectors are row vectors: the readout model is
//! `measured = true · C`, so the correction is `corrected = raw · C⁻¹`.

use crate::config::{CorrectionMethod, MitigationConfig, PostProcess};
use crate::linalg;
use crate::matrix::CalibrationMatrix;
use qrem_core::{calibration, BasisIndexer, Counts, QremError, QremResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Readout corrector holding `C` and `C⁻¹`
/// Gantree: ReadoutCorrector // 측정 오류 보정기
#[derive(Debug, Clone)]
pub struct ReadoutCorrector {
    /// Calibration matrix
    matrix: CalibrationMatrix,

    /// Inverse calibration matrix
    inverse: Vec<Vec<f64>>,

    /// 1-norm condition number of `C`
    condition: f64,

    /// Correction settings
    config: MitigationConfig,
}

impl ReadoutCorrector {
    /// Invert `matrix` and prepare for correction
    /// Gantree: new(matrix, config) -> Result<Self> // 역행렬 계산
    ///
    /// Fails with [`QremError::SingularCalibration`] when a pivot falls below
    /// `singular_tolerance` or the condition number exceeds
    /// `max_condition_number`.
    pub fn new(matrix: CalibrationMatrix, config: MitigationConfig) -> QremResult<Self> {
        config.validate()?;
        matrix.validate()?;
        let indexer = *matrix.indexer();

        let inversion = match linalg::invert(matrix.rows(), config.singular_tolerance) {
            Ok(inversion) => inversion,
            Err(failure) => {
                let label = indexer
                    .label(failure.column)
                    .unwrap_or_else(|_| failure.column.to_string());
                return Err(QremError::SingularCalibration {
                    label,
                    pivot: failure.pivot,
                    condition: f64::INFINITY,
                });
            }
        };

        let condition = linalg::condition_number(matrix.rows(), &inversion.inverse);
        if !condition.is_finite() || condition > config.max_condition_number {
            return Err(QremError::SingularCalibration {
                label: indexer.label(inversion.weakest_column)?,
                pivot: inversion.weakest_pivot,
                condition,
            });
        }

        if condition > calibration::WARN_CONDITION {
            log::warn!(
                "poorly conditioned calibration matrix for '{}' ({:.3e}); shot noise is amplified",
                matrix.backend(),
                condition
            );
        }
        log::info!(
            "inverted {}x{} calibration matrix for '{}': condition {:.3}, fidelity {:.4}",
            matrix.dim(),
            matrix.dim(),
            matrix.backend(),
            condition,
            matrix.assignment_fidelity()
        );

        Ok(Self {
            matrix,
            inverse: inversion.inverse,
            condition,
            config,
        })
    }

    /// Corrector with default settings
    pub fn from_matrix(matrix: CalibrationMatrix) -> QremResult<Self> {
        Self::new(matrix, MitigationConfig::default())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Calibration matrix
    pub fn matrix(&self) -> &CalibrationMatrix {
        &self.matrix
    }

    /// Inverse calibration matrix
    pub fn inverse(&self) -> &[Vec<f64>] {
        &self.inverse
    }

    /// 1-norm condition number of the calibration matrix
    pub fn condition_number(&self) -> f64 {
        self.condition
    }

    /// Mean diagonal of the calibration matrix
    pub fn assignment_fidelity(&self) -> f64 {
        self.matrix.assignment_fidelity()
    }

    /// Settings
    pub fn config(&self) -> &MitigationConfig {
        &self.config
    }

    /// Indexer shared with the builder
    pub fn indexer(&self) -> &BasisIndexer {
        self.matrix.indexer()
    }

    // ========================================================================
    // Correction
    // ========================================================================

    /// Correct a raw frequency table
    /// Gantree: correct(counts) -> Result<MitigatedCounts> // 보정 적용
    pub fn correct(&self, counts: &Counts) -> QremResult<MitigatedCounts> {
        let raw = self.indexer().counts_to_vector(counts)?;
        self.correct_vector(&raw)
    }

    /// Correct a dense raw frequency vector indexed by basis index
    pub fn correct_vector(&self, raw: &[f64]) -> QremResult<MitigatedCounts> {
        self.check_dim(raw)?;
        let raw_total: f64 = raw.iter().sum();
        let unconstrained = linalg::row_times_matrix(raw, &self.inverse);

        let values = match self.config.method {
            CorrectionMethod::Inverse => {
                apply_post_process(unconstrained, self.config.post_process, raw_total)
            }
            CorrectionMethod::LeastSquares => {
                let clip = PostProcess::ClipNegatives;
                let start = apply_post_process(unconstrained, clip, raw_total);
                linalg::constrained_least_squares(
                    self.matrix.rows(),
                    raw,
                    &start,
                    self.config.lsq_max_iterations,
                    self.config.lsq_tolerance,
                )
            }
        };

        Ok(MitigatedCounts {
            indexer: *self.indexer(),
            values,
            raw_total,
        })
    }

    /// Forward readout model: `measured = true · C`
    /// Gantree: apply_forward(true_vector) -> Vec<f64> // 순방향 모델
    pub fn apply_forward(&self, true_vector: &[f64]) -> QremResult<Vec<f64>> {
        self.check_dim(true_vector)?;
        Ok(linalg::row_times_matrix(true_vector, self.matrix.rows()))
    }

    fn check_dim(&self, vector: &[f64]) -> QremResult<()> {
        if vector.len() != self.matrix.dim() {
            return Err(QremError::DimensionMismatch {
                expected: self.matrix.dim(),
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// Apply a post-processing policy to an inverse-corrected vector
fn apply_post_process(mut values: Vec<f64>, policy: PostProcess, raw_total: f64) -> Vec<f64> {
    match policy {
        PostProcess::None => values,
        PostProcess::ClipNegatives => {
            values.iter_mut().for_each(|v| *v = v.max(0.0));
            values
        }
        PostProcess::ClipAndRenormalize => {
            values.iter_mut().for_each(|v| *v = v.max(0.0));
            let sum: f64 = values.iter().sum();
            if sum > 0.0 {
                let scale = raw_total / sum;
                values.iter_mut().for_each(|v| *v *= scale);
            }
            values
        }
    }
}

// ============================================================================
// Mitigated Counts
// ============================================================================

/// Corrected frequency vector
/// Gantree: MitigatedCounts // 보정된 빈도
///
/// Entries are real-valued and, without post-processing, may be negative or
/// fail to sum to the shot count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MitigatedCounts {
    indexer: BasisIndexer,
    values: Vec<f64>,
    raw_total: f64,
}

impl MitigatedCounts {
    /// Value for a basis label
    ///
    /// A deserialized value whose vector is shorter than the basis reports
    /// [`QremError::DimensionMismatch`].
    pub fn get(&self, label: &str) -> QremResult<f64> {
        let index = self.indexer.index(label)?;
        self.values
            .get(index)
            .copied()
            .ok_or(QremError::DimensionMismatch {
                expected: self.indexer.dim(),
                actual: self.values.len(),
            })
    }

    /// Value for a basis index
    pub fn get_index(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Dense vector indexed by basis index
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Indexer
    pub fn indexer(&self) -> &BasisIndexer {
        &self.indexer
    }

    /// Sum of corrected values
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Sum of the raw counts
    pub fn raw_total(&self) -> f64 {
        self.raw_total
    }

    /// Sum of the negative entries (zero after clipping)
    pub fn negative_mass(&self) -> f64 {
        self.values.iter().filter(|v| **v < 0.0).sum()
    }

    /// True when any entry is negative
    pub fn has_negative(&self) -> bool {
        self.values.iter().any(|v| *v < 0.0)
    }

    /// Label with the largest corrected value
    pub fn most_likely(&self) -> Option<(String, f64)> {
        let (index, &value) = self
            .values
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))?;
        let label = self.indexer.label(index).ok()?;
        Some((label, value))
    }

    /// Label-keyed map of every value
    pub fn to_map(&self) -> QremResult<BTreeMap<String, f64>> {
        self.indexer.vector_to_map(&self.values)
    }

    /// Integer frequency table: values rounded, non-positive entries dropped
    pub fn to_rounded_counts(&self) -> Counts {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| {
                let rounded = v.round();
                if rounded < 1.0 {
                    return None;
                }
                let label = self.indexer.label(i).ok()?;
                Some((label, rounded as u64))
            })
            .collect()
    }

    /// Values divided by their total (empty when the total is not positive)
    pub fn probabilities(&self) -> BTreeMap<String, f64> {
        let total = self.total();
        if total <= 0.0 {
            return BTreeMap::new();
        }
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| Some((self.indexer.label(i).ok()?, v / total)))
            .collect()
    }
}

impl fmt::Display for MitigatedCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let label = self.indexer.label(i).map_err(|_| fmt::Error)?;
            write!(f, "{}: {:.2}", label, v)?;
        }
        write!(f, "}}")
    }
}

// ============================================================================
// Tests
// ============================================================================
