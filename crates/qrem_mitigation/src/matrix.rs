//! Calibration matrix
//!
//! Gantree: L4_Mitigation → CalibrationMatrix
//!
//! `C[i][j] = P(measured = j | prepared = i)`, row-major, indexed by basis
//! index under the matrix's own [`BasisIndexer`].

use crate::linalg;
use qrem_core::{BasisIndexer, BitOrder, QremError, QremResult};
use qrem_noise::ReadoutNoise;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Largest deviation of a row sum from 1 accepted on validation
const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Calibration (assignment) matrix of an n-qubit register
/// Gantree: CalibrationMatrix // 캘리브레이션 행렬
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationMatrix {
    /// Label convention the rows were measured in
    /// Gantree: indexer: BasisIndexer // 라벨 변환
    #[serde(flatten)]
    indexer: BasisIndexer,

    /// Shots per calibration circuit (0 for analytic matrices)
    shots: u64,

    /// Backend the matrix was measured on
    backend: String,

    /// Creation timestamp
    #[serde(with = "system_time_serde")]
    created_at: SystemTime,

    /// Row-major entries
    /// Gantree: rows: Vec<Vec<f64>> // 2^n × 2^n
    rows: Vec<Vec<f64>>,
}

impl CalibrationMatrix {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create from measured rows with validation
    pub fn from_rows(
        indexer: BasisIndexer,
        shots: u64,
        backend: &str,
        rows: Vec<Vec<f64>>,
    ) -> QremResult<Self> {
        let matrix = Self {
            indexer,
            shots,
            backend: backend.to_string(),
            created_at: SystemTime::now(),
            rows,
        };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Identity matrix (noiseless readout)
    pub fn identity(num_qubits: usize, bit_order: BitOrder) -> QremResult<Self> {
        let indexer = BasisIndexer::new(num_qubits, bit_order)?;
        let rows = linalg::identity(indexer.dim());
        Self::from_rows(indexer, 0, "ideal", rows)
    }

    /// Exact matrix a noise model converges to with infinitely many shots
    /// Gantree: from_noise(noise, n, order) -> Self // 해석적 행렬
    pub fn from_noise(
        noise: &ReadoutNoise,
        num_qubits: usize,
        bit_order: BitOrder,
    ) -> QremResult<Self> {
        noise.validate()?;
        let indexer = BasisIndexer::new(num_qubits, bit_order)?;
        let dim = indexer.dim();
        let rows = (0..dim)
            .map(|i| {
                (0..dim)
                    .map(|j| noise.transition_probability(i, j, num_qubits))
                    .collect()
            })
            .collect();
        Self::from_rows(indexer, 0, "analytic", rows)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.indexer.num_qubits()
    }

    /// Matrix dimension, 2^n
    pub fn dim(&self) -> usize {
        self.indexer.dim()
    }

    /// Label convention
    pub fn bit_order(&self) -> BitOrder {
        self.indexer.bit_order()
    }

    /// Indexer shared with the corrector
    pub fn indexer(&self) -> &BasisIndexer {
        &self.indexer
    }

    /// Shots per calibration circuit
    pub fn shots(&self) -> u64 {
        self.shots
    }

    /// Backend name
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Creation timestamp
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// All rows
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Row of a prepared state
    pub fn row(&self, prepared: usize) -> Option<&[f64]> {
        self.rows.get(prepared).map(Vec::as_slice)
    }

    /// Entry by basis index
    pub fn get(&self, prepared: usize, measured: usize) -> Option<f64> {
        self.rows.get(prepared)?.get(measured).copied()
    }

    /// Entry by basis label
    /// Gantree: probability(prepared, measured) -> f64 // 라벨 조회
    pub fn probability(&self, prepared: &str, measured: &str) -> QremResult<f64> {
        let i = self.indexer.index(prepared)?;
        let j = self.indexer.index(measured)?;
        Ok(self.rows[i][j])
    }

    // ========================================================================
    // Derived Quantities
    // ========================================================================

    /// Diagonal entries, P(read i | prepared i)
    pub fn diagonal(&self) -> Vec<f64> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| row[i])
            .collect()
    }

    /// Mean probability of reading back the prepared state
    pub fn assignment_fidelity(&self) -> f64 {
        self.diagonal().iter().sum::<f64>() / self.dim() as f64
    }

    /// Largest absolute deviation from the identity matrix
    pub fn distance_from_identity(&self) -> f64 {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(j, &v)| (v - if i == j { 1.0 } else { 0.0 }).abs())
            })
            .fold(0.0, f64::max)
    }

    /// True when every entry is within `tolerance` of the identity
    pub fn is_identity(&self, tolerance: f64) -> bool {
        self.distance_from_identity() <= tolerance
    }

    /// Age of the matrix
    pub fn age(&self) -> Option<Duration> {
        self.created_at.elapsed().ok()
    }

    /// Check if the matrix is younger than `ttl`
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        match self.created_at.elapsed() {
            Ok(elapsed) => elapsed < ttl,
            Err(_) => false,
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check shape, entry range and row sums
    pub fn validate(&self) -> QremResult<()> {
        let indexer = BasisIndexer::new(self.indexer.num_qubits(), self.indexer.bit_order())?;
        let dim = indexer.dim();

        if self.rows.len() != dim {
            return Err(QremError::DimensionMismatch {
                expected: dim,
                actual: self.rows.len(),
            });
        }

        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != dim {
                return Err(QremError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            if let Some(&bad) = row.iter().find(|v| !(0.0..=1.0).contains(*v)) {
                return Err(QremError::InvalidProbability(bad));
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(QremError::InvalidConfig(format!(
                    "calibration row '{}' sums to {}",
                    indexer.label(i)?,
                    sum
                )));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Serialize to JSON
    pub fn to_json(&self) -> QremResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate
    pub fn from_json(json: &str) -> QremResult<Self> {
        let matrix: Self = serde_json::from_str(json)?;
        matrix.validate()?;
        Ok(matrix)
    }

    /// Write to a JSON file
    /// Gantree: save(path) // 저장
    pub fn save(&self, path: impl AsRef<Path>) -> QremResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read from a JSON file
    /// Gantree: load(path) -> Self // 로드
    pub fn load(path: impl AsRef<Path>) -> QremResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl fmt::Display for CalibrationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "CalibrationMatrix({}Q, {}, shots={}, backend={}, fidelity={:.4})",
            self.num_qubits(),
            self.bit_order(),
            self.shots,
            self.backend,
            self.assignment_fidelity()
        )?;
        // Small registers only
        if self.num_qubits() <= 3 {
            for (i, row) in self.rows.iter().enumerate() {
                let label = self.indexer.label(i).map_err(|_| fmt::Error)?;
                write!(f, "  {} |", label)?;
                for v in row {
                    write!(f, " {:.4}", v)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SystemTime Serde Helper
// ============================================================================

mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::from_secs(secs))
    }
}

// ============================================================================
// Tests
// ============================================================================
