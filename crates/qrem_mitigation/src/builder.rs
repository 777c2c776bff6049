//! Calibration-matrix builder
//!
//! Gantree: L4_Mitigation → CalibrationBuilder
//!
//! Prepares every computational basis state, reads it back on the backend and
//! turns each frequency table into one row of the calibration matrix. Rows are
//! independent, so with the `parallel` feature they are measured on the rayon
//! pool and collected in index order into a pre-sized matrix.

use crate::config::MitigationConfig;
use crate::matrix::CalibrationMatrix;
use qrem_backend::Backend;
use qrem_core::{
    limits, total_counts, BasisIndexer, BitOrder, Circuit, CircuitBuilder, Counts, QremError,
    QremResult,
};
use std::time::Instant;

/// Calibration-matrix builder
/// Gantree: CalibrationBuilder // 캘리브레이션 행렬 생성기
#[derive(Debug, Clone, Default)]
pub struct CalibrationBuilder {
    config: MitigationConfig,
}

impl CalibrationBuilder {
    /// Create builder
    pub fn new(config: MitigationConfig) -> Self {
        Self { config }
    }

    /// Configuration
    pub fn config(&self) -> &MitigationConfig {
        &self.config
    }

    // ========================================================================
    // Circuits
    // ========================================================================

    /// One preparation circuit per basis state, in index order
    /// Gantree: calibration_circuits(n) -> Vec<Circuit> // 준비 회로
    pub fn calibration_circuits(&self, num_qubits: usize) -> QremResult<Vec<Circuit>> {
        if num_qubits == 0 || num_qubits > limits::MAX_CALIBRATION_QUBITS {
            return Err(QremError::QubitOutOfRange {
                qubit: num_qubits,
                max: limits::MAX_CALIBRATION_QUBITS,
            });
        }

        (0..1usize << num_qubits)
            .map(|i| {
                CircuitBuilder::with_name(num_qubits, format!("calibration_{}", i))
                    .prepare_basis_state(i)
                    .measure_all()
                    .build_validated()
            })
            .collect()
    }

    /// Label convention used against `backend`
    ///
    /// An explicit configuration value wins; otherwise the backend's.
    pub fn resolve_bit_order<B: Backend + ?Sized>(&self, backend: &B) -> BitOrder {
        match self.config.bit_order {
            Some(order) => {
                if order != backend.bit_order() {
                    log::warn!(
                        "configured bit order {} differs from backend '{}' ({})",
                        order,
                        backend.name(),
                        backend.bit_order()
                    );
                }
                order
            }
            None => backend.bit_order(),
        }
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Measure the full `2^n × 2^n` calibration matrix
    /// Gantree: build(backend, n) -> Result<CalibrationMatrix> // 행렬 생성
    pub fn build<B: Backend + ?Sized>(
        &self,
        backend: &B,
        num_qubits: usize,
    ) -> QremResult<CalibrationMatrix> {
        let shots = self.config.shots;
        if shots == 0 || shots > backend.max_shots() {
            return Err(QremError::InvalidShotCount {
                shots,
                max: backend.max_shots(),
            });
        }
        self.config.validate()?;

        if num_qubits == 0 || num_qubits > backend.num_qubits() {
            return Err(QremError::QubitOutOfRange {
                qubit: num_qubits,
                max: backend.num_qubits(),
            });
        }

        let circuits = self.calibration_circuits(num_qubits)?;
        let indexer = BasisIndexer::new(num_qubits, self.resolve_bit_order(backend))?;

        let started = Instant::now();
        let rows = self.measure_rows(backend, &indexer, &circuits)?;
        let matrix = CalibrationMatrix::from_rows(indexer, shots, backend.name(), rows)?;

        log::info!(
            "calibrated {} qubits on '{}': {} circuits x {} shots in {:?}, fidelity {:.4}",
            num_qubits,
            backend.name(),
            circuits.len(),
            shots,
            started.elapsed(),
            matrix.assignment_fidelity()
        );

        Ok(matrix)
    }

    #[cfg(feature = "parallel")]
    fn measure_rows<B: Backend + ?Sized>(
        &self,
        backend: &B,
        indexer: &BasisIndexer,
        circuits: &[Circuit],
    ) -> QremResult<Vec<Vec<f64>>> {
        use rayon::prelude::*;

        if self.config.parallel {
            circuits
                .par_iter()
                .enumerate()
                .map(|(i, circuit)| self.measure_row(backend, indexer, i, circuit))
                .collect()
        } else {
            self.measure_rows_sequential(backend, indexer, circuits)
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn measure_rows<B: Backend + ?Sized>(
        &self,
        backend: &B,
        indexer: &BasisIndexer,
        circuits: &[Circuit],
    ) -> QremResult<Vec<Vec<f64>>> {
        self.measure_rows_sequential(backend, indexer, circuits)
    }

    fn measure_rows_sequential<B: Backend + ?Sized>(
        &self,
        backend: &B,
        indexer: &BasisIndexer,
        circuits: &[Circuit],
    ) -> QremResult<Vec<Vec<f64>>> {
        circuits
            .iter()
            .enumerate()
            .map(|(i, circuit)| self.measure_row(backend, indexer, i, circuit))
            .collect()
    }

    /// Execute one preparation circuit with retry and deadline
    /// Gantree: measure_row(i) -> Vec<f64> // 행 측정
    ///
    /// The deadline is checked once the call returns; a late result counts as
    /// a failed attempt.
    fn measure_row<B: Backend + ?Sized>(
        &self,
        backend: &B,
        indexer: &BasisIndexer,
        prepared: usize,
        circuit: &Circuit,
    ) -> QremResult<Vec<f64>> {
        let label = indexer.label(prepared)?;
        let deadline = self.config.call_timeout();
        let attempts = self.config.max_retries + 1;
        let mut reason = String::new();

        for attempt in 1..=attempts {
            let started = Instant::now();
            match backend.execute(circuit, self.config.shots) {
                Ok(result) => {
                    let elapsed = started.elapsed();
                    match deadline {
                        Some(limit) if elapsed > limit => {
                            reason = format!("call took {:?}, deadline {:?}", elapsed, limit);
                        }
                        _ => return self.row_from_counts(indexer, &label, &result.counts),
                    }
                }
                Err(err) if err.is_recoverable() => reason = err.to_string(),
                Err(err) => return Err(err),
            }

            if attempt < attempts {
                log::warn!(
                    "calibration of '{}' on '{}' failed (attempt {}/{}): {}",
                    label,
                    backend.name(),
                    attempt,
                    attempts,
                    reason
                );
            }
        }

        Err(QremError::BackendUnavailable {
            backend: backend.name().to_string(),
            label,
            reason: format!("{} after {} attempts", reason, attempts),
        })
    }

    /// Convert one frequency table into a matrix row
    fn row_from_counts(
        &self,
        indexer: &BasisIndexer,
        prepared: &str,
        counts: &Counts,
    ) -> QremResult<Vec<f64>> {
        let shots = self.config.shots;
        let mut row = vec![0.0; indexer.dim()];

        for (measured, &count) in counts {
            let j = indexer
                .index(measured)
                .map_err(|err| QremError::OutOfRangeLabel {
                    label: measured.clone(),
                    num_qubits: indexer.num_qubits(),
                    context: format!("returned for prepared state '{}': {}", prepared, err),
                })?;
            row[j] += count as f64 / shots as f64;
        }

        let actual = total_counts(counts);
        if actual != shots {
            return Err(QremError::InconsistentCounts {
                label: prepared.to_string(),
                expected: shots,
                actual,
            });
        }

        log::debug!(
            "row '{}': P(read back) = {:.4}, {} distinct outcomes",
            prepared,
            row.get(indexer.index(prepared)?).copied().unwrap_or(0.0),
            counts.len()
        );

        Ok(row)
    }
}

// ============================================================================
// Tests
// ============================================================================
