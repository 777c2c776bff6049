//! # QREM Mitigation
//!
//! Calibration-matrix readout error mitigation.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qrem_mitigation // L4: Mitigation (완료)
//!     MitigationConfig // 설정 (완료)
//!         CorrectionMethod, PostProcess
//!     CalibrationMatrix // C[i][j] = P(j|i) (완료)
//!         from_rows(), from_noise(), save(), load()
//!     CalibrationBuilder // 행렬 생성 (완료)
//!         calibration_circuits(n), build(backend, n)
//!     ReadoutCorrector // 역행렬 보정 (완료)
//!         correct(counts), apply_forward(v)
//!     MitigatedCounts // 보정 결과 (완료)
//!     Linalg // 가우스-조던, 조건수, 단체 사영 (완료)
//!     CalibrationCache // TTL 캐시 (완료)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qrem_mitigation::prelude::*;
//! use qrem_backend::SimulatorBackend;
//! use qrem_core::CircuitBuilder;
//!
//! // Noisy readout: 3% bit flips
//! let backend = SimulatorBackend::with_bit_flip(2, 0.03).unwrap().with_seed(42);
//!
//! // Measure the 4x4 calibration matrix
//! let config = MitigationConfig::default().with_shots(4096);
//! let matrix = CalibrationBuilder::new(config.clone()).build(&backend, 2).unwrap();
//!
//! // Correct a Bell-state measurement
//! let corrector = ReadoutCorrector::new(matrix, config).unwrap();
//! let bell = CircuitBuilder::new(2).bell_pair(0, 1).measure_all().build();
//! let raw = backend.execute(&bell, 4096).unwrap();
//! let mitigated = corrector.correct(&raw.counts).unwrap();
//!
//! println!("raw P(01) = {:.4}", raw.probability("01"));
//! println!("mitigated = {}", mitigated);
//! ```
//!
//! ## Persisting a Calibration
//!
//! ```rust
//! use qrem_mitigation::prelude::*;
//! use qrem_noise::ReadoutNoise;
//! use qrem_core::BitOrder;
//!
//! let noise = ReadoutNoise::ibm_typical();
//! let matrix = CalibrationMatrix::from_noise(&noise, 2, BitOrder::MsbFirst).unwrap();
//! let restored = CalibrationMatrix::from_json(&matrix.to_json().unwrap()).unwrap();
//! assert_eq!(restored.rows(), matrix.rows());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Mitigation configuration (Gantree: L4_Mitigation → MitigationConfig)
pub mod config;

/// Calibration matrix (Gantree: L4_Mitigation → CalibrationMatrix)
pub mod matrix;

/// Dense linear algebra (Gantree: L4_Mitigation → Linalg)
pub mod linalg;

/// Calibration-matrix builder (Gantree: L4_Mitigation → CalibrationBuilder)
pub mod builder;

/// Readout corrector (Gantree: L4_Mitigation → ReadoutCorrector)
pub mod corrector;

/// Calibration cache (Gantree: L4_Mitigation → CalibrationCache)
pub mod calibration_cache;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::CalibrationBuilder;
pub use calibration_cache::CalibrationCache;
pub use config::{CorrectionMethod, MitigationConfig, PostProcess};
pub use corrector::{MitigatedCounts, ReadoutCorrector};
pub use matrix::CalibrationMatrix;

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qrem_mitigation::prelude::*;
    //! ```

    pub use crate::builder::CalibrationBuilder;
    pub use crate::calibration_cache::CalibrationCache;
    pub use crate::config::{CorrectionMethod, MitigationConfig, PostProcess};
    pub use crate::corrector::{MitigatedCounts, ReadoutCorrector};
    pub use crate::matrix::CalibrationMatrix;
    pub use qrem_backend::{Backend, ExecutionResult};
    pub use qrem_core::{BasisIndexer, BitOrder, Counts, QremError, QremResult};
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use approx::assert_abs_diff_eq;
    use qrem_backend::SimulatorBackend;
    use qrem_core::{hamming_distance, Circuit, CircuitBuilder};
    use qrem_noise::{ReadoutError, ReadoutNoise};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails the first `failures` calls, then delegates
    struct FlakyBackend {
        inner: SimulatorBackend,
        failures: usize,
        calls: AtomicUsize,
    }

    impl FlakyBackend {
        fn new(failures: usize) -> Self {
            Self {
                inner: SimulatorBackend::ideal(2).with_seed(3),
                failures,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Backend for FlakyBackend {
        fn name(&self) -> &str {
            "flaky"
        }

        fn num_qubits(&self) -> usize {
            self.inner.num_qubits()
        }

        fn execute(&self, circuit: &Circuit, shots: u64) -> QremResult<ExecutionResult> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(QremError::BackendError("connection reset".to_string()));
            }
            self.inner.execute(circuit, shots)
        }
    }

    fn counts(entries: &[(&str, u64)]) -> Counts {
        entries.iter().map(|(l, c)| (l.to_string(), *c)).collect()
    }

    // ------------------------------------------------------------------------
    // Matrix shape and noiseless behaviour
    // ------------------------------------------------------------------------

    #[test]
    fn test_shape_and_range() {
        let backend = SimulatorBackend::ibm_typical(4).with_seed(42);
        let builder = CalibrationBuilder::new(MitigationConfig::fast());

        for n in 1..=4 {
            let matrix = builder.build(&backend, n).unwrap();
            assert_eq!(matrix.dim(), 1 << n);
            assert_eq!(matrix.rows().len(), 1 << n);
            for row in matrix.rows() {
                assert_eq!(row.len(), 1 << n);
                assert!(row.iter().all(|v| (0.0..=1.0).contains(v)));
                assert_abs_diff_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_noiseless_backend_gives_identity() {
        let backend = SimulatorBackend::ideal(3).with_seed(1);
        let config = MitigationConfig::default().with_shots(512);
        let builder = CalibrationBuilder::new(config.clone());
        let matrix = builder.build(&backend, 3).unwrap();

        assert!(matrix.is_identity(0.0));
        assert_eq!(matrix.assignment_fidelity(), 1.0);

        let corrector = ReadoutCorrector::new(matrix, config).unwrap();
        let raw = counts(&[("000", 200), ("111", 300), ("010", 12)]);
        let mitigated = corrector.correct(&raw).unwrap();
        assert_eq!(mitigated.to_rounded_counts(), raw);
    }

    #[test]
    fn test_forward_then_inverse_round_trip() {
        let backend = SimulatorBackend::ibm_typical(3).with_seed(11);
        let matrix = CalibrationBuilder::new(MitigationConfig::fast())
            .build(&backend, 3)
            .unwrap();
        let corrector = ReadoutCorrector::from_matrix(matrix).unwrap();

        let truth: Vec<f64> = (0..8).map(|i| (i * 37 % 11) as f64 * 10.0).collect();
        let measured = corrector.apply_forward(&truth).unwrap();
        let recovered = corrector.correct_vector(&measured).unwrap();

        for (r, t) in recovered.values().iter().zip(&truth) {
            assert_abs_diff_eq!(*r, *t, epsilon = 1e-8);
        }
    }

    // ------------------------------------------------------------------------
    // Bit order
    // ------------------------------------------------------------------------

    #[test]
    fn test_bit_order_adopted_from_backend() {
        let backend = SimulatorBackend::ideal(2)
            .with_seed(5)
            .with_bit_order(BitOrder::LsbFirst);
        let matrix = CalibrationBuilder::new(MitigationConfig::fast())
            .build(&backend, 2)
            .unwrap();

        assert_eq!(matrix.bit_order(), BitOrder::LsbFirst);
        assert!(matrix.is_identity(0.0));
    }

    #[test]
    fn test_bit_order_mismatch_breaks_identity() {
        // Backend writes qubit 0 leftmost; configuration reads it rightmost
        let backend = SimulatorBackend::ideal(2)
            .with_seed(5)
            .with_bit_order(BitOrder::LsbFirst);
        let config = MitigationConfig::fast().with_bit_order(BitOrder::MsbFirst);
        let matrix = CalibrationBuilder::new(config).build(&backend, 2).unwrap();

        assert!(!matrix.is_identity(0.5));
        // |01> (qubit 0 set) is read back as |10>
        assert_eq!(matrix.get(0b01, 0b10), Some(1.0));
        assert_eq!(matrix.get(0b10, 0b01), Some(1.0));
        // Symmetric states are unaffected
        assert_eq!(matrix.get(0b00, 0b00), Some(1.0));
        assert_eq!(matrix.get(0b11, 0b11), Some(1.0));
    }

    // ------------------------------------------------------------------------
    // Noisy calibration
    // ------------------------------------------------------------------------

    #[test]
    fn test_three_qubit_five_percent_row_101() {
        let backend = SimulatorBackend::with_bit_flip(3, 0.05)
            .unwrap()
            .with_seed(2024);
        let config = MitigationConfig::default().with_shots(2048);
        let matrix = CalibrationBuilder::new(config).build(&backend, 3).unwrap();

        let prepared = matrix.indexer().index("101").unwrap();
        let row = matrix.row(prepared).unwrap();

        // Peak at the prepared state, near 0.95^3
        let peak = row
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(j, _)| j)
            .unwrap();
        assert_eq!(peak, prepared);
        assert_abs_diff_eq!(row[prepared], 0.857, epsilon = 0.03);

        // Off-diagonal mass sits on one-bit-flip neighbours ("100", "111", "001")
        let mut mass_by_distance = [0.0; 4];
        for (j, p) in row.iter().enumerate() {
            mass_by_distance[hamming_distance(prepared, j) as usize] += p;
        }
        assert_abs_diff_eq!(mass_by_distance[1], 0.135, epsilon = 0.03);
        assert!(mass_by_distance[1] > 5.0 * (mass_by_distance[2] + mass_by_distance[3]));
        for label in ["100", "111", "001"] {
            let p = matrix.probability("101", label).unwrap();
            assert!(p > 0.02, "{}: {}", label, p);
        }
    }

    #[test]
    fn test_mitigation_improves_bell_state() {
        let noise = ReadoutNoise::asymmetric(0.03, 0.08).unwrap();
        let backend = SimulatorBackend::new(2, noise).with_seed(99);
        let config = MitigationConfig::default()
            .with_shots(20_000)
            .with_post_process(PostProcess::ClipAndRenormalize);
        let builder = CalibrationBuilder::new(config.clone());
        let matrix = builder.build(&backend, 2).unwrap();
        let corrector = ReadoutCorrector::new(matrix, config).unwrap();

        let bell = CircuitBuilder::new(2).bell_pair(0, 1).measure_all().build();
        let raw = backend.execute(&bell, 20_000).unwrap();
        let mitigated = corrector.correct(&raw.counts).unwrap();
        let probs = mitigated.probabilities();

        let raw_leak = raw.probability("01") + raw.probability("10");
        let mitigated_leak = probs["01"] + probs["10"];
        assert!(raw_leak > 0.05, "raw leak {}", raw_leak);
        assert!(mitigated_leak < 0.02, "mitigated leak {}", mitigated_leak);
        assert_abs_diff_eq!(probs["00"], 0.5, epsilon = 0.03);
        assert_abs_diff_eq!(probs["11"], 0.5, epsilon = 0.03);
    }

    // ------------------------------------------------------------------------
    // Singular calibration
    // ------------------------------------------------------------------------

    #[test]
    fn test_duplicate_rows_are_singular() {
        let indexer = BasisIndexer::new(2, BitOrder::MsbFirst).unwrap();
        let rows = vec![
            vec![0.9, 0.1, 0.0, 0.0],
            vec![0.9, 0.1, 0.0, 0.0],
            vec![0.0, 0.0, 0.95, 0.05],
            vec![0.0, 0.0, 0.05, 0.95],
        ];
        let matrix = CalibrationMatrix::from_rows(indexer, 1000, "test", rows).unwrap();

        let err = ReadoutCorrector::from_matrix(matrix).unwrap_err();
        assert!(matches!(err, QremError::SingularCalibration { .. }));
        assert!(err.label().is_some());
    }

    #[test]
    fn test_stuck_qubit_backend_is_singular() {
        // Qubit 0 always reads 0: |00> and |01> produce identical rows
        let noise = ReadoutNoise::ideal()
            .with_qubit(0, ReadoutError::new(0.0, 1.0).unwrap())
            .unwrap();
        let backend = SimulatorBackend::new(2, noise).with_seed(8);
        let config = MitigationConfig::fast();

        let builder = CalibrationBuilder::new(config.clone());
        let matrix = builder.build(&backend, 2).unwrap();
        assert_eq!(matrix.row(0b00), matrix.row(0b01));

        assert!(matches!(
            ReadoutCorrector::new(matrix, config),
            Err(QremError::SingularCalibration { .. })
        ));
    }

    // ------------------------------------------------------------------------
    // Input validation
    // ------------------------------------------------------------------------

    #[test]
    fn test_zero_shots_rejected() {
        let backend = SimulatorBackend::ideal(2);
        let config = MitigationConfig::default().with_shots(0);
        let result = CalibrationBuilder::new(config).build(&backend, 2);
        assert!(matches!(
            result,
            Err(QremError::InvalidShotCount { shots: 0, .. })
        ));
    }

    #[test]
    fn test_corrector_rejects_foreign_label() {
        let matrix = CalibrationMatrix::identity(3, BitOrder::MsbFirst).unwrap();
        let corrector = ReadoutCorrector::from_matrix(matrix).unwrap();

        let err = corrector.correct(&counts(&[("0101", 5)])).unwrap_err();
        assert!(matches!(err, QremError::OutOfRangeLabel { .. }));
        assert!(err.to_string().contains("'0101'"));
    }

    // ------------------------------------------------------------------------
    // Backend availability
    // ------------------------------------------------------------------------

    #[test]
    fn test_failing_backend_is_unavailable() {
        let backend = FlakyBackend::new(usize::MAX);
        let config = MitigationConfig::default()
            .with_shots(100)
            .with_parallel(false)
            .with_max_retries(2);

        let err = CalibrationBuilder::new(config)
            .build(&backend, 2)
            .unwrap_err();
        match &err {
            QremError::BackendUnavailable {
                backend,
                label,
                reason,
            } => {
                assert_eq!(backend, "flaky");
                assert_eq!(label, "00");
                assert!(reason.contains("connection reset"));
                assert!(reason.contains("3 attempts"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.is_recoverable());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_flaky_backend_recovers_within_retries() {
        let backend = FlakyBackend::new(2);
        let config = MitigationConfig::default()
            .with_shots(100)
            .with_parallel(false)
            .with_max_retries(2);

        let matrix = CalibrationBuilder::new(config).build(&backend, 2).unwrap();
        assert!(matrix.is_identity(0.0));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 4 + 2);
    }

    #[test]
    fn test_slow_backend_misses_deadline() {
        let backend = SimulatorBackend::ideal(1).with_latency(Duration::from_millis(30));
        let config = MitigationConfig::default()
            .with_shots(10)
            .with_max_retries(1)
            .with_call_timeout(Duration::from_millis(5));

        let err = CalibrationBuilder::new(config)
            .build(&backend, 1)
            .unwrap_err();
        match err {
            QremError::BackendUnavailable { reason, .. } => assert!(reason.contains("deadline")),
            other => panic!("unexpected error: {}", other),
        }
    }

    // ------------------------------------------------------------------------
    // Correction policies
    // ------------------------------------------------------------------------

    #[test]
    fn test_least_squares_on_measured_data() {
        let backend = SimulatorBackend::with_bit_flip(2, 0.1)
            .unwrap()
            .with_seed(17);
        let config = MitigationConfig::default()
            .with_shots(1000)
            .with_method(CorrectionMethod::LeastSquares);
        let builder = CalibrationBuilder::new(config.clone());
        let matrix = builder.build(&backend, 2).unwrap();

        let inverse = ReadoutCorrector::from_matrix(matrix.clone()).unwrap();
        let lsq = ReadoutCorrector::new(matrix, config).unwrap();

        // A pure |00> readout: the plain inverse tends to go negative
        let raw = backend
            .execute(&CircuitBuilder::new(2).measure_all().build(), 1000)
            .unwrap();
        let plain = inverse.correct(&raw.counts).unwrap();
        let constrained = lsq.correct(&raw.counts).unwrap();

        assert_abs_diff_eq!(plain.total(), 1000.0, epsilon = 1e-6);
        assert!(constrained.values().iter().all(|&v| v >= 0.0));
        assert_abs_diff_eq!(constrained.total(), 1000.0, epsilon = 1e-6);
        assert_eq!(constrained.most_likely().unwrap().0, "00");
    }

    // ------------------------------------------------------------------------
    // Persistence and caching
    // ------------------------------------------------------------------------

    #[test]
    fn test_persisted_matrix_corrects_identically() {
        let backend = SimulatorBackend::ibm_typical(2).with_seed(31);
        let matrix = CalibrationBuilder::new(MitigationConfig::fast())
            .build(&backend, 2)
            .unwrap();

        let path = std::env::temp_dir().join(format!("qrem_lib_{}.json", std::process::id()));
        matrix.save(&path).unwrap();
        let loaded = CalibrationMatrix::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.rows(), matrix.rows());
        assert_eq!(loaded.backend(), "qrem_simulator");
        assert_eq!(loaded.shots(), 1024);

        let raw = counts(&[("00", 510), ("01", 12), ("10", 20), ("11", 482)]);
        let a = ReadoutCorrector::from_matrix(matrix)
            .unwrap()
            .correct(&raw)
            .unwrap();
        let b = ReadoutCorrector::from_matrix(loaded)
            .unwrap()
            .correct(&raw)
            .unwrap();
        assert_eq!(a.values(), b.values());
    }

    #[test]
    fn test_cache_within_ttl_and_after_invalidation() {
        let cache = CalibrationCache::new(60);
        let backend = SimulatorBackend::ibm_typical(2).with_seed(4);
        let builder = CalibrationBuilder::new(MitigationConfig::fast());

        let built = cache.get_or_build(&backend, 2, &builder).unwrap();
        assert_eq!(cache.get(backend.name()).unwrap().rows(), built.rows());

        cache.invalidate(backend.name());
        assert!(cache.get(backend.name()).is_none());
    }
}
