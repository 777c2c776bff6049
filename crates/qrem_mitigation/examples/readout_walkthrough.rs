//! QREM Readout Mitigation Walkthrough
//!
//! Builds Bell and GHZ circuits, runs them on a simulator with asymmetric
//! readout errors, measures the calibration matrix and compares raw counts
//! with the mitigated estimate under each post-processing policy.

use qrem_backend::{Backend, SimulatorBackend};
use qrem_core::{BitOrder, Circuit, CircuitBuilder, QremResult};
use qrem_mitigation::prelude::*;
use qrem_noise::{ReadoutError, ReadoutNoise};
use std::time::Instant;

fn main() -> QremResult<()> {
    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║              QREM Readout Error Mitigation Walkthrough               ║");
    println!("╚══════════════════════════════════════════════════════════════════════╝\n");

    let shots = 8192u64;
    let seed = 42u64;

    // Relaxation-dominated readout, one weaker qubit
    let noise = ReadoutNoise::ibm_typical().with_qubit(2, ReadoutError::new(0.04, 0.10)?)?;
    let backend = SimulatorBackend::new(3, noise.clone()).with_seed(seed);

    println!("Configuration:");
    println!(
        "  • Backend: {} ({} qubits)",
        backend.name(),
        backend.num_qubits()
    );
    println!("  • Readout noise: {}", noise);
    println!("  • Shots per circuit: {}", shots);
    println!("  • Random seed: {}", seed);
    println!();

    // =========================================================================
    // Step 1: Calibration
    // =========================================================================
    println!("═══════════════════════════════════════════════════════════════════════");
    println!("  STEP 1: Calibration matrix (3 qubits, 8 circuits)");
    println!("═══════════════════════════════════════════════════════════════════════\n");

    let config = MitigationConfig::default().with_shots(shots);
    let builder = CalibrationBuilder::new(config.clone());

    let started = Instant::now();
    let matrix = builder.build(&backend, 3)?;
    println!("{}", matrix);
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    println!("  built in {:.1} ms", elapsed_ms);

    let analytic = CalibrationMatrix::from_noise(&noise, 3, BitOrder::MsbFirst)?;
    let worst = matrix
        .rows()
        .iter()
        .zip(analytic.rows())
        .flat_map(|(m, a)| m.iter().zip(a).map(|(x, y)| (x - y).abs()))
        .fold(0.0, f64::max);
    println!("  max deviation from analytic matrix: {:.4}\n", worst);

    // =========================================================================
    // Step 2: Correction
    // =========================================================================
    println!("═══════════════════════════════════════════════════════════════════════");
    println!("  STEP 2: Raw vs mitigated counts");
    println!("═══════════════════════════════════════════════════════════════════════\n");

    let bell = CircuitBuilder::new(3).bell_pair(0, 1).measure_all().build();
    let ghz = CircuitBuilder::new(3).ghz().measure_all().build();
    let circuits = [("Bell(0,1)", bell), ("GHZ(3)", ghz)];

    let (inv, lsq) = (CorrectionMethod::Inverse, CorrectionMethod::LeastSquares);
    let policies = [
        ("none", inv, PostProcess::None),
        ("clip", inv, PostProcess::ClipNegatives),
        ("clip+norm", inv, PostProcess::ClipAndRenormalize),
        ("lsq", lsq, PostProcess::None),
    ];

    for (name, circuit) in &circuits {
        report(name, circuit, &backend, &matrix, &config, &policies, shots)?;
    }

    Ok(())
}

fn report(
    name: &str,
    circuit: &Circuit,
    backend: &SimulatorBackend,
    matrix: &CalibrationMatrix,
    config: &MitigationConfig,
    policies: &[(&str, CorrectionMethod, PostProcess)],
    shots: u64,
) -> QremResult<()> {
    let raw = backend.execute(circuit, shots)?;

    let mut results = Vec::with_capacity(policies.len());
    for (_, method, post) in policies {
        let corrector = ReadoutCorrector::new(
            matrix.clone(),
            config.clone().with_method(*method).with_post_process(*post),
        )?;
        results.push(corrector.correct(&raw.counts)?);
    }

    println!("{}:", name);
    print!("┌───────┬──────────");
    for _ in policies {
        print!("┬───────────");
    }
    println!("┐");
    print!("│ State │ Raw      ");
    for (label, _, _) in policies {
        print!("│ {:<9} ", label);
    }
    println!("│");

    for label in matrix.indexer().labels() {
        let count = raw.counts.get(&label).copied().unwrap_or(0);
        print!("│ {}   │ {:8} ", label, count);
        for result in &results {
            print!("│ {:9.1} ", result.get(&label)?);
        }
        println!("│");
    }

    print!("└───────┴──────────");
    for _ in policies {
        print!("┴───────────");
    }
    println!("┘\n");

    Ok(())
}
