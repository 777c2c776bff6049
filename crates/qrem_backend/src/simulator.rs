//! Simulator backend for QREM
//!
//! Gantree: L3_Backend → SimulatorBackend
//!
//! Reference collaborator for calibration and tests: ideal state-vector
//! evolution, shot sampling, then classical readout flips drawn from a
//! [`ReadoutNoise`]. Gates are noiseless. Every qubit of the circuit is read
//! out, whether or not the circuit contains explicit measurements.

use crate::execution::{Backend, ExecutionMetadata, ExecutionResult};
use num_complex::Complex64;
use qrem_core::{limits, BasisIndexer, BitOrder, Circuit, Counts, Gate, QremError, QremResult};
use qrem_noise::ReadoutNoise;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::f64::consts::FRAC_1_SQRT_2;
use std::time::{Duration, Instant};

/// Simulator backend with readout noise
/// Gantree: SimulatorBackend // 시뮬레이터 구현
#[derive(Debug, Clone)]
pub struct SimulatorBackend {
    /// Backend name
    name: String,

    /// Number of qubits
    num_qubits: usize,

    /// Readout noise model
    noise: ReadoutNoise,

    /// Label convention of returned counts
    bit_order: BitOrder,

    /// Random seed
    seed: Option<u64>,

    /// Artificial per-call latency
    latency: Option<Duration>,

    /// Shot ceiling
    max_shots: u64,
}

impl SimulatorBackend {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create new simulator backend
    pub fn new(num_qubits: usize, noise: ReadoutNoise) -> Self {
        Self {
            name: "qrem_simulator".to_string(),
            num_qubits,
            noise,
            bit_order: BitOrder::MsbFirst,
            seed: None,
            latency: None,
            max_shots: limits::DEFAULT_MAX_SHOTS,
        }
    }

    /// Create ideal (noiseless) simulator
    pub fn ideal(num_qubits: usize) -> Self {
        Self::new(num_qubits, ReadoutNoise::ideal())
    }

    /// Create with independent symmetric bit flips
    pub fn with_bit_flip(num_qubits: usize, p: f64) -> QremResult<Self> {
        Ok(Self::new(num_qubits, ReadoutNoise::symmetric(p)?))
    }

    /// Create IBM-typical readout simulator
    pub fn ibm_typical(num_qubits: usize) -> Self {
        Self::new(num_qubits, ReadoutNoise::ibm_typical())
    }

    /// Set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set label convention
    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Sleep this long inside every execute call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Set shot ceiling
    pub fn with_max_shots(mut self, max_shots: u64) -> Self {
        self.max_shots = max_shots;
        self
    }

    /// Set backend name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Readout noise model
    pub fn noise(&self) -> &ReadoutNoise {
        &self.noise
    }

    // ========================================================================
    // Simulation
    // ========================================================================

    /// Seed for one call: the configured seed mixed with the circuit content,
    /// so distinct calibration circuits draw independent streams regardless
    /// of call order.
    fn rng_for(&self, circuit: &Circuit) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ fingerprint(&circuit.to_qasm())),
            None => StdRng::from_entropy(),
        }
    }

    /// Evolve |0...0> through the circuit
    fn evolve(&self, circuit: &Circuit) -> Vec<Complex64> {
        let n = circuit.num_qubits();
        let mut state = vec![Complex64::new(0.0, 0.0); 1 << n];
        state[0] = Complex64::new(1.0, 0.0);

        for gate in circuit.gates() {
            apply_gate(&mut state, gate);
        }
        state
    }

    /// Sample `shots` outcomes and apply readout flips
    fn sample(&self, state: &[Complex64], n: usize, shots: u64, rng: &mut StdRng) -> Vec<usize> {
        let mut cumulative = Vec::with_capacity(state.len());
        let mut acc = 0.0;
        for amp in state {
            acc += amp.norm_sqr();
            cumulative.push(acc);
        }

        let last = state.len() - 1;
        (0..shots)
            .map(|_| {
                let r: f64 = rng.gen::<f64>() * acc;
                let outcome = cumulative.partition_point(|&c| c <= r).min(last);
                self.apply_readout_error(outcome, n, rng)
            })
            .collect()
    }

    /// Flip each measured bit independently
    fn apply_readout_error(&self, outcome: usize, n: usize, rng: &mut StdRng) -> usize {
        if self.noise.is_ideal() {
            return outcome;
        }
        let mut result = outcome;
        for q in 0..n {
            let bit = (outcome >> q) & 1 == 1;
            let p = self.noise.error_for(q).flip_probability(bit);
            if p > 0.0 && rng.gen::<f64>() < p {
                result ^= 1usize << q;
            }
        }
        result
    }
}

impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn execute(&self, circuit: &Circuit, shots: u64) -> QremResult<ExecutionResult> {
        let n = circuit.num_qubits();
        if n > self.num_qubits || n > limits::MAX_SIMULATOR_QUBITS {
            return Err(QremError::QubitOutOfRange {
                qubit: n,
                max: self.num_qubits.min(limits::MAX_SIMULATOR_QUBITS),
            });
        }
        if shots == 0 || shots > self.max_shots {
            return Err(QremError::InvalidShotCount {
                shots,
                max: self.max_shots,
            });
        }

        let started = Instant::now();
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let indexer = BasisIndexer::new(n, self.bit_order)?;
        let mut rng = self.rng_for(circuit);
        let state = self.evolve(circuit);

        let mut counts: Counts = HashMap::new();
        for outcome in self.sample(&state, n, shots, &mut rng) {
            *counts.entry(indexer.label(outcome)?).or_insert(0) += 1;
        }

        log::trace!(
            "{}: executed {} ({} shots, {} outcomes)",
            self.name,
            circuit.name().unwrap_or("circuit"),
            shots,
            counts.len()
        );

        Ok(ExecutionResult {
            counts,
            shots,
            metadata: ExecutionMetadata {
                backend: self.name.clone(),
                simulated: true,
                seed: self.seed,
                bit_order: self.bit_order,
                execution_time_ms: Some(started.elapsed().as_millis() as u64),
                ..Default::default()
            },
        })
    }

    fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    fn is_simulator(&self) -> bool {
        true
    }

    fn max_shots(&self) -> u64 {
        self.max_shots
    }
}

/// FNV-1a over the circuit text
fn fingerprint(text: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in text.bytes() {
        hash = (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

// ============================================================================
// Gate Application
// ============================================================================

fn apply_gate(state: &mut [Complex64], gate: &Gate) {
    let i = Complex64::i();
    match gate {
        Gate::H(q) => {
            let r = FRAC_1_SQRT_2;
            apply_single(state, *q, |a, b| ((a + b) * r, (a - b) * r))
        }
        Gate::X(q) => apply_single(state, *q, |a, b| (b, a)),
        Gate::Y(q) => apply_single(state, *q, |a, b| (-i * b, i * a)),
        Gate::Z(q) => apply_single(state, *q, |a, b| (a, -b)),
        Gate::S(q) => apply_single(state, *q, |a, b| (a, i * b)),
        Gate::Sdg(q) => apply_single(state, *q, |a, b| (a, -i * b)),
        Gate::Rx(q, angle) => {
            let (c, s) = ((angle / 2.0).cos(), (angle / 2.0).sin());
            apply_single(state, *q, |a, b| (a * c - i * s * b, b * c - i * s * a))
        }
        Gate::Ry(q, angle) => {
            let (c, s) = ((angle / 2.0).cos(), (angle / 2.0).sin());
            apply_single(state, *q, |a, b| (a * c - b * s, a * s + b * c))
        }
        Gate::Rz(q, angle) => {
            let neg = Complex64::from_polar(1.0, -angle / 2.0);
            let pos = Complex64::from_polar(1.0, angle / 2.0);
            apply_single(state, *q, |a, b| (a * neg, b * pos))
        }
        Gate::Cnot(control, target) => {
            let (cm, tm) = (1usize << control, 1usize << target);
            for idx in 0..state.len() {
                if idx & cm != 0 && idx & tm == 0 {
                    state.swap(idx, idx | tm);
                }
            }
        }
        Gate::Cz(a, b) => {
            let mask = (1usize << a) | (1usize << b);
            for (idx, amp) in state.iter_mut().enumerate() {
                if idx & mask == mask {
                    *amp = -*amp;
                }
            }
        }
        Gate::Swap(a, b) => {
            let (ma, mb) = (1usize << a, 1usize << b);
            for idx in 0..state.len() {
                if idx & ma != 0 && idx & mb == 0 {
                    state.swap(idx, idx ^ ma ^ mb);
                }
            }
        }
        Gate::Measure(_) | Gate::MeasureAll | Gate::Barrier(_) => {}
    }
}

fn apply_single<F>(state: &mut [Complex64], q: usize, f: F)
where
    F: Fn(Complex64, Complex64) -> (Complex64, Complex64),
{
    let mask = 1usize << q;
    for idx in 0..state.len() {
        if idx & mask == 0 {
            let j = idx | mask;
            let (a, b) = f(state[idx], state[j]);
            state[idx] = a;
            state[j] = b;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qrem_core::CircuitBuilder;
    use std::f64::consts::PI;

    #[test]
    fn test_basis_state_ideal() {
        let backend = SimulatorBackend::ideal(3).with_seed(42);
        // 6 = qubits 1 and 2
        let circuit = CircuitBuilder::new(3)
            .prepare_basis_state(6)
            .measure_all()
            .build();

        let result = backend.execute(&circuit, 500).unwrap();
        assert_eq!(result.counts.len(), 1);
        assert_eq!(result.counts["110"], 500);
    }

    #[test]
    fn test_basis_state_lsb_first_labels() {
        let backend = SimulatorBackend::ideal(3)
            .with_seed(42)
            .with_bit_order(BitOrder::LsbFirst);
        let circuit = CircuitBuilder::new(3).prepare_basis_state(6).build();

        let result = backend.execute(&circuit, 100).unwrap();
        assert_eq!(result.counts["011"], 100);
        assert_eq!(result.metadata.bit_order, BitOrder::LsbFirst);
    }

    #[test]
    fn test_bell_state() {
        let backend = SimulatorBackend::ideal(2).with_seed(42);
        let circuit = CircuitBuilder::new(2).bell_pair(0, 1).measure_all().build();

        let result = backend.execute(&circuit, 4000).unwrap();
        let p00 = result.probability("00");
        let p11 = result.probability("11");

        assert!((p00 - 0.5).abs() < 0.05, "P(00) = {}", p00);
        assert!((p11 - 0.5).abs() < 0.05, "P(11) = {}", p11);
        assert!(result.is_consistent());
    }

    #[test]
    fn test_rotation_gates() {
        let backend = SimulatorBackend::ideal(1).with_seed(7);

        for circuit in [
            CircuitBuilder::new(1).rx(0, PI).build(),
            CircuitBuilder::new(1).ry(0, PI).build(),
            CircuitBuilder::new(1).h(0).rz(0, PI).h(0).build(),
            CircuitBuilder::new(1).h(0).s(0).s(0).h(0).build(),
            CircuitBuilder::new(1).y(0).build(),
        ] {
            let result = backend.execute(&circuit, 200).unwrap();
            assert!(result.probability("1") > 0.99, "{}", circuit);
        }
    }

    #[test]
    fn test_two_qubit_gates() {
        let backend = SimulatorBackend::ideal(2).with_seed(1);

        // X(0) then SWAP moves the excitation to qubit 1
        let swapped = CircuitBuilder::new(2).x(0).swap(0, 1).build();
        assert_eq!(backend.execute(&swapped, 50).unwrap().counts["10"], 50);

        // H-CZ-H on the target acts as CNOT
        let cz_as_cx = CircuitBuilder::new(2).x(0).h(1).cz(0, 1).h(1).build();
        assert_eq!(backend.execute(&cz_as_cx, 50).unwrap().counts["11"], 50);
    }

    #[test]
    fn test_readout_flips_rate() {
        let backend = SimulatorBackend::with_bit_flip(1, 0.1)
            .unwrap()
            .with_seed(3);
        let circuit = CircuitBuilder::new(1).measure_all().build();

        let result = backend.execute(&circuit, 20_000).unwrap();
        let p1 = result.probability("1");
        assert!((p1 - 0.1).abs() < 0.01, "P(1) = {}", p1);
    }

    #[test]
    fn test_asymmetric_readout() {
        let noise = ReadoutNoise::asymmetric(0.0, 0.2).unwrap();
        let backend = SimulatorBackend::new(1, noise).with_seed(11);

        let zero = CircuitBuilder::new(1).measure_all().build();
        assert_eq!(backend.execute(&zero, 1000).unwrap().counts["0"], 1000);

        let one = CircuitBuilder::new(1).x(0).measure_all().build();
        let p0 = backend.execute(&one, 20_000).unwrap().probability("0");
        assert!((p0 - 0.2).abs() < 0.015, "P(0|1) = {}", p0);
    }

    #[test]
    fn test_qubit_limit() {
        let backend = SimulatorBackend::ideal(3);
        let circuit = CircuitBuilder::new(5).build();
        assert!(matches!(
            backend.execute(&circuit, 100),
            Err(QremError::QubitOutOfRange { qubit: 5, max: 3 })
        ));
    }

    #[test]
    fn test_shot_limits() {
        let backend = SimulatorBackend::ideal(1).with_max_shots(1000);
        let circuit = CircuitBuilder::new(1).build();
        assert!(matches!(
            backend.execute(&circuit, 0),
            Err(QremError::InvalidShotCount { shots: 0, .. })
        ));
        assert!(backend.execute(&circuit, 1001).is_err());
        assert!(backend.execute(&circuit, 1000).is_ok());
    }

    #[test]
    fn test_seed_reproducibility() {
        let backend1 = SimulatorBackend::with_bit_flip(3, 0.05)
            .unwrap()
            .with_seed(42);
        let backend2 = SimulatorBackend::with_bit_flip(3, 0.05)
            .unwrap()
            .with_seed(42);
        let circuit = CircuitBuilder::new(3).ghz().measure_all().build();

        let result1 = backend1.execute(&circuit, 300).unwrap();
        let result2 = backend2.execute(&circuit, 300).unwrap();
        assert_eq!(result1.counts, result2.counts);
    }

    #[test]
    fn test_distinct_circuits_get_distinct_streams() {
        assert_ne!(fingerprint("x q[0];"), fingerprint("x q[1];"));
    }
}
