//! Benchmark suite
//!
//! Times complete circuit executions (state evolution plus sampling)
//! through the evolution engine and aggregates throughput statistics.

use qevo_core::{Circuit, Counts, QevoResult};
use qevo_engine::{counts_entropy, EvolutionEngine};
use qevo_noise::NoiseModel;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::generators::CircuitGenerator;

/// Single benchmark result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Benchmark name
    pub name: String,

    /// Number of qubits
    pub qubits: usize,

    /// Number of operations in the circuit
    pub ops: usize,

    /// Circuit depth
    pub depth: usize,

    /// Shots collected
    pub shots: u64,

    /// Backend that ran the circuit
    pub backend: String,

    /// Wall-clock time (milliseconds)
    pub time_ms: f64,

    /// Sampling throughput (shots per second)
    pub shots_per_second: f64,

    /// Distinct outcomes observed
    pub distinct_outcomes: usize,

    /// Shannon entropy of the outcome distribution (bits)
    pub entropy_bits: f64,
}

impl BenchmarkResult {
    /// Build a result from one timed run
    pub fn from_run(
        name: &str,
        circuit: &Circuit,
        backend: &str,
        shots: u64,
        counts: &Counts,
        time_ms: f64,
    ) -> QevoResult<Self> {
        let shots_per_second = if time_ms > 0.0 {
            shots as f64 * 1000.0 / time_ms
        } else {
            0.0
        };
        Ok(Self {
            name: name.to_string(),
            qubits: circuit.num_qubits(),
            ops: circuit.len(),
            depth: circuit.depth(),
            shots,
            backend: backend.to_string(),
            time_ms,
            shots_per_second,
            distinct_outcomes: counts.len(),
            entropy_bits: counts_entropy(counts)?,
        })
    }
}

// ============================================================================
// BenchSuite
// ============================================================================

/// Benchmark suite
pub struct BenchSuite {
    /// Base seed for reproducibility
    seed: u64,

    /// Shots per benchmark
    shots: u64,

    /// Results
    results: Vec<BenchmarkResult>,

    /// Verbose output
    verbose: bool,
}

impl BenchSuite {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create new benchmark suite
    pub fn new() -> Self {
        Self {
            seed: 42,
            shots: 4096,
            results: Vec::new(),
            verbose: false,
        }
    }

    /// Create with seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            shots: 4096,
            results: Vec::new(),
            verbose: false,
        }
    }

    /// Set shots per benchmark
    pub fn with_shots(mut self, shots: u64) -> Self {
        self.shots = shots;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    // ========================================================================
    // Individual Benchmarks
    // ========================================================================

    /// Time one circuit end to end
    pub fn bench_circuit(&mut self, name: &str, circuit: &Circuit) -> QevoResult<BenchmarkResult> {
        if self.verbose {
            println!(
                "Running benchmark: {} ({}Q, {} ops)",
                name,
                circuit.num_qubits(),
                circuit.len()
            );
        }

        let engine = EvolutionEngine::with_defaults().with_seed(self.seed);
        let start = Instant::now();
        let counts = engine.run_shots(circuit, self.shots)?;
        let time_ms = start.elapsed().as_secs_f64() * 1000.0;

        let result = BenchmarkResult::from_run(
            name,
            circuit,
            engine.backend().name(),
            self.shots,
            &counts,
            time_ms,
        )?;
        self.results.push(result.clone());
        Ok(result)
    }

    /// Benchmark GHZ preparation and sampling
    pub fn bench_ghz(&mut self, qubits: usize) -> QevoResult<BenchmarkResult> {
        let circuit = CircuitGenerator::with_seed(self.seed).ghz(qubits);
        self.bench_circuit(&format!("ghz_{}q", qubits), &circuit)
    }

    /// Benchmark the QFT
    pub fn bench_qft(&mut self, qubits: usize) -> QevoResult<BenchmarkResult> {
        let circuit = CircuitGenerator::with_seed(self.seed).qft(qubits);
        self.bench_circuit(&format!("qft_{}q", qubits), &circuit)
    }

    /// Benchmark a layered random circuit
    pub fn bench_random(&mut self, qubits: usize, depth: usize) -> QevoResult<BenchmarkResult> {
        let circuit = CircuitGenerator::with_seed(self.seed).random(qubits, depth);
        self.bench_circuit(&format!("random_{}q_d{}", qubits, depth), &circuit)
    }

    /// Benchmark GHZ under depolarizing noise (density-matrix path)
    pub fn bench_noisy_ghz(&mut self, qubits: usize, noise: f64) -> QevoResult<BenchmarkResult> {
        let circuit = CircuitGenerator::with_seed(self.seed).ghz(qubits);
        let noisy = NoiseModel::depolarizing(noise, noise)?.apply(&circuit)?;
        self.bench_circuit(&format!("noisy_ghz_{}q_p{:.3}", qubits, noise), &noisy)
    }

    // ========================================================================
    // Benchmark Suites
    // ========================================================================

    /// Run qubit scaling benchmark (GHZ circuits)
    pub fn run_qubit_scaling(&mut self, max_qubits: usize) -> QevoResult<Vec<BenchmarkResult>> {
        if self.verbose {
            println!("=== Qubit Scaling Benchmark ===");
        }

        let mut results = Vec::new();
        for n in 2..=max_qubits {
            results.push(self.bench_ghz(n)?);
        }
        Ok(results)
    }

    /// Run depth scaling benchmark (random layered circuits)
    pub fn run_depth_scaling(
        &mut self,
        qubits: usize,
        depths: &[usize],
    ) -> QevoResult<Vec<BenchmarkResult>> {
        if self.verbose {
            println!("=== Depth Scaling Benchmark ===");
        }

        let mut results = Vec::new();
        for &depth in depths {
            results.push(self.bench_random(qubits, depth)?);
        }
        Ok(results)
    }

    /// Run noise scaling benchmark (density-matrix GHZ)
    pub fn run_noise_scaling(
        &mut self,
        qubits: usize,
        noise_levels: &[f64],
    ) -> QevoResult<Vec<BenchmarkResult>> {
        if self.verbose {
            println!("=== Noise Scaling Benchmark ===");
        }

        let mut results = Vec::new();
        for &noise in noise_levels {
            results.push(self.bench_noisy_ghz(qubits, noise)?);
        }
        Ok(results)
    }

    /// Run full benchmark suite
    pub fn run_all(&mut self) -> QevoResult<Vec<BenchmarkResult>> {
        if self.verbose {
            println!("=== Running Full Benchmark Suite ===");
        }

        let mut all_results = Vec::new();
        all_results.extend(self.run_qubit_scaling(8)?);
        all_results.extend(self.run_depth_scaling(5, &[1, 2, 4, 8])?);
        all_results.extend(self.run_noise_scaling(4, &[0.01, 0.05, 0.1])?);
        all_results.push(self.bench_qft(6)?);
        Ok(all_results)
    }

    /// Run quick benchmark (for testing)
    pub fn run_quick(&mut self) -> QevoResult<Vec<BenchmarkResult>> {
        if self.verbose {
            println!("=== Running Quick Benchmark ===");
        }

        Ok(vec![self.bench_ghz(3)?, self.bench_qft(3)?])
    }

    // ========================================================================
    // Results
    // ========================================================================

    /// Get all results
    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    /// Clear results
    pub fn clear(&mut self) {
        self.results.clear();
    }

    /// Get statistics
    pub fn statistics(&self) -> BenchmarkStatistics {
        BenchmarkStatistics::from_results(&self.results)
    }
}

impl Default for BenchSuite {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Benchmark statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkStatistics {
    /// Number of benchmarks
    pub count: usize,

    /// Total execution time (ms)
    pub total_time_ms: f64,

    /// Average execution time (ms)
    pub avg_time_ms: f64,

    /// Slowest benchmark time (ms)
    pub max_time_ms: f64,

    /// Average sampling throughput (shots per second)
    pub avg_shots_per_second: f64,

    /// Total shots across all benchmarks
    pub total_shots: u64,
}

impl BenchmarkStatistics {
    /// Compute statistics from results
    pub fn from_results(results: &[BenchmarkResult]) -> Self {
        if results.is_empty() {
            return Self {
                count: 0,
                total_time_ms: 0.0,
                avg_time_ms: 0.0,
                max_time_ms: 0.0,
                avg_shots_per_second: 0.0,
                total_shots: 0,
            };
        }

        let count = results.len();
        let total_time_ms: f64 = results.iter().map(|r| r.time_ms).sum();
        let max_time_ms = results.iter().map(|r| r.time_ms).fold(0.0, f64::max);
        let avg_shots_per_second =
            results.iter().map(|r| r.shots_per_second).sum::<f64>() / count as f64;

        Self {
            count,
            total_time_ms,
            avg_time_ms: total_time_ms / count as f64,
            max_time_ms,
            avg_shots_per_second,
            total_shots: results.iter().map(|r| r.shots).sum(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_suite_new() {
        let suite = BenchSuite::new();
        assert!(suite.results().is_empty());
    }

    #[test]
    fn test_bench_ghz() {
        let mut suite = BenchSuite::with_seed(42).with_shots(256);
        let result = suite.bench_ghz(3).unwrap();

        assert_eq!(result.name, "ghz_3q");
        assert_eq!(result.qubits, 3);
        assert_eq!(result.ops, 3);
        assert_eq!(result.shots, 256);
        // GHZ samples only the two correlated outcomes
        assert_eq!(result.distinct_outcomes, 2);
        assert!(result.entropy_bits > 0.8 && result.entropy_bits < 1.2);
    }

    #[test]
    fn test_bench_noisy_ghz_runs_density() {
        let mut suite = BenchSuite::with_seed(42).with_shots(128);
        let result = suite.bench_noisy_ghz(2, 0.05).unwrap();

        assert!(result.name.starts_with("noisy_ghz_2q"));
        assert_eq!(suite.results().len(), 1);
    }

    #[test]
    fn test_run_quick() {
        let mut suite = BenchSuite::with_seed(42).with_shots(128);
        let results = suite.run_quick().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(suite.results().len(), 2);
    }

    #[test]
    fn test_qubit_scaling() {
        let mut suite = BenchSuite::with_seed(42).with_shots(64);
        let results = suite.run_qubit_scaling(4).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].qubits, 2);
        assert_eq!(results[2].qubits, 4);
    }

    #[test]
    fn test_statistics() {
        let mut suite = BenchSuite::with_seed(42).with_shots(64);
        suite.bench_ghz(2).unwrap();
        suite.bench_ghz(3).unwrap();

        let stats = suite.statistics();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.total_shots, 128);
        assert!(stats.total_time_ms >= stats.max_time_ms);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = BenchSuite::new().statistics();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total_shots, 0);
    }

    #[test]
    fn test_result_serializes() {
        let mut suite = BenchSuite::with_seed(42).with_shots(64);
        let result = suite.bench_ghz(2).unwrap();

        let json = serde_json::to_string(&result).unwrap();
        let back: BenchmarkResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, result.name);
        assert_eq!(back.shots, result.shots);
    }

    #[test]
    fn test_clear() {
        let mut suite = BenchSuite::with_seed(42).with_shots(64);
        suite.bench_ghz(2).unwrap();
        assert_eq!(suite.results().len(), 1);
        suite.clear();
        assert!(suite.results().is_empty());
    }
}
