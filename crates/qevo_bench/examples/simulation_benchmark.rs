//! QEVO Simulation Benchmark
//!
//! Times state-vector and density-matrix execution across qubit count,
//! circuit depth, and noise strength, then prints a combined report.

use qevo_bench::{BenchSuite, ReportFormat, Reporter};

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║                   QEVO Simulation Benchmark Report                   ║");
    println!("╚══════════════════════════════════════════════════════════════════════╝\n");

    let shots = 4096u64;
    let seed = 42u64;

    println!("Configuration:");
    println!("  • Shots per circuit: {}", shots);
    println!("  • Random seed: {}", seed);
    println!();

    let mut suite = BenchSuite::with_seed(seed).with_shots(shots);

    // =========================================================================
    // Benchmark 1: Qubit Scaling (GHZ, state vector)
    // =========================================================================
    println!("═══════════════════════════════════════════════════════════════════════");
    println!("  BENCHMARK 1: Qubit Scaling (GHZ state vector)");
    println!("═══════════════════════════════════════════════════════════════════════\n");

    println!("┌──────────┬──────────┬──────────┬────────────┬──────────┐");
    println!("│ Qubits   │ Ops      │ Time(ms) │ Shots/s    │ Outcomes │");
    println!("├──────────┼──────────┼──────────┼────────────┼──────────┤");

    let qubit_results = suite
        .run_qubit_scaling(10)
        .expect("qubit scaling benchmark failed");
    for r in &qubit_results {
        println!(
            "│ {:8} │ {:8} │ {:8.1} │ {:10.0} │ {:8} │",
            r.qubits, r.ops, r.time_ms, r.shots_per_second, r.distinct_outcomes
        );
    }

    println!("└──────────┴──────────┴──────────┴────────────┴──────────┘\n");

    // =========================================================================
    // Benchmark 2: Depth Scaling (random layered circuits)
    // =========================================================================
    println!("═══════════════════════════════════════════════════════════════════════");
    println!("  BENCHMARK 2: Depth Scaling (6-qubit random circuits)");
    println!("═══════════════════════════════════════════════════════════════════════\n");

    println!("┌──────────┬──────────┬──────────┬────────────┬──────────┐");
    println!("│ Depth    │ Ops      │ Time(ms) │ Shots/s    │ Entropy  │");
    println!("├──────────┼──────────┼──────────┼────────────┼──────────┤");

    let depth_results = suite
        .run_depth_scaling(6, &[1, 2, 4, 8, 16])
        .expect("depth scaling benchmark failed");
    for r in &depth_results {
        println!(
            "│ {:8} │ {:8} │ {:8.1} │ {:10.0} │ {:8.3} │",
            r.depth, r.ops, r.time_ms, r.shots_per_second, r.entropy_bits
        );
    }

    println!("└──────────┴──────────┴──────────┴────────────┴──────────┘\n");

    // =========================================================================
    // Benchmark 3: Noise Scaling (GHZ, density matrix)
    // =========================================================================
    println!("═══════════════════════════════════════════════════════════════════════");
    println!("  BENCHMARK 3: Noise Scaling (4-qubit GHZ, density matrix)");
    println!("═══════════════════════════════════════════════════════════════════════\n");

    println!("┌──────────────────────┬──────────┬──────────┬──────────┐");
    println!("│ Benchmark            │ Time(ms) │ Outcomes │ Entropy  │");
    println!("├──────────────────────┼──────────┼──────────┼──────────┤");

    let noise_results = suite
        .run_noise_scaling(4, &[0.0, 0.01, 0.05, 0.1])
        .expect("noise scaling benchmark failed");
    for r in &noise_results {
        println!(
            "│ {:20} │ {:8.1} │ {:8} │ {:8.3} │",
            r.name, r.time_ms, r.distinct_outcomes, r.entropy_bits
        );
    }

    println!("└──────────────────────┴──────────┴──────────┴──────────┘\n");

    // =========================================================================
    // Benchmark 4: QFT
    // =========================================================================
    println!("═══════════════════════════════════════════════════════════════════════");
    println!("  BENCHMARK 4: Quantum Fourier Transform");
    println!("═══════════════════════════════════════════════════════════════════════\n");

    for qubits in [4, 6, 8] {
        let r = suite.bench_qft(qubits).expect("QFT benchmark failed");
        println!(
            "  QFT {}q: {} ops, {:.1} ms, entropy {:.2} bits (uniform = {} bits)",
            r.qubits, r.ops, r.time_ms, r.entropy_bits, r.qubits
        );
    }
    println!();

    // =========================================================================
    // Summary
    // =========================================================================
    println!("═══════════════════════════════════════════════════════════════════════");
    println!("  SUMMARY");
    println!("═══════════════════════════════════════════════════════════════════════\n");

    println!("{}", Reporter::report(suite.results(), ReportFormat::Text));

    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║                         Benchmark Complete                           ║");
    println!("╚══════════════════════════════════════════════════════════════════════╝");
}
