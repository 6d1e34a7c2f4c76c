//! Timing probe: solve a handful of random instances and print one line each.
//!
//! Usage: `cargo run --release -p tsp-bnb --example random_instances -- [n] [count]`

use std::time::Instant;

use tsp_bnb::prelude::*;

fn main() {
    let mut args = std::env::args().skip(1);
    let n: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(12);
    let count: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);

    let cfg = RandomMatrixCfg {
        n,
        ..RandomMatrixCfg::default()
    };
    for index in 0..count {
        let m = draw_cost_matrix(cfg, ReplayToken { seed: 2024, index });
        let start = Instant::now();
        let report = solve(&m);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1e3;
        println!(
            "n={} index={} status={} cost={:?} tours={} nodes={} pruned={} ms={:.2}",
            n,
            index,
            report.status.as_str(),
            report.best_cost(),
            report.tours.len(),
            report.stats.nodes_expanded,
            report.stats.branches_pruned,
            elapsed_ms
        );
    }
}
