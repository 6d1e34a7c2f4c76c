use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::fmt::SubscriberBuilder;
use tsp_bnb::prelude::*;

mod input;
mod output;
mod provenance;

use output::SolveOutput;
use provenance::Provenance;

/// Largest instance `verify` will enumerate exhaustively.
const VERIFY_MAX_N: usize = 10;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Exact travelling-salesman solver (Little's branch-and-bound)")]
struct Cmd {
    /// Optional free-form tag; propagated to logs and provenance sidecars
    #[arg(long, global = true)]
    tag: Option<String>,

    /// Log filter level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Solve a cost matrix (.json or .csv) and report every optimal tour
    Solve {
        #[arg(long)]
        input: PathBuf,
        /// Write the result here (plus a provenance sidecar) instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        node_limit: Option<u64>,
        #[arg(long)]
        time_limit_ms: Option<u64>,
        /// Branch on any zero cell instead of only cells touching the current chain
        #[arg(long)]
        textbook: bool,
    },
    /// Write a seeded random instance as JSON
    Gen {
        #[arg(long)]
        n: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        index: u64,
        #[arg(long, default_value_t = 100)]
        max_cost: u64,
        #[arg(long)]
        symmetric: bool,
        /// Fraction of off-diagonal edges to forbid
        #[arg(long, default_value_t = 0.0)]
        forbid: f64,
        #[arg(long)]
        out: PathBuf,
    },
    /// Cross-check the solver against exhaustive enumeration (N <= 10)
    Verify {
        #[arg(long)]
        input: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(cmd.log_level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Solve {
            input,
            out,
            node_limit,
            time_limit_ms,
            textbook,
        } => {
            let limits = Limits {
                node_limit,
                time_limit_ms,
            };
            solve_cmd(&input, out.as_deref(), limits, !textbook, cmd.tag)
        }
        Action::Gen {
            n,
            seed,
            index,
            max_cost,
            symmetric,
            forbid,
            out,
        } => {
            let cfg = RandomMatrixCfg {
                n,
                max_cost,
                symmetric,
                forbidden_frac: forbid,
            };
            gen_cmd(cfg, ReplayToken { seed, index }, &out, cmd.tag)
        }
        Action::Verify { input } => verify_cmd(&input),
        Action::Report => report_cmd(cmd.tag),
    }
}

/// Search budgets as given on the command line.
#[derive(Clone, Copy, Debug, Default)]
struct Limits {
    node_limit: Option<u64>,
    time_limit_ms: Option<u64>,
}

fn solve_cmd(
    input: &Path,
    out: Option<&Path>,
    limits: Limits,
    frontier_only: bool,
    tag: Option<String>,
) -> Result<()> {
    let cfg = SearchCfg {
        frontier_only,
        node_limit: limits.node_limit,
        time_limit: limits.time_limit_ms.map(Duration::from_millis),
    };
    let matrix = input::read_matrix(input)?;
    let n = matrix.size();
    tracing::info!(input = %input.display(), n, frontier_only = cfg.frontier_only, tag = ?tag, "solve");

    let started = Instant::now();
    let report = solve_with_cfg(&matrix, cfg);
    let elapsed_ms = started.elapsed().as_millis();
    tracing::info!(
        status = report.status.as_str(),
        cost = ?report.best_cost(),
        tours = report.tours.len(),
        nodes = report.stats.nodes_expanded,
        elapsed_ms,
        "solved"
    );
    if report.status == SearchStatus::BudgetExhausted {
        tracing::warn!("search budget exhausted; tours are not proven optimal");
    }

    let doc = serde_json::to_vec_pretty(&SolveOutput::new(n, &report, elapsed_ms))?;
    let Some(out) = out else {
        println!("{}", String::from_utf8_lossy(&doc));
        return Ok(());
    };
    ensure_parent(out)?;
    fs::write(out, &doc).with_context(|| format!("writing {}", out.display()))?;
    let params = json!({
        "command": "solve",
        "input": input.to_string_lossy(),
        "frontier_only": cfg.frontier_only,
        "node_limit": limits.node_limit,
        "time_limit_ms": limits.time_limit_ms,
    });
    let sidecar = Provenance::capture(params, tag).write_beside(out)?;
    tracing::info!(out = %out.display(), sidecar = %sidecar.display(), "wrote");
    Ok(())
}

fn gen_cmd(cfg: RandomMatrixCfg, tok: ReplayToken, out: &Path, tag: Option<String>) -> Result<()> {
    if cfg.n < 2 {
        bail!("--n must be at least 2, got {}", cfg.n);
    }
    let matrix = draw_cost_matrix(cfg, tok);
    input::write_json_matrix(out, &matrix)?;
    let params = json!({
        "command": "gen",
        "n": cfg.n,
        "seed": tok.seed,
        "index": tok.index,
        "max_cost": cfg.max_cost,
        "symmetric": cfg.symmetric,
        "forbidden_frac": cfg.forbidden_frac,
    });
    let sidecar = Provenance::capture(params, tag).write_beside(out)?;
    tracing::info!(out = %out.display(), sidecar = %sidecar.display(), n = cfg.n, "generated");
    Ok(())
}

fn verify_cmd(input: &Path) -> Result<()> {
    let matrix = input::read_matrix(input)?;
    let n = matrix.size();
    if n > VERIFY_MAX_N {
        bail!("verify enumerates all tours; N = {n} exceeds {VERIFY_MAX_N}");
    }
    let report = solve(&matrix);
    let reference = brute_force(&matrix);
    let found = canonical_set(&report.tours);
    let expected = canonical_set(&reference);
    let reference_cost = reference.first().map(|t| t.cost);
    tracing::info!(
        n,
        cost = ?report.best_cost(),
        reference_cost = ?reference_cost,
        tours = found.len(),
        reference_tours = expected.len(),
        "verify"
    );
    if report.best_cost() != reference_cost || found != expected {
        bail!(
            "mismatch: branch-and-bound found {} tour(s) of cost {:?}, enumeration found {} of cost {:?}",
            found.len(),
            report.best_cost(),
            expected.len(),
            reference_cost
        );
    }
    println!(
        "{}",
        json!({ "n": n, "cost": reference_cost, "tours": expected.len(), "agree": true })
    );
    Ok(())
}

fn report_cmd(tag: Option<String>) -> Result<()> {
    let prov = Provenance::capture(json!({}), tag);
    println!("{}", serde_json::to_string_pretty(&prov)?);
    Ok(())
}

fn canonical_set(tours: &[Tour]) -> BTreeSet<Vec<usize>> {
    tours.iter().map(Tour::canonical).collect()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}
