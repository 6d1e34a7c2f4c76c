//! JSON document printed (or written) by `solve`.

use serde::Serialize;
use tsp_bnb::bnb::SearchStats;
use tsp_bnb::SearchReport;

#[derive(Debug, Serialize)]
pub struct SolveOutput {
    pub n: usize,
    pub status: &'static str,
    pub cost: Option<u64>,
    /// One entry per optimal tour, cities labelled from 1.
    pub tours: Vec<Vec<usize>>,
    pub stats: StatsOutput,
    pub elapsed_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    pub nodes_expanded: u64,
    pub branches_pruned: u64,
    pub infeasible_branches: u64,
    pub right_branches_pushed: u64,
    pub solutions_recorded: u64,
    pub max_stack_depth: usize,
}

impl From<SearchStats> for StatsOutput {
    fn from(s: SearchStats) -> Self {
        Self {
            nodes_expanded: s.nodes_expanded,
            branches_pruned: s.branches_pruned,
            infeasible_branches: s.infeasible_branches,
            right_branches_pushed: s.right_branches_pushed,
            solutions_recorded: s.solutions_recorded,
            max_stack_depth: s.max_stack_depth,
        }
    }
}

impl SolveOutput {
    pub fn new(n: usize, report: &SearchReport, elapsed_ms: u128) -> Self {
        Self {
            n,
            status: report.status.as_str(),
            cost: report.best_cost(),
            tours: report.tours.iter().map(|t| t.labels()).collect(),
            stats: report.stats.into(),
            elapsed_ms,
        }
    }
}
