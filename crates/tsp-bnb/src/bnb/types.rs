//! Data types for the branch-and-bound search and its results.
//!
//! Kept small and explicit to make `stage` and `search` easy to read.

use std::time::Duration;

/// Offset added to 0-based city indices when presenting tours.
pub const CITY_LABEL_BASE: usize = 1;

/// Directed edge `row → col`, a cell of the cost matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub row: usize,
    pub col: usize,
}

impl Edge {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Branching decision: the edge to include and the regret of excluding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewVertex {
    pub edge: Edge,
    pub cost: u64,
}

/// Complete tour recorded at a terminal node.
///
/// `lower_bound` is the bound the tour was recorded under; the filter keeps the
/// solutions sharing the smallest one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub lower_bound: u64,
    pub cost: u64,
    pub path: Vec<usize>,
}

/// Optimal tour handed back to callers (0-based cities).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tour {
    pub cost: u64,
    pub cities: Vec<usize>,
}

impl Tour {
    /// Cities shifted by [`CITY_LABEL_BASE`].
    pub fn labels(&self) -> Vec<usize> {
        self.cities.iter().map(|c| c + CITY_LABEL_BASE).collect()
    }

    /// Same cycle rotated so that the smallest city comes first.
    pub fn canonical(&self) -> Vec<usize> {
        let start = self
            .cities
            .iter()
            .enumerate()
            .min_by_key(|&(_, c)| *c)
            .map_or(0, |(i, _)| i);
        let mut out = self.cities[start..].to_vec();
        out.extend_from_slice(&self.cities[..start]);
        out
    }
}

impl From<Solution> for Tour {
    fn from(s: Solution) -> Self {
        Self {
            cost: s.cost,
            cities: s.path,
        }
    }
}

/// Search configuration.
#[derive(Clone, Copy, Debug)]
pub struct SearchCfg {
    /// Only branch on zero cells touching the committed chain. Turning this off
    /// gives the textbook rule (any zero cell); the optimal cost is the same,
    /// the order in which optimal tours are discovered is not.
    pub frontier_only: bool,
    /// Stop after this many node expansions.
    pub node_limit: Option<u64>,
    /// Stop after this much wall-clock time.
    pub time_limit: Option<Duration>,
}

impl Default for SearchCfg {
    fn default() -> Self {
        Self {
            frontier_only: true,
            node_limit: None,
            time_limit: None,
        }
    }
}

/// How the search ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    /// Tree exhausted; the tours are all optimal tours.
    Optimal,
    /// Tree exhausted without a Hamiltonian cycle.
    Infeasible,
    /// Budget hit; tours (possibly none) are the best found so far.
    BudgetExhausted,
}

impl SearchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchStatus::Optimal => "optimal",
            SearchStatus::Infeasible => "infeasible",
            SearchStatus::BudgetExhausted => "budget_exhausted",
        }
    }
}

/// Counters collected by the driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes_expanded: u64,
    pub branches_pruned: u64,
    pub infeasible_branches: u64,
    pub right_branches_pushed: u64,
    pub solutions_recorded: u64,
    pub max_stack_depth: usize,
}

/// Result of a solve.
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub status: SearchStatus,
    pub tours: Vec<Tour>,
    pub stats: SearchStats,
}

impl SearchReport {
    /// Cost shared by all returned tours.
    pub fn best_cost(&self) -> Option<u64> {
        self.tours.first().map(|t| t.cost)
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        self.status == SearchStatus::Optimal
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        self.status == SearchStatus::Infeasible
    }
}
