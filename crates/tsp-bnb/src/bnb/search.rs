//! Depth-first branch-and-bound driver with an explicit LIFO stack.

use std::time::Instant;

use tracing::{debug, trace};

use crate::cost::Cost;
use crate::matrix::CostMatrix;

use super::stage::StageState;
use super::types::{SearchCfg, SearchReport, SearchStats, SearchStatus, Solution, Tour};

/// Solve with the default configuration.
pub fn solve(matrix: &CostMatrix) -> SearchReport {
    solve_with_cfg(matrix, SearchCfg::default())
}

/// Solve and return every optimal tour found (all of them unless the budget ran out).
pub fn solve_with_cfg(matrix: &CostMatrix, cfg: SearchCfg) -> SearchReport {
    BnbRunner::new(matrix, cfg).run()
}

/// Keep exactly the solutions recorded under the smallest lower bound.
pub fn filter_solutions(solutions: Vec<Solution>) -> Vec<Solution> {
    let Some(optimal) = solutions.iter().map(|s| s.lower_bound).min() else {
        return Vec::new();
    };
    solutions
        .into_iter()
        .filter(|s| s.lower_bound == optimal)
        .collect()
}

/// Outcome of expanding one popped branch.
enum Expansion {
    /// Reached the 2×2 remainder.
    Terminal(StageState),
    /// Bound exceeded the incumbent.
    Pruned,
    /// No tour extends the branch.
    Infeasible,
    /// Node or time budget ran out.
    Halted,
}

/// Driver carrying the input matrix, the incumbent and the open branches.
struct BnbRunner<'a> {
    original: &'a CostMatrix,
    cfg: SearchCfg,
    best: Cost,
    solutions: Vec<Solution>,
    stack: Vec<StageState>,
    stats: SearchStats,
    started: Instant,
}

impl<'a> BnbRunner<'a> {
    fn new(original: &'a CostMatrix, cfg: SearchCfg) -> Self {
        Self {
            original,
            cfg,
            best: Cost::Forbidden,
            solutions: Vec::new(),
            stack: Vec::new(),
            stats: SearchStats::default(),
            started: Instant::now(),
        }
    }

    #[inline]
    fn within_bound(&self, lower_bound: u64) -> bool {
        Cost::Finite(lower_bound) <= self.best
    }

    fn budget_spent(&self) -> bool {
        if let Some(limit) = self.cfg.node_limit {
            if self.stats.nodes_expanded >= limit {
                return true;
            }
        }
        if let Some(limit) = self.cfg.time_limit {
            if self.started.elapsed() >= limit {
                return true;
            }
        }
        false
    }

    fn run(mut self) -> SearchReport {
        let n = self.original.size();
        let Some(root) = StageState::root(self.original) else {
            debug!(n, "root has a city without exit or entry");
            return self.finish(false);
        };
        debug!(n, lower_bound = root.lower_bound(), "root reduced");
        self.stack.push(root);

        let mut halted = false;
        while let Some(branch) = self.stack.pop() {
            match self.expand(branch, n - 2) {
                Expansion::Terminal(state) => self.record(state),
                Expansion::Pruned => self.stats.branches_pruned += 1,
                Expansion::Infeasible => self.stats.infeasible_branches += 1,
                Expansion::Halted => {
                    halted = true;
                    break;
                }
            }
        }
        self.finish(halted)
    }

    /// Follow the left (include) branch down to `n_levels`, pushing each right
    /// (exclude) sibling on the stack.
    fn expand(&mut self, mut branch: StageState, n_levels: usize) -> Expansion {
        while branch.level() < n_levels {
            if !self.within_bound(branch.lower_bound()) {
                trace!(
                    level = branch.level(),
                    lower_bound = branch.lower_bound(),
                    "pruned"
                );
                return Expansion::Pruned;
            }
            if self.budget_spent() {
                return Expansion::Halted;
            }
            self.stats.nodes_expanded += 1;

            let Some(reduced) = branch.reduce_cost_matrix() else {
                return Expansion::Infeasible;
            };
            branch.update_lower_bound(reduced);
            if !self.within_bound(branch.lower_bound()) {
                return Expansion::Pruned;
            }

            let Some(vertex) = branch.choose_new_vertex(self.cfg.frontier_only) else {
                return Expansion::Infeasible;
            };
            let parent_matrix = branch.matrix().clone();
            let parent_path = branch.unsorted_path().to_vec();
            let parent_bound = branch.lower_bound();

            branch.append_to_path(vertex.edge);
            branch.update_cost_matrix(vertex.edge);

            match StageState::right_branch(
                parent_matrix,
                parent_path,
                vertex.edge,
                parent_bound,
                vertex.cost,
            ) {
                Some(right) => {
                    self.stack.push(right);
                    self.stats.right_branches_pushed += 1;
                    self.stats.max_stack_depth = self.stats.max_stack_depth.max(self.stack.len());
                }
                None => self.stats.infeasible_branches += 1,
            }
        }
        if !self.within_bound(branch.lower_bound()) {
            return Expansion::Pruned;
        }
        Expansion::Terminal(branch)
    }

    fn record(&mut self, state: StageState) {
        let Some((lower_bound, path)) = state.get_path() else {
            self.stats.infeasible_branches += 1;
            return;
        };
        if !self.within_bound(lower_bound) {
            self.stats.branches_pruned += 1;
            return;
        }
        let Cost::Finite(cost) = self.original.tour_cost(&path) else {
            self.stats.infeasible_branches += 1;
            return;
        };
        debug_assert_eq!(cost, lower_bound, "terminal bound must equal the tour cost");
        debug!(cost, lower_bound, ?path, "solution recorded");
        self.best = Cost::Finite(lower_bound);
        self.stats.solutions_recorded += 1;
        self.solutions.push(Solution {
            lower_bound,
            cost,
            path,
        });
    }

    fn finish(self, halted: bool) -> SearchReport {
        let tours: Vec<Tour> = filter_solutions(self.solutions)
            .into_iter()
            .map(Tour::from)
            .collect();
        let status = if halted {
            SearchStatus::BudgetExhausted
        } else if tours.is_empty() {
            SearchStatus::Infeasible
        } else {
            SearchStatus::Optimal
        };
        debug!(
            status = status.as_str(),
            tours = tours.len(),
            best = ?tours.first().map(|t| t.cost),
            nodes = self.stats.nodes_expanded,
            pruned = self.stats.branches_pruned,
            "search finished"
        );
        SearchReport {
            status,
            tours,
            stats: self.stats,
        }
    }
}
