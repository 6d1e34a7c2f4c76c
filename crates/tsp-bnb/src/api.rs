//! Curated API for callers that want more than `solve`.
//!
//! Groups the step-level pieces of the algorithm (node state, branching
//! decisions, filter) next to the instance tooling, so experiments can drive or
//! inspect the search one step at a time.

// Cost domain
pub use crate::cost::Cost;
pub use crate::error::MatrixError;
pub use crate::matrix::CostMatrix;
// Branch-and-bound
pub use crate::bnb::{
    filter_solutions, solve, solve_with_cfg, Edge, NewVertex, SearchCfg, SearchReport,
    SearchStats, SearchStatus, Solution, StageState, Tour, CITY_LABEL_BASE,
};
// Instances and cross-checks
pub use crate::rand::{draw_cost_matrix, RandomMatrixCfg, ReplayToken};
pub use crate::reference::brute_force;
