//! Little's branch-and-bound for the TSP over a reduced cost matrix.
//!
//! Purpose
//! - Find every optimal Hamiltonian cycle of a square cost matrix with
//!   forbidden edges, exactly.
//!
//! Shape of the search
//! - Each node (`StageState`) reduces its matrix, picks the zero cell with the
//!   largest regret, and splits: the left branch includes the edge and is
//!   continued in place, the right branch excludes it and goes on a LIFO stack.
//! - A node is terminal when two cities remain unassigned; the last two edges
//!   are forced. Branches whose bound exceeds the incumbent are dropped; ties
//!   are kept so that all optimal tours are collected.
//!
//! Notes
//! - Zero cells are restricted to the frontier of the committed chain by
//!   default (`SearchCfg::frontier_only`). The optimal cost does not depend on
//!   it; which optimal tour shows up first does.
//! - The explicit stack keeps memory proportional to tree depth × matrix size
//!   and avoids call-stack growth for large N.

mod search;
mod stage;
mod types;

pub use search::{filter_solutions, solve, solve_with_cfg};
pub use stage::StageState;
pub use types::{
    Edge, NewVertex, SearchCfg, SearchReport, SearchStats, SearchStatus, Solution, Tour,
    CITY_LABEL_BASE,
};

#[cfg(test)]
mod tests;
