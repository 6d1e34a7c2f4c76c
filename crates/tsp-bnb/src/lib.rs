//! Exact travelling-salesman solver (Little's branch-and-bound).
//!
//! Layout
//! - `cost`: edge cost with a forbidden sentinel.
//! - `matrix`: square cost matrix and its reduction bookkeeping.
//! - `bnb`: search nodes, the explicit-stack driver and the solution filter.
//! - `reference`: brute-force enumeration for cross-checks on small N.
//! - `rand`: seeded random instances for tests, benches and the CLI.
//!
//! API Policy
//! - Callers build a [`CostMatrix`] (validated on construction) and call
//!   [`solve`] / [`solve_with_cfg`]. Everything else is exposed for tests,
//!   benches and experiments; see `api` for the curated surface.

pub mod api;
pub mod bnb;
pub mod cost;
pub mod error;
pub mod matrix;
pub mod rand;
pub mod reference;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use bnb::{solve, solve_with_cfg, SearchCfg, SearchReport, SearchStatus, Tour};
pub use cost::Cost;
pub use error::MatrixError;
pub use matrix::CostMatrix;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::bnb::{
        solve, solve_with_cfg, SearchCfg, SearchReport, SearchStats, SearchStatus, Tour,
    };
    pub use crate::cost::Cost;
    pub use crate::matrix::CostMatrix;
    pub use crate::rand::{draw_cost_matrix, RandomMatrixCfg, ReplayToken};
    pub use crate::reference::brute_force;
}
