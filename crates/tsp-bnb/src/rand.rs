//! Random cost matrices (uniform costs, optional symmetry and forbidden edges).
//!
//! Determinism uses a replay token `(seed, index)` mixed into a single RNG, so
//! a benchmark row or a failing test case can be regenerated from two numbers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cost::Cost;
use crate::matrix::CostMatrix;

/// Sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct RandomMatrixCfg {
    /// Number of cities. Clamped to at least 2.
    pub n: usize,
    /// Finite costs are drawn uniformly from `0..=max_cost`, capped at
    /// `CostMatrix::max_supported_cost(n)`.
    pub max_cost: u64,
    /// Mirror the upper triangle onto the lower one.
    pub symmetric: bool,
    /// Probability that an off-diagonal edge is forbidden. Clamped to [0, 1].
    pub forbidden_frac: f64,
}

impl Default for RandomMatrixCfg {
    fn default() -> Self {
        Self {
            n: 8,
            max_cost: 100,
            symmetric: false,
            forbidden_frac: 0.0,
        }
    }
}

/// Replay token to regenerate the same instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }
}

/// Draw one cost matrix. The diagonal is always forbidden.
pub fn draw_cost_matrix(cfg: RandomMatrixCfg, tok: ReplayToken) -> CostMatrix {
    let mut rng = tok.to_std_rng();
    let n = cfg.n.max(2);
    let max_cost = cfg.max_cost.min(CostMatrix::max_supported_cost(n));
    let forbid_p = if cfg.forbidden_frac.is_finite() {
        cfg.forbidden_frac.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mut rows = vec![vec![Cost::Forbidden; n]; n];
    for r in 0..n {
        for c in 0..n {
            if r == c || (cfg.symmetric && c < r) {
                continue;
            }
            let cell = if rng.gen_bool(forbid_p) {
                Cost::Forbidden
            } else {
                Cost::Finite(rng.gen_range(0..=max_cost))
            };
            rows[r][c] = cell;
            if cfg.symmetric {
                rows[c][r] = cell;
            }
        }
    }
    CostMatrix::from_fn(n, |r, c| rows[r][c])
}
