//! One node of the branch-and-bound tree.
//!
//! A `StageState` owns its reduced cost matrix, the edges committed so far (in
//! selection order) and the running lower bound. The left branch mutates the
//! state in place; right branches are built from a snapshot of the parent
//! matrix taken before the left-branch update.
//!
//! Bound bookkeeping: for any tour consistent with the committed edges,
//! `true cost = lower_bound + Σ reduced cells on the tour's remaining edges`.
//! Committed edges sit in forbidden rows/columns, so later reductions never
//! touch them and the identity is kept by every operation here.

use crate::cost::Cost;
use crate::matrix::CostMatrix;

use super::types::{Edge, NewVertex};

#[derive(Clone, Debug)]
pub struct StageState {
    matrix: CostMatrix,
    path: Vec<Edge>,
    lower_bound: u64,
}

impl StageState {
    /// Root of the tree: copy of the input, reduced once. `None` if some city
    /// has no allowed exit or entry.
    pub fn root(matrix: &CostMatrix) -> Option<Self> {
        let mut state = Self {
            matrix: matrix.clone(),
            path: Vec::new(),
            lower_bound: 0,
        };
        let reduced = state.reduce_cost_matrix()?;
        state.update_lower_bound(reduced);
        Some(state)
    }

    /// Sibling that excludes `edge`: the parent matrix as it stood before the
    /// left-branch update, with `edge` forbidden. Its bound is `parent_bound`
    /// plus the edge's `regret`.
    ///
    /// The matrix is reduced right away. The parent matrix had a zero in every
    /// live row and column, so the reduction takes exactly the cheapest
    /// alternative exit from `edge.row` and entry into `edge.col`, i.e. the
    /// regret. `None` when forbidding the edge strands its city.
    pub fn right_branch(
        mut matrix: CostMatrix,
        path: Vec<Edge>,
        edge: Edge,
        parent_bound: u64,
        regret: u64,
    ) -> Option<Self> {
        matrix.forbid(edge.row, edge.col);
        if !matrix.has_finite_in_row(edge.row) || !matrix.has_finite_in_col(edge.col) {
            return None;
        }
        let taken = matrix.reduce();
        debug_assert_eq!(taken, regret, "exclude-branch reduction must equal the regret");
        Some(Self {
            matrix,
            path,
            lower_bound: parent_bound + taken,
        })
    }

    /// Number of committed edges.
    #[inline]
    pub fn level(&self) -> usize {
        self.path.len()
    }

    #[inline]
    pub fn lower_bound(&self) -> u64 {
        self.lower_bound
    }

    #[inline]
    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    /// Committed edges in selection order.
    #[inline]
    pub fn unsorted_path(&self) -> &[Edge] {
        &self.path
    }

    #[inline]
    pub fn update_lower_bound(&mut self, add: u64) {
        self.lower_bound = self.lower_bound.saturating_add(add);
    }

    #[inline]
    pub fn append_to_path(&mut self, edge: Edge) {
        self.path.push(edge);
    }

    /// Rows still waiting for their outgoing edge, and columns for their incoming one.
    fn live_lines(&self) -> (Vec<bool>, Vec<bool>) {
        let n = self.matrix.size();
        let mut rows = vec![true; n];
        let mut cols = vec![true; n];
        for e in &self.path {
            rows[e.row] = false;
            cols[e.col] = false;
        }
        (rows, cols)
    }

    /// Every live row and column still has an allowed cell.
    pub fn is_feasible(&self) -> bool {
        let (rows, cols) = self.live_lines();
        rows.iter()
            .enumerate()
            .all(|(r, &live)| !live || self.matrix.has_finite_in_row(r))
            && cols
                .iter()
                .enumerate()
                .all(|(c, &live)| !live || self.matrix.has_finite_in_col(c))
    }

    /// Reduce rows (and columns if needed). `None` if a live row or column has
    /// no allowed cell, i.e. no tour extends this branch.
    pub fn reduce_cost_matrix(&mut self) -> Option<u64> {
        if !self.is_feasible() {
            return None;
        }
        Some(self.matrix.reduce())
    }

    /// Zero cell with the largest regret (row-major first on ties).
    ///
    /// With `frontier_only` and a non-empty path, only cells whose row or column
    /// is already an endpoint of a committed edge qualify, which keeps the
    /// committed edges a single chain.
    pub fn choose_new_vertex(&self, frontier_only: bool) -> Option<NewVertex> {
        let n = self.matrix.size();
        let restrict = frontier_only && !self.path.is_empty();
        let mut endpoints = vec![false; n];
        for e in &self.path {
            endpoints[e.row] = true;
            endpoints[e.col] = true;
        }

        let mut best: Option<NewVertex> = None;
        for row in 0..n {
            for col in 0..n {
                if !self.matrix.get(row, col).is_zero() {
                    continue;
                }
                if restrict && !endpoints[row] && !endpoints[col] {
                    continue;
                }
                let cost = self.matrix.vertex_cost(row, col);
                if best.map_or(true, |b| cost > b.cost) {
                    best = Some(NewVertex {
                        edge: Edge::new(row, col),
                        cost,
                    });
                }
            }
        }
        best
    }

    /// Start and end city of the committed chain that contains `edge`.
    fn chain_ends(&self, edge: Edge) -> (usize, usize) {
        let n = self.matrix.size();
        let mut pred = vec![None; n];
        let mut succ = vec![None; n];
        for e in &self.path {
            succ[e.row] = Some(e.col);
            pred[e.col] = Some(e.row);
        }
        // Chains are acyclic; `n` steps bound the walk regardless.
        let mut start = edge.row;
        for _ in 0..n {
            let Some(p) = pred[start] else { break };
            start = p;
        }
        let mut end = edge.col;
        for _ in 0..n {
            let Some(s) = succ[end] else { break };
            end = s;
        }
        (start, end)
    }

    /// Commit `edge` (already appended to the path) in the matrix:
    /// forbid closing its chain early, forbid the reverse edge, and retire
    /// row `edge.row` and column `edge.col`.
    pub fn update_cost_matrix(&mut self, edge: Edge) {
        let n = self.matrix.size();
        let (start, end) = self.chain_ends(edge);
        if self.path.len() + 1 < n {
            self.matrix.forbid(end, start);
        }
        self.matrix.forbid(edge.col, edge.row);
        self.matrix.forbid_row(edge.row);
        self.matrix.forbid_col(edge.col);
    }

    /// Finish a node whose remaining matrix is 2×2.
    ///
    /// The two live rows and columns admit two assignments; keep the ones that
    /// use allowed cells and close a Hamiltonian cycle, take the cheaper (first
    /// on ties). Returns the exact tour cost (bound plus the two reduced cells)
    /// and the cities in travel order, starting from the first committed edge.
    pub fn get_path(&self) -> Option<(u64, Vec<usize>)> {
        let n = self.matrix.size();
        let (rows, cols) = self.live_lines();
        let live_rows: Vec<usize> = (0..n).filter(|&r| rows[r]).collect();
        let live_cols: Vec<usize> = (0..n).filter(|&c| cols[c]).collect();
        if live_rows.len() != 2 || live_cols.len() != 2 {
            return None;
        }

        let assignments = [
            [
                Edge::new(live_rows[0], live_cols[0]),
                Edge::new(live_rows[1], live_cols[1]),
            ],
            [
                Edge::new(live_rows[0], live_cols[1]),
                Edge::new(live_rows[1], live_cols[0]),
            ],
        ];

        let mut best: Option<(u64, Vec<usize>)> = None;
        for tail in assignments {
            let extra = self.matrix.get(tail[0].row, tail[0].col)
                + self.matrix.get(tail[1].row, tail[1].col);
            let Cost::Finite(extra) = extra else {
                continue;
            };
            let mut edges = self.path.clone();
            edges.extend_from_slice(&tail);
            let Some(cities) = order_cycle(&edges, n) else {
                continue;
            };
            let bound = self.lower_bound.saturating_add(extra);
            if best.as_ref().map_or(true, |(b, _)| bound < *b) {
                best = Some((bound, cities));
            }
        }
        best
    }
}

/// Chain edges into one cycle by following `row == previous col`, starting at
/// the first edge. `None` unless the edges form a single cycle over all `n`
/// cities.
pub(crate) fn order_cycle(edges: &[Edge], n: usize) -> Option<Vec<usize>> {
    if edges.len() != n {
        return None;
    }
    let mut succ = vec![None; n];
    for e in edges {
        if succ[e.row].replace(e.col).is_some() {
            return None;
        }
    }
    let start = edges[0].row;
    let mut seen = vec![false; n];
    let mut cities = Vec::with_capacity(n);
    let mut cur = start;
    for _ in 0..n {
        if seen[cur] {
            return None;
        }
        seen[cur] = true;
        cities.push(cur);
        cur = succ[cur]?;
    }
    (cur == start).then_some(cities)
}
