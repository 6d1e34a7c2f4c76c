//! Square cost matrix with forbidden-edge semantics.
//!
//! Purpose
//! - Hold the N×N directed edge costs of one search node and provide the
//!   reduction bookkeeping of Little's algorithm: row/column minima, row and
//!   column reduction (returning the bound contribution), and the regret of a
//!   zero cell.
//!
//! Invariants
//! - Square, N ≥ 2, diagonal forbidden (checked by the constructors).
//! - Every finite cost is at most `max_supported_cost(N)`. Each lower bound is
//!   at most 2·N times the largest cost and each tour at most N times, so the
//!   bound arithmetic below stays inside `u64`.
//! - Reductions subtract only from finite cells; an all-forbidden row or column
//!   contributes nothing to the reduced sum.

use std::fmt;
use std::ops::Index;

use nalgebra::DMatrix;

use crate::cost::Cost;
use crate::error::MatrixError;

/// N×N edge costs, `(row, col)` = cost of travelling from city `row` to city `col`.
#[derive(Clone, Debug, PartialEq)]
pub struct CostMatrix {
    cells: DMatrix<Cost>,
}

impl CostMatrix {
    /// Build from rows, validating shape and the forbidden diagonal.
    pub fn from_rows(rows: Vec<Vec<Cost>>) -> Result<Self, MatrixError> {
        let n = rows.len();
        if n < 2 {
            return Err(MatrixError::TooSmall { n });
        }
        for (row, r) in rows.iter().enumerate() {
            if r.len() != n {
                return Err(MatrixError::NotSquare {
                    row,
                    len: r.len(),
                    expected: n,
                });
            }
            if r[row].is_finite() {
                return Err(MatrixError::DiagonalNotForbidden { index: row });
            }
        }
        let limit = Self::max_supported_cost(n);
        for (row, r) in rows.iter().enumerate() {
            for (col, cell) in r.iter().enumerate() {
                if let Cost::Finite(cost) = *cell {
                    if cost > limit {
                        return Err(MatrixError::CostOverflow {
                            row,
                            col,
                            cost,
                            limit,
                        });
                    }
                }
            }
        }
        let cells = DMatrix::from_fn(n, n, |r, c| rows[r][c]);
        Ok(Self { cells })
    }

    /// Build from all-finite rows; the diagonal is overwritten with `Forbidden`.
    pub fn from_finite_rows(rows: &[Vec<u64>]) -> Result<Self, MatrixError> {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, &v)| {
                        if r == c {
                            Cost::Forbidden
                        } else {
                            Cost::Finite(v)
                        }
                    })
                    .collect()
            })
            .collect();
        Self::from_rows(rows)
    }

    /// Largest finite cost accepted for an `n`-city matrix.
    #[inline]
    pub fn max_supported_cost(n: usize) -> u64 {
        u64::MAX / (2 * n.max(1) as u64)
    }

    /// Build an `n`×`n` matrix cell by cell (`n` ≥ 2); the diagonal is forced to `Forbidden`.
    pub(crate) fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> Cost) -> Self {
        debug_assert!(n >= 2);
        let cells = DMatrix::from_fn(n, n, |r, c| {
            if r == c {
                Cost::Forbidden
            } else {
                f(r, c)
            }
        });
        debug_assert!(cells
            .iter()
            .all(|c| c.finite().map_or(true, |v| v <= Self::max_supported_cost(n))));
        Self { cells }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.nrows()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cost {
        self.cells[(row, col)]
    }

    #[inline]
    pub fn forbid(&mut self, row: usize, col: usize) {
        self.cells[(row, col)] = Cost::Forbidden;
    }

    /// Forbid every edge leaving `row`.
    pub fn forbid_row(&mut self, row: usize) {
        self.cells.row_mut(row).fill(Cost::Forbidden);
    }

    /// Forbid every edge entering `col`.
    pub fn forbid_col(&mut self, col: usize) {
        self.cells.column_mut(col).fill(Cost::Forbidden);
    }

    #[inline]
    pub fn has_finite_in_row(&self, row: usize) -> bool {
        self.cells.row(row).iter().any(|c| c.is_finite())
    }

    #[inline]
    pub fn has_finite_in_col(&self, col: usize) -> bool {
        self.cells.column(col).iter().any(|c| c.is_finite())
    }

    /// Minimum finite value per row (`Forbidden` for an all-forbidden row).
    pub fn min_values_in_rows(&self) -> Vec<Cost> {
        self.cells
            .row_iter()
            .map(|row| row.iter().copied().min().unwrap_or(Cost::Forbidden))
            .collect()
    }

    /// Minimum finite value per column (`Forbidden` for an all-forbidden column).
    pub fn min_values_in_cols(&self) -> Vec<Cost> {
        self.cells
            .column_iter()
            .map(|col| col.iter().copied().min().unwrap_or(Cost::Forbidden))
            .collect()
    }

    /// Subtract each row minimum from the row's finite cells; returns the sum of minima.
    pub fn reduce_rows(&mut self) -> u64 {
        let mins = self.min_values_in_rows();
        let mut reduced_sum = 0u64;
        for (r, min) in mins.into_iter().enumerate() {
            if let Cost::Finite(m) = min {
                for cell in self.cells.row_mut(r).iter_mut() {
                    *cell = cell.reduced_by(m);
                }
                reduced_sum += m;
            }
        }
        reduced_sum
    }

    /// Subtract each column minimum from the column's finite cells; returns the sum of minima.
    pub fn reduce_cols(&mut self) -> u64 {
        let mins = self.min_values_in_cols();
        let mut reduced_sum = 0u64;
        for (c, min) in mins.into_iter().enumerate() {
            if let Cost::Finite(m) = min {
                for cell in self.cells.column_mut(c).iter_mut() {
                    *cell = cell.reduced_by(m);
                }
                reduced_sum += m;
            }
        }
        reduced_sum
    }

    /// Row reduction, then column reduction unless every column already has a zero.
    pub fn reduce(&mut self) -> u64 {
        let mut reduced_sum = self.reduce_rows();
        let all_cols_zeroed = self.min_values_in_cols().iter().all(|m| m.is_zero());
        if !all_cols_zeroed {
            reduced_sum += self.reduce_cols();
        }
        reduced_sum
    }

    /// Regret of the cell `(row, col)`: cheapest alternative exit from `row` plus
    /// cheapest alternative entry into `col`. Zero when either has no alternative.
    pub fn vertex_cost(&self, row: usize, col: usize) -> u64 {
        let n = self.size();
        let in_row = (0..n)
            .filter(|&c| c != col)
            .map(|c| self.cells[(row, c)])
            .min()
            .unwrap_or(Cost::Forbidden);
        let in_col = (0..n)
            .filter(|&r| r != row)
            .map(|r| self.cells[(r, col)])
            .min()
            .unwrap_or(Cost::Forbidden);
        match (in_row, in_col) {
            (Cost::Finite(a), Cost::Finite(b)) => a + b,
            _ => 0,
        }
    }

    /// Cost of the closed tour `cities[0] → … → cities[k-1] → cities[0]`.
    pub fn tour_cost(&self, cities: &[usize]) -> Cost {
        if cities.is_empty() {
            return Cost::ZERO;
        }
        let closing = self.cells[(cities[cities.len() - 1], cities[0])];
        cities
            .windows(2)
            .map(|w| self.cells[(w[0], w[1])])
            .fold(closing, |acc, c| acc + c)
    }

    /// Row-major copy of the cells.
    pub fn to_rows(&self) -> Vec<Vec<Cost>> {
        self.cells
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

impl Index<(usize, usize)> for CostMatrix {
    type Output = Cost;
    #[inline]
    fn index(&self, idx: (usize, usize)) -> &Cost {
        &self.cells[idx]
    }
}

impl fmt::Display for CostMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.row_iter() {
            let line: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
