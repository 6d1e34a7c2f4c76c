use std::fmt;

/// Structural problems with a caller-supplied cost matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// Fewer than two cities; no cycle exists.
    TooSmall { n: usize },
    /// A row whose length differs from the number of rows.
    NotSquare { row: usize, len: usize, expected: usize },
    /// A self-loop that is not marked forbidden.
    DiagonalNotForbidden { index: usize },
    /// A finite cost large enough that bounds over `n` cities could overflow `u64`.
    CostOverflow { row: usize, col: usize, cost: u64, limit: u64 },
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixError::TooSmall { n } => {
                write!(f, "cost matrix needs at least 2 cities, got {n}")
            }
            MatrixError::NotSquare { row, len, expected } => write!(
                f,
                "cost matrix is not square: row {row} has {len} entries, expected {expected}"
            ),
            MatrixError::DiagonalNotForbidden { index } => write!(
                f,
                "diagonal entry ({index}, {index}) must be forbidden (self-loops are not edges)"
            ),
            MatrixError::CostOverflow {
                row,
                col,
                cost,
                limit,
            } => write!(
                f,
                "cost {cost} at ({row}, {col}) exceeds the supported maximum {limit} for this size"
            ),
        }
    }
}

impl std::error::Error for MatrixError {}
