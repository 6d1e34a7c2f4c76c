//! Edge costs with a forbidden-edge sentinel.
//!
//! `Cost::Forbidden` orders above every finite value, so `min` over a row picks
//! the cheapest allowed edge and yields `Forbidden` only when nothing is allowed.
//! Arithmetic never touches the sentinel: additions absorb into `Forbidden` and
//! reductions skip it.

use std::fmt;
use std::ops::Add;

/// Cost of a directed edge: a non-negative integer or a forbidden marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cost {
    Finite(u64),
    Forbidden,
}

impl Cost {
    pub const ZERO: Cost = Cost::Finite(0);

    #[inline]
    pub fn is_forbidden(self) -> bool {
        matches!(self, Cost::Forbidden)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        !self.is_forbidden()
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self == Cost::ZERO
    }

    /// The finite value, if any.
    #[inline]
    pub fn finite(self) -> Option<u64> {
        match self {
            Cost::Finite(v) => Some(v),
            Cost::Forbidden => None,
        }
    }

    /// Subtract a row/column minimum. The sentinel is left untouched.
    #[inline]
    pub(crate) fn reduced_by(self, min: u64) -> Cost {
        match self {
            Cost::Finite(v) => {
                debug_assert!(v >= min, "reduction below zero: {v} - {min}");
                Cost::Finite(v - min)
            }
            Cost::Forbidden => Cost::Forbidden,
        }
    }
}

impl Add for Cost {
    type Output = Cost;
    #[inline]
    fn add(self, rhs: Cost) -> Self::Output {
        match (self, rhs) {
            (Cost::Finite(a), Cost::Finite(b)) => {
                a.checked_add(b).map_or(Cost::Forbidden, Cost::Finite)
            }
            _ => Cost::Forbidden,
        }
    }
}

impl From<u64> for Cost {
    #[inline]
    fn from(v: u64) -> Self {
        Cost::Finite(v)
    }
}

impl From<Option<u64>> for Cost {
    #[inline]
    fn from(v: Option<u64>) -> Self {
        v.map_or(Cost::Forbidden, Cost::Finite)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Finite(v) => write!(f, "{v}"),
            Cost::Forbidden => write!(f, "INF"),
        }
    }
}
