//! Exhaustive reference solver for small instances.
//!
//! Enumerates every directed tour starting at city 0 and returns all tours of
//! minimum cost. O((N-1)!); meant for cross-checking the branch-and-bound on
//! N ≤ 10.

use crate::bnb::Tour;
use crate::cost::Cost;
use crate::matrix::CostMatrix;

/// All optimal directed tours starting at city 0 (empty if none exists).
pub fn brute_force(matrix: &CostMatrix) -> Vec<Tour> {
    let n = matrix.size();
    let mut walk = Enumeration {
        matrix,
        best: Cost::Forbidden,
        tours: Vec::new(),
        path: Vec::with_capacity(n),
        used: vec![false; n],
    };
    walk.path.push(0);
    walk.used[0] = true;
    walk.extend(Cost::ZERO);
    walk.tours
}

struct Enumeration<'a> {
    matrix: &'a CostMatrix,
    best: Cost,
    tours: Vec<Tour>,
    path: Vec<usize>,
    used: Vec<bool>,
}

impl Enumeration<'_> {
    fn extend(&mut self, partial: Cost) {
        // Keep ties: only strictly worse partial tours are cut.
        if partial > self.best {
            return;
        }
        let n = self.matrix.size();
        let last = self.path[self.path.len() - 1];
        if self.path.len() == n {
            let total = partial + self.matrix.get(last, self.path[0]);
            let Cost::Finite(cost) = total else {
                return;
            };
            if total < self.best {
                self.best = total;
                self.tours.clear();
            }
            if total == self.best {
                self.tours.push(Tour {
                    cost,
                    cities: self.path.clone(),
                });
            }
            return;
        }
        for next in 0..n {
            if self.used[next] {
                continue;
            }
            let step = self.matrix.get(last, next);
            if step.is_forbidden() {
                continue;
            }
            self.used[next] = true;
            self.path.push(next);
            self.extend(partial + step);
            self.path.pop();
            self.used[next] = false;
        }
    }
}
