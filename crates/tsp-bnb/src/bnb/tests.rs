//! Scenario, step-level and property tests for the branch-and-bound.

use std::collections::BTreeSet;
use std::time::Duration;

use proptest::prelude::*;

use super::*;
use crate::cost::Cost;
use crate::matrix::CostMatrix;
use crate::rand::{draw_cost_matrix, RandomMatrixCfg, ReplayToken};
use crate::reference::brute_force;

const X: Cost = Cost::Forbidden;

fn f(v: u64) -> Cost {
    Cost::Finite(v)
}

fn textbook4() -> CostMatrix {
    CostMatrix::from_rows(vec![
        vec![X, f(20), f(30), f(10)],
        vec![f(15), X, f(16), f(4)],
        vec![f(3), f(5), X, f(2)],
        vec![f(19), f(6), f(18), X],
    ])
    .unwrap()
}

fn canonical_set(tours: &[Tour]) -> BTreeSet<Vec<usize>> {
    tours.iter().map(Tour::canonical).collect()
}

fn is_permutation(cities: &[usize], n: usize) -> bool {
    let mut seen = vec![false; n];
    cities.len() == n
        && cities
            .iter()
            .all(|&c| c < n && !std::mem::replace(&mut seen[c], true))
}

// ---- scenarios ----

#[test]
fn textbook_instance_has_single_optimal_tour() {
    let m = textbook4();
    let report = solve(&m);
    assert_eq!(report.status, SearchStatus::Optimal);
    assert_eq!(report.tours.len(), 1);
    let tour = &report.tours[0];
    // 0 → 3 → 1 → 2 → 0 = 10 + 6 + 16 + 3
    assert_eq!(tour.cost, 35);
    assert_eq!(tour.cities, vec![2, 0, 3, 1]);
    assert_eq!(tour.canonical(), vec![0, 3, 1, 2]);
    assert_eq!(tour.labels(), vec![3, 1, 4, 2]);
    assert_eq!(m.tour_cost(&tour.cities), f(35));
}

#[test]
fn disconnected_city_is_infeasible() {
    let mut m = CostMatrix::from_finite_rows(&vec![vec![7; 5]; 5]).unwrap();
    m.forbid_row(3);
    let report = solve(&m);
    assert_eq!(report.status, SearchStatus::Infeasible);
    assert!(report.tours.is_empty());
    assert!(report.is_infeasible());
}

#[test]
fn two_separate_cycles_are_infeasible() {
    // Only 0 <-> 1 and 2 <-> 3 are allowed: every row has an exit, no tour exists.
    let m = CostMatrix::from_rows(vec![
        vec![X, f(1), X, X],
        vec![f(1), X, X, X],
        vec![X, X, X, f(1)],
        vec![X, X, f(1), X],
    ])
    .unwrap();
    let report = solve(&m);
    assert_eq!(report.status, SearchStatus::Infeasible);
    assert!(report.tours.is_empty());
}

#[test]
fn two_cities_are_immediately_terminal() {
    let m = CostMatrix::from_rows(vec![vec![X, f(5)], vec![f(7), X]]).unwrap();
    let report = solve(&m);
    assert_eq!(report.status, SearchStatus::Optimal);
    assert_eq!(
        report.tours,
        vec![Tour {
            cost: 12,
            cities: vec![0, 1]
        }]
    );
    assert_eq!(report.stats.nodes_expanded, 0);
}

#[test]
fn all_tied_tours_are_returned() {
    let m = CostMatrix::from_finite_rows(&vec![vec![1; 4]; 4]).unwrap();
    let report = solve(&m);
    assert_eq!(report.status, SearchStatus::Optimal);
    assert_eq!(report.tours.len(), 6);
    assert!(report.tours.iter().all(|t| t.cost == 4));
    assert_eq!(canonical_set(&report.tours).len(), 6);
}

#[test]
fn symmetric_instance_returns_both_directions() {
    let m = CostMatrix::from_finite_rows(&[
        vec![0, 1, 9, 1, 9],
        vec![1, 0, 1, 9, 9],
        vec![9, 1, 0, 9, 1],
        vec![1, 9, 9, 0, 1],
        vec![9, 9, 1, 1, 0],
    ])
    .unwrap();
    let report = solve(&m);
    assert_eq!(report.best_cost(), Some(5));
    let set = canonical_set(&report.tours);
    assert_eq!(
        set,
        BTreeSet::from([vec![0, 1, 2, 4, 3], vec![0, 3, 4, 2, 1]])
    );
}

#[test]
fn single_forced_cycle() {
    let m = CostMatrix::from_rows(vec![
        vec![X, f(4), X],
        vec![X, X, f(2)],
        vec![f(3), X, X],
    ])
    .unwrap();
    let report = solve(&m);
    assert_eq!(report.status, SearchStatus::Optimal);
    assert_eq!(report.tours[0].cities, vec![0, 1, 2]);
    assert_eq!(report.tours[0].cost, 9);
    // The exclude branch of (0, 1) strands city 0 and is never pushed.
    assert_eq!(report.stats.right_branches_pushed, 0);
    assert!(report.stats.infeasible_branches >= 1);
}

#[test]
fn node_budget_halts_with_status() {
    let m = draw_cost_matrix(
        RandomMatrixCfg {
            n: 7,
            ..RandomMatrixCfg::default()
        },
        ReplayToken { seed: 5, index: 0 },
    );
    let cfg = SearchCfg {
        node_limit: Some(0),
        ..SearchCfg::default()
    };
    let report = solve_with_cfg(&m, cfg);
    assert_eq!(report.status, SearchStatus::BudgetExhausted);
    assert!(report.tours.is_empty());
    assert_eq!(report.stats.nodes_expanded, 0);

    let full = solve(&m);
    assert_eq!(full.status, SearchStatus::Optimal);
    let capped = solve_with_cfg(
        &m,
        SearchCfg {
            node_limit: Some(full.stats.nodes_expanded + 1),
            ..SearchCfg::default()
        },
    );
    assert_eq!(capped.status, SearchStatus::Optimal);
    assert_eq!(capped.tours, full.tours);
}

#[test]
fn time_budget_halts_with_status() {
    let m = textbook4();
    let cfg = SearchCfg {
        time_limit: Some(Duration::ZERO),
        ..SearchCfg::default()
    };
    let report = solve_with_cfg(&m, cfg);
    assert_eq!(report.status, SearchStatus::BudgetExhausted);
    assert!(report.tours.is_empty());
    assert_eq!(report.stats.nodes_expanded, 0);

    let generous = SearchCfg {
        time_limit: Some(Duration::from_secs(3600)),
        ..SearchCfg::default()
    };
    let report = solve_with_cfg(&m, generous);
    assert_eq!(report.status, SearchStatus::Optimal);
    assert_eq!(report.best_cost(), Some(35));
}

#[test]
fn costs_at_supported_maximum_solve_without_overflow() {
    let n = 4;
    let big = CostMatrix::max_supported_cost(n);
    let mut rows = vec![vec![big; n]; n];
    rows[0][1] = big - 3;
    rows[1][2] = big - 3;
    let m = CostMatrix::from_finite_rows(&rows).unwrap();
    let report = solve(&m);
    assert_eq!(report.status, SearchStatus::Optimal);
    let best = report.best_cost().unwrap();
    assert_eq!(best, 4 * big - 6);
    for tour in &report.tours {
        assert_eq!(m.tour_cost(&tour.cities), Cost::Finite(best));
    }
    assert_eq!(canonical_set(&report.tours), canonical_set(&brute_force(&m)));
}

#[test]
fn textbook_rule_finds_the_same_optimal_tours() {
    for index in 0..20 {
        let m = draw_cost_matrix(
            RandomMatrixCfg {
                n: 6,
                max_cost: 9,
                symmetric: index % 2 == 0,
                forbidden_frac: 0.1,
            },
            ReplayToken { seed: 11, index },
        );
        let frontier = solve(&m);
        let textbook = solve_with_cfg(
            &m,
            SearchCfg {
                frontier_only: false,
                ..SearchCfg::default()
            },
        );
        assert_eq!(frontier.status, textbook.status);
        assert_eq!(frontier.best_cost(), textbook.best_cost());
        assert_eq!(canonical_set(&frontier.tours), canonical_set(&textbook.tours));
    }
}

// ---- step-level operations ----

#[test]
fn root_bound_comes_from_first_reduction() {
    let root = StageState::root(&textbook4()).unwrap();
    assert_eq!(root.level(), 0);
    assert_eq!(root.lower_bound(), 35);
    assert!(root.unsorted_path().is_empty());
}

#[test]
fn root_of_stranded_matrix_is_none() {
    let mut m = textbook4();
    m.forbid_col(1);
    assert!(StageState::root(&m).is_none());
}

#[test]
fn max_regret_zero_cell_is_chosen() {
    let root = StageState::root(&textbook4()).unwrap();
    let v = root.choose_new_vertex(true).unwrap();
    assert_eq!(v.edge, Edge::new(2, 0));
    assert_eq!(v.cost, 10);
}

#[test]
fn ties_break_on_first_cell_in_row_major_order() {
    // Every off-diagonal cell is zero with equal regret.
    let root = StageState::root(&CostMatrix::from_finite_rows(&vec![vec![3; 4]; 4]).unwrap())
        .unwrap();
    let v = root.choose_new_vertex(true).unwrap();
    assert_eq!(v.edge, Edge::new(0, 1));
    assert_eq!(v.cost, 0);
}

#[test]
fn left_update_retires_row_and_column() {
    let mut state = StageState::root(&textbook4()).unwrap();
    let edge = Edge::new(2, 0);
    state.append_to_path(edge);
    state.update_cost_matrix(edge);
    assert_eq!(state.level(), 1);
    assert_eq!(
        state.matrix().to_rows(),
        vec![
            vec![X, f(10), X, f(0)],
            vec![X, X, f(0), f(0)],
            vec![X, X, X, X],
            vec![X, f(0), f(0), X],
        ]
    );
    // Already reduced: nothing more to take at this level.
    assert_eq!(state.reduce_cost_matrix(), Some(0));
    // Frontier: row 0 (end of the chain 2 → 0) is the only live endpoint.
    let next = state.choose_new_vertex(true).unwrap();
    assert_eq!(next.edge, Edge::new(0, 3));
    assert_eq!(next.cost, 10);
}

#[test]
fn cycle_closing_edge_is_forbidden_for_longer_chains() {
    let m = CostMatrix::from_finite_rows(&vec![vec![1; 5]; 5]).unwrap();
    let mut state = StageState::root(&m).unwrap();
    for edge in [Edge::new(0, 1), Edge::new(1, 2)] {
        state.append_to_path(edge);
        state.update_cost_matrix(edge);
    }
    // Chain 0 → 1 → 2: closing 2 → 0 would leave cities 3 and 4 out.
    assert!(state.matrix().get(2, 0).is_forbidden());
    assert!(state.matrix().get(2, 1).is_forbidden());
    assert!(state.matrix().get(2, 3).is_finite());
    assert!(state.matrix().get(3, 4).is_finite());
}

#[test]
fn right_branch_excludes_edge_and_carries_regret() {
    let mut parent = StageState::root(&textbook4()).unwrap();
    parent.reduce_cost_matrix();
    let v = parent.choose_new_vertex(true).unwrap();
    let right = StageState::right_branch(
        parent.matrix().clone(),
        parent.unsorted_path().to_vec(),
        v.edge,
        parent.lower_bound(),
        v.cost,
    )
    .unwrap();
    assert_eq!(right.level(), 0);
    assert_eq!(right.lower_bound(), 45);
    assert_eq!(
        right.matrix().to_rows(),
        vec![
            vec![X, f(10), f(8), f(0)],
            vec![f(0), X, f(0), f(0)],
            vec![X, f(3), X, f(0)],
            vec![f(2), f(0), f(0), X],
        ]
    );
    // The regret was taken on creation; reducing again adds nothing.
    let mut again = right.clone();
    assert_eq!(again.reduce_cost_matrix(), Some(0));
}

#[test]
fn filter_keeps_minimum_bound_only() {
    let s = |lower_bound, path: Vec<usize>| Solution {
        lower_bound,
        cost: lower_bound,
        path,
    };
    let kept = filter_solutions(vec![
        s(40, vec![0, 1, 2]),
        s(35, vec![0, 2, 1]),
        s(37, vec![1, 0, 2]),
        s(35, vec![2, 1, 0]),
    ]);
    assert_eq!(kept, vec![s(35, vec![0, 2, 1]), s(35, vec![2, 1, 0])]);
    assert!(filter_solutions(Vec::new()).is_empty());
}

// ---- properties ----

fn matrix_strategy(max_n: usize) -> impl Strategy<Value = CostMatrix> {
    (2usize..=max_n).prop_flat_map(|n| {
        prop::collection::vec(prop::option::weighted(0.85, 0u64..30), n * n).prop_map(
            move |cells| {
                let rows = (0..n)
                    .map(|r| {
                        (0..n)
                            .map(|c| if r == c { X } else { Cost::from(cells[r * n + c]) })
                            .collect()
                    })
                    .collect();
                CostMatrix::from_rows(rows).unwrap()
            },
        )
    })
}

fn relabel(m: &CostMatrix, perm: &[usize]) -> CostMatrix {
    let n = m.size();
    let mut rows = vec![vec![X; n]; n];
    for r in 0..n {
        for c in 0..n {
            rows[perm[r]][perm[c]] = m.get(r, c);
        }
    }
    CostMatrix::from_rows(rows).unwrap()
}

proptest! {
    #[test]
    fn tours_are_optimal_permutations(m in matrix_strategy(7)) {
        let n = m.size();
        let report = solve(&m);
        let reference = brute_force(&m);
        if reference.is_empty() {
            prop_assert_eq!(report.status, SearchStatus::Infeasible);
            prop_assert!(report.tours.is_empty());
        } else {
            prop_assert_eq!(report.status, SearchStatus::Optimal);
            for tour in &report.tours {
                prop_assert!(is_permutation(&tour.cities, n));
                prop_assert_eq!(m.tour_cost(&tour.cities), Cost::Finite(tour.cost));
                prop_assert_eq!(tour.cost, reference[0].cost);
            }
            prop_assert_eq!(canonical_set(&report.tours), canonical_set(&reference));
        }
    }

    #[test]
    fn reduction_is_idempotent(m in matrix_strategy(8)) {
        let mut once = m.clone();
        once.reduce();
        let mut twice = once.clone();
        prop_assert_eq!(twice.reduce(), 0);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn regret_is_invariant_under_relabeling(
        (m, perm) in matrix_strategy(7).prop_flat_map(|m| {
            let n = m.size();
            (Just(m), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        })
    ) {
        let n = m.size();
        let mut reduced = m.clone();
        reduced.reduce();
        let relabeled = relabel(&reduced, &perm);
        for r in 0..n {
            for c in 0..n {
                prop_assert_eq!(
                    reduced.vertex_cost(r, c),
                    relabeled.vertex_cost(perm[r], perm[c])
                );
            }
        }
    }

    #[test]
    fn optimal_cost_is_invariant_under_relabeling(
        (m, perm) in matrix_strategy(6).prop_flat_map(|m| {
            let n = m.size();
            (Just(m), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        })
    ) {
        let a = solve(&m);
        let b = solve(&relabel(&m, &perm));
        prop_assert_eq!(a.status, b.status);
        prop_assert_eq!(a.best_cost(), b.best_cost());
        prop_assert_eq!(a.tours.len(), b.tours.len());
    }
}
