/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Small utilities on rank vectors.

/// Returns the node identifiers sorted by descending rank, ties broken by
/// ascending identifier.
///
/// # Panics
///
/// If a comparison returns [`None`], that is, if a value is NaN.
///
/// # Examples
/// ```
/// # use steadyrank::utils::rank_order;
/// let rank = vec![0.1, 0.4, 0.2, 0.1, 0.2];
/// assert_eq!(rank_order(&rank), vec![1, 2, 4, 0, 3]);
/// ```
pub fn rank_order(rank: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rank.len()).collect();
    order.sort_by(|&a, &b| rank[b].partial_cmp(&rank[a]).unwrap().then(a.cmp(&b)));
    order
}
