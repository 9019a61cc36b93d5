/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Errors shared by graph construction and the solver.

use crate::graphs::SinkStrategy;

/// Errors raised by [`GraphModel`](crate::graphs::GraphModel) construction and
/// by [`PageRank`](crate::rank::PageRank) runs.
///
/// All of these are fatal and are raised before any iteration begins: a
/// partially computed rank vector is never exposed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RankError {
    /// The graph has no nodes, so no uniform rank vector can be formed.
    #[error("empty graph: no uniform rank vector can be formed over zero nodes")]
    EmptyGraph,

    /// An arc references a node outside the declared universe.
    #[error("arc ({src}, {dst}) references a node outside the universe [0 . . {num_nodes})")]
    ArcOutOfUniverse {
        src: usize,
        dst: usize,
        num_nodes: usize,
    },

    /// The damping factor is outside the open interval (0 . . 1).
    #[error("the damping factor must be in (0 . . 1), got {0}")]
    InvalidAlpha(f64),

    /// The convergence tolerance is not a positive number.
    #[error("the convergence tolerance must be positive, got {0}")]
    InvalidTolerance(f64),

    /// A node with out-degree zero is reachable by division: it appears in the
    /// in-list of some node even though the sink transform should have
    /// eliminated it (or kept it out of every in-list).
    #[error(
        "node {node} has out-degree 0 but appears in the in-list of node {target} under {strategy} sink handling"
    )]
    ZeroOutDegree {
        node: usize,
        target: usize,
        strategy: SinkStrategy,
    },
}
