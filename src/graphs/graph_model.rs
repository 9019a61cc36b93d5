/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! An adjacency model of a directed graph with sink handling applied at
//! construction time.
//!
//! [`GraphModel`] turns a raw arc list into the three structures the solver
//! iterates over: the adjacency (successor lists), its exact transpose (the
//! in-lists, used to enumerate the predecessors of each node), and the
//! out-degree of each node. Sink nodes (nodes with no outgoing arcs) are
//! handled according to the [`SinkStrategy`] chosen once at construction:
//!
//! - [`SelfLoop`](SinkStrategy::SelfLoop) patches the adjacency so that every
//!   sink points to itself; after the patch no node has out-degree zero and
//!   the solver needs no special case.
//! - [`Redistribution`](SinkStrategy::Redistribution) leaves the adjacency
//!   untouched and records the sinks, whose rank mass the solver spreads
//!   uniformly over all nodes at every iteration.
//!
//! All structures are immutable after construction.

use crate::RankError;

/// Policy for nodes with no outgoing arcs.
///
/// Selected once at [`GraphModel`] construction and never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkStrategy {
    /// Patch the adjacency so that every sink gains exactly one synthetic
    /// successor: itself.
    SelfLoop,
    /// Leave the adjacency untouched and spread the rank mass of every sink
    /// uniformly over all nodes at each iteration. This is the default.
    #[default]
    Redistribution,
}

impl std::fmt::Display for SinkStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkStrategy::SelfLoop => f.write_str("self-loop"),
            SinkStrategy::Redistribution => f.write_str("redistribution"),
        }
    }
}

/// A directed graph over the dense node universe `[0 . . num_nodes)`, with
/// sink handling already applied.
///
/// # Examples
///
/// ```
/// use steadyrank::graphs::{GraphModel, SinkStrategy};
///
/// # fn main() -> Result<(), steadyrank::RankError> {
/// // 0 → 1, 1 → 0, 1 → 2; node 2 is a sink
/// let model = GraphModel::new(3, [(0, 1), (1, 0), (1, 2)], SinkStrategy::SelfLoop)?;
///
/// // The sink gained a synthetic self-loop
/// assert_eq!(model.successors(2), &[2]);
/// assert_eq!(model.out_degree(2), 1);
/// assert!(model.sinks().is_empty());
/// #     Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphModel {
    strategy: SinkStrategy,
    num_nodes: usize,
    /// The number of arcs after the sink transform.
    num_arcs: u64,
    /// For each node, its list of successors, in insertion order.
    succ: Vec<Vec<usize>>,
    /// For each node, its predecessors in ascending order, deduplicated.
    /// Exact transpose of `succ`.
    in_list: Vec<Vec<usize>>,
    /// Out-degrees after the sink transform; parallel arcs count.
    out_degree: Vec<usize>,
    /// Nodes with zero original out-degree. Populated only under
    /// [`SinkStrategy::Redistribution`].
    sinks: Vec<usize>,
}

impl GraphModel {
    /// Builds a model from a raw arc list over the universe
    /// `[0 . . num_nodes)`.
    ///
    /// The final sets and maps do not depend on the order of the arc list;
    /// only the order of each successor list mirrors insertion order.
    ///
    /// # Errors
    ///
    /// - [`RankError::EmptyGraph`] if `num_nodes` is zero;
    /// - [`RankError::ArcOutOfUniverse`] if an arc endpoint is not in
    ///   `[0 . . num_nodes)`;
    /// - [`RankError::ZeroOutDegree`] if a consistency sweep finds a node
    ///   that could be divided by zero out-degree during iteration.
    pub fn new(
        num_nodes: usize,
        arcs: impl IntoIterator<Item = (usize, usize)>,
        strategy: SinkStrategy,
    ) -> Result<Self, RankError> {
        if num_nodes == 0 {
            return Err(RankError::EmptyGraph);
        }

        let mut succ = vec![Vec::new(); num_nodes];
        let mut num_arcs: u64 = 0;
        for (src, dst) in arcs {
            if src >= num_nodes || dst >= num_nodes {
                return Err(RankError::ArcOutOfUniverse {
                    src,
                    dst,
                    num_nodes,
                });
            }
            succ[src].push(dst);
            num_arcs += 1;
        }

        let mut sinks = Vec::new();
        match strategy {
            SinkStrategy::SelfLoop => {
                for (node, successors) in succ.iter_mut().enumerate() {
                    if successors.is_empty() {
                        successors.push(node);
                        num_arcs += 1;
                    }
                }
            }
            SinkStrategy::Redistribution => {
                sinks.extend((0..num_nodes).filter(|&node| succ[node].is_empty()));
            }
        }

        let out_degree: Vec<usize> = succ.iter().map(Vec::len).collect();

        let mut in_list = vec![Vec::new(); num_nodes];
        for (node, successors) in succ.iter().enumerate() {
            for &dst in successors {
                in_list[dst].push(node);
            }
        }
        // Sources are visited in ascending order, so each in-list is already
        // sorted; parallel arcs leave adjacent duplicates.
        for predecessors in &mut in_list {
            predecessors.dedup();
        }

        let model = Self {
            strategy,
            num_nodes,
            num_arcs,
            succ,
            in_list,
            out_degree,
            sinks,
        };
        model.check_no_zero_divisor()?;
        Ok(model)
    }

    /// Verifies that no node with out-degree zero appears in any in-list.
    ///
    /// The solver divides the rank of every in-list member by its out-degree,
    /// so such a node would cause a division by zero. Under either strategy
    /// this cannot happen for a model built by [`new`](Self::new): self-loop
    /// patching removes zero out-degrees altogether, and a redistribution
    /// sink has no outgoing arcs and therefore belongs to no in-list.
    fn check_no_zero_divisor(&self) -> Result<(), RankError> {
        for (target, predecessors) in self.in_list.iter().enumerate() {
            for &node in predecessors {
                if self.out_degree[node] == 0 {
                    return Err(RankError::ZeroOutDegree {
                        node,
                        target,
                        strategy: self.strategy,
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns the sink strategy this model was built with.
    pub fn strategy(&self) -> SinkStrategy {
        self.strategy
    }

    /// Returns the number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of arcs, including synthetic self-loops.
    pub fn num_arcs(&self) -> u64 {
        self.num_arcs
    }

    /// Returns the successors of a node, in insertion order.
    pub fn successors(&self, node: usize) -> &[usize] {
        &self.succ[node]
    }

    /// Returns the predecessors of a node, in ascending order and without
    /// duplicates.
    pub fn predecessors(&self, node: usize) -> &[usize] {
        &self.in_list[node]
    }

    /// Returns the out-degree of a node after the sink transform, counting
    /// parallel arcs.
    pub fn out_degree(&self, node: usize) -> usize {
        self.out_degree[node]
    }

    /// Returns the nodes with zero original out-degree.
    ///
    /// Empty under [`SinkStrategy::SelfLoop`].
    pub fn sinks(&self) -> &[usize] {
        &self.sinks
    }

    /// Returns true if the (possibly patched) graph contains the arc
    /// `(src, dst)`.
    pub fn has_arc(&self, src: usize, dst: usize) -> bool {
        self.in_list[dst].binary_search(&src).is_ok()
    }
}
