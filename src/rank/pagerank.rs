/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Sequential damped power-iteration PageRank.
//!
//! # The formula
//!
//! Let *N* be the number of nodes, α the damping factor, and **x** the current
//! rank vector. One iteration computes, for every node *v*,
//!
//! > *x′ᵥ* = (1 − α) / *N*  +  α · *S*  +  α · ∑_(*u* → *v*) *xᵤ* / *dᵤ*
//!
//! where *dᵤ* is the out-degree of *u* after the sink transform and *S* is
//! the sink term, which depends on the
//! [`SinkStrategy`](crate::graphs::SinkStrategy) the model was built with:
//!
//! - under the self-loop strategy the adjacency was patched at construction
//!   time, so *S* = 0 and a former sink behaves like any ordinary node
//!   feeding its own in-list entry;
//! - under the redistribution strategy, *S* = ∑ over sinks *s* of *xₛ* / *N*:
//!   the whole rank mass held by sinks is spread uniformly over all nodes,
//!   modeling a surfer that jumps anywhere upon reaching a dead end. This is
//!   distinct from ordinary damping, which hands (1 − α) / *N* to every node
//!   regardless of sinks.
//!
//! The sink term is identical for every node, so it is accumulated once per
//! iteration. Every per-node value is the sum of the teleportation term and
//! nonnegative contributions, so for *N* > 0 and α < 1 no entry can ever
//! reach zero. All accumulations are Kahan-compensated.
//!
//! # Stopping criteria
//!
//! The [`run`](PageRank::run) method accepts a composable [`Predicate`]
//! evaluated after each iteration with the current iteration number and the
//! _sup delta_, the ℓ∞ norm of the difference between the last two
//! approximations:
//!
//! > ‖**x**⁽ᵗ⁾ − **x**⁽ᵗ⁻¹⁾‖∞ = max_*i* |*xᵢ*⁽ᵗ⁾ − *xᵢ*⁽ᵗ⁻¹⁾|
//!
//! The [`solve`](PageRank::solve) convenience method combines the
//! [`SupNorm`](preds::SupNorm) tolerance with a
//! [`MaxIter`](preds::MaxIter) safety cap, and flags the result as
//! non-converged if the cap fires first. The cap is a deliberate
//! strengthening over running to convergence unconditionally, which has no
//! termination guarantee for misconfigured inputs.

pub mod preds {
    //! Predicates implementing stopping conditions.
    //!
    //! The implementation of [PageRank](super::PageRank) requires a
    //! [predicate](Predicate) to stop the algorithm. This module provides two
    //! such predicates: they evaluate to true if the computation should be
    //! stopped.
    //!
    //! You can combine the predicates using the `and` and `or` methods
    //! provided by the [`Predicate`] trait.
    //!
    //! # Examples
    //! ```
    //! # fn main() -> Result<(), Box<dyn std::error::Error>> {
    //! use predicates::prelude::*;
    //! use steadyrank::rank::pagerank::preds::{MaxIter, SupNorm};
    //!
    //! let mut predicate = SupNorm::try_from(1E-10)?.boxed();
    //! predicate = predicate.or(MaxIter::from(100)).boxed();
    //! #     Ok(())
    //! # }
    //! ```

    use crate::RankError;
    use predicates::{Predicate, reflection::PredicateReflection};
    use std::fmt::Display;

    #[doc(hidden)]
    /// This structure is passed to stopping predicates to provide the
    /// information that is needed to evaluate them.
    #[derive(Debug)]
    pub struct PredParams {
        pub iteration: usize,
        pub sup_delta: f64,
    }

    /// Stops after at most the provided number of iterations.
    #[derive(Debug, Clone)]
    pub struct MaxIter {
        max_iter: usize,
    }

    impl MaxIter {
        pub const DEFAULT_MAX_ITER: usize = usize::MAX;
    }

    impl From<usize> for MaxIter {
        fn from(max_iter: usize) -> Self {
            MaxIter { max_iter }
        }
    }

    impl Default for MaxIter {
        fn default() -> Self {
            Self::from(Self::DEFAULT_MAX_ITER)
        }
    }

    impl Display for MaxIter {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!("(max iter: {})", self.max_iter))
        }
    }

    impl PredicateReflection for MaxIter {}

    impl Predicate<PredParams> for MaxIter {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.iteration >= self.max_iter
        }
    }

    /// Stops when every element of the rank vector moved strictly less than a
    /// given tolerance in the last iteration, that is, when the ℓ∞ norm of
    /// the difference between successive approximations falls below the
    /// tolerance.
    #[derive(Debug, Clone)]
    pub struct SupNorm {
        tolerance: f64,
    }

    impl SupNorm {
        pub const DEFAULT_TOLERANCE: f64 = 1E-10;
    }

    impl TryFrom<Option<f64>> for SupNorm {
        type Error = RankError;
        fn try_from(tolerance: Option<f64>) -> Result<Self, RankError> {
            match tolerance {
                Some(tolerance) => {
                    if tolerance.is_nan() || tolerance <= 0.0 {
                        return Err(RankError::InvalidTolerance(tolerance));
                    }
                    Ok(SupNorm { tolerance })
                }
                None => Ok(Self::default()),
            }
        }
    }

    impl TryFrom<f64> for SupNorm {
        type Error = RankError;
        fn try_from(tolerance: f64) -> Result<Self, RankError> {
            Some(tolerance).try_into()
        }
    }

    impl Default for SupNorm {
        fn default() -> Self {
            Self::try_from(Self::DEFAULT_TOLERANCE).unwrap()
        }
    }

    impl Display for SupNorm {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_fmt(format_args!("(sup norm: {})", self.tolerance))
        }
    }

    impl PredicateReflection for SupNorm {}
    impl Predicate<PredParams> for SupNorm {
        fn eval(&self, pred_params: &PredParams) -> bool {
            pred_params.sup_delta < self.tolerance
        }
    }
}

use crate::RankError;
use crate::graphs::GraphModel;
use dsi_progress_logger::{ProgressLog, no_logging};
use kahan::KahanSum;
use predicates::Predicate;
use predicates::prelude::*;

/// The outcome of a [`solve`](PageRank::solve) call.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// The rank vector, one nonnegative value per node, summing to 1 within
    /// floating-point tolerance.
    pub rank: Vec<f64>,
    /// The number of iterations performed.
    pub iterations: usize,
    /// The ℓ∞ norm of the difference between the last two approximations.
    pub sup_delta: f64,
    /// Whether the tolerance was met. When false, `rank` is the best-effort
    /// vector at the iteration cap.
    pub converged: bool,
}

/// Computes PageRank by sequential damped power iteration.
///
/// The struct is configured via setters and then executed via
/// [`run`](Self::run) or [`solve`](Self::solve). After completion the rank
/// vector is available via the [`rank`](Self::rank) method.
///
/// # Examples
///
/// Default PageRank (redistribution sink handling, α = 0.85) on a small
/// graph:
///
/// ```
/// use steadyrank::graphs::{GraphModel, SinkStrategy};
/// use steadyrank::rank::PageRank;
///
/// # fn main() -> Result<(), steadyrank::RankError> {
/// // 5-node graph: 0 → 1, 0 → 2, 1 → 2, 2 → 0, 3 → 0; node 4 is a sink
/// let model = GraphModel::new(
///     5,
///     [(0, 1), (0, 2), (1, 2), (2, 0), (3, 0)],
///     SinkStrategy::Redistribution,
/// )?;
///
/// let mut pr = PageRank::new(&model);
/// let solution = pr.solve(1E-9)?;
///
/// assert!(solution.converged);
/// assert_eq!(solution.rank.len(), 5);
/// assert!((solution.rank.iter().sum::<f64>() - 1.0).abs() < 1E-9);
/// #     Ok(())
/// # }
/// ```
///
/// Custom damping factor with a composed stopping predicate:
///
/// ```
/// use predicates::prelude::*;
/// use steadyrank::graphs::{GraphModel, SinkStrategy};
/// use steadyrank::rank::PageRank;
/// use steadyrank::rank::pagerank::preds::{MaxIter, SupNorm};
///
/// # fn main() -> Result<(), steadyrank::RankError> {
/// let model = GraphModel::new(
///     5,
///     [(0, 1), (0, 2), (1, 2), (2, 0), (3, 0)],
///     SinkStrategy::SelfLoop,
/// )?;
///
/// let mut pr = PageRank::new(&model);
/// pr.alpha(0.9);
/// pr.run(SupNorm::try_from(1E-9)?.or(MaxIter::from(100)))?;
///
/// assert_eq!(pr.rank().len(), 5);
/// assert!((pr.rank().iter().sum::<f64>() - 1.0).abs() < 1E-9);
/// #     Ok(())
/// # }
/// ```
pub struct PageRank<'a> {
    model: &'a GraphModel,
    alpha: f64,
    max_iter: usize,
    sup_delta: f64,

    rank: Vec<f64>,
    iteration: usize,
}

impl std::fmt::Debug for PageRank<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRank")
            .field("alpha", &self.alpha)
            .field("strategy", &self.model.strategy())
            .field("max_iter", &self.max_iter)
            .field("sup_delta", &self.sup_delta)
            .field("iteration", &self.iteration)
            .finish_non_exhaustive()
    }
}

impl<'a> PageRank<'a> {
    /// The default iteration cap used by [`solve`](Self::solve).
    pub const DEFAULT_MAX_ITER: usize = 10_000;

    /// Creates a new PageRank computation over a borrowed, immutable model.
    pub fn new(model: &'a GraphModel) -> Self {
        let n = model.num_nodes();
        Self {
            model,
            alpha: 0.85,
            max_iter: Self::DEFAULT_MAX_ITER,
            sup_delta: f64::INFINITY,
            rank: vec![1.0 / n as f64; n],
            iteration: 0,
        }
    }

    /// Sets the damping factor α.
    ///
    /// The value is validated when a run starts: it must lie in the open
    /// interval (0 . . 1) or the run fails with
    /// [`RankError::InvalidAlpha`].
    pub fn alpha(&mut self, alpha: f64) -> &mut Self {
        self.alpha = alpha;
        self
    }

    /// Sets the iteration cap used by [`solve`](Self::solve).
    pub fn max_iter(&mut self, max_iter: usize) -> &mut Self {
        self.max_iter = max_iter;
        self
    }

    /// Returns the rank vector.
    ///
    /// After calling [`run`](Self::run) or [`solve`](Self::solve), this
    /// contains the computed PageRank values.
    pub fn rank(&self) -> &[f64] {
        &self.rank
    }

    /// Returns the number of iterations performed by the last run.
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    /// Returns the sup-norm delta after the last iteration.
    pub fn sup_delta(&self) -> f64 {
        self.sup_delta
    }

    /// Performs one damped iteration, producing the next approximation from
    /// `old` without mutating it.
    ///
    /// See the [module-level documentation](self) for the update rule.
    pub fn step(&self, old: &[f64]) -> Vec<f64> {
        let n = self.model.num_nodes();
        debug_assert_eq!(old.len(), n);
        let inv_n = 1.0 / n as f64;

        // The sink term is identical for every node: accumulate it once.
        // Under self-loop handling the sink list is empty and the term is 0.
        let mut sink_mass: KahanSum<f64> = KahanSum::new();
        for &sink in self.model.sinks() {
            sink_mass += old[sink] * inv_n;
        }
        let base = (1.0 - self.alpha) * inv_n + self.alpha * sink_mass.sum();

        let mut new = Vec::with_capacity(n);
        for node in 0..n {
            let mut sigma: KahanSum<f64> = KahanSum::new();
            for &pred in self.model.predecessors(node) {
                sigma += old[pred] / self.model.out_degree(pred) as f64;
            }
            new.push(base + self.alpha * sigma.sum());
        }
        new
    }

    /// Runs the computation from the uniform vector until the given predicate
    /// is satisfied.
    pub fn run(&mut self, predicate: impl Predicate<preds::PredParams>) -> Result<(), RankError> {
        self.run_with_logging(predicate, no_logging![])
    }

    /// Runs the computation from the uniform vector until the given predicate
    /// is satisfied, logging progress.
    ///
    /// `pl` is a [`ProgressLog`] updated once per iteration; pass
    /// [`no_logging![]`](dsi_progress_logger::no_logging) to disable it.
    ///
    /// # Errors
    ///
    /// [`RankError::InvalidAlpha`] if the damping factor is outside
    /// (0 . . 1); the error is raised before any iteration is performed.
    pub fn run_with_logging(
        &mut self,
        predicate: impl Predicate<preds::PredParams>,
        pl: &mut impl ProgressLog,
    ) -> Result<(), RankError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(RankError::InvalidAlpha(self.alpha));
        }
        let n = self.model.num_nodes();

        log::info!("Strategy: {}", self.model.strategy());
        log::info!("Alpha: {}", self.alpha);
        log::info!("Stopping criterion: {}", predicate);
        log::info!("{} sink nodes", self.model.sinks().len());

        self.iteration = 0;
        self.sup_delta = f64::INFINITY;
        self.rank.clear();
        self.rank.resize(n, 1.0 / n as f64);

        pl.item_name("iteration");
        pl.expected_updates(None);
        pl.start(format!(
            "Computing PageRank (alpha={}, strategy={})...",
            self.alpha,
            self.model.strategy()
        ));

        loop {
            let new_rank = self.step(&self.rank);

            self.sup_delta = new_rank
                .iter()
                .zip(self.rank.iter())
                .map(|(new, old)| (new - old).abs())
                .fold(0.0, f64::max);
            self.rank = new_rank;
            self.iteration += 1;

            log::debug!(
                "Iteration {}: sup delta = {}",
                self.iteration,
                self.sup_delta
            );
            pl.update();

            if predicate.eval(&preds::PredParams {
                iteration: self.iteration,
                sup_delta: self.sup_delta,
            }) {
                break;
            }
        }

        pl.done();
        Ok(())
    }

    /// Iterates until every element of the rank vector moves strictly less
    /// than `eps`, or until the [iteration cap](Self::max_iter) is reached.
    ///
    /// Reaching the cap is not an error: the returned [`Solution`] carries
    /// the best-effort vector with `converged` set to false.
    ///
    /// # Errors
    ///
    /// [`RankError::InvalidTolerance`] if `eps` is not a positive number and
    /// [`RankError::InvalidAlpha`] if the damping factor is outside
    /// (0 . . 1); both are raised before any iteration is performed.
    pub fn solve(&mut self, eps: f64) -> Result<Solution, RankError> {
        self.solve_with_logging(eps, no_logging![])
    }

    /// Same as [`solve`](Self::solve), logging progress to `pl`.
    pub fn solve_with_logging(
        &mut self,
        eps: f64,
        pl: &mut impl ProgressLog,
    ) -> Result<Solution, RankError> {
        let tolerance = preds::SupNorm::try_from(eps)?;
        self.run_with_logging(tolerance.or(preds::MaxIter::from(self.max_iter)), pl)?;

        let converged = self.sup_delta < eps;
        if !converged {
            log::warn!(
                "Iteration cap ({}) reached with sup delta {} >= {}",
                self.max_iter,
                self.sup_delta,
                eps
            );
        }
        Ok(Solution {
            rank: self.rank.clone(),
            iterations: self.iteration,
            sup_delta: self.sup_delta,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::SinkStrategy;

    // 0 → 1, 1 → 0, 1 → 2; node 2 is a sink
    fn three_node_model(strategy: SinkStrategy) -> GraphModel {
        GraphModel::new(3, [(0, 1), (1, 0), (1, 2)], strategy).unwrap()
    }

    // Four leaves pointing at a hub that points nowhere
    fn star_model(strategy: SinkStrategy) -> GraphModel {
        GraphModel::new(5, [(1, 0), (2, 0), (3, 0), (4, 0)], strategy).unwrap()
    }

    #[test]
    fn test_one_step_redistribution() {
        let model = three_node_model(SinkStrategy::Redistribution);
        let pr = PageRank::new(&model);
        let third = 1.0 / 3.0;
        let new = pr.step(&[third, third, third]);

        // Whole sink mass of node 2 spread uniformly, on top of teleportation
        let base = 0.05 + 0.85 * third / 3.0;
        assert!((new[0] - (base + 0.85 * third / 2.0)).abs() < 1E-12);
        assert!((new[1] - (base + 0.85 * third)).abs() < 1E-12);
        assert!((new[2] - (base + 0.85 * third / 2.0)).abs() < 1E-12);
        assert!((new.iter().sum::<f64>() - 1.0).abs() < 1E-12);
    }

    #[test]
    fn test_one_step_self_loop() {
        let model = three_node_model(SinkStrategy::SelfLoop);
        let pr = PageRank::new(&model);
        let third = 1.0 / 3.0;
        let new = pr.step(&[third, third, third]);

        // The sink reinforces itself through its synthetic loop
        assert!((new[0] - (0.05 + 0.85 * third / 2.0)).abs() < 1E-12);
        assert!((new[1] - (0.05 + 0.85 * third)).abs() < 1E-12);
        assert!((new[2] - (0.05 + 0.85 * (third / 2.0 + third))).abs() < 1E-12);
        assert!((new.iter().sum::<f64>() - 1.0).abs() < 1E-12);
    }

    #[test]
    fn test_step_does_not_mutate_input() {
        let model = three_node_model(SinkStrategy::Redistribution);
        let pr = PageRank::new(&model);
        let old = vec![0.5, 0.25, 0.25];
        let _ = pr.step(&old);
        assert_eq!(old, vec![0.5, 0.25, 0.25]);
    }

    #[test]
    fn test_two_cycle_converges_to_half() -> Result<(), RankError> {
        for strategy in [SinkStrategy::SelfLoop, SinkStrategy::Redistribution] {
            let model = GraphModel::new(2, [(0, 1), (1, 0)], strategy)?;
            let mut pr = PageRank::new(&model);
            let solution = pr.solve(1E-10)?;
            assert!(solution.converged);
            assert!((solution.rank[0] - 0.5).abs() < 1E-9);
            assert!((solution.rank[1] - 0.5).abs() < 1E-9);
        }
        Ok(())
    }

    #[test]
    fn test_star_redistribution() -> Result<(), RankError> {
        let model = star_model(SinkStrategy::Redistribution);
        let mut pr = PageRank::new(&model);
        let solution = pr.solve(1E-12)?;
        assert!(solution.converged);

        // Fixed point of h = (1 - α)/5 + α·h/5 + α·4·l with
        // l = (1 - α)/5 + α·h/5
        let hub = 0.132 / 0.252;
        assert!((solution.rank[0] - hub).abs() < 1E-9);
        for leaf in 1..5 {
            assert!(solution.rank[leaf] < solution.rank[0]);
            assert!((solution.rank[leaf] - (0.03 + 0.17 * hub)).abs() < 1E-9);
        }
        assert!(solution.rank[0] < 1.0);
        assert!((solution.rank.iter().sum::<f64>() - 1.0).abs() < 1E-6);
        Ok(())
    }

    #[test]
    fn test_single_node() -> Result<(), RankError> {
        for strategy in [SinkStrategy::SelfLoop, SinkStrategy::Redistribution] {
            let model = GraphModel::new(1, [], strategy)?;
            let mut pr = PageRank::new(&model);
            let solution = pr.solve(1E-10)?;
            assert!(solution.converged);
            assert_eq!(solution.iterations, 1);
            assert!((solution.rank[0] - 1.0).abs() < 1E-12);
        }
        Ok(())
    }

    #[test]
    fn test_rank_is_stochastic() -> Result<(), RankError> {
        let arcs = [(0, 1), (0, 2), (1, 2), (2, 0), (3, 0), (3, 2), (5, 1)];
        for strategy in [SinkStrategy::SelfLoop, SinkStrategy::Redistribution] {
            let model = GraphModel::new(6, arcs, strategy)?;
            let mut pr = PageRank::new(&model);
            let solution = pr.solve(1E-10)?;
            assert!(solution.converged);
            assert_eq!(solution.rank.len(), 6);
            assert!(solution.rank.iter().all(|&x| x >= 0.0));
            assert!((solution.rank.iter().sum::<f64>() - 1.0).abs() < 1E-6);
        }
        Ok(())
    }

    #[test]
    fn test_idempotent_near_fixed_point() -> Result<(), RankError> {
        let model = star_model(SinkStrategy::Redistribution);
        let mut pr = PageRank::new(&model);
        let solution = pr.solve(1E-12)?;
        assert!(solution.converged);

        let next = pr.step(&solution.rank);
        for (a, b) in next.iter().zip(solution.rank.iter()) {
            assert!((a - b).abs() < 1E-10);
        }
        Ok(())
    }

    #[test]
    fn test_deterministic() -> Result<(), RankError> {
        let arcs = [(0, 1), (0, 2), (1, 2), (2, 0), (3, 0)];
        let model = GraphModel::new(5, arcs, SinkStrategy::Redistribution)?;
        let first = PageRank::new(&model).solve(1E-10)?;
        let second = PageRank::new(&model).solve(1E-10)?;
        assert_eq!(first.rank, second.rank);
        assert_eq!(first.iterations, second.iterations);
        Ok(())
    }

    #[test]
    fn test_loose_tolerance_stops_after_one_iteration() -> Result<(), RankError> {
        let model = star_model(SinkStrategy::Redistribution);
        let mut pr = PageRank::new(&model);
        let solution = pr.solve(1.0)?;
        assert!(solution.converged);
        assert_eq!(solution.iterations, 1);
        Ok(())
    }

    #[test]
    fn test_iteration_cap_flags_non_convergence() -> Result<(), RankError> {
        let model = star_model(SinkStrategy::Redistribution);
        let mut pr = PageRank::new(&model);
        pr.max_iter(3);
        let solution = pr.solve(1E-18)?;
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 3);
        // The best-effort vector is still a full, valid distribution
        assert_eq!(solution.rank.len(), 5);
        assert!((solution.rank.iter().sum::<f64>() - 1.0).abs() < 1E-6);
        Ok(())
    }

    #[test]
    fn test_invalid_alpha_is_rejected() {
        let model = three_node_model(SinkStrategy::Redistribution);
        for alpha in [0.0, 1.0, 1.5, -0.1] {
            let mut pr = PageRank::new(&model);
            pr.alpha(alpha);
            assert_eq!(pr.solve(1E-10), Err(RankError::InvalidAlpha(alpha)));
        }
    }

    #[test]
    fn test_invalid_tolerance_is_rejected() {
        let model = three_node_model(SinkStrategy::Redistribution);
        let mut pr = PageRank::new(&model);
        assert_eq!(pr.solve(0.0), Err(RankError::InvalidTolerance(0.0)));
        assert_eq!(pr.solve(-1.0), Err(RankError::InvalidTolerance(-1.0)));
        assert!(matches!(
            pr.solve(f64::NAN),
            Err(RankError::InvalidTolerance(_))
        ));
    }
}
