/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Rank computations.

pub mod pagerank;

pub use crate::RankError;
pub use pagerank::{PageRank, Solution};
