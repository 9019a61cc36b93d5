/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

mod error;
pub mod graphs;
pub mod io;
pub mod rank;
pub mod utils;

pub use error::RankError;

pub mod prelude {
    pub use crate::RankError;
    pub use crate::graphs::{GraphModel, SinkStrategy};
    pub use crate::rank::{PageRank, Solution};
}
