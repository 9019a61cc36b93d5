/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! In-memory graph structures consumed by the solver.

pub mod graph_model;

pub use graph_model::{GraphModel, SinkStrategy};
