/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::{Result, ensure};
use clap::{Parser, ValueEnum};
use dsi_progress_logger::{ProgressLog, progress_logger};
use std::path::PathBuf;
use steadyrank::graphs::{GraphModel, SinkStrategy};
use steadyrank::rank::PageRank;
use steadyrank::{io, utils};

/// The sink-handling strategy.
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum CliStrategy {
    /// Patch every sink with a synthetic self-loop.
    SelfLoop,
    /// Spread each sink's rank mass uniformly over all nodes each iteration.
    #[default]
    Redistribution,
}

impl From<CliStrategy> for SinkStrategy {
    fn from(s: CliStrategy) -> Self {
        match s {
            CliStrategy::SelfLoop => SinkStrategy::SelfLoop,
            CliStrategy::Redistribution => SinkStrategy::Redistribution,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "steadyrank",
    about = "Compute PageRank by damped power iteration.",
    long_about = None
)]
pub struct CliArgs {
    /// The path of the ASCII arc list describing the graph.
    pub arcs: PathBuf,

    #[arg(short, long)]
    /// Where to store the rank vector.
    pub output: PathBuf,

    #[arg(short, long, default_value_t = 0.85)]
    /// The damping factor α (must be in the interval (0 . . 1)).
    pub alpha: f64,

    #[arg(short, long, default_value_t = 1e-10)]
    /// The sup-norm tolerance to stop.
    pub epsilon: f64,

    #[arg(long)]
    /// Maximum number of iterations.
    pub max_iter: Option<usize>,

    #[arg(short, long, value_enum, default_value_t = CliStrategy::Redistribution)]
    /// The sink-handling strategy.
    pub sink_handling: CliStrategy,

    #[arg(short, long)]
    /// The size of the node universe; inferred from the arc list if absent.
    pub num_nodes: Option<usize>,

    #[arg(long)]
    /// Decimal digits for the stored rank vector.
    pub precision: Option<usize>,

    #[arg(short, long)]
    /// Print the given number of top-ranked nodes.
    pub top: Option<usize>,
}

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    ensure!(
        args.alpha > 0.0 && args.alpha < 1.0,
        "The damping factor must be in (0 . . 1), got {}",
        args.alpha
    );

    let mut pl = progress_logger![];
    pl.display_memory(true);

    log::info!("Loading the arc list from {}", args.arcs.display());
    let (num_nodes, arcs) = io::load_arcs(&args.arcs, args.num_nodes)?;
    log::info!("{} nodes, {} arcs", num_nodes, arcs.len());

    let model = GraphModel::new(num_nodes, arcs, args.sink_handling.into())?;

    let mut pr = PageRank::new(&model);
    pr.alpha(args.alpha);
    if let Some(max_iter) = args.max_iter {
        pr.max_iter(max_iter);
    }

    let solution = pr.solve_with_logging(args.epsilon, &mut pl)?;

    log::info!(
        "Completed after {} iteration(s), sup delta = {}",
        solution.iterations,
        solution.sup_delta
    );
    if !solution.converged {
        log::warn!("The iteration cap was reached: storing the best-effort vector");
    }

    io::store_ascii(&args.output, &solution.rank, args.precision)?;

    if let Some(top) = args.top {
        for (place, &node) in utils::rank_order(&solution.rank)
            .iter()
            .take(top)
            .enumerate()
        {
            println!("{:>4} {:>12} {}", place + 1, node, solution.rank[node]);
        }
    }

    Ok(())
}
