/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Thin I/O collaborators: the arc-list loader and the rank-vector writer.
//!
//! These have no algorithmic content; the core consumes a fully materialized
//! arc list and hands back a plain vector of doubles.

use anyhow::{Context, Result, ensure};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Loads an ASCII arc list.
///
/// Each non-empty line holds a `source target` pair of node identifiers
/// separated by whitespace; lines starting with `#` are ignored. Returns the
/// size of the node universe and the arcs.
///
/// If `num_nodes` is `None` the universe is inferred as the largest
/// identifier plus one; if it is declared, arcs are returned as read and a
/// reference outside the declared universe is reported downstream by
/// [`GraphModel::new`](crate::graphs::GraphModel::new).
pub fn load_arcs(
    path: impl AsRef<Path>,
    num_nodes: Option<usize>,
) -> Result<(usize, Vec<(usize, usize)>)> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Could not open arc list at {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut arcs = Vec::new();
    let mut max_node = None;
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| {
            format!("Could not read line {} of {}", line_number + 1, path.display())
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let arc = (|| -> Result<(usize, usize)> {
            let src = tokens.next().context("missing source node")?.parse()?;
            let dst = tokens.next().context("missing target node")?.parse()?;
            ensure!(tokens.next().is_none(), "trailing tokens after the arc");
            Ok((src, dst))
        })()
        .with_context(|| {
            format!(
                "Malformed arc at line {} of {}: {:?}",
                line_number + 1,
                path.display(),
                line
            )
        })?;
        max_node = max_node.max(Some(arc.0.max(arc.1)));
        arcs.push(arc);
    }

    let num_nodes = num_nodes.unwrap_or(max_node.map_or(0, |max| max + 1));
    Ok((num_nodes, arcs))
}

/// Stores a rank vector in ASCII format, one value per line.
///
/// `precision` truncates the values to the specified number of decimal
/// digits; if `None`, the shortest round-trippable representation is used.
pub fn store_ascii(path: impl AsRef<Path>, values: &[f64], precision: Option<usize>) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Could not create vector at {}", path.display()))?;
    let mut file = BufWriter::new(file);

    for value in values {
        match precision {
            None => writeln!(file, "{}", value),
            Some(precision) => writeln!(file, "{value:.precision$}"),
        }
        .with_context(|| format!("Could not write vector to {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_arcs() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "# a comment")?;
        writeln!(file, "0 1")?;
        writeln!(file)?;
        writeln!(file, "1\t3")?;
        writeln!(file, "  2 0")?;

        let (num_nodes, arcs) = load_arcs(file.path(), None)?;
        assert_eq!(num_nodes, 4);
        assert_eq!(arcs, vec![(0, 1), (1, 3), (2, 0)]);
        Ok(())
    }

    #[test]
    fn test_load_arcs_declared_universe() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "0 1")?;

        let (num_nodes, arcs) = load_arcs(file.path(), Some(10))?;
        assert_eq!(num_nodes, 10);
        assert_eq!(arcs, vec![(0, 1)]);
        Ok(())
    }

    #[test]
    fn test_load_arcs_empty_file() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        let (num_nodes, arcs) = load_arcs(file.path(), None)?;
        assert_eq!(num_nodes, 0);
        assert!(arcs.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_arcs_malformed_line() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "0 1")?;
        writeln!(file, "2")?;

        let err = load_arcs(file.path(), None).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        Ok(())
    }

    #[test]
    fn test_store_ascii() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("ranks.txt");
        store_ascii(&path, &[0.5, 0.25, 0.25], None)?;
        assert_eq!(std::fs::read_to_string(&path)?, "0.5\n0.25\n0.25\n");

        store_ascii(&path, &[1.0 / 3.0], Some(3))?;
        assert_eq!(std::fs::read_to_string(&path)?, "0.333\n");
        Ok(())
    }
}
