//! Plain-text graph format.
//!
//! ```text
//! Inputs 3
//! 1 2 3
//! Outputs 1
//! 4
//! Nodes 4
//! Edges 6
//! 1 5
//! ...
//! ```
//!
//! `Nodes` counts every non-input node. Internal nodes (neither input nor output) are
//! not listed; they are numbered consecutively after the largest declared id.

use super::{Graph, NodeId};
use crate::error::{Result, SchedulerError};
use std::collections::HashSet;
use std::path::Path;
use std::str::Lines;

impl Graph {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        log::debug!("Loaded graph file {}", path.display());
        Self::parse(&contents)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();

        let input_count = read_header(&mut lines, "Inputs")?;
        let inputs = read_ids(&mut lines, input_count, "Inputs")?;
        let output_count = read_header(&mut lines, "Outputs")?;
        let outputs = read_ids(&mut lines, output_count, "Outputs")?;
        let node_count = read_header(&mut lines, "Nodes")?;
        let edge_count = read_header(&mut lines, "Edges")?;

        let internal = node_count.checked_sub(output_count).ok_or_else(|| {
            SchedulerError::MalformedGraph(format!(
                "Nodes {} is smaller than Outputs {}",
                node_count, output_count
            ))
        })?;

        let mut ids = inputs.clone();
        ids.extend(&outputs);
        let first_internal = ids.iter().copied().max().unwrap_or(0) + 1;
        for offset in 0..internal {
            ids.push(first_internal + offset as NodeId);
        }

        let mut edges = Vec::with_capacity(edge_count);
        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if edges.len() == edge_count {
                return Err(SchedulerError::MalformedGraph(format!(
                    "more than the declared {} edges",
                    edge_count
                )));
            }
            edges.push(parse_edge(line)?);
        }
        if edges.len() != edge_count {
            return Err(SchedulerError::MalformedGraph(format!(
                "declared {} edges, found {}",
                edge_count,
                edges.len()
            )));
        }

        Ok(Graph::from_edges(&ids, &edges)?.with_terminals(inputs, outputs))
    }

    /// Render the graph in the same format [`Graph::parse`] accepts.
    ///
    /// Nodes that are neither declared inputs nor outputs are written under the ids
    /// [`Graph::parse`] will give them back, so the result always re-parses to an
    /// isomorphic graph.
    pub fn to_text(&self) -> String {
        let inputs = self.inputs();
        let outputs = self.outputs();
        let rendered = self.rendered_ids();

        let mut out = Vec::with_capacity(6 + self.edge_count());
        out.push(format!("Inputs {}", inputs.len()));
        out.push(join_ids(inputs));
        out.push(format!("Outputs {}", outputs.len()));
        out.push(join_ids(outputs));
        out.push(format!("Nodes {}", self.len() - inputs.len()));
        out.push(format!("Edges {}", self.edge_count()));

        for (idx, node) in self.nodes().iter().enumerate() {
            for &child in &node.children {
                out.push(format!("{} {}", rendered[idx], rendered[child]));
            }
        }

        out.join("\n")
    }

    // Arena index -> id in the text form; internal nodes follow the largest declared id.
    fn rendered_ids(&self) -> Vec<NodeId> {
        let declared: HashSet<NodeId> =
            self.inputs().iter().chain(self.outputs()).copied().collect();
        let mut next = declared.iter().copied().max().unwrap_or(0) + 1;

        self.nodes()
            .iter()
            .map(|node| {
                if declared.contains(&node.id()) {
                    return node.id();
                }
                let id = next;
                next += 1;
                id
            })
            .collect()
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_text())?;
        Ok(())
    }
}

fn join_ids(ids: &[NodeId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn read_header(lines: &mut Lines<'_>, keyword: &str) -> Result<usize> {
    let line = lines
        .next()
        .ok_or_else(|| SchedulerError::MalformedGraph(format!("missing {} header", keyword)))?;
    let mut parts = line.split_whitespace();

    if parts.next() != Some(keyword) {
        return Err(SchedulerError::MalformedGraph(format!(
            "expected '{} <n>', got '{}'",
            keyword, line
        )));
    }

    parts
        .next()
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| SchedulerError::MalformedGraph(format!("bad count in '{}'", line)))
}

fn read_ids(lines: &mut Lines<'_>, expected: usize, section: &str) -> Result<Vec<NodeId>> {
    let line = lines.next().unwrap_or("");
    let ids = line
        .split_whitespace()
        .map(|tok| {
            tok.parse::<NodeId>().map_err(|_| {
                SchedulerError::MalformedGraph(format!("bad node id '{}' in {}", tok, section))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if ids.len() != expected {
        return Err(SchedulerError::MalformedGraph(format!(
            "{} declares {} ids, found {}",
            section,
            expected,
            ids.len()
        )));
    }
    Ok(ids)
}

fn parse_edge(line: &str) -> Result<(NodeId, NodeId)> {
    let mut parts = line.split_whitespace().map(str::parse::<NodeId>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(src)), Some(Ok(dst)), None) => Ok((src, dst)),
        _ => Err(SchedulerError::MalformedGraph(format!(
            "bad edge line '{}'",
            line
        ))),
    }
}
