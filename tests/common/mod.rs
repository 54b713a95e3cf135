#![allow(dead_code)]

use memsched::Graph;
use std::path::PathBuf;

/// Inputs 1..3, output 4, internal nodes 5..7.
pub const SCENARIO: &str = "Inputs 3\n1 2 3\nOutputs 1\n4\nNodes 4\nEdges 6\n1 5\n2 7\n3 6\n5 7\n6 4\n7 4";

pub fn scenario() -> Graph {
    Graph::parse(SCENARIO).unwrap()
}

/// Four inputs feeding twelve nodes; node `n` depends on `n - 4` and `n - 3`.
pub fn layered() -> Graph {
    let ids: Vec<u32> = (1..=16).collect();
    let edges: Vec<(u32, u32)> = (5..=16).flat_map(|n| [(n - 4, n), (n - 3, n)]).collect();
    Graph::from_edges(&ids, &edges).unwrap()
}

pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("memsched-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
