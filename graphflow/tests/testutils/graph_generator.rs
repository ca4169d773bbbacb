//! Deterministic graph generators and reference traversals

use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, VecDeque};

pub type Edge = (u64, u64);

/// 0 -> 1 -> ... -> n-1
pub fn chain(n: u64) -> Vec<Edge> {
    (1..n).map(|i| (i - 1, i)).collect()
}

/// `m` random directed edges over `n` nodes; self loops and duplicates allowed
pub fn random_edges(n: u64, m: usize, seed: u64) -> Vec<Edge> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..m).map(|_| (rng.u64(0..n), rng.u64(0..n))).collect()
}

pub fn reversed(edges: &[Edge]) -> Vec<Edge> {
    edges.iter().map(|(s, d)| (*d, *s)).collect()
}

/// Unit-weight shortest path lengths from `src`, computed with petgraph
pub fn bfs_lengths(n: u64, edges: &[Edge], src: u64) -> BTreeMap<u64, i64> {
    let mut graph = DiGraph::<(), ()>::new();
    let nodes: Vec<NodeIndex> = (0..n).map(|_| graph.add_node(())).collect();
    for (s, d) in edges {
        graph.add_edge(nodes[*s as usize], nodes[*d as usize], ());
    }
    dijkstra(&graph, nodes[src as usize], None, |_| 1i64)
        .into_iter()
        .map(|(node, length)| (node.index() as u64, length))
        .collect()
}

fn adjacency(n: u64, edges: &[Edge]) -> Vec<Vec<u64>> {
    let mut adjacency = vec![Vec::new(); n as usize];
    for (s, d) in edges {
        adjacency[*s as usize].push(*d);
    }
    adjacency
}

/// Shortest path length and number of shortest paths from `src`
pub fn shortest_path_counts(n: u64, edges: &[Edge], src: u64) -> BTreeMap<u64, (i64, u64)> {
    let adjacency = adjacency(n, edges);
    let mut length = vec![-1i64; n as usize];
    let mut count = vec![0u64; n as usize];
    length[src as usize] = 0;
    count[src as usize] = 1;

    let mut queue = VecDeque::from([src]);
    while let Some(node) = queue.pop_front() {
        for &nbr in &adjacency[node as usize] {
            let (u, v) = (node as usize, nbr as usize);
            if length[v] < 0 {
                length[v] = length[u] + 1;
                queue.push_back(nbr);
            }
            if length[v] == length[u] + 1 {
                count[v] += count[u];
            }
        }
    }

    (0..n)
        .filter(|v| length[*v as usize] >= 0)
        .map(|v| (v, (length[v as usize], count[v as usize])))
        .collect()
}

/// Number of walks of every length in `[lower, upper]` from `src`, keyed by (dst, length)
pub fn walk_counts(
    n: u64,
    edges: &[Edge],
    src: u64,
    lower: i64,
    upper: i64,
) -> BTreeMap<(u64, i64), u64> {
    let adjacency = adjacency(n, edges);
    let mut current = vec![0u64; n as usize];
    current[src as usize] = 1;
    let mut result = BTreeMap::new();

    for length in 0..=upper {
        if length >= lower {
            for (v, walks) in current.iter().enumerate() {
                if *walks > 0 {
                    result.insert((v as u64, length), *walks);
                }
            }
        }
        let mut next = vec![0u64; n as usize];
        for (u, walks) in current.iter().enumerate() {
            for &v in &adjacency[u] {
                next[v as usize] += walks;
            }
        }
        current = next;
    }
    result
}
