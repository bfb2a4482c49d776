//! In-memory input graph and the built-in adjacency-list loader.
//!
//! Line format, one vertex per line:
//!
//! ```text
//! # comment
//! <vertex-id> <vertex-label> [<neighbour-id> ...]
//! ```
//!
//! Vertex ids must be dense (`0..n`). Each undirected edge is stored once.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::strategy::GraphLoader;
use crate::{Error, Result};

const FILE_SCHEME: &str = "file://";

/// Input graph handed to the engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MainGraph {
    vertex_labels: Vec<u32>,
    edges: Vec<(u32, u32)>,
}

impl MainGraph {
    /// Build from labels and edges. Edge endpoints must be valid vertex ids.
    pub fn new(vertex_labels: Vec<u32>, edges: Vec<(u32, u32)>) -> Result<Self> {
        let n = vertex_labels.len() as u32;
        if let Some(&(a, b)) = edges.iter().find(|(a, b)| *a >= n || *b >= n) {
            return Err(Error::graph_load(
                "<memory>",
                format!("edge ({a}, {b}) references a vertex outside 0..{n}"),
            ));
        }
        Ok(Self {
            vertex_labels,
            edges,
        })
    }

    /// Parse the adjacency-list text format
    pub fn parse_adjacency_list(source: &str, text: &str) -> Result<Self> {
        let mut labels: BTreeMap<u32, u32> = BTreeMap::new();
        let mut edges = BTreeSet::new();

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace().map(|f| {
                f.parse::<u32>().map_err(|_| {
                    Error::graph_load(source, format!("line {}: invalid number '{f}'", lineno + 1))
                })
            });

            let vertex = match fields.next() {
                Some(v) => v?,
                None => continue,
            };
            let label = fields.next().ok_or_else(|| {
                Error::graph_load(source, format!("line {}: missing vertex label", lineno + 1))
            })??;

            labels.insert(vertex, label);

            for neighbour in fields {
                let neighbour = neighbour?;
                if neighbour != vertex {
                    edges.insert((vertex.min(neighbour), vertex.max(neighbour)));
                }
            }
        }

        // Ids are dense iff the sorted keys are exactly 0..len
        let vertex_labels = labels
            .into_iter()
            .enumerate()
            .map(|(expected, (vertex, label))| {
                if vertex as usize == expected {
                    Ok(label)
                } else {
                    Err(Error::graph_load(source, format!("vertex {expected} is never defined")))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(vertex_labels, edges.into_iter().collect())
            .map_err(|e| match e {
                Error::GraphLoad { message, .. } => Error::graph_load(source, message),
                other => other,
            })
    }

    pub fn num_vertices(&self) -> usize {
        self.vertex_labels.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex_label(&self, vertex: u32) -> Option<u32> {
        self.vertex_labels.get(vertex as usize).copied()
    }

    /// Endpoints of an edge id
    pub fn edge(&self, edge: u32) -> Option<(u32, u32)> {
        self.edges.get(edge as usize).copied()
    }

    pub fn edges(&self) -> &[(u32, u32)] {
        &self.edges
    }

    /// Neighbours of a vertex
    pub fn neighbours(&self, vertex: u32) -> impl Iterator<Item = u32> + '_ {
        self.edges.iter().filter_map(move |&(a, b)| {
            if a == vertex {
                Some(b)
            } else if b == vertex {
                Some(a)
            } else {
                None
            }
        })
    }
}

/// Built-in loader for adjacency-list files on the local filesystem
#[derive(Debug, Clone, Default)]
pub struct AdjacencyListLoader;

impl AdjacencyListLoader {
    pub const ID: &'static str = "adjacency_list";
}

impl GraphLoader for AdjacencyListLoader {
    fn id(&self) -> &str {
        Self::ID
    }

    fn load(&self, path: &str, local: bool) -> Result<MainGraph> {
        let fs_path = match path.strip_prefix(FILE_SCHEME) {
            Some(stripped) => stripped,
            None if path.contains("://") => {
                return Err(Error::graph_load(
                    path,
                    "adjacency_list loader only reads local files; register a distributed loader",
                ));
            }
            None => path,
        };

        debug!(path = %fs_path, local, "Reading adjacency list");
        let text = std::fs::read_to_string(fs_path)
            .map_err(|e| Error::graph_load(path, e.to_string()))?;
        let graph = MainGraph::parse_adjacency_list(path, &text)?;

        info!(
            path = %path,
            vertices = graph.num_vertices(),
            edges = graph.num_edges(),
            "Loaded input graph"
        );
        Ok(graph)
    }
}
