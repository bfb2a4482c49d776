//! Artifacts produced by one engine run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an embedding's words are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingKind {
    /// Words are vertex ids
    VertexInduced,
    /// Words are edge ids
    EdgeInduced,
}

/// One discovered subgraph instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Embedding {
    pub kind: EmbeddingKind,
    pub words: Vec<u32>,
}

impl Embedding {
    pub fn vertex_induced(words: Vec<u32>) -> Self {
        Self {
            kind: EmbeddingKind::VertexInduced,
            words,
        }
    }

    pub fn edge_induced(words: Vec<u32>) -> Self {
        Self {
            kind: EmbeddingKind::EdgeInduced,
            words,
        }
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words as text tokens
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.words.iter().map(u32::to_string)
    }

    /// Whitespace-joined token line
    pub fn to_output_line(&self) -> String {
        self.tokens().collect::<Vec<_>>().join(" ")
    }
}

/// Final embeddings of one engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSet {
    /// Run that produced the embeddings
    pub run_id: Uuid,
    pub embeddings: Vec<Embedding>,
}

impl EmbeddingSet {
    pub fn new(run_id: Uuid, embeddings: Vec<Embedding>) -> Self {
        Self { run_id, embeddings }
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Embedding> {
        self.embeddings.iter()
    }

    /// One output line per embedding
    pub fn to_output_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.embeddings.iter().map(Embedding::to_output_line)
    }
}

/// Compact per-superstep record of not-yet-finalized candidate extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    pub superstep: u32,
    pub partition: u32,
    pub candidate_count: u64,
    /// Engine-specific encoding of the candidates
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub encoded: Vec<u8>,
}

/// Output descriptors of one engine run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDescriptorSet {
    pub run_id: Uuid,
    pub descriptors: Vec<OutputDescriptor>,
}

impl OutputDescriptorSet {
    pub fn new(run_id: Uuid, descriptors: Vec<OutputDescriptor>) -> Self {
        Self { run_id, descriptors }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors produced in one superstep
    pub fn for_superstep(&self, superstep: u32) -> impl Iterator<Item = &OutputDescriptor> {
        self.descriptors
            .iter()
            .filter(move |d| d.superstep == superstep)
    }

    /// Number of supersteps that produced descriptors
    pub fn num_supersteps(&self) -> u32 {
        self.descriptors
            .iter()
            .map(|d| d.superstep + 1)
            .max()
            .unwrap_or(0)
    }

    /// Total candidates across all supersteps
    pub fn total_candidates(&self) -> u64 {
        self.descriptors.iter().map(|d| d.candidate_count).sum()
    }
}
