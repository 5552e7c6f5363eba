//! Similarity index strategy interface

use crate::embedding::EmbeddingIndex;
use crate::null::NullIndex;
use mig_model::{ActivityDescriptor, ProcessDefinition};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// A ranked query hit
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    /// Indexed descriptor (copy owned by the index)
    pub descriptor: ActivityDescriptor,
    /// Similarity in `(0, 1]`, higher is closer
    pub score: f32,
}

/// Knowledge base over activity descriptors
///
/// Purely additive: there is no removal. Implementations never fail and
/// never block callers beyond the lock needed to append.
pub trait SimilarityIndex: Send + Sync + fmt::Debug {
    /// Append a descriptor's textual projection to the index
    fn index(&self, descriptor: ActivityDescriptor);

    /// Up to `k` matches ranked by descending similarity to `text`
    fn query(&self, text: &str, k: usize) -> Vec<IndexMatch>;

    /// Number of indexed descriptors
    fn len(&self) -> usize;

    /// Backend serving this index
    fn backend(&self) -> IndexBackend;

    /// Check if nothing has been indexed
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index every activity of a parsed process
    fn index_process(&self, process: &ProcessDefinition) {
        for activity in &process.activities {
            self.index(activity.clone());
        }
    }
}

/// Index backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Hashed embeddings with nearest-neighbour ranking
    #[default]
    Embedding,
    /// No-op backend
    None,
}

impl Display for IndexBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedding => f.write_str("embedding"),
            Self::None => f.write_str("none"),
        }
    }
}

impl FromStr for IndexBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "embedding" => Ok(Self::Embedding),
            "none" | "null" => Ok(Self::None),
            other => Err(format!("unknown index backend '{other}' (expected: embedding, none)")),
        }
    }
}

/// Create the run-wide index for a backend
///
/// Called once at startup; callers share the returned handle.
#[must_use]
pub fn build_index(backend: IndexBackend) -> Arc<dyn SimilarityIndex> {
    match backend {
        IndexBackend::Embedding => Arc::new(EmbeddingIndex::new()),
        IndexBackend::None => {
            tracing::warn!("similarity index disabled; activity lookups will return no matches");
            Arc::new(NullIndex)
        }
    }
}
