//! Hashed bag-of-words embedding backend

use crate::index::{IndexBackend, IndexMatch, SimilarityIndex};
use crate::tokenize::tokenize;
use mig_model::ActivityDescriptor;
use parking_lot::RwLock;

/// Default embedding width
pub const DEFAULT_DIMENSION: usize = 384;

/// Indexed descriptor with its embedding
#[derive(Debug, Clone)]
struct IndexedActivity {
    descriptor: ActivityDescriptor,
    embedding: Vec<f32>,
}

/// Embedding-backed similarity index
///
/// Each token is hashed (blake3) into one of `dimension` buckets with a
/// hash-derived sign; the resulting vector is L2-normalised. Queries rank
/// by L2 distance and report `1 / (1 + distance)`.
#[derive(Debug)]
pub struct EmbeddingIndex {
    dimension: usize,
    entries: RwLock<Vec<IndexedActivity>>,
}

impl EmbeddingIndex {
    /// Create empty index with the default dimension
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_DIMENSION)
    }

    /// Create empty index with a specific dimension (at least 1)
    #[inline]
    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Embedding width
    #[inline]
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let hash = blake3::hash(token.as_bytes());
            let bytes = hash.as_bytes();
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&bytes[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimension as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for EmbeddingIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt()
}

impl SimilarityIndex for EmbeddingIndex {
    fn index(&self, descriptor: ActivityDescriptor) {
        let embedding = self.embed(&descriptor.projection());
        self.entries.write().push(IndexedActivity { descriptor, embedding });
    }

    fn query(&self, text: &str, k: usize) -> Vec<IndexMatch> {
        if k == 0 {
            return Vec::new();
        }
        let query = self.embed(text);
        let entries = self.entries.read();

        let mut scored: Vec<(f32, usize)> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (l2_distance(&query, &entry.embedding), i))
            .collect();
        // Stable: equal distances keep insertion order
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        scored
            .into_iter()
            .take(k)
            .map(|(distance, i)| IndexMatch {
                descriptor: entries[i].descriptor.clone(),
                score: 1.0 / (1.0 + distance),
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn backend(&self) -> IndexBackend {
        IndexBackend::Embedding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mig_model::ActivityKind;

    fn sample_index() -> EmbeddingIndex {
        let index = EmbeddingIndex::new();
        index.index(
            ActivityDescriptor::new(ActivityKind::DatabaseCall, "StoreLoan")
                .with_entry("database", "loans")
                .with_entry("sql", "INSERT INTO loans (id, amount) VALUES (?, ?)"),
        );
        index.index(
            ActivityDescriptor::new(ActivityKind::MessageCall, "PublishDecision")
                .with_entry("queue", "loan.decisions"),
        );
        index.index(
            ActivityDescriptor::new(ActivityKind::HttpCall, "CallCreditBureau")
                .with_entry("method", "POST")
                .with_entry("url", "http://bureau/score"),
        );
        index
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = EmbeddingIndex::new();
        assert!(index.query("anything", 5).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn query_ranks_matching_family_first() {
        let index = sample_index();

        let sql = index.query("SQL database operation", 3);
        assert_eq!(sql.len(), 3);
        assert_eq!(sql[0].descriptor.kind, ActivityKind::DatabaseCall);

        let jms = index.query("JMS messaging operation queue", 1);
        assert_eq!(jms[0].descriptor.kind, ActivityKind::MessageCall);

        let http = index.query("REST or HTTP service call", 1);
        assert_eq!(http[0].descriptor.kind, ActivityKind::HttpCall);
    }

    #[test]
    fn scores_are_descending_and_bounded() {
        let index = sample_index();
        let hits = index.query("loan", 3);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for hit in &hits {
            assert!(hit.score > 0.0 && hit.score <= 1.0);
        }
    }

    #[test]
    fn identical_projection_scores_one() {
        let index = EmbeddingIndex::new();
        let descriptor = ActivityDescriptor::new(ActivityKind::HttpCall, "Ping");
        index.index(descriptor.clone());
        let hits = index.query(&descriptor.projection(), 1);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn k_limits_results() {
        let index = sample_index();
        assert_eq!(index.query("loan", 2).len(), 2);
        assert!(index.query("loan", 0).is_empty());
    }
}
