//! No-op backend used when indexing is unavailable

use crate::index::{IndexBackend, IndexMatch, SimilarityIndex};
use mig_model::ActivityDescriptor;

/// Index that stores nothing and matches nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullIndex;

impl SimilarityIndex for NullIndex {
    fn index(&self, descriptor: ActivityDescriptor) {
        tracing::trace!(activity = %descriptor.name, "null index: dropping descriptor");
    }

    fn query(&self, _text: &str, _k: usize) -> Vec<IndexMatch> {
        Vec::new()
    }

    fn len(&self) -> usize {
        0
    }

    fn backend(&self) -> IndexBackend {
        IndexBackend::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mig_model::ActivityKind;

    #[test]
    fn null_index_degrades_gracefully() {
        let index = NullIndex;
        index.index(ActivityDescriptor::new(ActivityKind::HttpCall, "CallCreditBureau"));
        assert!(index.is_empty());
        assert!(index.query("REST or HTTP service call", 5).is_empty());
    }
}
