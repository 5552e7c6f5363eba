//! Activity Similarity Index
//!
//! Shared knowledge base of activity descriptors, queried by free text.
//!
//! # Overview
//!
//! - **SimilarityIndex**: the strategy interface (`index` / `query`)
//! - **EmbeddingIndex**: hashed bag-of-words embeddings with L2 ranking
//! - **NullIndex**: degraded mode, every query returns nothing
//!
//! The backend is chosen once per run through [`build_index`]. Writers hold
//! an exclusive lock for the duration of a single `index` call, so lazy
//! per-unit indexing during concurrent analysis stays serialised.
//!
//! # Example
//!
//! ```rust
//! use mig_index::{build_index, IndexBackend};
//! use mig_model::{ActivityDescriptor, ActivityKind};
//!
//! let index = build_index(IndexBackend::Embedding);
//! index.index(ActivityDescriptor::new(ActivityKind::MessageCall, "PublishDecision"));
//!
//! let hits = index.query("JMS messaging operation", 3);
//! assert_eq!(hits[0].descriptor.name, "PublishDecision");
//! ```

#![warn(missing_docs)]

mod embedding;
mod index;
mod null;
mod tokenize;

pub use embedding::{EmbeddingIndex, DEFAULT_DIMENSION};
pub use index::{build_index, IndexBackend, IndexMatch, SimilarityIndex};
pub use null::NullIndex;
pub use tokenize::tokenize;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
