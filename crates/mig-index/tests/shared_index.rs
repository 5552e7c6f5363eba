//! Shared-index behaviour across concurrent writers and readers

use mig_index::{build_index, IndexBackend, SimilarityIndex};
use mig_model::{ActivityDescriptor, ActivityKind};
use std::sync::Arc;
use std::thread;

fn descriptor(unit: usize, i: usize) -> ActivityDescriptor {
    let kind = match i % 3 {
        0 => ActivityKind::DatabaseCall,
        1 => ActivityKind::MessageCall,
        _ => ActivityKind::HttpCall,
    };
    ActivityDescriptor::new(kind, format!("Unit{unit}Step{i}"))
}

#[test]
fn concurrent_appends_are_all_retained() {
    let index: Arc<dyn SimilarityIndex> = build_index(IndexBackend::Embedding);

    let handles: Vec<_> = (0..8)
        .map(|unit| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for i in 0..25 {
                    index.index(descriptor(unit, i));
                    let _ = index.query("SQL database operation", 3);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(index.len(), 200);
    assert_eq!(index.query("JMS messaging operation", 3).len(), 3);
}

#[test]
fn null_backend_stays_empty_under_writes() {
    let index = build_index(IndexBackend::None);
    for i in 0..10 {
        index.index(descriptor(0, i));
    }
    assert!(index.is_empty());
    assert!(index.query("REST or HTTP service call", 3).is_empty());
}
