use hashbrown::HashSet;
use opcua_types::{NodeId, ReferenceTypeId};

use crate::cache::CacheNodeStore;

/// The standard reference types a crawl relies on to derive edge names
/// and to walk the type/containment hierarchy, seeded up front so the
/// crawler never has to browse or read them itself.
const STANDARD_REFERENCE_TYPES: &[(ReferenceTypeId, &str)] = &[
    (ReferenceTypeId::HasTypeDefinition, "HasTypeDefinition"),
    (ReferenceTypeId::HasChild, "HasChild"),
    (ReferenceTypeId::HasProperty, "HasProperty"),
    (ReferenceTypeId::HasComponent, "HasComponent"),
    (
        ReferenceTypeId::HasHistoricalConfiguration,
        "HasHistoricalConfiguration",
    ),
    (ReferenceTypeId::HasSubtype, "HasSubtype"),
    (ReferenceTypeId::Organizes, "Organizes"),
    (ReferenceTypeId::HasEventSource, "HasEventSource"),
];

/// Seeds `cache` with the standard reference types and marks them both
/// visited and crawled, so the traversal driver skips them entirely
/// instead of browsing or reading them like an ordinary node.
pub(crate) fn prepopulate(
    cache: &mut CacheNodeStore,
    visited: &mut HashSet<NodeId>,
    crawled: &mut HashSet<NodeId>,
) {
    for (reference_type, name) in STANDARD_REFERENCE_TYPES {
        let node_id: NodeId = (*reference_type).into();
        cache.create_prepopulated(node_id.clone(), name);
        visited.insert(node_id.clone());
        crawled.insert(node_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_all_standard_reference_types() {
        let mut cache = CacheNodeStore::new();
        let mut visited = HashSet::new();
        let mut crawled = HashSet::new();
        prepopulate(&mut cache, &mut visited, &mut crawled);

        assert_eq!(cache.len(), STANDARD_REFERENCE_TYPES.len());
        for (reference_type, name) in STANDARD_REFERENCE_TYPES {
            let node_id: NodeId = (*reference_type).into();
            let node = cache.get(&node_id).expect("prepopulated node present");
            assert_eq!(node.browse_name.name.as_ref(), *name);
            assert!(visited.contains(&node_id));
            assert!(crawled.contains(&node_id));
        }
    }
}
