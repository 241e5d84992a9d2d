use opcua_types::{NodeClass, NodeId, ReferenceDescription};

use crate::cache::CacheNode;
use crate::events::CrawlObserver;
use crate::read_batcher::AttributeTarget;
use crate::scheduler::Task;
use crate::CrawlerState;

/// Node classes whose instances carry a `Value`, so need the variable
/// attributes read in addition to the structural ones.
fn is_variable_like(node_class: NodeClass) -> bool {
    matches!(node_class, NodeClass::Variable | NodeClass::VariableType)
}

/// Step 1 of the traversal driver: the first time a node is reached, it
/// is marked visited by the caller before this runs; here we just defer
/// its browse.
pub(crate) fn crawl_task<O: CrawlObserver>(state: &mut CrawlerState<O>, node_id: NodeId) {
    state.browse_batcher.defer_browse(node_id);
}

/// Processes one node's browse response: dedups references, resolves
/// the type definition, and works out which of its own attributes
/// still need reading (only the root node needs its browse name,
/// display name and node class read explicitly; every other node
/// arrives with those already known from the reference that discovered
/// it).
pub(crate) fn process_browse_result<O: CrawlObserver>(
    state: &mut CrawlerState<O>,
    node_id: NodeId,
    mut references: Vec<ReferenceDescription>,
) {
    dedup_references(&mut references);

    let type_definition = references
        .iter()
        .find(|r| {
            r.is_forward && r.reference_type_id == opcua_types::ReferenceTypeId::HasTypeDefinition.into()
        })
        .map(|r| r.node_id.node_id.clone());

    let node_class = state.cache.get(&node_id).and_then(|n| n.node_class);

    let mut needed = Vec::new();
    {
        let node = state.cache.get_or_create(&node_id);
        if node.is_browse_name_pending() {
            needed.push(AttributeTarget::BrowseName);
            needed.push(AttributeTarget::DisplayName);
            needed.push(AttributeTarget::NodeClass);
        }
        if type_definition.is_some() {
            node.type_definition = Some(type_definition.clone().unwrap());
        }
        node.references = Some(references);
    }

    if node_class.map(is_variable_like).unwrap_or(true) {
        // Unknown node class (root node, pending a read) is treated
        // conservatively as possibly-variable; the read comes back
        // empty/error for non-variable nodes and is simply ignored.
        needed.push(AttributeTarget::DataType);
        needed.push(AttributeTarget::Value);
        needed.push(AttributeTarget::MinimumSamplingInterval);
        needed.push(AttributeTarget::AccessLevel);
        needed.push(AttributeTarget::UserAccessLevel);
    }

    let mut outstanding = 0usize;
    for target in needed {
        if state.read_batcher.defer_read(node_id.clone(), target) {
            outstanding += 1;
        }
    }

    if outstanding == 0 {
        state.scheduler.unshift(Task::NodeReady(node_id));
    } else {
        state.outstanding_reads.insert(node_id, outstanding);
    }
}

fn dedup_references(references: &mut Vec<ReferenceDescription>) {
    let mut seen = hashbrown::HashSet::new();
    references.retain(|r| {
        seen.insert((
            r.reference_type_id.clone(),
            r.is_forward,
            r.node_id.clone(),
        ))
    });
}

/// A node's attributes have all resolved; emit its `browsed` event and
/// follow every reference it carries.
pub(crate) fn node_ready<O: CrawlObserver>(state: &mut CrawlerState<O>, node_id: NodeId) {
    state.crawled.insert(node_id.clone());

    let Some(node) = state.cache.get(&node_id) else {
        return;
    };
    let node = node.clone();
    state.observer.on_browsed(&node);

    let references = node.references.clone().unwrap_or_default();
    for reference in &references {
        follow_reference(state, &node_id, reference);
    }
}

/// Ensures a reference's type node and target node are both known to
/// the cache and scheduled for crawling if this is the first time
/// they've been seen.
fn follow_reference<O: CrawlObserver>(
    state: &mut CrawlerState<O>,
    parent: &NodeId,
    reference: &ReferenceDescription,
) {
    let reference_type_id = reference.reference_type_id.clone();
    if state.visited.insert(reference_type_id.clone()) {
        state.cache.get_or_create(&reference_type_id);
        state.scheduler.push(Task::Crawl(reference_type_id));
    }

    let target_id = reference.node_id.node_id.clone();
    if state.visited.insert(target_id.clone()) {
        let target = state.cache.get_or_create(&target_id);
        prefill_from_reference(target, reference);

        let parent_depth = state.depths.get(parent).copied().unwrap_or(0);
        let target_depth = parent_depth + 1;
        state.depths.insert(target_id.clone(), target_depth);

        if state.max_depth == 0 || target_depth < state.max_depth {
            state.scheduler.push(Task::Crawl(target_id));
        }
    } else {
        state.observer.on_extra_reference(parent, reference, &target_id);
    }
}

/// Seeds a freshly discovered node's browse name, display name and node
/// class straight from the reference that found it, so the read
/// batcher never has to ask the server for information it was already
/// given for free.
fn prefill_from_reference(node: &mut CacheNode, reference: &ReferenceDescription) {
    node.browse_name = reference.browse_name.clone();
    node.display_name = Some(reference.display_name.clone());
    node.node_class = Some(reference.node_class);
}
