use std::collections::VecDeque;

use hashbrown::HashSet;
use opcua_types::{AttributeId, NodeId, ReadValueId};

use crate::cache::AttributeValue;
use crate::error::CrawlError;
use crate::session::{read_checked, CrawlSession};

/// A node attribute the crawler fills in via the read batcher, each
/// mapped to exactly one [`CacheNode`](crate::cache::CacheNode) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum AttributeTarget {
    BrowseName,
    DisplayName,
    NodeClass,
    DataType,
    Value,
    MinimumSamplingInterval,
    AccessLevel,
    UserAccessLevel,
}

impl AttributeTarget {
    pub(crate) fn attribute_id(self) -> AttributeId {
        match self {
            Self::BrowseName => AttributeId::BrowseName,
            Self::DisplayName => AttributeId::DisplayName,
            Self::NodeClass => AttributeId::NodeClass,
            Self::DataType => AttributeId::DataType,
            Self::Value => AttributeId::Value,
            Self::MinimumSamplingInterval => AttributeId::MinimumSamplingInterval,
            Self::AccessLevel => AttributeId::AccessLevel,
            Self::UserAccessLevel => AttributeId::UserAccessLevel,
        }
    }
}

/// Result of reading a single attribute: a good value, a good status
/// with a null value, or a non-good status.
pub(crate) enum AttributeReadOutcome {
    Good(opcua_types::Variant),
    Empty,
    Error(String),
}

/// Batches attribute reads across nodes into `Read` service calls
/// bounded by the server's `MaxNodesPerRead`, and memoizes by
/// `(NodeId, AttributeId)` so the same attribute is never read twice in
/// a single crawl, no matter how many traversal steps ask for it.
#[derive(Default)]
pub(crate) struct ReadBatcher {
    pending: VecDeque<(NodeId, AttributeTarget)>,
    deferred: HashSet<(NodeId, AttributeId)>,
}

impl ReadBatcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queues a read for `(node_id, target)`. Returns `true` if this is
    /// the first time this attribute has been requested for this node
    /// in this crawl, `false` if it was already deferred or resolved
    /// earlier and this call was a no-op.
    pub(crate) fn defer_read(&mut self, node_id: NodeId, target: AttributeTarget) -> bool {
        let key = (node_id.clone(), target.attribute_id());
        if !self.deferred.insert(key) {
            return false;
        }
        log::trace!("deferring read of {:?} on {node_id}", target.attribute_id());
        self.pending.push_back((node_id, target));
        true
    }

    /// Issues `Read` calls for up to `max_nodes_per_read` pending
    /// attributes at a time until the pending queue is drained,
    /// returning the resolved outcome for every attribute that was
    /// flushed.
    pub(crate) async fn flush<S: CrawlSession + ?Sized>(
        &mut self,
        session: &S,
        max_nodes_per_read: usize,
        transaction_counter: &mut u64,
    ) -> Result<Vec<(NodeId, AttributeTarget, AttributeReadOutcome)>, CrawlError> {
        let mut resolved = Vec::new();
        while !self.pending.is_empty() {
            let max_nodes_per_read = max_nodes_per_read.max(1);
            let chunk: Vec<(NodeId, AttributeTarget)> =
                self.pending.drain(..self.pending.len().min(max_nodes_per_read)).collect();
            let to_read: Vec<ReadValueId> = chunk
                .iter()
                .map(|(node_id, target)| ReadValueId::new(node_id.clone(), target.attribute_id()))
                .collect();

            *transaction_counter += 1;
            log::debug!(
                "flushing read batch of {} attribute(s) (transaction {})",
                to_read.len(),
                transaction_counter
            );
            let values = read_checked(session, &to_read).await?;

            for ((node_id, target), data_value) in chunk.into_iter().zip(values.into_iter()) {
                let outcome = resolve(data_value);
                resolved.push((node_id, target, outcome));
            }
        }
        Ok(resolved)
    }
}

fn resolve(data_value: opcua_types::DataValue) -> AttributeReadOutcome {
    let status = data_value.status.unwrap_or(opcua_types::StatusCode::Good);
    if !status.is_good() {
        return AttributeReadOutcome::Error(format!("{status}"));
    }
    match data_value.value {
        Some(value) => AttributeReadOutcome::Good(value),
        None => AttributeReadOutcome::Empty,
    }
}

/// Turns a resolved read outcome into the value stored on a cache node,
/// per the crawler's Good/empty/error delivery contract.
pub(crate) fn outcome_to_attribute_value(outcome: AttributeReadOutcome) -> Option<AttributeValue> {
    match outcome {
        AttributeReadOutcome::Good(value) => Some(AttributeValue::Value(value)),
        AttributeReadOutcome::Empty => Some(AttributeValue::Empty),
        AttributeReadOutcome::Error(status) => Some(AttributeValue::Error(status)),
    }
}
