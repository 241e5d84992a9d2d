use std::collections::VecDeque;

use opcua_types::{
    BrowseDescription, BrowseDirection, BrowseResultMaskFlags, NodeClassMask, NodeId,
    ReferenceDescription, ReferenceTypeId,
};

use crate::error::CrawlError;
use crate::session::{browse_checked, CrawlSession};

/// Result of browsing a single node: either its forward references, or
/// the reason browsing it failed.
pub(crate) enum BrowseOutcome {
    References(Vec<ReferenceDescription>),
    Error(String),
}

/// Batches forward browse requests across nodes into `Browse` service
/// calls bounded by the server's `MaxNodesPerBrowse`.
///
/// Every request asks for all hierarchical and non-hierarchical forward
/// references via the `References` supertype with `include_subtypes`
/// set, since the crawler always wants the complete reference set for a
/// node, not a filtered subset.
#[derive(Default)]
pub(crate) struct BrowseBatcher {
    pending: VecDeque<NodeId>,
}

impl BrowseBatcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn defer_browse(&mut self, node_id: NodeId) {
        log::trace!("deferring browse of {node_id}");
        self.pending.push_back(node_id);
    }

    /// Issues `Browse` calls for up to `max_nodes_per_browse` pending
    /// nodes at a time until the pending queue is drained.
    ///
    /// A non-null continuation point in a response is treated as a
    /// protocol violation: the crawler never sets a references-per-node
    /// cap, so a well-behaved server should never need one.
    pub(crate) async fn flush<S: CrawlSession + ?Sized>(
        &mut self,
        session: &S,
        max_nodes_per_browse: usize,
        transaction_counter: &mut u64,
        browse_counter: &mut u64,
    ) -> Result<Vec<(NodeId, BrowseOutcome)>, CrawlError> {
        let mut resolved = Vec::new();
        while !self.pending.is_empty() {
            let max_nodes_per_browse = max_nodes_per_browse.max(1);
            let chunk: Vec<NodeId> = self
                .pending
                .drain(..self.pending.len().min(max_nodes_per_browse))
                .collect();
            let to_browse: Vec<BrowseDescription> = chunk
                .iter()
                .map(|node_id| BrowseDescription {
                    node_id: node_id.clone(),
                    browse_direction: BrowseDirection::Forward,
                    reference_type_id: ReferenceTypeId::References.into(),
                    include_subtypes: true,
                    node_class_mask: NodeClassMask::empty().bits(),
                    result_mask: BrowseResultMaskFlags::all().bits(),
                })
                .collect();

            *transaction_counter += 1;
            log::debug!(
                "flushing browse batch of {} node(s) (transaction {})",
                to_browse.len(),
                transaction_counter
            );
            let results = browse_checked(session, &to_browse).await?;

            for (node_id, result) in chunk.into_iter().zip(results.into_iter()) {
                *browse_counter += 1;
                if !result.status_code.is_good() {
                    resolved.push((node_id, BrowseOutcome::Error(format!("{}", result.status_code))));
                    continue;
                }
                if !result.continuation_point.is_null() {
                    return Err(CrawlError::ProtocolViolation(format!(
                        "server returned a continuation point browsing {node_id}, which this crawler never requests"
                    )));
                }
                let references = result.references.unwrap_or_default();
                resolved.push((node_id, BrowseOutcome::References(references)));
            }
        }
        Ok(resolved)
    }
}
