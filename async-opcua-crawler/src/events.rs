use opcua_types::{NodeId, ReferenceDescription};

use crate::cache::CacheNode;

/// Observer hooks a caller can use to react to crawl progress.
///
/// All methods have no-op default implementations; implement only the
/// ones you need. `on_browsed` fires once per node after all of its
/// attributes have resolved, mirroring the `browsed` event. `on_end`
/// fires once the work queue goes quiescent, mirroring the `end` event.
pub trait CrawlObserver {
    /// A node has been fully browsed and its attributes resolved.
    fn on_browsed(&mut self, _node: &CacheNode) {}

    /// A reference was followed to a node that had already been
    /// crawled, so it was not scheduled again. Fires for every such
    /// reference, not just the first.
    fn on_extra_reference(
        &mut self,
        _parent: &NodeId,
        _reference: &ReferenceDescription,
        _target: &NodeId,
    ) {
    }

    /// The crawl's work queue has gone quiescent.
    fn on_end(&mut self) {}
}

/// An observer that does nothing, used when a caller doesn't need to
/// react to individual crawl events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CrawlObserver for NoopObserver {}

/// An observer that logs progress at debug level, useful while working
/// interactively against a server.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl CrawlObserver for LoggingObserver {
    fn on_browsed(&mut self, node: &CacheNode) {
        log::debug!(
            "browsed {} ({})",
            node.node_id,
            node.browse_name.name.as_ref()
        );
    }

    fn on_extra_reference(
        &mut self,
        parent: &NodeId,
        reference: &ReferenceDescription,
        target: &NodeId,
    ) {
        log::debug!(
            "extra reference from {parent} to already-crawled node {target} via {}",
            reference.reference_type_id
        );
    }

    fn on_end(&mut self) {
        log::debug!("crawl finished");
    }
}
