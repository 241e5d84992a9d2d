//! Crawls an OPC UA server's address space into an in-memory cache, and
//! optionally denormalizes that cache into a single JSON tree.
//!
//! The heavy lifting is a single-threaded, cooperative scheduler
//! ([`scheduler`]) that drives two batchers ([`browse_batcher`],
//! [`read_batcher`]) bounded by the server's own `MaxNodesPerBrowse` and
//! `MaxNodesPerRead` limits, so crawling a large address space costs a
//! handful of round trips rather than one per node.
//!
//! ```no_run
//! # async fn run(session: &opcua_client::Session) -> Result<(), opcua_crawler::CrawlError> {
//! use opcua_types::NodeId;
//!
//! let root = NodeId::new(0, 85u32); // ObjectsFolder
//! let tree = opcua_crawler::read(session, root).await?;
//! println!("{tree}");
//! # Ok(())
//! # }
//! ```

mod browse_batcher;
mod cache;
mod error;
mod events;
mod finalize;
mod limits;
mod prepopulate;
mod read_batcher;
mod scheduler;
mod session;
mod traversal;

use std::time::{Duration, Instant};

use hashbrown::{HashMap, HashSet};
use opcua_types::NodeId;

use browse_batcher::{BrowseBatcher, BrowseOutcome};
use limits::OperationLimits;
use read_batcher::{AttributeReadOutcome, AttributeTarget, ReadBatcher};
use scheduler::{Scheduler, Task};

pub use cache::{AttributeValue, CacheNode, CacheNodeStore};
pub use error::CrawlError;
pub use events::{CrawlObserver, LoggingObserver, NoopObserver};
pub use finalize::finalize;
pub use session::CrawlSession;

/// Configuration for a [`Crawler`], layered over whatever operation
/// limits the server itself reports.
#[derive(Debug, Clone, Default)]
pub struct CrawlerConfig {
    max_nodes_per_read_override: Option<u32>,
    max_nodes_per_browse_override: Option<u32>,
    max_depth: usize,
}

impl CrawlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the read batch size regardless of what the server reports,
    /// useful for servers that advertise a limit larger than they can
    /// actually service reliably.
    pub fn max_nodes_per_read(mut self, max_nodes_per_read: u32) -> Self {
        self.max_nodes_per_read_override = Some(max_nodes_per_read);
        self
    }

    pub fn max_nodes_per_browse(mut self, max_nodes_per_browse: u32) -> Self {
        self.max_nodes_per_browse_override = Some(max_nodes_per_browse);
        self
    }

    /// Caps how many hops from the start node are browsed further. A
    /// node at `max_depth` hops is still discovered and cached, but its
    /// own references are never browsed. `0` (the default) means
    /// unlimited.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

pub(crate) struct CrawlerState<O: CrawlObserver> {
    cache: CacheNodeStore,
    visited: HashSet<NodeId>,
    crawled: HashSet<NodeId>,
    scheduler: Scheduler,
    browse_batcher: BrowseBatcher,
    read_batcher: ReadBatcher,
    outstanding_reads: HashMap<NodeId, usize>,
    limits: OperationLimits,
    depths: HashMap<NodeId, usize>,
    max_depth: usize,
    observer: O,
    read_counter: u64,
    browse_counter: u64,
    transaction_counter: u64,
    start_time: Option<Instant>,
}

impl<O: CrawlObserver> CrawlerState<O> {
    fn new(observer: O) -> Self {
        Self {
            cache: CacheNodeStore::new(),
            visited: HashSet::new(),
            crawled: HashSet::new(),
            scheduler: Scheduler::new(),
            browse_batcher: BrowseBatcher::new(),
            read_batcher: ReadBatcher::new(),
            outstanding_reads: HashMap::new(),
            limits: OperationLimits::default(),
            depths: HashMap::new(),
            max_depth: 0,
            observer,
            read_counter: 0,
            browse_counter: 0,
            transaction_counter: 0,
            start_time: None,
        }
    }
}

/// Crawls an address space, building a [`CacheNodeStore`] of every node
/// reachable from a starting point via forward hierarchical and
/// non-hierarchical references.
///
/// `O` is the [`CrawlObserver`] notified of progress; use
/// [`NoopObserver`] (the default via [`Crawler::new`]) if you only care
/// about the resulting cache.
pub struct Crawler<O: CrawlObserver = NoopObserver> {
    config: CrawlerConfig,
    state: CrawlerState<O>,
}

impl Crawler<NoopObserver> {
    pub fn new() -> Self {
        Self::with_observer(NoopObserver)
    }
}

impl Default for Crawler<NoopObserver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: CrawlObserver> Crawler<O> {
    pub fn with_observer(observer: O) -> Self {
        Self::with_config(observer, CrawlerConfig::default())
    }

    pub fn with_config(observer: O, config: CrawlerConfig) -> Self {
        Self {
            config,
            state: CrawlerState::new(observer),
        }
    }

    /// Crawls the address space reachable from `start`, populating
    /// [`Crawler::cache`]. Idempotent to call once; a second call on the
    /// same `Crawler` would re-crawl everything, since `visited` is
    /// never reset.
    pub async fn crawl<S: CrawlSession + ?Sized>(
        &mut self,
        session: &S,
        start: NodeId,
    ) -> Result<(), CrawlError> {
        self.state.start_time = Some(Instant::now());
        prepopulate::prepopulate(
            &mut self.state.cache,
            &mut self.state.visited,
            &mut self.state.crawled,
        );

        let discovered = limits::read_operation_limits(session).await?;
        self.state.limits = OperationLimits {
            max_nodes_per_read: self
                .config
                .max_nodes_per_read_override
                .unwrap_or(discovered.max_nodes_per_read),
            max_nodes_per_browse: self
                .config
                .max_nodes_per_browse_override
                .unwrap_or(discovered.max_nodes_per_browse),
        };

        self.state.max_depth = self.config.max_depth;
        self.state.depths.insert(start.clone(), 0);
        self.state.visited.insert(start.clone());
        self.state.cache.get_or_create(&start);
        self.state.scheduler.push(Task::Crawl(start));

        while let Some(task) = self.state.scheduler.pop() {
            match task {
                Task::Crawl(node_id) => traversal::crawl_task(&mut self.state, node_id),
                Task::NodeReady(node_id) => traversal::node_ready(&mut self.state, node_id),
                Task::FlushBrowseMarker => {
                    self.state.scheduler.clear_browse_flush_pending();
                    self.flush_browse(session).await?;
                }
                Task::FlushReadMarker => {
                    self.state.scheduler.clear_read_flush_pending();
                    self.flush_read(session).await?;
                }
            }

            if !self.state.browse_batcher.is_empty() {
                self.state.scheduler.request_browse_flush();
            }
            if !self.state.read_batcher.is_empty() {
                self.state.scheduler.request_read_flush();
            }
        }

        self.state.observer.on_end();
        Ok(())
    }

    async fn flush_browse<S: CrawlSession + ?Sized>(&mut self, session: &S) -> Result<(), CrawlError> {
        let results = self
            .state
            .browse_batcher
            .flush(
                session,
                self.state.limits.max_nodes_per_browse as usize,
                &mut self.state.transaction_counter,
                &mut self.state.browse_counter,
            )
            .await?;

        for (node_id, outcome) in results {
            match outcome {
                BrowseOutcome::References(references) => {
                    traversal::process_browse_result(&mut self.state, node_id, references)
                }
                BrowseOutcome::Error(status) => {
                    log::warn!("browse of {node_id} failed: {status}");
                    self.state.cache.get_or_create(&node_id).references = Some(Vec::new());
                    self.state.scheduler.unshift(Task::NodeReady(node_id));
                }
            }
        }
        Ok(())
    }

    async fn flush_read<S: CrawlSession + ?Sized>(&mut self, session: &S) -> Result<(), CrawlError> {
        let results = self
            .state
            .read_batcher
            .flush(
                session,
                self.state.limits.max_nodes_per_read as usize,
                &mut self.state.transaction_counter,
            )
            .await?;

        for (node_id, target, outcome) in results {
            self.state.read_counter += 1;
            apply_attribute(&mut self.state.cache, &node_id, target, outcome);

            if let Some(remaining) = self.state.outstanding_reads.get_mut(&node_id) {
                *remaining -= 1;
                if *remaining == 0 {
                    self.state.outstanding_reads.remove(&node_id);
                    self.state.scheduler.unshift(Task::NodeReady(node_id));
                }
            }
        }
        Ok(())
    }

    pub fn cache(&self) -> &CacheNodeStore {
        &self.state.cache
    }

    pub fn read_counter(&self) -> u64 {
        self.state.read_counter
    }

    pub fn browse_counter(&self) -> u64 {
        self.state.browse_counter
    }

    pub fn transaction_counter(&self) -> u64 {
        self.state.transaction_counter
    }

    pub fn elapsed(&self) -> Duration {
        self.state
            .start_time
            .map(|t| t.elapsed())
            .unwrap_or_default()
    }

    pub fn observer(&self) -> &O {
        &self.state.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.state.observer
    }
}

fn apply_attribute(
    cache: &mut CacheNodeStore,
    node_id: &NodeId,
    target: AttributeTarget,
    outcome: AttributeReadOutcome,
) {
    let node = cache.get_or_create(node_id);
    match (target, outcome) {
        (AttributeTarget::BrowseName, AttributeReadOutcome::Good(v)) => {
            if let Ok(qn) = v.try_cast_to::<opcua_types::QualifiedName>() {
                node.browse_name = qn;
            }
        }
        (AttributeTarget::DisplayName, AttributeReadOutcome::Good(v)) => {
            if let Ok(lt) = v.try_cast_to::<opcua_types::LocalizedText>() {
                node.display_name = Some(lt);
            }
        }
        (AttributeTarget::NodeClass, AttributeReadOutcome::Good(v)) => {
            if let Ok(raw) = v.try_cast_to::<i32>() {
                match node_class_from_i32(raw) {
                    Some(nc) => node.node_class = Some(nc),
                    None => log::warn!("unknown node class value {raw} for {node_id}"),
                }
            }
        }
        (AttributeTarget::DataType, AttributeReadOutcome::Good(v)) => {
            if let Ok(dt) = v.try_cast_to::<opcua_types::NodeId>() {
                node.data_type = Some(dt);
            }
        }
        (AttributeTarget::Value, outcome) => {
            node.data_value = read_batcher::outcome_to_attribute_value(outcome);
        }
        (AttributeTarget::MinimumSamplingInterval, AttributeReadOutcome::Good(v)) => {
            node.minimum_sampling_interval = v.try_cast_to::<f64>().ok();
        }
        (AttributeTarget::AccessLevel, AttributeReadOutcome::Good(v)) => {
            node.access_level = v.try_cast_to::<u8>().ok();
        }
        (AttributeTarget::UserAccessLevel, AttributeReadOutcome::Good(v)) => {
            node.user_access_level = v.try_cast_to::<u8>().ok();
        }
        _ => {}
    }
}

/// The `NodeClass` attribute comes back over the wire as a plain `Int32`
/// (it's a C-like enumeration, not its own encodable type), so it has to
/// be matched back to a [`NodeClass`](opcua_types::NodeClass) by value
/// rather than cast to it directly.
fn node_class_from_i32(value: i32) -> Option<opcua_types::NodeClass> {
    use opcua_types::NodeClass;
    match value {
        1 => Some(NodeClass::Object),
        2 => Some(NodeClass::Variable),
        4 => Some(NodeClass::Method),
        8 => Some(NodeClass::ObjectType),
        16 => Some(NodeClass::VariableType),
        32 => Some(NodeClass::ReferenceType),
        64 => Some(NodeClass::DataType),
        128 => Some(NodeClass::View),
        _ => None,
    }
}

/// Convenience entry point: crawls from `start` and denormalizes the
/// result into a single JSON tree, discarding the intermediate cache.
/// Equivalent to constructing a [`Crawler`], calling
/// [`Crawler::crawl`], then [`finalize`].
pub async fn read<S: CrawlSession + ?Sized>(
    session: &S,
    start: NodeId,
) -> Result<serde_json::Value, CrawlError> {
    let mut crawler = Crawler::new();
    crawler.crawl(session, start.clone()).await?;
    Ok(finalize(crawler.cache(), &start))
}
