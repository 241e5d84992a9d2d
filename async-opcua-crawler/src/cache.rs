use hashbrown::HashMap;
use opcua_types::{LocalizedText, NodeClass, NodeId, QualifiedName, ReferenceDescription, Variant};

/// Placeholder browse name a [`CacheNode`] carries until its attributes
/// have actually been read from the server.
pub const PENDING_BROWSE_NAME: &str = "pending";

/// Everything the crawler has learned about a single node.
///
/// Fields start out `None` (or the `pending` sentinel for `browse_name`)
/// and are filled in exactly once as the crawl progresses; nothing here
/// is ever reassigned after being set, mirroring the address space
/// itself, which the crawler treats as immutable for the duration of a
/// single crawl.
#[derive(Debug, Clone)]
pub struct CacheNode {
    pub node_id: NodeId,
    pub browse_name: QualifiedName,
    pub display_name: Option<LocalizedText>,
    pub node_class: Option<NodeClass>,
    pub type_definition: Option<NodeId>,
    pub data_type: Option<NodeId>,
    pub data_value: Option<AttributeValue>,
    pub minimum_sampling_interval: Option<f64>,
    pub access_level: Option<u8>,
    pub user_access_level: Option<u8>,
    /// Forward references discovered by browsing this node. `None`
    /// until the node's own browse response has been processed.
    pub references: Option<Vec<ReferenceDescription>>,
}

/// Outcome of reading the `Value` attribute of a node, matching the
/// Good/empty/error trichotomy the read batcher resolves each attribute
/// to.
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Value(Variant),
    /// Status was `Good` but the value itself was null.
    Empty,
    /// Status was not `Good`; carries the symbolic status code name.
    Error(String),
}

impl CacheNode {
    pub(crate) fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            browse_name: QualifiedName::from(PENDING_BROWSE_NAME),
            display_name: None,
            node_class: None,
            type_definition: None,
            data_type: None,
            data_value: None,
            minimum_sampling_interval: None,
            access_level: None,
            user_access_level: None,
            references: None,
        }
    }

    pub fn is_browse_name_pending(&self) -> bool {
        self.browse_name.name.as_ref() == PENDING_BROWSE_NAME
    }
}

/// Store of every node touched during a crawl, keyed by [`NodeId`].
///
/// `NodeId` already carries value equality and a canonical `Display`
/// form, so using it directly as the map key gives the same identity
/// semantics the design calls for without an extra string-interning
/// step.
#[derive(Debug, Default)]
pub struct CacheNodeStore {
    nodes: HashMap<NodeId, CacheNode>,
}

impl CacheNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node_id: &NodeId) -> Option<&CacheNode> {
        self.nodes.get(node_id)
    }

    pub fn get_mut(&mut self, node_id: &NodeId) -> Option<&mut CacheNode> {
        self.nodes.get_mut(node_id)
    }

    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Returns the existing node for `node_id`, creating an empty one if
    /// this is the first time it has been seen.
    pub fn get_or_create(&mut self, node_id: &NodeId) -> &mut CacheNode {
        self.nodes
            .entry(node_id.clone())
            .or_insert_with(|| CacheNode::new(node_id.clone()))
    }

    /// Inserts a brand new node. Panics if one already exists: creating
    /// a cache node is only ever supposed to happen once per node, and a
    /// second attempt means a caller bug, not a server-driven condition.
    pub fn create(&mut self, node_id: NodeId) -> &mut CacheNode {
        assert!(
            !self.nodes.contains_key(&node_id),
            "cache node {node_id} already exists"
        );
        self.nodes
            .entry(node_id.clone())
            .or_insert_with(|| CacheNode::new(node_id))
    }

    /// Inserts a node with its browse name already resolved and no
    /// references, used to seed the standard reference type hierarchy
    /// before a crawl starts.
    pub fn create_prepopulated(&mut self, node_id: NodeId, browse_name: &str) {
        let mut node = CacheNode::new(node_id.clone());
        node.browse_name = QualifiedName::from(browse_name);
        node.node_class = Some(NodeClass::ReferenceType);
        node.references = Some(Vec::new());
        self.nodes.insert(node_id, node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &CacheNode)> {
        self.nodes.iter()
    }
}
