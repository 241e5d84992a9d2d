//! End-to-end tests against an in-memory fake address space, since
//! there's no live OPC UA server to crawl in CI.

use std::cell::{Cell, RefCell};
use std::collections::HashMap as StdHashMap;

use async_trait::async_trait;
use opcua_crawler::{Crawler, CrawlerConfig, CrawlObserver};
use opcua_types::{
    AttributeId, BrowseDescription, BrowseResult, ByteString, DataValue, ExpandedNodeId,
    LocalizedText, NodeClass, NodeId, QualifiedName, ReadValueId, ReferenceDescription,
    ReferenceTypeId, StatusCode, Variant,
};

/// A tiny address space: nodes keyed by [`NodeId`], each with its
/// pre-baked forward references and attribute values.
struct FakeAddressSpace {
    references: StdHashMap<NodeId, Vec<ReferenceDescription>>,
    attributes: StdHashMap<(NodeId, AttributeId), DataValue>,
}

struct FakeSession {
    space: RefCell<FakeAddressSpace>,
    browse_calls: Cell<usize>,
    read_calls: Cell<usize>,
}

fn good(variant: Variant) -> DataValue {
    DataValue {
        value: Some(variant),
        status: Some(StatusCode::Good),
        ..Default::default()
    }
}

fn forward_ref(
    reference_type: ReferenceTypeId,
    target: NodeId,
    node_class: NodeClass,
    browse_name: &str,
) -> ReferenceDescription {
    ReferenceDescription {
        reference_type_id: reference_type.into(),
        is_forward: true,
        node_id: ExpandedNodeId::new(target),
        browse_name: QualifiedName::from(browse_name),
        display_name: LocalizedText::from(browse_name),
        node_class,
        type_definition: ExpandedNodeId::null(),
    }
}

impl FakeAddressSpace {
    fn new() -> Self {
        Self {
            references: StdHashMap::new(),
            attributes: StdHashMap::new(),
        }
    }

    fn add(&mut self, node_id: NodeId, references: Vec<ReferenceDescription>) {
        self.references.insert(node_id, references);
    }

    fn set_attribute(&mut self, node_id: NodeId, attribute: AttributeId, value: DataValue) {
        self.attributes.insert((node_id, attribute), value);
    }
}

#[async_trait]
impl opcua_crawler::CrawlSession for FakeSession {
    async fn browse(
        &self,
        nodes_to_browse: &[BrowseDescription],
    ) -> Result<Vec<BrowseResult>, StatusCode> {
        self.browse_calls.set(self.browse_calls.get() + 1);
        let space = self.space.borrow();
        Ok(nodes_to_browse
            .iter()
            .map(|d| match space.references.get(&d.node_id) {
                Some(refs) => BrowseResult {
                    status_code: StatusCode::Good,
                    continuation_point: ByteString::null(),
                    references: Some(refs.clone()),
                },
                None => BrowseResult {
                    status_code: StatusCode::BadNodeIdUnknown,
                    continuation_point: ByteString::null(),
                    references: None,
                },
            })
            .collect())
    }

    async fn browse_next(
        &self,
        _continuation_points: &[ByteString],
    ) -> Result<Vec<BrowseResult>, StatusCode> {
        panic!("fake address space never issues continuation points");
    }

    async fn read(&self, nodes_to_read: &[ReadValueId]) -> Result<Vec<DataValue>, StatusCode> {
        self.read_calls.set(self.read_calls.get() + 1);
        let space = self.space.borrow();
        Ok(nodes_to_read
            .iter()
            .map(|r| {
                space
                    .attributes
                    .get(&(r.node_id.clone(), AttributeId::from_u32(r.attribute_id).unwrap()))
                    .cloned()
                    .unwrap_or_else(|| DataValue {
                        value: None,
                        status: Some(StatusCode::Good),
                        ..Default::default()
                    })
            })
            .collect())
    }
}

fn node_id(id: u32) -> NodeId {
    NodeId::new(1, id)
}

fn fake_session(space: FakeAddressSpace) -> FakeSession {
    FakeSession {
        space: RefCell::new(space),
        browse_calls: Cell::new(0),
        read_calls: Cell::new(0),
    }
}

#[derive(Default)]
struct CountingObserver {
    browsed: RefCell<Vec<NodeId>>,
    extra_references: Cell<usize>,
    ended: Cell<bool>,
}

impl CrawlObserver for CountingObserver {
    fn on_browsed(&mut self, node: &opcua_crawler::CacheNode) {
        self.browsed.borrow_mut().push(node.node_id.clone());
    }

    fn on_extra_reference(
        &mut self,
        _parent: &NodeId,
        _reference: &ReferenceDescription,
        _target: &NodeId,
    ) {
        self.extra_references.set(self.extra_references.get() + 1);
    }

    fn on_end(&mut self) {
        self.ended.set(true);
    }
}

#[tokio::test]
async fn crawls_a_small_tree_and_resolves_attributes() {
    let root = node_id(1);
    let child = node_id(2);

    let mut space = FakeAddressSpace::new();
    space.add(
        root.clone(),
        vec![forward_ref(
            ReferenceTypeId::Organizes,
            child.clone(),
            NodeClass::Variable,
            "Child",
        )],
    );
    space.add(child.clone(), vec![]);
    space.set_attribute(
        root.clone(),
        AttributeId::BrowseName,
        good(Variant::from(QualifiedName::from("Root"))),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::DisplayName,
        good(Variant::from(LocalizedText::from("Root"))),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::NodeClass,
        good(Variant::Int32(NodeClass::Object as i32)),
    );
    space.set_attribute(
        child.clone(),
        AttributeId::Value,
        good(Variant::Int32(42)),
    );

    let session = fake_session(space);
    let mut crawler = Crawler::with_observer(CountingObserver::default());
    crawler.crawl(&session, root.clone()).await.unwrap();

    let cache = crawler.cache();
    assert_eq!(cache.get(&root).unwrap().browse_name.name.as_ref(), "Root");
    assert_eq!(cache.get(&child).unwrap().browse_name.name.as_ref(), "Child");
    assert!(crawler.observer().ended.get());
    assert_eq!(crawler.observer().browsed.borrow().len(), 2);

    let tree = opcua_crawler::finalize(cache, &root);
    assert_eq!(tree["organizes"][0]["browseName"], "Child");
}

#[tokio::test]
async fn diamond_targets_are_crawled_once_and_reused_in_the_tree() {
    let root = node_id(1);
    let b = node_id(2);
    let c = node_id(3);
    let d = node_id(4);

    let mut space = FakeAddressSpace::new();
    space.add(
        root.clone(),
        vec![
            forward_ref(ReferenceTypeId::Organizes, b.clone(), NodeClass::Object, "B"),
            forward_ref(ReferenceTypeId::Organizes, c.clone(), NodeClass::Object, "C"),
        ],
    );
    space.add(
        b.clone(),
        vec![forward_ref(ReferenceTypeId::Organizes, d.clone(), NodeClass::Object, "D")],
    );
    space.add(
        c.clone(),
        vec![forward_ref(ReferenceTypeId::Organizes, d.clone(), NodeClass::Object, "D")],
    );
    space.add(d.clone(), vec![]);
    space.set_attribute(
        root.clone(),
        AttributeId::BrowseName,
        good(Variant::from(QualifiedName::from("Root"))),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::DisplayName,
        good(Variant::from(LocalizedText::from("Root"))),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::NodeClass,
        good(Variant::Int32(NodeClass::Object as i32)),
    );

    let session = fake_session(space);
    let mut crawler = Crawler::with_observer(CountingObserver::default());
    crawler.crawl(&session, root.clone()).await.unwrap();

    // D is reachable from both B and C, but only crawled (and thus only
    // browsed) once.
    assert_eq!(crawler.observer().browsed.borrow().iter().filter(|n| **n == d).count(), 1);
    assert_eq!(crawler.observer().extra_references.get(), 1);

    let tree = opcua_crawler::finalize(crawler.cache(), &root);
    assert_eq!(tree["organizes"][0]["organizes"][0]["browseName"], "D");
    assert_eq!(tree["organizes"][1]["organizes"][0]["browseName"], "D");
}

#[tokio::test]
async fn browse_batch_respects_max_nodes_per_browse() {
    let root = node_id(1);
    let children: Vec<NodeId> = (2..12).map(node_id).collect();

    let mut space = FakeAddressSpace::new();
    space.add(
        root.clone(),
        children
            .iter()
            .enumerate()
            .map(|(i, c)| forward_ref(ReferenceTypeId::Organizes, c.clone(), NodeClass::Object, &format!("C{i}")))
            .collect(),
    );
    for child in &children {
        space.add(child.clone(), vec![]);
    }
    space.set_attribute(
        root.clone(),
        AttributeId::BrowseName,
        good(Variant::from(QualifiedName::from("Root"))),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::DisplayName,
        good(Variant::from(LocalizedText::from("Root"))),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::NodeClass,
        good(Variant::Int32(NodeClass::Object as i32)),
    );

    let session = fake_session(space);
    let config = CrawlerConfig::new().max_nodes_per_browse(3).max_nodes_per_read(3);
    let mut crawler = Crawler::with_config(CountingObserver::default(), config);
    crawler.crawl(&session, root.clone()).await.unwrap();

    // 10 children + root = 11 nodes browsed across batches of at most 3.
    assert!(session.browse_calls.get() >= 4);
    assert_eq!(crawler.cache().len(), 11);
}

#[tokio::test]
async fn a_bad_attribute_status_is_surfaced_as_an_error_descriptor() {
    let root = node_id(1);
    let mut space = FakeAddressSpace::new();
    space.add(root.clone(), vec![]);
    space.set_attribute(
        root.clone(),
        AttributeId::BrowseName,
        good(Variant::from(QualifiedName::from("Root"))),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::DisplayName,
        good(Variant::from(LocalizedText::from("Root"))),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::NodeClass,
        good(Variant::Int32(NodeClass::Variable as i32)),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::Value,
        DataValue {
            value: None,
            status: Some(StatusCode::BadAttributeIdInvalid),
            ..Default::default()
        },
    );

    let session = fake_session(space);
    let mut crawler = Crawler::new();
    crawler.crawl(&session, root.clone()).await.unwrap();

    let tree = opcua_crawler::finalize(crawler.cache(), &root);
    assert_eq!(tree["dataValue"]["name"], "BadAttributeIdInvalid");
}

#[tokio::test]
async fn a_single_variable_node_reports_its_node_class_and_data_value() {
    let root = node_id(1);
    let mut space = FakeAddressSpace::new();
    space.add(root.clone(), vec![]);
    space.set_attribute(
        root.clone(),
        AttributeId::BrowseName,
        good(Variant::from(QualifiedName::from("Root"))),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::DisplayName,
        good(Variant::from(LocalizedText::from("Root"))),
    );
    space.set_attribute(
        root.clone(),
        AttributeId::NodeClass,
        good(Variant::Int32(NodeClass::Variable as i32)),
    );
    space.set_attribute(root.clone(), AttributeId::Value, good(Variant::Int32(42)));

    let session = fake_session(space);
    let mut crawler = Crawler::new();
    crawler.crawl(&session, root.clone()).await.unwrap();

    let tree = opcua_crawler::finalize(crawler.cache(), &root);
    assert_eq!(tree["nodeClass"], "Variable");
    assert_eq!(tree["dataValue"], 42);
}
