use hashbrown::HashMap;
use opcua_types::{NodeClass, NodeId, ReferenceTypeId};
use serde_json::{Map, Value};

use crate::cache::{AttributeValue, CacheNodeStore};

#[derive(Clone, Copy, PartialEq, Eq)]
enum BuildState {
    InProgress,
    Done,
}

/// Walks the cache starting from `start` and produces a denormalized
/// JSON tree: each node becomes an object keyed by the lower-camel-case
/// name of the reference type that reaches it, with `hasTypeDefinition`
/// pulled out as a scalar field instead of an edge array.
///
/// Cycle-breaking is applied uniformly across every forward reference,
/// not only `organizes`/`hasComponent`/`hasNotifier`/`hasProperty`: a
/// node already being expanded along the current path is rendered as a
/// bare-id stub instead of being re-entered, however it was reached.
///
/// Built iteratively with an explicit stack rather than recursively, so
/// a deep address space can't blow the native call stack.
pub fn finalize(cache: &CacheNodeStore, start: &NodeId) -> Value {
    let mut rendered: HashMap<NodeId, Value> = HashMap::new();
    let mut state: HashMap<NodeId, BuildState> = HashMap::new();

    enum Frame {
        Enter(NodeId),
        Exit(NodeId),
    }

    let mut stack = vec![Frame::Exit(start.clone()), Frame::Enter(start.clone())];
    state.insert(start.clone(), BuildState::InProgress);

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(node_id) => {
                for child in children_to_expand(cache, &node_id) {
                    match state.get(&child) {
                        None => {
                            state.insert(child.clone(), BuildState::InProgress);
                            stack.push(Frame::Exit(child.clone()));
                            stack.push(Frame::Enter(child));
                        }
                        Some(BuildState::InProgress) | Some(BuildState::Done) => {}
                    }
                }
            }
            Frame::Exit(node_id) => {
                let object = build_object(cache, &node_id, &rendered, &state);
                rendered.insert(node_id.clone(), object);
                state.insert(node_id, BuildState::Done);
            }
        }
    }

    rendered.remove(start).unwrap_or(Value::Null)
}

/// Children to descend into before building a node's own object, i.e.
/// every reference target not already rendered or in progress. Order
/// doesn't matter: siblings at the same depth aren't ordered relative
/// to each other.
fn children_to_expand(cache: &CacheNodeStore, node_id: &NodeId) -> Vec<NodeId> {
    let Some(node) = cache.get(node_id) else {
        return Vec::new();
    };
    let Some(references) = &node.references else {
        return Vec::new();
    };
    references
        .iter()
        .filter(|r| r.is_forward)
        .filter(|r| r.reference_type_id != ReferenceTypeId::HasTypeDefinition.into())
        .map(|r| r.node_id.node_id.clone())
        .collect()
}

fn build_object(
    cache: &CacheNodeStore,
    node_id: &NodeId,
    rendered: &HashMap<NodeId, Value>,
    state: &HashMap<NodeId, BuildState>,
) -> Value {
    let mut object = Map::new();
    let Some(node) = cache.get(node_id) else {
        object.insert("nodeId".into(), Value::String(node_id.to_string()));
        return Value::Object(object);
    };

    object.insert("nodeId".into(), Value::String(node_id.to_string()));
    object.insert(
        "browseName".into(),
        Value::String(node.browse_name.name.as_ref().to_string()),
    );
    if let Some(display_name) = &node.display_name {
        object.insert(
            "displayName".into(),
            Value::String(display_name.text.as_ref().to_string()),
        );
    }
    if let Some(node_class) = node.node_class {
        object.insert("nodeClass".into(), Value::String(node_class_name(node_class)));
    }
    if let Some(type_definition) = &node.type_definition {
        if let Some(type_node) = cache.get(type_definition) {
            object.insert(
                "typeDefinition".into(),
                Value::String(type_node.browse_name.name.as_ref().to_string()),
            );
        }
    }
    if let Some(data_type) = &node.data_type {
        object.insert("dataType".into(), Value::String(data_type.to_string()));
    }
    if let Some(attribute_value) = &node.data_value {
        object.insert("dataValue".into(), attribute_value_to_json(attribute_value));
    }

    let Some(references) = &node.references else {
        return Value::Object(object);
    };

    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
    for reference in references.iter().filter(|r| r.is_forward) {
        if reference.reference_type_id == ReferenceTypeId::HasTypeDefinition.into() {
            continue;
        }
        let Some(edge_name) = edge_name(cache, &reference.reference_type_id) else {
            log::warn!(
                "unknown reference type {} at finalization, edge skipped",
                reference.reference_type_id
            );
            continue;
        };
        let target_id = reference.node_id.node_id.clone();
        let value = render_reference_target(&target_id, rendered, state);

        match groups.iter_mut().find(|(name, _)| *name == edge_name) {
            Some((_, values)) => values.push(value),
            None => groups.push((edge_name, vec![value])),
        }
    }

    for (edge_name, values) in groups {
        object.insert(edge_name, Value::Array(values));
    }

    Value::Object(object)
}

fn render_reference_target(
    target_id: &NodeId,
    rendered: &HashMap<NodeId, Value>,
    state: &HashMap<NodeId, BuildState>,
) -> Value {
    match state.get(target_id) {
        Some(BuildState::Done) => rendered.get(target_id).cloned().unwrap_or(Value::Null),
        // In progress means we're still expanding an ancestor of this
        // node along the current path: stop descending and leave a
        // bare node id so the output stays finite.
        Some(BuildState::InProgress) => {
            let mut stub = Map::new();
            stub.insert("nodeId".into(), Value::String(target_id.to_string()));
            Value::Object(stub)
        }
        None => Value::Null,
    }
}

fn attribute_value_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Value(variant) => variant_to_json(variant),
        AttributeValue::Empty => Value::Null,
        AttributeValue::Error(status) => {
            let mut object = Map::new();
            object.insert("name".into(), Value::String(status.clone()));
            Value::Object(object)
        }
    }
}

/// Converts a scalar `Variant` into a plain JSON value. Arrays and
/// extension objects fall back to their debug representation rather
/// than the formal OPC UA JSON encoding, since the finalized tree is a
/// convenience view, not a wire payload.
fn variant_to_json(variant: &opcua_types::Variant) -> Value {
    use opcua_types::Variant;
    match variant {
        Variant::Empty => Value::Null,
        Variant::Boolean(v) => Value::Bool(*v),
        Variant::SByte(v) => Value::from(*v),
        Variant::Byte(v) => Value::from(*v),
        Variant::Int16(v) => Value::from(*v),
        Variant::UInt16(v) => Value::from(*v),
        Variant::Int32(v) => Value::from(*v),
        Variant::UInt32(v) => Value::from(*v),
        Variant::Int64(v) => Value::from(*v),
        Variant::UInt64(v) => Value::from(*v),
        Variant::Float(v) => Value::from(*v),
        Variant::Double(v) => Value::from(*v),
        Variant::String(v) => match v.as_ref() {
            Some(s) => Value::String(s.to_string()),
            None => Value::Null,
        },
        Variant::NodeId(v) => Value::String(v.to_string()),
        Variant::ExpandedNodeId(v) => Value::String(v.to_string()),
        Variant::LocalizedText(v) => Value::String(v.text.as_ref().to_string()),
        Variant::QualifiedName(v) => Value::String(v.name.as_ref().to_string()),
        Variant::StatusCode(v) => Value::String(format!("{v}")),
        other => Value::String(format!("{other:?}")),
    }
}

fn node_class_name(node_class: NodeClass) -> String {
    format!("{node_class:?}")
}

fn edge_name(cache: &CacheNodeStore, reference_type_id: &NodeId) -> Option<String> {
    let node = cache.get(reference_type_id)?;
    Some(lower_first(node.browse_name.name.as_ref()))
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opcua_types::{ExpandedNodeId, LocalizedText, QualifiedName, ReferenceDescription};

    fn node_id(ns: u16, id: u32) -> NodeId {
        NodeId::new(ns, id)
    }

    fn reference(reference_type: ReferenceTypeId, target: NodeId, node_class: NodeClass) -> ReferenceDescription {
        let name = format!("node-{target}");
        ReferenceDescription {
            reference_type_id: reference_type.into(),
            is_forward: true,
            node_id: ExpandedNodeId::new(target),
            browse_name: QualifiedName::from(name.as_str()),
            display_name: LocalizedText::from(""),
            node_class,
            type_definition: ExpandedNodeId::null(),
        }
    }

    #[test]
    fn builds_a_simple_tree() {
        let mut cache = CacheNodeStore::new();
        let root = node_id(1, 1);
        let child = node_id(1, 2);

        let root_node = cache.create(root.clone());
        root_node.browse_name = QualifiedName::from("Root");
        root_node.node_class = Some(NodeClass::Object);
        root_node.references = Some(vec![reference(
            ReferenceTypeId::Organizes,
            child.clone(),
            NodeClass::Object,
        )]);

        let child_node = cache.create(child.clone());
        child_node.browse_name = QualifiedName::from("Child");
        child_node.node_class = Some(NodeClass::Object);
        child_node.references = Some(vec![]);

        cache.create_prepopulated(ReferenceTypeId::Organizes.into(), "Organizes");

        let tree = finalize(&cache, &root);
        assert_eq!(tree["browseName"], "Root");
        assert_eq!(tree["organizes"][0]["browseName"], "Child");
    }

    #[test]
    fn breaks_cycles_without_infinite_recursion() {
        let mut cache = CacheNodeStore::new();
        let a = node_id(1, 1);
        let b = node_id(1, 2);

        cache.create_prepopulated(ReferenceTypeId::Organizes.into(), "Organizes");

        let a_node = cache.create(a.clone());
        a_node.browse_name = QualifiedName::from("A");
        a_node.node_class = Some(NodeClass::Object);
        a_node.references = Some(vec![reference(ReferenceTypeId::Organizes, b.clone(), NodeClass::Object)]);

        let b_node = cache.create(b.clone());
        b_node.browse_name = QualifiedName::from("B");
        b_node.node_class = Some(NodeClass::Object);
        b_node.references = Some(vec![reference(ReferenceTypeId::Organizes, a.clone(), NodeClass::Object)]);

        let tree = finalize(&cache, &a);
        assert_eq!(tree["browseName"], "A");
        assert_eq!(tree["organizes"][0]["browseName"], "B");
        // B's back-reference to A is a stub: present, but not re-expanded.
        assert_eq!(tree["organizes"][0]["organizes"][0]["nodeId"], a.to_string());
        assert!(tree["organizes"][0]["organizes"][0].get("organizes").is_none());
    }
}
