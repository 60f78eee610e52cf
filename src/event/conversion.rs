//! Widening-only event conversion between format variants (ยง3.2).
//!
//! `Event::convert` is the single entry point; the free functions below are
//! the documented per-pair routines it dispatches to. Every routine is total
//! over its declared input shape — conversion failures surface only at the
//! `convert` boundary (narrowing, or an unparseable `Plain` payload).

// Layer 1: Standard library
use std::collections::BTreeMap;

// Layer 2: Third-party
use quick_xml::events::{BytesStart, BytesText, Event as XmlEvent};
use quick_xml::{Reader, Writer};
use serde_json::{Map as JsonMap, Value as JsonValue};

// Layer 3: Internal
use super::core::Event;
use super::variant::{FormEntry, TreeNode, Variant, VariantKind};
use crate::error::FrameworkException;

const JSONIFIED_ENVELOPE: &str = "jsonified_envelope";
const FORM_ENVELOPE: &str = "x_www_form_envelope";

impl Event {
    /// Convert this event's payload to `target`, returning a new event with
    /// the same identity and metadata (ยง3.2).
    ///
    /// Widening (moving away from `Plain`, or between structured siblings
    /// via a documented path) always succeeds for well-formed input.
    /// Narrowing (structured → `Plain`) and any undocumented pair fail with
    /// `InvalidEventConversion`. Converting to the current variant is the
    /// identity (ยง8 boundary behavior).
    pub fn convert(&self, target: VariantKind) -> Result<Event, FrameworkException> {
        let current = self.data().kind();
        if current == target {
            return Ok(self.clone());
        }

        let new_data = match (self.data(), target) {
            (Variant::Plain(s), _) => plain_to(s, target, self.event_id())?,

            (_, VariantKind::Plain) => {
                return Err(FrameworkException::InvalidEventConversion {
                    event_id: self.event_id(),
                    from: current.display(),
                    to: target.display(),
                })
            }

            (Variant::Tree(node), VariantKind::Mapping) => Variant::Mapping(tree_to_mapping(node)),
            (Variant::Mapping(value), VariantKind::Tree) => Variant::Tree(mapping_to_tree(value)),

            (Variant::Form(entries), VariantKind::Mapping) => {
                Variant::Mapping(form_to_mapping(entries))
            }
            (Variant::Mapping(value), VariantKind::Form) => Variant::Form(mapping_to_form(value)),

            (Variant::Form(entries), VariantKind::Tree) => Variant::Tree(form_to_tree(entries)),
            (Variant::Tree(node), VariantKind::Form) => {
                Variant::Form(mapping_to_form(&tree_to_mapping(node)))
            }

            _ => unreachable!("all four variants are handled above"),
        };

        let mut converted = self.clone();
        converted.set_data_any_kind(new_data);
        Ok(converted)
    }
}

impl VariantKind {
    fn display(self) -> &'static str {
        match self {
            VariantKind::Plain => "Plain",
            VariantKind::Tree => "Tree",
            VariantKind::Mapping => "Mapping",
            VariantKind::Form => "Form",
        }
    }
}

fn plain_to(
    text: &str,
    target: VariantKind,
    event_id: crate::util::EventId,
) -> Result<Variant, FrameworkException> {
    if text.is_empty() {
        return Ok(Variant::empty(target));
    }

    match target {
        VariantKind::Plain => unreachable!("identity handled by caller"),
        VariantKind::Tree => xml_string_to_tree(text)
            .map(Variant::Tree)
            .map_err(|_| FrameworkException::InvalidEventDataModification {
                event_id,
                reason: format!("'{text}' is not well-formed XML"),
            }),
        VariantKind::Mapping => serde_json::from_str::<JsonValue>(text)
            .map(Variant::Mapping)
            .map_err(|e| FrameworkException::InvalidEventDataModification {
                event_id,
                reason: format!("'{text}' is not valid JSON: {e}"),
            }),
        VariantKind::Form => serde_urlencoded::from_str::<Vec<(String, String)>>(text)
            .map(|pairs| Variant::Form(group_pairs(pairs)))
            .map_err(|e| FrameworkException::InvalidEventDataModification {
                event_id,
                reason: format!("'{text}' is not valid form encoding: {e}"),
            }),
    }
}

fn group_pairs(pairs: Vec<(String, String)>) -> Vec<FormEntry> {
    let mut ordered_keys = Vec::new();
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in pairs {
        if !grouped.contains_key(&k) {
            ordered_keys.push(k.clone());
        }
        grouped.entry(k).or_default().push(v);
    }
    ordered_keys
        .into_iter()
        .map(|k| {
            let values = grouped.remove(&k).unwrap_or_default();
            (k, values)
        })
        .collect()
}

/// Serialize a `TreeNode` to its canonical XML text form.
pub fn tree_to_xml_string(node: &TreeNode) -> String {
    let mut writer = Writer::new(Vec::new());
    write_node(&mut writer, node);
    String::from_utf8(writer.into_inner()).unwrap_or_default()
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &TreeNode) {
    let mut start = BytesStart::new(node.name.clone());
    for (k, v) in &node.attributes {
        start.push_attribute((k.as_str(), v.as_str()));
    }

    if node.children.is_empty() && node.text.is_none() {
        let _ = writer.write_event(XmlEvent::Empty(start));
        return;
    }

    let _ = writer.write_event(XmlEvent::Start(start));
    if let Some(text) = &node.text {
        let _ = writer.write_event(XmlEvent::Text(BytesText::new(text)));
    }
    for child in &node.children {
        write_node(writer, child);
    }
    let _ = writer.write_event(XmlEvent::End(quick_xml::events::BytesEnd::new(
        node.name.clone(),
    )));
}

/// Parse the canonical XML text form into a `TreeNode`.
pub fn xml_string_to_tree(xml: &str) -> Result<TreeNode, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<TreeNode> = Vec::new();
    let mut root: Option<TreeNode> = None;

    loop {
        match reader.read_event()? {
            XmlEvent::Start(e) => {
                stack.push(TreeNode {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    attributes: attrs_of(&e),
                    text: None,
                    children: Vec::new(),
                });
            }
            XmlEvent::Empty(e) => {
                let node = TreeNode {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    attributes: attrs_of(&e),
                    text: None,
                    children: Vec::new(),
                };
                push_completed(&mut stack, &mut root, node);
            }
            XmlEvent::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape().unwrap_or_default().into_owned();
                    if !text.trim().is_empty() {
                        top.text = Some(text);
                    }
                }
            }
            XmlEvent::End(_) => {
                if let Some(node) = stack.pop() {
                    push_completed(&mut stack, &mut root, node);
                }
            }
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    root.ok_or_else(|| quick_xml::Error::UnexpectedEof("no root element".into()))
}

fn attrs_of(e: &BytesStart) -> Vec<(String, String)> {
    e.attributes()
        .filter_map(|a| a.ok())
        .map(|a| {
            (
                String::from_utf8_lossy(a.key.as_ref()).into_owned(),
                a.unescape_value().unwrap_or_default().into_owned(),
            )
        })
        .collect()
}

fn push_completed(stack: &mut Vec<TreeNode>, root: &mut Option<TreeNode>, node: TreeNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else {
        *root = Some(node);
    }
}

/// Tree → Mapping (ยง3.2).
pub fn tree_to_mapping(node: &TreeNode) -> JsonValue {
    inner_tree_to_mapping(node)
}

fn inner_tree_to_mapping(node: &TreeNode) -> JsonValue {
    if node.children.is_empty() {
        return match &node.text {
            Some(t) => JsonValue::String(t.clone()),
            None => JsonValue::Null,
        };
    }

    let mut map = JsonMap::new();
    let force_list: Vec<&TreeNode> = node
        .children
        .iter()
        .filter(|c| c.has_force_list())
        .collect();

    for child in &node.children {
        let value = inner_tree_to_mapping(&child.without_force_list());
        let forced = force_list.iter().any(|f| std::ptr::eq(*f, child));

        match map.get_mut(&child.name) {
            Some(JsonValue::Array(arr)) => arr.push(value),
            Some(existing) => {
                let prev = existing.clone();
                map.insert(child.name.clone(), JsonValue::Array(vec![prev, value]));
            }
            None if forced => {
                map.insert(child.name.clone(), JsonValue::Array(vec![value]));
            }
            None => {
                map.insert(child.name.clone(), value);
            }
        }
    }

    let value = JsonValue::Object(map);
    if node.name == JSONIFIED_ENVELOPE {
        value
    } else {
        let mut wrapper = JsonMap::new();
        wrapper.insert(node.name.clone(), value);
        JsonValue::Object(wrapper)
    }
}

/// Mapping → Tree (ยง3.2): single top-level key becomes the root tag;
/// multiple keys or a top-level sequence are wrapped in `jsonified_envelope`.
pub fn mapping_to_tree(value: &JsonValue) -> TreeNode {
    match value {
        JsonValue::Object(map) if map.len() == 1 => {
            let (key, inner) = map.iter().next().expect("len checked above");
            value_to_node(key, inner)
        }
        _ => value_to_node(JSONIFIED_ENVELOPE, value),
    }
}

fn value_to_node(name: &str, value: &JsonValue) -> TreeNode {
    match value {
        JsonValue::Object(map) => TreeNode {
            name: name.to_string(),
            attributes: Vec::new(),
            text: None,
            children: map
                .iter()
                .map(|(k, v)| value_to_node(k, v))
                .collect(),
        },
        JsonValue::Array(items) => TreeNode {
            name: name.to_string(),
            attributes: Vec::new(),
            text: None,
            children: items.iter().map(|v| value_to_node(name, v)).collect(),
        },
        JsonValue::Null => TreeNode::empty(name),
        JsonValue::String(s) => TreeNode::leaf(name, s.clone()),
        other => TreeNode::leaf(name, other.to_string()),
    }
}

/// Form → Mapping (ยง3.2): repeated keys collapse into an array; a lone
/// occurrence is emitted as a scalar.
pub fn form_to_mapping(entries: &[FormEntry]) -> JsonValue {
    let mut map = JsonMap::new();
    for (key, values) in entries {
        let value = match values.as_slice() {
            [single] => JsonValue::String(single.clone()),
            many => JsonValue::Array(many.iter().cloned().map(JsonValue::String).collect()),
        };
        map.insert(key.clone(), value);
    }
    JsonValue::Object(map)
}

/// Mapping → Form (ยง3.2). Arrays become a repeated-key run of scalar string
/// values; numeric/bool/null values are stringified, never coerced back.
pub fn mapping_to_form(value: &JsonValue) -> Vec<FormEntry> {
    let JsonValue::Object(map) = value else {
        return Vec::new();
    };

    map.iter()
        .map(|(key, v)| {
            let values = match v {
                JsonValue::Array(items) => items.iter().map(json_scalar_to_string).collect(),
                other => vec![json_scalar_to_string(other)],
            };
            (key.clone(), values)
        })
        .collect()
}

fn json_scalar_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Form → Tree (ยง3.2): a single-entry, single-value form becomes a tree
/// rooted at that key (or is parsed directly if the value is itself
/// well-formed XML); multi-entry forms wrap under `x_www_form_envelope`.
pub fn form_to_tree(entries: &[FormEntry]) -> TreeNode {
    if let [(key, values)] = entries {
        if let [value] = values.as_slice() {
            if let Ok(parsed) = xml_string_to_tree(value) {
                return parsed;
            }
            return TreeNode::leaf(key.clone(), value.clone());
        }
    }

    TreeNode {
        name: FORM_ENVELOPE.to_string(),
        attributes: Vec::new(),
        text: None,
        children: entries
            .iter()
            .flat_map(|(key, values)| {
                values
                    .iter()
                    .map(move |v| TreeNode::leaf(key.clone(), v.clone()))
            })
            .collect(),
    }
}
