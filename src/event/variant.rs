//! Payload shapes for the four event format variants (ยง3.2).

// Layer 1: Standard library
use std::fmt;

// Layer 2: Third-party
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// Layer 3: Internal
// (none)

/// A node in the ordered, labelled tree used by the Tree variant.
///
/// Mirrors a minimal XML element: a tag `name`, an ordered attribute list,
/// optional text content, and ordered child elements. `force_list` is kept as
/// an ordinary attribute rather than a dedicated field — ยง3.2 treats it as a
/// marker the Tree↔Mapping conversion routines inspect and strip, not a
/// first-class structural property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Element tag name.
    pub name: String,
    /// Ordered attribute list (name, value).
    pub attributes: Vec<(String, String)>,
    /// Text content, if this element has no children.
    pub text: Option<String>,
    /// Ordered child elements.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Construct a leaf element with no attributes or children.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    /// Construct an empty element, e.g. the canonical empty-Plain `<root/>`.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// True if an attribute literally named `force_list` is present (ยง3.2).
    pub fn has_force_list(&self) -> bool {
        self.attributes.iter().any(|(k, _)| k == "force_list")
    }

    /// Returns a copy of this node with `force_list` stripped, if present.
    pub fn without_force_list(&self) -> Self {
        let mut node = self.clone();
        node.attributes.retain(|(k, _)| k != "force_list");
        node
    }
}

/// A single `key → ordered values` entry in a Form payload (ยง3.2).
pub type FormEntry = (String, Vec<String>);

/// Declares which format variant an `Event`'s payload currently uses, without
/// carrying the payload itself. Used for actor `input`/`output` declarations
/// (ยง3.5, ยง4.5.3) where only the *kind* matters, not a concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantKind {
    /// Opaque string payload (`text/plain`).
    Plain,
    /// Ordered labelled tree (`application/xml`).
    Tree,
    /// Recursive mapping/list of primitives (`application/json`).
    Mapping,
    /// Ordered list of `{key: values}` (`application/x-www-form-urlencoded`).
    Form,
}

impl VariantKind {
    /// The wire content-type associated with this variant (ยง3.2 table).
    pub fn content_type(&self) -> &'static str {
        match self {
            VariantKind::Plain => "text/plain",
            VariantKind::Tree => "application/xml",
            VariantKind::Mapping => "application/json",
            VariantKind::Form => "application/x-www-form-urlencoded",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariantKind::Plain => "Plain",
            VariantKind::Tree => "Tree",
            VariantKind::Mapping => "Mapping",
            VariantKind::Form => "Form",
        };
        write!(f, "{name}")
    }
}

/// An event payload, tagged by its format variant (ยง3.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    /// Opaque string payload.
    Plain(String),
    /// Ordered labelled tree rooted at a single element.
    Tree(TreeNode),
    /// Recursive JSON-like mapping or sequence of primitives.
    Mapping(JsonValue),
    /// Ordered sequence of `{key: values}` entries.
    Form(Vec<FormEntry>),
}

impl Variant {
    /// The `VariantKind` tag of this payload.
    pub fn kind(&self) -> VariantKind {
        match self {
            Variant::Plain(_) => VariantKind::Plain,
            Variant::Tree(_) => VariantKind::Tree,
            Variant::Mapping(_) => VariantKind::Mapping,
            Variant::Form(_) => VariantKind::Form,
        }
    }

    /// The variant's documented empty form (ยง8 boundary behaviors):
    /// `<root/>`, `{}`, `[]`, or an empty string.
    pub fn empty(kind: VariantKind) -> Self {
        match kind {
            VariantKind::Plain => Variant::Plain(String::new()),
            VariantKind::Tree => Variant::Tree(TreeNode::empty("root")),
            VariantKind::Mapping => Variant::Mapping(JsonValue::Object(Default::default())),
            VariantKind::Form => Variant::Form(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_kind_content_type() {
        assert_eq!(VariantKind::Plain.content_type(), "text/plain");
        assert_eq!(VariantKind::Tree.content_type(), "application/xml");
        assert_eq!(VariantKind::Mapping.content_type(), "application/json");
        assert_eq!(
            VariantKind::Form.content_type(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn test_tree_node_force_list_detection() {
        let mut node = TreeNode::empty("item");
        node.attributes.push(("force_list".into(), "1".into()));
        assert!(node.has_force_list());

        let stripped = node.without_force_list();
        assert!(!stripped.has_force_list());
    }

    #[test]
    fn test_variant_empty_forms() {
        assert_eq!(Variant::empty(VariantKind::Plain), Variant::Plain(String::new()));
        assert_eq!(
            Variant::empty(VariantKind::Form),
            Variant::Form(Vec::new())
        );
        assert!(matches!(
            Variant::empty(VariantKind::Mapping),
            Variant::Mapping(JsonValue::Object(_))
        ));
    }

    #[test]
    fn test_variant_kind_roundtrip() {
        let v = Variant::Plain("hello".into());
        assert_eq!(v.kind(), VariantKind::Plain);
    }
}
