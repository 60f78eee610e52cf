//! The event type, its format variants, and conversion between them (ยง3).

mod conversion;
mod core;
mod http;
mod variant;

pub use conversion::{
    form_to_mapping, form_to_tree, mapping_to_form, mapping_to_tree, tree_to_mapping,
    tree_to_xml_string, xml_string_to_tree,
};
pub use core::{Event, EventError};
pub use http::{HttpOverlay, HttpStatus, Pagination};
pub use variant::{FormEntry, TreeNode, Variant, VariantKind};
