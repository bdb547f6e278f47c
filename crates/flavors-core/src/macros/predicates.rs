//! Input guards shared by the rules and the configuration loader.

use crate::ast::{NodeId, SyntaxTree};

/// No node, or a handle whose node is gone from the tree
pub fn is_dangling(tree: &SyntaxTree, id: Option<NodeId>) -> bool {
    id.map_or(true, |id| !tree.is_live(id))
}

/// Empty or whitespace-only
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
