//! Collection of the macro import and the references to its bindings.

use indexmap::IndexMap;
use tracing::debug;

use crate::ast::{NodeId, NodeKind, SyntaxTree, TreeError};

/// Whether an import source names the macro module
///
/// Both the bare name and any path ending in `/<macro_source>` match.
pub fn is_macro_source(source: &str, macro_source: &str) -> bool {
    source == macro_source
        || source
            .strip_suffix(macro_source)
            .is_some_and(|prefix| prefix.ends_with('/'))
}

/// References to the macro's bindings, keyed by imported name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroReferences {
    references: IndexMap<String, Vec<NodeId>>,
    macro_imports: Vec<NodeId>,
}

impl MacroReferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference under an imported name
    pub fn insert(&mut self, imported: impl Into<String>, site: NodeId) {
        self.references.entry(imported.into()).or_default().push(site);
    }

    pub fn get(&self, imported: &str) -> &[NodeId] {
        self.references.get(imported).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Imported names that have at least one reference, in first-seen order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.references.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.references.values().all(Vec::is_empty)
    }

    /// Top-level import declarations of the macro module
    pub fn macro_imports(&self) -> &[NodeId] {
        &self.macro_imports
    }

    /// Find the macro imports of `tree` and every identifier referring to
    /// one of their bindings, in source order.
    ///
    /// Scopes are not tracked: a local that shadows a macro binding is
    /// still collected.
    pub fn collect(tree: &SyntaxTree, macro_source: &str) -> Self {
        let mut refs = Self::new();
        let mut bindings: IndexMap<String, String> = IndexMap::new();

        for &statement in tree.statements() {
            let Some(NodeKind::ImportDeclaration { specifiers, .. }) = tree.kind(statement) else {
                continue;
            };
            let from_macro = tree
                .import_source(statement)
                .is_some_and(|(_, source)| is_macro_source(&source.value, macro_source));
            if !from_macro {
                continue;
            }
            refs.macro_imports.push(statement);
            for specifier in specifiers {
                bindings.insert(specifier.local().to_string(), specifier.imported().to_string());
            }
        }

        if bindings.is_empty() {
            return refs;
        }

        for id in tree.descendants(tree.root()) {
            if let Some(NodeKind::Identifier(name)) = tree.kind(id) {
                if let Some(imported) = bindings.get(name) {
                    refs.insert(imported.clone(), id);
                }
            }
        }

        debug!(
            imports = refs.macro_imports.len(),
            references = refs.references.values().map(Vec::len).sum::<usize>(),
            "Collected macro references"
        );
        refs
    }
}

/// Drop the macro import declarations from the tree
pub fn remove_macro_imports(
    tree: &mut SyntaxTree,
    refs: &MacroReferences,
) -> Result<usize, TreeError> {
    let mut removed = 0;
    for &import in refs.macro_imports() {
        if tree.is_live(import) {
            tree.remove(import)?;
            removed += 1;
        }
    }
    Ok(removed)
}
