// Arena syntax tree for one JavaScript module.
// Nodes are addressed by `NodeId` and keep a link to their parent, so rules can
// walk upward from a marker reference. Edits are recorded as splices over the
// module text; everything outside an edited node prints exactly as written.

pub mod source_gen;
pub use source_gen::ToSource;


#[cfg(test)]
mod source_gen_tests;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle to a node in a [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Start position of a node in its source file (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Byte range of a node in the module text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    pub fn contains(self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Replacement of one byte range of the module text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

/// A string literal value together with its textual form in the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrLit {
    pub value: String,
    /// Exact source text including quotes, when known
    pub raw: Option<String>,
}

impl StrLit {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            raw: None,
        }
    }

    pub fn with_raw(value: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            raw: Some(raw.into()),
        }
    }

    /// Overwrite the value and re-render the raw text single-quoted
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.raw = Some(source_gen::quote(value, '\''));
    }
}

/// One binding introduced by an import declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportSpecifier {
    /// import local from "..."
    Default { local: String },
    /// import * as local from "..."
    Namespace { local: String },
    /// import { imported as local } from "..."
    Named { imported: String, local: String },
}

impl ImportSpecifier {
    pub fn local(&self) -> &str {
        match self {
            ImportSpecifier::Default { local }
            | ImportSpecifier::Namespace { local }
            | ImportSpecifier::Named { local, .. } => local,
        }
    }

    /// Name the binding is exported under by the imported module
    pub fn imported(&self) -> &str {
        match self {
            ImportSpecifier::Default { .. } => "default",
            ImportSpecifier::Namespace { .. } => "*",
            ImportSpecifier::Named { imported, .. } => imported,
        }
    }
}

/// Node content. Only the shapes the macro inspects get their own kind;
/// every other construct keeps its grammar type name in `syntax`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Program {
        body: Vec<NodeId>,
    },
    ImportDeclaration {
        specifiers: Vec<ImportSpecifier>,
        /// The `StringLiteral` node naming the imported module
        source: NodeId,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    Block {
        body: Vec<NodeId>,
    },
    Call {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    /// Identifier read as a reference
    Identifier(String),
    /// Identifier declaring a name: parameter, declarator or function name
    Binding(String),
    StringLiteral(StrLit),
    /// Any other statement
    Statement {
        syntax: String,
        children: Vec<NodeId>,
    },
    /// Any other expression, pattern or clause
    Syntax {
        syntax: String,
        children: Vec<NodeId>,
    },
}

impl NodeKind {
    /// Direct children in source order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program { body } | NodeKind::Block { body } => body.clone(),
            NodeKind::ImportDeclaration { source, .. } => vec![*source],
            NodeKind::ExpressionStatement { expression } => vec![*expression],
            NodeKind::Call { callee, arguments } => {
                let mut children = vec![*callee];
                children.extend(arguments);
                children
            }
            NodeKind::Statement { children, .. } | NodeKind::Syntax { children, .. } => {
                children.clone()
            }
            NodeKind::Identifier(_) | NodeKind::Binding(_) | NodeKind::StringLiteral(_) => {
                Vec::new()
            }
        }
    }

    /// Whether this node sits at statement level (the program itself included)
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Program { .. }
                | NodeKind::ImportDeclaration { .. }
                | NodeKind::ExpressionStatement { .. }
                | NodeKind::Block { .. }
                | NodeKind::Statement { .. }
        )
    }

    pub fn is_expression_statement(&self) -> bool {
        matches!(self, NodeKind::ExpressionStatement { .. })
    }

    /// The ordered statement list owned by a program or block
    pub fn statement_list(&self) -> Option<&[NodeId]> {
        match self {
            NodeKind::Program { body } | NodeKind::Block { body } => Some(body),
            _ => None,
        }
    }

    fn statement_list_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            NodeKind::Program { body } | NodeKind::Block { body } => Some(body),
            _ => None,
        }
    }

    /// Node type name, used in diagnostics
    pub fn type_name(&self) -> &str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::ImportDeclaration { .. } => "ImportDeclaration",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::Block { .. } => "BlockStatement",
            NodeKind::Call { .. } => "CallExpression",
            NodeKind::Identifier(_) => "Identifier",
            NodeKind::Binding(_) => "BindingIdentifier",
            NodeKind::StringLiteral(_) => "StringLiteral",
            NodeKind::Statement { syntax, .. } | NodeKind::Syntax { syntax, .. } => syntax,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub span: Span,
    pub range: TextRange,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    removed: bool,
}

impl Node {
    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Structural edit failures
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node {0} does not exist or was removed")]
    UnknownNode(NodeId),

    #[error("Node {0} does not own a statement list")]
    NoStatementList(NodeId),

    #[error("Node {0} is not an element of its parent's statement list")]
    NotInStatementList(NodeId),

    #[error("Node {0} can only be replaced by a literal or an identifier")]
    NotPrintable(NodeId),
}

/// Syntax tree of one module, with the edits made to it so far
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
    #[serde(skip)]
    source: String,
    #[serde(skip)]
    edits: Vec<TextEdit>,
}

impl SyntaxTree {
    /// Create a tree holding an empty program
    pub fn new() -> Self {
        Self::with_source(String::new())
    }

    /// Create an empty program over `source`; nodes are added by the parser
    pub fn with_source(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            nodes: vec![Node {
                kind: NodeKind::Program { body: Vec::new() },
                parent: None,
                span: Span::default(),
                range: TextRange::new(0, source.len()),
                removed: false,
            }],
            root: NodeId(0),
            source,
            edits: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Module text as parsed, before any edit
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Edits recorded so far, in the order they were made
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    /// Number of nodes ever allocated, removed ones included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).map(|node| node.span).unwrap_or_default()
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.node(id).map(|node| node.range).unwrap_or_default()
    }

    /// Source text of a node as written, ignoring edits
    pub fn text(&self, id: NodeId) -> Option<&str> {
        let range = self.node(id)?.range;
        self.source.get(range.start..range.end)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// Exists and has not been removed or replaced away
    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| !node.removed)
    }

    /// Top-level statements of the program
    pub fn statements(&self) -> &[NodeId] {
        self.kind(self.root)
            .and_then(NodeKind::statement_list)
            .unwrap_or(&[])
    }

    /// Allocate a node and adopt its children
    pub fn add(&mut self, kind: NodeKind, range: TextRange, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len());
        for child in kind.children() {
            if let Some(node) = self.nodes.get_mut(child.0) {
                node.parent = Some(id);
            }
        }
        self.nodes.push(Node {
            kind,
            parent: None,
            span,
            range,
            removed: false,
        });
        id
    }

    /// Append a statement to a program or block body
    pub fn push_statement(&mut self, owner: NodeId, statement: NodeId) -> Result<(), TreeError> {
        if !self.is_live(statement) {
            return Err(TreeError::UnknownNode(statement));
        }
        let list = self
            .nodes
            .get_mut(owner.0)
            .filter(|node| !node.removed)
            .ok_or(TreeError::UnknownNode(owner))?
            .kind
            .statement_list_mut()
            .ok_or(TreeError::NoStatementList(owner))?;
        list.push(statement);
        self.nodes[statement.0].parent = Some(owner);
        Ok(())
    }

    /// Position of a statement within its parent's statement list
    pub fn position_in_parent(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self
            .kind(parent)?
            .statement_list()?
            .iter()
            .position(|stmt| *stmt == id)?;
        Some((parent, index))
    }

    /// Detach a statement from its parent's statement list and delete its
    /// text, along with its line when nothing else is written on it
    pub fn remove(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.is_live(id) {
            return Err(TreeError::UnknownNode(id));
        }
        let (parent, index) = self
            .position_in_parent(id)
            .ok_or(TreeError::NotInStatementList(id))?;
        if let Some(list) = self.nodes[parent.0].kind.statement_list_mut() {
            list.remove(index);
        }
        self.nodes[id.0].parent = None;
        self.mark_removed(id);

        let range = source_gen::statement_extent(&self.source, self.nodes[id.0].range);
        self.record(TextEdit {
            range,
            replacement: String::new(),
        });
        Ok(())
    }

    /// Replace a node's content in place; the handle and parent link stay valid
    pub fn replace_with(&mut self, id: NodeId, kind: NodeKind) -> Result<(), TreeError> {
        if !self.is_live(id) {
            return Err(TreeError::UnknownNode(id));
        }
        let replacement = source_gen::leaf_source(&kind).ok_or(TreeError::NotPrintable(id))?;

        let incoming = kind.children();
        let outgoing = self.nodes[id.0].kind.children();
        for child in outgoing {
            if !incoming.contains(&child) {
                self.mark_removed(child);
            }
        }
        self.nodes[id.0].kind = kind;

        let range = self.nodes[id.0].range;
        self.record(TextEdit { range, replacement });
        Ok(())
    }

    /// An import declaration's source literal and the node holding it
    pub fn import_source(&self, id: NodeId) -> Option<(NodeId, &StrLit)> {
        if !self.is_live(id) {
            return None;
        }
        let Some(NodeKind::ImportDeclaration { source, .. }) = self.kind(id) else {
            return None;
        };
        match self.kind(*source) {
            Some(NodeKind::StringLiteral(literal)) => Some((*source, literal)),
            _ => None,
        }
    }

    /// Live nodes below `id` (inclusive), in source preorder
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current).filter(|node| !node.removed) else {
                continue;
            };
            order.push(current);
            stack.extend(node.kind.children().into_iter().rev());
        }
        order
    }

    // A newer edit supersedes the edits it covers
    fn record(&mut self, edit: TextEdit) {
        self.edits.retain(|earlier| !edit.range.contains(earlier.range));
        self.edits.push(edit);
    }

    fn mark_removed(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0) {
                node.removed = true;
                stack.extend(node.kind.children());
            }
        }
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}
