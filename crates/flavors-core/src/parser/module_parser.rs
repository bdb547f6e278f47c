// Tree-sitter front end for JavaScript modules
// The concrete syntax tree is lowered into the arena tree. Imports, calls,
// identifiers, string literals and statement lists get their own node kinds;
// every other named node keeps its grammar type name and source range.

use tree_sitter::{Node, Parser as TsParser};

use crate::ast::source_gen::unquote;
use crate::ast::{ImportSpecifier, NodeId, NodeKind, Span, StrLit, SyntaxTree, TextRange};

use super::{ParseError, Parser};

/// Deepest syntax nesting lowered before giving up
pub const MAX_TREE_DEPTH: usize = 512;

/// Grammar node types lowered as statements
const STATEMENT_KINDS: &[&str] = &[
    "export_statement",
    "import_statement",
    "debugger_statement",
    "expression_statement",
    "variable_declaration",
    "lexical_declaration",
    "function_declaration",
    "generator_function_declaration",
    "class_declaration",
    "statement_block",
    "if_statement",
    "switch_statement",
    "for_statement",
    "for_in_statement",
    "while_statement",
    "do_statement",
    "try_statement",
    "with_statement",
    "break_statement",
    "continue_statement",
    "return_statement",
    "throw_statement",
    "empty_statement",
    "labeled_statement",
];

/// Parser for JavaScript modules (ES modules, CommonJS and JSX)
pub struct ModuleParser {
    parser: TsParser,
}

impl ModuleParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|e| ParseError::Language(e.to_string()))?;
        Ok(Self { parser })
    }
}

impl Parser for ModuleParser {
    fn parse(&mut self, source: &str) -> Result<SyntaxTree, ParseError> {
        let syntax = self.parser.parse(source, None).ok_or(ParseError::NoTree)?;
        let root = syntax.root_node();
        if let Some(error) = first_error(root, source) {
            return Err(error);
        }
        Lowering::new(source).program(root)
    }

    fn name(&self) -> &'static str {
        "javascript"
    }
}

struct Lowering<'s> {
    source: &'s str,
    tree: SyntaxTree,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            tree: SyntaxTree::with_source(source),
        }
    }

    fn program(mut self, root: Node<'_>) -> Result<SyntaxTree, ParseError> {
        let program = self.tree.root();
        for child in named_children(root) {
            if child.kind() == "hash_bang_line" {
                continue;
            }
            let statement = self.lower(child, 1)?;
            self.tree.push_statement(program, statement)?;
        }
        Ok(self.tree)
    }

    fn lower(&mut self, node: Node<'_>, depth: usize) -> Result<NodeId, ParseError> {
        if depth > MAX_TREE_DEPTH {
            return Err(ParseError::TooDeep {
                limit: MAX_TREE_DEPTH,
                span: span_of(node),
            });
        }

        let kind = match node.kind() {
            "statement_block" => NodeKind::Block {
                body: self.lower_children(node, depth)?,
            },
            "expression_statement" => {
                let mut children = self.lower_children(node, depth)?;
                if children.len() == 1 {
                    NodeKind::ExpressionStatement {
                        expression: children.remove(0),
                    }
                } else {
                    NodeKind::Statement {
                        syntax: node.kind().to_string(),
                        children,
                    }
                }
            }
            "import_statement" => self.import(node, depth)?,
            "call_expression" => self.call(node, depth)?,
            "parenthesized_expression" => {
                // Parentheses are not nodes of their own
                if let [expression] = named_children(node)[..] {
                    return self.lower(expression, depth + 1);
                }
                self.generic(node, depth)?
            }
            "identifier" if is_binding(node) => NodeKind::Binding(self.text(node)),
            "identifier" | "shorthand_property_identifier" => NodeKind::Identifier(self.text(node)),
            "string" => NodeKind::StringLiteral(self.string(node)),
            _ => self.generic(node, depth)?,
        };

        Ok(self.tree.add(kind, range_of(node), span_of(node)))
    }

    fn lower_children(&mut self, node: Node<'_>, depth: usize) -> Result<Vec<NodeId>, ParseError> {
        named_children(node)
            .into_iter()
            .map(|child| self.lower(child, depth + 1))
            .collect()
    }

    fn generic(&mut self, node: Node<'_>, depth: usize) -> Result<NodeKind, ParseError> {
        let children = self.lower_children(node, depth)?;
        let syntax = node.kind().to_string();
        Ok(if STATEMENT_KINDS.contains(&node.kind()) {
            NodeKind::Statement { syntax, children }
        } else {
            NodeKind::Syntax { syntax, children }
        })
    }

    fn import(&mut self, node: Node<'_>, depth: usize) -> Result<NodeKind, ParseError> {
        let Some(source) = node
            .child_by_field_name("source")
            .filter(|source| source.kind() == "string")
        else {
            return self.generic(node, depth);
        };

        let mut specifiers = Vec::new();
        for clause in named_children(node) {
            if clause.kind() == "import_clause" {
                self.import_clause(clause, &mut specifiers);
            }
        }

        let literal = NodeKind::StringLiteral(self.string(source));
        let source = self.tree.add(literal, range_of(source), span_of(source));
        Ok(NodeKind::ImportDeclaration { specifiers, source })
    }

    fn import_clause(&self, clause: Node<'_>, specifiers: &mut Vec<ImportSpecifier>) {
        for child in named_children(clause) {
            match child.kind() {
                "identifier" => specifiers.push(ImportSpecifier::Default {
                    local: self.text(child),
                }),
                "namespace_import" => {
                    let local = named_children(child)
                        .into_iter()
                        .find(|name| name.kind() == "identifier");
                    if let Some(local) = local {
                        specifiers.push(ImportSpecifier::Namespace {
                            local: self.text(local),
                        });
                    }
                }
                "named_imports" => {
                    for specifier in named_children(child) {
                        if let Some(specifier) = self.import_specifier(specifier) {
                            specifiers.push(specifier);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn import_specifier(&self, specifier: Node<'_>) -> Option<ImportSpecifier> {
        if specifier.kind() != "import_specifier" {
            return None;
        }
        let name = specifier.child_by_field_name("name")?;
        let imported = if name.kind() == "string" {
            unquote(&self.text(name))
        } else {
            self.text(name)
        };
        let local = match specifier.child_by_field_name("alias") {
            Some(alias) => self.text(alias),
            None => imported.clone(),
        };
        Some(ImportSpecifier::Named { imported, local })
    }

    fn call(&mut self, node: Node<'_>, depth: usize) -> Result<NodeKind, ParseError> {
        let function = node.child_by_field_name("function");
        // Tagged templates and optional calls stay generic
        let arguments = node
            .child_by_field_name("arguments")
            .filter(|arguments| arguments.kind() == "arguments");
        let optional = node.child_by_field_name("optional_chain").is_some();

        match (function, arguments) {
            (Some(function), Some(arguments)) if !optional => {
                let callee = self.lower(function, depth + 1)?;
                let arguments = self.lower_children(arguments, depth + 1)?;
                Ok(NodeKind::Call { callee, arguments })
            }
            _ => self.generic(node, depth),
        }
    }

    fn string(&self, node: Node<'_>) -> StrLit {
        let raw = self.text(node);
        StrLit::with_raw(unquote(&raw), raw)
    }

    fn text(&self, node: Node<'_>) -> String {
        self.source
            .get(node.byte_range())
            .unwrap_or_default()
            .to_string()
    }
}

/// Named children, comments excluded
fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

/// Whether an identifier declares a name rather than reading one
fn is_binding(node: Node<'_>) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    let field_is = |field: &str| parent.child_by_field_name(field) == Some(node);
    match parent.kind() {
        "formal_parameters" | "array_pattern" | "rest_pattern" => true,
        "variable_declarator"
        | "function_declaration"
        | "function_expression"
        | "generator_function_declaration"
        | "generator_function"
        | "class_declaration"
        | "class" => field_is("name"),
        "arrow_function" | "catch_clause" => field_is("parameter"),
        "assignment_pattern" => field_is("left"),
        "pair_pattern" => field_is("value"),
        _ => false,
    }
}

/// First syntax error in source order
fn first_error(root: Node<'_>, source: &str) -> Option<ParseError> {
    if !root.has_error() {
        return None;
    }

    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_missing() {
            return Some(ParseError::Syntax {
                message: format!("missing '{}'", node.kind()),
                span: span_of(node),
            });
        }
        if node.is_error() {
            let text = source.get(node.byte_range()).unwrap_or_default();
            let snippet: String = text.chars().take(24).collect();
            let message = match snippet.trim() {
                "" => "unexpected syntax".to_string(),
                snippet => format!("unexpected '{snippet}'"),
            };
            return Some(ParseError::Syntax {
                message,
                span: span_of(node),
            });
        }

        let mut cursor = node.walk();
        let broken: Vec<Node<'_>> = node
            .children(&mut cursor)
            .filter(|child| child.has_error() || child.is_missing())
            .collect();
        stack.extend(broken.into_iter().rev());
    }

    Some(ParseError::Syntax {
        message: "unexpected syntax".to_string(),
        span: span_of(root),
    })
}

fn range_of(node: Node<'_>) -> TextRange {
    TextRange::new(node.start_byte(), node.end_byte())
}

fn span_of(node: Node<'_>) -> Span {
    let position = node.start_position();
    Span::new(position.row as u32 + 1, position.column as u32 + 1)
}
