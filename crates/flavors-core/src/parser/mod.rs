// Parser module - turns JavaScript module source into a SyntaxTree
use std::path::Path;

use anyhow::{Context, Result};

use crate::ast::{Span, SyntaxTree, TreeError};

pub mod module_parser;


pub use module_parser::ModuleParser;

/// Why a module could not be turned into a tree
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{message} at {span}")]
    Syntax { message: String, span: Span },

    #[error("Syntax nested deeper than {limit} levels at {span}")]
    TooDeep { limit: usize, span: Span },

    #[error("Failed to load the JavaScript grammar: {0}")]
    Language(String),

    #[error("Parser returned no tree")]
    NoTree,

    #[error("Failed to build syntax tree: {0}")]
    Tree(#[from] TreeError),
}

impl ParseError {
    /// Position the error was detected at, when it has one
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::Syntax { span, .. } | ParseError::TooDeep { span, .. } => Some(*span),
            _ => None,
        }
    }
}

/// Trait for source parsers producing a module tree
pub trait Parser: Send + Sync {
    /// Parse a whole module
    fn parse(&mut self, source: &str) -> std::result::Result<SyntaxTree, ParseError>;

    /// Parse a file
    fn parse_file(&mut self, path: &Path) -> Result<SyntaxTree> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.parse(&source)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Get parser name for debugging
    fn name(&self) -> &'static str;
}

/// Create a parser by name
pub fn create_parser(name: &str) -> Result<Box<dyn Parser>> {
    match name {
        "javascript" | "js" | "module" => Ok(Box::new(ModuleParser::new()?)),
        other => anyhow::bail!("Unknown parser type: {other}"),
    }
}

/// Parse module source with the default parser
pub fn parse_module(source: &str) -> std::result::Result<SyntaxTree, ParseError> {
    ModuleParser::new()?.parse(source)
}
