use crate::ast::{NodeId, Span, TreeError};

/// Misuse of a marker; fatal to the module being expanded.
///
/// `marker` is the name the marker was written as in the source.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MacroError {
    #[error("The reference path for the {marker} macro is empty (node {node} is not in the tree)")]
    InvalidReference { marker: String, node: NodeId },

    #[error("Gave up looking for the statement holding {marker} after {limit} levels (at {span}); the macro cannot be nested that deep")]
    UnboundedNesting {
        marker: String,
        limit: usize,
        span: Span,
    },

    #[error("The {marker} macro must be used as an expression statement, at the top level, not nested. Eg - {marker}() (at {span})")]
    NotAnExpressionStatement { marker: String, span: Span },

    #[error("The statement holding the {marker} macro is not inside a statement body (at {span})")]
    MissingStatementBody { marker: String, span: Span },

    #[error("{marker} needs to be a call expression - eg. {marker}(\"layout-theme-key\") (at {span})")]
    NotACallExpression { marker: String, span: Span },

    #[error("{marker} requires exactly 1 argument, found {found} (at {span})")]
    WrongArity {
        marker: String,
        found: usize,
        span: Span,
    },

    #[error("Argument for {marker} cannot be anything other than a string literal (at {span})")]
    ArgumentMustBeStringLiteral { marker: String, span: Span },

    #[error("Tree edit failed: {0}")]
    Tree(#[from] TreeError),
}
