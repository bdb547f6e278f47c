//! # Flavors Core
//!
//! Build-time flavor selection for JavaScript modules, including:
//! - A tree-sitter JavaScript parser lowered into an arena syntax tree
//! - Source generation that splices edits into the module text, leaving
//!   comments and layout untouched
//! - The flavors macro (import rewriting and `getFlavor` substitution)
//! - Configuration discovery and a file/directory driver
//!
//! ```
//! use flavors_core::{FlavorConfig, FlavorsMacro};
//!
//! let config = FlavorConfig::new().with_value("theme", "dark");
//! let output = FlavorsMacro::default()
//!     .expand_source(
//!         "import { getFlavor } from \"flavors.macro\";\nconst theme = getFlavor(\"theme\");\n",
//!         &config,
//!     )
//!     .unwrap();
//! assert_eq!(output, "const theme = \"dark\";\n");
//! ```

#![warn(clippy::all)]

pub mod ast;
pub mod config;
pub mod macros;
pub mod parser;

// Re-export commonly used types
pub use ast::{NodeId, NodeKind, Span, StrLit, SyntaxTree, TextRange, ToSource, TreeError};
pub use config::{discover, ConfigError, FlavorConfig, FlavorLookup, LoadedConfig, CONFIG_NAME};
pub use macros::{
    ExpansionSummary, FileTransformationSummary, FileTransformer, FlavorsMacro, MacroError,
    MacroOptions, MacroReferences, OutputFormat,
};
pub use parser::{create_parser, parse_module, ParseError, Parser};

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default log directive when `RUST_LOG` is not set
pub const DEFAULT_LOG_DIRECTIVE: &str = "flavors_core=info";

/// Initialize tracing for flavors components
pub fn init_tracing() {
    init_tracing_with(DEFAULT_LOG_DIRECTIVE);
}

/// Initialize tracing, falling back to `directive` when `RUST_LOG` is unset.
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing_with(directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Error types for flavors operations
#[derive(thiserror::Error, Debug)]
pub enum FlavorsError {
    /// Source could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The macro was misused
    #[error("Macro error: {0}")]
    Macro(#[from] MacroError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for flavors operations
pub type Result<T> = std::result::Result<T, FlavorsError>;
