/*!
# Flavors Macro - Build-time Flavor Selection

Compile-time macro that lets one codebase ship several flavors. Two markers
are imported from the macro module and consumed during the build:

```js
import flavors, { getFlavor } from "flavors.macro";
import Theme from "./theme";        // rewritten to "./theme.dark"
flavors();                          // removed

const layout = getFlavor("layout"); // becomes "compact"
```

## Architecture

- `resolver`: pure lookups against a [`FlavorLookup`](crate::config::FlavorLookup)
- `predicates`: guards used before dereferencing inputs
- `MacroRule`: trait implemented by the two markers' rules
- `ImportRewriteRule` / `LiteralSubstitutionRule`: the tree edits
- `MacroReferences`: finds the macro import and classifies its references
- `FlavorsMacro`: entry point running the rules over one module
- `FileTransformer`: file and directory driver
*/

pub mod error;
pub mod expander;
pub mod file_transform;
pub mod import_rewrite;
pub mod literal_substitution;
pub mod predicates;
pub mod references;
pub mod resolver;
pub mod rules;


// Re-export main types
pub use error::MacroError;
pub use expander::{ExpansionSummary, FlavorsMacro};
pub use file_transform::{FileTransformationSummary, FileTransformer, OutputFormat};
pub use import_rewrite::ImportRewriteRule;
pub use literal_substitution::LiteralSubstitutionRule;
pub use references::{is_macro_source, remove_macro_imports, MacroReferences};
pub use resolver::{resolve_flavor, resolve_import_path, ImportResolution};
pub use rules::{MacroRule, RuleStats};

use crate::config::{FlavorLookup, CONFIG_NAME};

/// Most ancestor steps taken looking for the marker's expression statement
pub const EXPRESSION_TRAVERSE_LIMIT: usize = 10;

/// Module path the markers are imported from
pub const DEFAULT_MACRO_SOURCE: &str = "flavors.macro";

/// Imported name of the import-rewrite marker (the macro's default export)
pub const IMPORT_MARKER: &str = "default";

/// Imported name of the literal-substitution marker
pub const LITERAL_MARKER: &str = "getFlavor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroOptions {
    /// Key the configuration is read from
    pub config_name: String,
    /// Import source identifying the macro
    pub macro_source: String,
    /// Bound on the upward search from a marker to its statement
    pub traverse_limit: usize,
}

impl Default for MacroOptions {
    fn default() -> Self {
        Self {
            config_name: CONFIG_NAME.to_string(),
            macro_source: DEFAULT_MACRO_SOURCE.to_string(),
            traverse_limit: EXPRESSION_TRAVERSE_LIMIT,
        }
    }
}

impl MacroOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_name(mut self, name: impl Into<String>) -> Self {
        self.config_name = name.into();
        self
    }

    pub fn with_macro_source(mut self, source: impl Into<String>) -> Self {
        self.macro_source = source.into();
        self
    }

    pub fn with_traverse_limit(mut self, limit: usize) -> Self {
        self.traverse_limit = limit;
        self
    }
}

/// Everything a rule needs besides the tree
pub struct MacroContext<'a> {
    pub options: &'a MacroOptions,
    pub config: &'a dyn FlavorLookup,
}

impl<'a> MacroContext<'a> {
    pub fn new(options: &'a MacroOptions, config: &'a dyn FlavorLookup) -> Self {
        Self { options, config }
    }
}
