//! Resolution of import paths and flavor values against a configuration.
//!
//! Both lookups are total: an unmapped import is left as written and a
//! missing flavor key resolves to the empty string.

use crate::config::FlavorLookup;

/// Outcome of looking up an import path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResolution {
    /// The path was found in the mapping (even if it maps to itself)
    pub changed: bool,
    pub value: String,
}

pub fn resolve_import_path<L: FlavorLookup + ?Sized>(raw_path: &str, config: &L) -> ImportResolution {
    match config.import_path(raw_path) {
        Some(mapped) => ImportResolution {
            changed: true,
            value: mapped.to_string(),
        },
        None => ImportResolution {
            changed: false,
            value: raw_path.to_string(),
        },
    }
}

pub fn resolve_flavor<L: FlavorLookup + ?Sized>(key: &str, config: &L) -> String {
    config.flavor_value(key).unwrap_or_default().to_string()
}
