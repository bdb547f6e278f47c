/*!
# Macro Rules

Core trait implemented by the marker rules, plus per-rule statistics.
*/

use crate::ast::{NodeId, NodeKind, SyntaxTree};

use super::{ExpansionSummary, MacroContext, MacroError};

/// A rule consuming the references of one marker
///
/// The entry point hands every reference classified under [`marker`](Self::marker)
/// to [`apply`](Self::apply), in source order.
pub trait MacroRule: Send + Sync {
    /// Human-readable name for this rule
    fn name(&self) -> &'static str;

    /// Detailed description of what this rule does
    fn description(&self) -> &'static str;

    /// Imported name whose references this rule consumes
    fn marker(&self) -> &'static str;

    /// Whether references detached by earlier edits of the same pass are
    /// skipped instead of reported
    fn skips_detached_sites(&self) -> bool {
        false
    }

    /// Validate one reference and edit the tree
    fn apply(
        &self,
        tree: &mut SyntaxTree,
        site: NodeId,
        context: &MacroContext<'_>,
    ) -> Result<ExpansionSummary, MacroError>;
}

/// Name the marker is written as at `site`, for diagnostics
pub(crate) fn marker_name(tree: &SyntaxTree, site: NodeId, fallback: &str) -> String {
    match tree.kind(site) {
        Some(NodeKind::Identifier(name)) => name.clone(),
        _ => fallback.to_string(),
    }
}

/// Rule execution statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RuleStats {
    pub rule_name: String,
    pub applications: u64,
    pub edits: u64,
    pub skipped: u64,
    pub errors: u64,
}

impl RuleStats {
    pub fn new(rule_name: String) -> Self {
        Self {
            rule_name,
            ..Default::default()
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.applications == 0 {
            0.0
        } else {
            ((self.applications - self.errors) as f64) / (self.applications as f64)
        }
    }
}
