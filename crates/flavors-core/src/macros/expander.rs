/*!
# FlavorsMacro - Entry Point

Runs the marker rules over one module. A pass either completes or leaves
the tree exactly as it found it.
*/

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::ast::{SyntaxTree, ToSource};
use crate::config::FlavorLookup;
use crate::parser::parse_module;

use super::import_rewrite::ImportRewriteRule;
use super::literal_substitution::LiteralSubstitutionRule;
use super::references::{remove_macro_imports, MacroReferences};
use super::rules::{MacroRule, RuleStats};
use super::{MacroContext, MacroError, MacroOptions};

/// What one pass changed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionSummary {
    pub imports_rewritten: u64,
    pub literals_substituted: u64,
    pub markers_removed: u64,
    pub macro_imports_removed: u64,
}

impl ExpansionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: ExpansionSummary) {
        self.imports_rewritten += other.imports_rewritten;
        self.literals_substituted += other.literals_substituted;
        self.markers_removed += other.markers_removed;
        self.macro_imports_removed += other.macro_imports_removed;
    }

    /// Number of tree edits made by the rules
    pub fn edits(&self) -> u64 {
        self.imports_rewritten + self.literals_substituted + self.markers_removed
    }

    pub fn is_noop(&self) -> bool {
        self.edits() == 0 && self.macro_imports_removed == 0
    }
}

/// The flavors macro: import rewriting followed by literal substitution
pub struct FlavorsMacro {
    options: MacroOptions,
    rules: Vec<Box<dyn MacroRule>>,
    stats: HashMap<String, RuleStats>,
}

impl FlavorsMacro {
    pub fn new(options: MacroOptions) -> Self {
        let mut expander = Self {
            options,
            rules: Vec::new(),
            stats: HashMap::new(),
        };
        expander.add_rule(Box::new(ImportRewriteRule::new()));
        expander.add_rule(Box::new(LiteralSubstitutionRule::new()));
        expander
    }

    fn add_rule(&mut self, rule: Box<dyn MacroRule>) {
        let rule_name = rule.name().to_string();
        self.stats
            .insert(rule_name.clone(), RuleStats::new(rule_name));
        self.rules.push(rule);
    }

    pub fn options(&self) -> &MacroOptions {
        &self.options
    }

    /// Per-rule statistics accumulated over every pass of this instance
    pub fn stats(&self) -> &HashMap<String, RuleStats> {
        &self.stats
    }

    /// Apply the rules to already classified references.
    ///
    /// Import-rewrite sites are handled before literal sites, each set in
    /// the order given. On error the tree is restored.
    pub fn run(
        &mut self,
        tree: &mut SyntaxTree,
        refs: &MacroReferences,
        config: &dyn FlavorLookup,
    ) -> Result<ExpansionSummary, MacroError> {
        let snapshot = tree.clone();
        let result = self.apply_rules(tree, refs, config);
        if result.is_err() {
            *tree = snapshot;
        }
        result
    }

    /// Full pass over a module: collect the macro references, run the
    /// rules, then drop the macro import. Modules without a macro import
    /// are left alone.
    pub fn expand(
        &mut self,
        tree: &mut SyntaxTree,
        config: &dyn FlavorLookup,
    ) -> Result<ExpansionSummary, MacroError> {
        let refs = MacroReferences::collect(tree, &self.options.macro_source);
        if refs.macro_imports().is_empty() {
            debug!(macro_source = %self.options.macro_source, "No macro import found");
            return Ok(ExpansionSummary::default());
        }

        let snapshot = tree.clone();
        let result = self.apply_rules(tree, &refs, config).and_then(|mut summary| {
            summary.macro_imports_removed = remove_macro_imports(tree, &refs)? as u64;
            Ok(summary)
        });

        match result {
            Ok(summary) => {
                info!(
                    imports_rewritten = summary.imports_rewritten,
                    literals_substituted = summary.literals_substituted,
                    markers_removed = summary.markers_removed,
                    "Expanded flavors macro"
                );
                Ok(summary)
            }
            Err(e) => {
                *tree = snapshot;
                Err(e)
            }
        }
    }

    /// Parse, expand and print a module
    pub fn expand_source(
        &mut self,
        source: &str,
        config: &dyn FlavorLookup,
    ) -> crate::Result<String> {
        let mut tree = parse_module(source)?;
        self.expand(&mut tree, config)?;
        Ok(tree.to_source())
    }

    fn apply_rules(
        &mut self,
        tree: &mut SyntaxTree,
        refs: &MacroReferences,
        config: &dyn FlavorLookup,
    ) -> Result<ExpansionSummary, MacroError> {
        let context = MacroContext::new(&self.options, config);
        let mut summary = ExpansionSummary::default();

        for name in refs.names() {
            if !self.rules.iter().any(|rule| rule.marker() == name) {
                warn!(imported = %name, "Unsupported flavors macro import, references left as is");
            }
        }

        for rule in &self.rules {
            let stats = self
                .stats
                .entry(rule.name().to_string())
                .or_insert_with(|| RuleStats::new(rule.name().to_string()));

            for &site in refs.get(rule.marker()) {
                if rule.skips_detached_sites() && !tree.is_live(site) {
                    debug!(rule = rule.name(), %site, "Skipping reference removed by an earlier edit");
                    stats.skipped += 1;
                    continue;
                }

                stats.applications += 1;
                match rule.apply(tree, site, &context) {
                    Ok(applied) => {
                        stats.edits += applied.edits();
                        summary.merge(applied);
                    }
                    Err(e) => {
                        stats.errors += 1;
                        warn!(rule = rule.name(), error = %e, "Flavors macro failed");
                        return Err(e);
                    }
                }
            }
        }

        Ok(summary)
    }
}

impl Default for FlavorsMacro {
    fn default() -> Self {
        Self::new(MacroOptions::default())
    }
}
