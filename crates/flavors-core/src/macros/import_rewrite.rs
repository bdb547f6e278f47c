/*!
# Import Rewrite Rule

Handles the macro's default export used as a bare statement:

```js
import Header from "./header";
import Footer from "./footer";
flavors();
```

Every import declaration above the marker, in the same top-level body, has
its path resolved against the configuration. The marker statement is then
removed. Imports below the marker are never touched.
*/

use tracing::debug;

use crate::ast::{NodeId, NodeKind, SyntaxTree};

use super::predicates::is_dangling;
use super::resolver::resolve_import_path;
use super::rules::{marker_name, MacroRule};
use super::{ExpansionSummary, MacroContext, MacroError, IMPORT_MARKER};

#[derive(Debug, Default)]
pub struct ImportRewriteRule;

impl ImportRewriteRule {
    pub fn new() -> Self {
        Self
    }
}

/// Walk up from `site` to the expression statement containing it.
///
/// At most `limit` parent steps are taken. Meeting any other statement, or
/// running out of ancestors, means the marker is not used as a statement.
pub fn find_expression_statement(
    tree: &SyntaxTree,
    site: NodeId,
    limit: usize,
    marker: &str,
) -> Result<NodeId, MacroError> {
    let span = tree.span(site);
    let mut current = Some(site);
    let mut steps = 0;

    loop {
        if is_dangling(tree, current) {
            return Err(MacroError::NotAnExpressionStatement {
                marker: marker.to_string(),
                span,
            });
        }
        let Some((id, kind)) = current.and_then(|id| tree.kind(id).map(|kind| (id, kind))) else {
            return Err(MacroError::NotAnExpressionStatement {
                marker: marker.to_string(),
                span,
            });
        };

        if kind.is_expression_statement() {
            return Ok(id);
        }
        if kind.is_statement() {
            return Err(MacroError::NotAnExpressionStatement {
                marker: marker.to_string(),
                span,
            });
        }
        if steps >= limit {
            return Err(MacroError::UnboundedNesting {
                marker: marker.to_string(),
                limit,
                span,
            });
        }

        current = tree.parent(id);
        steps += 1;
    }
}

impl MacroRule for ImportRewriteRule {
    fn name(&self) -> &'static str {
        "ImportRewrite"
    }

    fn description(&self) -> &'static str {
        "Rewrites the paths of the imports preceding the marker statement and removes the marker"
    }

    fn marker(&self) -> &'static str {
        IMPORT_MARKER
    }

    fn apply(
        &self,
        tree: &mut SyntaxTree,
        site: NodeId,
        context: &MacroContext<'_>,
    ) -> Result<ExpansionSummary, MacroError> {
        let marker = marker_name(tree, site, self.marker());
        if is_dangling(tree, Some(site)) {
            return Err(MacroError::InvalidReference { marker, node: site });
        }

        let statement =
            find_expression_statement(tree, site, context.options.traverse_limit, &marker)?;
        let span = tree.span(statement);

        let parent = tree.parent(statement);
        let body = parent
            .and_then(|parent| tree.kind(parent))
            .and_then(NodeKind::statement_list)
            .ok_or_else(|| MacroError::MissingStatementBody {
                marker: marker.clone(),
                span,
            })?;
        if parent != Some(tree.root()) {
            return Err(MacroError::NotAnExpressionStatement { marker, span });
        }
        let index = body
            .iter()
            .position(|stmt| *stmt == statement)
            .ok_or_else(|| MacroError::MissingStatementBody {
                marker: marker.clone(),
                span,
            })?;
        let preceding = body[..index].to_vec();

        let mut summary = ExpansionSummary::default();
        for entry in preceding {
            let Some((literal, mut source)) = tree
                .import_source(entry)
                .map(|(literal, source)| (literal, source.clone()))
            else {
                continue;
            };
            let resolution = resolve_import_path(&source.value, context.config);
            if !resolution.changed {
                continue;
            }
            debug!(from = %source.value, to = %resolution.value, "Rewriting flavored import");
            source.set_value(&resolution.value);
            tree.replace_with(literal, NodeKind::StringLiteral(source))?;
            summary.imports_rewritten += 1;
        }

        tree.remove(statement)?;
        summary.markers_removed += 1;
        debug!(marker = %marker, %span, "Removed import-rewrite marker");

        Ok(summary)
    }
}
