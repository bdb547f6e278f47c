/*!
# Literal Substitution Rule

Replaces `getFlavor("key")` with the string configured for `key`, or with
`""` when the key is not configured.
*/

use tracing::debug;

use crate::ast::{NodeId, NodeKind, StrLit, SyntaxTree};

use super::predicates::is_dangling;
use super::resolver::resolve_flavor;
use super::rules::{marker_name, MacroRule};
use super::{ExpansionSummary, MacroContext, MacroError, LITERAL_MARKER};

#[derive(Debug, Default)]
pub struct LiteralSubstitutionRule;

impl LiteralSubstitutionRule {
    pub fn new() -> Self {
        Self
    }
}

impl MacroRule for LiteralSubstitutionRule {
    fn name(&self) -> &'static str {
        "LiteralSubstitution"
    }

    fn description(&self) -> &'static str {
        "Replaces getFlavor(\"key\") calls with the configured string literal"
    }

    fn marker(&self) -> &'static str {
        LITERAL_MARKER
    }

    // A lookup inside a removed marker statement has nothing left to replace
    fn skips_detached_sites(&self) -> bool {
        true
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

        let call = tree.parent(site);
        let arguments = match call.and_then(|call| tree.kind(call)) {
            Some(NodeKind::Call { callee, arguments }) if *callee == site => arguments.clone(),
            _ => {
                return Err(MacroError::NotACallExpression {
                    span: tree.span(site),
                    marker,
                })
            }
        };
        let Some(call) = call else {
            return Err(MacroError::NotACallExpression {
                span: tree.span(site),
                marker,
            });
        };
        let span = tree.span(call);

        let [argument] = arguments[..] else {
            return Err(MacroError::WrongArity {
                marker,
                found: arguments.len(),
                span,
            });
        };

        let key = match tree.kind(argument) {
            Some(NodeKind::StringLiteral(lit)) if !is_dangling(tree, Some(argument)) => {
                lit.value.clone()
            }
            _ => {
                return Err(MacroError::ArgumentMustBeStringLiteral {
                    marker,
                    span: tree.span(argument),
                })
            }
        };

        let flavor = resolve_flavor(&key, context.config);
        debug!(%key, value = %flavor, %span, "Substituting flavor literal");
        tree.replace_with(call, NodeKind::StringLiteral(StrLit::new(flavor)))?;

        Ok(ExpansionSummary {
            literals_substituted: 1,
            ..Default::default()
        })
    }
}
