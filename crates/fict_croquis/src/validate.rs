//! Semantic validation.
//!
//! Turns the facts recorded by the binder into the contractual error
//! messages, and rejects cyclic derived dependency graphs. Runs after the
//! dependency graph is built (so cycles are available) and before
//! classification.

use fict_carton::Span;

use crate::analysis::AnalysisSummary;
use crate::binder::MacroFactKind;
use crate::hir::UseProfile;

/// A semantic error, positioned by span; the facade resolves line/column.
#[derive(Debug, Clone)]
pub struct SemanticError {
    pub message: String,
    pub span: Span,
}

impl SemanticError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Validate the analyzed module. The first error in source order wins.
pub fn validate(summary: &AnalysisSummary) -> Result<(), SemanticError> {
    let mut errors: Vec<SemanticError> = Vec::new();

    // aliased macro imports
    for aliased in &summary.macros.aliased {
        errors.push(SemanticError::new(
            format!(
                "Fict macro imports cannot be aliased: import {} by its own name",
                aliased.kind.as_str()
            ),
            aliased.span,
        ));
    }

    // macro placement facts
    for fact in &summary.macro_facts {
        let message = match fact.kind {
            MacroFactKind::StateOk | MacroFactKind::EffectOk => continue,
            MacroFactKind::StateInLoop => "$state cannot be declared inside loops".to_string(),
            MacroFactKind::StateInConditional => {
                "$state cannot be declared inside loops or conditionals".to_string()
            }
            MacroFactKind::StateInNestedFunction => {
                "$state can only be used in a component or hook function body; it cannot be declared inside nested functions"
                    .to_string()
            }
            MacroFactKind::StateDestructured => {
                "Destructuring $state is not supported; the result of $state must be assigned directly to a variable"
                    .to_string()
            }
            MacroFactKind::StateNotDirectlyAssigned => {
                "the result of $state must be assigned directly to a variable".to_string()
            }
            MacroFactKind::StateNotImported => {
                "$state must be imported from \"fict\"".to_string()
            }
            MacroFactKind::EffectInLoopOrConditional => {
                "$effect cannot be called inside loops or conditionals".to_string()
            }
            MacroFactKind::EffectInNestedFunction => {
                "$effect can only be called in a component or hook function body".to_string()
            }
            MacroFactKind::EffectNotImported => {
                "$effect must be imported from \"fict\"".to_string()
            }
        };
        errors.push(SemanticError::new(message, fact.span));
    }

    // writes to special bindings
    for binding in &summary.bindings {
        if !binding.profile.contains(UseProfile::REASSIGNED) {
            continue;
        }
        if binding.alias_of.is_some_and(|t| summary.bindings[t.index()].is_state_macro) {
            errors.push(SemanticError::new(
                format!(
                    "Alias reassignment is not supported: \"{}\" captures the current value of a state binding",
                    binding.name
                ),
                binding.span,
            ));
            continue;
        }
        if binding
            .destructured_from
            .is_some_and(|t| summary.bindings[t.index()].is_state_macro)
        {
            errors.push(SemanticError::new(
                format!("Cannot assign to destructured state alias \"{}\"", binding.name),
                binding.span,
            ));
            continue;
        }
        if !binding.mutable && (binding.is_explicit_memo || !binding.deps.is_empty()) {
            errors.push(SemanticError::new(
                format!("Cannot reassign derived binding \"{}\"", binding.name),
                binding.span,
            ));
        }
    }

    // cyclic derived chains
    if let Some(cycle) = summary.graph.find_cycle() {
        let first = cycle.path.first().copied();
        let span = first.map_or(Span::STUB, |id| summary.bindings[id.index()].span);
        errors.push(SemanticError::new(
            format!(
                "cyclic derived dependency: {}",
                cycle.display(&summary.bindings)
            ),
            span,
        ));
    }

    errors.sort_by_key(|e| e.span.start);
    match errors.into_iter().next() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
