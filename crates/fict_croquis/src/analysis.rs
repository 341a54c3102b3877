//! Analysis summary for a Fict module.
//!
//! Aggregates every semantic analysis result and is the single input to the
//! validator and the lowering pass.
//!
//! ```text
//! fict_armature (parse)
//!        |
//!   fict_relief (AST)
//!        |
//!  fict_croquis (this crate)
//!        |
//!  AnalysisSummary
//!        |
//!  fict_atelier (lowering / codegen)
//! ```

use fict_carton::{FxHashMap, FxHashSet};
use fict_relief::ast::Module;
use fict_relief::diagnostics::{RawDiagnostic, WarningCode};
use fict_relief::options::CompilerOptions;

use crate::binder::{Binder, BinderOutput, EffectFact, MacroFact};
use crate::builtins::is_safe_callee;
use crate::graph::DepGraph;
use crate::hir::*;
use crate::macros::MacroRegistry;
use crate::regions::infer_regions;
use crate::shape::{analyze_shapes, ShapeRecord};

/// Complete semantic analysis of one module.
#[derive(Debug)]
pub struct AnalysisSummary {
    pub functions: Vec<HirFunction>,
    pub blocks: Vec<HirBlock>,
    pub bindings: Vec<BindingRecord>,
    pub regions: Vec<Region>,
    pub macros: MacroRegistry,
    /// Identifier occurrence (span start) -> binding
    pub resolutions: FxHashMap<u32, BindingId>,
    /// Function construct (span start) -> function id
    pub functions_by_span: FxHashMap<u32, FunctionId>,
    pub macro_facts: Vec<MacroFact>,
    pub shapes: FxHashMap<BindingId, ShapeRecord>,
    pub graph: DepGraph,
    /// Bindings participating in the reactive graph
    pub reactive: FxHashSet<BindingId>,
    pub diagnostics: Vec<RawDiagnostic>,
}

impl AnalysisSummary {
    #[inline]
    pub fn binding(&self, id: BindingId) -> &BindingRecord {
        &self.bindings[id.index()]
    }

    #[inline]
    pub fn function(&self, id: FunctionId) -> &HirFunction {
        &self.functions[id.index()]
    }

    #[inline]
    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }

    /// Resolve an identifier occurrence by its span start.
    #[inline]
    pub fn resolve_at(&self, span_start: u32) -> Option<BindingId> {
        self.resolutions.get(&span_start).copied()
    }
}

/// Run the full analysis pipeline (macro scan, binder, finalization, shape
/// analysis, dependency graph, region inference). Classification is a
/// separate step so the validator can run between.
pub fn analyze(module: &Module, options: &CompilerOptions) -> AnalysisSummary {
    let macros = MacroRegistry::from_module(module);
    let out = Binder::run(module, &macros, options);

    let BinderOutput {
        functions,
        blocks,
        mut bindings,
        resolutions,
        functions_by_span,
        macro_facts,
        member_mutations,
        call_args,
        effects,
        writes,
        mut diagnostics,
    } = out;

    let reactive = finalize_reactivity(&mut bindings);

    // shape analysis (needs finalized binding records)
    let (shapes, shape_diags) = analyze_shapes(module, &bindings, &resolutions, options.dev);
    diagnostics.extend(shape_diags);

    // post-walk warnings
    emit_signal_argument_warnings(&bindings, &call_args, &mut diagnostics);
    if options.dev {
        emit_deep_mutation_warnings(&bindings, &member_mutations, &mut diagnostics);
    }
    emit_effect_warnings(&bindings, &reactive, &effects, &mut diagnostics);
    emit_component_warnings(&functions, &mut diagnostics);

    let graph = DepGraph::build(&bindings);
    let regions = infer_regions(&mut bindings, &functions, &writes);

    AnalysisSummary {
        functions,
        blocks,
        bindings,
        regions,
        macros,
        resolutions,
        functions_by_span,
        macro_facts,
        shapes,
        graph,
        reactive,
        diagnostics,
    }
}

/// Compute the reactive fixpoint and narrow dependency lists to reactive
/// sources only.
fn finalize_reactivity(bindings: &mut [BindingRecord]) -> FxHashSet<BindingId> {
    let mut reactive: FxHashSet<BindingId> = FxHashSet::default();

    for binding in bindings.iter() {
        if binding.is_state_macro
            || binding.is_explicit_memo
            || binding.kind == ReactiveKind::PropAccessor
        {
            reactive.insert(binding.id);
        }
    }
    for binding in bindings.iter() {
        if let Some(source) = binding.destructured_from {
            if bindings[source.index()].is_state_macro {
                reactive.insert(binding.id);
            }
        }
    }

    // derived fixpoint: a pure const whose deps reach a reactive source
    loop {
        let mut changed = false;
        for index in 0..bindings.len() {
            let binding = &bindings[index];
            if reactive.contains(&binding.id)
                || binding.mutable
                || binding.is_state_macro
                || binding.is_store
                || binding.alias_of.is_some()
                || binding.destructured_from.is_some()
                || !binding.init_pure
                || binding.init.is_none()
            {
                continue;
            }
            if binding.deps.iter().any(|d| reactive.contains(d)) {
                reactive.insert(binding.id);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    // narrow dep lists to reactive sources
    for binding in bindings.iter_mut() {
        if binding.is_state_macro || binding.is_store {
            binding.deps.clear();
            continue;
        }
        binding.deps.retain(|d| reactive.contains(d));
        if let Some(source) = binding.destructured_from {
            if !binding.deps.contains(&source) && reactive.contains(&source) {
                binding.deps.push(source);
            }
        }
    }

    reactive
}

/// `FICT-S002`: a bare Signal identifier passed to a callee outside the
/// known-safe list.
fn emit_signal_argument_warnings(
    bindings: &[BindingRecord],
    call_args: &[crate::binder::CallArgFact],
    diagnostics: &mut Vec<RawDiagnostic>,
) {
    for fact in call_args {
        let binding = &bindings[fact.arg.index()];
        if !binding.is_state_macro {
            continue;
        }
        let safe = fact.callee.as_deref().is_some_and(is_safe_callee);
        if safe {
            continue;
        }
        diagnostics.push(
            RawDiagnostic::new(
                WarningCode::SignalAsArgument,
                format!(
                    "signal \"{}\" is passed as a function argument; the callee receives its current value",
                    binding.name
                ),
                fact.span,
            )
            .with_hint("pass a thunk (() => value) if the callee should track changes"),
        );
    }
}

/// `FICT-M`: direct mutation of a nested property on a reactive object.
fn emit_deep_mutation_warnings(
    bindings: &[BindingRecord],
    mutations: &[crate::binder::MemberMutationFact],
    diagnostics: &mut Vec<RawDiagnostic>,
) {
    for fact in mutations {
        let base = &bindings[fact.base.index()];
        let reactive_base = base.is_state_macro
            || base
                .alias_of
                .is_some_and(|t| bindings[t.index()].is_state_macro);
        if !reactive_base || base.is_store {
            continue;
        }
        diagnostics.push(
            RawDiagnostic::new(
                WarningCode::DeepMutation,
                format!(
                    "direct mutation of a property on reactive object \"{}\" does not notify readers",
                    base.name
                ),
                fact.span,
            )
            .with_hint("write an updated object through the setter, or use $store for deep reactivity"),
        );
    }
}

/// `FICT-E001`: `$effect` body with no reactive reads.
fn emit_effect_warnings(
    bindings: &[BindingRecord],
    reactive: &FxHashSet<BindingId>,
    effects: &[EffectFact],
    diagnostics: &mut Vec<RawDiagnostic>,
) {
    for effect in effects {
        let has_reactive_read = effect.reads.iter().any(|id| {
            reactive.contains(id) || bindings[id.index()].kind == ReactiveKind::PropAccessor
        });
        if has_reactive_read {
            continue;
        }
        diagnostics.push(
            RawDiagnostic::new(
                WarningCode::EffectWithoutDeps,
                "$effect body has no reactive reads and will only run once per mount",
                effect.span,
            )
            .with_hint("read the signals the effect should react to inside its body"),
        );
    }
}

/// `FICT-C004`: component without a `return`.
fn emit_component_warnings(functions: &[HirFunction], diagnostics: &mut Vec<RawDiagnostic>) {
    for function in functions {
        if function.kind == FunctionKind::Component && !function.has_return {
            let name = function.name.as_deref().unwrap_or("<anonymous>");
            diagnostics.push(
                RawDiagnostic::new(
                    WarningCode::ComponentWithoutReturn,
                    format!("component \"{name}\" has no return statement"),
                    function.span,
                )
                .with_hint("return JSX (or null) from the component body"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fict_armature::parse_module;

    fn analyze_src(src: &str) -> AnalysisSummary {
        let module = parse_module(src).unwrap();
        analyze(&module, &CompilerOptions::default())
    }

    fn binding_by_name<'a>(summary: &'a AnalysisSummary, name: &str) -> &'a BindingRecord {
        summary
            .bindings
            .iter()
            .find(|b| b.name == name)
            .unwrap_or_else(|| panic!("no binding named {name}"))
    }

    #[test]
    fn test_signal_and_derived() {
        let summary = analyze_src(
            "import { $state } from 'fict';\nlet count = $state(0);\nconst doubled = count * 2;",
        );
        let count = binding_by_name(&summary, "count");
        assert!(count.is_state_macro);
        let doubled = binding_by_name(&summary, "doubled");
        assert_eq!(doubled.deps, vec![count.id]);
        assert!(summary.reactive.contains(&doubled.id));
    }

    #[test]
    fn test_forward_reference_deps() {
        let summary = analyze_src(
            "import { $state } from 'fict';\nlet s = $state(0);\nconst a = b + s;\nconst b = s + 1;",
        );
        let a = binding_by_name(&summary, "a");
        let b = binding_by_name(&summary, "b");
        assert!(a.deps.contains(&b.id));
        assert!(summary.graph.find_cycle().is_none());
    }

    #[test]
    fn test_cycle_detected() {
        let summary = analyze_src(
            "import { $state } from 'fict';\nlet s = $state(0);\nconst a = b + s;\nconst b = a + 1;",
        );
        let cycle = summary.graph.find_cycle().expect("expected a cycle");
        let display = cycle.display(&summary.bindings);
        assert!(display == "a -> b -> a" || display == "b -> a -> b", "{display}");
    }

    #[test]
    fn test_effect_without_reads_warns() {
        let summary = analyze_src(
            "import { $state, $effect } from 'fict';\nlet n = $state(0);\n$effect(() => { console.log('hi'); });",
        );
        assert!(summary
            .diagnostics
            .iter()
            .any(|d| d.code == WarningCode::EffectWithoutDeps));
    }

    #[test]
    fn test_effect_with_reads_does_not_warn() {
        let summary = analyze_src(
            "import { $state, $effect } from 'fict';\nlet n = $state(0);\n$effect(() => { console.log(n); });",
        );
        assert!(!summary
            .diagnostics
            .iter()
            .any(|d| d.code == WarningCode::EffectWithoutDeps));
    }

    #[test]
    fn test_component_without_return_warns() {
        let summary = analyze_src("function App() { const x = 1; }");
        assert!(summary
            .diagnostics
            .iter()
            .any(|d| d.code == WarningCode::ComponentWithoutReturn));
    }

    #[test]
    fn test_unkeyed_map_warns() {
        let summary = analyze_src(
            "function App() { return <ul>{items.map(item => <li>{item}</li>)}</ul>; }",
        );
        assert!(summary
            .diagnostics
            .iter()
            .any(|d| d.code == WarningCode::ListWithoutKey));
    }

    #[test]
    fn test_prop_accessors() {
        let summary = analyze_src("function Card({ title, count = 0 }) { return <div>{title}</div>; }");
        let title = binding_by_name(&summary, "title");
        assert_eq!(title.kind, ReactiveKind::PropAccessor);
        let count = binding_by_name(&summary, "count");
        assert_eq!(count.kind, ReactiveKind::PropAccessor);
        assert!(count.prop_path.as_ref().unwrap().defaults[0].is_some());
    }
}
