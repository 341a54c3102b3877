//! Classification: assign each binding its reactive kind.
//!
//! The decision table, applied in order; the first matching rule wins:
//!
//! 1. `$state` initializer with a bare-identifier LHS -> Signal
//! 2. bare reference to a Signal -> Captured Value (inside a reactive
//!    scope, not exported), else Plain
//! 3. destructuring `$state(…)` -> rejected by the validator
//! 4. destructuring a Signal binding -> Memo per field
//! 5. pure derived const -> Memo / Region Memo Field / Inlined Derived
//! 6. branch-assigned `let` read from JSX -> Region Memo Field
//! 7. destructured component props -> Prop Accessor (assigned by the binder)
//! 8. anything else -> Plain

use fict_relief::options::CompilerOptions;

use crate::hir::*;

pub fn classify(
    bindings: &mut [BindingRecord],
    functions: &[HirFunction],
    options: &CompilerOptions,
) {
    for index in 0..bindings.len() {
        let kind = decide(index, bindings, functions, options);
        bindings[index].kind = kind;
    }
}

fn decide(
    index: usize,
    bindings: &[BindingRecord],
    functions: &[HirFunction],
    options: &CompilerOptions,
) -> ReactiveKind {
    let binding = &bindings[index];

    // prop accessors are decided structurally by the binder
    if binding.kind == ReactiveKind::PropAccessor {
        return ReactiveKind::PropAccessor;
    }

    // rule 1: $state with bare identifier LHS
    if binding.is_state_macro {
        return ReactiveKind::Signal;
    }

    // rule 2: alias of a signal
    if let Some(target) = binding.alias_of {
        if bindings[target.index()].is_state_macro {
            let in_reactive_scope = functions[binding.function.index()].is_reactive_scope();
            if in_reactive_scope && !binding.profile.contains(UseProfile::EXPORTED) {
                return ReactiveKind::CapturedValue;
            }
            return ReactiveKind::Plain;
        }
    }

    // rule 4: fields destructured from a signal
    if let Some(source) = binding.destructured_from {
        if bindings[source.index()].is_state_macro {
            return ReactiveKind::Memo;
        }
    }

    // explicit $memo wrappers always memoize
    if binding.is_explicit_memo {
        return ReactiveKind::Memo;
    }

    // rule 6: branch-folded lets carry their region kind
    if binding.region.is_some() && binding.mutable {
        return ReactiveKind::RegionMemoField;
    }

    // rule 5: pure derived const mentioning a reactive source
    if !binding.mutable && binding.init.is_some() && binding.init_pure && !binding.deps.is_empty()
    {
        let exported = binding.profile.contains(UseProfile::EXPORTED);
        let at_module_level = binding.function == FunctionId::MODULE;

        if exported || at_module_level {
            return ReactiveKind::Memo;
        }
        // region membership wins: the whole group lowers through one memo
        if binding.region.is_some() {
            return ReactiveKind::RegionMemoField;
        }
        if binding.profile.forces_memo() {
            return ReactiveKind::Memo;
        }
        if options.inline_derived_memos && binding.read_count == 1 && !exported {
            return ReactiveKind::InlinedDerived;
        }
        // handler-only and other reads still memoize
        return ReactiveKind::Memo;
    }

    ReactiveKind::Plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;
    use fict_carton::Span;
    use fict_relief::ast::Expr;

    fn record(id: u32) -> BindingRecord {
        BindingRecord {
            id: BindingId::new(id),
            name: CompactString::new(format!("b{id}")),
            span: Span::new(id * 10, id * 10 + 2),
            function: FunctionId::MODULE,
            block: BlockId::new(0),
            decl_form: DeclForm::Single,
            mutable: false,
            kind: ReactiveKind::Plain,
            profile: UseProfile::READ,
            read_count: 1,
            is_state_macro: false,
            is_explicit_memo: false,
            is_store: false,
            alias_of: None,
            destructured_from: None,
            destructure_key: None,
            prop_path: None,
            deps: Vec::new(),
            init_pure: true,
            init: None,
            region: None,
        }
    }

    fn module_fn() -> Vec<HirFunction> {
        vec![HirFunction {
            id: FunctionId::MODULE,
            parent: None,
            name: None,
            kind: FunctionKind::Module,
            is_async: false,
            span: Span::STUB,
            entry_block: BlockId::new(0),
            bindings: vec![],
            has_return: false,
            has_jsx_return: false,
        }]
    }

    #[test]
    fn test_signal_classification() {
        let mut bindings = vec![record(0)];
        bindings[0].is_state_macro = true;
        classify(&mut bindings, &module_fn(), &CompilerOptions::default());
        assert_eq!(bindings[0].kind, ReactiveKind::Signal);
    }

    #[test]
    fn test_module_level_derived_is_memo() {
        let mut bindings = vec![record(0), record(1)];
        bindings[0].is_state_macro = true;
        bindings[1].deps = vec![BindingId::new(0)];
        bindings[1].init = Some(Expr::Null(Span::STUB));
        classify(&mut bindings, &module_fn(), &CompilerOptions::default());
        assert_eq!(bindings[1].kind, ReactiveKind::Memo);
    }

    #[test]
    fn test_alias_captures() {
        let mut bindings = vec![record(0), record(1), record(2)];
        bindings[0].is_state_macro = true;
        bindings[1].alias_of = Some(BindingId::new(0));
        bindings[2].alias_of = Some(BindingId::new(0));
        bindings[2].profile |= UseProfile::EXPORTED;
        classify(&mut bindings, &module_fn(), &CompilerOptions::default());
        assert_eq!(bindings[1].kind, ReactiveKind::CapturedValue);
        assert_eq!(bindings[2].kind, ReactiveKind::Plain);
    }

    #[test]
    fn test_single_use_inlining_gated_by_option() {
        let mut functions = module_fn();
        functions.push(HirFunction {
            id: FunctionId::new(1),
            parent: Some(FunctionId::MODULE),
            name: Some("App".into()),
            kind: FunctionKind::Component,
            is_async: false,
            span: Span::new(0, 1),
            entry_block: BlockId::new(0),
            bindings: vec![],
            has_return: true,
            has_jsx_return: true,
        });

        let mut bindings = vec![record(0), record(1)];
        bindings[0].is_state_macro = true;
        bindings[1].function = FunctionId::new(1);
        bindings[1].deps = vec![BindingId::new(0)];
        bindings[1].init = Some(Expr::Null(Span::STUB));
        bindings[1].profile = UseProfile::READ | UseProfile::EVENT_HANDLER;

        classify(&mut bindings, &functions, &CompilerOptions::default());
        assert_eq!(bindings[1].kind, ReactiveKind::Memo);

        let options = CompilerOptions {
            inline_derived_memos: true,
            ..Default::default()
        };
        classify(&mut bindings, &functions, &options);
        assert_eq!(bindings[1].kind, ReactiveKind::InlinedDerived);
    }

    #[test]
    fn test_destructured_signal_fields_are_memos() {
        let mut bindings = vec![record(0), record(1)];
        bindings[0].is_state_macro = true;
        bindings[1].destructured_from = Some(BindingId::new(0));
        bindings[1].destructure_key = Some("x".into());
        classify(&mut bindings, &module_fn(), &CompilerOptions::default());
        assert_eq!(bindings[1].kind, ReactiveKind::Memo);
    }
}
