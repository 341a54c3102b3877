//! Pipeline-level properties: hook-slot determinism, context bracketing,
//! regions, getter caching, the optimizer, and VDOM mode.

use fict::{transform, CompilerOptions, OptimizeLevel};

fn compile(src: &str) -> String {
    transform(src, &CompilerOptions::default())
        .unwrap_or_else(|e| panic!("transform failed: {e}"))
        .code
}

fn compile_with(src: &str, options: &CompilerOptions) -> String {
    transform(src, options)
        .unwrap_or_else(|e| panic!("transform failed: {e}"))
        .code
}

// =============================================================================
// Hook slots
// =============================================================================

mod hook_slots {
    use super::*;

    const SOURCE: &str = "import { $state, $effect } from 'fict';\nfunction App() {\n  let a = $state(1);\n  let b = $state(2);\n  const sum = a + b;\n  $effect(() => { console.log(sum); });\n  return <div>{sum}</div>;\n}";

    #[test]
    fn slots_are_assigned_in_declaration_order() {
        let code = compile(SOURCE);
        assert!(code.contains("__fictUseSignal(__fictCtx, 1, 0)"), "{code}");
        assert!(code.contains("__fictUseSignal(__fictCtx, 2, 1)"), "{code}");
        assert!(
            code.contains("__fictUseMemo(__fictCtx, () => a() + b(), 2)"),
            "{code}"
        );
        assert!(code.contains(", 3)"), "{code}");
    }

    #[test]
    fn compilation_is_deterministic() {
        let first = compile(SOURCE);
        let second = compile(SOURCE);
        assert_eq!(first, second);
    }

    #[test]
    fn scopes_count_independently() {
        let code = compile(
            "import { $state } from 'fict';\nfunction A() {\n  let x = $state(1);\n  return <p>{x}</p>;\n}\nfunction B() {\n  let y = $state(2);\n  return <p>{y}</p>;\n}",
        );
        assert!(code.contains("__fictUseSignal(__fictCtx, 1, 0)"), "{code}");
        assert!(code.contains("__fictUseSignal(__fictCtx, 2, 0)"), "{code}");
    }
}

// =============================================================================
// Context bracketing
// =============================================================================

mod context_bracket {
    use super::*;

    #[test]
    fn every_component_gets_one_push_and_one_finally_pop() {
        let code = compile(
            "import { $state } from 'fict';\nfunction App() {\n  let n = $state(0);\n  if (n > 5) return <p>big</p>;\n  maybeThrow();\n  return <p>small</p>;\n}",
        );
        assert_eq!(code.matches("__fictPushContext()").count(), 1, "{code}");
        assert_eq!(code.matches("__fictPopContext()").count(), 1, "{code}");
        assert!(code.contains("} finally {"), "{code}");
    }

    #[test]
    fn module_scope_uses_use_context() {
        let code = compile("import { $state } from 'fict';\nlet n = $state(0);");
        assert!(code.contains("const __fictCtx = __fictUseContext();"), "{code}");
        assert!(!code.contains("__fictPushContext"), "{code}");
    }

    #[test]
    fn configured_reactive_scopes_accept_macros() {
        let options = CompilerOptions {
            reactive_scopes: vec!["renderHook".into()],
            ..Default::default()
        };
        let code = compile_with(
            "import { $state } from 'fict';\nrenderHook(() => {\n  let n = $state(5);\n  n++;\n});",
            &options,
        );
        assert!(code.contains("__fictUseSignal(__fictCtx, 5, 0)"), "{code}");
        assert!(code.contains("n(n() + 1)"), "{code}");
    }

    #[test]
    fn aliased_reactive_scope_calls_are_not_scopes() {
        let options = CompilerOptions {
            reactive_scopes: vec!["renderHook".into()],
            ..Default::default()
        };
        let err = transform(
            "import { $state } from 'fict';\nconst rh = renderHook;\nrh(() => {\n  let n = $state(5);\n});",
            &options,
        )
        .expect_err("aliased invocation must not form a reactive scope");
        assert!(
            err.to_string().contains("nested functions"),
            "{err}"
        );
    }
}

// =============================================================================
// Regions
// =============================================================================

mod regions {
    use super::*;

    const GROUPED: &str = "import { $state } from 'fict';\nfunction App() {\n  let n = $state(1);\n  const a = n * 2;\n  const b = n + 3;\n  return <p>{a}{b}</p>;\n}";

    #[test]
    fn overlapping_derived_values_share_one_region_memo() {
        let code = compile(GROUPED);
        assert!(
            code.contains("const __region_0 = __fictUseMemo(__fictCtx, () => {"),
            "{code}"
        );
        assert!(code.contains("const a = n() * 2;"), "{code}");
        assert!(code.contains("const b = n() + 3;"), "{code}");
        assert!(code.contains("return { a, b };"), "{code}");
        assert!(code.contains("const { a, b } = __region_0();"), "{code}");
        // one memo, not two
        assert_eq!(code.matches("__fictUseMemo").count(), 2, "{code}"); // import + call
    }

    #[test]
    fn region_fields_may_read_earlier_fields() {
        let code = compile(
            "import { $state } from 'fict';\nfunction App() {\n  let n = $state(1);\n  const visible = n + 1;\n  const fancy = n * visible;\n  return <p>{visible}{fancy}</p>;\n}",
        );
        assert!(code.contains("const visible = n() + 1;"), "{code}");
        assert!(code.contains("const fancy = n() * visible;"), "{code}");
        assert!(code.contains("return { visible, fancy };"), "{code}");
    }

    #[test]
    fn lazy_regions_read_through_the_accessor() {
        let options = CompilerOptions {
            lazy_conditional: true,
            ..Default::default()
        };
        let code = compile_with(GROUPED, &options);
        assert!(code.contains("get a() {"), "{code}");
        assert!(code.contains("__region_0().a"), "{code}");
        assert!(!code.contains("const { a, b } ="), "{code}");
    }

    #[test]
    fn branch_assigned_let_folds_into_a_region() {
        let code = compile(
            "import { $state } from 'fict';\nfunction App() {\n  let n = $state(0);\n  let label;\n  if (n > 2) {\n    label = \"big\";\n  } else {\n    label = \"small\";\n  }\n  return <p>{label}</p>;\n}",
        );
        assert!(code.contains("__region_0"), "{code}");
        assert!(code.contains("let label;"), "{code}");
        assert!(code.contains("return { label };"), "{code}");
        assert_eq!(code.matches("\"big\"").count(), 1, "{code}");
    }
}

// =============================================================================
// Getter cache
// =============================================================================

mod getter_cache {
    use super::*;

    #[test]
    fn repeated_memo_reads_cache_within_the_body() {
        let options = CompilerOptions {
            getter_cache: true,
            ..Default::default()
        };
        let code = compile_with(
            "import { $state } from 'fict';\nfunction App() {\n  let n = $state(0);\n  const d = n * 2;\n  console.log(d);\n  console.log(d);\n  return <p>{d}</p>;\n}",
            &options,
        );
        assert!(code.contains("const __c_d = d();"), "{code}");
        assert!(code.contains("console.log(__c_d)"), "{code}");
        // the JSX thunk is a separate function body: never cached
        assert!(code.contains("() => d()"), "{code}");
    }

    #[test]
    fn cache_is_off_by_default() {
        let code = compile(
            "import { $state } from 'fict';\nfunction App() {\n  let n = $state(0);\n  const d = n * 2;\n  console.log(d);\n  console.log(d);\n  return <p>{d}</p>;\n}",
        );
        assert!(!code.contains("__c_d"), "{code}");
    }
}

// =============================================================================
// Optimizer
// =============================================================================

mod optimizer {
    use super::*;

    fn optimized() -> CompilerOptions {
        CompilerOptions {
            optimize: true,
            ..Default::default()
        }
    }

    #[test]
    fn constant_folding_applies() {
        let code = compile_with("const x = 1 + 2 * 3;", &optimized());
        assert!(code.contains("const x = 7;"), "{code}");
    }

    #[test]
    fn algebraic_identities_require_full_level() {
        let src = "const x = (a * b) + 0;";
        let safe = compile_with(src, &optimized());
        assert!(safe.contains("+ 0"), "{safe}");

        let full = compile_with(
            src,
            &CompilerOptions {
                optimize: true,
                optimize_level: OptimizeLevel::Full,
                ..Default::default()
            },
        );
        assert!(!full.contains("+ 0"), "{full}");
    }

    #[test]
    fn dead_memos_are_eliminated() {
        let src = "import { $state } from 'fict';\nfunction App() {\n  let n = $state(0);\n  const unused = n * 2;\n  return <p>{n}</p>;\n}";
        let plain = compile(src);
        assert!(plain.contains("unused"), "{plain}");
        let lean = compile_with(src, &optimized());
        assert!(!lean.contains("unused"), "{lean}");
    }

    #[test]
    fn explicit_memos_survive_dce() {
        let src = "import { $state, $memo } from 'fict';\nfunction App() {\n  let n = $state(0);\n  const kept = $memo(() => n * 2);\n  return <p>{n}</p>;\n}";
        let lean = compile_with(src, &optimized());
        assert!(lean.contains("kept"), "{lean}");
    }

    #[test]
    fn cse_hoists_repeated_pure_expressions() {
        let code = compile_with(
            "function calc(a, b) {\n  const x = a * b + 1;\n  const y = a * b + 1;\n  return x + y;\n}",
            &optimized(),
        );
        assert!(code.contains("const __cse_0 = a * b"), "{code}");
        assert!(code.matches("__cse_0").count() >= 3, "{code}");
    }

    #[test]
    fn cse_leaves_reactive_reads_alone() {
        let code = compile_with(
            "import { $state } from 'fict';\nfunction App() {\n  let n = $state(1);\n  console.log(n * 2);\n  console.log(n * 2);\n  return <p>{n}</p>;\n}",
            &optimized(),
        );
        assert!(!code.contains("__cse_"), "{code}");
        assert_eq!(code.matches("n() * 2").count(), 2, "{code}");
    }

    #[test]
    fn effect_counts_match_between_levels() {
        let src = "import { $state, $effect } from 'fict';\nlet n = $state(0);\n$effect(() => console.log(n));\n$effect(() => console.log(n + 1));";
        let plain = compile(src);
        let lean = compile_with(src, &optimized());
        assert_eq!(
            plain.matches("__fictUseEffect(").count(),
            lean.matches("__fictUseEffect(").count()
        );
    }
}

// =============================================================================
// JSX lowering details
// =============================================================================

mod jsx_lowering {
    use super::*;

    #[test]
    fn static_subtrees_become_hoisted_templates() {
        let code = compile(
            "function Banner() { return <div class=\"box\"><span>hello</span></div>; }",
        );
        assert!(
            code.contains("const _tmpl$1 = template(`<div class=\"box\"><span>hello</span></div>`);"),
            "{code}"
        );
        assert!(code.contains("return _tmpl$1();"), "{code}");
    }

    #[test]
    fn dynamic_text_children_bind_through_markers() {
        let code = compile(
            "import { $state } from 'fict';\nfunction App() {\n  let n = $state(0);\n  return <div>{n}</div>;\n}",
        );
        assert!(code.contains("template(`<div><!----></div>`)"), "{code}");
        assert!(code.contains("bindText("), "{code}");
        assert!(code.contains("() => n()"), "{code}");
    }

    #[test]
    fn form_value_uses_property_binding() {
        let code = compile(
            "import { $state } from 'fict';\nfunction App() {\n  let text = $state(\"\");\n  return <input value={text}/>;\n}",
        );
        assert!(code.contains("bindProperty("), "{code}");
        assert!(code.contains("\"value\", () => text()"), "{code}");
    }

    #[test]
    fn events_bind_or_delegate() {
        let code = compile(
            "function App() {\n  const data = { id: 1 };\n  const handle = (d) => console.log(d);\n  return <button onClick={() => handle(data.id)}>x</button>;\n}",
        );
        assert!(code.contains(".$$click = handle;"), "{code}");
        assert!(code.contains(".$$clickData = () => data.id;"), "{code}");

        let code = compile(
            "import { $state } from 'fict';\nfunction App() {\n  let count = $state(0);\n  return <button onClick={() => count++}>+</button>;\n}",
        );
        assert!(
            code.contains("bindEvent(__root, \"click\", () => count(count() + 1))"),
            "{code}"
        );
    }

    #[test]
    fn component_spread_props_merge() {
        let code = compile(
            "function App(rest) {\n  return <Widget {...rest} label=\"hi\"/>;\n}",
        );
        assert!(code.contains("Widget(mergeProps(rest, { label: \"hi\" }))"), "{code}");
    }

    #[test]
    fn reactive_component_key_wraps_in_keyed() {
        let code = compile(
            "import { $state } from 'fict';\nfunction App() {\n  let n = $state(0);\n  return <Item key={n} a={1}/>;\n}",
        );
        assert!(code.contains("keyed({ a: 1 }, () => n())"), "{code}");
    }

    #[test]
    fn vdom_mode_emits_jsx_calls_with_getter_props() {
        let options = CompilerOptions {
            fine_grained_dom: false,
            ..Default::default()
        };
        let code = compile_with(
            "import { $state } from 'fict';\nfunction App() {\n  let n = $state(0);\n  return <div id={n}>hi</div>;\n}",
            &options,
        );
        assert!(
            code.contains("jsx(\"div\", { get id() { return n(); }, children: \"hi\" })"),
            "{code}"
        );
        assert!(!code.contains("template("), "{code}");
    }
}
