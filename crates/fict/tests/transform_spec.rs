//! End-to-end transform contract tests.
//!
//! Each case asserts the required substrings of the emitted module, the
//! way the compiler contract documents them.

use fict::{transform, CompilerOptions};

fn compile(src: &str) -> String {
    transform(src, &CompilerOptions::default())
        .unwrap_or_else(|e| panic!("transform failed: {e}"))
        .code
}

fn compile_err(src: &str) -> String {
    transform(src, &CompilerOptions::default())
        .expect_err("expected a compile error")
        .to_string()
}

// =============================================================================
// Signals & derived values
// =============================================================================

mod signals {
    use super::*;

    #[test]
    fn signal_and_derived_at_module_level() {
        let code = compile(
            "import { $state } from 'fict';\nlet count = $state(0);\nexport const doubled = count * 2;",
        );
        assert!(code.contains("__fictUseSignal(__fictCtx, 0"), "{code}");
        assert!(
            code.contains("__fictUseMemo(__fictCtx, () => count() * 2"),
            "{code}"
        );
        assert!(code.contains("const __fictCtx = __fictUseContext();"), "{code}");
        assert!(!code.contains("$state"), "{code}");
    }

    #[test]
    fn macro_import_is_removed_and_runtime_import_added() {
        let code = compile("import { $state } from 'fict';\nlet n = $state(1);");
        assert!(!code.contains("from \"fict\";"), "{code}");
        assert!(code.contains("from \"fict/runtime\";"), "{code}");
    }

    #[test]
    fn store_import_is_preserved() {
        let code = compile(
            "import { $state, $store } from 'fict';\nconst data = $store({ a: 1 });\nlet n = $state(0);",
        );
        assert!(code.contains("import { $store } from \"fict\";"), "{code}");
        assert!(code.contains("$store({ a: 1 })"), "{code}");
    }

    #[test]
    fn module_level_derived_memoizes_even_for_handler_only_use() {
        let code = compile(
            "import { $state } from 'fict';\nlet n = $state(0);\nconst label = n + 1;\nfunction App() {\n  return <button onClick={() => console.log(label)}>go</button>;\n}",
        );
        assert!(code.contains("__fictUseMemo(__fictCtx, () => n() + 1"), "{code}");
        assert!(code.contains("label()"), "{code}");
    }
}

// =============================================================================
// Write rewrites
// =============================================================================

mod writes {
    use super::*;

    #[test]
    fn update_and_compound_assignments() {
        let code = compile(
            "import { $state } from 'fict';\nlet count = $state(0);\ncount++;\ncount += 3;\n--count;",
        );
        assert!(code.contains("count(count() + 1)"), "{code}");
        assert!(code.contains("count(count() + 3)"), "{code}");
        assert!(code.contains("count(count() - 1)"), "{code}");
    }

    #[test]
    fn plain_assignment_becomes_setter_call() {
        let code = compile("import { $state } from 'fict';\nlet count = $state(0);\ncount = 7;");
        assert!(code.contains("count(7)"), "{code}");
    }

    #[test]
    fn array_destructuring_assignment() {
        let code =
            compile("import { $state } from 'fict';\nlet count = $state(0);\n[count] = [5];");
        assert!(code.contains("count(__v$1[0])"), "{code}");
    }

    #[test]
    fn object_destructuring_assignment() {
        let code = compile(
            "import { $state } from 'fict';\nlet count = $state(0);\n({ count } = { count: 5 });",
        );
        assert!(code.contains("count(__v$1.count)"), "{code}");
    }

    #[test]
    fn object_destructuring_with_default_preserves_it() {
        let code = compile(
            "import { $state } from 'fict';\nlet count = $state(0);\nconst obj = { count: 2 };\n({ count = 9 } = obj);",
        );
        assert!(
            code.contains("count(obj.count === undefined ? 9 : obj.count)"),
            "{code}"
        );
    }
}

// =============================================================================
// Alias capture
// =============================================================================

mod aliases {
    use super::*;

    #[test]
    fn alias_captures_current_value() {
        let code = compile(
            "import { $state } from 'fict';\nfunction Counter() {\n  let count = $state(0);\n  const alias = count;\n  console.log(alias);\n  return <p>{count}</p>;\n}",
        );
        assert!(code.contains("const alias = count();"), "{code}");
        assert!(code.contains("console.log(alias)"), "{code}");
    }

    #[test]
    fn alias_reassignment_is_rejected() {
        let message = compile_err(
            "import { $state } from 'fict';\nfunction Counter() {\n  let count = $state(0);\n  const alias = count;\n  alias = 5;\n  return <p/>;\n}",
        );
        assert!(
            message.contains("Alias reassignment is not supported"),
            "{message}"
        );
    }
}

// =============================================================================
// Conditional rendering
// =============================================================================

mod conditional {
    use super::*;

    #[test]
    fn trailing_if_return_pair_becomes_create_conditional() {
        let code = compile(
            "import { $state } from 'fict';\nfunction V() {\n  let c = $state(0);\n  if (c % 2) return <A/>;\n  return <B/>;\n}",
        );
        assert!(code.contains("createConditional(() => c() % 2"), "{code}");
        assert!(code.contains("() => A({})"), "{code}");
        assert!(code.contains("() => B({})"), "{code}");
    }

    #[test]
    fn branch_block_side_effects_stay_inside_the_thunk() {
        let code = compile(
            "import { $state } from 'fict';\nfunction V() {\n  let c = $state(0);\n  if (c > 1) {\n    console.log(\"big\");\n    return <A/>;\n  }\n  return <B/>;\n}",
        );
        assert!(code.contains("createConditional"), "{code}");
        assert!(code.contains("console.log(\"big\")"), "{code}");
    }

    #[test]
    fn earlier_if_returns_are_left_as_plain_conditionals() {
        let code = compile(
            "import { $state } from 'fict';\nfunction V() {\n  let c = $state(0);\n  if (c > 10) return <Huge/>;\n  console.log(c);\n  if (c % 2) return <A/>;\n  return <B/>;\n}",
        );
        // only the last pair converts
        assert!(code.contains("if (c() > 10) return Huge({});"), "{code}");
        assert_eq!(code.matches("createConditional").count(), 1, "{code}");
    }
}

// =============================================================================
// Keyed lists & selectors
// =============================================================================

mod lists {
    use super::*;

    #[test]
    fn keyed_map_lowers_to_keyed_list() {
        let code = compile(
            "import { $state } from 'fict';\nfunction Rows() {\n  const items = [1, 2, 3];\n  return <ul>{items.map(item => <li key={item}>{item}</li>)}</ul>;\n}",
        );
        assert!(code.contains("createKeyedList(() => items"), "{code}");
        assert!(code.contains("(item, __index, __key) =>"), "{code}");
        assert!(code.contains("insert("), "{code}");
    }

    #[test]
    fn selector_is_hoisted_for_keyed_class_tests() {
        let code = compile(
            "import { $state } from 'fict';\nfunction Table() {\n  let selected = $state(1);\n  const rows = [{ id: 1 }, { id: 2 }];\n  return <tbody>{rows.map(row => <tr key={row.id} class={row.id === selected ? \"danger\" : \"\"}>{row.id}</tr>)}</tbody>;\n}",
        );
        assert!(
            code.contains("const __sel$0 = createSelector(() => selected());"),
            "{code}"
        );
        assert!(
            code.contains("__sel$0(__key) ? \"danger\" : \"\""),
            "{code}"
        );
    }

    #[test]
    fn selector_matches_reversed_operands() {
        let code = compile(
            "import { $state } from 'fict';\nfunction Table() {\n  let selected = $state(1);\n  const rows = [1, 2];\n  return <div>{rows.map(row => <p key={row} class={selected === row ? \"on\" : \"off\"}>{row}</p>)}</div>;\n}",
        );
        assert!(code.contains("createSelector(() => selected())"), "{code}");
    }
}

// =============================================================================
// Cycle rejection
// =============================================================================

mod cycles {
    use super::*;

    #[test]
    fn cyclic_derived_chain_is_fatal_with_path() {
        let message = compile_err(
            "import { $state } from 'fict';\nlet s = $state(0);\nconst a = b + s;\nconst b = a + 1;",
        );
        assert!(message.contains("cyclic derived dependency"), "{message}");
        assert!(message.contains("a -> b -> a"), "{message}");
    }
}

// =============================================================================
// Macro placement boundaries
// =============================================================================

mod placement {
    use super::*;

    #[test]
    fn state_in_loop_is_rejected() {
        let message = compile_err(
            "import { $state } from 'fict';\nfunction App() {\n  for (let i = 0; i < 3; i++) {\n    let x = $state(0);\n  }\n  return <p/>;\n}",
        );
        assert!(message.contains("cannot be declared inside loops"), "{message}");
    }

    #[test]
    fn state_in_conditional_is_rejected() {
        let message = compile_err(
            "import { $state } from 'fict';\nfunction App() {\n  if (true) {\n    let x = $state(0);\n  }\n  return <p/>;\n}",
        );
        assert!(
            message.contains("cannot be declared inside loops or conditionals"),
            "{message}"
        );
    }

    #[test]
    fn state_in_nested_function_is_rejected() {
        let message = compile_err(
            "import { $state } from 'fict';\nfunction App() {\n  function inner() {\n    let x = $state(0);\n  }\n  return <p/>;\n}",
        );
        assert!(
            message.contains("cannot be declared inside nested functions"),
            "{message}"
        );
    }

    #[test]
    fn destructuring_state_is_rejected() {
        let message =
            compile_err("import { $state } from 'fict';\nconst { a } = $state({ a: 1 });");
        assert!(
            message.contains("Destructuring $state is not supported"),
            "{message}"
        );
    }

    #[test]
    fn state_as_argument_is_rejected() {
        let message = compile_err("import { $state } from 'fict';\nconsole.log($state(0));");
        assert!(
            message.contains("assigned directly to a variable"),
            "{message}"
        );
    }

    #[test]
    fn state_without_import_is_rejected() {
        let message = compile_err("let x = $state(0);");
        assert!(message.contains("must be imported from \"fict\""), "{message}");
    }

    #[test]
    fn aliased_macro_import_is_rejected() {
        let message = compile_err("import { $state as s } from 'fict';\nlet x = s(0);");
        assert!(message.contains("macro imports cannot be aliased"), "{message}");
    }

    #[test]
    fn effect_in_conditional_is_rejected() {
        let message = compile_err(
            "import { $state, $effect } from 'fict';\nfunction App() {\n  let n = $state(0);\n  if (n > 1) {\n    $effect(() => console.log(n));\n  }\n  return <p/>;\n}",
        );
        assert!(
            message.contains("cannot be called inside loops or conditionals"),
            "{message}"
        );
    }

    #[test]
    fn writes_to_destructured_state_fields_are_rejected() {
        let message = compile_err(
            "import { $state } from 'fict';\nlet user = $state({ name: \"a\" });\nconst { name } = user;\nname = \"b\";",
        );
        assert!(message.contains("destructured state alias"), "{message}");
    }
}

// =============================================================================
// Destructured signals & props
// =============================================================================

mod destructuring {
    use super::*;

    #[test]
    fn signal_destructuring_yields_field_memos() {
        let code = compile(
            "import { $state } from 'fict';\nlet user = $state({ first: \"a\", last: \"b\" });\nconst { first, last } = user;\nexport { first, last };",
        );
        assert!(
            code.contains("__fictUseMemo(__fictCtx, () => user().first"),
            "{code}"
        );
        assert!(
            code.contains("__fictUseMemo(__fictCtx, () => user().last"),
            "{code}"
        );
    }

    #[test]
    fn component_props_become_accessors() {
        let code = compile(
            "function Card({ title, count = 0 }) {\n  return <h1>{title}</h1>;\n}",
        );
        assert!(code.contains("function Card(__props)"), "{code}");
        assert!(
            code.contains("const title = useProp(() => __props.title);"),
            "{code}"
        );
        assert!(
            code.contains("const count = useProp(() => (__props.count ?? 0));"),
            "{code}"
        );
        assert!(code.contains("title()"), "{code}");
    }

    #[test]
    fn nested_prop_defaults_are_preserved() {
        let code = compile(
            "function Profile({ profile: { name } = { name: \"Anon\" } }) {\n  return <p>{name}</p>;\n}",
        );
        assert!(
            code.contains("useProp(() => (__props.profile ?? { name: \"Anon\" }).name)"),
            "{code}"
        );
    }
}
