//! Runtime ABI pin.
//!
//! The emitted code may reference only the names the runtime exports, with
//! fixed arities. A missing name is a fatal ABI error, so the compiler side
//! of the contract is pinned here: every helper a kitchen-sink compile
//! imports must be on the list.

use fict::{transform, CompilerOptions};

/// Context & hook helpers the runtime must export.
const CONTEXT_ABI: &[&str] = &[
    "__fictUseContext",
    "__fictPushContext",
    "__fictPopContext",
    "__fictUseSignal",
    "__fictUseMemo",
    "__fictUseEffect",
    "__fictRender",
    "__fictResetContext",
];

/// Fine-grained DOM helpers.
const DOM_ABI: &[&str] = &[
    "template",
    "insert",
    "bindText",
    "bindAttribute",
    "bindProperty",
    "bindClass",
    "bindStyle",
    "bindRef",
    "bindEvent",
    "createConditional",
    "createKeyedList",
    "createSelector",
    "toNodeArray",
];

/// Props helpers.
const PROPS_ABI: &[&str] = &["useProp", "prop", "mergeProps", "keyed"];

fn abi_contains(name: &str) -> bool {
    CONTEXT_ABI.contains(&name) || DOM_ABI.contains(&name) || PROPS_ABI.contains(&name)
}

const KITCHEN_SINK: &str = r#"
import { $state, $effect, $memo } from 'fict';

let count = $state(0);
export const doubled = count * 2;
const tracked = $memo(() => count * 3);

$effect(() => {
  console.log(count, tracked);
});

function Row({ label, value = 0 }) {
  return <li class={value > 1 ? "hot" : "cold"}>{label}: {value}</li>;
}

export default function App({ items, selected }) {
  let open = $state(false);
  const visible = count + 1;
  const fancy = count * visible;
  if (open) {
    return <section style={{ color: "red" }}>
      <input value={visible} onInput={e => (count = e.target.value)} ref={el => el.focus()}/>
      <ul>{[1, 2].map(row => <Row key={row} label={"r"} value={row} {...{ extra: row }}/>)}</ul>
    </section>;
  }
  return <div onClick={() => toggle(count)}><B/>{fancy}</div>;
}
"#;

#[test]
fn emitted_helpers_are_a_subset_of_the_abi() {
    let output = transform(KITCHEN_SINK, &CompilerOptions::default()).unwrap();
    let import_line = output
        .code
        .lines()
        .find(|line| line.contains("from \"fict/runtime\""))
        .expect("runtime import expected");

    let inner = import_line
        .trim_start_matches("import {")
        .split('}')
        .next()
        .unwrap();
    for name in inner.split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        assert!(abi_contains(name), "`{name}` is not part of the runtime ABI");
    }
}

#[test]
fn vdom_helpers_come_from_the_jsx_runtime() {
    let options = CompilerOptions {
        fine_grained_dom: false,
        ..Default::default()
    };
    let output = transform(
        "function App() { return <div a={1}><span>x</span><b>y</b></div>; }",
        &options,
    )
    .unwrap();
    assert!(output.code.contains("from \"fict/jsx-runtime\""), "{}", output.code);
    assert!(output.code.contains("jsx("), "{}", output.code);
    assert!(output.code.contains("jsxs("), "{}", output.code);
}

#[test]
fn abi_name_list_matches_the_contract() {
    // arity-bearing names, spelled exactly as the runtime must export them
    assert_eq!(CONTEXT_ABI.len(), 8);
    assert_eq!(DOM_ABI.len(), 13);
    assert_eq!(PROPS_ABI.len(), 4);
    assert!(abi_contains("__fictUseSignal"));
    assert!(abi_contains("createKeyedList"));
    assert!(abi_contains("mergeProps"));
}
