//! Warning codes, severity policy, and promotion to errors.

use fict::{transform, CompilerOptions, WarningsAsErrors};

fn warnings_of(src: &str) -> Vec<(String, u32, u32)> {
    let output = transform(src, &CompilerOptions::default()).unwrap();
    output
        .warnings
        .iter()
        .map(|w| (w.code.to_string(), w.line, w.column))
        .collect()
}

fn has_code(src: &str, code: &str) -> bool {
    warnings_of(src).iter().any(|(c, _, _)| c == code)
}

// =============================================================================
// Individual codes
// =============================================================================

#[test]
fn unkeyed_list_warns_j002() {
    let src = "function App() {\n  const items = [1, 2];\n  return <ul>{items.map(item => <li>{item}</li>)}</ul>;\n}";
    let warnings = warnings_of(src);
    let j002 = warnings
        .iter()
        .find(|(code, _, _)| code == "FICT-J002")
        .expect("expected FICT-J002");
    assert!(j002.1 > 0 && j002.2 > 0, "warning must carry line/column");
}

#[test]
fn keyed_list_does_not_warn() {
    let src = "function App() {\n  const items = [1, 2];\n  return <ul>{items.map(item => <li key={item}>{item}</li>)}</ul>;\n}";
    assert!(!has_code(src, "FICT-J002"));
}

#[test]
fn empty_effect_warns_e001() {
    let src = "import { $state, $effect } from 'fict';\nlet n = $state(0);\n$effect(() => { console.log(\"tick\"); });";
    assert!(has_code(src, "FICT-E001"));
}

#[test]
fn effect_reading_signals_does_not_warn() {
    let src = "import { $state, $effect } from 'fict';\nlet n = $state(0);\n$effect(() => { console.log(n); });";
    assert!(!has_code(src, "FICT-E001"));
}

#[test]
fn nested_component_warns_c003() {
    let src = "function Outer() {\n  function Inner() {\n    return <p/>;\n  }\n  return <div><Inner/></div>;\n}";
    assert!(has_code(src, "FICT-C003"));
}

#[test]
fn component_without_return_warns_c004() {
    let src = "function App() {\n  const x = 1;\n}";
    assert!(has_code(src, "FICT-C004"));
}

#[test]
fn memo_side_effect_warns_m003() {
    let src = "import { $state, $memo } from 'fict';\nlet n = $state(0);\nconst log = [];\nconst bad = $memo(() => log.push(n));";
    assert!(has_code(src, "FICT-M003"));
}

#[test]
fn signal_as_argument_warns_s002() {
    let src = "import { $state } from 'fict';\nlet n = $state(0);\ntrackSomething(n);";
    assert!(has_code(src, "FICT-S002"));
}

#[test]
fn safe_callees_do_not_warn_s002() {
    let src = "import { $state } from 'fict';\nlet n = $state(0);\nconsole.log(n);\nJSON.stringify(n);";
    assert!(!has_code(src, "FICT-S002"));
}

#[test]
fn deep_mutation_warns_fict_m() {
    let src = "import { $state } from 'fict';\nlet user = $state({ name: \"a\" });\nuser.name = \"b\";";
    assert!(has_code(src, "FICT-M"));
}

#[test]
fn dynamic_access_warns_fict_h() {
    let src = "const table = { a: 1, b: 2 };\nfunction pick(k) {\n  return table[k];\n}";
    assert!(has_code(src, "FICT-H"));
}

#[test]
fn narrowed_dynamic_access_does_not_warn() {
    let src = "const table = { a: 1, b: 2 };\nfunction pick(k) {\n  if (k === \"a\") {\n    return table[k];\n  }\n  return 0;\n}";
    assert!(!has_code(src, "FICT-H"));
}

// =============================================================================
// Policy
// =============================================================================

#[test]
fn warning_levels_can_silence_a_code() {
    let mut options = CompilerOptions::default();
    options
        .warning_levels
        .insert("FICT-J002".into(), fict::relief::WarnLevel::Off);
    let output = transform(
        "function App() {\n  const items = [1];\n  return <ul>{items.map(i => <li>{i}</li>)}</ul>;\n}",
        &options,
    )
    .unwrap();
    assert!(output.warnings.iter().all(|w| w.code != "FICT-J002"));
}

#[test]
fn warnings_as_errors_promotes_all() {
    let options = CompilerOptions {
        warnings_as_errors: WarningsAsErrors::Enabled(true),
        ..Default::default()
    };
    let err = transform(
        "function App() {\n  const items = [1];\n  return <ul>{items.map(i => <li>{i}</li>)}</ul>;\n}",
        &options,
    )
    .expect_err("promotion must fail the compile");
    assert!(
        err.to_string().starts_with("Fict warning treated as error"),
        "{err}"
    );
}

#[test]
fn warnings_as_errors_list_promotes_only_listed_codes() {
    let options = CompilerOptions {
        warnings_as_errors: WarningsAsErrors::Codes(vec!["FICT-E001".into()]),
        ..Default::default()
    };
    // J002 fires but is not promoted
    let output = transform(
        "function App() {\n  const items = [1];\n  return <ul>{items.map(i => <li>{i}</li>)}</ul>;\n}",
        &options,
    )
    .unwrap();
    assert!(output.warnings.iter().any(|w| w.code == "FICT-J002"));

    // E001 fires and is promoted
    let err = transform(
        "import { $state, $effect } from 'fict';\nlet n = $state(0);\n$effect(() => console.log(\"x\"));",
        &options,
    )
    .expect_err("listed code must promote");
    assert!(err.to_string().contains("FICT-E001"), "{err}");
}

#[test]
fn dev_false_disables_suggestion_warnings() {
    let options = CompilerOptions {
        dev: false,
        ..Default::default()
    };
    let output = transform(
        "import { $state } from 'fict';\nlet user = $state({ name: \"a\" });\nuser.name = \"b\";",
        &options,
    )
    .unwrap();
    assert!(output.warnings.iter().all(|w| w.code != "FICT-M"));
}

#[test]
fn warnings_arrive_in_source_order_via_sink() {
    let mut seen = Vec::new();
    let src = "import { $state, $effect } from 'fict';\nlet n = $state(0);\n$effect(() => console.log(\"a\"));\nfunction App() {}\n";
    fict::transform_with(src, &CompilerOptions::default(), |w| {
        seen.push(w.line);
    })
    .unwrap();
    let mut sorted = seen.clone();
    sorted.sort_unstable();
    assert_eq!(seen, sorted);
}

#[test]
fn options_deserialize_from_camel_case_json() {
    let options: CompilerOptions = serde_json::from_str(
        r#"{ "fineGrainedDom": false, "warningsAsErrors": ["FICT-J002"], "warningLevels": { "FICT-E001": "off" } }"#,
    )
    .unwrap();
    let err = transform(
        "function App() {\n  const items = [1];\n  return <ul>{items.map(i => <li>{i}</li>)}</ul>;\n}",
        &options,
    )
    .expect_err("configured promotion applies");
    assert!(err.to_string().contains("FICT-J002"), "{err}");
}
