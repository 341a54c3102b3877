//! Known-safe callees and JS globals.
//!
//! Passing reactive state into these does not widen dependencies and does
//! not trigger the black-box warning.

use fict_carton::{phf_set, PhfSet};

/// Callee paths that are known not to capture or mutate their arguments.
pub static SAFE_CALLEES: PhfSet<&'static str> = phf_set! {
    "JSON.stringify",
    "JSON.parse",
    "Object.keys",
    "Object.values",
    "Object.entries",
    "Object.freeze",
    "Array.isArray",
    "Array.from",
    "String",
    "Number",
    "Boolean",
    "structuredClone",
    "isNaN",
    "isFinite",
    "parseInt",
    "parseFloat",
};

/// Whether a dotted callee path is on the known-safe list.
pub fn is_safe_callee(path: &str) -> bool {
    if path.starts_with("console.") || path.starts_with("Math.") {
        return true;
    }
    SAFE_CALLEES.contains(path)
}

/// Universal JS globals that identifier resolution leaves untouched.
pub static JS_GLOBALS: PhfSet<&'static str> = phf_set! {
    "console",
    "Math",
    "JSON",
    "Object",
    "Array",
    "String",
    "Number",
    "Boolean",
    "Symbol",
    "Promise",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "Date",
    "RegExp",
    "Error",
    "TypeError",
    "RangeError",
    "Infinity",
    "NaN",
    "undefined",
    "globalThis",
    "window",
    "document",
    "navigator",
    "fetch",
    "setTimeout",
    "setInterval",
    "clearTimeout",
    "clearInterval",
    "queueMicrotask",
    "requestAnimationFrame",
    "structuredClone",
    "isNaN",
    "isFinite",
    "parseInt",
    "parseFloat",
    "this",
    "super",
};

#[inline]
pub fn is_js_global(name: &str) -> bool {
    JS_GLOBALS.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_callees() {
        assert!(is_safe_callee("console.log"));
        assert!(is_safe_callee("JSON.stringify"));
        assert!(is_safe_callee("Math.max"));
        assert!(!is_safe_callee("doSomething"));
    }

    #[test]
    fn test_globals() {
        assert!(is_js_global("console"));
        assert!(!is_js_global("count"));
    }
}
