//! Tests for the standard helpers available to scripts.
//!
//! Most tests go through a sandbox; the registry tests call helpers
//! directly the way the evaluator does.

extern crate resolvent;

use resolvent::resolver::ScriptSource;
use resolvent::runner::api::{Outcome, Sandbox};
use resolvent::runner::ds::error::ErrorType;
use resolvent::runner::ds::value::ScriptValue;
use resolvent::runner::plugin::registry::BuiltInRegistry;
use resolvent::runner::plugin::types::EvalContext;
use serde_json::{json, Value};

fn eval(script: &str) -> Value {
    match Sandbox::default().run(&ScriptSource::from_text(script)) {
        Outcome::Success(value) => value,
        Outcome::Failure(cause) => panic!("script {:?} failed: {}", script, cause),
    }
}

fn fail(script: &str) -> String {
    match Sandbox::default().run(&ScriptSource::from_text(script)) {
        Outcome::Success(value) => panic!("script {:?} unexpectedly returned {}", script, value),
        Outcome::Failure(cause) => cause,
    }
}

// ============================================================================
// Registry
// ============================================================================

mod registry_tests {
    use super::*;

    #[test]
    fn test_core_registry_contents() {
        let registry = BuiltInRegistry::with_core();
        for name in ["len", "range", "s2j", "j2s", "chr", "ord", "min", "max", "sorted"] {
            assert!(registry.has_function(name), "missing helper {}", name);
        }
        assert!(!registry.has_function("open"));
        assert!(registry.has_method("String", "format"));
        assert!(registry.has_method("Array", "push"));
        assert!(registry.has_method("Object", "items"));
    }

    #[test]
    fn test_direct_function_call() {
        let registry = BuiltInRegistry::with_core();
        let mut ctx = EvalContext::default();
        let len = registry.get_function("len").unwrap();
        let result = len
            .call(&mut ctx, ScriptValue::Null, vec![ScriptValue::string("héllo")])
            .unwrap();
        assert_eq!(result.to_json().unwrap(), json!(5));
    }

    #[test]
    fn test_direct_method_call() {
        let registry = BuiltInRegistry::with_core();
        let mut ctx = EvalContext::default();
        let upper = registry.get_method("String", "upper").unwrap();
        let result = upper
            .call(&mut ctx, ScriptValue::string("steel"), vec![])
            .unwrap();
        assert_eq!(result.to_json().unwrap(), json!("STEEL"));
    }

    #[test]
    fn test_direct_call_reports_bad_arguments() {
        let registry = BuiltInRegistry::with_core();
        let mut ctx = EvalContext::default();
        let range = registry.get_function("range").unwrap();
        let result = range.call(
            &mut ctx,
            ScriptValue::Null,
            vec![
                ScriptValue::integer(0),
                ScriptValue::integer(10),
                ScriptValue::integer(0),
            ],
        );
        assert!(matches!(result, Err(ErrorType::RangeError(_))));
    }
}

// ============================================================================
// Core helpers
// ============================================================================

mod core_tests {
    use super::*;

    #[test]
    fn test_range() {
        assert_eq!(eval("range(4)"), json!([0, 1, 2, 3]));
        assert_eq!(eval("range(2, 5)"), json!([2, 3, 4]));
        assert_eq!(eval("range(10, 0, -3)"), json!([10, 7, 4, 1]));
        assert_eq!(eval("range(5, 2)"), json!([]));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(eval("[str(12), int('42'), int(3.9), float(2)]"), json!(["12", 42, 3, 2.0]));
        assert_eq!(eval("type([]) + type({}) + type('')"), json!("listmapstr"));
        assert!(fail("int('forty')").starts_with("TypeError"));
    }

    #[test]
    fn test_len() {
        assert_eq!(eval("[len('abc'), len([1, 2]), len({a: 1})]"), json!([3, 2, 1]));
        assert!(fail("len(5)").starts_with("TypeError"));
    }

    #[test]
    fn test_enumerate_and_zip() {
        assert_eq!(eval("enumerate(['a', 'b'], 1)"), json!([[1, "a"], [2, "b"]]));
        assert_eq!(eval("zip([1, 2, 3], 'ab')"), json!([[1, "a"], [2, "b"]]));
    }

    #[test]
    fn test_sorted() {
        assert_eq!(eval("sorted([3, 1, 2])"), json!([1, 2, 3]));
        assert_eq!(eval("sorted(['bb', 'a', 'ccc'], s => len(s), true)"), json!(["ccc", "bb", "a"]));
        assert!(fail("sorted([1, 'a'])").starts_with("TypeError"));
    }

    #[test]
    fn test_keys_and_list() {
        assert_eq!(eval("keys({z: 1, a: 2})"), json!(["z", "a"]));
        assert_eq!(eval("list('ab')"), json!(["a", "b"]));
    }
}

// ============================================================================
// Math
// ============================================================================

mod math_tests {
    use super::*;

    #[test]
    fn test_min_max() {
        assert_eq!(eval("[min(3, 1, 2), max([4, 9, 2])]"), json!([1, 9]));
        assert!(fail("max([])").starts_with("RangeError"));
    }

    #[test]
    fn test_sum_and_abs() {
        assert_eq!(eval("sum([1, 2, 3], 10)"), json!(16));
        assert_eq!(eval("abs(-7)"), json!(7));
    }

    #[test]
    fn test_round() {
        assert_eq!(eval("round(2.7)"), json!(3));
        assert_eq!(eval("round(3.14159, 2)"), json!(3.14));
    }
}

// ============================================================================
// Strings
// ============================================================================

mod string_tests {
    use super::*;

    #[test]
    fn test_chr_ord() {
        assert_eq!(eval("chr(65) + chr(66)"), json!("AB"));
        assert_eq!(eval("ord('a')"), json!(97));
    }

    #[test]
    fn test_format() {
        assert_eq!(eval("'#prefix#_{}'.format('AA')"), json!("#prefix#_AA"));
        assert_eq!(eval("'{1}-{0}'.format('a', 'b')"), json!("b-a"));
        assert_eq!(eval("'{{}}{}'.format(1)"), json!("{}1"));
    }

    #[test]
    fn test_split_and_join() {
        assert_eq!(eval("'a, b,c'.split(',')"), json!(["a", " b", "c"]));
        assert_eq!(eval("'  a  b '.split()"), json!(["a", "b"]));
        assert_eq!(eval("'-'.join(['x', 'y', 'z'])"), json!("x-y-z"));
        assert!(fail("'-'.join([1, 2])").starts_with("TypeError"));
    }

    #[test]
    fn test_case_and_search() {
        assert_eq!(eval("'Steel'.upper() + 'Steel'.lower()"), json!("STEELsteel"));
        assert_eq!(eval("'  pad  '.strip()"), json!("pad"));
        assert_eq!(eval("'hammock'.replace('m', 'n')"), json!("hannock"));
        assert_eq!(
            eval("['eu-west'.startsWith('eu'), 'a.json'.endsWith('.yml'), 'abc'.includes('bc')]"),
            json!([true, false, true])
        );
        assert_eq!(eval("['hello'.indexOf('l'), 'hello'.indexOf('z')]"), json!([2, -1]));
    }
}

// ============================================================================
// Lists and maps
// ============================================================================

mod collection_tests {
    use super::*;

    #[test]
    fn test_list_mutation() {
        let script = r#"
            const xs = [1, 2]
            const n = xs.push(3, 4)
            const last = xs.pop()
            const first = xs.pop(0)
            return [n, last, first, xs]
        "#;
        assert_eq!(eval(script), json!([4, 4, 1, [2, 3]]));
    }

    #[test]
    fn test_list_callbacks() {
        assert_eq!(eval("[1, 2, 3, 4].filter(x => x % 2 == 0).map(x => x * 10)"), json!([20, 40]));
        assert_eq!(eval("[1, 2, 3].reduce((acc, x) => acc + x, 10)"), json!(16));
        assert_eq!(eval("[1, 2, 3].reduce((acc, x) => acc * x)"), json!(6));
    }

    #[test]
    fn test_list_queries() {
        assert_eq!(eval("[[1, 2].includes(2), [1, 2].indexOf(5)]"), json!([true, -1]));
        assert_eq!(eval("[1, 2, 3].join()"), json!("1,2,3"));
        assert_eq!(eval("[1, 2, 3, 4].slice(1, 3)"), json!([2, 3]));
        assert_eq!(eval("[1].concat([2], [3, 4])"), json!([1, 2, 3, 4]));
        assert_eq!(eval("[1, 2, 3].reverse()"), json!([3, 2, 1]));
    }

    #[test]
    fn test_map_methods() {
        let script = r#"
            const m = {a: 1, b: 2}
            return [m.keys(), m.values(), m.items(), m.get('c', 0), m.has('a')]
        "#;
        assert_eq!(
            eval(script),
            json!([["a", "b"], [1, 2], [["a", 1], ["b", 2]], 0, true])
        );
    }
}

// ============================================================================
// JSON
// ============================================================================

mod json_tests {
    use super::*;

    #[test]
    fn test_s2j() {
        assert_eq!(eval("s2j('{\"a\": [1, 2.5, null]}')"), json!({"a": [1, 2.5, null]}));
        assert!(fail("s2j('{bad')").starts_with("s2j: invalid JSON"));
    }

    #[test]
    fn test_j2s() {
        assert_eq!(eval("j2s({b: [1, 2], a: 'x'})"), json!(r#"{"b": [1, 2], "a": "x"}"#));
        assert_eq!(eval("j2s([1], 2)"), json!("[\n  1\n]"));
    }

    #[test]
    fn test_j2s_of_s2j_round_trip() {
        assert_eq!(eval("s2j(j2s({k: [true, null]}))"), json!({"k": [true, null]}));
    }
}
