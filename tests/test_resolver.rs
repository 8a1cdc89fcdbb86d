//! Tests for single-entry resolvers.
//!
//! Each test builds a resolver from a configuration value, evaluates it and
//! checks the result, the state and the first timeline message.

extern crate resolvent;

use std::time::Duration;

use resolvent::resolver::{Resolver, ResolverState};
use serde_json::json;

// ============================================================================
// Classification
// ============================================================================

mod classification_tests {
    use super::*;

    #[test]
    fn test_contains_code() {
        assert!(Resolver::contains_code(&json!("<(hello")));
        assert!(Resolver::contains_code(&json!(["<(", "return 1"])));
        assert!(Resolver::contains_code(&json!({"a": 1, "b": "<( 2"})));
        assert!(!Resolver::contains_code(&json!("stuff")));
        assert!(!Resolver::contains_code(&json!(" <(not at start")));
        assert!(!Resolver::contains_code(&json!(["return 1", "<("])));
        assert!(!Resolver::contains_code(&json!({"a": {"b": "<( 2"}})));
    }

    #[test]
    fn test_plain_value_is_resolved() {
        let mut resolver = Resolver::new(json!("stuff"));
        assert!(resolver.is_resolved());
        assert_eq!(resolver.evaluate(), Some(&json!("stuff")));
        assert!(resolver.timeline().is_empty());
    }

    #[test]
    fn test_plain_compound_is_resolved() {
        let mut resolver = Resolver::new(json!({"a": 1, "b": [2]}));
        assert!(resolver.is_resolved());
        assert_eq!(resolver.evaluate(), Some(&json!({"a": 1, "b": [2]})));
    }
}

// ============================================================================
// Script execution
// ============================================================================

mod execution_tests {
    use super::*;

    #[test]
    fn test_exec_simple() {
        let mut resolver = Resolver::new(json!("<(return [1, 2, 3]"));
        assert!(!resolver.is_resolved());
        assert_eq!(resolver.state(), ResolverState::Unresolved);
        assert_eq!(resolver.evaluate(), Some(&json!([1, 2, 3])));
        assert_eq!(resolver.state(), ResolverState::Resolved);
    }

    #[test]
    fn test_exec_multi_line() {
        let mut resolver = Resolver::new(json!([
            "<(",
            "function func(things) {",
            "  return s2j('[1,2,{}]'.format(things))",
            "}",
            "return func('3')"
        ]));
        assert_eq!(resolver.evaluate(), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn test_exec_generator() {
        let mut resolver = Resolver::new(json!([
            "<(",
            "function fib(n) {",
            "  let [a, b] = [0, 1]",
            "  for (const _ of range(n)) {",
            "    yield a;",
            "    [a, b] = [b, a + b]",
            "  }",
            "}",
            "return list(fib(10))"
        ]));
        assert_eq!(
            resolver.evaluate(),
            Some(&json!([0, 1, 1, 2, 3, 5, 8, 13, 21, 34]))
        );
    }

    #[test]
    fn test_exec_recursion() {
        let mut resolver = Resolver::new(json!([
            "<(",
            "function fib(n, a = 0, b = 1) {",
            "  return n > 0 ? fib(n - 1, b, a + b) : a",
            "}",
            "return fib(10)"
        ]));
        assert_eq!(resolver.evaluate(), Some(&json!(55)));
    }

    #[test]
    fn test_exec_exception() {
        let mut resolver = Resolver::new(json!([
            "<(",
            "try {",
            "  return 0 / 0",
            "} catch (z) {",
            "  return 'divide by zero'",
            "}"
        ]));
        assert_eq!(resolver.evaluate(), Some(&json!("divide by zero")));
    }

    #[test]
    fn test_exec_section_gen() {
        let mut resolver = Resolver::new(json!([
            "<(",
            "const r = range(65, 91)",
            "const names = [chr(a) + chr(b) for a of r for b of r]",
            "function valsec(value) {",
            "  return { 'value': '#prefix#_{}'.format(value) }",
            "}",
            "return j2s({",
            "  'sections': { name: valsec(name) for name of names }",
            "})"
        ]));
        let text = resolver.evaluate().and_then(|v| v.as_str()).unwrap_or_default();
        assert_eq!(text.len(), 21646);
        assert!(text.starts_with(r##"{"sections": {"AA": {"value": "#prefix#_AA"}, "AB": "##));
    }

    #[test]
    fn test_exec_compound() {
        let mut resolver = Resolver::new(json!({"one two three": "<(return [1, 2, 3]", "four": 4}));
        assert!(!resolver.is_resolved());
        resolver.evaluate();
        assert_eq!(
            resolver.result(),
            Some(&json!({"one two three": [1, 2, 3], "four": 4}))
        );
    }

    #[test]
    fn test_second_evaluate_is_cached() {
        let mut resolver = Resolver::new(json!("<( [1, 2].concat([3])"));
        let first = resolver.evaluate().cloned();
        let second = resolver.evaluate().cloned();
        assert_eq!(first, Some(json!([1, 2, 3])));
        assert_eq!(first, second);
        assert!(resolver.timeline().is_empty());
    }
}

// ============================================================================
// Failures
// ============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn test_exec_bad_builtins() {
        let mut resolver = Resolver::new(json!(["<(", "open('foo').write('bar')"]));
        assert_eq!(resolver.evaluate(), None);
        assert_eq!(
            resolver.first_msg(),
            Some("Error in script: open is not defined")
        );
    }

    #[test]
    fn test_exec_import() {
        let mut resolver = Resolver::new(json!("<(\nimport json"));
        assert_eq!(resolver.evaluate(), None);
        assert!(!resolver.is_resolved());
        assert_eq!(
            resolver.first_msg(),
            Some("Error in script: import is not available")
        );
    }

    #[test]
    fn test_infinite_loop() {
        let mut resolver = Resolver::with_timeout(
            json!(["<(", "while (true) {", "}"]),
            Duration::from_secs(1),
        );
        assert_eq!(resolver.evaluate(), None);
        assert!(!resolver.is_resolved());
        assert_eq!(resolver.state(), ResolverState::Failed);
        assert_eq!(resolver.first_msg(), Some("Error in script: TIMEOUT"));
    }

    #[test]
    fn test_compound_syntax_error() {
        let mut resolver = Resolver::new(json!({"one two three": "<(return [1, 2, 3"}));
        assert!(!resolver.is_resolved());
        resolver.evaluate();
        let message = resolver.first_msg().unwrap_or_default();
        assert!(
            message.starts_with("Error in script: invalid syntax (line 1, column "),
            "unexpected message {:?}",
            message
        );
        assert_eq!(resolver.result(), None);
    }

    #[test]
    fn test_compound_stops_at_first_failure() {
        let mut resolver = Resolver::new(json!({
            "a": "<( 1",
            "b": "<( nope",
            "c": "<( import x"
        }));
        assert_eq!(resolver.evaluate(), None);
        assert_eq!(
            resolver.timeline().to_vec(),
            vec!["Error in script: nope is not defined".to_string()]
        );
        assert_eq!(resolver.result(), None);
        assert_eq!(resolver.state(), ResolverState::Failed);
    }

    #[test]
    fn test_list_source_error_line() {
        let mut resolver = Resolver::new(json!(["<(", "let a = 1", "let b = (2"]));
        resolver.evaluate();
        let message = resolver.first_msg().unwrap_or_default();
        assert!(
            message.starts_with("Error in script: invalid syntax (line 3, "),
            "unexpected message {:?}",
            message
        );
    }

    #[test]
    fn test_thrown_value_message() {
        let mut resolver = Resolver::new(json!("<( throw 'no config for ' + 'eu-west'"));
        assert_eq!(resolver.evaluate(), None);
        assert_eq!(
            resolver.first_msg(),
            Some("Error in script: no config for eu-west")
        );
    }

    #[test]
    fn test_failed_record() {
        let mut resolver = Resolver::new(json!("<( missing"));
        resolver.evaluate();
        assert_eq!(
            resolver.to_record(),
            json!({
                "input": "<( missing",
                "evaluated": false,
                "needsEvaluation": true,
                "resolvable": true,
                "resolved": false,
                "result": null,
                "timeline": ["Error in script: missing is not defined"]
            })
        );
    }
}
