//! Tests for resolver containers: access, transforms, nesting and the
//! clean and verbose views.

extern crate resolvent;

use pretty_assertions::assert_eq;
use resolvent::resolver::{ResolveError, ResolverContainer};
use resolvent::runner::plugin::config::SandboxConfig;
use resolvent::Sandbox;
use serde_json::{json, Value};

fn add_y(value: &Value) -> Value {
    json!(format!("{}y", value.as_str().unwrap_or_default()))
}

fn record(input: &str, result: Value) -> Value {
    json!({
        "input": input,
        "evaluated": true,
        "needsEvaluation": true,
        "resolvable": true,
        "resolved": true,
        "result": result,
        "timeline": []
    })
}

// ============================================================================
// Access and transforms
// ============================================================================

mod access_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolver_container() {
        let mut r = ResolverContainer::new();
        r.add("stuff", "yes");
        assert_eq!(r.get("stuff").unwrap(), json!("yes"));

        r.add("things", "<( 'wo' + 'rm'");
        assert_eq!(r.get("things").unwrap(), json!("worm"));

        r.add_transformed("whaaa", "steel", add_y);
        assert_eq!(r.get("whaaa").unwrap(), json!("steely"));

        r.add_transformed(
            "whaaa_eval",
            "<( { 'a' : 'steel', 'b' : 'hammock®' }['a']",
            add_y,
        );
        assert_eq!(r.get("whaaa_eval").unwrap(), json!("steely"));
        assert_eq!(r.get("whaaa_eval").unwrap(), json!("steely"));

        assert!(r.contains("stuff"));
        assert!(r.contains("whaaa_eval"));
        assert!(!r.contains("pickle"));

        assert_eq!(
            r.to_json(false).unwrap(),
            json!({"stuff": "yes", "things": "worm", "whaaa": "steely", "whaaa_eval": "steely"})
        );

        assert_eq!(
            r.to_json(true).unwrap(),
            json!({
                "stuff": "yes",
                "things": record("<( 'wo' + 'rm'", json!("worm")),
                "whaaa": "steely",
                "whaaa_eval": record(
                    "<( { 'a' : 'steel', 'b' : 'hammock®' }['a']",
                    json!("steel")
                )
            })
        );
    }

    #[test]
    fn test_transform_does_not_touch_stored_result() {
        let mut r = ResolverContainer::new();
        r.add_transformed("n", "<( 20 + 1", |v| json!(v.as_i64().unwrap_or(0) * 2));
        assert_eq!(r.get("n").unwrap(), json!(42));
        assert_eq!(r.resolver("n").and_then(|res| res.result()), Some(&json!(21)));
    }

    #[test]
    fn test_entries_evaluate_lazily() {
        let mut r = ResolverContainer::new();
        r.add("bad", "<( nope");
        r.add("good", "<( 1");
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("good").unwrap(), json!(1));
        assert!(!r.resolver("bad").map(|res| res.is_resolved()).unwrap_or(true));
        assert!(r.resolver("bad").map(|res| res.timeline().is_empty()).unwrap_or(false));
    }

    #[test]
    fn test_failed_entry() {
        let mut r = ResolverContainer::new();
        r.add("broken", "<( nope + 1");
        assert_eq!(
            r.get("broken"),
            Err(ResolveError::EvaluationFailed {
                name: "broken".to_string(),
                message: "Error in script: nope is not defined".to_string(),
            })
        );
        assert!(r.to_json(false).is_err());
    }

    #[test]
    fn test_verbose_view_reports_failures() {
        let mut r = ResolverContainer::new();
        r.add("broken", "<( nope");
        let verbose = r.to_json(true).unwrap();
        assert_eq!(verbose["broken"]["resolved"], json!(false));
        assert_eq!(
            verbose["broken"]["timeline"],
            json!(["Error in script: nope is not defined"])
        );
    }

    #[test]
    fn test_unknown_entry() {
        let mut r = ResolverContainer::new();
        assert_eq!(
            r.get("pickle"),
            Err(ResolveError::UnknownEntry("pickle".to_string()))
        );
    }
}

// ============================================================================
// Nesting
// ============================================================================

mod nesting_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compound() -> ResolverContainer {
        let mut r = ResolverContainer::new();
        r.add("stuff", "yes");
        r.add("things", "<( 'wo' + 'rm'");
        let mut r2 = ResolverContainer::new();
        r2.add("blue", "<( 5 + 27");
        assert_eq!(r2.get("blue").unwrap(), json!(32));
        r.add("sub", r2);
        r
    }

    #[test]
    fn test_resolver_compound() {
        let mut r = compound();
        assert_eq!(r.get("things").unwrap(), json!("worm"));
        assert_eq!(
            r.to_json(false).unwrap(),
            json!({"stuff": "yes", "things": "worm", "sub": {"blue": 32}})
        );
        assert_eq!(
            r.to_json(true).unwrap(),
            json!({
                "stuff": "yes",
                "things": record("<( 'wo' + 'rm'", json!("worm")),
                "sub": {"blue": record("<( 5 + 27", json!(32))}
            })
        );
    }

    #[test]
    fn test_nested_access() {
        let mut r = compound();
        assert_eq!(r.get("sub").unwrap(), json!({"blue": 32}));
        assert_eq!(r.lookup("sub.blue").unwrap(), json!(32));
        assert!(matches!(r.lookup("stuff.blue"), Err(ResolveError::UnknownEntry(_))));
        if let Some(sub) = r.nested_mut("sub") {
            sub.add("green", json!(7));
        }
        assert_eq!(r.lookup("sub.green").unwrap(), json!(7));
    }
}

// ============================================================================
// Construction from documents
// ============================================================================

mod document_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_value_keeps_order() {
        let document = json!({
            "zone": "eu",
            "replicas": "<( 3",
            "hosts": ["<(", "return ['a', 'b'].map(h => h + '.internal')"]
        });
        let mut r = ResolverContainer::from_value(&document).unwrap();
        assert_eq!(r.names().collect::<Vec<_>>(), vec!["zone", "replicas", "hosts"]);
        assert_eq!(
            r.to_json(false).unwrap(),
            json!({"zone": "eu", "replicas": 3, "hosts": ["a.internal", "b.internal"]})
        );
    }

    #[test]
    fn test_shared_sandbox_timeout() {
        let sandbox = Sandbox::new(SandboxConfig::new().with_timeout_secs(0.3).unwrap());
        let document = json!({"spin": "<( while (true) {}", "ok": "<( 2"});
        let mut r = ResolverContainer::from_value_with(&document, &sandbox).unwrap();
        assert_eq!(r.get("ok").unwrap(), json!(2));
        assert_eq!(
            r.get("spin"),
            Err(ResolveError::EvaluationFailed {
                name: "spin".to_string(),
                message: "Error in script: TIMEOUT".to_string(),
            })
        );
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(matches!(
            ResolverContainer::from_value(&json!("<( 1")),
            Err(ResolveError::NotAnObject(_))
        ));
    }
}
