use super::api::Rule;
use super::api::ScriptParser;
use super::ast::*;

use pest::consumes_to;
use pest::fails_with;
use pest::parses_to;
use pest::Parser;

fn single_expression(script: &str) -> ExpressionType {
    let program = ScriptParser::parse_to_ast_from_str(script).unwrap();
    program.as_single_expression().cloned().unwrap()
}

fn int(i: i64) -> Box<ExpressionType> {
    Box::new(ExpressionType::Literal(LiteralType::IntegerLiteral(i)))
}

#[test]
fn test_integer() {
    parses_to! {
        parser: ScriptParser,
        input: "1024",
        rule: Rule::integer,
        tokens: [
            integer(0, 4)
        ]
    };
}

#[test]
fn test_float_with_exp() {
    parses_to! {
        parser: ScriptParser,
        input: "1.5e3",
        rule: Rule::float,
        tokens: [
            float(0, 5)
        ]
    };
}

#[test]
fn test_integer_rejects_letters() {
    fails_with! {
        parser: ScriptParser,
        input: "abc",
        rule: Rule::integer,
        positives: vec![Rule::integer],
        negatives: vec![],
        pos: 0
    };
}

#[test]
fn test_single_quoted_string() {
    parses_to! {
        parser: ScriptParser,
        input: "'wo'",
        rule: Rule::string,
        tokens: [
            string(0, 4, [
                single_quoted(1, 3)
            ])
        ]
    };
}

#[test]
fn test_double_quoted_string_with_escape() {
    parses_to! {
        parser: ScriptParser,
        input: "\"a\\\"b\"",
        rule: Rule::string,
        tokens: [
            string(0, 6, [
                double_quoted(1, 5)
            ])
        ]
    };
}

#[test]
fn test_identifier_with_keyword_prefix() {
    parses_to! {
        parser: ScriptParser,
        input: "format",
        rule: Rule::identifier,
        tokens: [
            identifier(0, 6)
        ]
    };
}

#[test]
fn test_keyword_is_not_identifier() {
    assert!(ScriptParser::parse(Rule::identifier, "return").is_err());
    assert!(ScriptParser::parse(Rule::identifier, "of").is_err());
}

#[test]
fn test_precedence_of_multiplication() {
    assert_eq!(
        single_expression("1 + 2 * 3"),
        ExpressionType::BinaryExpression {
            operator: BinaryOperator::Add,
            left: int(1),
            right: Box::new(ExpressionType::BinaryExpression {
                operator: BinaryOperator::Multiply,
                left: int(2),
                right: int(3),
            }),
        }
    );
}

#[test]
fn test_power_is_right_associative() {
    assert_eq!(
        single_expression("2 ** 3 ** 2"),
        ExpressionType::BinaryExpression {
            operator: BinaryOperator::Power,
            left: int(2),
            right: Box::new(ExpressionType::BinaryExpression {
                operator: BinaryOperator::Power,
                left: int(3),
                right: int(2),
            }),
        }
    );
}

#[test]
fn test_negative_literal_is_folded() {
    assert_eq!(single_expression("-7"), *int(-7));
}

#[test]
fn test_member_call_chain() {
    assert_eq!(
        single_expression("'a'.upper()"),
        ExpressionType::CallExpression {
            callee: Box::new(ExpressionType::MemberExpression {
                object: Box::new(ExpressionType::Literal(LiteralType::StringLiteral(
                    "a".to_string()
                ))),
                property: "upper".to_string(),
            }),
            arguments: vec![],
        }
    );
}

#[test]
fn test_arrow_function_with_expression_body() {
    match single_expression("x => x + 1") {
        ExpressionType::FunctionExpression(f) => {
            assert_eq!(f.params.len(), 1);
            assert_eq!(f.params[0].name, "x");
            assert!(matches!(
                f.body.as_slice(),
                [StatementType::ReturnStatement(Some(_))]
            ));
            assert!(!f.is_generator);
        }
        other => panic!("expected a function, got {:?}", other),
    }
}

#[test]
fn test_object_literal_keys() {
    match single_expression("({a: 1, 'b c': 2, [k]: 3})") {
        ExpressionType::ObjectExpression(properties) => {
            assert_eq!(properties.len(), 3);
            assert_eq!(properties[0].0, PropertyKey::Name("a".to_string()));
            assert_eq!(properties[1].0, PropertyKey::Name("b c".to_string()));
            assert_eq!(
                properties[2].0,
                PropertyKey::Computed(ExpressionType::Identifier("k".to_string()))
            );
        }
        other => panic!("expected an object, got {:?}", other),
    }
}

#[test]
fn test_list_comprehension() {
    match single_expression("[x * 2 for x of xs if x > 1]") {
        ExpressionType::ListComprehension { clauses, .. } => {
            assert_eq!(clauses.len(), 2);
            assert!(matches!(clauses[0], ComprehensionClause::For { .. }));
            assert!(matches!(clauses[1], ComprehensionClause::If(_)));
        }
        other => panic!("expected a comprehension, got {:?}", other),
    }
}

#[test]
fn test_yield_marks_generator() {
    let program =
        ScriptParser::parse_to_ast_from_str("function gen(n) { for (let i of range(n)) { yield i; } }")
            .unwrap();
    match &program.body[0] {
        StatementType::FunctionDeclaration(f) => assert!(f.is_generator),
        other => panic!("expected a function declaration, got {:?}", other),
    }
}

#[test]
fn test_for_statement_parts() {
    let program =
        ScriptParser::parse_to_ast_from_str("for (let i = 0; i < 3; i++) { total += i; }").unwrap();
    match &program.body[0] {
        StatementType::ForStatement {
            init: Some(ForInit::VariableDeclaration(_)),
            test: Some(_),
            update: Some(ExpressionType::UpdateExpression { .. }),
            body,
        } => assert_eq!(body.len(), 1),
        other => panic!("unexpected statement {:?}", other),
    }
}

#[test]
fn test_import_statement() {
    let program = ScriptParser::parse_to_ast_from_str("import os\nreturn 1").unwrap();
    assert_eq!(
        program.body[0],
        StatementType::ImportStatement {
            target: "os".to_string()
        }
    );
}

#[test]
fn test_duplicate_parameters_rejected() {
    assert!(ScriptParser::parse_to_ast_from_str("function f(a, a) { return a; }").is_err());
}

#[test]
fn test_unbalanced_parenthesis_rejected() {
    assert!(ScriptParser::parse_to_ast_from_str("return (1 + 2").is_err());
}

#[test]
fn test_multiple_statements_are_not_single_expression() {
    let program = ScriptParser::parse_to_ast_from_str("let a = 1; a").unwrap();
    assert_eq!(program.body.len(), 2);
    assert!(program.as_single_expression().is_none());
}
