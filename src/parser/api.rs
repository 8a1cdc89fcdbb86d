use std::rc::Rc;

use pest::error::{Error, ErrorVariant};
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::{Parser, Position, Span};
use pest_derive::Parser;

use super::ast::*;
use super::static_semantics::{bound_parameter_names, contains_yield};
use super::util::{excess_nesting, unescape_string};

#[derive(Parser)]
#[grammar = "parser/script_grammar.pest"] // relative to src
pub struct ScriptParser;

lazy_static! {
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::or, Assoc::Left))
        .op(Op::infix(Rule::and, Assoc::Left))
        .op(Op::infix(Rule::eq, Assoc::Left) | Op::infix(Rule::ne, Assoc::Left))
        .op(Op::infix(Rule::lt, Assoc::Left)
            | Op::infix(Rule::le, Assoc::Left)
            | Op::infix(Rule::gt, Assoc::Left)
            | Op::infix(Rule::ge, Assoc::Left)
            | Op::infix(Rule::in_op, Assoc::Left))
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left)
            | Op::infix(Rule::div, Assoc::Left)
            | Op::infix(Rule::rem, Assoc::Left))
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::not))
        .op(Op::infix(Rule::pow, Assoc::Right));
}

/// Deepest bracket nesting a script may use.
pub const MAX_NESTING_DEPTH: usize = 256;

const NESTING_MESSAGE: &str = "expression nested too deeply";

type BuildResult<T> = Result<T, Error<Rule>>;

impl ScriptParser {
    pub fn parse_to_ast_from_str(script: &str) -> BuildResult<ProgramData> {
        if let Some(offset) = excess_nesting(script, MAX_NESTING_DEPTH) {
            let pos = Position::new(script, offset).unwrap_or_else(|| Position::from_start(script));
            return Err(nesting_error(pos));
        }
        let pairs = ScriptParser::parse(Rule::script, script).map_err(relabel_stack_limit)?;
        build_ast_from_script(pairs)
    }
}

fn nesting_error(pos: Position) -> Error<Rule> {
    Error::new_from_pos(
        ErrorVariant::CustomError {
            message: NESTING_MESSAGE.to_string(),
        },
        pos,
    )
}

// Deep unbracketed chains such as `- - - 1` hit pest's stack guard instead.
fn relabel_stack_limit(mut error: Error<Rule>) -> Error<Rule> {
    if let ErrorVariant::CustomError { message } = &mut error.variant {
        if message == "stack limit reached" {
            *message = NESTING_MESSAGE.to_string();
        }
    }
    error
}

fn build_ast_from_script(pairs: Pairs<Rule>) -> BuildResult<ProgramData> {
    let mut body = vec![];
    for pair in pairs {
        match pair.as_rule() {
            Rule::script => {
                for child in pair.into_inner() {
                    if child.as_rule() != Rule::EOI {
                        body.push(build_ast_from_statement(child)?);
                    }
                }
            }
            Rule::EOI => { /* Do nothing */ }
            _ => return Err(get_unexpected_error(&pair)),
        }
    }
    Ok(ProgramData { body })
}

fn is_keyword_token(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_function
            | Rule::kw_return
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_for
            | Rule::kw_of
            | Rule::kw_break
            | Rule::kw_continue
            | Rule::kw_throw
            | Rule::kw_try
            | Rule::kw_catch
            | Rule::kw_finally
            | Rule::kw_import
            | Rule::kw_yield
    )
}

/// Children of `pair` without the keyword tokens.
fn significant<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner().filter(|p| !is_keyword_token(p.as_rule()))
}

fn next_pair<'i>(
    inner: &mut impl Iterator<Item = Pair<'i, Rule>>,
    span: Span<'i>,
) -> BuildResult<Pair<'i, Rule>> {
    inner.next().ok_or_else(|| {
        Error::new_from_span(
            ErrorVariant::CustomError {
                message: "incomplete construct".to_string(),
            },
            span,
        )
    })
}

fn get_unexpected_error(pair: &Pair<Rule>) -> Error<Rule> {
    Error::new_from_span(
        ErrorVariant::CustomError {
            message: format!("unexpected {:?}", pair.as_rule()),
        },
        pair.as_span(),
    )
}

fn get_custom_error(message: String, span: Span) -> Error<Rule> {
    Error::new_from_span(ErrorVariant::CustomError { message }, span)
}

fn build_ast_from_statement(pair: Pair<Rule>) -> BuildResult<StatementType> {
    let span = pair.as_span();
    Ok(match pair.as_rule() {
        Rule::function_declaration => {
            StatementType::FunctionDeclaration(Rc::new(build_ast_from_function(pair)?))
        }
        Rule::import_statement => {
            let target = significant(pair)
                .find(|p| p.as_rule() == Rule::import_target)
                .map(|p| p.as_str().trim().to_string())
                .unwrap_or_default();
            StatementType::ImportStatement { target }
        }
        Rule::variable_statement => {
            let mut inner = pair.into_inner();
            StatementType::VariableDeclaration(build_ast_from_variable_declarations(next_pair(
                &mut inner, span,
            )?)?)
        }
        Rule::if_statement => {
            let mut inner = significant(pair);
            let test = build_ast_from_expression(next_pair(&mut inner, span)?)?;
            let consequent = build_ast_from_branch(next_pair(&mut inner, span)?)?;
            let alternate = inner.next().map(build_ast_from_branch).transpose()?;
            StatementType::IfStatement {
                test,
                consequent,
                alternate,
            }
        }
        Rule::while_statement => {
            let mut inner = significant(pair);
            let test = build_ast_from_expression(next_pair(&mut inner, span)?)?;
            let body = build_ast_from_branch(next_pair(&mut inner, span)?)?;
            StatementType::WhileStatement { test, body }
        }
        Rule::for_of_statement => {
            // The loop variable always gets a fresh per-iteration binding, so the
            // declaration kind carries no extra meaning here.
            let mut inner = significant(pair).filter(|p| p.as_rule() != Rule::declaration_kind);
            let target = build_ast_from_binding_target(next_pair(&mut inner, span)?)?;
            let iterable = build_ast_from_expression(next_pair(&mut inner, span)?)?;
            let body = build_ast_from_branch(next_pair(&mut inner, span)?)?;
            StatementType::ForOfStatement {
                target,
                iterable,
                body,
            }
        }
        Rule::for_statement => {
            let mut init = None;
            let mut test = None;
            let mut update = None;
            let mut body = None;
            for child in significant(pair) {
                let child_span = child.as_span();
                match child.as_rule() {
                    Rule::for_init => {
                        let first = next_pair(&mut child.into_inner(), child_span)?;
                        init = Some(if first.as_rule() == Rule::variable_declarations {
                            ForInit::VariableDeclaration(build_ast_from_variable_declarations(
                                first,
                            )?)
                        } else {
                            ForInit::Expression(build_ast_from_expression(first)?)
                        });
                    }
                    Rule::for_test => {
                        test = Some(build_ast_from_expression(next_pair(
                            &mut child.into_inner(),
                            child_span,
                        )?)?);
                    }
                    Rule::for_update => {
                        update = Some(build_ast_from_expression(next_pair(
                            &mut child.into_inner(),
                            child_span,
                        )?)?);
                    }
                    Rule::branch => body = Some(build_ast_from_branch(child)?),
                    _ => return Err(get_unexpected_error(&child)),
                }
            }
            StatementType::ForStatement {
                init,
                test,
                update,
                body: body.unwrap_or_default(),
            }
        }
        Rule::return_statement => StatementType::ReturnStatement(
            significant(pair)
                .next()
                .map(build_ast_from_expression)
                .transpose()?,
        ),
        Rule::yield_statement => StatementType::YieldStatement(
            significant(pair)
                .next()
                .map(build_ast_from_expression)
                .transpose()?,
        ),
        Rule::break_statement => StatementType::BreakStatement,
        Rule::continue_statement => StatementType::ContinueStatement,
        Rule::throw_statement => {
            let mut inner = significant(pair);
            StatementType::ThrowStatement(build_ast_from_expression(next_pair(&mut inner, span)?)?)
        }
        Rule::try_statement => {
            let mut block = vec![];
            let mut handler = None;
            let mut finalizer = None;
            for child in significant(pair) {
                match child.as_rule() {
                    Rule::block => block = build_ast_from_block(child)?,
                    Rule::catch_clause => {
                        let mut param = None;
                        let mut body = vec![];
                        for c in significant(child) {
                            match c.as_rule() {
                                Rule::identifier => param = Some(c.as_str().to_string()),
                                Rule::block => body = build_ast_from_block(c)?,
                                _ => return Err(get_unexpected_error(&c)),
                            }
                        }
                        handler = Some(CatchClauseData { param, body });
                    }
                    Rule::finally_clause => {
                        let child_span = child.as_span();
                        let mut inner = significant(child);
                        finalizer = Some(build_ast_from_block(next_pair(&mut inner, child_span)?)?);
                    }
                    _ => return Err(get_unexpected_error(&child)),
                }
            }
            StatementType::TryStatement {
                block,
                handler,
                finalizer,
            }
        }
        Rule::empty_statement => StatementType::EmptyStatement,
        Rule::expression_statement => {
            let mut inner = pair.into_inner();
            StatementType::ExpressionStatement(build_ast_from_expression(next_pair(
                &mut inner, span,
            )?)?)
        }
        _ => return Err(get_unexpected_error(&pair)),
    })
}

fn build_ast_from_block(pair: Pair<Rule>) -> BuildResult<Vec<StatementType>> {
    pair.into_inner().map(build_ast_from_statement).collect()
}

fn build_ast_from_branch(pair: Pair<Rule>) -> BuildResult<Vec<StatementType>> {
    let span = pair.as_span();
    let inner = next_pair(&mut pair.into_inner(), span)?;
    if inner.as_rule() == Rule::block {
        build_ast_from_block(inner)
    } else {
        Ok(vec![build_ast_from_statement(inner)?])
    }
}

fn build_ast_from_function(pair: Pair<Rule>) -> BuildResult<FunctionData> {
    let span = pair.as_span();
    let mut name = None;
    let mut is_generator = false;
    let mut params = vec![];
    let mut body = vec![];
    for child in significant(pair) {
        match child.as_rule() {
            Rule::generator_marker => is_generator = true,
            Rule::identifier => name = Some(child.as_str().to_string()),
            Rule::parameters => params = build_ast_from_parameters(child)?,
            Rule::block => body = build_ast_from_block(child)?,
            _ => return Err(get_unexpected_error(&child)),
        }
    }
    bound_parameter_names(&params).map_err(|message| get_custom_error(message, span))?;
    let is_generator = is_generator || contains_yield(&body);
    Ok(FunctionData {
        name,
        params,
        body,
        is_generator,
    })
}

fn build_ast_from_arrow_function(pair: Pair<Rule>) -> BuildResult<FunctionData> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let params_pair = next_pair(&mut inner, span)?;
    let params_span = params_pair.as_span();
    let head = next_pair(&mut params_pair.into_inner(), params_span)?;
    let params = match head.as_rule() {
        Rule::identifier => vec![ParameterData {
            name: head.as_str().to_string(),
            default: None,
        }],
        Rule::parameters => build_ast_from_parameters(head)?,
        _ => return Err(get_unexpected_error(&head)),
    };
    bound_parameter_names(&params).map_err(|message| get_custom_error(message, span))?;
    let body_pair = next_pair(&mut inner, span)?;
    let body = if body_pair.as_rule() == Rule::block {
        build_ast_from_block(body_pair)?
    } else {
        vec![StatementType::ReturnStatement(Some(
            build_ast_from_expression(body_pair)?,
        ))]
    };
    let is_generator = contains_yield(&body);
    Ok(FunctionData {
        name: None,
        params,
        body,
        is_generator,
    })
}

fn build_ast_from_parameters(pair: Pair<Rule>) -> BuildResult<Vec<ParameterData>> {
    let mut params = vec![];
    for param in pair.into_inner() {
        let span = param.as_span();
        let mut inner = param.into_inner();
        let name = next_pair(&mut inner, span)?.as_str().to_string();
        let default = inner.next().map(build_ast_from_expression).transpose()?;
        params.push(ParameterData { name, default });
    }
    Ok(params)
}

fn build_ast_from_variable_declarations(pair: Pair<Rule>) -> BuildResult<VariableDeclarationData> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let kind = match next_pair(&mut inner, span)?.as_str() {
        "const" => VariableDeclarationKind::Const,
        "let" => VariableDeclarationKind::Let,
        _ => VariableDeclarationKind::Var,
    };
    let mut declarations = vec![];
    for declarator in inner {
        let declarator_span = declarator.as_span();
        let mut parts = declarator.into_inner();
        let id = build_ast_from_binding_target(next_pair(&mut parts, declarator_span)?)?;
        let init = parts.next().map(build_ast_from_expression).transpose()?;
        declarations.push(VariableDeclaratorData { id, init });
    }
    Ok(VariableDeclarationData { kind, declarations })
}

fn build_ast_from_binding_target(pair: Pair<Rule>) -> BuildResult<BindingTarget> {
    match pair.as_rule() {
        Rule::identifier => Ok(BindingTarget::Identifier(pair.as_str().to_string())),
        Rule::array_pattern => Ok(BindingTarget::ArrayPattern(
            pair.into_inner().map(|p| p.as_str().to_string()).collect(),
        )),
        _ => Err(get_unexpected_error(&pair)),
    }
}

fn build_ast_from_expression(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let span = pair.as_span();
    match pair.as_rule() {
        Rule::assignment => {
            let mut inner = pair.into_inner();
            let target = build_ast_from_assignment_target(next_pair(&mut inner, span)?)?;
            let operator_pair = next_pair(&mut inner, span)?;
            let operator = match operator_pair.as_str() {
                "=" => AssignmentOperator::Assign,
                "+=" => AssignmentOperator::AddAssign,
                "-=" => AssignmentOperator::SubtractAssign,
                "*=" => AssignmentOperator::MultiplyAssign,
                "/=" => AssignmentOperator::DivideAssign,
                "%=" => AssignmentOperator::RemainderAssign,
                _ => return Err(get_unexpected_error(&operator_pair)),
            };
            if operator != AssignmentOperator::Assign {
                if let AssignmentTarget::ArrayPattern(_) = target {
                    return Err(get_custom_error(
                        "compound assignment to a pattern".to_string(),
                        span,
                    ));
                }
            }
            let value = Box::new(build_ast_from_expression(next_pair(&mut inner, span)?)?);
            Ok(ExpressionType::AssignmentExpression {
                operator,
                target,
                value,
            })
        }
        Rule::update => {
            let mut inner = pair.into_inner();
            let target = build_ast_from_assignment_target(next_pair(&mut inner, span)?)?;
            if let AssignmentTarget::ArrayPattern(_) = target {
                return Err(get_custom_error("update of a pattern".to_string(), span));
            }
            let operator = if next_pair(&mut inner, span)?.as_str() == "++" {
                UpdateOperator::Increment
            } else {
                UpdateOperator::Decrement
            };
            Ok(ExpressionType::UpdateExpression { operator, target })
        }
        Rule::conditional => {
            let mut inner = pair.into_inner();
            let test = build_ast_from_binary(next_pair(&mut inner, span)?)?;
            match (inner.next(), inner.next()) {
                (Some(consequent), Some(alternate)) => Ok(ExpressionType::ConditionalExpression {
                    test: Box::new(test),
                    consequent: Box::new(build_ast_from_expression(consequent)?),
                    alternate: Box::new(build_ast_from_expression(alternate)?),
                }),
                _ => Ok(test),
            }
        }
        _ => Err(get_unexpected_error(&pair)),
    }
}

fn build_ast_from_binary(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    PRATT_PARSER
        .map_primary(build_ast_from_postfix_expression)
        .map_prefix(|op, rhs| {
            let argument = rhs?;
            Ok(match op.as_rule() {
                Rule::neg => match argument {
                    ExpressionType::Literal(LiteralType::IntegerLiteral(i)) => {
                        ExpressionType::Literal(LiteralType::IntegerLiteral(-i))
                    }
                    ExpressionType::Literal(LiteralType::FloatLiteral(f)) => {
                        ExpressionType::Literal(LiteralType::FloatLiteral(-f))
                    }
                    argument => ExpressionType::UnaryExpression {
                        operator: UnaryOperator::Minus,
                        argument: Box::new(argument),
                    },
                },
                Rule::not => ExpressionType::UnaryExpression {
                    operator: UnaryOperator::LogicalNot,
                    argument: Box::new(argument),
                },
                _ => return Err(get_unexpected_error(&op)),
            })
        })
        .map_infix(|lhs, op, rhs| {
            let left = Box::new(lhs?);
            let right = Box::new(rhs?);
            let operator = match op.as_rule() {
                Rule::or => {
                    return Ok(ExpressionType::LogicalExpression {
                        operator: LogicalOperator::Or,
                        left,
                        right,
                    })
                }
                Rule::and => {
                    return Ok(ExpressionType::LogicalExpression {
                        operator: LogicalOperator::And,
                        left,
                        right,
                    })
                }
                Rule::eq => BinaryOperator::Equal,
                Rule::ne => BinaryOperator::NotEqual,
                Rule::lt => BinaryOperator::LessThan,
                Rule::le => BinaryOperator::LessThanEqual,
                Rule::gt => BinaryOperator::GreaterThan,
                Rule::ge => BinaryOperator::GreaterThanEqual,
                Rule::in_op => BinaryOperator::In,
                Rule::add => BinaryOperator::Add,
                Rule::sub => BinaryOperator::Subtract,
                Rule::mul => BinaryOperator::Multiply,
                Rule::div => BinaryOperator::Divide,
                Rule::rem => BinaryOperator::Remainder,
                Rule::pow => BinaryOperator::Power,
                _ => return Err(get_unexpected_error(&op)),
            };
            Ok(ExpressionType::BinaryExpression {
                operator,
                left,
                right,
            })
        })
        .parse(pair.into_inner())
}

fn build_ast_from_postfix_expression(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let mut expression = build_ast_from_primary(next_pair(&mut inner, span)?)?;
    for accessor in inner {
        expression = apply_accessor(expression, accessor)?;
    }
    Ok(expression)
}

fn apply_accessor(object: ExpressionType, accessor: Pair<Rule>) -> BuildResult<ExpressionType> {
    let span = accessor.as_span();
    Ok(match accessor.as_rule() {
        Rule::member => ExpressionType::MemberExpression {
            object: Box::new(object),
            property: next_pair(&mut accessor.into_inner(), span)?
                .as_str()
                .to_string(),
        },
        Rule::index => ExpressionType::IndexExpression {
            object: Box::new(object),
            index: Box::new(build_ast_from_expression(next_pair(
                &mut accessor.into_inner(),
                span,
            )?)?),
        },
        Rule::call => ExpressionType::CallExpression {
            callee: Box::new(object),
            arguments: accessor
                .into_inner()
                .map(build_ast_from_expression)
                .collect::<BuildResult<Vec<_>>>()?,
        },
        _ => return Err(get_unexpected_error(&accessor)),
    })
}

fn build_ast_from_assignment_target(pair: Pair<Rule>) -> BuildResult<AssignmentTarget> {
    let span = pair.as_span();
    let mut inner = pair.into_inner();
    let head = next_pair(&mut inner, span)?;
    if head.as_rule() == Rule::array_pattern {
        return Ok(AssignmentTarget::ArrayPattern(
            head.into_inner().map(|p| p.as_str().to_string()).collect(),
        ));
    }
    let mut accessors: Vec<Pair<Rule>> = inner.collect();
    let last = match accessors.pop() {
        None => return Ok(AssignmentTarget::Identifier(head.as_str().to_string())),
        Some(last) => last,
    };
    let mut object = ExpressionType::Identifier(head.as_str().to_string());
    for accessor in accessors {
        object = apply_accessor(object, accessor)?;
    }
    match apply_accessor(object, last)? {
        ExpressionType::MemberExpression { object, property } => {
            Ok(AssignmentTarget::Member { object, property })
        }
        ExpressionType::IndexExpression { object, index } => {
            Ok(AssignmentTarget::Index { object, index })
        }
        _ => Err(get_custom_error(
            "invalid assignment target".to_string(),
            span,
        )),
    }
}

fn build_ast_from_primary(pair: Pair<Rule>) -> BuildResult<ExpressionType> {
    let span = pair.as_span();
    Ok(match pair.as_rule() {
        Rule::float => ExpressionType::Literal(LiteralType::FloatLiteral(
            pair.as_str()
                .parse::<f64>()
                .map_err(|e| get_custom_error(e.to_string(), span))?,
        )),
        Rule::integer => ExpressionType::Literal(LiteralType::IntegerLiteral(
            pair.as_str()
                .parse::<i64>()
                .map_err(|_| get_custom_error("integer literal too large".to_string(), span))?,
        )),
        Rule::string => ExpressionType::Literal(LiteralType::StringLiteral(
            build_string_value(pair)?,
        )),
        Rule::boolean => ExpressionType::Literal(LiteralType::BooleanLiteral(pair.as_str() == "true")),
        Rule::null => ExpressionType::Literal(LiteralType::NullLiteral),
        Rule::identifier => ExpressionType::Identifier(pair.as_str().to_string()),
        Rule::arrow_function => {
            ExpressionType::FunctionExpression(Rc::new(build_ast_from_arrow_function(pair)?))
        }
        Rule::function_expression => {
            ExpressionType::FunctionExpression(Rc::new(build_ast_from_function(pair)?))
        }
        Rule::list_comprehension => {
            let mut inner = pair.into_inner();
            let element = Box::new(build_ast_from_expression(next_pair(&mut inner, span)?)?);
            let clauses = build_ast_from_comprehension_clauses(inner)?;
            ExpressionType::ListComprehension { element, clauses }
        }
        Rule::map_comprehension => {
            let mut inner = pair.into_inner();
            let key = Box::new(build_ast_from_expression(next_pair(&mut inner, span)?)?);
            let value = Box::new(build_ast_from_expression(next_pair(&mut inner, span)?)?);
            let clauses = build_ast_from_comprehension_clauses(inner)?;
            ExpressionType::MapComprehension {
                key,
                value,
                clauses,
            }
        }
        Rule::array_literal => ExpressionType::ArrayExpression(
            pair.into_inner()
                .map(build_ast_from_expression)
                .collect::<BuildResult<Vec<_>>>()?,
        ),
        Rule::object_literal => {
            let mut properties = vec![];
            for property in pair.into_inner() {
                let property_span = property.as_span();
                let mut inner = property.into_inner();
                let key_pair = next_pair(&mut inner, property_span)?;
                let key = match key_pair.as_rule() {
                    Rule::string => PropertyKey::Name(build_string_value(key_pair)?),
                    Rule::integer | Rule::property_name => {
                        PropertyKey::Name(key_pair.as_str().to_string())
                    }
                    Rule::computed_key => {
                        let key_span = key_pair.as_span();
                        PropertyKey::Computed(build_ast_from_expression(next_pair(
                            &mut key_pair.into_inner(),
                            key_span,
                        )?)?)
                    }
                    _ => return Err(get_unexpected_error(&key_pair)),
                };
                let value = build_ast_from_expression(next_pair(&mut inner, property_span)?)?;
                properties.push((key, value));
            }
            ExpressionType::ObjectExpression(properties)
        }
        // Parenthesized expression.
        Rule::assignment | Rule::update | Rule::conditional => build_ast_from_expression(pair)?,
        _ => return Err(get_unexpected_error(&pair)),
    })
}

fn build_ast_from_comprehension_clauses(pairs: Pairs<Rule>) -> BuildResult<Vec<ComprehensionClause>> {
    let mut clauses = vec![];
    for clause in pairs {
        let span = clause.as_span();
        match clause.as_rule() {
            Rule::comprehension_for => {
                let mut inner = significant(clause);
                let target = build_ast_from_binding_target(next_pair(&mut inner, span)?)?;
                let iterable = build_ast_from_expression(next_pair(&mut inner, span)?)?;
                clauses.push(ComprehensionClause::For { target, iterable });
            }
            Rule::comprehension_if => {
                let mut inner = significant(clause);
                clauses.push(ComprehensionClause::If(build_ast_from_expression(
                    next_pair(&mut inner, span)?,
                )?));
            }
            _ => return Err(get_unexpected_error(&clause)),
        }
    }
    Ok(clauses)
}

fn build_string_value(pair: Pair<Rule>) -> BuildResult<String> {
    let span = pair.as_span();
    match pair.into_inner().next() {
        Some(raw) => unescape_string(raw.as_str()).map_err(|message| get_custom_error(message, span)),
        None => Ok(String::new()),
    }
}
