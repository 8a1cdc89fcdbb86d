//! Statement execution.

use crate::parser::ast::{
    BindingTarget, CatchClauseData, ExpressionType, ForInit, ProgramData, StatementType,
    VariableDeclarationData, VariableDeclarationKind,
};
use crate::parser::static_semantics::{contains_yield, hoisted_functions};
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::type_conversion::{to_boolean, to_iterable_items};
use crate::runner::ds::scope::{ScopeId, GLOBAL_SCOPE_ID};
use crate::runner::ds::value::ScriptValue;
use crate::runner::plugin::types::EvalContext;

use super::expression::{destructure, evaluate_expression};
use super::function::make_closure;
use super::types::{Completion, CompletionType, EvalResult, ValueResult};

/// Run a whole script as the body of an implicit function and produce its value.
///
/// A body that is a single expression yields that expression. A body containing
/// `yield` yields the list of values it produced. Anything else must `return`.
pub fn run_program(program: &ProgramData, ctx: &mut EvalContext) -> ValueResult {
    if let Some(expression) = program.as_single_expression() {
        return evaluate_expression(expression, ctx, GLOBAL_SCOPE_ID);
    }
    if contains_yield(&program.body) {
        ctx.begin_generator();
        let completion = execute_block_in_scope(&program.body, ctx, GLOBAL_SCOPE_ID);
        let yielded = ctx.finish_generator();
        check_loop_control(&completion?)?;
        return Ok(ScriptValue::new_list(yielded));
    }
    let completion = execute_block_in_scope(&program.body, ctx, GLOBAL_SCOPE_ID)?;
    match completion.completion_type {
        CompletionType::Return => Ok(completion.get_value()),
        CompletionType::Normal => Err(ErrorType::MissingReturn),
        _ => {
            check_loop_control(&completion)?;
            Err(ErrorType::MissingReturn)
        }
    }
}

/// `break`/`continue` that escaped every loop.
pub(crate) fn check_loop_control(completion: &Completion) -> Result<(), ErrorType> {
    match completion.completion_type {
        CompletionType::Break => Err(ErrorType::SyntaxError("'break' outside loop".to_string())),
        CompletionType::Continue => Err(ErrorType::SyntaxError(
            "'continue' not properly in loop".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Runs `f` inside a fresh child scope of `parent`, releasing it afterwards.
pub(crate) fn with_new_scope<T>(
    ctx: &mut EvalContext,
    parent: ScopeId,
    is_function: bool,
    f: impl FnOnce(&mut EvalContext, ScopeId) -> Result<T, ErrorType>,
) -> Result<T, ErrorType> {
    let scope = ctx.scopes.push(parent, is_function);
    let result = f(ctx, scope);
    ctx.scopes.release(scope);
    result
}

/// Execute statements in a new block scope.
pub fn execute_block(statements: &[StatementType], ctx: &mut EvalContext, parent: ScopeId) -> EvalResult {
    with_new_scope(ctx, parent, false, |ctx, scope| {
        execute_block_in_scope(statements, ctx, scope)
    })
}

/// Execute statements directly in `scope`, hoisting function declarations first.
pub fn execute_block_in_scope(
    statements: &[StatementType],
    ctx: &mut EvalContext,
    scope: ScopeId,
) -> EvalResult {
    for function in hoisted_functions(statements) {
        if let Some(name) = &function.name {
            let closure = make_closure(function, ctx, scope);
            ctx.scopes.declare(scope, name, closure, true);
        }
    }
    for stmt in statements {
        let completion = execute_statement(stmt, ctx, scope)?;
        if completion.is_abrupt() {
            return Ok(completion);
        }
    }
    Ok(Completion::normal())
}

/// Execute a statement and return its completion.
pub fn execute_statement(stmt: &StatementType, ctx: &mut EvalContext, scope: ScopeId) -> EvalResult {
    match stmt {
        StatementType::EmptyStatement => Ok(Completion::normal()),

        StatementType::ExpressionStatement(expression) => {
            evaluate_expression(expression, ctx, scope)?;
            Ok(Completion::normal())
        }

        StatementType::VariableDeclaration(declaration) => {
            execute_variable_declaration(declaration, ctx, scope)?;
            Ok(Completion::normal())
        }

        // Bound when the enclosing block was entered.
        StatementType::FunctionDeclaration(_) => Ok(Completion::normal()),

        StatementType::ImportStatement { .. } => Err(ErrorType::ImportError),

        StatementType::IfStatement {
            test,
            consequent,
            alternate,
        } => {
            if to_boolean(&evaluate_expression(test, ctx, scope)?) {
                execute_block(consequent, ctx, scope)
            } else if let Some(alternate) = alternate {
                execute_block(alternate, ctx, scope)
            } else {
                Ok(Completion::normal())
            }
        }

        StatementType::WhileStatement { test, body } => execute_while_statement(test, body, ctx, scope),

        StatementType::ForStatement {
            init,
            test,
            update,
            body,
        } => with_new_scope(ctx, scope, false, |ctx, loop_scope| {
            execute_for_statement(init.as_ref(), test.as_ref(), update.as_ref(), body, ctx, loop_scope)
        }),

        StatementType::ForOfStatement {
            target,
            iterable,
            body,
        } => execute_for_of_statement(target, iterable, body, ctx, scope),

        StatementType::ReturnStatement(argument) => {
            let value = match argument {
                Some(argument) => evaluate_expression(argument, ctx, scope)?,
                None => ScriptValue::Null,
            };
            Ok(Completion::return_value(value))
        }

        StatementType::YieldStatement(argument) => {
            let value = match argument {
                Some(argument) => evaluate_expression(argument, ctx, scope)?,
                None => ScriptValue::Null,
            };
            ctx.yield_value(value)?;
            Ok(Completion::normal())
        }

        StatementType::BreakStatement => Ok(Completion::break_completion()),

        StatementType::ContinueStatement => Ok(Completion::continue_completion()),

        StatementType::ThrowStatement(argument) => {
            let value = evaluate_expression(argument, ctx, scope)?;
            Err(ErrorType::Thrown(value))
        }

        StatementType::TryStatement {
            block,
            handler,
            finalizer,
        } => execute_try_statement(block, handler.as_ref(), finalizer.as_deref(), ctx, scope),
    }
}

fn execute_variable_declaration(
    declaration: &VariableDeclarationData,
    ctx: &mut EvalContext,
    scope: ScopeId,
) -> Result<(), ErrorType> {
    let target_scope = match declaration.kind {
        VariableDeclarationKind::Var => ctx.scopes.function_scope(scope),
        VariableDeclarationKind::Let | VariableDeclarationKind::Const => scope,
    };
    let mutable = declaration.kind != VariableDeclarationKind::Const;
    for declarator in &declaration.declarations {
        let value = match &declarator.init {
            Some(init) => evaluate_expression(init, ctx, scope)?,
            None => ScriptValue::Null,
        };
        bind_target(&declarator.id, value, ctx, target_scope, mutable)?;
    }
    Ok(())
}

/// Declares the names of a binding target in `scope`.
pub(crate) fn bind_target(
    target: &BindingTarget,
    value: ScriptValue,
    ctx: &mut EvalContext,
    scope: ScopeId,
    mutable: bool,
) -> Result<(), ErrorType> {
    match target {
        BindingTarget::Identifier(name) => {
            ctx.scopes.declare(scope, name, value, mutable);
        }
        BindingTarget::ArrayPattern(names) => {
            for (name, item) in names.iter().zip(destructure(&value, names.len())?) {
                ctx.scopes.declare(scope, name, item, mutable);
            }
        }
    }
    Ok(())
}

/// Loop body result. `None` means keep looping.
fn loop_body_outcome(completion: Completion) -> Option<Completion> {
    match completion.completion_type {
        CompletionType::Normal | CompletionType::Continue => None,
        CompletionType::Break => Some(Completion::normal()),
        CompletionType::Return => Some(completion),
    }
}

fn execute_while_statement(
    test: &ExpressionType,
    body: &[StatementType],
    ctx: &mut EvalContext,
    scope: ScopeId,
) -> EvalResult {
    loop {
        ctx.check_interrupt()?;
        if !to_boolean(&evaluate_expression(test, ctx, scope)?) {
            return Ok(Completion::normal());
        }
        if let Some(done) = loop_body_outcome(execute_block(body, ctx, scope)?) {
            return Ok(done);
        }
    }
}

fn execute_for_statement(
    init: Option<&ForInit>,
    test: Option<&ExpressionType>,
    update: Option<&ExpressionType>,
    body: &[StatementType],
    ctx: &mut EvalContext,
    scope: ScopeId,
) -> EvalResult {
    match init {
        Some(ForInit::VariableDeclaration(declaration)) => {
            execute_variable_declaration(declaration, ctx, scope)?
        }
        Some(ForInit::Expression(expression)) => {
            evaluate_expression(expression, ctx, scope)?;
        }
        None => {}
    }
    loop {
        ctx.check_interrupt()?;
        if let Some(test) = test {
            if !to_boolean(&evaluate_expression(test, ctx, scope)?) {
                return Ok(Completion::normal());
            }
        }
        if let Some(done) = loop_body_outcome(execute_block(body, ctx, scope)?) {
            return Ok(done);
        }
        if let Some(update) = update {
            evaluate_expression(update, ctx, scope)?;
        }
    }
}

fn execute_for_of_statement(
    target: &BindingTarget,
    iterable: &ExpressionType,
    body: &[StatementType],
    ctx: &mut EvalContext,
    scope: ScopeId,
) -> EvalResult {
    let items = to_iterable_items(&evaluate_expression(iterable, ctx, scope)?)?;
    for item in items {
        ctx.check_interrupt()?;
        let completion = with_new_scope(ctx, scope, false, |ctx, iteration_scope| {
            bind_target(target, item, ctx, iteration_scope, true)?;
            execute_block_in_scope(body, ctx, iteration_scope)
        })?;
        if let Some(done) = loop_body_outcome(completion) {
            return Ok(done);
        }
    }
    Ok(Completion::normal())
}

fn execute_try_statement(
    block: &[StatementType],
    handler: Option<&CatchClauseData>,
    finalizer: Option<&[StatementType]>,
    ctx: &mut EvalContext,
    scope: ScopeId,
) -> EvalResult {
    let mut result = execute_block(block, ctx, scope);

    if let Some(handler) = handler {
        if matches!(&result, Err(e) if e.is_catchable()) {
            if let Err(error) = result {
                result = with_new_scope(ctx, scope, false, |ctx, catch_scope| {
                    if let Some(param) = &handler.param {
                        ctx.scopes.declare(catch_scope, param, error.to_value(), true);
                    }
                    execute_block_in_scope(&handler.body, ctx, catch_scope)
                });
            }
        }
    }

    if let Some(finalizer) = finalizer {
        // An interrupted invocation unwinds without running cleanup code.
        if let Err(ErrorType::Interrupted) = result {
            return result;
        }
        let completion = execute_block(finalizer, ctx, scope)?;
        if completion.is_abrupt() {
            return Ok(completion);
        }
    }

    result
}
