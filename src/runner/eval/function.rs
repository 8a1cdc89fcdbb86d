//! Function call execution.

use std::rc::Rc;

use crate::parser::ast::FunctionData;
use crate::runner::ds::error::ErrorType;
use crate::runner::ds::operations::type_conversion::get_type;
use crate::runner::ds::scope::ScopeId;
use crate::runner::ds::value::{FunctionObject, ScriptValue};
use crate::runner::plugin::types::EvalContext;

use super::expression::evaluate_expression;
use super::statement::{check_loop_control, execute_block_in_scope, with_new_scope};
use super::types::{CompletionType, ValueResult};

/// Create a closure over `scope`. The scope stays alive for the rest of the invocation.
pub fn make_closure(data: &Rc<FunctionData>, ctx: &mut EvalContext, scope: ScopeId) -> ScriptValue {
    ctx.scopes.mark_captured(scope);
    ScriptValue::Function(Rc::new(FunctionObject {
        data: Rc::clone(data),
        env: scope,
    }))
}

/// Call any callable value: a script function or an allow-listed helper.
pub fn call_value(callee: &ScriptValue, args: Vec<ScriptValue>, ctx: &mut EvalContext) -> ValueResult {
    match callee {
        ScriptValue::Function(function) => call_function(function, args, ctx),
        ScriptValue::BuiltIn(name) => call_builtin(name, args, ctx),
        _ => Err(ErrorType::TypeError(format!(
            "'{}' object is not callable",
            get_type(callee)
        ))),
    }
}

/// Call a global helper from the registry.
pub fn call_builtin(name: &str, args: Vec<ScriptValue>, ctx: &mut EvalContext) -> ValueResult {
    ctx.check_interrupt()?;
    let registry = ctx.registry();
    match registry.get_function(name) {
        Some(builtin_fn) => builtin_fn.call(ctx, ScriptValue::Null, args),
        None => Err(ErrorType::ReferenceError(name.to_string())),
    }
}

/// Call a script function with the given arguments.
pub fn call_function(function: &FunctionObject, args: Vec<ScriptValue>, ctx: &mut EvalContext) -> ValueResult {
    ctx.check_interrupt()?;
    ctx.enter_call()?;
    let result = with_new_scope(ctx, function.env, true, |ctx, scope| {
        bind_parameters(function, args, ctx, scope)?;
        if function.data.is_generator {
            ctx.begin_generator();
            let completion = execute_block_in_scope(&function.data.body, ctx, scope);
            let yielded = ctx.finish_generator();
            check_loop_control(&completion?)?;
            Ok(ScriptValue::new_list(yielded))
        } else {
            let completion = execute_block_in_scope(&function.data.body, ctx, scope)?;
            match completion.completion_type {
                CompletionType::Return => Ok(completion.get_value()),
                CompletionType::Normal => Ok(ScriptValue::Null),
                _ => {
                    check_loop_control(&completion)?;
                    Ok(ScriptValue::Null)
                }
            }
        }
    });
    ctx.exit_call();
    result
}

fn bind_parameters(
    function: &FunctionObject,
    args: Vec<ScriptValue>,
    ctx: &mut EvalContext,
    scope: ScopeId,
) -> Result<(), ErrorType> {
    let params = &function.data.params;
    if args.len() > params.len() {
        return Err(ErrorType::TypeError(format!(
            "{}() takes {} argument(s) but {} were given",
            function.name(),
            params.len(),
            args.len()
        )));
    }
    let mut args = args.into_iter();
    for param in params {
        let value = match (args.next(), &param.default) {
            (Some(value), _) => value,
            // Defaults see the parameters bound before them.
            (None, Some(default)) => evaluate_expression(default, ctx, scope)?,
            (None, None) => {
                return Err(ErrorType::TypeError(format!(
                    "{}() missing required argument '{}'",
                    function.name(),
                    param.name
                )))
            }
        };
        ctx.scopes.declare(scope, &param.name, value, true);
    }
    Ok(())
}
