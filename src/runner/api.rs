//! Sandboxed script evaluation.
//!
//! Every [`Sandbox::run`] gets a fresh worker thread, scope arena and value
//! heap. The caller waits on a channel for at most the configured timeout;
//! on expiry it cancels the invocation and reports `TIMEOUT`. The worker
//! notices the cancellation at its next interrupt check and unwinds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;

use pest::error::{Error, ErrorVariant, LineColLocation};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::parser::{Rule, ScriptParser};
use crate::resolver::classifier::ScriptSource;
use crate::runner::ds::error::ErrorType;
use crate::runner::eval::run_program;
use crate::runner::plugin::config::SandboxConfig;
use crate::runner::plugin::registry::BuiltInRegistry;
use crate::runner::plugin::types::EvalContext;

pub const TIMEOUT_MESSAGE: &str = "TIMEOUT";

/// Shared flag telling a running invocation to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of one sandbox invocation. A failure carries the bare cause.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Runs scripts against a helper registry under the limits of a [`SandboxConfig`].
#[derive(Clone)]
pub struct Sandbox {
    config: SandboxConfig,
    registry: Arc<BuiltInRegistry>,
}

impl Sandbox {
    /// A sandbox exposing the standard helpers.
    pub fn new(config: SandboxConfig) -> Self {
        Sandbox::with_registry(config, BuiltInRegistry::shared_core())
    }

    pub fn with_registry(config: SandboxConfig, registry: Arc<BuiltInRegistry>) -> Self {
        Sandbox { config, registry }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn run(&self, source: &ScriptSource) -> Outcome {
        let id = Uuid::new_v4();
        let cancel = CancelToken::new();
        let (sender, receiver) = mpsc::channel();

        let worker_source = source.clone();
        let worker_cancel = cancel.clone();
        let registry = Arc::clone(&self.registry);
        let max_call_depth = self.config.max_call_depth;

        debug!(invocation = %id, "starting sandbox worker");
        let spawned = thread::Builder::new()
            .name(format!("sandbox-{}", id))
            .stack_size(self.config.stack_size)
            .spawn(move || {
                let mut ctx = EvalContext::new(registry, worker_cancel, max_call_depth);
                let outcome = execute(&worker_source, &mut ctx);
                // The caller may have stopped waiting.
                let _ = sender.send(outcome);
            });
        if let Err(e) = spawned {
            return Outcome::Failure(format!("could not start sandbox worker: {}", e));
        }

        let received = match self.config.timeout {
            Some(timeout) => receiver.recv_timeout(timeout),
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(outcome) => {
                debug!(invocation = %id, success = outcome.is_success(), "sandbox worker finished");
                outcome
            }
            Err(RecvTimeoutError::Timeout) => {
                cancel.cancel();
                warn!(invocation = %id, timeout = ?self.config.timeout, "script timed out");
                Outcome::Failure(TIMEOUT_MESSAGE.to_string())
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(invocation = %id, "sandbox worker stopped without a result");
                Outcome::Failure("sandbox worker stopped unexpectedly".to_string())
            }
        }
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Sandbox::new(SandboxConfig::default())
    }
}

fn execute(source: &ScriptSource, ctx: &mut EvalContext) -> Outcome {
    let program = match ScriptParser::parse_to_ast_from_str(&source.body) {
        Ok(program) => program,
        Err(e) => return Outcome::Failure(syntax_error_message(&e, source)),
    };
    match run_program(&program, ctx).and_then(|value| value.to_json_in(ctx)) {
        Ok(value) => Outcome::Success(value),
        Err(ErrorType::Interrupted) => Outcome::Failure(TIMEOUT_MESSAGE.to_string()),
        Err(e) => Outcome::Failure(e.to_string()),
    }
}

/// Positions are reported against the original source, marker included.
/// Errors raised while building the tree carry their reason after the position.
pub fn syntax_error_message(error: &Error<Rule>, source: &ScriptSource) -> String {
    let (line, column) = match error.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };
    let column = if line == 1 {
        column + source.column_offset
    } else {
        column
    };
    let position = format!(
        "invalid syntax (line {}, column {})",
        line + source.line_offset,
        column
    );
    match &error.variant {
        ErrorVariant::CustomError { message } => format!("{}: {}", position, message),
        ErrorVariant::ParsingError { .. } => position,
    }
}
