//! CLI for resolving configuration documents.
//!
//! Usage:
//!   resolvent <file.json>              # Resolve every entry of a JSON object
//!   resolvent - --verbose              # Read stdin, print resolution records
//!   resolvent -e "<( 5 + 27"           # Evaluate one script

use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use resolvent::runner::plugin::config::SandboxConfig;
use resolvent::{Resolver, ResolverContainer, Sandbox};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "resolvent")]
#[command(about = "Resolve configuration entries that may hold sandboxed scripts")]
#[command(version)]
struct Cli {
    /// JSON file holding an object of entries (`-` reads stdin)
    #[arg(required_unless_present = "eval")]
    file: Option<String>,

    /// Evaluate a single script instead (the `<(` marker is optional)
    #[arg(short, long, conflicts_with = "file")]
    eval: Option<String>,

    /// Print resolution records for script entries
    #[arg(short, long)]
    verbose: bool,

    /// Per-script deadline in seconds
    #[arg(short, long)]
    timeout: Option<f64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let sandbox = Sandbox::new(sandbox_config(cli.timeout)?);

    match (cli.eval, cli.file) {
        (Some(script), _) => eval_script(&script, sandbox),
        (None, Some(file)) => resolve_document(&file, sandbox, cli.verbose),
        (None, None) => bail!("either FILE or --eval is required"),
    }
}

fn sandbox_config(timeout: Option<f64>) -> Result<SandboxConfig> {
    let config = SandboxConfig::new();
    match timeout {
        None => Ok(config),
        Some(secs) if secs.is_nan() || secs <= 0.0 => {
            bail!("timeout must be a positive number of seconds, got {}", secs)
        }
        Some(secs) => config
            .with_timeout_secs(secs)
            .with_context(|| format!("timeout of {} seconds is out of range", secs)),
    }
}

fn eval_script(script: &str, sandbox: Sandbox) -> Result<()> {
    let text = if Resolver::contains_code(&Value::String(script.to_string())) {
        script.to_string()
    } else {
        format!("<({}", script)
    };
    let mut resolver = Resolver::with_sandbox(Value::String(text), sandbox);
    match resolver.evaluate() {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
        None => bail!("{}", resolver.first_msg().unwrap_or("script failed")),
    }
}

fn resolve_document(file: &str, sandbox: Sandbox, verbose: bool) -> Result<()> {
    let text = if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("could not read stdin")?;
        buf
    } else {
        fs::read_to_string(file).with_context(|| format!("could not read '{}'", file))?
    };
    let document: Value =
        serde_json::from_str(&text).with_context(|| format!("'{}' is not valid JSON", file))?;
    let mut container = ResolverContainer::from_value_with(&document, &sandbox)?;
    let resolved = container.to_json(verbose)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timeout_option() {
        assert_eq!(sandbox_config(None).unwrap().timeout, None);
        assert_eq!(
            sandbox_config(Some(0.25)).unwrap().timeout,
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_bad_timeout_option_is_an_error() {
        for secs in [0.0, -2.0, f64::NAN, f64::INFINITY, 1e30] {
            assert!(sandbox_config(Some(secs)).is_err(), "accepted {}", secs);
        }
        let message = format!("{:#}", sandbox_config(Some(1e30)).unwrap_err());
        assert!(message.contains("is out of range"), "unexpected message {:?}", message);
    }
}
