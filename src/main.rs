//! dc-template-linter - Domain Connect template linter CLI

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dctlint::Result;
use dctlint::app::AppContext;
use dctlint::cli::output::{emit_json, robot_error};
use dctlint::cli::{Cli, codes};
use dctlint::lint::Severity;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            if cli.robot {
                let code = match &e {
                    dctlint::LintError::Config(_) => "config",
                    _ => "error",
                };
                if let Err(write_err) = emit_json(&robot_error(code, e.to_string())) {
                    tracing::error!(error = %e, write_error = %write_err, "run aborted");
                }
            } else {
                tracing::error!(error = %e, "run aborted");
            }
            ExitCode::from(Severity::Fatal.exit_bits())
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    if let Some(code) = cli.explain {
        codes::explain(code, cli.robot)?;
        return Ok(0);
    }
    if cli.list_codes {
        codes::list_codes(cli.robot)?;
        return Ok(0);
    }

    let ctx = AppContext::from_cli(cli)?;
    if cli.list_rules {
        codes::list_rules(&ctx.engine()?, cli.robot)?;
        return Ok(0);
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "dc-template-linter version");
    let combined = ctx.run()?;
    Ok(ctx.config.lint.tolerate.exit_status(combined))
}

fn init_tracing(cli: &Cli) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.loglevel.directive()));

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        // Colors only on a terminal
        let ansi = std::io::stderr().is_terminal();
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_ansi(ansi).with_writer(std::io::stderr))
            .init();
    }
}
