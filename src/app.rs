//! Multi-template run loop.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{LintError, Result};
use crate::lint::{CheckOutcome, Code, Diagnostic, LintEngine, Report, Severity};
use crate::probe::HttpLogoProbe;
use crate::template::to_canonical;
use crate::utils::{discover_templates, write_atomic};

/// Where the canonical form of a checked template goes
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Destination {
    /// Report findings only
    Nowhere,
    /// Print to standard output
    Stdout,
    /// Rewrite the template file
    InPlace,
}

pub struct AppContext {
    pub config: Config,
    /// Files and directories; empty means standard input
    pub inputs: Vec<PathBuf>,
    pub destination: Destination,
    pub increment: bool,
    pub robot: bool,
}

impl AppContext {
    /// Resolve configuration files, environment and flags into one context
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())?;
        if cli.cloudflare {
            config.lint.cloudflare = true;
        }
        if cli.logos {
            config.lint.check_logos = true;
        }
        if let Some(tolerate) = cli.tolerate {
            config.lint.tolerate = tolerate;
        }
        if let Some(indent) = cli.indent {
            config.output.indent = indent;
        }
        if let Some(ttl) = cli.ttl {
            config.output.ttl = ttl;
        }
        config.validate()?;

        let destination = if cli.inplace && !cli.paths.is_empty() {
            Destination::InPlace
        } else if cli.pretty {
            Destination::Stdout
        } else {
            Destination::Nowhere
        };
        if cli.inplace && cli.paths.is_empty() {
            tracing::warn!("standard input cannot be written back, ignoring --inplace");
        }

        Ok(Self {
            config,
            inputs: cli.paths.clone(),
            destination,
            increment: cli.increment,
            robot: cli.robot,
        })
    }

    /// Engine configured for this run
    pub fn engine(&self) -> Result<LintEngine> {
        let rules = self
            .config
            .validation_config(self.destination == Destination::InPlace);
        let check_logos = rules.check_logos;
        let engine = LintEngine::new(rules);
        if !check_logos {
            return Ok(engine);
        }
        let probe = HttpLogoProbe::new(self.config.probe.timeout, &self.config.probe.user_agent)?;
        Ok(engine.with_probe(Box::new(probe)))
    }

    /// Check every input and return the combined severity
    pub fn run(&self) -> Result<Severity> {
        let mut engine = self.engine()?;
        let mut stdout = std::io::stdout().lock();
        let mut combined = Severity::Ok;

        if self.inputs.is_empty() {
            tracing::debug!("reading from stdin");
            let mut source = Vec::new();
            let report = match std::io::stdin().lock().read_to_end(&mut source) {
                Ok(_) => self.process(&mut engine, &source, None, &mut stdout),
                Err(err) => cannot_open(Path::new("-"), &err),
            };
            combined = report.severity();
        } else {
            let files = discover_templates(&self.inputs);
            tracing::debug!(count = files.len(), "processing templates");
            for path in files {
                let report = match std::fs::read(&path) {
                    Ok(source) => self.process(&mut engine, &source, Some(&path), &mut stdout),
                    Err(err) => cannot_open(&path, &err),
                };
                combined = combined.combine(report.severity());
            }
        }

        tracing::debug!(severity = %combined, "run done");
        Ok(combined)
    }

    /// Check one template and route its canonical form
    pub fn process(
        &self,
        engine: &mut LintEngine,
        source: &[u8],
        path: Option<&Path>,
        stdout: &mut dyn Write,
    ) -> Report {
        let CheckOutcome { template, mut report } = engine.check_source(source, path);
        let Some(mut template) = template else {
            return report;
        };
        if self.destination == Destination::Nowhere {
            return report;
        }

        if self.increment {
            template.bump_version();
        }
        let name = path.map_or_else(|| "-".to_string(), |p| p.display().to_string());
        let canonical = match to_canonical(&template, self.config.output.indent) {
            Ok(canonical) => canonical,
            Err(err) => {
                report.push(
                    Diagnostic::error(Code::WriteFailed)
                        .with("template", &name)
                        .with("error", err),
                );
                return report;
            }
        };

        match (self.destination, path) {
            (Destination::InPlace, Some(path)) => {
                if let Err(err) = write_atomic(path, canonical.as_bytes()) {
                    report.push(write_failure(err).with("template", &name));
                }
            }
            _ => {
                if let Err(err) = stdout.write_all(canonical.as_bytes()) {
                    report.push(
                        Diagnostic::error(Code::WriteFailed)
                            .with("template", &name)
                            .with("error", err),
                    );
                }
            }
        }
        report
    }
}

fn cannot_open(path: &Path, err: &std::io::Error) -> Report {
    let mut report = Report::new();
    report.push(
        Diagnostic::error(Code::CannotOpen)
            .with("template", path.display())
            .with("error", err),
    );
    report
}

fn write_failure(err: LintError) -> Diagnostic {
    let diagnostic = match err {
        LintError::TempFile { .. } => Diagnostic::fatal(Code::TempFileFailed),
        LintError::Rename { .. } => Diagnostic::warn(Code::MoveFailed),
        _ => Diagnostic::fatal(Code::WriteFailed),
    };
    diagnostic.with("error", err)
}
