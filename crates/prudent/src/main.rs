mod settings;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use prudent_fetch::{EntityResolver, Error, ErrorHandler, ReqwestClient};

use crate::settings::Args;

/// Prints reports to stderr as they happen.
struct StderrHandler;

impl ErrorHandler for StderrHandler {
    fn warning(&self, error: &Error) { eprintln!("warning: {error}"); }

    fn fatal_error(&self, error: &Error) { eprintln!("error: {error}"); }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let settings = args.settings().inspect_err(|e| eprintln!("error: {e:#}"))?;
    let client = ReqwestClient::new(&settings.client.from_env())
        .context("failed to build HTTP client")
        .inspect_err(|e| eprintln!("error: {e:#}"))?;

    let mut resolver = EntityResolver::new(
        Arc::new(client),
        settings.resolver,
        Some(Arc::new(StderrHandler)),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for system_id in &args.system_ids {
        // Resolution errors have already been printed by the handler.
        let mut source = resolver.resolve(args.public_id.as_deref(), system_id)?;

        eprintln!(
            "{}: {:?}{}{}",
            source.uri,
            source.content_type.kind,
            source.charset().map(|c| format!(", charset {c}")).unwrap_or_default(),
            source.language.as_deref().map(|l| format!(", language {l}")).unwrap_or_default(),
        );

        io::copy(&mut source, &mut out)
            .with_context(|| format!("failed to read {}", source.uri))
            .inspect_err(|e| eprintln!("error: {e:#}"))?;
        source.close();
    }
    out.flush()?;

    Ok(())
}
