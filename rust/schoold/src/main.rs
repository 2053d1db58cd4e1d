mod access;
mod audit;
mod authz;
mod config;
mod db;
mod error;
mod grading;
mod ipc;
mod registry;
mod results;
mod schedule;

use std::io::{self, BufRead, Write};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Config, LogFormat};

fn init_logging(format: LogFormat) {
    // stdout carries the protocol; logs go to stderr only.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.with_ansi(false).init(),
        LogFormat::Json => builder.json().with_current_span(true).init(),
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::from(Cli::parse());
    init_logging(config.log_format);

    let mut state = ipc::AppState::new(config, Box::new(audit::TracingAudit))?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        workspace = ?state.workspace,
        "schoold ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{resp}");
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    tracing::info!("schoold shutting down");
    Ok(())
}
