use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use rulecheck::{
    resolve_audit_paths, run_audit, DEFAULT_LEVEL_DATA, DEFAULT_LOCATIONS, DEFAULT_MECHANICS,
    LEVEL_DATA_ENV_VAR, LOCATIONS_ENV_VAR, MECHANICS_ENV_VAR, ROOT_ENV_VAR,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    match args.first().map(String::as_str) {
        None => {}
        Some("-h") | Some("--help") => {
            print_usage();
            return Ok(());
        }
        Some(other) => {
            return Err(format!(
                "unexpected argument '{other}' (rulecheck_cli is configured through the environment)\n\n{}",
                usage_text()
            ))
        }
    }

    let paths = resolve_audit_paths().map_err(|error| error.to_string())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = run_audit(&paths, &mut out).map_err(|error| error.to_string())?;
    out.flush()
        .map_err(|error| format!("failed to flush report: {error}"))?;

    info!(
        mapped = summary.mapped,
        canonical = summary.canonical,
        with_requirements = summary.with_requirements,
        unmapped_locations = summary.unmapped_locations,
        unmapped_mechanics = summary.unmapped_mechanics,
        "rule_audit_summary"
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

fn print_usage() {
    println!("{}", usage_text());
}

fn usage_text() -> String {
    [
        "rulecheck_cli - cross-check level data rules against tracked locations".to_string(),
        String::new(),
        "Usage:".to_string(),
        "  rulecheck_cli".to_string(),
        String::new(),
        "Environment:".to_string(),
        format!("  {ROOT_ENV_VAR}        project root (default: nearest ancestor with {DEFAULT_LEVEL_DATA})"),
        format!("  {LEVEL_DATA_ENV_VAR}  level data JSON (default: {DEFAULT_LEVEL_DATA})"),
        format!("  {LOCATIONS_ENV_VAR}   location name list (default: {DEFAULT_LOCATIONS})"),
        format!("  {MECHANICS_ENV_VAR}   mechanic mapping, .ts or .json (default: {DEFAULT_MECHANICS})"),
        "  RUST_LOG              log filter (default: info)".to_string(),
    ]
    .join("\n")
}
