use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

pub mod audit;
pub mod content;

pub use audit::{
    build_rule_map, inheritable_side_rules, resolve_mechanic, summarize, unmapped_locations,
    write_report, AuditOutcome, AuditSummary, DerivedRuleMap, MechanicResolution,
    UnmappedMechanic,
};
pub use content::{
    load_level_data, load_location_names, load_mechanic_table, normalize_label,
    AuditInputError, CanonicalLocationNames, InputErrorCode, LevelData, MechanicTable,
    SourceLocation,
};

pub const ROOT_ENV_VAR: &str = "RULECHECK_ROOT";
pub const LEVEL_DATA_ENV_VAR: &str = "RULECHECK_LEVEL_DATA";
pub const LOCATIONS_ENV_VAR: &str = "RULECHECK_LOCATIONS";
pub const MECHANICS_ENV_VAR: &str = "RULECHECK_MECHANICS";

pub const DEFAULT_LEVEL_DATA: &str = "CelesteLevelData.json";
pub const DEFAULT_LOCATIONS: &str = "src/Data/locations.ts";
pub const DEFAULT_MECHANICS: &str = "src/Logic/mechanicsMapping.ts";

#[derive(Debug, Clone)]
pub struct AuditPaths {
    pub root: PathBuf,
    pub level_data: PathBuf,
    pub location_names: PathBuf,
    pub mechanic_table: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current working directory: {0}")]
    CurrentDir(#[source] io::Error),
    #[error(
        "RULECHECK_ROOT is set but does not point to a project root: {path}\n\
A valid root must contain {marker}."
    )]
    InvalidEnvRoot { path: PathBuf, marker: &'static str },
    #[error(
        "Could not detect project root by walking upward from: {start_dir}\n\
Expected a directory containing {marker}.\n\
Set {env_var} explicitly, for example:\n\
PowerShell: $env:{env_var}=\"C:\\path\\to\\tracker\"\n\
Bash/zsh: export {env_var}=\"/path/to/tracker\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        marker: &'static str,
        env_var: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Input(#[from] AuditInputError),
    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
}

pub fn resolve_audit_paths() -> Result<AuditPaths, StartupError> {
    let cwd = env::current_dir().map_err(StartupError::CurrentDir)?;
    resolve_audit_paths_with(|var| env::var(var), &cwd)
}

/// Resolves input paths from `lookup` (an environment reader) starting the root search at `cwd`.
pub fn resolve_audit_paths_with<F>(lookup: F, cwd: &Path) -> Result<AuditPaths, StartupError>
where
    F: Fn(&'static str) -> Result<String, env::VarError>,
{
    let root = resolve_root(&lookup, cwd)?;
    let level_data = input_path(&lookup, &root, LEVEL_DATA_ENV_VAR, DEFAULT_LEVEL_DATA)?;
    let location_names = input_path(&lookup, &root, LOCATIONS_ENV_VAR, DEFAULT_LOCATIONS)?;
    let mechanic_table = input_path(&lookup, &root, MECHANICS_ENV_VAR, DEFAULT_MECHANICS)?;

    Ok(AuditPaths {
        root,
        level_data,
        location_names,
        mechanic_table,
    })
}

fn resolve_root<F>(lookup: &F, cwd: &Path) -> Result<PathBuf, StartupError>
where
    F: Fn(&'static str) -> Result<String, env::VarError>,
{
    match optional_var(lookup, ROOT_ENV_VAR)? {
        Some(value) => {
            let normalized = normalize_path(&cwd.join(value));
            if is_root_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    path: normalized,
                    marker: DEFAULT_LEVEL_DATA,
                })
            }
        }
        None => cwd
            .ancestors()
            .find(|candidate| is_root_marker(candidate))
            .map(normalize_path)
            .ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(cwd),
                marker: DEFAULT_LEVEL_DATA,
                env_var: ROOT_ENV_VAR,
            }),
    }
}

fn input_path<F>(
    lookup: &F,
    root: &Path,
    var: &'static str,
    default: &str,
) -> Result<PathBuf, StartupError>
where
    F: Fn(&'static str) -> Result<String, env::VarError>,
{
    let relative = optional_var(lookup, var)?.unwrap_or_else(|| default.to_string());
    Ok(root.join(relative))
}

fn optional_var<F>(lookup: &F, var: &'static str) -> Result<Option<String>, StartupError>
where
    F: Fn(&'static str) -> Result<String, env::VarError>,
{
    match lookup(var) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value.trim().to_string())),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(StartupError::EnvVar { var, source }),
    }
}

fn is_root_marker(path: &Path) -> bool {
    path.join(DEFAULT_LEVEL_DATA).is_file()
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Loads all three inputs, then builds the rule map and writes the report to `out`.
///
/// Nothing is written unless every input loads.
pub fn run_audit<W: Write>(paths: &AuditPaths, out: &mut W) -> Result<AuditSummary, AuditError> {
    info!(
        root = %paths.root.display(),
        level_data = %paths.level_data.display(),
        location_names = %paths.location_names.display(),
        mechanic_table = %paths.mechanic_table.display(),
        "audit_inputs_resolved"
    );
    let levels = load_level_data(&paths.level_data)?;
    let names = load_location_names(&paths.location_names)?;
    let table = load_mechanic_table(&paths.mechanic_table)?;

    let outcome = build_rule_map(&levels, &names, &table);
    write_report(&outcome, &names, out).map_err(AuditError::Output)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn no_env(_: &'static str) -> Result<String, env::VarError> {
        Err(env::VarError::NotPresent)
    }

    fn fixture_root(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("docs")
            .join("fixtures")
            .join("rule_audit_v1")
            .join(name)
    }

    fn fixture_paths(name: &str) -> AuditPaths {
        resolve_audit_paths_with(no_env, &fixture_root(name)).expect("fixture paths")
    }

    #[test]
    fn root_marker_requires_level_data() {
        let cwd = env::current_dir().expect("cwd");
        assert!(!is_root_marker(&cwd.join("definitely_not_a_marker")));
    }

    #[test]
    fn root_is_found_by_walking_upward() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join(DEFAULT_LEVEL_DATA), "{}").expect("write");
        let nested = temp.path().join("src").join("Data");
        fs::create_dir_all(&nested).expect("mkdir");

        let paths = resolve_audit_paths_with(no_env, &nested).expect("paths");
        assert_eq!(paths.root, normalize_path(temp.path()));
        assert!(paths.location_names.ends_with(DEFAULT_LOCATIONS));
        assert!(paths.mechanic_table.ends_with(DEFAULT_MECHANICS));
    }

    #[test]
    fn env_overrides_apply_relative_to_root() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join(DEFAULT_LEVEL_DATA), "{}").expect("write");
        let root = temp.path().to_string_lossy().to_string();

        let paths = resolve_audit_paths_with(
            |var| match var {
                ROOT_ENV_VAR => Ok(root.clone()),
                MECHANICS_ENV_VAR => Ok("data/mechanics.json".to_string()),
                _ => Err(env::VarError::NotPresent),
            },
            Path::new("/"),
        )
        .expect("paths");
        assert_eq!(
            paths.mechanic_table,
            normalize_path(temp.path()).join("data/mechanics.json")
        );
    }

    #[test]
    fn env_root_without_marker_is_rejected() {
        let temp = TempDir::new().expect("temp");
        let root = temp.path().to_string_lossy().to_string();
        let err = resolve_audit_paths_with(
            |var| match var {
                ROOT_ENV_VAR => Ok(root.clone()),
                _ => Err(env::VarError::NotPresent),
            },
            temp.path(),
        )
        .expect_err("invalid root");
        assert!(matches!(err, StartupError::InvalidEnvRoot { .. }));
    }

    #[test]
    fn missing_root_reports_env_var() {
        let temp = TempDir::new().expect("temp");
        let err = resolve_audit_paths_with(no_env, temp.path()).expect_err("no root");
        match err {
            StartupError::RootNotFound { env_var, .. } => assert_eq!(env_var, ROOT_ENV_VAR),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fixture_run_reports_every_section() {
        let mut out = Vec::<u8>::new();
        let summary = run_audit(&fixture_paths("pass_01_basic"), &mut out).expect("audit");
        let text = String::from_utf8(out).expect("utf8");

        assert_eq!(summary.canonical, 8);
        assert_eq!(summary.mapped, 6);
        assert_eq!(summary.unmapped_locations, 2);
        assert_eq!(summary.unmapped_mechanics, 1);
        assert_eq!(summary.with_requirements, 2);
        assert!(text.contains("Forsaken City B - Level Clear => <none>"));
        assert!(text.contains(
            r#"example entries ["Forsaken City A - Room 1 Strawberry", "Celestial Resort A - Room a-01 Strawberry"]"#
        ));
        assert!(text.contains(
            r#"sample unmapped ["Forsaken City B - Crystal Heart", "Mirror Temple A - Crystal Heart"]"#
        ));
        assert!(text.contains(
            r#"Celestial Resort A - Room a-01 Strawberry => ["hasFrontDoorKey", "hasFireAndIceBalls"]"#
        ));
        assert!(text.contains(r#"unmapped mechanics examples [("Wind", "Forsaken City C - Crystal Heart")]"#));
    }

    #[test]
    fn missing_input_fails_before_report() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join(DEFAULT_LEVEL_DATA), r#"{"levels":[]}"#).expect("write");
        let paths = resolve_audit_paths_with(no_env, temp.path()).expect("paths");

        let mut out = Vec::<u8>::new();
        let err = run_audit(&paths, &mut out).expect_err("missing names file");
        match err {
            AuditError::Input(input) => {
                assert_eq!(input.code, InputErrorCode::ReadFile);
                assert!(input.file_path.ends_with(DEFAULT_LOCATIONS));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(out.is_empty());
    }
}
