//! `taskflow-config`: client configuration management.
//!
//! Provides:
//! - Typed config schema with defaults for every field
//! - YAML read/write (atomic rename on write)
//! - `${ENV_VAR}` substitution and `TASKFLOW_*` overrides
//! - Validation with per-field errors and warnings

pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use env::{
    apply_env_overrides, apply_env_overrides_with, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::ClientConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Result};

/// Validate a loaded config, logging every finding. Warnings are logged;
/// the first validation error fails.
///
/// Kept apart from [`load_config`] so a caller can install its logger (whose
/// level comes from the config) before the findings are reported.
pub fn prepare(config: ClientConfig) -> Result<ClientConfig> {
    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }

    Ok(config)
}
