//! Environment handling for config values.
//!
//! `${VAR_NAME}` in any string value is replaced at load time; only uppercase
//! `[A-Z_][A-Z0-9_]*` names are matched and `$${VAR}` stays a literal `${VAR}`.
//! A few `TASKFLOW_*` variables also override fields after the file is read.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::schema::ClientConfig;

/// Either an escaped reference (group 1) or a real one (group 2).
static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\$\{([A-Z_][A-Z0-9_]*)\}|\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const ENV_API_URL: &str = "TASKFLOW_API_URL";
pub const ENV_SESSION_SCOPE: &str = "TASKFLOW_SESSION_SCOPE";
pub const ENV_TIMEOUT_SECS: &str = "TASKFLOW_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "TASKFLOW_LOG_LEVEL";

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references using the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references using `env`.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute(value, env, "")
}

fn substitute(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_str(s, env, path)?)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                let child = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                out.insert(key.clone(), substitute(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_str(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let replaced = REFERENCE_PATTERN.replace_all(s, |caps: &Captures| {
        if let Some(escaped) = caps.get(1) {
            return format!("${{{}}}", escaped.as_str());
        }
        let name = &caps[2];
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(replaced.into_owned())
}

/// Apply `TASKFLOW_*` overrides from the process environment.
pub fn apply_env_overrides(config: ClientConfig) -> ClientConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply `TASKFLOW_*` overrides from `env`. Unparseable numbers are ignored.
pub fn apply_env_overrides_with(mut config: ClientConfig, env: &HashMap<String, String>) -> ClientConfig {
    if let Some(url) = env.get(ENV_API_URL).filter(|v| !v.is_empty()) {
        debug!(var = ENV_API_URL, "Overriding API base URL from env");
        config.api_base_url = url.clone();
    }
    if let Some(scope) = env.get(ENV_SESSION_SCOPE).filter(|v| !v.is_empty()) {
        config.session_scope = scope.clone();
    }
    if let Some(secs) = env.get(ENV_TIMEOUT_SECS).and_then(|v| v.parse().ok()) {
        config.request_timeout_secs = secs;
    }
    if let Some(level) = env.get(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
        config.log_level = level.clone();
    }
    config
}
