//! `streamgate check` - Validate a configuration file.
//!
//! Two passes:
//! - the raw YAML against the embedded `GatewayConfig` JSON schema,
//! - the parsed config's own [`GatewayConfig::validate`] findings.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use streamgate_core::GatewayConfig;
use streamgate_core::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};

const GATEWAY_CONFIG_SCHEMA: &str =
    include_str!("../../../../schemas/GatewayConfig.schema.json");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFinding {
    pub error: bool,
    /// Dotted field or JSON pointer location.
    pub location: String,
    pub message: String,
}

fn config_file(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Validate `content` and return every finding.
pub fn check_yaml(content: &str) -> Result<Vec<CheckFinding>> {
    let mut findings = Vec::new();

    let instance: serde_json::Value = match serde_yaml::from_str(content) {
        Ok(v) => v,
        Err(e) => {
            findings.push(CheckFinding {
                error: true,
                location: "(root)".into(),
                message: format!("Failed to parse YAML: {e}"),
            });
            return Ok(findings);
        }
    };
    // An empty file is a valid, all-defaults config.
    let instance = if instance.is_null() {
        serde_json::json!({})
    } else {
        instance
    };

    let schema: serde_json::Value =
        serde_json::from_str(GATEWAY_CONFIG_SCHEMA).context("embedded schema is not JSON")?;
    let validator = jsonschema::draft202012::options()
        .build(&schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile JSON schema: {e}"))?;

    for error in validator.iter_errors(&instance) {
        let path = error.instance_path().to_string();
        findings.push(CheckFinding {
            error: true,
            location: if path.is_empty() { "(root)".into() } else { path },
            message: error.to_string(),
        });
    }
    if !findings.is_empty() {
        return Ok(findings);
    }

    let config = GatewayConfig::from_yaml(content)?;
    findings.extend(config.validate().into_iter().map(|f| CheckFinding {
        error: f.is_error(),
        location: f.field,
        message: f.message,
    }));
    Ok(findings)
}

/// Print the findings for the config file; `Ok(false)` when any is an error.
pub fn run(config_path: Option<&Path>) -> Result<bool> {
    let path = config_file(config_path);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let findings = check_yaml(&content)?;
    let errors = findings.iter().filter(|f| f.error).count();

    println!("Checking {}", path.display());
    for finding in &findings {
        let level = if finding.error { "ERROR" } else { "WARN" };
        println!("  [{level}] {}: {}", finding.location, finding.message);
    }

    if errors > 0 {
        println!("\n{errors} error(s); configuration is not usable.");
        Ok(false)
    } else {
        println!("\nConfiguration OK ({} warning(s)).", findings.len());
        Ok(true)
    }
}
