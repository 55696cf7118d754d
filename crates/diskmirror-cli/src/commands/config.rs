//! Config command - View and check the diskmirror configuration
//!
//! Provides the `diskmirror config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON, token masked)
//! 2. Validates the configuration file and reports errors
//! 3. Prints where the default configuration file lives

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use diskmirror_core::config::{Config, ValidationError};
use tracing::info;

use crate::output::{get_formatter, plural, OutputFormat};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
    /// Print the default configuration file path
    Path,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(&self, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(format, config_path),
            ConfigCommand::Validate => self.execute_validate(format, config_path),
            ConfigCommand::Path => self.execute_path(format),
        }
    }

    fn execute_show(&self, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
        let formatter = get_formatter(format);
        let (config, config_path) = Config::load_from(config_path)?;
        let config = config.redacted();

        info!(config_path = %config_path.display(), "Showing configuration");

        if format.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    fn execute_validate(&self, format: OutputFormat, config_path: Option<&Path>) -> Result<()> {
        let formatter = get_formatter(format);
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(Config::default_path);

        // Load explicitly: a missing or broken file is itself a finding.
        let config = match Config::load(&config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                let message = if config_path.exists() {
                    format!("{:#}", e)
                } else {
                    "Configuration file not found".to_string()
                };

                if format.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [message],
                    }));
                } else {
                    formatter.error(&message);
                    formatter.info(&format!("File: {}", config_path.display()));
                }
                anyhow::bail!("Configuration is not valid");
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = config.validate();

        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "config_path": config_path.display().to_string(),
                "errors": error_strings(&errors),
            }));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!("Configuration has {}:", plural(errors.len(), "error")));
            formatter.info(&format!("File: {}", config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Configuration is not valid")
        }
    }

    fn execute_path(&self, format: OutputFormat) -> Result<()> {
        let path = Config::default_path();
        if format.is_json() {
            get_formatter(format).print_json(&serde_json::json!({
                "config_path": path.display().to_string(),
                "exists": path.exists(),
            }));
        } else {
            println!("{}", path.display());
        }
        Ok(())
    }
}

fn error_strings(errors: &[ValidationError]) -> Vec<String> {
    errors.iter().map(ToString::to_string).collect()
}
