//! Configuration inspection commands.

use clap::{Args, Subcommand};

use clubdesk_core::config::{AppConfig, BackendMode};
use clubdesk_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
    /// Validate the effective configuration
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.backend.anon_key = mask_secret(&shown.backend.anon_key);
            for seed in &mut shown.backend.seed_users {
                seed.password = mask_secret(&seed.password);
            }
            match format {
                OutputFormat::Json => output::print_item(&shown, format),
                OutputFormat::Table => {
                    output::print_kv("backend.mode", &format!("{:?}", shown.backend.mode));
                    output::print_kv("backend.url", or_dash(&shown.backend.url));
                    output::print_kv("backend.anon_key", or_dash(&shown.backend.anon_key));
                    output::print_kv(
                        "backend.timeout_seconds",
                        &shown.backend.timeout_seconds.to_string(),
                    );
                    output::print_kv(
                        "backend.seed_users",
                        &shown.backend.seed_users.len().to_string(),
                    );
                    output::print_kv(
                        "auth.password_min_length",
                        &shown.auth.password_min_length.to_string(),
                    );
                    output::print_kv(
                        "auth.password_min_strength",
                        &shown.auth.password_min_strength.to_string(),
                    );
                    output::print_kv(
                        "session.profile_recheck_seconds",
                        &shown.session.profile_recheck_seconds.to_string(),
                    );
                    output::print_kv("logging.level", &shown.logging.level);
                    output::print_kv("logging.format", &shown.logging.format);
                }
            }
        }
        ConfigCommand::Validate => {
            config.validate()?;
            output::print_success("Configuration is valid");
            if config.backend.mode == BackendMode::Memory {
                output::print_warning(
                    "backend.mode = \"memory\": nothing is persisted between runs",
                );
            }
        }
    }
    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

/// Keep the first four characters of a secret.
fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "");
        assert_eq!(mask_secret("eyJhbGciOi"), "eyJh****");
        assert_eq!(mask_secret("ab"), "ab****");
    }
}
