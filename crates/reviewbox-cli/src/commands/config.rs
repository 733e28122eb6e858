use std::path::Path;

use reviewbox_core::sync::GoogleFormFields;
use reviewbox_core::util::normalize_text_option;
use reviewbox_core::{AppConfig, RelayEndpoint};

use crate::cli::{ConfigCommands, ConfigInitArgs, RelayKind};
use crate::commands::common::load_config;
use crate::error::CliError;

const REDACTED: &str = "[REDACTED]";

pub fn run_config(command: ConfigCommands, config_path: &Path) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init(args) => run_config_init(args, config_path).map(|_| ()),
        ConfigCommands::Show => run_config_show(config_path),
    }
}

pub fn run_config_init(args: ConfigInitArgs, config_path: &Path) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::load_from_path(config_path)?;

    config.relay = resolve_relay_endpoint(&args, config.relay.take())?;
    if let Some(secret) = normalize_text_option(args.admin_secret) {
        config.admin_secret = Some(secret);
    }
    if let Some(format) = normalize_text_option(args.date_format) {
        config.date_format = format;
    }
    if let Some(secs) = args.sweep_interval_secs {
        config.sweep_interval_secs = secs;
    }
    if let Some(attempts) = args.max_relay_attempts {
        config.max_relay_attempts = attempts;
    }
    if let Some(secs) = args.relay_timeout_secs {
        config.relay_timeout_secs = secs;
    }

    let config = config.normalized()?;
    config.save_to_path(config_path)?;
    println!("Config written to {}", config_path.display());

    match &config.relay {
        Some(endpoint) => println!("Relaying reviews to {} ({})", endpoint.url(), endpoint.kind()),
        None => println!("No relay configured; reviews stay on this device."),
    }
    if config.admin_secret.is_none() {
        println!("No admin secret set; admin mode is unavailable.");
    }

    Ok(config)
}

pub fn run_config_show(config_path: &Path) -> Result<(), CliError> {
    let config = redacted(load_config(config_path)?);
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Copy of `config` that is safe to print.
pub fn redacted(mut config: AppConfig) -> AppConfig {
    if config.admin_secret.is_some() {
        config.admin_secret = Some(REDACTED.to_string());
    }
    config
}

/// Merge relay flags into the existing endpoint.
///
/// `--relay` starts a new endpoint (reusing the old URL and field ids where the
/// flags omit them); without it, `--relay-url` and field flags patch the
/// existing endpoint.
pub fn resolve_relay_endpoint(
    args: &ConfigInitArgs,
    existing: Option<RelayEndpoint>,
) -> Result<Option<RelayEndpoint>, CliError> {
    if args.no_relay {
        return Ok(None);
    }

    let explicit_url = normalize_text_option(args.relay_url.clone());
    let kind = match (args.relay, existing.as_ref()) {
        (Some(kind), _) => kind,
        (None, Some(endpoint)) => relay_kind_of(endpoint),
        (None, None) => {
            if explicit_url.is_some() {
                return Err(CliError::Config(
                    "--relay is required when no endpoint is configured yet".to_string(),
                ));
            }
            return Ok(None);
        }
    };

    let url = explicit_url
        .or_else(|| existing.as_ref().map(|endpoint| endpoint.url().to_string()))
        .ok_or_else(|| CliError::Config("--relay-url is required".to_string()))?;

    let endpoint = match kind {
        RelayKind::GoogleForms => {
            let previous = match existing {
                Some(RelayEndpoint::GoogleForms { fields, .. }) => Some(fields),
                _ => None,
            };
            RelayEndpoint::GoogleForms {
                url,
                fields: merge_google_fields(args, previous)?,
            }
        }
        RelayKind::Formspree => RelayEndpoint::Formspree { url },
        RelayKind::Json => RelayEndpoint::Json { url },
    };
    Ok(Some(endpoint))
}

const fn relay_kind_of(endpoint: &RelayEndpoint) -> RelayKind {
    match endpoint {
        RelayEndpoint::GoogleForms { .. } => RelayKind::GoogleForms,
        RelayEndpoint::Formspree { .. } => RelayKind::Formspree,
        RelayEndpoint::Json { .. } => RelayKind::Json,
    }
}

fn merge_google_fields(
    args: &ConfigInitArgs,
    previous: Option<GoogleFormFields>,
) -> Result<GoogleFormFields, CliError> {
    let pick = |explicit: Option<&str>, previous: Option<&String>, flag: &str| {
        normalize_text_option(explicit.map(str::to_string))
            .or_else(|| previous.cloned())
            .ok_or_else(|| CliError::Config(format!("--{flag} is required for google_forms")))
    };

    Ok(GoogleFormFields {
        name: pick(args.name_field.as_deref(), previous.as_ref().map(|f| &f.name), "name-field")?,
        rating: pick(
            args.rating_field.as_deref(),
            previous.as_ref().map(|f| &f.rating),
            "rating-field",
        )?,
        service: pick(
            args.service_field.as_deref(),
            previous.as_ref().map(|f| &f.service),
            "service-field",
        )?,
        text: pick(args.text_field.as_deref(), previous.as_ref().map(|f| &f.text), "text-field")?,
        date: pick(args.date_field.as_deref(), previous.as_ref().map(|f| &f.date), "date-field")?,
    })
}
