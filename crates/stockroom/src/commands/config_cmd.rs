//! Config subcommand handlers.

use dialoguer::{Input, Select};

use stockroom_core::FavoritesPolicy;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

pub const KNOWN_KEYS: &str = "api_url, timeout, insecure, ca_cert, store_path, favorites_policy";

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Apply one `config set` assignment to a profile.
pub fn apply_setting(profile: &mut Profile, key: &str, value: &str) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            url::Url::parse(value).map_err(|e| invalid("api_url", format!("invalid URL: {e}")))?;
            profile.api_url = value.to_owned();
        }
        "timeout" => profile.timeout = Some(config::parse_timeout(value)?.as_secs()),
        "insecure" => {
            profile.insecure = Some(
                value
                    .parse()
                    .map_err(|_| invalid("insecure", "must be 'true' or 'false'"))?,
            );
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "store_path" | "store-path" => profile.store_path = Some(value.into()),
        "favorites_policy" | "favorites-policy" => {
            let policy: FavoritesPolicy = value
                .parse()
                .map_err(|_| invalid("favorites_policy", "must be 'confirmed' or 'optimistic'"))?;
            profile.favorites_policy = Some(policy);
        }
        other => {
            return Err(invalid(
                other,
                format!("unknown config key '{other}'. Valid keys: {KNOWN_KEYS}"),
            ));
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("{c:#?}\n# {e}")),
                |c| config::active_profile_name(global, c),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            apply_setting(profile, &key, &value)?;

            config::save_config(&cfg)?;
            output::success(
                &format!("Set {key} on profile '{profile_name}'"),
                &global.color,
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let active = config::active_profile_name(global, &cfg);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: stockroom config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if *name == active { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::success(
                &format!("Default profile set to '{name}'"),
                &global.color,
                global.quiet,
            );
            Ok(())
        }
    }
}

/// Interactive wizard: one profile, written as the default.
fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("stockroom configuration");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(stockroom_config::DEFAULT_PROFILE.into())
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("Catalog API URL")
        .default(stockroom_core::DEFAULT_API_URL.into())
        .validate_with(|s: &String| url::Url::parse(s).map(drop).map_err(|e| e.to_string()))
        .interact_text()
        .map_err(prompt_err)?;

    let policies = &[
        "Optimistic: keep local favorites even if the server fails",
        "Confirmed: roll back favorites the server rejects",
    ];
    let policy = match Select::new()
        .with_prompt("Favorites policy")
        .items(policies)
        .default(0)
        .interact()
        .map_err(prompt_err)?
    {
        0 => FavoritesPolicy::Optimistic,
        _ => FavoritesPolicy::Confirmed,
    };

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            api_url,
            favorites_policy: Some(policy),
            ..Profile::default()
        },
    );
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Next: stockroom login <email>");
    Ok(())
}
