//! Config subcommand handlers.

use std::fmt::Write;

use dialoguer::{Input, Select};
use fmc_core::DesiredConfiguration;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

// ── Helpers ─────────────────────────────────────────────────────────

fn quoted_list(names: &[String]) -> String {
    let items: Vec<String> = names.iter().map(|n| format!("\"{n}\"")).collect();
    format!("[{}]", items.join(", "))
}

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "controller = \"{}\"", p.controller);
        if let Some(ref domain) = p.domain {
            let _ = writeln!(out, "domain = \"{domain}\"");
        }
        if let Some(ref u) = p.username {
            let _ = writeln!(out, "username = \"{u}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref tm) = p.token_manager {
            let _ = writeln!(out, "token_manager = \"{tm}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(age) = p.token_max_age {
            let _ = writeln!(out, "token_max_age = {age}");
        }

        let d = &p.desired;
        if *d == DesiredConfiguration::default() {
            continue;
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}.desired]");
        for (key, value) in [
            ("device_group", &d.device_group),
            ("access_policy", &d.access_policy),
            ("nat_policy", &d.nat_policy),
        ] {
            if let Some(value) = value {
                let _ = writeln!(out, "{key} = \"{value}\"");
            }
        }
        for (key, names) in [
            ("security_zones", &d.security_zones),
            ("network_objects", &d.network_objects),
            ("host_objects", &d.host_objects),
        ] {
            if !names.is_empty() {
                let _ = writeln!(out, "{key} = {}", quoted_list(names));
            }
        }
    }

    out
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let available: Vec<_> = cfg.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Prompt for an optional value; blank input means unset.
fn prompt_optional(prompt: &str) -> Result<Option<String>, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_owned()))
}

/// Prompt for a comma-separated list of names.
fn prompt_names(prompt: &str) -> Result<Vec<String>, CliError> {
    Ok(prompt_optional(prompt)?
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default())
}

/// Prompt for a password and either store it in the keyring or return it
/// for the plaintext config.
fn prompt_password_storage(profile_name: &str) -> Result<Option<String>, CliError> {
    let pass = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }

    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        fmc_config::store_password(profile_name, &pass)?;
        eprintln!("   ✓ Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(pass))
    }
}

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("fmcctl configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let controller: String = Input::new()
        .with_prompt("Controller URL")
        .default("https://fmc.example.net".into())
        .interact_text()
        .map_err(prompt_err)?;

    let auth_choices = &["Username/Password", "Token manager service"];
    let auth_selection = Select::new()
        .with_prompt("Authentication method")
        .items(auth_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let (username, password, token_manager) = if auth_selection == 0 {
        let user: String = Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?;
        let password = prompt_password_storage(&profile_name)?;
        (Some(user), password, None)
    } else {
        let url: String = Input::new()
            .with_prompt("Token manager URL")
            .interact_text()
            .map_err(prompt_err)?;
        (None, None, Some(url))
    };

    eprintln!("\n   Desired configuration (leave blank to skip)");
    let desired = DesiredConfiguration {
        device_group: prompt_optional("Device group")?,
        access_policy: prompt_optional("Access policy")?,
        nat_policy: prompt_optional("NAT policy")?,
        security_zones: prompt_names("Security zones (comma separated)")?,
        network_objects: prompt_names("Network objects (comma separated)")?,
        host_objects: prompt_names("Host objects (comma separated)")?,
    };

    let profile = Profile {
        controller,
        username,
        password,
        token_manager,
        desired,
        ..Profile::default()
    };

    // Keep other profiles when re-running the wizard.
    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: fmcctl status --verify");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: fmcctl config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(profile_name, &cfg));
            }

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            fmc_config::store_password(&profile_name, &secret)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::config::Defaults;

    #[test]
    fn redacted_view_masks_password() {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "lab".to_owned(),
            Profile {
                controller: "https://fmc.lab".into(),
                username: Some("admin".into()),
                password: Some("hunter2".into()),
                desired: DesiredConfiguration {
                    device_group: Some("dg".into()),
                    security_zones: vec!["inside".into(), "outside".into()],
                    ..DesiredConfiguration::default()
                },
                ..Profile::default()
            },
        );
        let cfg = Config {
            default_profile: Some("lab".into()),
            defaults: Defaults::default(),
            profiles,
        };

        let shown = format_config_redacted(&cfg);
        assert!(shown.contains("password = \"****\""));
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("[profiles.lab.desired]"));
        assert!(shown.contains("security_zones = [\"inside\", \"outside\"]"));
    }

    #[test]
    fn empty_desired_section_is_omitted() {
        let mut profiles = BTreeMap::new();
        profiles.insert("a".to_owned(), Profile::default());
        let cfg = Config {
            default_profile: None,
            defaults: Defaults::default(),
            profiles,
        };
        assert!(!format_config_redacted(&cfg).contains(".desired]"));
    }

    #[test]
    fn unknown_profile_lists_alternatives() {
        let mut profiles = BTreeMap::new();
        profiles.insert("a".to_owned(), Profile::default());
        profiles.insert("b".to_owned(), Profile::default());
        let cfg = Config {
            default_profile: None,
            defaults: Defaults::default(),
            profiles,
        };
        match profile_not_found("c".into(), &cfg) {
            CliError::ProfileNotFound { available, .. } => assert_eq!(available, "a, b"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
