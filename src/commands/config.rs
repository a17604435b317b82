//! Config command handler.
//!
//! Displays and modifies gitspaces configuration values.

use crate::config::{
    config_path, load_config, load_config_from_path, save_config, validate_config, Config,
    BASE_URL_ENV,
};
use crate::error::Result;
use crate::output::{print_success, print_warning, BOLD, CYAN, GRAY, RESET, YELLOW};

/// Display the effective configuration.
///
/// Shows the configuration in TOML format, followed by a warning when the
/// values are not yet usable (for example an empty account).
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(GitspaceError)` if the configuration cannot be read
pub fn config_display_command() -> Result<()> {
    let path = config_path()?;
    let existed = path.exists();

    println!("{BOLD}# Gitspaces config{RESET}");
    println!("{GRAY}# {}{RESET}", path.display());
    if !existed {
        println!("{YELLOW}# (file did not exist, created with defaults){RESET}");
    }
    if std::env::var(BASE_URL_ENV).is_ok() {
        println!("{YELLOW}# (base_url overridden by {}){RESET}", BASE_URL_ENV);
    }
    println!();

    let config = load_config()?;
    print_config_as_toml(&config);

    if let Err(e) = validate_config(&config) {
        println!();
        print_warning(&e.to_string());
    }

    Ok(())
}

/// Set one configuration key and save the file.
///
/// Environment overrides are not written back: the file is read as-is,
/// changed, and saved.
///
/// # Returns
///
/// * `Ok(())` on success
/// * `Err(GitspaceError)` for an unknown key or an unparsable value
pub fn config_set_command(key: &str, value: &str) -> Result<()> {
    let path = config_path()?;
    let mut config = if path.exists() {
        load_config_from_path(&path)?
    } else {
        Config::default()
    };

    config.set_value(key, value)?;
    save_config(&config)?;
    print_success(&format!("Set {} = {}", key, value));

    if let Err(e) = validate_config(&config) {
        print_warning(&e.to_string());
    }
    Ok(())
}

/// Print a Config struct as valid TOML format.
fn print_config_as_toml(config: &Config) {
    for line in config_to_toml_lines(config) {
        let (key, value) = line.split_once(" = ").unwrap_or((line.as_str(), ""));
        println!("{CYAN}{key}{RESET} = {value}");
    }
}

fn config_to_toml_lines(config: &Config) -> Vec<String> {
    vec![
        format!("base_url = {:?}", config.base_url),
        format!("console_url = {:?}", config.console_url),
        format!("account = {:?}", config.account),
        format!("org = {:?}", config.org),
        format!("project = {:?}", config.project),
        format!("token_env = {:?}", config.token_env),
        format!("request_timeout_secs = {}", config.request_timeout_secs),
        format!("poll_interval_ms = {}", config.poll_interval_ms),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_lines_parse_back() {
        let mut config = Config::default();
        config.account = "acct".to_string();
        config.project = "proj".to_string();

        let text = config_to_toml_lines(&config).join("\n");
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_lines_cover_every_key() {
        let lines = config_to_toml_lines(&Config::default());
        for key in crate::config::VALID_KEYS {
            assert!(
                lines.iter().any(|l| l.starts_with(&format!("{} = ", key))),
                "missing {}",
                key
            );
        }
    }
}
