//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use url::Url;

use crate::config::schema::ProxyConfig;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ProxyConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn validate_config(config: &ProxyConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(format!(
            "listener.bind_address is not a socket address: {}",
            config.listener.bind_address
        ));
    }

    let public_origin = &config.listener.public_origin;
    if !public_origin.is_empty() {
        match Url::parse(public_origin) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => errors.push(format!(
                "listener.public_origin is not an http(s) origin: {public_origin}"
            )),
        }
    }

    for (token, destination) in &config.shortcuts {
        if Url::parse(destination).is_err() {
            errors.push(format!("shortcut {token} is not an absolute URL: {destination}"));
        }
    }

    for shortcut in &config.home.shortcuts {
        if Url::parse(&shortcut.url).is_err() {
            errors.push(format!(
                "home shortcut {} is not an absolute URL: {}",
                shortcut.name, shortcut.url
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
