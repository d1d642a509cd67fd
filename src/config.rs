// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Daemon configuration loaded from the environment.
//!
//! All values are read once at startup into an explicit [`Settings`] struct
//! and validated at construction time; nothing re-reads the environment
//! afterwards. A missing or malformed variable fails startup.

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::errors::ConfigError;

/// Name of the environment variable holding the expected master IP address.
pub const ENV_MASTER_IP: &str = "MASTER_IP";
/// Name of the environment variable holding the serving certificate directory.
pub const ENV_CERT_BASE_DIR: &str = "CERT_BASE_DIR";
/// Name of the environment variable holding the Let's Encrypt base directory.
pub const ENV_LE_CERT_BASE_DIR: &str = "LE_CERT_BASE_DIR";
/// Name of the environment variable holding the HTTP challenge web root.
pub const ENV_CERT_WEB_ROOT: &str = "CERT_WEB_ROOT";
/// Name of the environment variable holding the ACME registration email.
pub const ENV_CERT_EMAIL: &str = "CERT_EMAIL";
/// Optional override for the ACME client command (defaults to `certbot`).
pub const ENV_CERTBOT_COMMAND: &str = "CERTBOT_COMMAND";

/// Validated daemon settings.
///
/// Constructed once at startup via [`Settings::from_env`] and passed by
/// reference into the components that need it.
#[derive(Debug, Clone)]
pub struct Settings {
    /// IP address every managed domain is expected to resolve to.
    pub master_ip: IpAddr,
    /// Directory the web server reads certificates from
    /// (`<cert_base_dir>/<domain>/fullchain.pem`).
    pub cert_base_dir: PathBuf,
    /// Let's Encrypt configuration directory
    /// (live certificates under `<le_cert_base_dir>/live/<domain>/`).
    pub le_cert_base_dir: PathBuf,
    /// Web root served for `/.well-known/acme-challenge/` during issuance.
    pub cert_web_root: PathBuf,
    /// Contact email registered with the certificate authority.
    pub cert_email: String,
    /// ACME client command to execute.
    pub certbot_command: String,
}

impl Settings {
    /// Load and validate settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVariable`] if any required variable is
    /// unset or empty, and [`ConfigError::InvalidValue`] if `MASTER_IP` does
    /// not parse as an IP address or `CERT_EMAIL` is not a plausible email
    /// address.
    pub fn from_env() -> Result<Self, ConfigError> {
        let master_ip = required(ENV_MASTER_IP)?;
        let master_ip: IpAddr = master_ip
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                name: ENV_MASTER_IP,
                reason: format!("'{master_ip}' is not an IP address: {e}"),
            })?;

        let cert_base_dir = PathBuf::from(required(ENV_CERT_BASE_DIR)?);
        let le_cert_base_dir = PathBuf::from(required(ENV_LE_CERT_BASE_DIR)?);
        let cert_web_root = PathBuf::from(required(ENV_CERT_WEB_ROOT)?);

        let cert_email = required(ENV_CERT_EMAIL)?;
        validate_email(&cert_email)?;

        let certbot_command =
            env::var(ENV_CERTBOT_COMMAND).unwrap_or_else(|_| "certbot".to_string());

        Ok(Self {
            master_ip,
            cert_base_dir,
            le_cert_base_dir,
            cert_web_root,
            cert_email,
            certbot_command,
        })
    }
}

/// Read a required environment variable, rejecting unset and empty values.
fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVariable { name }),
    }
}

/// Minimal sanity check on the registration email.
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name: ENV_CERT_EMAIL,
            reason: format!("'{email}' is not an email address"),
        })
    }
}
