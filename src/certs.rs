// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Certificate issuance boundary.
//!
//! The reconciler asks for exactly one operation: make sure a fresh
//! certificate exists for a domain. The [`IssueCert`] trait keeps that seam
//! mockable; [`CertbotIssuer`] is the production implementation, driving the
//! certbot webroot flow and installing the resulting artifacts into the
//! serving directory.
//!
//! The same operation covers first issuance and renewal: certbot is
//! idempotent per domain and reissues when asked again for an existing
//! lineage.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::Settings;
use crate::errors::CertError;

/// Certificate artifact file names produced by the ACME client.
const CERT_ARTIFACTS: [&str; 2] = ["fullchain.pem", "privkey.pem"];

/// Capability to issue or renew a certificate for a domain.
#[async_trait]
pub trait IssueCert: Send + Sync {
    /// Obtain a valid certificate for `name` and install it for serving.
    ///
    /// # Errors
    ///
    /// Returns a [`CertError`] if the ACME exchange fails or the resulting
    /// artifacts cannot be installed. On error no certificate state has
    /// changed from the caller's point of view.
    async fn create_cert(&self, name: &str) -> Result<(), CertError>;
}

/// Production issuer that shells out to certbot.
///
/// Issuance uses the HTTP-01 webroot challenge: the web server already
/// serves `<cert_web_root>` for `/.well-known/acme-challenge/`, so no
/// listener needs to be spawned here. After a successful exchange the
/// `fullchain.pem` / `privkey.pem` pair is copied from certbot's live
/// directory into `<cert_base_dir>/<domain>/`, which is where the web
/// server picks it up.
pub struct CertbotIssuer {
    command: String,
    web_root: PathBuf,
    email: String,
    le_base_dir: PathBuf,
    cert_base_dir: PathBuf,
}

impl CertbotIssuer {
    /// Build an issuer from validated settings.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            command: settings.certbot_command.clone(),
            web_root: settings.cert_web_root.clone(),
            email: settings.cert_email.clone(),
            le_base_dir: settings.le_cert_base_dir.clone(),
            cert_base_dir: settings.cert_base_dir.clone(),
        }
    }

    /// Copy the issued artifacts from the certbot live directory into the
    /// serving directory.
    async fn install_artifacts(&self, name: &str) -> Result<(), CertError> {
        let live_dir = self.le_base_dir.join("live").join(name);
        let target_dir = self.cert_base_dir.join(name);

        for artifact in CERT_ARTIFACTS {
            let source = live_dir.join(artifact);
            if !source.exists() {
                return Err(CertError::MissingArtifacts {
                    name: name.to_string(),
                    path: live_dir.display().to_string(),
                });
            }
        }

        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|source| CertError::InstallFailed {
                name: name.to_string(),
                source,
            })?;

        for artifact in CERT_ARTIFACTS {
            tokio::fs::copy(live_dir.join(artifact), target_dir.join(artifact))
                .await
                .map_err(|source| CertError::InstallFailed {
                    name: name.to_string(),
                    source,
                })?;
        }

        Ok(())
    }
}

#[async_trait]
impl IssueCert for CertbotIssuer {
    async fn create_cert(&self, name: &str) -> Result<(), CertError> {
        debug!(domain = %name, command = %self.command, "Requesting certificate");

        let output = Command::new(&self.command)
            .arg("certonly")
            .arg("--non-interactive")
            .arg("--agree-tos")
            .arg("--keep-until-expiring")
            .arg("--webroot")
            .arg("-w")
            .arg(&self.web_root)
            .arg("-d")
            .arg(name)
            .arg("--email")
            .arg(&self.email)
            .arg("--config-dir")
            .arg(&self.le_base_dir)
            .output()
            .await
            .map_err(|source| CertError::SpawnFailed {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CertError::IssuanceFailed {
                name: name.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        self.install_artifacts(name).await
    }
}
