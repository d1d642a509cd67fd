// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the certbot-backed certificate issuer.
//!
//! The ACME client is replaced with small shell scripts that either produce
//! the expected live-directory artifacts or fail, so the full
//! spawn/exit-code/install path is exercised without a real CA.

#[cfg(all(test, unix))]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use crate::certs::{CertbotIssuer, IssueCert};
    use crate::config::Settings;
    use crate::errors::CertError;

    fn settings(base: &Path, command: &str) -> Settings {
        Settings {
            master_ip: IpAddr::V4(Ipv4Addr::new(203, 0, 113, 10)),
            cert_base_dir: base.join("certs"),
            le_cert_base_dir: base.join("letsencrypt"),
            cert_web_root: base.join("webroot"),
            cert_email: "ops@example.com".to_string(),
            certbot_command: command.to_string(),
        }
    }

    fn write_script(path: &Path, body: &str) {
        std::fs::write(path, body).unwrap();
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }

    #[tokio::test]
    async fn test_successful_issuance_installs_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let live_dir = tmp.path().join("letsencrypt/live/example.com");
        let script = tmp.path().join("certbot.sh");
        write_script(
            &script,
            &format!(
                "#!/bin/sh\nmkdir -p '{0}'\n\
                 printf 'chain' > '{0}/fullchain.pem'\n\
                 printf 'key' > '{0}/privkey.pem'\nexit 0\n",
                live_dir.display()
            ),
        );

        let issuer = CertbotIssuer::new(&settings(tmp.path(), &script.display().to_string()));
        issuer.create_cert("example.com").await.unwrap();

        let installed = tmp.path().join("certs/example.com");
        assert_eq!(
            std::fs::read_to_string(installed.join("fullchain.pem")).unwrap(),
            "chain"
        );
        assert_eq!(
            std::fs::read_to_string(installed.join("privkey.pem")).unwrap(),
            "key"
        );
    }

    #[tokio::test]
    async fn test_nonzero_exit_reports_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("certbot.sh");
        write_script(&script, "#!/bin/sh\necho 'rate limited' >&2\nexit 1\n");

        let issuer = CertbotIssuer::new(&settings(tmp.path(), &script.display().to_string()));
        let err = issuer.create_cert("example.com").await.unwrap_err();

        match err {
            CertError::IssuanceFailed { name, code, stderr } => {
                assert_eq!(name, "example.com");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "rate limited");
            }
            other => panic!("expected IssuanceFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_without_artifacts_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("certbot.sh");
        write_script(&script, "#!/bin/sh\nexit 0\n");

        let issuer = CertbotIssuer::new(&settings(tmp.path(), &script.display().to_string()));
        let err = issuer.create_cert("example.com").await.unwrap_err();

        assert!(matches!(err, CertError::MissingArtifacts { .. }));
    }

    #[tokio::test]
    async fn test_missing_command_is_spawn_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("no-such-certbot");

        let issuer = CertbotIssuer::new(&settings(tmp.path(), &missing.display().to_string()));
        let err = issuer.create_cert("example.com").await.unwrap_err();

        assert!(matches!(err, CertError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_partial_artifacts_are_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let live_dir = tmp.path().join("letsencrypt/live/example.com");
        let script = tmp.path().join("certbot.sh");
        // fullchain.pem only, no private key.
        write_script(
            &script,
            &format!(
                "#!/bin/sh\nmkdir -p '{0}'\nprintf 'chain' > '{0}/fullchain.pem'\nexit 0\n",
                live_dir.display()
            ),
        );

        let issuer = CertbotIssuer::new(&settings(tmp.path(), &script.display().to_string()));
        let err = issuer.create_cert("example.com").await.unwrap_err();

        assert!(matches!(err, CertError::MissingArtifacts { .. }));
    }
}
