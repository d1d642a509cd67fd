// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the boundary error types.

#[cfg(test)]
mod tests {
    use crate::errors::{CertError, ConfigError, Error, ResolveError};

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingVariable { name: "MASTER_IP" };
        assert_eq!(
            err.to_string(),
            "Required environment variable 'MASTER_IP' is not set"
        );

        let err = ConfigError::InvalidValue {
            name: "CERT_EMAIL",
            reason: "'x' is not an email address".to_string(),
        };
        assert!(err.to_string().contains("CERT_EMAIL"));
        assert!(err.to_string().contains("not an email address"));
    }

    #[test]
    fn test_resolve_error_name_accessor() {
        let cases = [
            ResolveError::NotFound {
                name: "a.example.com".to_string(),
            },
            ResolveError::Timeout {
                name: "a.example.com".to_string(),
            },
            ResolveError::Unreachable {
                name: "a.example.com".to_string(),
                reason: "connection refused".to_string(),
            },
        ];

        for err in cases {
            assert_eq!(err.name(), "a.example.com");
        }
    }

    #[test]
    fn test_cert_error_display_includes_stderr() {
        let err = CertError::IssuanceFailed {
            name: "example.com".to_string(),
            code: Some(1),
            stderr: "rateLimited".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("example.com"));
        assert!(msg.contains("rateLimited"));
    }

    #[test]
    fn test_composite_error_conversions() {
        let err: Error = ConfigError::MissingVariable { name: "MASTER_IP" }.into();
        assert!(matches!(err, Error::Config(_)));

        let err: Error = ResolveError::Timeout {
            name: "example.com".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Resolve(_)));
        // Transparent variants surface the inner message unchanged.
        assert_eq!(err.to_string(), "Resolution of 'example.com' timed out");
    }
}
