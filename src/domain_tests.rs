// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the domain record model.

#[cfg(test)]
mod tests {
    use crate::domain::{CertStatus, Domain};
    use chrono::{Duration, Utc};

    #[test]
    fn test_cert_status_roundtrip() {
        assert_eq!(CertStatus::Unset.as_i32(), 0);
        assert_eq!(CertStatus::Issued.as_i32(), 1);
        assert_eq!(CertStatus::from_i32(0), CertStatus::Unset);
        assert_eq!(CertStatus::from_i32(1), CertStatus::Issued);
    }

    #[test]
    fn test_cert_status_nonzero_is_issued() {
        // Legacy rows may carry values other than 0/1.
        assert_eq!(CertStatus::from_i32(2), CertStatus::Issued);
        assert_eq!(CertStatus::from_i32(-1), CertStatus::Issued);
    }

    #[test]
    fn test_new_domain_is_due_immediately() {
        let now = Utc::now();
        let domain = Domain::new("example.com", now);

        assert_eq!(domain.name, "example.com");
        assert!(!domain.stopped);
        assert_eq!(domain.ip_errs, 0);
        assert_eq!(domain.cert_status, CertStatus::Unset);
        assert!(domain.cert_date.is_none());
        assert!(domain.is_due(now));
    }

    #[test]
    fn test_is_due_respects_schedule() {
        let now = Utc::now();
        let mut domain = Domain::new("example.com", now);

        domain.next_ip_check = now + Duration::minutes(5);
        assert!(!domain.is_due(now));

        domain.next_ip_check = now - Duration::minutes(5);
        assert!(domain.is_due(now));
    }

    #[test]
    fn test_stopped_domain_is_never_due() {
        let now = Utc::now();
        let mut domain = Domain::new("example.com", now);
        domain.stopped = true;

        assert!(!domain.is_due(now));
    }

    #[test]
    fn test_renewal_due_at_30_days() {
        let now = Utc::now();
        let mut domain = Domain::new("example.com", now);
        domain.cert_status = CertStatus::Issued;

        domain.cert_date = Some(now - Duration::days(29));
        assert!(!domain.cert_due_for_renewal(now));

        domain.cert_date = Some(now - Duration::days(30));
        assert!(domain.cert_due_for_renewal(now));

        domain.cert_date = Some(now - Duration::days(31));
        assert!(domain.cert_due_for_renewal(now));
    }

    #[test]
    fn test_unset_cert_is_never_renewable() {
        let now = Utc::now();
        let mut domain = Domain::new("example.com", now);
        domain.cert_date = Some(now - Duration::days(365));

        assert_eq!(domain.cert_status, CertStatus::Unset);
        assert!(!domain.cert_due_for_renewal(now));
    }

    #[test]
    fn test_domain_serializes_to_json() {
        let now = Utc::now();
        let mut domain = Domain::new("example.com", now);
        domain.cert_status = CertStatus::Issued;
        domain.cert_date = Some(now);

        let value = serde_json::to_value(&domain).unwrap();
        assert_eq!(value["name"], "example.com");
        assert_eq!(value["stopped"], false);
        assert_eq!(value["cert_status"], "issued");

        let back: Domain = serde_json::from_value(value).unwrap();
        assert_eq!(back, domain);
    }

    #[test]
    fn test_issued_cert_without_date_renews_immediately() {
        let now = Utc::now();
        let mut domain = Domain::new("example.com", now);
        domain.cert_status = CertStatus::Issued;
        domain.cert_date = None;

        assert!(domain.cert_due_for_renewal(now));
    }
}
