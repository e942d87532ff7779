//! Expiration integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, TimeDelta, Utc};
    use signurl_core::{
        Parameters, PathRouter, Signer, UrlGenerator, VerificationErrorKind, Verifier,
    };

    use crate::{NOW, generator, verifier, verifier_at};

    #[test]
    fn test_should_accept_until_and_including_expiry_second() {
        let url = generator("1234")
            .temporary("route1", Parameters::new(), 60_i64)
            .unwrap();
        assert_eq!(url.expires_at().map(|at| at.timestamp()), Some(NOW + 60));

        assert!(verifier_at("1234", NOW).is_verified(&url, None));
        assert!(verifier_at("1234", NOW + 60).is_verified(&url, None));

        let err = verifier_at("1234", NOW + 61).verify(&url, None).unwrap_err();
        assert_eq!(err.kind(), VerificationErrorKind::Expired);
        assert_eq!(err.message_key(), "URL has expired.");
        assert_eq!(err.expired_at().map(|at| at.timestamp()), Some(NOW + 60));
    }

    #[test]
    fn test_should_reject_url_that_expired_yesterday() {
        let url = generator("1234")
            .build("route1")
            .expires("yesterday")
            .unwrap()
            .create()
            .unwrap();

        let err = verifier("1234").verify(&url, None).unwrap_err();
        assert_eq!(err.kind(), VerificationErrorKind::Expired);

        // Midnight of the previous day, 2023-11-13T00:00:00Z.
        let expired_at = err.expired_at().unwrap();
        assert_eq!(expired_at.timestamp(), 1_699_833_600);
        assert_eq!(url.expires_at(), Some(expired_at));
    }

    #[test]
    fn test_should_resolve_yesterday_against_system_clock() {
        let router = PathRouter::localhost().with_route("route1", "/route1");
        let signer = Arc::new(Signer::new(Arc::new(router), "1234"));
        let url = UrlGenerator::new(Arc::clone(&signer))
            .temporary("route1", Parameters::new(), "yesterday")
            .unwrap();

        let err = Verifier::new(signer).verify(&url, None).unwrap_err();
        assert_eq!(err.kind(), VerificationErrorKind::Expired);

        let expired_at = err.expired_at().unwrap();
        let now = Utc::now();
        assert!(expired_at <= now - TimeDelta::days(1));
        assert!(expired_at > now - TimeDelta::days(2));
    }

    #[test]
    fn test_should_accept_every_expiry_form() {
        let at = DateTime::from_timestamp(NOW + 3_600, 0).unwrap();
        for url in [
            generator("1234").temporary("route1", Parameters::new(), at),
            generator("1234").temporary("route1", Parameters::new(), 3_600_i64),
            generator("1234").temporary("route1", Parameters::new(), TimeDelta::hours(1)),
            generator("1234").temporary("route1", Parameters::new(), "+1 hour"),
            generator("1234").temporary("route1", Parameters::new(), "@1700003600"),
            generator("1234").temporary("route1", Parameters::new(), "2023-11-14T23:13:20Z"),
        ] {
            let url = url.unwrap();
            assert_eq!(url.expires_at(), Some(at), "{url}");
            assert!(verifier("1234").is_verified(&url, None));
        }
    }

    #[test]
    fn test_should_reject_unparseable_expiry() {
        let result = generator("1234").temporary("route1", Parameters::new(), "whenever");
        assert_eq!(
            result.unwrap_err().to_string(),
            "\"whenever\" is not a valid expiration"
        );
    }

    #[test]
    fn test_should_not_allow_extending_expiry() {
        let url = generator("1234")
            .temporary("route1", Parameters::new(), -10_i64)
            .unwrap();
        let extended = url.as_str().replace(
            &format!("_expires={}", NOW - 10),
            &format!("_expires={}", NOW + 86_400),
        );

        assert_eq!(
            verifier("1234").verify(&extended, None).unwrap_err().kind(),
            VerificationErrorKind::SignatureMismatch
        );
    }

    #[test]
    fn test_should_serialize_signed_url_metadata() {
        let url = generator("1234")
            .temporary("route1", Parameters::new(), 100_i64)
            .unwrap();
        let json = serde_json::to_value(&url).unwrap();

        assert_eq!(json["url"], url.as_str());
        assert_eq!(json["expiresAt"], "2023-11-14T22:15:00Z");
        assert_eq!(json["singleUse"], false);
    }
}
