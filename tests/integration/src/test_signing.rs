//! Signature integration tests.

#[cfg(test)]
mod tests {
    use signurl_core::{
        Parameters, ReferenceType, SignedUrlError, VerificationError, VerificationErrorKind,
    };

    use crate::{generator, verifier};

    #[test]
    fn test_should_verify_url_signed_with_same_secret() {
        let url = generator("1234").generate("route1", Parameters::new()).unwrap();
        assert!(verifier("1234").verify(&url, None).is_ok());
    }

    #[test]
    fn test_should_reject_url_signed_with_other_secret() {
        let url = generator("1234").generate("route1", Parameters::new()).unwrap();

        let err = verifier("4321").verify(&url, None).unwrap_err();
        assert_eq!(err.kind(), VerificationErrorKind::SignatureMismatch);
        assert_eq!(err.message_key(), "URL Verification failed.");
        assert_eq!(err.url(), url);
    }

    #[test]
    fn test_should_round_trip_parameters_that_need_encoding() {
        let params = Parameters::new()
            .with("id", 42)
            .with("q", "a b&c=d/é")
            .with("flag", true)
            .with("ratio", 0.5);

        let url = generator("s3cr3t").generate("confirm", params).unwrap();
        assert!(url.starts_with("http://localhost/users/42/confirm?q="));
        assert!(verifier("s3cr3t").is_verified(&url, None));
    }

    #[test]
    fn test_should_reject_any_modified_query_value() {
        let url = generator("1234")
            .generate(
                "download",
                Parameters::new().with("name", "report.pdf").with("v", 2),
            )
            .unwrap();

        let verifier = verifier("1234");
        for tampered in [
            url.replace("report.pdf", "secret.pdf"),
            url.replace("v=2", "v=3"),
            url.replace("http://localhost", "http://evil.example"),
            url.replace("v=2", "v=2&extra=1"),
        ] {
            assert_ne!(tampered, url);
            assert_eq!(
                verifier.verify(&tampered, None).unwrap_err().kind(),
                VerificationErrorKind::SignatureMismatch,
                "{tampered} should not verify"
            );
        }
    }

    #[test]
    fn test_should_reject_modified_hash() {
        let url = generator("1234").generate("route1", Parameters::new()).unwrap();
        let (base, hash) = url.split_once("_hash=").unwrap();
        let flipped = if hash.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{base}_hash={flipped}{}", &hash[1..]);

        assert!(!verifier("1234").is_verified(&tampered, None));
        assert!(!verifier("1234").is_verified(format!("{base}_hash="), None));
    }

    #[test]
    fn test_should_sign_deterministically() {
        let params = || Parameters::new().with("id", 7).with("lang", "en");
        assert_eq!(
            generator("1234").generate("confirm", params()).unwrap(),
            generator("1234").generate("confirm", params()).unwrap()
        );
        assert_ne!(
            generator("1234").generate("confirm", params()).unwrap(),
            generator("4321").generate("confirm", params()).unwrap()
        );
    }

    #[test]
    fn test_should_verify_every_reference_type() {
        for reference_type in [
            ReferenceType::AbsoluteUrl,
            ReferenceType::AbsolutePath,
            ReferenceType::NetworkPath,
            ReferenceType::RelativePath,
        ] {
            let url = generator("1234")
                .build("confirm")
                .param("id", 1)
                .reference_type(reference_type)
                .to_url()
                .unwrap();
            assert!(
                verifier("1234").is_verified(&url, None),
                "{reference_type:?}: {url}"
            );
        }
    }

    #[test]
    fn test_should_ignore_fragment() {
        let url = generator("1234").generate("route1", Parameters::new()).unwrap();
        assert!(verifier("1234").is_verified(format!("{url}#section"), None));
    }

    #[test]
    fn test_should_report_unknown_route() {
        let result = generator("1234").generate("nope", Parameters::new());
        assert!(matches!(result, Err(SignedUrlError::Route(_))));
    }

    #[test]
    fn test_should_expose_verification_error_through_crate_error() {
        let url = generator("1234").generate("route1", Parameters::new()).unwrap();
        let err: SignedUrlError = verifier("4321").verify(&url, None).unwrap_err().into();
        assert!(matches!(
            err.as_verification(),
            Some(VerificationError::SignatureMismatch { .. })
        ));
    }
}
