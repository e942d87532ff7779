//! Single-use integration tests.

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use signurl_core::{Parameters, SingleUseToken, VerificationErrorKind};

    use crate::{generator, verifier};

    #[test]
    fn test_should_invalidate_url_once_token_changes() {
        let url = generator("1234")
            .single_use("route1", Parameters::new(), "token1")
            .unwrap();
        assert!(url.is_single_use());

        let verifier = verifier("1234");
        assert!(verifier.verify(&url, Some(&"token1".into())).is_ok());

        let err = verifier.verify(&url, Some(&"token2".into())).unwrap_err();
        assert_eq!(err.kind(), VerificationErrorKind::AlreadyUsed);
        assert_eq!(err.message_key(), "URL has already been used.");
    }

    #[test]
    fn test_should_produce_same_url_for_same_token() {
        let first = generator("1234")
            .single_use("route1", Parameters::new(), "token1")
            .unwrap();
        let second = generator("1234")
            .single_use("route1", Parameters::new(), "token1")
            .unwrap();
        let other = generator("1234")
            .single_use("route1", Parameters::new(), "token2")
            .unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn test_should_follow_lazy_token_state() {
        // The token is the user's current password hash.
        let password_hash = Arc::new(Mutex::new("password-hash-1".to_owned()));

        let source = Arc::clone(&password_hash);
        let token = SingleUseToken::lazy(move || source.lock().unwrap().clone());

        let url = generator("1234")
            .build("confirm")
            .param("id", 9)
            .single_use(token.clone())
            .create()
            .unwrap();

        let verifier = verifier("1234");
        assert!(verifier.is_verified(&url, Some(&token)));

        *password_hash.lock().unwrap() = "password-hash-2".to_owned();
        assert_eq!(
            verifier.verify(&url, Some(&token)).unwrap_err().kind(),
            VerificationErrorKind::AlreadyUsed
        );
    }

    #[test]
    fn test_should_fail_when_single_use_expectation_differs() {
        let verifier = verifier("1234");

        let single_use = generator("1234")
            .single_use("route1", Parameters::new(), "token1")
            .unwrap();
        let err = verifier.verify(&single_use, None).unwrap_err();
        assert_eq!(err.kind(), VerificationErrorKind::Failed);
        assert_eq!(err.message_key(), "URL Verification failed.");

        let plain = generator("1234").generate("route1", Parameters::new()).unwrap();
        let err = verifier.verify(&plain, Some(&"token1".into())).unwrap_err();
        assert_eq!(err.kind(), VerificationErrorKind::Failed);
    }

    #[test]
    fn test_should_treat_empty_token_as_reusable_url() {
        let url = generator("1234")
            .single_use("route1", Parameters::new(), "")
            .unwrap();
        assert!(!url.is_single_use());
        assert!(!url.as_str().contains("_token="));

        let verifier = verifier("1234");
        assert!(verifier.verify(&url, None).is_ok());
        assert!(verifier.verify(&url, Some(&"".into())).is_ok());
        assert_eq!(
            verifier.verify(&url, Some(&"token1".into())).unwrap_err().kind(),
            VerificationErrorKind::Failed
        );
    }

    #[test]
    fn test_should_check_signature_then_expiry_then_single_use() {
        let url = generator("1234")
            .build("route1")
            .expires("yesterday")
            .unwrap()
            .single_use("token1")
            .create()
            .unwrap();
        let token2 = SingleUseToken::from("token2");

        assert_eq!(
            verifier("4321").verify(&url, Some(&token2)).unwrap_err().kind(),
            VerificationErrorKind::SignatureMismatch
        );
        assert_eq!(
            verifier("1234").verify(&url, Some(&token2)).unwrap_err().kind(),
            VerificationErrorKind::Expired
        );

        let fresh = generator("1234")
            .build("route1")
            .expires("tomorrow")
            .unwrap()
            .single_use("token1")
            .create()
            .unwrap();
        assert_eq!(
            verifier("1234").verify(&fresh, Some(&token2)).unwrap_err().kind(),
            VerificationErrorKind::AlreadyUsed
        );
        assert!(verifier("1234").verify(&fresh, Some(&"token1".into())).is_ok());
    }
}
