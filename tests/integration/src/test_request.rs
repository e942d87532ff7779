//! Current-request and inbound request integration tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use signurl_core::{
        Parameters, ReferenceType, RequestStack, SignableRequest, SignedUrlConfig, SignedUrlError,
    };

    use crate::{generator, verifier};

    fn inbound(url: &str) -> http::Request<()> {
        let path_and_query = url.strip_prefix("http://localhost").unwrap();
        http::Request::builder()
            .uri(path_and_query)
            .header(http::header::HOST, "localhost")
            .body(())
            .unwrap()
    }

    #[test]
    fn test_should_verify_inbound_http_request() {
        let url = generator("1234")
            .generate("confirm", Parameters::new().with("id", 3).with("q", "a b"))
            .unwrap();

        let request = inbound(&url);
        assert_eq!(SignableRequest::from(&request).uri(), url);
        assert!(verifier("1234").is_verified(&request, None));

        let (parts, ()) = request.into_parts();
        assert!(verifier("1234").is_verified(&parts, None));
    }

    #[test]
    fn test_should_reject_inbound_request_for_other_host() {
        let url = generator("1234").generate("route1", Parameters::new()).unwrap();
        let path_and_query = url.strip_prefix("http://localhost").unwrap();
        let request = http::Request::builder()
            .uri(path_and_query)
            .header(http::header::HOST, "evil.example")
            .body(())
            .unwrap();

        assert!(!verifier("1234").is_verified(&request, None));
    }

    #[test]
    fn test_should_verify_path_signed_url_without_host() {
        let url = generator("1234")
            .build("route1")
            .reference_type(ReferenceType::AbsolutePath)
            .to_url()
            .unwrap();
        let request = http::Request::builder().uri(&url).body(()).unwrap();

        assert!(verifier("1234").is_verified(&request, None));
    }

    #[test]
    fn test_should_verify_current_request() {
        let stack = Arc::new(RequestStack::new());
        let verifier = verifier("1234").with_request_context(stack.clone());

        assert!(matches!(
            verifier.verify_current_request(None),
            Err(SignedUrlError::NoCurrentRequest)
        ));

        let url = generator("1234")
            .single_use("route1", Parameters::new(), "token1")
            .unwrap();
        stack.push(&url);

        assert!(verifier.verify_current_request(Some(&"token1".into())).is_ok());
        assert!(!verifier
            .is_current_request_verified(Some(&"token2".into()))
            .unwrap());

        stack.push("http://localhost/route1?_hash=forged");
        let err = verifier.verify_current_request(None).unwrap_err();
        assert_eq!(
            err.as_verification().map(|e| e.message_key()),
            Some("URL Verification failed.")
        );

        stack.pop();
        assert!(verifier.is_current_request_verified(Some(&"token1".into())).unwrap());
    }

    #[test]
    fn test_should_build_from_configuration() {
        let vars = [
            ("SIGNED_URL_SECRET", "1234"),
            ("SIGNED_URL_BASE_URL", "https://example.com"),
            ("SIGNED_URL_ROUTES", "route1=/route1,confirm=/users/{id}/confirm"),
        ];
        let config = SignedUrlConfig::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        })
        .unwrap();

        let (generator, verifier) = config.build().unwrap();
        let url = generator
            .generate("confirm", Parameters::new().with("id", 1))
            .unwrap();

        assert!(url.starts_with("https://example.com/users/1/confirm?_hash="));
        assert!(verifier.is_verified(&url, None));
        assert!(!crate::verifier("1234").is_verified(&url.replace("https", "http"), None));
    }
}
