//! Header-based signing, checked by the reference verifier.

#[cfg(test)]
mod tests {
    use warden_hmac::{Algorithm, SignOptions, Signer, SignerError, SigningOptions};

    use crate::{Verifier, hmac_hex, init_tracing, test_nonce};

    const SECRET: &str = "integration-secret";

    fn header_signer(algorithm: &str) -> Signer {
        Signer::with_options(algorithm, &SignOptions::new().query_based(false)).unwrap()
    }

    fn verifier_for(signer: &Signer) -> Verifier {
        Verifier::new(SECRET, signer.defaults().clone())
    }

    #[test]
    fn test_should_verify_header_signature_for_every_algorithm() {
        init_tracing();

        for algorithm in Algorithm::ALL {
            let signer = header_signer(algorithm.name());
            let signed = signer
                .sign(
                    "https://api.example.com/orders?page=2&sort=desc",
                    SECRET,
                    &SignOptions::new().nonce(test_nonce()),
                )
                .unwrap();

            assert_eq!(signed.signature.len(), algorithm.hex_len());
            assert!(
                verifier_for(&signer).verify_header("GET", &signed.url, &signed.headers),
                "{algorithm} signature should verify"
            );
        }
    }

    #[test]
    fn test_should_verify_signed_headers_and_method() {
        init_tracing();

        let signer = header_signer("sha256");
        let options = SignOptions::new()
            .method("put")
            .nonce(test_nonce())
            .header("Content-Type", "application/json")
            .header("X-Request-Id", "42");
        let signed = signer
            .sign("https://api.example.com/items/7", SECRET, &options)
            .unwrap();

        let verifier = verifier_for(&signer)
            .signed_header("content-type")
            .signed_header("x-request-id");
        assert!(verifier.verify_header("PUT", &signed.url, &signed.headers));
        assert!(!verifier.verify_header("POST", &signed.url, &signed.headers));
    }

    #[test]
    fn test_should_reject_tampered_requests() {
        init_tracing();

        let signer = header_signer("sha1");
        let signed = signer
            .sign(
                "https://api.example.com/orders?page=2",
                SECRET,
                &SignOptions::new().nonce(test_nonce()),
            )
            .unwrap();
        let verifier = verifier_for(&signer);

        assert!(!verifier.verify_header(
            "GET",
            "https://api.example.com/orders?page=3",
            &signed.headers
        ));
        assert!(!verifier.verify_header(
            "GET",
            "https://api.example.com/admin?page=2",
            &signed.headers
        ));

        let mut headers = signed.headers.clone();
        headers.insert("x-hmac-nonce", "replayed".parse().unwrap());
        assert!(!verifier.verify_header("GET", &signed.url, &headers));

        let other = Verifier::new("other-secret", signer.defaults().clone());
        assert!(!other.verify_header("GET", &signed.url, &signed.headers));
    }

    #[test]
    fn test_should_ignore_query_order_when_verifying() {
        init_tracing();

        let signer = header_signer("md5");
        let signed = signer
            .sign(
                "https://api.example.com/search?q=rust&lang=en&q=hmac",
                SECRET,
                &SignOptions::new(),
            )
            .unwrap();

        assert!(verifier_for(&signer).verify_header(
            "GET",
            "https://api.example.com/search?lang=en&q=hmac&q=rust",
            &signed.headers
        ));
    }

    #[test]
    fn test_should_carry_date_in_alternate_header() {
        init_tracing();

        let signer = Signer::with_options(
            "sha1",
            &SignOptions::new()
                .auth_scheme("Warden")
                .query_based(false)
                .use_alternate_date_header(true),
        )
        .unwrap();
        let signed = signer
            .sign("https://api.example.com/", SECRET, &SignOptions::new())
            .unwrap();

        assert!(signed.headers.get(http::header::DATE).is_none());
        assert_eq!(
            signed.headers.get("X-Warden-Date").unwrap(),
            signed.date.as_str()
        );
        assert!(verifier_for(&signer).verify_header("GET", &signed.url, &signed.headers));
    }

    #[test]
    fn test_should_protect_auth_named_params_in_header_mode() {
        init_tracing();

        let signer = header_signer("sha1");
        let signed = signer
            .sign(
                "https://api.example.com/p?auth=alice&X-HMAC-Nonce=user-data",
                SECRET,
                &SignOptions::new().nonce(test_nonce()),
            )
            .unwrap();
        let verifier = verifier_for(&signer);

        assert!(verifier.verify_header("GET", &signed.url, &signed.headers));
        assert!(!verifier.verify_header(
            "GET",
            "https://api.example.com/p?auth=mallory&X-HMAC-Nonce=user-data",
            &signed.headers
        ));
    }

    #[test]
    fn test_should_match_sign_request_and_sign() {
        let signer = header_signer("sha1");
        let options = SignOptions::new()
            .date("15 01 2012 16:43:21")
            .nonce("fixed");

        let value = signer
            .sign_request("https://api.example.com/x?b=1&a=2", SECRET, &options)
            .unwrap();
        let signed = signer
            .sign("https://api.example.com/x?b=1&a=2", SECRET, &options)
            .unwrap();

        assert_eq!(signed.headers.get("Authorization").unwrap(), value.as_str());
        let canonical = "GET\ndate:SUN, 15 01 2012 16:43:21 GMT\nnonce:fixed\n/x?a=2&b=1";
        let expected = hmac_hex(Algorithm::Sha1, SECRET, canonical).unwrap();
        assert_eq!(value, format!("HMAC {expected}"));
    }

    #[test]
    fn test_should_share_one_signer_across_threads() {
        init_tracing();

        let signer = header_signer("sha256");
        let verifier = verifier_for(&signer);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let signer = &signer;
                    scope.spawn(move || {
                        signer
                            .sign(
                                &format!("https://api.example.com/jobs/{i}"),
                                SECRET,
                                &SignOptions::new().nonce(test_nonce()),
                            )
                            .unwrap()
                    })
                })
                .collect();

            for handle in handles {
                let signed = handle.join().unwrap();
                assert!(verifier.verify_header("GET", &signed.url, &signed.headers));
            }
        });
    }

    #[test]
    fn test_should_surface_errors_without_signing() {
        let signer = header_signer("sha1");

        assert_eq!(
            signer.sign("https://api.example.com", "", &SignOptions::new()).unwrap_err(),
            SignerError::InvalidKey
        );
        assert!(matches!(
            signer.sign("", SECRET, &SignOptions::new()),
            Err(SignerError::InvalidArgument(_))
        ));
        assert!(matches!(
            signer.sign(
                "https://api.example.com",
                SECRET,
                &SignOptions::new().header("X-Bad", "line\nbreak")
            ),
            Err(SignerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_should_keep_defaults_immutable_between_calls() {
        let signer = header_signer("sha1");
        let before: SigningOptions = signer.defaults().clone();

        signer
            .sign(
                "https://api.example.com",
                SECRET,
                &SignOptions::new().auth_scheme("Other").method("DELETE"),
            )
            .unwrap();

        assert_eq!(signer.defaults(), &before);
    }
}
