//! Query-based signing, checked by the reference verifier.

#[cfg(test)]
mod tests {
    use http::HeaderMap;
    use warden_hmac::{PathPattern, SignOptions, Signer, SigningOptions};

    use crate::{Verifier, init_tracing, test_nonce};

    const SECRET: &str = "integration-secret";

    fn alternate_date_signer() -> Signer {
        Signer::with_options(
            "sha1",
            &SignOptions::new().use_alternate_date_header(true),
        )
        .unwrap()
    }

    #[test]
    fn test_should_verify_self_contained_signed_url() {
        init_tracing();

        let signer = alternate_date_signer();
        let nonce = test_nonce();
        let url = signer
            .sign_url(
                "https://cdn.example.com/files/report.pdf?download=1",
                SECRET,
                &SignOptions::new().nonce(nonce.clone()),
            )
            .unwrap();

        assert!(url.contains(&format!("X-HMAC-Nonce={nonce}")));
        assert!(url.contains("X-HMAC-Date="));
        let verifier = Verifier::new(SECRET, signer.defaults().clone());
        assert!(verifier.verify_url("GET", &url, &HeaderMap::new()));
    }

    #[test]
    fn test_should_reject_signed_url_with_changed_query() {
        init_tracing();

        let signer = alternate_date_signer();
        let url = signer
            .sign_url(
                "https://cdn.example.com/files?id=7",
                SECRET,
                &SignOptions::new().nonce(test_nonce()),
            )
            .unwrap();
        let verifier = Verifier::new(SECRET, signer.defaults().clone());

        let tampered = url.replace("id=7", "id=8");
        assert!(!verifier.verify_url("GET", &tampered, &HeaderMap::new()));
        let extended = format!("{url}&admin=1");
        assert!(!verifier.verify_url("GET", &extended, &HeaderMap::new()));
    }

    #[test]
    fn test_should_verify_url_with_date_in_headers() {
        init_tracing();

        let signer = Signer::default();
        let signed = signer
            .sign(
                "https://api.example.com/feed?since=2012",
                SECRET,
                &SignOptions::new().nonce(test_nonce()),
            )
            .unwrap();

        assert!(signed.url.contains("&auth="));
        assert!(signed.headers.contains_key(http::header::DATE));
        let verifier = Verifier::new(SECRET, signer.defaults().clone());
        assert!(verifier.verify_url("GET", &signed.url, &signed.headers));
    }

    #[test]
    fn test_should_replace_stale_signature_when_resigning() {
        init_tracing();

        let signer = alternate_date_signer();
        let first = signer
            .sign_url(
                "https://cdn.example.com/a?x=1",
                SECRET,
                &SignOptions::new().date("15 01 2012 16:43:21"),
            )
            .unwrap();
        let second = signer
            .sign_url(&first, SECRET, &SignOptions::new().nonce(test_nonce()))
            .unwrap();

        assert_eq!(second.matches("auth=").count(), 1);
        assert_eq!(second.matches("X-HMAC-Date=").count(), 1);
        let verifier = Verifier::new(SECRET, signer.defaults().clone());
        assert!(verifier.verify_url("GET", &second, &HeaderMap::new()));
    }

    #[test]
    fn test_should_apply_path_overlay_for_matching_paths() {
        init_tracing();

        let overlay = SignOptions::new()
            .auth_param("token")
            .use_alternate_date_header(true);
        let signer = Signer::with_options(
            "sha1",
            &SignOptions::new().extra_auth_path(PathPattern::new("/private/.*").unwrap(), overlay),
        )
        .unwrap();

        let private = signer
            .sign_url("https://cdn.example.com/private/k", SECRET, &SignOptions::new())
            .unwrap();
        let public = signer
            .sign_url("https://cdn.example.com/public/k", SECRET, &SignOptions::new())
            .unwrap();

        assert!(private.contains("?token="));
        assert!(public.contains("?auth="));

        let private_options = signer
            .effective_url_options("https://cdn.example.com/private/k", &SignOptions::new())
            .unwrap();
        assert_eq!(private_options.auth_param, "token");
        let verifier = Verifier::new(SECRET, private_options);
        assert!(verifier.verify_url("GET", &private, &HeaderMap::new()));
    }

    #[test]
    fn test_should_preserve_fragment_and_encode_values() {
        let signer = Signer::new(SigningOptions {
            use_alternate_date_header: true,
            ..SigningOptions::default()
        });
        let url = signer
            .sign_url(
                "https://cdn.example.com/view?name=a%20b#section-2",
                SECRET,
                &SignOptions::new().date("15 01 2012 16:43:21"),
            )
            .unwrap();

        assert!(url.ends_with("#section-2"));
        assert!(url.contains("X-HMAC-Date=SUN%2C%2015%2001%202012%2016%3A43%3A21%20GMT"));
        let verifier = Verifier::new(SECRET, signer.defaults().clone());
        assert!(verifier.verify_url("GET", &url, &HeaderMap::new()));
    }

    #[test]
    fn test_should_not_transfer_signature_across_encoded_delimiters() {
        init_tracing();

        let signer = alternate_date_signer();
        let options = SignOptions::new()
            .nonce(test_nonce())
            .date("15 01 2012 16:43:21");
        let url = signer
            .sign_url("https://cdn.example.com/p?a=%26b%3D1", SECRET, &options)
            .unwrap();
        let verifier = Verifier::new(SECRET, signer.defaults().clone());
        assert!(verifier.verify_url("GET", &url, &HeaderMap::new()));

        let forged = url.replacen("a=%26b%3D1", "a=&b=1", 1);
        assert_ne!(forged, url);
        assert!(!verifier.verify_url("GET", &forged, &HeaderMap::new()));
    }

    #[test]
    fn test_should_sign_values_with_encoded_line_breaks() {
        init_tracing();

        let signer = alternate_date_signer();
        let url = signer
            .sign_url(
                "https://cdn.example.com/p?msg=line%0Abreak&tag=a%2Bb",
                SECRET,
                &SignOptions::new().nonce(test_nonce()),
            )
            .unwrap();
        let verifier = Verifier::new(SECRET, signer.defaults().clone());
        assert!(verifier.verify_url("GET", &url, &HeaderMap::new()));
    }
}
