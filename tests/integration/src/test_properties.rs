//! Property tests over the signing pipeline.

#[cfg(test)]
mod tests {
    use http::HeaderMap;
    use proptest::prelude::*;
    use warden_hmac::{SignOptions, Signer};

    use crate::Verifier;

    fn pairs() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::vec(("[a-z]{1,4}", "[a-zA-Z0-9 ]{0,6}"), 0..6)
    }

    fn url_with(path: &str, pairs: &[(String, String)]) -> String {
        if pairs.is_empty() {
            return format!("https://api.example.com{path}");
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("https://api.example.com{path}?{query}")
    }

    proptest! {
        #[test]
        fn test_should_sign_independent_of_query_order(
            (original, shuffled) in pairs()
                .prop_flat_map(|p| (Just(p.clone()), Just(p).prop_shuffle())),
            path in "(/[a-z0-9]{1,5}){0,3}",
            nonce in "[a-f0-9]{8}",
        ) {
            let signer = Signer::default();
            let options = SignOptions::new().date("15 01 2012 16:43:21").nonce(nonce);

            let a = signer.sign_request(&url_with(&path, &original), "secret", &options).unwrap();
            let b = signer.sign_request(&url_with(&path, &shuffled), "secret", &options).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn test_should_produce_urls_the_verifier_accepts(
            query in pairs(),
            path in "(/[a-z0-9]{1,5}){0,3}",
            secret in "[ -~]{1,24}",
        ) {
            let signer = Signer::with_options(
                "sha256",
                &SignOptions::new().use_alternate_date_header(true),
            )
            .unwrap();
            let url = signer
                .sign_url(&url_with(&path, &query), &secret, &SignOptions::new())
                .unwrap();

            let verifier = Verifier::new(&secret, signer.defaults().clone());
            prop_assert!(verifier.verify_url("GET", &url, &HeaderMap::new()));
        }
    }
}
