// self
use oauth1_provider::{
	_preludet::*,
	auth::{Client, OwnerId, RealmSet, TokenKey, TokenSecret},
	error::MalformedRequestError,
	http::IncomingRequest,
	pipeline::VerifyOptions,
	provider::{Provider, ProviderConfig},
	signature::{RequestSigner, SignatureMethod},
};

fn realm(raw: &str) -> RealmSet {
	RealmSet::from_str(raw).expect("Realm fixture should parse.")
}

fn issued_token(response: &oauth1_provider::http::FormResponse) -> (TokenKey, TokenSecret) {
	(
		TokenKey::new(response.get("oauth_token").expect("Token should be returned."))
			.expect("Issued token should be valid."),
		TokenSecret::new(response.get("oauth_token_secret").expect("Secret should be returned.")),
	)
}

/// Runs the three legs and returns the signer holding the access token.
async fn access_signer(provider: &Provider, client: &Client, realm: Option<&str>) -> RequestSigner {
	let mut signer = signer_for(client, SignatureMethod::HmacSha1);

	if let Some(realm) = realm {
		signer = signer.with_realm(realm);
	}

	let response = provider
		.request_token(&signed_request(&signer, "POST", test_url("/request_token")))
		.await
		.expect("Request token should issue.");
	let (token, secret) = issued_token(&response);
	let verifier = provider
		.authorize(&token, OwnerId::new("alice").expect("Owner should be valid."))
		.await
		.expect("Approval should succeed.")
		.verifier()
		.expect("Verifier should be returned.");
	let exchange = signer_for(client, SignatureMethod::HmacSha1)
		.with_token(token, secret)
		.with_verifier(verifier);
	let response = provider
		.access_token(&signed_request(&exchange, "POST", test_url("/access_token")))
		.await
		.expect("Exchange should succeed.");
	let (token, secret) = issued_token(&response);

	signer_for(client, SignatureMethod::HmacSha1).with_token(token, secret)
}

#[tokio::test]
async fn identical_second_request_is_a_replay() {
	let (provider, _) = build_test_provider();
	let client = register_test_client(&provider).await;
	let signer = access_signer(&provider, &client, None).await;
	let request = signed_request(&signer, "GET", test_url("/photos"));
	let options = VerifyOptions::protected_resource();

	provider.verify(&request, &options).await.expect("First delivery should pass.");

	let err = provider.verify(&request, &options).await.expect_err("Replay must be rejected.");

	assert_eq!(err.status_code(), 401);
	assert_eq!(err.public_message(), "Unauthorized");
}

#[tokio::test]
async fn tampering_is_rejected_and_the_original_still_passes_once() {
	let (provider, _) = build_test_provider();
	let client = register_test_client(&provider).await;
	let signer = access_signer(&provider, &client, None).await.with_nonce("tamper-check-nonce");
	let url = test_url("/photos?file=vacation.jpg");
	let signed = signer.sign("GET", &url, &[]).expect("Signing should succeed.");
	let header = signed.authorization_header();
	let options = VerifyOptions::protected_resource();

	// Flip one byte of the signature.
	let signature = signed.signature().to_owned();
	let flipped = {
		let mut bytes = signature.clone().into_bytes();

		bytes[0] = if bytes[0] == b'A' { b'B' } else { b'A' };

		String::from_utf8(bytes).expect("Signature stays ASCII.")
	};
	let forged = header.replace(
		&oauth1_provider::encoding::percent_encode(&signature),
		&oauth1_provider::encoding::percent_encode(&flipped),
	);
	let request = IncomingRequest::new("GET", url.clone()).with_header("Authorization", forged);

	assert!(provider.verify(&request, &options).await.expect_err("Forgery.").is_unauthorized());

	// Change a signed query parameter.
	let request = IncomingRequest::new("GET", test_url("/photos?file=passport.jpg"))
		.with_header("Authorization", header.clone());

	assert!(provider.verify(&request, &options).await.expect_err("Tamper.").is_unauthorized());

	// Failed attempts did not burn the nonce.
	let request = IncomingRequest::new("GET", url).with_header("Authorization", header);

	provider.verify(&request, &options).await.expect("Untouched request should pass.");
	assert!(provider.verify(&request, &options).await.is_err());
}

#[tokio::test]
async fn realm_scoping_follows_the_request_token() {
	let (provider, _) = build_test_provider();
	let client = register_test_client(&provider).await;
	let signer = access_signer(&provider, &client, Some("secret")).await;
	let trolling = VerifyOptions::protected_resource().with_realm(realm("trolling"));
	let secret = VerifyOptions::protected_resource().with_realm(realm("secret"));
	let err = provider
		.verify(&signed_request(&signer, "GET", test_url("/trolling")), &trolling)
		.await
		.expect_err("Foreign realm must be rejected.");

	assert!(err.is_unauthorized());

	let verified = provider
		.verify(&signed_request(&signer, "GET", test_url("/secret")), &secret)
		.await
		.expect("Granted realm should pass.");

	assert_eq!(verified.token_realm, Some(realm("secret")));
}

#[tokio::test]
async fn query_realm_is_covered_by_the_signature() {
	let (provider, _) = build_test_provider();
	let client = register_test_client(&provider).await;
	let signer = signer_for(&client, SignatureMethod::HmacSha1);
	let header = signer
		.sign("POST", &test_url("/request_token?realm=public"), &[])
		.expect("Signing should succeed.")
		.authorization_header();
	let swapped = IncomingRequest::new("POST", test_url("/request_token?realm=admin"))
		.with_header("Authorization", header.clone());

	assert!(provider.request_token(&swapped).await.expect_err("Swapped realm.").is_unauthorized());

	let original = IncomingRequest::new("POST", test_url("/request_token?realm=public"))
		.with_header("Authorization", header);
	let response =
		provider.request_token(&original).await.expect("Signed query realm should pass.");
	let (token, _) = issued_token(&response);
	let pending =
		provider.pending_authorization(&token).await.expect("Pending request should be found.");

	assert_eq!(pending.realm, Some(realm("public")));
}

#[tokio::test]
async fn realm_whitelist_gates_request_tokens() {
	let config = ProviderConfig { realms: Some(realm("photos")), ..Default::default() };
	let (provider, _) = build_test_provider_with(config);
	let client = register_test_client(&provider).await;
	let signer = signer_for(&client, SignatureMethod::HmacSha1).with_realm("admin");
	let err = provider
		.request_token(&signed_request(&signer, "POST", test_url("/request_token")))
		.await
		.expect_err("Unlisted realm must be refused.");

	assert!(err.is_unauthorized());
}

#[tokio::test]
async fn exchange_before_authorization_is_rejected() {
	let (provider, _) = build_test_provider();
	let client = register_test_client(&provider).await;
	let signer = signer_for(&client, SignatureMethod::HmacSha1);
	let response = provider
		.request_token(&signed_request(&signer, "POST", test_url("/request_token")))
		.await
		.expect("Request token should issue.");
	let (token, secret) = issued_token(&response);
	let exchange = signer.with_token(token, secret).with_verifier("guessed-verifier-0000000");
	let err = provider
		.access_token(&signed_request(&exchange, "POST", test_url("/access_token")))
		.await
		.expect_err("Unauthorized request token must not be exchangeable.");

	assert!(err.is_unauthorized());
}

#[tokio::test]
async fn unknown_clients_look_like_any_other_failure() {
	let (provider, _) = build_test_provider();
	let signer =
		RequestSigner::new(client_key("nobody-registered-this-key"), SignatureMethod::HmacSha1)
			.with_client_secret(TokenSecret::new("secret"));
	let err = provider
		.request_token(&signed_request(&signer, "POST", test_url("/request_token")))
		.await
		.expect_err("Unknown client must be rejected.");

	assert_eq!(err.status_code(), 401);
	assert_eq!(err.public_message(), "Unauthorized");
}

#[tokio::test]
async fn malformed_requests_are_client_errors() {
	let (provider, _) = build_test_provider();
	let client = register_test_client(&provider).await;
	let signer = signer_for(&client, SignatureMethod::HmacSha1);
	let insecure =
		Url::parse("http://provider.example.com/request_token").expect("URL should parse.");
	let err = provider
		.request_token(&signed_request(&signer, "POST", insecure))
		.await
		.expect_err("Plain HTTP must be refused.");

	assert!(matches!(err, Error::Malformed(MalformedRequestError::InsecureTransport)));
	assert_eq!(err.status_code(), 400);

	let unsigned = IncomingRequest::new("POST", test_url("/request_token"));
	let err = provider.request_token(&unsigned).await.expect_err("Unsigned request must fail.");

	assert!(matches!(err, Error::Malformed(MalformedRequestError::MissingParameter { .. })));

	let header = signer
		.sign("POST", &test_url("/request_token"), &[])
		.expect("Signing should succeed.")
		.authorization_header()
		.replace("oauth_version=\"1.0\"", "oauth_version=\"2.0\"");
	let request = IncomingRequest::new("POST", test_url("/request_token"))
		.with_header("Authorization", header);
	let err = provider.request_token(&request).await.expect_err("Wrong version must fail.");

	assert!(matches!(err, Error::Malformed(MalformedRequestError::UnsupportedVersion { .. })));
}

#[tokio::test]
async fn timestamp_window_rejects_stale_requests_and_prunes() {
	let config = ProviderConfig::builder()
		.timestamp_window(Duration::minutes(5))
		.build()
		.expect("Config should be valid.");
	let (provider, backend) = build_test_provider_with(config);
	let client = register_test_client(&provider).await;
	let stale = signer_for(&client, SignatureMethod::HmacSha1).with_timestamp(1_000);
	let err = provider
		.verify(&signed_request(&stale, "GET", test_url("/status")), &VerifyOptions::client_only())
		.await
		.expect_err("Stale timestamp must be rejected.");

	assert!(err.is_unauthorized());

	let fresh = signer_for(&client, SignatureMethod::HmacSha1);

	provider
		.verify(&signed_request(&fresh, "GET", test_url("/status")), &VerifyOptions::client_only())
		.await
		.expect("Fresh request should pass.");

	assert_eq!(backend.nonce_count(), 1);
	assert_eq!(provider.prune_nonces().await.expect("Prune should succeed."), 0);
}

#[tokio::test]
async fn pruning_with_a_huge_window_is_a_no_op() {
	let config = ProviderConfig::from_json_str(r#"{"timestamp_window_secs": 1000000000000}"#)
		.expect("Large window should be accepted.");
	let (provider, _) = build_test_provider_with(config);

	assert_eq!(provider.prune_nonces().await.expect("Prune should succeed."), 0);
}
