//! Walks a client through the three OAuth 1.0a legs against an in-memory provider, then calls a
//! realm-gated resource with the issued access token.

// std
use std::sync::Arc;
// crates.io
use color_eyre::{Result, eyre::eyre};
use url::Url;
// self
use oauth1_provider::{
	auth::{ClientRegistration, OwnerId, RealmSet, TokenKey, TokenSecret},
	http::{FormResponse, IncomingRequest},
	pipeline::VerifyOptions,
	provider::{Provider, ProviderConfig},
	signature::{RequestSigner, SignatureMethod},
	store::{MemoryStore, ProviderStore},
};

const ORIGIN: &str = "https://provider.example.com";

fn signed(signer: &RequestSigner, method: &str, path: &str) -> Result<IncomingRequest> {
	let url = Url::parse(ORIGIN)?.join(path)?;
	let header = signer.sign(method, &url, &[])?.authorization_header();

	Ok(IncomingRequest::new(method, url).with_header("Authorization", header))
}

fn credentials(response: &FormResponse) -> Result<(TokenKey, TokenSecret)> {
	let token = response.get("oauth_token").ok_or_else(|| eyre!("missing oauth_token"))?;
	let secret =
		response.get("oauth_token_secret").ok_or_else(|| eyre!("missing oauth_token_secret"))?;

	Ok((TokenKey::new(token)?, TokenSecret::new(secret)))
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn ProviderStore> = Arc::new(MemoryStore::default());
	let config = ProviderConfig::builder().realms(RealmSet::new(["photos", "contacts"])?).build()?;
	let provider = Provider::new(config, store)?;
	let client = provider
		.register(
			ClientRegistration::new("Printer")
				.with_description("Prints your vacation photos.")
				.with_callback(Url::parse("https://printer.example.com/ready")?),
		)
		.await?;
	let secret = client.secret.clone().ok_or_else(|| eyre!("client has no shared secret"))?;
	let signer = RequestSigner::new(client.client_key.clone(), SignatureMethod::HmacSha1)
		.with_client_secret(secret);

	println!("Registered client {}.", client.client_key);

	let response = provider
		.request_token(&signed(&signer.clone().with_realm("photos"), "POST", "/request_token")?)
		.await?;
	let (request_token, request_secret) = credentials(&response)?;
	let pending = provider.pending_authorization(&request_token).await?;

	println!("{} asks for realm {:?}.", pending.client_name, pending.realm);

	let redirect = provider.authorize(&request_token, OwnerId::new("alice")?).await?;
	let verifier = redirect.verifier().ok_or_else(|| eyre!("authorization carried no verifier"))?;

	if let Some(location) = redirect.location() {
		println!("Redirecting the owner to {location}.");
	}

	let exchange = signer.clone().with_token(request_token, request_secret).with_verifier(verifier);
	let response = provider.access_token(&signed(&exchange, "POST", "/access_token")?).await?;
	let (access_token, access_secret) = credentials(&response)?;
	let call = signer.with_token(access_token, access_secret);
	let options = VerifyOptions::protected_resource().with_realm(RealmSet::new(["photos"])?);
	let request = signed(&call, "GET", "/photos?file=vacation.jpg")?;
	let owner =
		provider.protect(&request, &options, |verified| async move { Ok(verified.owner) }).await?;

	println!("Protected call made on behalf of {owner:?}.");

	let replay = provider.access_token(&signed(&exchange, "POST", "/access_token")?).await;

	let status = replay.map_or_else(|e| e.status_code(), |_| 200);

	println!("Second exchange answered with HTTP {status}.");

	Ok(())
}
