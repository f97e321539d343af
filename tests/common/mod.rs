#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use parking_lot::Mutex;
use pwrank_client::{
	Client, ClientConfig,
	auth::{Credential, Identity},
	config::RenewalMode,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	store::{CredentialStore, MemoryStore},
};

pub const EMAIL: &str = "ada@example.com";
pub const REFRESH_TOKEN: &str = "refresh-token";

type Handler = Box<dyn Fn(&HttpRequest) -> HttpResponse + Send + Sync>;

/// Transport double that answers from a closure and records every request.
///
/// The response is computed when the request is sent, so it reflects the bearer token of that
/// attempt.
pub struct ScriptedTransport {
	handler: Handler,
	requests: Mutex<Vec<HttpRequest>>,
}
impl ScriptedTransport {
	pub fn new(handler: impl Fn(&HttpRequest) -> HttpResponse + Send + Sync + 'static) -> Self {
		Self { handler: Box::new(handler), requests: Mutex::new(Vec::new()) }
	}

	pub fn requests(&self) -> Vec<HttpRequest> {
		self.requests.lock().clone()
	}

	pub fn count(&self, method: &str, path: &str) -> usize {
		self.requests
			.lock()
			.iter()
			.filter(|request| request.method.as_str() == method && request.url.path() == path)
			.count()
	}
}
impl HttpTransport for ScriptedTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let response = (self.handler)(&request);

		self.requests.lock().push(request);

		// Yield once so concurrent callers interleave the way real network calls do.
		Box::pin(async move {
			tokio::task::yield_now().await;

			Ok(response)
		})
	}
}

pub fn identity() -> Identity {
	Identity::new(serde_json::json!({ "email": EMAIL, "id": "u-1" }))
}

pub fn credential(access_token: &str) -> Credential {
	Credential::new(access_token, REFRESH_TOKEN, identity())
		.expect("Credential fixture should be valid.")
}

pub fn seeded_store(access_token: &str) -> MemoryStore {
	MemoryStore::with_credential(&credential(access_token))
		.expect("Seeding the memory store should succeed.")
}

pub fn config(base_url: &str) -> ClientConfig {
	ClientConfig::new(base_url).expect("Test base URL should parse.")
}

pub fn scripted_client(
	store: MemoryStore,
	mode: RenewalMode,
	transport: ScriptedTransport,
) -> (Client<ScriptedTransport>, Arc<ScriptedTransport>) {
	let transport = Arc::new(transport);
	let store: Arc<dyn CredentialStore> = Arc::new(store);
	let client = Client::with_transport(
		store,
		config("http://backend.test").with_renewal_mode(mode),
		transport.clone(),
	);

	(client, transport)
}

#[cfg(feature = "reqwest")]
pub fn reqwest_client(
	base_url: &str,
	store: MemoryStore,
) -> pwrank_client::client::ReqwestApiClient {
	Client::new(Arc::new(store), config(base_url))
}

pub fn bearer(request: &HttpRequest) -> Option<&str> {
	request.header("authorization")
}
