mod common;

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use serde_json::json;
use tokio::sync::Notify;
// self
use common::ScriptedTransport;
use pwrank_client::{
	Client, LoginOutcome,
	config::RenewalMode,
	http::{HttpRequest, HttpResponse, HttpTransport, TransportFuture},
	store::{CredentialStore, MemoryStore},
};

/// Backend whose renewal exchange parks until the test releases it.
#[derive(Default)]
struct GatedRenewal {
	renewal_started: Notify,
	release: Notify,
}
impl HttpTransport for GatedRenewal {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let response = match (request.method.as_str(), request.url.path()) {
				("GET", "/auth") => {
					self.renewal_started.notify_one();
					self.release.notified().await;

					HttpResponse::json(200, &json!({ "access_token": "renewed" }))
				},
				("POST", "/auth") => HttpResponse::json(
					200,
					&json!({
						"access_token": "grace-access",
						"refresh_token": "grace-refresh",
						"identity": { "email": "grace@example.com" }
					}),
				),
				("GET", "/ranking/r1") => match common::bearer(&request) {
					Some("Bearer renewed" | "Bearer grace-access") =>
						HttpResponse::json(200, &json!({ "ranking": { "id": "r1" } })),
					_ => HttpResponse::new(401),
				},
				_ => HttpResponse::new(404),
			};

			Ok(response)
		})
	}
}

fn gated_client(store: MemoryStore) -> (Client<GatedRenewal>, Arc<GatedRenewal>) {
	let transport = Arc::new(GatedRenewal::default());
	let store: Arc<dyn CredentialStore> = Arc::new(store);
	let client =
		Client::with_transport(store, common::config("http://backend.test"), transport.clone());

	(client, transport)
}

fn backend(renewals: &'static AtomicUsize) -> ScriptedTransport {
	ScriptedTransport::new(move |request| match (request.method.as_str(), request.url.path()) {
		("GET", "/auth") => {
			let n = renewals.fetch_add(1, Ordering::SeqCst) + 1;

			HttpResponse::json(200, &json!({ "access_token": format!("fresh-{n}") }))
		},
		("GET", "/ranking/r1") => match common::bearer(request) {
			Some(token) if token.starts_with("Bearer fresh") =>
				HttpResponse::json(200, &json!({ "ranking": { "id": "r1" } })),
			_ => HttpResponse::new(401),
		},
		_ => HttpResponse::new(404),
	})
}

#[tokio::test]
async fn concurrent_401s_share_one_renewal_when_coalesced() {
	static RENEWALS: AtomicUsize = AtomicUsize::new(0);

	let (client, transport) = common::scripted_client(
		common::seeded_store("stale"),
		RenewalMode::Coalesced,
		backend(&RENEWALS),
	);
	let (a, b, c) = tokio::join!(
		client.get("/ranking/r1"),
		client.get("/ranking/r1"),
		client.get("/ranking/r1")
	);

	for result in [a, b, c] {
		assert!(result.expect("Every caller should succeed after renewal.").is_some());
	}

	assert_eq!(transport.count("GET", "/auth"), 1);
	assert_eq!(client.renewal_metrics.attempts(), 1);
	assert_eq!(client.renewal_metrics.successes() + client.renewal_metrics.reused(), 3);

	let stored = client.credential().await.expect("Store should load.").expect("Session kept.");

	assert_eq!(stored.access_token().expose(), "fresh-1");
}

#[tokio::test]
async fn independent_mode_renews_per_rejection() {
	static RENEWALS: AtomicUsize = AtomicUsize::new(0);

	let (client, transport) = common::scripted_client(
		common::seeded_store("stale"),
		RenewalMode::Independent,
		backend(&RENEWALS),
	);

	client.get("/ranking/r1").await.expect("First call should succeed after renewal.");
	client.get("/ranking/r1").await.expect("Second call reuses the stored token.");

	assert_eq!(transport.count("GET", "/auth"), 1);
	assert_eq!(transport.count("GET", "/ranking/r1"), 3);
	assert_eq!(client.renewal_metrics.reused(), 0);
}

#[tokio::test]
async fn retries_are_capped_at_one_per_call() {
	let (client, transport) = common::scripted_client(
		common::seeded_store("stale"),
		RenewalMode::Coalesced,
		ScriptedTransport::new(|request| match request.url.path() {
			"/auth" => HttpResponse::json(200, &json!({ "access_token": "still-rejected" })),
			_ => HttpResponse::new(401),
		}),
	);
	let err = client.get("/ranking/r1").await.expect_err("Persistent 401 must surface.");

	assert_eq!(err.status(), Some(401));
	assert_eq!(transport.count("GET", "/ranking/r1"), 2);
	assert_eq!(transport.count("GET", "/auth"), 1);

	let bearers = transport
		.requests()
		.iter()
		.filter(|request| request.url.path() == "/ranking/r1")
		.map(|request| common::bearer(request).map(str::to_owned))
		.collect::<Vec<_>>();

	assert_eq!(
		bearers,
		vec![Some("Bearer stale".to_owned()), Some("Bearer still-rejected".to_owned())]
	);
}

#[tokio::test]
async fn renewal_without_an_access_token_ends_the_session() {
	let (client, transport) = common::scripted_client(
		common::seeded_store("stale"),
		RenewalMode::Coalesced,
		ScriptedTransport::new(|request| match request.url.path() {
			"/auth" => HttpResponse::json(200, &json!({})),
			_ => HttpResponse::new(401),
		}),
	);

	assert!(!client.renew().await);
	assert_eq!(client.credential().await.expect("Store should load."), None);
	assert_eq!(transport.count("GET", "/auth"), 1);

	let auth = transport.requests().into_iter().next().expect("Renewal request recorded.");

	assert_eq!(common::bearer(&auth), Some("Bearer refresh-token"));
}

#[tokio::test]
async fn renewing_without_a_session_is_a_no_op() {
	let (client, transport) = common::scripted_client(
		Default::default(),
		RenewalMode::Coalesced,
		ScriptedTransport::new(|_| HttpResponse::new(500)),
	);

	assert!(!client.renew().await);
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn logout_during_renewal_stays_logged_out() {
	let store = common::seeded_store("stale");
	let (client, transport) = gated_client(store.clone());
	let (result, ()) = tokio::join!(client.get("/ranking/r1"), async {
		transport.renewal_started.notified().await;
		client.logout().await.expect("Logout should succeed.");
		transport.release.notify_one();
	});
	let err = result.expect_err("The call loses its session and surfaces the 401.");

	assert_eq!(err.status(), Some(401));
	assert!(!client.is_authenticated().await.expect("Store should load."));
	assert_eq!(store.raw(), None);
	assert_eq!(client.renewal_metrics.successes(), 0);
	assert_eq!(client.renewal_metrics.superseded(), 1);
}

#[tokio::test]
async fn login_during_renewal_keeps_the_new_session() {
	let store = common::seeded_store("stale");
	let (client, transport) = gated_client(store.clone());
	let (result, login) = tokio::join!(client.get("/ranking/r1"), async {
		transport.renewal_started.notified().await;

		let login = client.login("grace@example.com", "hunter22").await;

		transport.release.notify_one();

		login
	});

	assert!(matches!(login, LoginOutcome::Authenticated(_)));
	assert_eq!(result.expect_err("The renewed token is discarded.").status(), Some(401));

	let stored = client.credential().await.expect("Store should load.").expect("New session kept.");

	assert_eq!(stored.access_token().expose(), "grace-access");
	assert_eq!(stored.refresh_token().expose(), "grace-refresh");
	assert_eq!(stored.identity().email(), Some("grace@example.com"));
	assert_eq!(client.renewal_metrics.superseded(), 1);

	client.get("/ranking/r1").await.expect("The new session works.");
}

#[tokio::test]
async fn clones_share_the_session_and_renewal_state() {
	static RENEWALS: AtomicUsize = AtomicUsize::new(0);

	let (client, transport) = common::scripted_client(
		common::seeded_store("stale"),
		RenewalMode::Coalesced,
		backend(&RENEWALS),
	);
	let other_tab = client.clone();

	other_tab.get("/ranking/r1").await.expect("The clone renews and retries.");
	client.get("/ranking/r1").await.expect("The original sees the renewed token.");

	assert_eq!(client.renewal_metrics.successes(), 1);
	assert_eq!(transport.count("GET", "/auth"), 1);

	let shared: Arc<dyn HttpTransport> = transport;
	let erased: Client<dyn HttpTransport> = Client::with_transport(
		Arc::new(common::seeded_store("fresh-1")),
		common::config("http://backend.test"),
		shared,
	);

	erased.clone().get("/ranking/r1").await.expect("Type-erased clients clone too.");
}
