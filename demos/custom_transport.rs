//! Drives a full session against an in-process backend through a custom [`HttpTransport`].
//!
//! 1. Implement [`HttpTransport`] so every request is answered locally (here: a fake pwrank
//!    backend that also expires the first access token it hands out).
//! 2. Pass the transport to [`Client::with_transport`] together with a [`CredentialStore`].
//! 3. Log in, open a [`RankingSession`], and watch the client renew the session transparently
//!    when the backend answers `401`.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use parking_lot::Mutex;
use serde_json::{Value, json};
// self
use pwrank_client::{
	Client, ClientConfig, LoginOutcome,
	http::{HttpRequest, HttpResponse, HttpTransport, Method, TransportFuture},
	notify::MemoryNotifier,
	ranking::{FilterBy, NewItem, RankingSession},
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let backend = Arc::new(FakeBackend::default());
	let client: Client<FakeBackend> = Client::with_transport(
		store,
		ClientConfig::new("http://pwrank.local")?,
		Arc::clone(&backend),
	);

	match client.login("ada@example.com", "correct horse").await {
		LoginOutcome::Authenticated(identity) =>
			println!("Signed in as {}.", identity.email().unwrap_or("<unknown>")),
		LoginOutcome::Rejected { message } => {
			println!("Login rejected: {message}");

			return Ok(());
		},
	}

	let notifier = MemoryNotifier::default();
	let session =
		RankingSession::new(client.clone(), "42").with_notifier(Arc::new(notifier.clone()));

	session.load().await?;
	println!(
		"Loaded {} items; {:.1}% of comparisons done.",
		session.items().len(),
		session.completion_percentage()
	);

	session.add_item(&NewItem::new("Tunic").with_init_rating(7)).await?;
	session.set_filter(FilterBy::NeedsComparisons);

	for item in session.filtered_items() {
		println!("Needs comparisons: {} ({} so far).", item.label, item.comparisons_count);
	}
	for notification in notifier.take() {
		println!("[{}] {} {}", notification.severity, notification.summary, notification.detail);
	}

	println!(
		"Renewals: {} attempted, {} succeeded.",
		client.renewal_metrics.attempts(),
		client.renewal_metrics.successes()
	);

	client.logout().await?;
	println!("Signed out; authenticated = {}.", client.is_authenticated().await?);

	Ok(())
}

/// In-process stand-in for the pwrank backend.
///
/// The access token issued at login is rejected once the first ranking load arrives, which
/// forces one renewal round trip.
#[derive(Default)]
struct FakeBackend {
	items: Mutex<Vec<Value>>,
}
impl FakeBackend {
	fn answer(&self, request: &HttpRequest) -> HttpResponse {
		let bearer = request.header("authorization").unwrap_or_default();

		match (request.method, request.url.path()) {
			(Method::Post, "/auth") => HttpResponse::json(
				200,
				&json!({
					"access_token": "access-1",
					"refresh_token": "refresh-1",
					"identity": { "id": "u-1", "email": "ada@example.com" }
				}),
			),
			(Method::Get, "/auth") if bearer == "Bearer refresh-1" =>
				HttpResponse::json(200, &json!({ "access_token": "access-2" })),
			(_, path) if path.starts_with("/ranking/") && bearer != "Bearer access-2" =>
				HttpResponse::json(401, &json!({ "msg": "Token has expired" })),
			(Method::Get, "/ranking/42") => self.ranking(),
			(Method::Post, "/ranking/42/items") => {
				let body = request
					.body
					.as_deref()
					.and_then(|body| serde_json::from_slice::<Value>(body).ok())
					.unwrap_or_default();
				let mut items = self.items.lock();
				let id = format!("i{}", items.len() + 3);

				items.push(json!({ "id": id, "label": body["label"], "comparisons_count": 0 }));

				HttpResponse::json(201, &json!({ "id": id }))
			},
			_ => HttpResponse::json(404, &json!({ "message": "Not found." })),
		}
	}

	fn ranking(&self) -> HttpResponse {
		let mut items = vec![
			json!({
				"id": "i1",
				"label": "Outer Wilds",
				"stderr": 0.3,
				"curr_rating": 9.1,
				"comparisons_count": 9
			}),
			json!({
				"id": "i2",
				"label": "Celeste",
				"stderr": 1.2,
				"curr_rating": 6.4,
				"comparisons_count": 3
			}),
		];

		items.extend(self.items.lock().iter().cloned());

		let count = items.len();

		HttpResponse::json(
			200,
			&json!({
				"ranking": {
					"id": "42",
					"name": "Games",
					"item_count": count,
					"comp_count": 1,
					"items": items
				}
			}),
		)
	}
}
impl HttpTransport for FakeBackend {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		let response = self.answer(&request);

		Box::pin(async move { Ok(response) })
	}
}
