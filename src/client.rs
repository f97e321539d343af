//! Authenticated JSON client for the ranking backend.
//!
//! [`Client`] owns the HTTP transport, the credential store, and the configuration. Every verb
//! resolves its path against the configured base URL, attaches `Content-Type: application/json`,
//! and (when a session exists) `Authorization: Bearer <access token>`. A `401 Unauthorized` on an
//! authenticated call triggers the renewal protocol in [`renewal`] at most once per logical call.
//! Clones are cheap and share the transport, the store, the renewal lock, and the metrics.

mod login;
mod metrics;
mod renewal;
mod request;

pub use login::*;
pub use metrics::RenewalMetrics;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{Credential, Identity},
	config::ClientConfig,
	http::{HttpTransport, Method},
	obs,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = Client<ReqwestTransport>;

/// Session-aware client shared by every component that talks to the backend.
pub struct Client<C>
where
	C: ?Sized + HttpTransport,
{
	/// Transport used for every outbound exchange.
	pub transport: Arc<C>,
	/// Store holding the current credential.
	pub store: Arc<dyn CredentialStore>,
	/// Backend location and renewal policy.
	pub config: ClientConfig,
	/// Shared counters for renewal outcomes.
	pub renewal_metrics: Arc<RenewalMetrics>,
	renewal_guard: Arc<AsyncMutex<()>>,
}
impl<C> Client<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn CredentialStore>,
		config: ClientConfig,
		transport: impl Into<Arc<C>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			config,
			renewal_metrics: Default::default(),
			renewal_guard: Default::default(),
		}
	}

	/// Returns the stored credential, if a session exists.
	pub async fn credential(&self) -> Result<Option<Credential>> {
		Ok(self.store.load().await?)
	}

	/// Returns the identity of the signed-in user, or `None` when logged out.
	pub async fn user_identity(&self) -> Result<Option<Identity>> {
		Ok(self.credential().await?.map(|credential| credential.identity().clone()))
	}

	/// Returns `true` when a session exists.
	pub async fn is_authenticated(&self) -> Result<bool> {
		Ok(self.credential().await?.is_some())
	}

	/// Clears the stored session.
	pub async fn logout(&self) -> Result<()> {
		self.store.save(None).await?;

		obs::debug_event("client.logout", "Session cleared.");

		Ok(())
	}

	/// Issues an authenticated `GET`.
	pub async fn get(&self, path: &str) -> Result<Option<serde_json::Value>> {
		self.request_json(Method::Get, path, None, true).await
	}

	/// Issues an authenticated `POST` with a JSON body.
	pub async fn post<B>(&self, path: &str, body: &B) -> Result<Option<serde_json::Value>>
	where
		B: ?Sized + Serialize,
	{
		self.request_json(Method::Post, path, Some(request::encode_body(body)?), true).await
	}

	/// Issues an authenticated `PUT` with a JSON body.
	pub async fn put<B>(&self, path: &str, body: &B) -> Result<Option<serde_json::Value>>
	where
		B: ?Sized + Serialize,
	{
		self.request_json(Method::Put, path, Some(request::encode_body(body)?), true).await
	}

	/// Issues an authenticated `DELETE` without a body.
	pub async fn delete(&self, path: &str) -> Result<Option<serde_json::Value>> {
		self.request_json(Method::Delete, path, None, true).await
	}

	/// Issues an authenticated `DELETE` carrying a JSON body.
	pub async fn delete_with_body<B>(&self, path: &str, body: &B) -> Result<Option<serde_json::Value>>
	where
		B: ?Sized + Serialize,
	{
		self.request_json(Method::Delete, path, Some(request::encode_body(body)?), true).await
	}

	/// Issues an authenticated `GET` and decodes the JSON body into `T`.
	pub async fn get_as<T>(&self, path: &str) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let payload = self.get(path).await?;

		request::decode_required(Method::Get, path, payload)
	}

	/// Issues an authenticated `POST` and decodes the JSON body into `T`.
	pub async fn post_as<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let payload = self.post(path, body).await?;

		request::decode_required(Method::Post, path, payload)
	}

	/// Issues an authenticated `PUT` and decodes the JSON body into `T`.
	pub async fn put_as<B, T>(&self, path: &str, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		let payload = self.put(path, body).await?;

		request::decode_required(Method::Put, path, payload)
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestTransport> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(store: Arc<dyn CredentialStore>, config: ClientConfig) -> Self {
		Self::with_transport(store, config, ReqwestTransport::default())
	}
}
impl<C> Clone for Client<C>
where
	C: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			renewal_metrics: self.renewal_metrics.clone(),
			renewal_guard: self.renewal_guard.clone(),
		}
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("config", &self.config)
			.field("renewal_metrics", &self.renewal_metrics)
			.finish()
	}
}
