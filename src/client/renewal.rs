//! Refresh-token renewal with optional coalescing of concurrent 401s.
//!
//! The renewal exchange is a `GET` to the authentication endpoint that presents the refresh
//! token as the bearer credential. A successful answer carrying `access_token` replaces the
//! stored access token while keeping the refresh token and identity; any other answer ends the
//! session. Under [`RenewalMode::Coalesced`] callers queue on one async lock, and a caller that
//! finds the stored access token already replaced reuses it instead of renewing again.
//!
//! Every write goes through [`CredentialStore::compare_and_swap`](crate::store::CredentialStore)
//! keyed on the refresh token that was presented. A logout or login that lands while the
//! exchange is in flight therefore wins, and the renewal reports `false` without writing.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	client::{Client, request},
	config::RenewalMode,
	http::{HttpTransport, Method},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	store::CompareAndSwapOutcome,
};

#[derive(Deserialize)]
struct RenewalResponse {
	#[serde(default)]
	access_token: Option<String>,
}

impl<C> Client<C>
where
	C: ?Sized + HttpTransport,
{
	/// Renews the current session's access token.
	///
	/// Returns `false` when no session exists, when the backend refuses the refresh token (which
	/// ends the session), or when the session changed while the exchange was in flight.
	pub async fn renew(&self) -> bool {
		match self.renewable_credential().await {
			Some(credential) => self.renew_with(&credential).await,
			None => false,
		}
	}

	/// Handles a 401 observed while `rejected` was the stored credential.
	pub(crate) async fn renew_after_rejection(&self, rejected: &Credential) -> bool {
		match self.config.renewal_mode() {
			RenewalMode::Independent => match self.renewable_credential().await {
				Some(current) => self.renew_with(&current).await,
				None => false,
			},
			RenewalMode::Coalesced => {
				let _singleflight = self.renewal_guard.lock().await;

				match self.renewable_credential().await {
					Some(current) if current.access_token() != rejected.access_token() => {
						self.renewal_metrics.record_reuse();
						obs::debug_event(
							"client.renewal",
							"Access token was already renewed by a concurrent request.",
						);

						true
					},
					Some(current) => self.renew_with(&current).await,
					None => false,
				}
			},
		}
	}

	async fn renewable_credential(&self) -> Option<Credential> {
		match self.credential().await {
			Ok(credential) => credential,
			Err(e) => {
				obs::warn_event(
					"client.renewal",
					format_args!("Failed to read the session before renewal: {e}."),
				);

				None
			},
		}
	}

	async fn renew_with(&self, credential: &Credential) -> bool {
		const KIND: OperationKind = OperationKind::Renewal;

		let span = OperationSpan::new(KIND, "renew");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);
		self.renewal_metrics.record_attempt();

		let result = span.instrument(self.exchange_refresh_token(credential)).await;

		match result {
			Ok(CompareAndSwapOutcome::Updated) => {
				obs::record_operation_outcome(KIND, OperationOutcome::Success);
				self.renewal_metrics.record_success();

				true
			},
			Ok(outcome) => {
				obs::record_operation_outcome(KIND, OperationOutcome::Failure);
				self.renewal_metrics.record_superseded();
				obs::debug_event(
					"client.renewal",
					format_args!("Session changed during renewal ({outcome:?}); discarding the token."),
				);

				false
			},
			Err(e) => {
				obs::record_operation_outcome(KIND, OperationOutcome::Failure);
				self.renewal_metrics.record_failure();
				obs::warn_event(
					"client.renewal",
					format_args!("Session renewal failed; logging out: {e}."),
				);
				self.end_renewed_session(credential).await;

				false
			},
		}
	}

	// Clears the session only while it still belongs to `credential`, so a logout or a new
	// login that happened during the exchange survives.
	async fn end_renewed_session(&self, credential: &Credential) {
		match self.store.compare_and_swap(credential.refresh_token().expose(), None).await {
			Ok(CompareAndSwapOutcome::Updated) => obs::debug_event("client.logout", "Session cleared."),
			Ok(_) => obs::debug_event(
				"client.renewal",
				"Session changed during the failed renewal; leaving it in place.",
			),
			Err(e) => obs::warn_event(
				"client.renewal",
				format_args!("Failed to clear the session after renewal failure: {e}."),
			),
		}
	}

	async fn exchange_refresh_token(&self, credential: &Credential) -> Result<CompareAndSwapOutcome> {
		let auth_path = self.config.auth_path();
		let url = self.config.resolve(auth_path)?;
		let refresh_token = credential.refresh_token();
		let request = request::build_request(Method::Get, url, Some(refresh_token), None);
		let response = self.transport.send(request).await?;
		let payload = request::into_payload(response)?;
		let renewal: RenewalResponse = request::decode_required(Method::Get, auth_path, payload)?;
		let access_token = renewal
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or_else(|| Error::application("Renewal response is missing an access token."))?;
		let renewed = credential
			.with_access_token(access_token)
			.map_err(|e| Error::application(format!("Renewed credential is invalid: {e}")))?;

		Ok(self.store.compare_and_swap(refresh_token.expose(), Some(renewed)).await?)
	}
}
