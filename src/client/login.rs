//! Credential exchange against the authentication endpoint.

// self
use crate::{
	_prelude::*,
	auth::{Credential, Identity},
	client::{Client, request},
	http::{HttpTransport, Method},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
};

/// Message used when the backend rejects a login without explaining why.
pub const AUTHENTICATION_FAILED_MESSAGE: &str = "Authentication failed.";

/// Result of [`Client::login`]; login never fails with an [`Error`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
	/// Credentials were accepted and stored.
	Authenticated(Identity),
	/// Credentials were rejected or the backend could not be reached.
	Rejected {
		/// Human-readable reason suitable for display.
		message: String,
	},
}
impl LoginOutcome {
	/// Returns `true` for [`LoginOutcome::Authenticated`].
	pub fn is_ok(&self) -> bool {
		matches!(self, Self::Authenticated(_))
	}

	/// Returns the failure message, if any.
	pub fn message(&self) -> Option<&str> {
		match self {
			Self::Authenticated(_) => None,
			Self::Rejected { message } => Some(message),
		}
	}
}

#[derive(Serialize)]
struct LoginRequest<'a> {
	email: &'a str,
	password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	refresh_token: String,
	#[serde(default)]
	identity: serde_json::Value,
}

impl<C> Client<C>
where
	C: ?Sized + HttpTransport,
{
	/// Signs in with `email` and `password`, replacing any existing session.
	///
	/// The existing session is cleared before the exchange, so a rejected login always leaves
	/// the client logged out.
	pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
		const KIND: OperationKind = OperationKind::Login;

		let span = OperationSpan::new(KIND, "login");

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = span.instrument(self.login_inner(email, password)).await;

		match result {
			Ok(identity) => {
				obs::record_operation_outcome(KIND, OperationOutcome::Success);

				LoginOutcome::Authenticated(identity)
			},
			Err(e) => {
				obs::record_operation_outcome(KIND, OperationOutcome::Failure);
				obs::warn_event("client.login", format_args!("Login failed: {e}."));

				LoginOutcome::Rejected { message: e.user_message(AUTHENTICATION_FAILED_MESSAGE) }
			},
		}
	}

	async fn login_inner(&self, email: &str, password: &str) -> Result<Identity> {
		self.logout().await?;

		let body = request::encode_body(&LoginRequest { email, password })?;
		let auth_path = self.config.auth_path().to_owned();
		let payload = self.request_json(Method::Post, &auth_path, Some(body), false).await?;
		let response: LoginResponse = request::decode_required(Method::Post, &auth_path, payload)?;
		let credential = Credential::new(
			response.access_token,
			response.refresh_token,
			Identity::new(response.identity),
		)
		.map_err(|e| Error::application(format!("Login response is incomplete: {e}")))?;
		let identity = credential.identity().clone();

		self.store.save(Some(credential)).await?;

		Ok(identity)
	}
}
