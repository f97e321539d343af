//! Validated credential payload persisted between sessions.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Errors produced while assembling a [`Credential`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialError {
	/// Access token was empty.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Refresh token was empty.
	#[error("Refresh token is required.")]
	MissingRefreshToken,
	/// Identity was null.
	#[error("Identity is required.")]
	MissingIdentity,
}

/// Opaque identity document returned by the authentication endpoint.
///
/// The backend currently answers with `{ "email": ..., "id": ... }`, but the client treats the
/// document as opaque and only offers convenience lookups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(serde_json::Value);
impl Identity {
	/// Wraps a raw JSON identity document.
	pub fn new(value: serde_json::Value) -> Self {
		Self(value)
	}

	/// Returns the raw JSON document.
	pub fn as_value(&self) -> &serde_json::Value {
		&self.0
	}

	/// Looks up a string field of the identity document.
	pub fn field(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(serde_json::Value::as_str)
	}

	/// Returns the `email` field, if present.
	pub fn email(&self) -> Option<&str> {
		self.field("email")
	}

	/// Returns the `id` field, if present.
	pub fn id(&self) -> Option<&str> {
		self.field("id")
	}

	fn is_null(&self) -> bool {
		self.0.is_null()
	}
}

/// Authentication payload: access token, refresh token, and identity.
///
/// A credential either exists with all three parts present and non-empty, or the session is
/// absent altogether; the constructor and the deserializer both enforce this.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCredential", rename_all = "camelCase")]
pub struct Credential {
	access_token: TokenSecret,
	refresh_token: TokenSecret,
	identity: Identity,
}
impl Credential {
	/// Validates and assembles a credential.
	pub fn new(
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
		identity: Identity,
	) -> Result<Self, CredentialError> {
		let access_token = TokenSecret::new(access_token);
		let refresh_token = TokenSecret::new(refresh_token);

		if access_token.is_empty() {
			return Err(CredentialError::MissingAccessToken);
		}
		if refresh_token.is_empty() {
			return Err(CredentialError::MissingRefreshToken);
		}
		if identity.is_null() {
			return Err(CredentialError::MissingIdentity);
		}

		Ok(Self { access_token, refresh_token, identity })
	}

	/// Returns the short-lived access token.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Returns the long-lived refresh token.
	pub fn refresh_token(&self) -> &TokenSecret {
		&self.refresh_token
	}

	/// Returns the identity document.
	pub fn identity(&self) -> &Identity {
		&self.identity
	}

	/// Returns a copy carrying a replacement access token; refresh token and identity are kept.
	pub fn with_access_token(&self, access_token: impl Into<String>) -> Result<Self, CredentialError> {
		Self::new(access_token, self.refresh_token.expose(), self.identity.clone())
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("identity", &self.identity)
			.finish()
	}
}
impl TryFrom<RawCredential> for Credential {
	type Error = CredentialError;

	fn try_from(raw: RawCredential) -> Result<Self, Self::Error> {
		Self::new(raw.access_token, raw.refresh_token, Identity(raw.identity))
	}
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCredential {
	access_token: String,
	refresh_token: String,
	#[serde(default)]
	identity: serde_json::Value,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn identity() -> Identity {
		Identity::new(serde_json::json!({ "email": "ada@example.com", "id": "u-1" }))
	}

	#[test]
	fn credential_requires_every_part() {
		assert_eq!(
			Credential::new("", "refresh", identity()).expect_err("Empty access token must fail."),
			CredentialError::MissingAccessToken
		);
		assert_eq!(
			Credential::new("access", "", identity()).expect_err("Empty refresh token must fail."),
			CredentialError::MissingRefreshToken
		);
		assert_eq!(
			Credential::new("access", "refresh", Identity::new(serde_json::Value::Null))
				.expect_err("Null identity must fail."),
			CredentialError::MissingIdentity
		);
	}

	#[test]
	fn credential_serializes_with_camel_case_keys() {
		let credential =
			Credential::new("access", "refresh", identity()).expect("Fixture should be valid.");
		let json = serde_json::to_value(&credential).expect("Credential should serialize.");

		assert_eq!(json["accessToken"], "access");
		assert_eq!(json["refreshToken"], "refresh");
		assert_eq!(json["identity"]["email"], "ada@example.com");

		let back: Credential = serde_json::from_value(json).expect("Credential should deserialize.");

		assert_eq!(back, credential);
	}

	#[test]
	fn partial_payloads_fail_to_deserialize() {
		let missing_identity = serde_json::json!({ "accessToken": "a", "refreshToken": "r" });
		let empty_access =
			serde_json::json!({ "accessToken": "", "refreshToken": "r", "identity": {} });

		assert!(serde_json::from_value::<Credential>(missing_identity).is_err());
		assert!(serde_json::from_value::<Credential>(empty_access).is_err());
	}

	#[test]
	fn replacing_access_token_keeps_refresh_and_identity() {
		let credential =
			Credential::new("old", "refresh", identity()).expect("Fixture should be valid.");
		let renewed = credential.with_access_token("new").expect("Renewal should be valid.");

		assert_eq!(renewed.access_token().expose(), "new");
		assert_eq!(renewed.refresh_token().expose(), "refresh");
		assert_eq!(renewed.identity().email(), Some("ada@example.com"));
		assert!(format!("{renewed:?}").contains("<redacted>"));
	}
}
