//! Storage contract and built-in backends for the session credential.
//!
//! A store holds at most one [`Credential`] under a single durable key. Backends keep the
//! serialized JSON payload and decode it on every load, so a corrupted or hand-edited payload is
//! reported as "logged out" (with a diagnostic event) rather than as a failure.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::Credential, obs};

/// Durable key under which the credential payload is stored.
pub const STORAGE_KEY: &str = "pwrank.auth";

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by credential stores.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Loads the stored credential.
	///
	/// Malformed payloads resolve to `Ok(None)`; only backend failures (I/O) produce errors.
	fn load(&self) -> StoreFuture<'_, Option<Credential>>;

	/// Persists `credential`, or clears the store when `None` is supplied.
	fn save(&self, credential: Option<Credential>) -> StoreFuture<'_, ()>;

	/// Replaces the stored credential only while it still carries `expected_refresh`.
	///
	/// `None` clears the store under the same condition. The check and the write happen
	/// atomically with respect to other writers of the same store.
	fn compare_and_swap<'a>(
		&'a self,
		expected_refresh: &'a str,
		replacement: Option<Credential>,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;
}

/// Result of a refresh-token compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The refresh token matched and the replacement was written.
	Updated,
	/// A different session is stored; nothing was written.
	RefreshMismatch,
	/// The store is empty; nothing was written.
	Missing,
}
impl CompareAndSwapOutcome {
	/// Decides the outcome for the currently stored credential.
	pub fn for_current(current: Option<&Credential>, expected_refresh: &str) -> Self {
		match current {
			None => Self::Missing,
			Some(credential) if credential.refresh_token().expose() == expected_refresh =>
				Self::Updated,
			Some(_) => Self::RefreshMismatch,
		}
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Serializes a credential into the persisted JSON layout.
pub(crate) fn encode_payload(credential: &Credential) -> Result<String, StoreError> {
	serde_json::to_string(credential).map_err(|e| StoreError::Serialization {
		message: format!("Failed to serialize credential payload: {e}"),
	})
}

/// Decodes a persisted payload, reporting absence for malformed data.
pub(crate) fn decode_payload(raw: &str) -> Option<Credential> {
	if raw.trim().is_empty() {
		return None;
	}

	match serde_json::from_str(raw) {
		Ok(credential) => Some(credential),
		Err(e) => {
			obs::warn_event("credential_store.load", format_args!("Failed to read auth payload: {e}."));

			None
		},
	}
}
