//! Thread-safe in-memory [`CredentialStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{self, CompareAndSwapOutcome, CredentialStore, StoreError, StoreFuture},
};

type Slot = Arc<RwLock<Option<String>>>;

/// In-process storage backend that keeps the serialized payload for tests and demos.
///
/// Clones share the same slot, mirroring how every tab of a browser shares one local storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Slot);
impl MemoryStore {
	/// Creates a store that already holds `credential`.
	pub fn with_credential(credential: &Credential) -> Result<Self, StoreError> {
		let raw = store::encode_payload(credential)?;

		Ok(Self::with_raw(raw))
	}

	/// Creates a store holding an arbitrary raw payload (which may be malformed).
	pub fn with_raw(raw: impl Into<String>) -> Self {
		Self(Arc::new(RwLock::new(Some(raw.into()))))
	}

	/// Returns the raw persisted payload.
	pub fn raw(&self) -> Option<String> {
		self.0.read().clone()
	}

	fn load_now(slot: &Slot) -> Option<Credential> {
		slot.read().as_deref().and_then(store::decode_payload)
	}

	fn save_now(slot: &Slot, credential: Option<Credential>) -> Result<(), StoreError> {
		let raw = credential.as_ref().map(store::encode_payload).transpose()?;

		*slot.write() = raw;

		Ok(())
	}

	fn compare_and_swap_now(
		slot: &Slot,
		expected_refresh: &str,
		replacement: Option<Credential>,
	) -> Result<CompareAndSwapOutcome, StoreError> {
		let raw = replacement.as_ref().map(store::encode_payload).transpose()?;
		let mut slot = slot.write();
		let current = slot.as_deref().and_then(store::decode_payload);
		let outcome = CompareAndSwapOutcome::for_current(current.as_ref(), expected_refresh);

		if outcome == CompareAndSwapOutcome::Updated {
			*slot = raw;
		}

		Ok(outcome)
	}
}
impl CredentialStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Option<Credential>> {
		let slot = self.0.clone();

		Box::pin(async move { Ok(Self::load_now(&slot)) })
	}

	fn save(&self, credential: Option<Credential>) -> StoreFuture<'_, ()> {
		let slot = self.0.clone();

		Box::pin(async move { Self::save_now(&slot, credential) })
	}

	fn compare_and_swap<'a>(
		&'a self,
		expected_refresh: &'a str,
		replacement: Option<Credential>,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		let slot = self.0.clone();

		Box::pin(async move { Self::compare_and_swap_now(&slot, expected_refresh, replacement) })
	}
}
