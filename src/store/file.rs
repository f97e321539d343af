//! File-backed [`CredentialStore`] for command-line tools and desktop shells.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	store::{self, CompareAndSwapOutcome, CredentialStore, StoreError, StoreFuture},
};

/// Persists the credential payload to a single JSON file; a missing file means "logged out".
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	write_lock: Arc<Mutex<()>>,
}
impl FileStore {
	/// Opens a store at the provided path, creating parent directories on demand.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		Ok(Self { path, write_lock: Default::default() })
	}

	/// Opens a store named after [`STORAGE_KEY`](store::STORAGE_KEY) inside `dir`.
	pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
		Self::open(dir.as_ref().join(format!("{}.json", store::STORAGE_KEY)))
	}

	/// Returns the file path backing this store.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn load_now(&self) -> Result<Option<Credential>, StoreError> {
		let raw = match fs::read_to_string(&self.path) {
			Ok(raw) => raw,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => {
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", self.path.display()),
				});
			},
		};

		Ok(store::decode_payload(&raw))
	}

	fn save_now(&self, credential: Option<Credential>) -> Result<(), StoreError> {
		let _guard = self.write_lock.lock();

		self.write_locked(credential)
	}

	fn compare_and_swap_now(
		&self,
		expected_refresh: &str,
		replacement: Option<Credential>,
	) -> Result<CompareAndSwapOutcome, StoreError> {
		let _guard = self.write_lock.lock();
		let outcome =
			CompareAndSwapOutcome::for_current(self.load_now()?.as_ref(), expected_refresh);

		if outcome == CompareAndSwapOutcome::Updated {
			self.write_locked(replacement)?;
		}

		Ok(outcome)
	}

	// Callers hold `write_lock`.
	fn write_locked(&self, credential: Option<Credential>) -> Result<(), StoreError> {
		match credential {
			Some(credential) => self.persist(&store::encode_payload(&credential)?),
			None => match fs::remove_file(&self.path) {
				Ok(()) => Ok(()),
				Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
				Err(e) => Err(StoreError::Backend {
					message: format!("Failed to remove {}: {e}", self.path.display()),
				}),
			},
		}
	}

	fn persist(&self, serialized: &str) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(serialized.as_bytes()).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl CredentialStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Option<Credential>> {
		Box::pin(async move { self.load_now() })
	}

	fn save(&self, credential: Option<Credential>) -> StoreFuture<'_, ()> {
		Box::pin(async move { self.save_now(credential) })
	}

	fn compare_and_swap<'a>(
		&'a self,
		expected_refresh: &'a str,
		replacement: Option<Credential>,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		Box::pin(async move { self.compare_and_swap_now(expected_refresh, replacement) })
	}
}
