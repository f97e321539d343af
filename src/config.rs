//! Client configuration: backend location, authentication endpoint, and renewal policy.

// std
use std::env;
// self
use crate::{_prelude::*, error::ConfigError};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
/// Environment variable consulted by [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "PWRANK_API_BASE_URL";
/// Path of the authentication endpoint (login + renewal).
pub const DEFAULT_AUTH_PATH: &str = "/auth";

/// How concurrent 401 responses share the renewal exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenewalMode {
	/// Every 401 performs its own renewal exchange; the last writer wins.
	Independent,
	/// Renewals are serialized, and callers that queued behind a successful renewal reuse the
	/// replacement token instead of issuing another exchange.
	#[default]
	Coalesced,
}

/// Immutable settings shared by every clone of a [`Client`](crate::client::Client).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	base_url: Url,
	base: String,
	auth_path: String,
	renewal_mode: RenewalMode,
}
impl ClientConfig {
	/// Builds a configuration for the provided base URL.
	pub fn new(base_url: impl AsRef<str>) -> Result<Self, ConfigError> {
		let raw = base_url.as_ref().trim();
		let parsed = Url::parse(raw)
			.map_err(|source| ConfigError::InvalidBaseUrl { value: raw.to_owned(), source })?;

		Ok(Self {
			base_url: parsed,
			base: raw.trim_end_matches('/').to_owned(),
			auth_path: DEFAULT_AUTH_PATH.to_owned(),
			renewal_mode: RenewalMode::default(),
		})
	}

	/// Reads the base URL from [`BASE_URL_ENV`], falling back to [`DEFAULT_BASE_URL`].
	pub fn from_env() -> Result<Self, ConfigError> {
		match env::var(BASE_URL_ENV) {
			Ok(value) if !value.trim().is_empty() => Self::new(value),
			_ => Self::new(DEFAULT_BASE_URL),
		}
	}

	/// Overrides the authentication endpoint path.
	pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
		self.auth_path = normalize_path(path.into());

		self
	}

	/// Overrides the renewal policy.
	pub fn with_renewal_mode(mut self, mode: RenewalMode) -> Self {
		self.renewal_mode = mode;

		self
	}

	/// Returns the parsed base URL.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Returns the authentication endpoint path.
	pub fn auth_path(&self) -> &str {
		&self.auth_path
	}

	/// Returns the renewal policy.
	pub fn renewal_mode(&self) -> RenewalMode {
		self.renewal_mode
	}

	/// Resolves `path` against the base URL by concatenation, so base paths are preserved.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		let path = normalize_path(path.to_owned());

		Url::parse(&format!("{}{path}", self.base))
			.map_err(|source| ConfigError::InvalidPath { path, source })
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: Url::parse(DEFAULT_BASE_URL).expect("Default base URL must be valid."),
			base: DEFAULT_BASE_URL.to_owned(),
			auth_path: DEFAULT_AUTH_PATH.to_owned(),
			renewal_mode: RenewalMode::default(),
		}
	}
}

fn normalize_path(path: String) -> String {
	if path.starts_with('/') { path } else { format!("/{path}") }
}
