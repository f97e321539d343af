//! Client-level error types shared across the transport, stores, and action guards.

// self
use crate::{_prelude::*, http::ResponseMetadata};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn StdError + Send + Sync>;

/// Fallback shown when an exchange never reached the backend.
pub const UNREACHABLE_BACKEND_MESSAGE: &str = "Unable to reach the backend.";

/// Canonical client error exposed by public APIs.
///
/// Every variant is cheap to clone so action guards can record a failure and still hand the same
/// value back to the caller.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// The exchange could not complete (offline, DNS, TLS, timeout).
	#[error(transparent)]
	Network(#[from] TransportError),
	/// The backend answered with a non-success status.
	#[error(transparent)]
	Http(#[from] HttpError),
	/// The exchange completed but its content violates the client contract.
	#[error("{message}")]
	Application {
		/// Human-readable description of the violation.
		message: String,
	},
	/// A JSON body did not match the expected shape.
	#[error("Response body does not match the expected shape at `{path}`.")]
	Decode {
		/// Path to the offending field.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_json::Error>,
	},
	/// Credential store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Builds an [`Error::Application`] from any message.
	pub fn application(message: impl Into<String>) -> Self {
		Self::Application { message: message.into() }
	}

	/// Extracts a message suitable for end users.
	///
	/// HTTP failures prefer the server-supplied `message` field, network failures always use
	/// [`UNREACHABLE_BACKEND_MESSAGE`], and the remaining variants fall back to `fallback`.
	pub fn user_message(&self, fallback: &str) -> String {
		match self {
			Self::Network(_) => UNREACHABLE_BACKEND_MESSAGE.into(),
			Self::Http(e) => e.message().unwrap_or(fallback).into(),
			Self::Application { message } if !message.is_empty() => message.clone(),
			Self::Application { .. } | Self::Decode { .. } | Self::Storage(_) | Self::Config(_) =>
				fallback.into(),
		}
	}

	/// Returns the HTTP status code when the failure came from a response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Http(e) => Some(e.status),
			_ => None,
		}
	}

	pub(crate) fn decode(source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = source.path().to_string();

		Self::Decode { path, source: Arc::new(source.into_inner()) }
	}
}

/// Non-success HTTP exchange surfaced to callers.
#[derive(Clone, Debug, ThisError)]
#[error("HTTP {status}")]
pub struct HttpError {
	/// Status code returned by the backend.
	pub status: u16,
	/// Response headers and hints captured from the exchange.
	pub metadata: ResponseMetadata,
	/// JSON body extracted from the response, when it carried one.
	pub payload: Option<serde_json::Value>,
}
impl HttpError {
	/// Returns the `message` field of the JSON payload, if present and non-empty.
	pub fn message(&self) -> Option<&str> {
		self.payload
			.as_ref()
			.and_then(|payload| payload.get("message"))
			.and_then(serde_json::Value::as_str)
			.filter(|message| !message.is_empty())
	}

	/// Returns `true` for `401 Unauthorized`.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Raw value that failed to parse.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request path cannot be joined onto the base URL.
	#[error("Path `{path}` cannot be resolved against the base URL.")]
	InvalidPath {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody {
		/// Underlying serialization failure.
		#[source]
		source: Arc<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[source] Arc<std::io::Error>),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}
impl From<std::io::Error> for TransportError {
	fn from(e: std::io::Error) -> Self {
		Self::Io(Arc::new(e))
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn http_error(status: u16, payload: Option<serde_json::Value>) -> HttpError {
		HttpError { status, metadata: ResponseMetadata::default(), payload }
	}

	#[test]
	fn user_message_prefers_server_payload() {
		let err = Error::from(http_error(409, Some(serde_json::json!({ "message": "Duplicate." }))));

		assert_eq!(err.user_message("Failed to add item"), "Duplicate.");
		assert_eq!(err.status(), Some(409));
	}

	#[test]
	fn user_message_falls_back_for_empty_or_missing_payloads() {
		let empty = Error::from(http_error(500, Some(serde_json::json!({ "message": "" }))));
		let missing = Error::from(http_error(500, None));

		assert_eq!(empty.user_message("Sync failed"), "Sync failed");
		assert_eq!(missing.user_message("Sync failed"), "Sync failed");
	}

	#[test]
	fn network_failures_always_report_unreachable_backend() {
		let err = Error::from(TransportError::from(std::io::Error::other("offline")));

		assert_eq!(err.user_message("ignored"), UNREACHABLE_BACKEND_MESSAGE);
		assert_eq!(err.status(), None);
	}

	#[test]
	fn application_errors_carry_their_own_message() {
		let err = Error::application("Login response is missing credentials.");

		assert_eq!(err.user_message("fallback"), "Login response is missing credentials.");
		assert_eq!(err.to_string(), "Login response is missing credentials.");
	}
}
