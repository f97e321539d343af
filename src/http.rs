//! Transport primitives for backend exchanges.
//!
//! The module exposes [`HttpTransport`] alongside the crate-owned [`HttpRequest`],
//! [`HttpResponse`], and [`ResponseMetadata`] types so downstream crates can plug in a custom
//! HTTP stack (or a test double) without depending on reqwest structures. The client builds
//! every request, including headers and the serialized JSON body, before handing it to the
//! transport; the transport only moves bytes.

// std
use std::collections::btree_map;
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute one request/response exchange.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared behind an
/// `Arc` by every clone of the client. Any response that arrives, regardless of status, must be
/// returned as `Ok`; only failures that prevent a response (DNS, TCP, TLS, timeouts) map to
/// [`TransportError`].
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and returns the raw response.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// HTTP verbs used by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Fully prepared outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
	/// Request verb.
	pub method: Method,
	/// Absolute target URL.
	pub url: Url,
	/// Header name/value pairs in insertion order.
	pub headers: Vec<(String, String)>,
	/// Serialized body, if any.
	pub body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Case-insensitive response header map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseHeaders(BTreeMap<String, String>);
impl ResponseHeaders {
	/// Inserts a header, lower-casing the name.
	pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
		self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
	}

	/// Looks up a header by name (case-insensitive).
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Iterates over `(name, value)` pairs.
	pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
		self.0.iter()
	}
}
impl<K, V> FromIterator<(K, V)> for ResponseHeaders
where
	K: AsRef<str>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut headers = Self::default();

		for (name, value) in iter {
			headers.insert(name, value);
		}

		headers
	}
}

/// Raw response returned by a transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: ResponseHeaders,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Creates a response with the provided status and no headers or body.
	pub fn new(status: u16) -> Self {
		Self { status, ..Default::default() }
	}

	/// Creates a JSON response from a serializable value.
	pub fn json(status: u16, value: &serde_json::Value) -> Self {
		let mut response = Self::new(status);

		response.headers.insert("content-type", "application/json");
		response.body = value.to_string().into_bytes();

		response
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` when the response advertises a JSON content type.
	pub fn is_json(&self) -> bool {
		self.headers.get("content-type").is_some_and(|value| value.contains("application/json"))
	}

	/// Captures status and hint headers for error reporting.
	pub fn metadata(&self) -> ResponseMetadata {
		ResponseMetadata {
			status: Some(self.status),
			retry_after: parse_retry_after(&self.headers),
			headers: self.headers.clone(),
		}
	}
}

/// Metadata from an HTTP response, preserved on [`HttpError`](crate::error::HttpError).
///
/// Additional metadata fields may be added in future releases, so downstream code
/// should construct values using field names instead of struct update syntax.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Response headers as received.
	pub headers: ResponseHeaders,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn execute(client: ReqwestClient, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let method = match request.method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Delete => reqwest::Method::DELETE,
		};
		let mut builder = client.request(method, request.url);

		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(body) = request.body {
			builder = builder.body(body);
		}

		let response = builder.send().await?;
		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value)))
			.collect::<ResponseHeaders>();
		let body = response.bytes().await?.to_vec();

		Ok(HttpResponse { status, headers, body })
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
		Box::pin(Self::execute(self.0.clone(), request))
	}
}

fn parse_retry_after(headers: &ResponseHeaders) -> Option<Duration> {
	let raw = headers.get("retry-after")?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn response_headers_are_case_insensitive() {
		let headers: ResponseHeaders = [("Content-Type", "application/json; charset=utf-8")]
			.into_iter()
			.collect();
		let response = HttpResponse { status: 200, headers, body: b"{}".to_vec() };

		assert!(response.is_json());
		assert_eq!(response.headers.get("CONTENT-TYPE"), Some("application/json; charset=utf-8"));
	}

	#[test]
	fn retry_after_accepts_delta_seconds() {
		let mut response = HttpResponse::new(429);

		response.headers.insert("Retry-After", "12");

		let metadata = response.metadata();

		assert_eq!(metadata.status, Some(429));
		assert_eq!(metadata.retry_after, Some(Duration::seconds(12)));
	}

	#[test]
	fn retry_after_ignores_dates_in_the_past() {
		let mut response = HttpResponse::new(503);

		response.headers.insert("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT");

		assert_eq!(response.metadata().retry_after, None);
	}

	#[test]
	fn request_header_lookup_ignores_case() {
		let request = HttpRequest {
			method: Method::Get,
			url: Url::parse("http://localhost:5000/auth").expect("Fixture URL should parse."),
			headers: vec![("Authorization".into(), "Bearer abc".into())],
			body: None,
		};

		assert_eq!(request.header("authorization"), Some("Bearer abc"));
		assert_eq!(request.method.to_string(), "GET");
	}
}
