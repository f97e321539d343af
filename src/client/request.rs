//! Request pipeline: header assembly, the bounded 401 retry, and response decoding.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::Client,
	error::{ConfigError, HttpError},
	http::{HttpRequest, HttpResponse, HttpTransport, Method},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
};

/// Position of a logical call inside the renewal protocol.
///
/// A call starts in `Attempting`; a 401 may move it to `RetryingAfterRenewal` once. There is no
/// transition out of `RetryingAfterRenewal`, which caps every call at a single retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AttemptState {
	Attempting,
	RetryingAfterRenewal,
}

impl<C> Client<C>
where
	C: ?Sized + HttpTransport,
{
	/// Runs a JSON exchange and converts the response into a payload or an [`HttpError`].
	pub(crate) async fn request_json(
		&self,
		method: Method,
		path: &str,
		body: Option<Vec<u8>>,
		authenticated: bool,
	) -> Result<Option<serde_json::Value>> {
		let kind = OperationKind::Request;
		let span = OperationSpan::new(kind, method.as_str());

		obs::record_operation_outcome(kind, OperationOutcome::Attempt);

		let result = span
			.instrument(async move {
				let response = self.exchange(method, path, body, authenticated).await?;

				into_payload(response)
			})
			.await;

		match &result {
			Ok(_) => obs::record_operation_outcome(kind, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(kind, OperationOutcome::Failure),
		}

		result
	}

	/// Sends the request, renewing the session and re-issuing it at most once after a 401.
	pub(crate) async fn exchange(
		&self,
		method: Method,
		path: &str,
		body: Option<Vec<u8>>,
		authenticated: bool,
	) -> Result<HttpResponse> {
		let url = self.config.resolve(path)?;
		let body = if method == Method::Get { None } else { body };
		let mut state = AttemptState::Attempting;

		loop {
			let credential = if authenticated { self.credential().await? } else { None };
			let request = build_request(
				method,
				url.clone(),
				credential.as_ref().map(|credential| credential.access_token()),
				body.clone(),
			);
			let response = self.transport.send(request).await?;

			if response.status != 401 || state == AttemptState::RetryingAfterRenewal {
				return Ok(response);
			}

			let Some(rejected) = credential else {
				return Ok(response);
			};

			obs::debug_event(
				"client.exchange",
				format_args!("{method} {path} was rejected with 401; renewing the session."),
			);

			if !self.renew_after_rejection(&rejected).await {
				return Ok(response);
			}

			state = AttemptState::RetryingAfterRenewal;
		}
	}
}

/// Assembles headers for one attempt.
pub(crate) fn build_request(
	method: Method,
	url: Url,
	bearer: Option<&TokenSecret>,
	body: Option<Vec<u8>>,
) -> HttpRequest {
	let mut headers = vec![("Content-Type".to_owned(), "application/json".to_owned())];

	if let Some(token) = bearer.filter(|token| !token.is_empty()) {
		headers.push(("Authorization".to_owned(), token.bearer()));
	}

	HttpRequest { method, url, headers, body }
}

/// Serializes a request body as JSON.
pub(crate) fn encode_body<B>(body: &B) -> Result<Vec<u8>>
where
	B: ?Sized + Serialize,
{
	serde_json::to_vec(body)
		.map_err(|source| ConfigError::RequestBody { source: Arc::new(source) }.into())
}

/// Converts a final response into its JSON payload, or an [`HttpError`] for non-success codes.
pub(crate) fn into_payload(response: HttpResponse) -> Result<Option<serde_json::Value>> {
	if response.is_success() {
		return parse_json(&response);
	}

	// Error bodies are best-effort: a garbled body must not mask the status.
	let payload = parse_json(&response).ok().flatten();

	Err(HttpError { status: response.status, metadata: response.metadata(), payload }.into())
}

/// Parses a JSON body; non-JSON content types and empty bodies resolve to `None`.
pub(crate) fn parse_json(response: &HttpResponse) -> Result<Option<serde_json::Value>> {
	if !response.is_json() || response.body.iter().all(u8::is_ascii_whitespace) {
		return Ok(None);
	}

	let de = &mut serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(de).map(Some).map_err(Error::decode)
}

/// Decodes a payload that the caller requires to be present.
pub(crate) fn decode_required<T>(
	method: Method,
	path: &str,
	payload: Option<serde_json::Value>,
) -> Result<T>
where
	T: DeserializeOwned,
{
	let payload = payload.ok_or_else(|| {
		Error::application(format!("Expected a JSON body from {method} {path}."))
	})?;

	serde_path_to_error::deserialize(payload).map_err(Error::decode)
}
