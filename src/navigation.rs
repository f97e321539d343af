//! Route guard that keeps anonymous users on public pages.

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, client::Client, http::HttpTransport};

/// Login page path.
pub const LOGIN_PATH: &str = "/login";
/// Paths reachable without a session.
pub const PUBLIC_ROUTES: [&str; 1] = [LOGIN_PATH];

/// Decision returned by [`guard_route`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteDecision {
	/// Navigation may proceed.
	Allow,
	/// Navigation must go to `location` instead.
	Redirect {
		/// Target including the `redirect` query that points back at the requested path.
		location: String,
	},
}
impl RouteDecision {
	/// Returns `true` for [`RouteDecision::Allow`].
	pub fn is_allowed(&self) -> bool {
		matches!(self, Self::Allow)
	}
}

/// Decides whether navigation to `full_path` (path plus optional query/fragment) may proceed.
pub fn guard_route(full_path: &str, authenticated: bool) -> RouteDecision {
	let path = full_path.split(['?', '#']).next().unwrap_or_default();

	if authenticated || PUBLIC_ROUTES.contains(&path) {
		return RouteDecision::Allow;
	}

	let query = form_urlencoded::Serializer::new(String::new())
		.append_pair("redirect", full_path)
		.finish();

	RouteDecision::Redirect { location: format!("{LOGIN_PATH}?{query}") }
}

/// Extracts the `redirect` target from a login page query string, if it is a local path.
///
/// Targets that do not start with a single `/` are ignored so the login page cannot be used as
/// an open redirect.
pub fn redirect_target(query: &str) -> Option<String> {
	form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
		.find(|(key, _)| key == "redirect")
		.map(|(_, value)| value.into_owned())
		.filter(|target| target.starts_with('/') && !target.starts_with("//"))
}

impl<C> Client<C>
where
	C: ?Sized + HttpTransport,
{
	/// Applies [`guard_route`] using the client's current session.
	pub async fn guard_route(&self, full_path: &str) -> Result<RouteDecision> {
		Ok(guard_route(full_path, self.is_authenticated().await?))
	}
}
