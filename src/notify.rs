//! User-facing notifications emitted by session operations.
//!
//! The crate never renders anything itself; it hands [`Notification`] values to a [`Notifier`]
//! supplied by the embedding application. [`TracingNotifier`] is the default and turns every
//! notification into a log event.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, constants};

/// Notification severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	/// An operation completed.
	Success,
	/// Neutral information.
	Info,
	/// Partial success or a recoverable problem.
	Warn,
	/// An operation failed.
	Error,
}
impl Severity {
	/// Returns the wire/display name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Success => "success",
			Self::Info => "info",
			Self::Warn => "warn",
			Self::Error => "error",
		}
	}

	/// Returns how long notifications of this severity stay visible by default.
	pub const fn default_lifetime(self) -> StdDuration {
		match self {
			Self::Success => constants::TOAST_DURATION_SHORT,
			Self::Info | Self::Warn => constants::TOAST_DURATION_NORMAL,
			Self::Error => constants::TOAST_DURATION_LONG,
		}
	}
}
impl Display for Severity {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A single message for the notification surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
	/// Severity of the message.
	pub severity: Severity,
	/// Short title.
	pub summary: String,
	/// Optional longer text; empty when absent.
	pub detail: String,
	/// How long the message stays visible.
	pub lifetime: StdDuration,
}
impl Notification {
	/// Creates a notification with the severity's default lifetime.
	pub fn new(severity: Severity, summary: impl Into<String>, detail: impl Into<String>) -> Self {
		Self {
			severity,
			summary: summary.into(),
			detail: detail.into(),
			lifetime: severity.default_lifetime(),
		}
	}

	/// Creates a success notification.
	pub fn success(summary: impl Into<String>, detail: impl Into<String>) -> Self {
		Self::new(Severity::Success, summary, detail)
	}

	/// Creates an informational notification.
	pub fn info(summary: impl Into<String>, detail: impl Into<String>) -> Self {
		Self::new(Severity::Info, summary, detail)
	}

	/// Creates a warning notification.
	pub fn warn(summary: impl Into<String>, detail: impl Into<String>) -> Self {
		Self::new(Severity::Warn, summary, detail)
	}

	/// Creates an error notification whose detail is extracted from `error`.
	///
	/// The summary doubles as the detail when the error carries no user-facing message.
	pub fn error(summary: impl Into<String>, error: &Error) -> Self {
		let summary = summary.into();
		let detail = error.user_message(&summary);

		Self::new(Severity::Error, summary, detail)
	}

	/// Creates an error notification with a literal detail.
	pub fn error_message(summary: impl Into<String>, detail: impl Into<String>) -> Self {
		Self::new(Severity::Error, summary, detail)
	}

	/// Overrides the lifetime.
	pub fn with_lifetime(mut self, lifetime: StdDuration) -> Self {
		self.lifetime = lifetime;

		self
	}
}

/// Sink for [`Notification`]s.
pub trait Notifier: Send + Sync {
	/// Delivers one notification. Must not block.
	fn notify(&self, notification: Notification);
}

/// Notifier that logs every notification through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;
impl Notifier for TracingNotifier {
	fn notify(&self, notification: Notification) {
		#[cfg(feature = "tracing")]
		{
			let Notification { severity, summary, detail, .. } = &notification;

			match severity {
				Severity::Error => tracing::error!(%severity, %summary, %detail, "notification"),
				Severity::Warn => tracing::warn!(%severity, %summary, %detail, "notification"),
				Severity::Success | Severity::Info =>
					tracing::info!(%severity, %summary, %detail, "notification"),
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = notification;
		}
	}
}

/// Notifier that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotifier;
impl Notifier for NullNotifier {
	fn notify(&self, _: Notification) {}
}

/// Notifier that keeps every notification in memory, for tests and headless embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryNotifier(Arc<Mutex<Vec<Notification>>>);
impl MemoryNotifier {
	/// Returns a copy of everything delivered so far.
	pub fn notifications(&self) -> Vec<Notification> {
		self.0.lock().clone()
	}

	/// Drains everything delivered so far.
	pub fn take(&self) -> Vec<Notification> {
		std::mem::take(&mut *self.0.lock())
	}
}
impl Notifier for MemoryNotifier {
	fn notify(&self, notification: Notification) {
		self.0.lock().push(notification);
	}
}
