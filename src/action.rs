//! State-guarded async actions for UI controls.
//!
//! [`ActionGuard`] wraps one logical operation and enforces single-flight execution: while an
//! invocation is outstanding, further triggers return [`Execution::AlreadyRunning`] without
//! touching the operation. [`DebouncedAction`] delays a guard until a quiet period elapses, and
//! [`ActionRegistry`] builds a named set of independent guards for multi-action surfaces.

pub mod debounce;
pub mod guard;
pub mod registry;

pub use debounce::*;
pub use guard::*;
pub use registry::*;

/// Outcome of a guarded invocation that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Execution<T> {
	/// The operation ran and produced a value.
	Completed(T),
	/// Another invocation was outstanding; this trigger was dropped.
	AlreadyRunning,
}
impl<T> Execution<T> {
	/// Returns `true` when the operation ran.
	pub fn is_completed(&self) -> bool {
		matches!(self, Self::Completed(_))
	}

	/// Returns `true` when the trigger was dropped.
	pub fn is_already_running(&self) -> bool {
		matches!(self, Self::AlreadyRunning)
	}

	/// Converts into the completed value, if any.
	pub fn completed(self) -> Option<T> {
		match self {
			Self::Completed(value) => Some(value),
			Self::AlreadyRunning => None,
		}
	}

	/// Maps the completed value.
	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Execution<U> {
		match self {
			Self::Completed(value) => Execution::Completed(f(value)),
			Self::AlreadyRunning => Execution::AlreadyRunning,
		}
	}
}
