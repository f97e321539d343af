//! Named sets of independent action guards.

// self
use crate::{
	_prelude::*,
	action::{ActionGuard, ActionHooks, Execution},
};

/// A fixed set of named [`ActionGuard`]s sharing one signature.
///
/// Each entry keeps its own single-flight state; running `"save"` never blocks `"delete"`.
pub struct ActionRegistry<A, T, E = Error> {
	actions: BTreeMap<String, ActionGuard<A, T, E>>,
}
impl<A, T, E> ActionRegistry<A, T, E>
where
	A: 'static + Send,
	T: 'static + Clone + Send + Sync,
	E: 'static + Clone + Send + Sync,
{
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self { actions: BTreeMap::new() }
	}

	/// Registers `operation` under `name`, replacing any previous entry.
	pub fn with_action<F, Fut>(self, name: impl Into<String>, operation: F) -> Self
	where
		F: 'static + Fn(A) -> Fut + Send + Sync,
		Fut: 'static + Future<Output = Result<T, E>> + Send,
	{
		self.with_guard(name, ActionGuard::new(operation))
	}

	/// Registers `operation` with hooks under `name`.
	pub fn with_hooked_action<F, Fut>(
		self,
		name: impl Into<String>,
		operation: F,
		hooks: ActionHooks<T, E>,
	) -> Self
	where
		F: 'static + Fn(A) -> Fut + Send + Sync,
		Fut: 'static + Future<Output = Result<T, E>> + Send,
	{
		self.with_guard(name, ActionGuard::with_hooks(operation, hooks))
	}

	/// Registers an existing guard under `name`.
	pub fn with_guard(mut self, name: impl Into<String>, guard: ActionGuard<A, T, E>) -> Self {
		self.actions.insert(name.into(), guard);

		self
	}

	/// Returns the guard registered under `name`.
	pub fn get(&self, name: &str) -> Option<&ActionGuard<A, T, E>> {
		self.actions.get(name)
	}

	/// Runs the action registered under `name`; `None` when no such action exists.
	pub async fn execute(&self, name: &str, args: A) -> Option<Result<Execution<T>, E>> {
		match self.actions.get(name) {
			Some(guard) => Some(guard.execute(args).await),
			None => None,
		}
	}

	/// Returns `true` while any registered action is running.
	pub fn any_loading(&self) -> bool {
		self.actions.values().any(ActionGuard::is_loading)
	}

	/// Resets every registered action.
	pub fn reset_all(&self) {
		self.actions.values().for_each(ActionGuard::reset);
	}

	/// Iterates over registered names in sorted order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.actions.keys().map(String::as_str)
	}

	/// Returns the number of registered actions.
	pub fn len(&self) -> usize {
		self.actions.len()
	}

	/// Returns `true` when nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.actions.is_empty()
	}
}
impl<A, T, E> Default for ActionRegistry<A, T, E>
where
	A: 'static + Send,
	T: 'static + Clone + Send + Sync,
	E: 'static + Clone + Send + Sync,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<A, T, E, S> FromIterator<(S, ActionGuard<A, T, E>)> for ActionRegistry<A, T, E>
where
	S: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (S, ActionGuard<A, T, E>)>,
	{
		Self { actions: iter.into_iter().map(|(name, guard)| (name.into(), guard)).collect() }
	}
}
impl<A, T, E> Debug for ActionRegistry<A, T, E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ActionRegistry").field("actions", &self.actions.keys()).finish()
	}
}
