//! Single-flight action guard with observable loading/error/data state.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use tokio::sync::watch;
// self
use crate::{_prelude::*, action::Execution, obs};

/// Boxed future produced by a guarded operation.
pub type ActionFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

type Operation<A, T, E> = Arc<dyn Fn(A) -> ActionFuture<T, E> + Send + Sync>;
type Hook<V> = Arc<dyn Fn(&V) + Send + Sync>;
type FinallyHook = Arc<dyn Fn() + Send + Sync>;

/// Lifecycle phase of a guard.
///
/// `Succeeded` and `Failed` are settled phases; they accept new invocations exactly like `Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActionPhase {
	/// Never ran, or reset.
	#[default]
	Idle,
	/// An invocation is outstanding.
	Running,
	/// The last invocation succeeded.
	Succeeded,
	/// The last invocation failed.
	Failed,
}

/// Snapshot of a guard's observable state.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionState<T, E> {
	/// Current lifecycle phase.
	pub phase: ActionPhase,
	/// `true` from acceptance until settlement.
	pub is_loading: bool,
	/// Failure recorded by the last settled invocation; cleared when a new one starts.
	pub error: Option<E>,
	/// Value recorded by the last successful invocation.
	pub data: Option<T>,
}
impl<T, E> Default for ActionState<T, E> {
	fn default() -> Self {
		Self { phase: ActionPhase::Idle, is_loading: false, error: None, data: None }
	}
}

/// Optional side-effect hooks invoked after an invocation settles.
pub struct ActionHooks<T, E> {
	on_success: Option<Hook<T>>,
	on_error: Option<Hook<E>>,
	on_finally: Option<FinallyHook>,
}
impl<T, E> ActionHooks<T, E> {
	/// Creates an empty hook set.
	pub fn new() -> Self {
		Self { on_success: None, on_error: None, on_finally: None }
	}

	/// Runs `hook` with the value of every successful invocation.
	pub fn on_success(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
		self.on_success = Some(Arc::new(hook));

		self
	}

	/// Runs `hook` with the failure of every failed invocation.
	pub fn on_error(mut self, hook: impl Fn(&E) + Send + Sync + 'static) -> Self {
		self.on_error = Some(Arc::new(hook));

		self
	}

	/// Runs `hook` after every settled invocation.
	pub fn on_finally(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
		self.on_finally = Some(Arc::new(hook));

		self
	}
}
impl<T, E> Default for ActionHooks<T, E> {
	fn default() -> Self {
		Self::new()
	}
}
impl<T, E> Clone for ActionHooks<T, E> {
	fn clone(&self) -> Self {
		Self {
			on_success: self.on_success.clone(),
			on_error: self.on_error.clone(),
			on_finally: self.on_finally.clone(),
		}
	}
}
impl<T, E> Debug for ActionHooks<T, E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ActionHooks")
			.field("on_success", &self.on_success.is_some())
			.field("on_error", &self.on_error.is_some())
			.field("on_finally", &self.on_finally.is_some())
			.finish()
	}
}

struct GuardInner<A, T, E> {
	operation: Operation<A, T, E>,
	hooks: ActionHooks<T, E>,
	state: watch::Sender<ActionState<T, E>>,
	// Bumped on every accepted invocation and on reset; settlements from older runs are dropped.
	epoch: AtomicU64,
}
impl<A, T, E> GuardInner<A, T, E> {
	// Returns `false` when a reset superseded `run`; nothing is recorded then.
	fn settle(&self, run: u64, apply: impl FnOnce(&mut ActionState<T, E>)) -> bool {
		self.state.send_if_modified(|state| {
			if self.epoch.load(Ordering::SeqCst) != run {
				return false;
			}

			apply(state);

			true
		})
	}
}

/// Single-flight wrapper around one async operation.
///
/// Clones share state, so a guard can be handed to several UI controls (or to a
/// [`DebouncedAction`](crate::action::DebouncedAction)) while still allowing only one
/// outstanding invocation.
pub struct ActionGuard<A, T, E = Error> {
	inner: Arc<GuardInner<A, T, E>>,
}
impl<A, T, E> ActionGuard<A, T, E>
where
	A: 'static + Send,
	T: 'static + Clone + Send + Sync,
	E: 'static + Clone + Send + Sync,
{
	/// Wraps `operation` without hooks.
	pub fn new<F, Fut>(operation: F) -> Self
	where
		F: 'static + Fn(A) -> Fut + Send + Sync,
		Fut: 'static + Future<Output = Result<T, E>> + Send,
	{
		Self::with_hooks(operation, ActionHooks::new())
	}

	/// Wraps `operation` and runs `hooks` after each settled invocation.
	pub fn with_hooks<F, Fut>(operation: F, hooks: ActionHooks<T, E>) -> Self
	where
		F: 'static + Fn(A) -> Fut + Send + Sync,
		Fut: 'static + Future<Output = Result<T, E>> + Send,
	{
		let operation: Operation<A, T, E> =
			Arc::new(move |args| -> ActionFuture<T, E> { Box::pin(operation(args)) });
		let (state, _) = watch::channel(ActionState::default());

		Self { inner: Arc::new(GuardInner { operation, hooks, state, epoch: AtomicU64::new(0) }) }
	}

	/// Invokes the operation unless an invocation is already outstanding.
	///
	/// A dropped trigger returns [`Execution::AlreadyRunning`] immediately and leaves the state
	/// untouched. Otherwise the guard records the outcome, clears the loading flag, runs the
	/// hooks, and then hands the outcome back; failures are returned unchanged.
	pub async fn execute(&self, args: A) -> Result<Execution<T>, E> {
		let inner: &GuardInner<A, T, E> = &self.inner;
		let mut run = 0;
		let accepted = inner.state.send_if_modified(|state| {
			if state.is_loading {
				return false;
			}

			run = inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
			state.phase = ActionPhase::Running;
			state.is_loading = true;
			state.error = None;

			true
		});

		if !accepted {
			obs::debug_event("action.execute", "Invocation dropped; the action is already running.");

			return Ok(Execution::AlreadyRunning);
		}

		let mut pending = PendingRun { inner, run, settled: false };
		let result = (inner.operation)(args).await;

		pending.settled = true;

		match result {
			Ok(value) => {
				let current = inner.settle(run, |state| {
					state.phase = ActionPhase::Succeeded;
					state.is_loading = false;
					state.data = Some(value.clone());
				});

				if current {
					if let Some(hook) = &inner.hooks.on_success {
						hook(&value);
					}
					if let Some(hook) = &inner.hooks.on_finally {
						hook();
					}
				}

				Ok(Execution::Completed(value))
			},
			Err(err) => {
				let current = inner.settle(run, |state| {
					state.phase = ActionPhase::Failed;
					state.is_loading = false;
					state.error = Some(err.clone());
				});

				if current {
					if let Some(hook) = &inner.hooks.on_error {
						hook(&err);
					}
					if let Some(hook) = &inner.hooks.on_finally {
						hook();
					}
				}

				Err(err)
			},
		}
	}

	/// Forces the guard back to [`ActionPhase::Idle`] with cleared error and data.
	///
	/// An invocation still outstanding at reset time keeps running and its caller still receives
	/// the outcome, but the outcome is no longer recorded in the state and no hooks run for it.
	pub fn reset(&self) {
		self.inner.state.send_modify(|state| {
			self.inner.epoch.fetch_add(1, Ordering::SeqCst);
			*state = ActionState::default();
		});
	}

	/// Returns a snapshot of the current state.
	pub fn state(&self) -> ActionState<T, E> {
		self.inner.state.borrow().clone()
	}

	/// Returns the current phase.
	pub fn phase(&self) -> ActionPhase {
		self.inner.state.borrow().phase
	}

	/// Returns `true` while an invocation is outstanding.
	pub fn is_loading(&self) -> bool {
		self.inner.state.borrow().is_loading
	}

	/// Returns the failure recorded by the last settled invocation.
	pub fn error(&self) -> Option<E> {
		self.inner.state.borrow().error.clone()
	}

	/// Returns the value recorded by the last successful invocation.
	pub fn data(&self) -> Option<T> {
		self.inner.state.borrow().data.clone()
	}

	/// Subscribes to state changes, e.g. to drive a spinner.
	pub fn subscribe(&self) -> watch::Receiver<ActionState<T, E>> {
		self.inner.state.subscribe()
	}
}
impl<A, T, E> Clone for ActionGuard<A, T, E> {
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone() }
	}
}
impl<A, T, E> Debug for ActionGuard<A, T, E>
where
	T: Debug,
	E: Debug,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ActionGuard")
			.field("state", &*self.inner.state.borrow())
			.field("hooks", &self.inner.hooks)
			.finish()
	}
}

// Clears the loading flag when the caller drops `execute` before the operation settles.
struct PendingRun<'a, A, T, E> {
	inner: &'a GuardInner<A, T, E>,
	run: u64,
	settled: bool,
}
impl<A, T, E> Drop for PendingRun<'_, A, T, E> {
	fn drop(&mut self) {
		if !self.settled {
			self.inner.settle(self.run, |state| {
				state.phase = ActionPhase::Idle;
				state.is_loading = false;
			});
		}
	}
}
