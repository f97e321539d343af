//! Trailing-edge debouncing on top of [`ActionGuard`].

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::task::JoinHandle;
// self
use crate::{_prelude::*, action::ActionGuard, constants, obs};

/// Quiet period used by [`DebouncedAction::with_default_delay`].
pub const DEFAULT_DEBOUNCE_DELAY: StdDuration = constants::SEARCH_DEBOUNCE;

struct Scheduled {
	ticket: u64,
	handle: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
	next_ticket: u64,
	scheduled: Option<Scheduled>,
}

/// Delays invocations of an [`ActionGuard`] until triggers stop arriving for `delay`.
///
/// Each trigger cancels the previously scheduled (not yet started) invocation and schedules a
/// new one with the latest arguments. Once an invocation has started it is never cancelled; it
/// runs through the wrapped guard and is subject to its single-flight rule. The timer runs on the
/// ambient Tokio runtime.
pub struct DebouncedAction<A, T, E = Error> {
	guard: ActionGuard<A, T, E>,
	delay: StdDuration,
	slot: Arc<Mutex<Slot>>,
}
impl<A, T, E> DebouncedAction<A, T, E>
where
	A: 'static + Send,
	T: 'static + Clone + Send + Sync,
	E: 'static + Clone + Display + Send + Sync,
{
	/// Debounces `guard` with the given quiet period.
	pub fn new(guard: ActionGuard<A, T, E>, delay: StdDuration) -> Self {
		Self { guard, delay, slot: Default::default() }
	}

	/// Debounces `guard` with [`DEFAULT_DEBOUNCE_DELAY`].
	pub fn with_default_delay(guard: ActionGuard<A, T, E>) -> Self {
		Self::new(guard, DEFAULT_DEBOUNCE_DELAY)
	}

	/// Schedules an invocation with `args`, replacing any pending one.
	///
	/// # Panics
	///
	/// Panics when called outside a Tokio runtime.
	pub fn execute(&self, args: A) {
		let mut slot = self.slot.lock();

		if let Some(previous) = slot.scheduled.take() {
			previous.handle.abort();
		}

		slot.next_ticket += 1;

		let ticket = slot.next_ticket;
		let guard = self.guard.clone();
		let delay = self.delay;
		let shared = self.slot.clone();
		let handle = tokio::spawn(async move {
			tokio::time::sleep(delay).await;

			{
				let mut slot = shared.lock();

				if slot.scheduled.as_ref().map(|scheduled| scheduled.ticket) != Some(ticket) {
					return;
				}

				slot.scheduled = None;
			}

			if let Err(e) = guard.execute(args).await {
				obs::warn_event("action.debounce", format_args!("Debounced action failed: {e}."));
			}
		});

		slot.scheduled = Some(Scheduled { ticket, handle });
	}

	/// Cancels the pending invocation, if one is still waiting for its quiet period.
	pub fn cancel(&self) {
		if let Some(previous) = self.slot.lock().scheduled.take() {
			previous.handle.abort();
		}
	}

	/// Returns `true` while an invocation is waiting for its quiet period.
	pub fn is_pending(&self) -> bool {
		self.slot.lock().scheduled.is_some()
	}

	/// Returns the configured quiet period.
	pub fn delay(&self) -> StdDuration {
		self.delay
	}

	/// Returns the wrapped guard, e.g. to observe its state.
	pub fn guard(&self) -> &ActionGuard<A, T, E> {
		&self.guard
	}
}
impl<A, T, E> Debug for DebouncedAction<A, T, E> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DebouncedAction")
			.field("delay", &self.delay)
			.field("pending", &self.slot.lock().scheduled.is_some())
			.finish()
	}
}
