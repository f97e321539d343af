//! Per-ranking session: cached items plus guarded load and mutation operations.

// std
use std::{
	pin,
	sync::atomic::{AtomicBool, Ordering},
};
// crates.io
use tokio::sync::Notify;
// self
use crate::{
	_prelude::*,
	action::Execution,
	client::Client,
	http::HttpTransport,
	notify::{Notification, Notifier, TracingNotifier},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	ranking::{FilterBy, Item, ItemUpdate, NewItem, Ranking, SyncRequest, filter},
};

/// Tally returned by [`RankingSession::bulk_delete_items`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BulkDeleteOutcome {
	/// Items deleted.
	pub success_count: usize,
	/// Items whose deletion failed.
	pub error_count: usize,
}

#[derive(Debug, Default)]
struct SessionState {
	ranking: Option<Ranking>,
	items: Vec<Item>,
	search_query: String,
	filter_by: FilterBy,
}

#[derive(Deserialize)]
struct RankingEnvelope {
	#[serde(default)]
	ranking: Option<Ranking>,
}

/// State and operations for one ranking page.
///
/// Loading is single-flight on its own flag. Every mutation (add, update, delete, bulk delete,
/// sync) shares one `submitting` flag, so at most one of them is outstanding per session; a
/// mutation that finds the flag taken returns [`Execution::AlreadyRunning`]. Successful mutations
/// reload the ranking before returning. When a load is already in flight at that point (it may
/// have been sent before the mutation landed), the reload waits for it and then fetches again.
/// Failures are reported to the [`Notifier`] and returned.
pub struct RankingSession<C>
where
	C: ?Sized + HttpTransport,
{
	client: Client<C>,
	ranking_id: String,
	state: RwLock<SessionState>,
	loading: AtomicBool,
	load_finished: Notify,
	submitting: AtomicBool,
	notifier: Arc<dyn Notifier>,
}
impl<C> RankingSession<C>
where
	C: ?Sized + HttpTransport,
{
	/// Creates an empty session for `ranking_id`; call [`RankingSession::load`] to populate it.
	pub fn new(client: Client<C>, ranking_id: impl Into<String>) -> Self {
		Self {
			client,
			ranking_id: ranking_id.into(),
			state: Default::default(),
			loading: AtomicBool::new(false),
			load_finished: Notify::new(),
			submitting: AtomicBool::new(false),
			notifier: Arc::new(TracingNotifier),
		}
	}

	/// Replaces the notification sink.
	pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
		self.notifier = notifier;

		self
	}

	/// Returns the ranking identifier this session is bound to.
	pub fn ranking_id(&self) -> &str {
		&self.ranking_id
	}

	/// Returns the last loaded ranking.
	pub fn ranking(&self) -> Option<Ranking> {
		self.state.read().ranking.clone()
	}

	/// Returns the cached items.
	pub fn items(&self) -> Vec<Item> {
		self.state.read().items.clone()
	}

	/// Returns the cached items that pass the current search query and filter.
	pub fn filtered_items(&self) -> Vec<Item> {
		let state = self.state.read();

		filter::filter_items(&state.items, &state.search_query, state.filter_by).cloned().collect()
	}

	/// Returns the current search query.
	pub fn search_query(&self) -> String {
		self.state.read().search_query.clone()
	}

	/// Replaces the search query.
	pub fn set_search_query(&self, query: impl Into<String>) {
		self.state.write().search_query = query.into();
	}

	/// Returns the current category filter.
	pub fn filter_by(&self) -> FilterBy {
		self.state.read().filter_by
	}

	/// Replaces the category filter.
	pub fn set_filter(&self, filter_by: FilterBy) {
		self.state.write().filter_by = filter_by;
	}

	/// Returns the comparison progress of the loaded ranking, `0.0` before the first load.
	pub fn completion_percentage(&self) -> f64 {
		self.state.read().ranking.as_ref().map(filter::completion_percentage).unwrap_or_default()
	}

	/// Returns `true` while a load is outstanding.
	pub fn is_loading(&self) -> bool {
		self.loading.load(Ordering::Acquire)
	}

	/// Returns `true` while a mutation is outstanding.
	pub fn is_submitting(&self) -> bool {
		self.submitting.load(Ordering::Acquire)
	}

	/// Fetches the ranking and atomically replaces the cached items.
	///
	/// The cache is left untouched when the fetch fails.
	pub async fn load(&self) -> Result<Execution<()>> {
		let Some(flag) = FlagGuard::acquire(&self.loading) else {
			return Ok(Execution::AlreadyRunning);
		};
		let _flag = flag.notify_on_release(&self.load_finished);

		match Self::observe("load", self.fetch()).await {
			Ok(ranking) => {
				let mut state = self.state.write();

				state.items = ranking.as_ref().map(|r| r.items.clone()).unwrap_or_default();
				state.ranking = ranking;

				Ok(Execution::Completed(()))
			},
			Err(e) => {
				self.notifier.notify(Notification::error("Failed to load ranking", &e));

				Err(e)
			},
		}
	}

	/// Adds `item` to the ranking.
	pub async fn add_item(&self, item: &NewItem) -> Result<Execution<()>> {
		let path = format!("/ranking/{}/items", self.ranking_id);

		self.mutate(
			"add_item",
			self.client.post(&path, item),
			Notification::success(
				"Item Added",
				format!("\"{}\" has been added to the ranking.", item.label),
			),
			"Failed to add item",
		)
		.await
	}

	/// Applies `update` to the item identified by `item_id`.
	pub async fn update_item(&self, item_id: &str, update: &ItemUpdate) -> Result<Execution<()>> {
		let path = format!("/item/{item_id}");
		let label = update.label.as_deref().unwrap_or(item_id);

		self.mutate(
			"update_item",
			self.client.put(&path, update),
			Notification::success("Item Updated", format!("\"{label}\" has been updated.")),
			"Failed to update item",
		)
		.await
	}

	/// Deletes `item`.
	pub async fn delete_item(&self, item: &Item) -> Result<Execution<()>> {
		let path = format!("/item/{}", item.id);

		self.mutate(
			"delete_item",
			self.client.delete(&path),
			Notification::success("Item Deleted", format!("\"{}\" has been deleted.", item.label)),
			"Failed to delete item",
		)
		.await
	}

	/// Deletes every item in `items`, continuing past individual failures.
	///
	/// Deletions run sequentially. Exactly one reload follows, whatever the tally; an empty
	/// selection completes immediately without touching the backend.
	pub async fn bulk_delete_items(&self, items: &[Item]) -> Execution<BulkDeleteOutcome> {
		if items.is_empty() {
			return Execution::Completed(BulkDeleteOutcome::default());
		}

		let Some(_flag) = FlagGuard::acquire(&self.submitting) else {
			return Execution::AlreadyRunning;
		};
		let mut outcome = BulkDeleteOutcome::default();

		for item in items {
			let path = format!("/item/{}", item.id);

			match Self::observe("bulk_delete", self.client.delete(&path)).await {
				Ok(_) => outcome.success_count += 1,
				Err(e) => {
					obs::warn_event(
						"ranking.bulk_delete",
						format_args!("Failed to delete item `{}`: {e}.", item.id),
					);

					outcome.error_count += 1;
				},
			}
		}

		let BulkDeleteOutcome { success_count, error_count } = outcome;
		let notification = match (success_count, error_count) {
			(0, _) => Notification::error_message(
				"Failed to delete items",
				"All deletions failed. Please try again.",
			),
			(_, 0) => Notification::success(format!("Deleted {success_count} items"), ""),
			_ => Notification::warn(
				format!("Deleted {success_count} items"),
				format!("{error_count} items failed to delete"),
			),
		};

		self.notifier.notify(notification);
		self.reload_after_mutation().await;

		Execution::Completed(outcome)
	}

	/// Imports items from an external source into the loaded ranking.
	///
	/// Fails without contacting the backend when the ranking has not been loaded yet.
	pub async fn sync_items(&self, request: &SyncRequest) -> Result<Execution<()>> {
		if self.state.read().ranking.is_none() {
			return Err(Error::application("Load the ranking before syncing its items."));
		}

		let path = format!("/ranking/{}", self.ranking_id);

		self.mutate(
			"sync_items",
			self.client.post(&path, request),
			Notification::success("Items synced", ""),
			"Sync failed",
		)
		.await
	}

	async fn fetch(&self) -> Result<Option<Ranking>> {
		let envelope: RankingEnvelope =
			self.client.get_as(&format!("/ranking/{}", self.ranking_id)).await?;

		Ok(envelope.ranking)
	}

	async fn mutate<F>(
		&self,
		stage: &'static str,
		call: F,
		on_success: Notification,
		failure_summary: &'static str,
	) -> Result<Execution<()>>
	where
		F: Future<Output = Result<Option<serde_json::Value>>>,
	{
		let Some(_flag) = FlagGuard::acquire(&self.submitting) else {
			return Ok(Execution::AlreadyRunning);
		};

		match Self::observe(stage, call).await {
			Ok(_) => {
				self.notifier.notify(on_success);
				self.reload_after_mutation().await;

				Ok(Execution::Completed(()))
			},
			Err(e) => {
				self.notifier.notify(Notification::error(failure_summary, &e));

				Err(e)
			},
		}
	}

	async fn observe<F, T>(stage: &'static str, call: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		const KIND: OperationKind = OperationKind::Session;

		obs::record_operation_outcome(KIND, OperationOutcome::Attempt);

		let result = OperationSpan::new(KIND, stage).instrument(call).await;

		match &result {
			Ok(_) => obs::record_operation_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_operation_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}

	async fn reload_after_mutation(&self) {
		loop {
			// Registered before trying, so a load that finishes in between still wakes us.
			let mut in_flight_done = pin::pin!(self.load_finished.notified());

			in_flight_done.as_mut().enable();

			match self.load().await {
				Ok(Execution::Completed(())) => return,
				Ok(Execution::AlreadyRunning) => {
					obs::debug_event(
						"ranking.reload",
						"A load is already in flight; reloading again once it finishes.",
					);

					in_flight_done.await;
				},
				Err(e) => {
					obs::warn_event(
						"ranking.reload",
						format_args!("Reload after a successful mutation failed: {e}."),
					);

					return;
				},
			}
		}
	}
}
impl<C> Debug for RankingSession<C>
where
	C: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("RankingSession")
			.field("ranking_id", &self.ranking_id)
			.field("loading", &self.is_loading())
			.field("submitting", &self.is_submitting())
			.finish()
	}
}

// Holds a session flag and releases it on drop, including when the caller abandons the future.
struct FlagGuard<'a> {
	flag: &'a AtomicBool,
	released: Option<&'a Notify>,
}
impl<'a> FlagGuard<'a> {
	fn acquire(flag: &'a AtomicBool) -> Option<Self> {
		flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.ok()
			.map(|_| Self { flag, released: None })
	}

	// Wakes every waiter on `released` once the flag is cleared.
	fn notify_on_release(mut self, released: &'a Notify) -> Self {
		self.released = Some(released);

		self
	}
}
impl Drop for FlagGuard<'_> {
	fn drop(&mut self) {
		self.flag.store(false, Ordering::Release);

		if let Some(released) = self.released {
			released.notify_waiters();
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn flag_guard_is_exclusive_and_released_on_drop() {
		let flag = AtomicBool::new(false);
		let first = FlagGuard::acquire(&flag);

		assert!(first.is_some());
		assert!(FlagGuard::acquire(&flag).is_none());

		drop(first);

		assert!(FlagGuard::acquire(&flag).is_some());
	}

	#[tokio::test]
	async fn released_flags_wake_registered_waiters() {
		let flag = AtomicBool::new(false);
		let released = Notify::new();
		let guard =
			FlagGuard::acquire(&flag).expect("Flag starts clear.").notify_on_release(&released);
		let mut waiter = pin::pin!(released.notified());

		waiter.as_mut().enable();
		drop(guard);

		tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
			.await
			.expect("Releasing the flag should wake the waiter.");
		assert!(!flag.load(Ordering::Acquire));
	}

	#[cfg(feature = "metrics")]
	mod operation_counters {
		// crates.io
		use metrics::{
			Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
		};
		// self
		use super::*;
		use crate::{
			auth::{Credential, Identity},
			config::ClientConfig,
			http::{HttpRequest, HttpResponse, TransportFuture},
			notify::NullNotifier,
			store::MemoryStore,
		};

		type Log = Arc<Mutex<Vec<(String, String)>>>;

		struct Tally {
			labels: (String, String),
			log: Log,
		}
		impl CounterFn for Tally {
			fn increment(&self, value: u64) {
				for _ in 0..value {
					self.log.lock().push(self.labels.clone());
				}
			}

			fn absolute(&self, _: u64) {}
		}

		#[derive(Default)]
		struct TallyRecorder(Log);
		impl TallyRecorder {
			fn outcomes(&self, operation: &str) -> Vec<String> {
				self.0
					.lock()
					.iter()
					.filter(|(op, _)| op == operation)
					.map(|(_, outcome)| outcome.clone())
					.collect()
			}
		}
		impl Recorder for TallyRecorder {
			fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

			fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
				let label = |name: &str| {
					key.labels()
						.find(|label| label.key() == name)
						.map(|label| label.value().to_owned())
						.unwrap_or_default()
				};

				Counter::from_arc(Arc::new(Tally {
					labels: (label("operation"), label("outcome")),
					log: self.0.clone(),
				}))
			}

			fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
				Gauge::noop()
			}

			fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
				Histogram::noop()
			}
		}

		struct DeleteBackend;
		impl HttpTransport for DeleteBackend {
			fn send(&self, request: HttpRequest) -> TransportFuture<'_> {
				let response = match (request.method.as_str(), request.url.path()) {
					("DELETE", "/item/broken") => HttpResponse::new(500),
					("DELETE", _) => HttpResponse::new(200),
					_ => HttpResponse::json(200, &serde_json::json!({ "ranking": { "id": "r1" } })),
				};

				Box::pin(async move { Ok(response) })
			}
		}

		#[test]
		fn bulk_deletions_are_counted_per_item() {
			let credential =
				Credential::new("access", "refresh", Identity::new(serde_json::json!({ "id": "u-1" })))
					.expect("Credential fixture should be valid.");
			let store = MemoryStore::with_credential(&credential).expect("Store should seed.");
			let config = ClientConfig::new("http://backend.test").expect("Fixture URL should parse.");
			let client: Client<DeleteBackend> =
				Client::with_transport(Arc::new(store), config, Arc::new(DeleteBackend));
			let session = RankingSession::new(client, "r1").with_notifier(Arc::new(NullNotifier));
			let items = ["kept", "broken"].map(|id| {
				serde_json::from_value::<Item>(serde_json::json!({ "id": id, "label": id }))
					.expect("Item fixture should decode.")
			});
			let recorder = TallyRecorder::default();
			let runtime = tokio::runtime::Builder::new_current_thread()
				.enable_all()
				.build()
				.expect("Failed to build Tokio runtime for the metrics test.");
			let outcome = metrics::with_local_recorder(&recorder, || {
				runtime.block_on(session.bulk_delete_items(&items))
			});

			assert_eq!(
				outcome,
				Execution::Completed(BulkDeleteOutcome { success_count: 1, error_count: 1 })
			);
			// Two deletions, then the reload.
			assert_eq!(
				recorder.outcomes("session"),
				["attempt", "success", "attempt", "failure", "attempt", "success"]
			);
		}
	}
}
