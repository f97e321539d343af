mod common;

// std
use std::{env, process};
// self
use pwrank_client::{
	auth::Credential,
	store::{CompareAndSwapOutcome, CredentialStore, FileStore, MemoryStore, STORAGE_KEY},
};

async fn round_trip(store: &dyn CredentialStore) -> color_eyre::Result<()> {
	assert_eq!(store.load().await?, None);

	store.save(Some(common::credential("access"))).await?;

	assert_eq!(store.load().await?, Some(common::credential("access")));

	store.save(Some(common::credential("replaced"))).await?;

	assert_eq!(
		store.load().await?.map(|credential| credential.access_token().expose().to_owned()),
		Some("replaced".to_owned())
	);

	store.save(None).await?;

	assert_eq!(store.load().await?, None);

	compare_and_swap(store).await
}

async fn compare_and_swap(store: &dyn CredentialStore) -> color_eyre::Result<()> {
	assert_eq!(
		store.compare_and_swap(common::REFRESH_TOKEN, Some(common::credential("late"))).await?,
		CompareAndSwapOutcome::Missing
	);
	assert_eq!(store.load().await?, None, "A swap against an empty store must not write.");

	let other_user = Credential::new("other-access", "other-refresh", common::identity())?;

	store.save(Some(other_user.clone())).await?;

	assert_eq!(
		store.compare_and_swap(common::REFRESH_TOKEN, Some(common::credential("late"))).await?,
		CompareAndSwapOutcome::RefreshMismatch
	);
	assert_eq!(
		store.compare_and_swap(common::REFRESH_TOKEN, None).await?,
		CompareAndSwapOutcome::RefreshMismatch
	);
	assert_eq!(store.load().await?, Some(other_user));

	store.save(Some(common::credential("stale"))).await?;

	assert_eq!(
		store.compare_and_swap(common::REFRESH_TOKEN, Some(common::credential("fresh"))).await?,
		CompareAndSwapOutcome::Updated
	);
	assert_eq!(store.load().await?, Some(common::credential("fresh")));
	assert_eq!(
		store.compare_and_swap(common::REFRESH_TOKEN, None).await?,
		CompareAndSwapOutcome::Updated
	);
	assert_eq!(store.load().await?, None);

	Ok(())
}

#[tokio::test]
async fn memory_store_round_trips_and_clears() -> color_eyre::Result<()> {
	round_trip(&MemoryStore::default()).await
}

#[tokio::test]
async fn file_store_round_trips_and_clears() -> color_eyre::Result<()> {
	let dir = env::temp_dir().join(format!("pwrank_client_store_it_{}", process::id()));
	let store = FileStore::in_dir(&dir)?;

	assert_eq!(store.path().file_name().and_then(|name| name.to_str()), Some("pwrank.auth.json"));
	assert!(store.path().to_string_lossy().contains(STORAGE_KEY));

	round_trip(&store).await?;

	std::fs::remove_dir_all(&dir)?;

	Ok(())
}

#[tokio::test]
async fn memory_store_clones_share_one_slot() -> color_eyre::Result<()> {
	let store = MemoryStore::default();
	let other_tab = store.clone();

	store.save(Some(common::credential("shared"))).await?;

	assert!(other_tab.load().await?.is_some());

	other_tab.save(None).await?;

	assert_eq!(store.raw(), None);

	Ok(())
}

#[tokio::test]
async fn corrupted_payloads_read_as_logged_out() -> color_eyre::Result<()> {
	for raw in [
		"",
		"not json",
		"{\"accessToken\":\"a\",\"refreshToken\":\"r\"}",
		"{\"accessToken\":\"\",\"refreshToken\":\"r\",\"identity\":{}}",
	] {
		assert_eq!(MemoryStore::with_raw(raw).load().await?, None, "Payload {raw:?} should be ignored.");
	}

	Ok(())
}
