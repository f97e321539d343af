//! Wire types for rankings and their items.

// self
use crate::{_prelude::*, constants};

/// A ranking as returned by `GET /ranking/{id}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
	/// Backend identifier.
	pub id: String,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// External source the items were imported from, if any.
	#[serde(default)]
	pub datasource: Option<String>,
	/// Number of items in the ranking.
	#[serde(default)]
	pub item_count: u64,
	/// Number of recorded comparisons.
	#[serde(default)]
	pub comp_count: u64,
	/// Items with their current model estimates.
	#[serde(default)]
	pub items: Vec<Item>,
}

/// One ranked item.
///
/// `curr_rating`, `stderr`, and `ability` are absent until the pairwise model has estimates for
/// the item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
	/// Backend identifier.
	pub id: String,
	/// Display label.
	#[serde(default)]
	pub label: String,
	/// Image URL; empty or absent when the item has no image.
	#[serde(default)]
	pub img_url: Option<String>,
	/// Rating the item was seeded with.
	#[serde(default)]
	pub init_rating: Option<i64>,
	/// Percentile rating on the 0–10 scale.
	#[serde(default)]
	pub curr_rating: Option<f64>,
	/// Standard error of the ability estimate.
	#[serde(default)]
	pub stderr: Option<f64>,
	/// Raw ability estimate.
	#[serde(default)]
	pub ability: Option<f64>,
	/// Number of comparisons the item took part in.
	#[serde(default)]
	pub comparisons_count: u64,
}

/// Body of `POST /ranking/{id}/items`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
	/// Label of the new item.
	pub label: String,
	/// Optional image URL.
	#[serde(default)]
	pub img_url: String,
	/// Seed rating.
	pub init_rating: i64,
}
impl NewItem {
	/// Creates an item with no image and the default seed rating.
	pub fn new(label: impl Into<String>) -> Self {
		Self { label: label.into(), img_url: String::new(), init_rating: constants::DEFAULT_INIT_RATING }
	}

	/// Sets the image URL.
	pub fn with_img_url(mut self, img_url: impl Into<String>) -> Self {
		self.img_url = img_url.into();

		self
	}

	/// Sets the seed rating.
	pub fn with_init_rating(mut self, init_rating: i64) -> Self {
		self.init_rating = init_rating;

		self
	}
}

/// Body of `PUT /item/{id}`; only present fields are changed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdate {
	/// New label.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	/// New image URL.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub img_url: Option<String>,
	/// New seed rating.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub init_rating: Option<i64>,
}
impl ItemUpdate {
	/// Changes the label.
	pub fn label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());

		self
	}

	/// Changes the image URL.
	pub fn img_url(mut self, img_url: impl Into<String>) -> Self {
		self.img_url = Some(img_url.into());

		self
	}

	/// Changes the seed rating.
	pub fn init_rating(mut self, init_rating: i64) -> Self {
		self.init_rating = Some(init_rating);

		self
	}
}

/// Body of `POST /ranking/{id}`, which imports items from an external source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SyncRequest {
	/// Import from an AniList user's lists.
	Anilist {
		/// AniList user name.
		anilist_username: String,
		/// List statuses to import (e.g. `COMPLETED`).
		anilist_statuses: Vec<String>,
	},
	/// Import from a Steam library.
	Steam {
		/// Steam account identifier.
		steam_id: String,
	},
}
