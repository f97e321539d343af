//! Client-side search, category filters, and progress figures.

// self
use crate::{
	_prelude::*,
	constants,
	ranking::{Item, Ranking},
};

const HIGH_UNCERTAINTY_STDERR: f64 = 1.0;
const WELL_RANKED_STDERR: f64 = 0.5;
const TOP_RATED_THRESHOLD: f64 = 7.0;
const NEEDS_COMPARISONS_BELOW: u64 = 5;

/// Unknown filter name.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown item filter `{0}`.")]
pub struct UnknownFilter(pub String);

/// Category filter applied after the search query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterBy {
	/// No filtering.
	#[default]
	All,
	/// Items whose estimate is still uncertain (stderr above 1.0).
	HighUncertainty,
	/// Items with a tight estimate (stderr at most 0.5).
	WellRanked,
	/// Items rated 7 or higher.
	TopRated,
	/// Items with fewer than five comparisons.
	NeedsComparisons,
}
impl FilterBy {
	/// Every filter in display order.
	pub const VARIANTS: [Self; 5] =
		[Self::All, Self::HighUncertainty, Self::WellRanked, Self::TopRated, Self::NeedsComparisons];

	/// Returns the wire name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::All => "all",
			Self::HighUncertainty => "high_uncertainty",
			Self::WellRanked => "well_ranked",
			Self::TopRated => "top_rated",
			Self::NeedsComparisons => "needs_comparisons",
		}
	}

	/// Returns the label shown in filter pickers.
	pub const fn label(self) -> &'static str {
		match self {
			Self::All => "All Items",
			Self::HighUncertainty => "High Uncertainty",
			Self::WellRanked => "Well Ranked",
			Self::TopRated => "Top Rated",
			Self::NeedsComparisons => "Needs Comparisons",
		}
	}

	/// Returns `true` when `item` passes this filter.
	pub fn matches(self, item: &Item) -> bool {
		match self {
			Self::All => true,
			Self::HighUncertainty => item.stderr.is_some_and(|e| e > HIGH_UNCERTAINTY_STDERR),
			Self::WellRanked => item.stderr.is_some_and(|e| e <= WELL_RANKED_STDERR),
			Self::TopRated => item.curr_rating.is_some_and(|r| r >= TOP_RATED_THRESHOLD),
			Self::NeedsComparisons => item.comparisons_count < NEEDS_COMPARISONS_BELOW,
		}
	}
}
impl Display for FilterBy {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for FilterBy {
	type Err = UnknownFilter;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::VARIANTS
			.into_iter()
			.find(|filter| filter.as_str() == s)
			.ok_or_else(|| UnknownFilter(s.to_owned()))
	}
}

/// `(label, value)` pair for filter pickers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FilterOption {
	/// Human-readable label.
	pub label: &'static str,
	/// Filter selected by the option.
	pub value: FilterBy,
}

/// Returns the picker options in display order.
pub fn filter_options() -> impl Iterator<Item = FilterOption> {
	FilterBy::VARIANTS.into_iter().map(|value| FilterOption { label: value.label(), value })
}

/// Returns `true` when `item`'s label contains `query`, ignoring case. An empty query matches all.
pub fn matches_search(item: &Item, query: &str) -> bool {
	label_contains(item, &query.to_lowercase())
}

fn label_contains(item: &Item, lowered_query: &str) -> bool {
	lowered_query.is_empty() || item.label.to_lowercase().contains(lowered_query)
}

/// Applies the search query and then `filter`, preserving order.
pub fn filter_items<'a>(
	items: &'a [Item],
	query: &str,
	filter: FilterBy,
) -> impl Iterator<Item = &'a Item> {
	let query = query.to_lowercase();

	items
		.iter()
		.filter(move |item| label_contains(item, &query))
		.filter(move |item| filter.matches(item))
}

/// Share of all possible pairs that have been compared, in percent with one decimal.
///
/// Returns `0.0` for rankings with fewer than two items and never exceeds `100.0`.
pub fn completion_percentage(ranking: &Ranking) -> f64 {
	let n = ranking.item_count;

	if n < constants::MIN_ITEMS_FOR_RANKING {
		return 0.;
	}

	// `item_count` is backend-supplied and may be arbitrarily large.
	let possible = (n.saturating_mul(n - 1) / 2) as f64;
	let percent = ranking.comp_count as f64 / possible * 100.;

	((percent * 10.).round() / 10.).min(100.)
}
