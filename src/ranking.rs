//! Ranking data: wire types, client-side filters, and the per-page session.

pub mod filter;
pub mod model;
pub mod session;

pub use filter::{FilterBy, FilterOption, UnknownFilter, completion_percentage, filter_options};
pub use model::*;
pub use session::*;
