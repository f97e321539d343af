//! Client-side access layer for the pwrank pairwise ranking service: bearer sessions with
//! silent renewal, single-flight action guards for UI controls, and per-ranking data sessions.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod action;
pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod navigation;
pub mod notify;
pub mod obs;
pub mod ranking;
pub mod store;
pub mod validation;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use client::{Client, LoginOutcome};
pub use config::ClientConfig;
pub use error::{Error, Result};
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
