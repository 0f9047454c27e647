//! Backend location and client timing knobs.

use std::time::Duration;

pub const CITIES_PATH: &str = "/cities/";
pub const EDGES_PATH: &str = "/graph/edges";
pub const SUMMARY_PATH: &str = "/graph/summary";
pub const SHORTEST_PATH_PATH: &str = "/graph/shortest-path";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// How long fetched collections stay fresh.
pub const CACHE_DURATION: Duration = Duration::from_secs(5 * 60);

/// Delay between the canvas mounting and the first load, so the container
/// has settled layout dimensions.
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
	pub base_url: String,
	pub cache_duration: Duration,
	pub settle_delay: Duration,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self::with_base_url(option_env!("CITY_GRAPH_API_URL").unwrap_or(DEFAULT_BASE_URL))
	}
}

impl ApiConfig {
	pub fn with_base_url(base_url: impl Into<String>) -> Self {
		let base_url: String = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
			cache_duration: CACHE_DURATION,
			settle_delay: SETTLE_DELAY,
		}
	}

	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn joins_paths_without_doubling_slashes() {
		let config = ApiConfig::with_base_url("http://localhost:9000/");
		assert_eq!(config.url(CITIES_PATH), "http://localhost:9000/cities/");
		assert_eq!(config.url(EDGES_PATH), "http://localhost:9000/graph/edges");
		assert_eq!(config.cache_duration, Duration::from_secs(300));
	}
}
