use serde::Deserialize;

use super::{City, CityId};

/// Body of `/graph/shortest-path`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ShortestPath {
	pub path: Vec<City>,
	#[serde(default)]
	pub distance: f64,
	#[serde(default)]
	pub cities_explored: usize,
	#[serde(default)]
	pub path_length: usize,
}

impl ShortestPath {
	pub fn city_ids(&self) -> Vec<CityId> {
		self.path.iter().map(|c| c.id).collect()
	}

	/// Consecutive `(from, to)` hops along the path.
	pub fn hops(&self) -> impl Iterator<Item = (CityId, CityId)> + '_ {
		self.path.windows(2).map(|w| (w[0].id, w[1].id))
	}
}

/// What a highlight pass applied, for the presentation layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathSummary {
	pub path: Vec<CityId>,
	pub distance: f64,
	pub cities_explored: usize,
	pub path_length: usize,
	pub highlighted: usize,
	pub synthesized: usize,
}
