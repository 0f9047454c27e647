//! Domain value objects shared by the cache, the render state and the UI.

mod city;
mod edge;
mod path;
mod visibility;

use serde::Deserialize;

pub use city::{City, haversine_km};
pub use edge::{DistanceBand, Edge};
pub use path::{PathSummary, ShortestPath};
pub use visibility::max_distance_for_zoom;

pub type CityId = u64;

/// Inclusive lat/lng rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_lat: f64,
	pub max_lat: f64,
	pub min_lng: f64,
	pub max_lng: f64,
}

impl Bounds {
	pub fn contains(&self, lat: f64, lng: f64) -> bool {
		lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
	}
}

/// Server-side graph totals from `/graph/summary`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Summary {
	pub num_nodes: usize,
	pub num_edges: usize,
}
