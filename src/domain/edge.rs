use std::cell::OnceCell;

use serde::Deserialize;

use super::{City, CityId, haversine_km};

/// Connection between two cities.
///
/// The great-circle distance is resolved lazily and memoized for the
/// lifetime of the edge: once computed it is never recomputed.
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "RawEdge")]
pub struct Edge {
	pub source: CityId,
	pub target: CityId,
	server_distance: Option<f64>,
	computed: OnceCell<f64>,
}

#[derive(Deserialize)]
struct RawEdge {
	source: CityId,
	target: CityId,
	#[serde(default)]
	distance: Option<f64>,
}

impl From<RawEdge> for Edge {
	fn from(raw: RawEdge) -> Self {
		Self::new(raw.source, raw.target, raw.distance)
	}
}

impl Edge {
	pub fn new(source: CityId, target: CityId, distance: Option<f64>) -> Self {
		Self {
			source,
			target,
			// the backend sends 0 for "unknown"
			server_distance: distance.filter(|d| *d > 0.0),
			computed: OnceCell::new(),
		}
	}

	pub fn server_distance(&self) -> Option<f64> {
		self.server_distance
	}

	pub fn distance(&self, source: &City, target: &City) -> f64 {
		if let Some(d) = self.computed.get() {
			return *d;
		}
		if let Some(d) = self.server_distance() {
			return d;
		}
		*self.computed.get_or_init(|| haversine_km(source, target))
	}

	/// Distance known without coordinates; `0.0` until resolved.
	pub fn resolved_distance(&self) -> f64 {
		self.computed
			.get()
			.copied()
			.or(self.server_distance)
			.unwrap_or(0.0)
	}

	pub fn band(&self) -> DistanceBand {
		DistanceBand::for_distance(self.resolved_distance())
	}

	pub fn opacity(&self) -> f64 {
		self.band().opacity()
	}
}

/// Fixed presentation steps over edge length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceBand {
	Near,
	Regional,
	Continental,
	Distant,
}

impl DistanceBand {
	pub const ALL: [Self; 4] = [Self::Near, Self::Regional, Self::Continental, Self::Distant];

	pub fn for_distance(km: f64) -> Self {
		if km < 500.0 {
			Self::Near
		} else if km < 1000.0 {
			Self::Regional
		} else if km < 2000.0 {
			Self::Continental
		} else {
			Self::Distant
		}
	}

	pub fn color(self) -> &'static str {
		match self {
			Self::Near => "#10b981",
			Self::Regional => "#3b82f6",
			Self::Continental => "#f59e0b",
			Self::Distant => "#ef4444",
		}
	}

	pub fn opacity(self) -> f64 {
		match self {
			Self::Near => 0.6,
			Self::Regional => 0.4,
			Self::Continental => 0.25,
			Self::Distant => 0.15,
		}
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Near => "< 500 km",
			Self::Regional => "500 - 1000 km",
			Self::Continental => "1000 - 2000 km",
			Self::Distant => "> 2000 km",
		}
	}
}
