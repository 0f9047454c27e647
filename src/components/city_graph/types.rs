use crate::domain::{City, CityId, PathSummary, Summary};
use crate::error::GraphError;

/// Reserved overlay color; the theme pass never paints over path edges.
pub const PATH_EDGE_COLOR: &str = "#f97316";
pub const PATH_EDGE_SIZE: f64 = 2.0;
pub const BASE_EDGE_SIZE: f64 = 0.5;
pub const NODE_SIZE: f64 = 2.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
	#[default]
	Light,
	Dark,
}

impl Theme {
	pub fn from_dark(is_dark: bool) -> Self {
		if is_dark { Self::Dark } else { Self::Light }
	}

	pub fn node_color(self) -> &'static str {
		match self {
			Self::Light => "#0a0a0a",
			Self::Dark => "#e4e4e7",
		}
	}

	pub fn edge_color(self) -> &'static str {
		match self {
			Self::Light => "#d4d4d8",
			Self::Dark => "#52525b",
		}
	}

	pub fn background(self) -> &'static str {
		match self {
			Self::Light => "#fafafa",
			Self::Dark => "#09090b",
		}
	}
}

#[derive(Clone, Debug)]
pub struct NodeAttrs {
	pub city: City,
	pub color: String,
	pub size: f64,
}

#[derive(Clone, Debug)]
pub struct EdgeAttrs {
	pub color: String,
	pub size: f64,
	pub distance_km: f64,
	pub opacity: f64,
	pub hidden: bool,
	/// Owned by the path overlay.
	pub overlay: bool,
	/// Inserted by the path overlay, not present in the edge list.
	pub synthesized: bool,
}

/// Read-only counters published to the presentation layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphStats {
	pub loading: bool,
	pub nodes: usize,
	pub edges: usize,
	pub visible_edges: usize,
	pub edges_in_view: Option<usize>,
	pub summary: Option<Summary>,
	pub selected: Option<(CityId, String)>,
	pub last_path: Option<PathSummary>,
	pub error: Option<GraphError>,
}
