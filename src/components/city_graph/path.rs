use std::rc::Rc;

use log::{debug, info, warn};

use super::liveness::Liveness;
use super::state::{GraphRenderState, SharedRenderState};
use super::types::{BASE_EDGE_SIZE, PATH_EDGE_COLOR, PATH_EDGE_SIZE};
use crate::api::{BrowserClock, Clock, GraphCacheRepository, HttpTransport, Transport};
use crate::domain::{CityId, PathSummary, ShortestPath};
use crate::error::Result;

#[derive(Clone, Debug, PartialEq)]
pub enum PathOutcome {
	Applied(PathSummary),
	/// The view went away while the request was in flight.
	Discarded,
}

/// Fetches shortest paths and paints them over the graph.
pub struct PathHighlighter<T = HttpTransport, C = BrowserClock> {
	repository: Rc<GraphCacheRepository<T, C>>,
	state: SharedRenderState,
	liveness: Liveness,
}

impl<T: Transport, C: Clock> PathHighlighter<T, C> {
	pub fn new(
		repository: Rc<GraphCacheRepository<T, C>>,
		state: SharedRenderState,
		liveness: Liveness,
	) -> Self {
		Self {
			repository,
			state,
			liveness,
		}
	}

	/// A failed request leaves the graph exactly as it was.
	pub async fn highlight_path(&self, start: CityId, end: CityId) -> Result<PathOutcome> {
		let path = self.repository.shortest_path(start, end).await?;
		if !self.liveness.is_alive() {
			debug!("path {start} -> {end} resolved after teardown, dropping it");
			return Ok(PathOutcome::Discarded);
		}

		let summary = apply_overlay(&mut self.state.borrow_mut(), &path);
		info!(
			"Path found! Distance: {:.2} km, Cities explored: {}",
			summary.distance, summary.cities_explored
		);
		Ok(PathOutcome::Applied(summary))
	}
}

/// Resets every edge to the theme's base look and drops edges that only
/// existed for the previous overlay.
pub fn clear_overlay(state: &mut GraphRenderState) {
	let edge_color = state.theme().edge_color();
	let mut synthesized = Vec::new();
	state.for_each_edge_mut(|source, target, edge| {
		if edge.synthesized {
			synthesized.push((source, target));
		}
		edge.color = edge_color.to_string();
		edge.size = BASE_EDGE_SIZE;
		edge.overlay = false;
	});
	for (source, target) in synthesized {
		state.remove_edge(source, target);
	}
}

/// Clear-then-apply: the previous overlay never bleeds into the new one.
pub fn apply_overlay(state: &mut GraphRenderState, path: &ShortestPath) -> PathSummary {
	clear_overlay(state);

	let (mut highlighted, mut synthesized) = (0, 0);
	for (source, target) in path.hops() {
		if source == target {
			debug!("skipping self-hop at {source}");
			continue;
		}
		if state.set_edge_color(source, target, PATH_EDGE_COLOR, PATH_EDGE_SIZE) {
			state.set_overlay(source, target, true);
			highlighted += 1;
			continue;
		}

		warn!("Edge missing: {source} -> {target}");
		if state.add_synthesized_edge(source, target, PATH_EDGE_COLOR, PATH_EDGE_SIZE) {
			state.set_overlay(source, target, true);
			synthesized += 1;
		} else {
			warn!("Cannot draw {source} -> {target}: endpoint not loaded");
		}
	}
	state.refresh();

	PathSummary {
		path: path.city_ids(),
		distance: path.distance,
		cities_explored: path.cities_explored,
		path_length: path.path_length,
		highlighted,
		synthesized,
	}
}

/// Paints the chosen route start, or returns it to the theme's node color.
pub fn mark_start(state: &mut GraphRenderState, id: CityId, selected: bool) -> bool {
	let color = if selected {
		PATH_EDGE_COLOR
	} else {
		state.theme().node_color()
	};
	let found = state.set_node_color(id, color);
	if found {
		state.refresh();
	}
	found
}
