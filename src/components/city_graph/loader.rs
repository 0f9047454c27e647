use log::{info, warn};

use super::liveness::Liveness;
use super::state::{GraphRenderState, SharedRenderState};
use crate::api::{Clock, GraphCacheRepository, Transport};
use crate::domain::{City, Edge};
use crate::error::Result;

const SKIPPED_SAMPLE: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
	pub nodes: usize,
	pub edges: usize,
	pub missing_endpoint: usize,
	pub duplicates: usize,
}

/// Fetches cities and edges, then rebuilds `state` from them.
///
/// Returns `None` if the view ended while a request was pending; nothing is
/// written in that case.
pub async fn load_graph<T: Transport, C: Clock>(
	repository: &GraphCacheRepository<T, C>,
	state: &SharedRenderState,
	liveness: &Liveness,
) -> Result<Option<LoadReport>> {
	let cities = repository.get_cities().await?;
	if !liveness.is_alive() {
		return Ok(None);
	}
	let edges = repository.get_edges().await?;
	if !liveness.is_alive() {
		return Ok(None);
	}

	Ok(Some(build_graph(&mut state.borrow_mut(), &cities, &edges)))
}

/// Every city goes in before the first edge is tried.
pub fn build_graph(state: &mut GraphRenderState, cities: &[City], edges: &[Edge]) -> LoadReport {
	state.clear();
	let theme = state.theme();
	for city in cities {
		state.add_city(city, theme.node_color());
	}

	let mut report = LoadReport::default();
	let mut skipped = Vec::new();
	for edge in edges {
		if !state.has_node(edge.source) || !state.has_node(edge.target) {
			report.missing_endpoint += 1;
			if skipped.len() < SKIPPED_SAMPLE {
				skipped.push(format!("{} -> {} (missing nodes)", edge.source, edge.target));
			}
		} else if state.has_edge(edge.source, edge.target) {
			report.duplicates += 1;
		} else {
			state.add_edge(edge, theme.edge_color());
		}
	}
	report.nodes = state.node_count();
	report.edges = state.edge_count();

	info!(
		"Graph built: {} nodes, {} edges ({} skipped)",
		report.nodes,
		report.edges,
		report.missing_endpoint + report.duplicates
	);
	if !skipped.is_empty() {
		warn!("First skipped edges: {skipped:?}");
	}
	report
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;
	use serde_json::json;

	use super::*;
	use crate::components::city_graph::types::Theme;
	use crate::config::{CITIES_PATH, EDGES_PATH};
	use crate::testing::{self, url};

	#[test]
	fn two_cities_one_edge() {
		let (repo, transport, _clock) = testing::repository();
		transport.respond(
			url(CITIES_PATH),
			json!([{"id": 1, "city": "A", "lat": 0, "lng": 0}, {"id": 2, "city": "B", "lat": 0, "lng": 1}]),
		);
		transport.respond(url(EDGES_PATH), json!({"edges": [{"source": 1, "target": 2}]}));
		let state = GraphRenderState::shared(Theme::Dark);

		let report = block_on(load_graph(&repo, &state, &Liveness::new()))
			.unwrap()
			.unwrap();
		assert_eq!(
			report,
			LoadReport {
				nodes: 2,
				edges: 1,
				missing_endpoint: 0,
				duplicates: 0
			}
		);

		let s = state.borrow();
		let edge = s.edge(1, 2).unwrap();
		assert!((edge.distance_km - 111.19).abs() < 0.01);
		assert_eq!(edge.color, Theme::Dark.edge_color());
		assert_eq!(s.node(1).unwrap().color, Theme::Dark.node_color());

		let cached = block_on(repo.get_edges()).unwrap();
		assert!((cached[0].resolved_distance() - 111.19).abs() < 0.01);
		assert_eq!(cached[0].band().color(), "#10b981");
	}

	#[test]
	fn rebuild_counts_what_was_dropped() {
		let mut state = GraphRenderState::new(Theme::Light);
		let cities = vec![City::new(1, "A", 0.0, 0.0), City::new(2, "B", 1.0, 1.0)];
		let edges = vec![
			Edge::new(1, 2, None),
			Edge::new(2, 1, None),
			Edge::new(2, 3, None),
			Edge::new(8, 9, None),
		];

		build_graph(&mut state, &cities, &edges);
		let report = build_graph(&mut state, &cities, &edges);
		assert_eq!(
			report,
			LoadReport {
				nodes: 2,
				edges: 1,
				missing_endpoint: 2,
				duplicates: 1
			}
		);
	}

	#[test]
	fn nothing_is_written_after_the_view_ends() {
		let (repo, transport, _clock) = testing::repository();
		transport.respond(url(CITIES_PATH), json!([{"id": 1, "city": "A", "lat": 0, "lng": 0}]));
		transport.respond(url(EDGES_PATH), json!([]));
		let state = GraphRenderState::shared(Theme::Light);
		let liveness = Liveness::new();
		liveness.end();

		assert_eq!(block_on(load_graph(&repo, &state, &liveness)).unwrap(), None);
		assert_eq!(state.borrow().node_count(), 0);
	}

	#[test]
	fn edge_failure_surfaces_and_keeps_the_previous_graph() {
		let (repo, transport, _clock) = testing::repository();
		transport.respond(url(CITIES_PATH), json!([{"id": 1, "city": "A", "lat": 0, "lng": 0}]));
		let state = GraphRenderState::shared(Theme::Light);
		state.borrow_mut().add_city(&City::new(7, "old", 3.0, 3.0), "#000");

		assert!(block_on(load_graph(&repo, &state, &Liveness::new())).is_err());
		assert!(state.borrow().has_node(7));
	}
}
