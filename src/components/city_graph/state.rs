use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::info;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};

use super::projection::{HIT_RADIUS, Viewport};
use super::types::{BASE_EDGE_SIZE, EdgeAttrs, NODE_SIZE, NodeAttrs, Theme};
use crate::domain::{City, CityId, DistanceBand, Edge, haversine_km};
use crate::error::Result;

pub type SharedRenderState = Rc<RefCell<GraphRenderState>>;

/// Paints a render state onto some surface.
pub trait Renderer {
	fn draw(&mut self, state: &GraphRenderState);
	/// Releases canvas/GPU resources. Called exactly once.
	fn kill(&mut self);
}

/// Something a renderer can be bound to, such as a canvas element.
pub trait RenderSurface {
	fn mount(&self) -> Result<Box<dyn Renderer>>;
}

/// Live positional graph behind the renderer.
///
/// Nodes are keyed by city id. An edge is only inserted when both endpoints
/// already exist, and at most one edge joins any unordered pair.
pub struct GraphRenderState {
	graph: UnGraph<NodeAttrs, EdgeAttrs>,
	index: HashMap<CityId, NodeIndex>,
	theme: Theme,
	distance_limit: Option<f64>,
	renderer: Option<Box<dyn Renderer>>,
}

impl GraphRenderState {
	pub fn new(theme: Theme) -> Self {
		Self {
			graph: UnGraph::default(),
			index: HashMap::new(),
			theme,
			distance_limit: None,
			renderer: None,
		}
	}

	pub fn shared(theme: Theme) -> SharedRenderState {
		Rc::new(RefCell::new(Self::new(theme)))
	}

	pub fn theme(&self) -> Theme {
		self.theme
	}

	pub fn set_theme(&mut self, theme: Theme) {
		self.theme = theme;
	}

	pub fn node_count(&self) -> usize {
		self.graph.node_count()
	}

	pub fn edge_count(&self) -> usize {
		self.graph.edge_count()
	}

	pub fn visible_edge_count(&self) -> usize {
		self.graph
			.edge_weights()
			.filter(|e| !e.hidden || e.overlay)
			.count()
	}

	/// Inserts a node for `city`. Returns false if it was already present.
	pub fn add_city(&mut self, city: &City, node_color: &str) -> bool {
		if self.index.contains_key(&city.id) {
			return false;
		}
		let idx = self.graph.add_node(NodeAttrs {
			city: city.clone(),
			color: node_color.to_string(),
			size: NODE_SIZE,
		});
		self.index.insert(city.id, idx);
		true
	}

	/// Inserts `edge` if both endpoints exist and the pair is not yet joined.
	///
	/// Resolves (and memoizes) the edge distance from the node coordinates.
	pub fn add_edge(&mut self, edge: &Edge, edge_color: &str) -> bool {
		let (Some(&a), Some(&b)) = (self.index.get(&edge.source), self.index.get(&edge.target))
		else {
			return false;
		};
		if self.graph.find_edge(a, b).is_some() {
			return false;
		}
		let distance = edge.distance(&self.graph[a].city, &self.graph[b].city);
		let attrs = self.edge_attrs(distance, edge.opacity(), edge_color, BASE_EDGE_SIZE);
		self.graph.add_edge(a, b, attrs);
		true
	}

	/// Inserts an edge the loaded edge list does not contain, measured from
	/// the endpoint coordinates.
	pub fn add_synthesized_edge(
		&mut self,
		source: CityId,
		target: CityId,
		color: &str,
		size: f64,
	) -> bool {
		let (Some(&a), Some(&b)) = (self.index.get(&source), self.index.get(&target)) else {
			return false;
		};
		if a == b || self.graph.find_edge(a, b).is_some() {
			return false;
		}
		let distance = haversine_km(&self.graph[a].city, &self.graph[b].city);
		let opacity = DistanceBand::for_distance(distance).opacity();
		let mut attrs = self.edge_attrs(distance, opacity, color, size);
		attrs.synthesized = true;
		self.graph.add_edge(a, b, attrs);
		true
	}

	fn edge_attrs(&self, distance_km: f64, opacity: f64, color: &str, size: f64) -> EdgeAttrs {
		EdgeAttrs {
			color: color.to_string(),
			size,
			distance_km,
			opacity,
			hidden: self.distance_limit.is_some_and(|limit| distance_km > limit),
			overlay: false,
			synthesized: false,
		}
	}

	pub fn remove_edge(&mut self, source: CityId, target: CityId) -> bool {
		match self.edge_index(source, target) {
			Some(e) => self.graph.remove_edge(e).is_some(),
			None => false,
		}
	}

	pub fn has_node(&self, id: CityId) -> bool {
		self.index.contains_key(&id)
	}

	pub fn has_edge(&self, source: CityId, target: CityId) -> bool {
		self.edge_index(source, target).is_some()
	}

	pub fn node(&self, id: CityId) -> Option<&NodeAttrs> {
		self.index.get(&id).map(|&idx| &self.graph[idx])
	}

	#[cfg(test)]
	pub fn edge(&self, source: CityId, target: CityId) -> Option<&EdgeAttrs> {
		self.edge_index(source, target).map(|e| &self.graph[e])
	}

	pub fn edge_mut(&mut self, source: CityId, target: CityId) -> Option<&mut EdgeAttrs> {
		let e = self.edge_index(source, target)?;
		self.graph.edge_weight_mut(e)
	}

	fn edge_index(&self, source: CityId, target: CityId) -> Option<EdgeIndex> {
		let (a, b) = (self.index.get(&source)?, self.index.get(&target)?);
		self.graph.find_edge(*a, *b)
	}

	pub fn for_each_node(&self, mut f: impl FnMut(&NodeAttrs)) {
		self.graph.node_weights().for_each(&mut f);
	}

	pub fn for_each_node_mut(&mut self, mut f: impl FnMut(&mut NodeAttrs)) {
		self.graph.node_weights_mut().for_each(&mut f);
	}

	pub fn for_each_edge(&self, mut f: impl FnMut(&NodeAttrs, &NodeAttrs, &EdgeAttrs)) {
		for e in self.graph.edge_indices() {
			if let Some((a, b)) = self.graph.edge_endpoints(e) {
				f(&self.graph[a], &self.graph[b], &self.graph[e]);
			}
		}
	}

	pub fn for_each_edge_mut(&mut self, mut f: impl FnMut(CityId, CityId, &mut EdgeAttrs)) {
		for e in self.graph.edge_indices() {
			if let Some((a, b)) = self.graph.edge_endpoints(e) {
				let (source, target) = (self.graph[a].city.id, self.graph[b].city.id);
				f(source, target, &mut self.graph[e]);
			}
		}
	}

	pub fn set_node_color(&mut self, id: CityId, color: &str) -> bool {
		match self.index.get(&id) {
			Some(&idx) => {
				self.graph[idx].color = color.to_string();
				true
			}
			None => false,
		}
	}

	pub fn set_edge_color(&mut self, source: CityId, target: CityId, color: &str, size: f64) -> bool {
		match self.edge_mut(source, target) {
			Some(edge) => {
				edge.color = color.to_string();
				edge.size = size;
				true
			}
			None => false,
		}
	}

	/// Marks the edge as owned by the path overlay, which the theme pass and
	/// the distance filter leave alone.
	pub fn set_overlay(&mut self, source: CityId, target: CityId, overlay: bool) -> bool {
		match self.edge_mut(source, target) {
			Some(edge) => {
				edge.overlay = overlay;
				true
			}
			None => false,
		}
	}

	/// Hides edges longer than `limit` km; `None` shows everything.
	/// Returns how many edges remain visible.
	pub fn apply_distance_filter(&mut self, limit: Option<f64>) -> usize {
		self.distance_limit = limit;
		for edge in self.graph.edge_weights_mut() {
			edge.hidden = limit.is_some_and(|l| edge.distance_km > l);
		}
		self.visible_edge_count()
	}

	#[cfg(test)]
	pub fn distance_limit(&self) -> Option<f64> {
		self.distance_limit
	}

	/// Topmost city under the screen point, if any.
	pub fn city_at(&self, viewport: &Viewport, sx: f64, sy: f64) -> Option<CityId> {
		let mut found = None;
		for node in self.graph.node_weights() {
			let (lat, lng) = node.city.coordinates();
			let (x, y) = viewport.project(lat, lng);
			let (dx, dy) = (x - sx, y - sy);
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS.max(node.size) {
				found = Some(node.city.id);
			}
		}
		found
	}

	/// Drops every node and edge. The renderer stays attached.
	pub fn clear(&mut self) {
		self.graph.clear();
		self.index.clear();
	}

	/// Binds a fresh renderer, tearing down the current one first.
	pub fn attach_renderer(&mut self, surface: &dyn RenderSurface) -> Result<()> {
		self.teardown();
		self.renderer = Some(surface.mount()?);
		info!(
			"Renderer attached ({} nodes, {} edges)",
			self.node_count(),
			self.edge_count()
		);
		self.refresh();
		Ok(())
	}

	#[cfg(test)]
	pub fn has_renderer(&self) -> bool {
		self.renderer.is_some()
	}

	pub fn teardown(&mut self) {
		if let Some(mut renderer) = self.renderer.take() {
			renderer.kill();
			info!("Renderer torn down");
		}
	}

	/// One repaint, if a renderer is attached.
	pub fn refresh(&mut self) {
		if let Some(mut renderer) = self.renderer.take() {
			renderer.draw(self);
			self.renderer = Some(renderer);
		}
	}
}

impl Drop for GraphRenderState {
	fn drop(&mut self) {
		self.teardown();
	}
}
