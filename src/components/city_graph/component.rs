use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, warn};
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};

use super::liveness::Liveness;
use super::loader::load_graph;
use super::path::{PathHighlighter, PathOutcome, mark_start};
use super::projection::Viewport;
use super::render::CanvasSurface;
use super::state::{GraphRenderState, SharedRenderState};
use super::theme::{DocumentTheme, ThemeReconciler, ThemeSource};
use super::types::GraphStats;
use crate::api::GraphCacheRepository;
use crate::config::ApiConfig;
use crate::domain::{CityId, max_distance_for_zoom};
use crate::error::{GraphError, Result};

type Repository = GraphCacheRepository;

#[derive(Clone, Debug, Default)]
struct PanState {
	active: bool,
	moved: bool,
	start_x: f64,
	start_y: f64,
	transform_start_x: f64,
	transform_start_y: f64,
}

/// Zoom-derived edge length limit, tightened by the caller's cap.
fn distance_limit(viewport: &Viewport, cap: Option<f64>) -> f64 {
	let zoom_limit = max_distance_for_zoom(viewport.zoom_level());
	cap.map_or(zoom_limit, |cap| cap.min(zoom_limit))
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Loads the graph and binds the canvas. `None` if the view ended first.
async fn initialize(
	repository: &Repository,
	state: &SharedRenderState,
	surface: CanvasSurface,
	liveness: &Liveness,
	cap: Option<f64>,
) -> Result<Option<GraphStats>> {
	let Some(report) = load_graph(repository, state, liveness).await? else {
		return Ok(None);
	};

	let visible_edges = {
		let mut s = state.borrow_mut();
		let limit = distance_limit(&surface.viewport.borrow(), cap);
		let visible = s.apply_distance_filter(Some(limit));
		s.attach_renderer(&surface)?;
		visible
	};

	let summary = match repository.get_summary().await {
		Ok(summary) => Some(summary),
		Err(err) => {
			warn!("Graph summary unavailable: {err}");
			None
		}
	};
	let bounds = surface.viewport.borrow().bounds();
	let edges_in_view = repository
		.get_edges_in_viewport(&bounds)
		.await
		.ok()
		.map(|edges| edges.len());

	Ok(Some(GraphStats {
		loading: false,
		nodes: report.nodes,
		edges: report.edges,
		visible_edges,
		edges_in_view,
		summary,
		..GraphStats::default()
	}))
}

/// Geographic city graph on a canvas, with click-to-route path overlay.
///
/// Clicking one city then another highlights the shortest path between
/// them. Drag pans, the wheel zooms and thins out long edges.
#[component]
pub fn CityGraphCanvas(
	#[prop(into)] webgl_supported: Signal<bool>,
	stats: RwSignal<GraphStats>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(optional)] max_distance_km: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let repository = Rc::new(Repository::browser(ApiConfig::default()));
	let settle_ms = repository.config().settle_delay.as_millis() as u32;
	let state: SharedRenderState = GraphRenderState::shared(DocumentTheme.current());
	let viewport = Rc::new(RefCell::new(Viewport::new(800.0, 600.0)));
	let pan = Rc::new(RefCell::new(PanState::default()));
	let liveness = Liveness::new();
	let highlighter = Rc::new(PathHighlighter::new(
		repository.clone(),
		state.clone(),
		liveness.clone(),
	));
	let reload = RwSignal::new(0u32);

	let reconciler = match ThemeReconciler::observe(&DocumentTheme, &state) {
		Ok(reconciler) => Some(reconciler),
		Err(err) => {
			warn!("Theme changes will not be tracked: {err}");
			None
		}
	};
	let reconciler = StoredValue::new_local(reconciler);
	let state_cleanup = StoredValue::new_local(state.clone());
	let liveness_cleanup = liveness.clone();
	on_cleanup(move || {
		liveness_cleanup.end();
		reconciler.try_update_value(|r| {
			if let Some(r) = r {
				r.dispose();
			}
		});
		state_cleanup.try_with_value(|s| s.borrow_mut().teardown());
	});

	let refresh_edges_in_view = {
		let (repository, viewport, liveness) =
			(repository.clone(), viewport.clone(), liveness.clone());
		Rc::new(move || {
			let bounds = viewport.borrow().bounds();
			let (repository, liveness) = (repository.clone(), liveness.clone());
			spawn_local(async move {
				if let Ok(edges) = repository.get_edges_in_viewport(&bounds).await {
					if liveness.is_alive() {
						stats.update(|s| s.edges_in_view = Some(edges.len()));
					}
				}
			});
		})
	};

	let (state_init, viewport_init, repository_init) =
		(state.clone(), viewport.clone(), repository.clone());
	let liveness_init = liveness.clone();
	Effect::new(move |_| {
		reload.track();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if !webgl_supported.get() {
			stats.update(|s| {
				s.loading = false;
				s.error = Some(GraphError::RendererUnsupported);
			});
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		stats.update(|s| {
			s.loading = true;
			s.error = None;
		});

		let weak = Rc::downgrade(&state_init);
		let surface = CanvasSurface {
			canvas: Some(canvas),
			viewport: viewport_init.clone(),
			fullscreen,
			on_resize: Some(Rc::new(move || {
				if let Some(state) = weak.upgrade() {
					state.borrow_mut().refresh();
				}
			})),
		};
		let (repository, state, liveness) = (
			repository_init.clone(),
			state_init.clone(),
			liveness_init.clone(),
		);
		spawn_local(async move {
			// let the container settle its layout before binding to it
			TimeoutFuture::new(settle_ms).await;
			if !liveness.is_alive() {
				return;
			}
			let result = initialize(&repository, &state, surface, &liveness, max_distance_km).await;
			if !liveness.is_alive() {
				return;
			}
			match result {
				Ok(Some(loaded)) => stats.set(loaded),
				Ok(None) => {}
				Err(err) => {
					error!("Graph initialization failed: {err}");
					stats.update(|s| {
						s.loading = false;
						s.error = Some(err);
					});
				}
			}
		});
	});

	let select_city = {
		let (state, highlighter, liveness) = (state.clone(), highlighter.clone(), liveness.clone());
		move |id: CityId| {
			let name = state
				.borrow()
				.node(id)
				.map(|n| n.city.name.clone())
				.unwrap_or_default();
			let start = stats.with_untracked(|s| s.selected.as_ref().map(|(start, _)| *start));
			match start {
				None => {
					mark_start(&mut state.borrow_mut(), id, true);
					stats.update(|s| s.selected = Some((id, name)));
				}
				Some(start) if start == id => {
					mark_start(&mut state.borrow_mut(), id, false);
					stats.update(|s| s.selected = None);
				}
				Some(start) => {
					mark_start(&mut state.borrow_mut(), start, false);
					stats.update(|s| s.selected = None);
					let (state, highlighter, liveness) =
						(state.clone(), highlighter.clone(), liveness.clone());
					spawn_local(async move {
						let outcome = highlighter.highlight_path(start, id).await;
						if !liveness.is_alive() {
							return;
						}
						match outcome {
							Ok(PathOutcome::Applied(summary)) => {
								let s = state.borrow();
								let (edges, visible) = (s.edge_count(), s.visible_edge_count());
								stats.update(|st| {
									st.edges = edges;
									st.visible_edges = visible;
									st.last_path = Some(summary);
									st.error = None;
								});
							}
							Ok(PathOutcome::Discarded) => {}
							Err(err) => {
								error!("Error finding shortest path: {err}");
								stats.update(|st| st.error = Some(err));
							}
						}
					});
				}
			}
		}
	};

	let (viewport_md, pan_md) = (viewport.clone(), pan.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let transform = viewport_md.borrow().transform.clone();
		*pan_md.borrow_mut() = PanState {
			active: true,
			moved: false,
			start_x: x,
			start_y: y,
			transform_start_x: transform.x,
			transform_start_y: transform.y,
		};
	};

	let (state_mm, viewport_mm, pan_mm) = (state.clone(), viewport.clone(), pan.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let mut p = pan_mm.borrow_mut();
		if !p.active {
			return;
		}
		let (dx, dy) = (x - p.start_x, y - p.start_y);
		if dx.abs() + dy.abs() > 3.0 {
			p.moved = true;
		}
		if p.moved {
			viewport_mm
				.borrow_mut()
				.pan_to(p.transform_start_x + dx, p.transform_start_y + dy);
			state_mm.borrow_mut().refresh();
		}
	};

	let (state_mu, viewport_mu, pan_mu) = (state.clone(), viewport.clone(), pan.clone());
	let refresh_mu = refresh_edges_in_view.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let p = std::mem::take(&mut *pan_mu.borrow_mut());
		if p.moved {
			refresh_mu();
			return;
		}
		if !p.active {
			return;
		}
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let hit = state_mu.borrow().city_at(&viewport_mu.borrow(), x, y);
		if let Some(id) = hit {
			select_city(id);
		}
	};

	let (pan_ml, refresh_ml) = (pan.clone(), refresh_edges_in_view.clone());
	let on_mouseleave = move |_: MouseEvent| {
		let p = std::mem::take(&mut *pan_ml.borrow_mut());
		if p.moved {
			refresh_ml();
		}
	};

	let (state_wh, viewport_wh, refresh_wh) =
		(state.clone(), viewport.clone(), refresh_edges_in_view.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		let limit = {
			let mut vp = viewport_wh.borrow_mut();
			vp.zoom_at(factor, x, y);
			distance_limit(&vp, max_distance_km)
		};
		let visible = {
			let mut s = state_wh.borrow_mut();
			let visible = s.apply_distance_filter(Some(limit));
			s.refresh();
			visible
		};
		stats.update(|s| s.visible_edges = visible);
		refresh_wh();
	};

	let repository_retry = repository.clone();
	let on_retry = move |_: MouseEvent| {
		repository_retry.clear_cache();
		reload.update(|n| *n += 1);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="city-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
		<div
			class="graph-error"
			style:display=move || if stats.with(|s| s.error.is_some()) { "block" } else { "none" }
		>
			<p>{move || stats.with(|s| s.error.as_ref().map(|e| e.to_string()))}</p>
			<button on:click=on_retry>"Retry"</button>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn caller_cap_only_tightens_the_zoom_limit() {
		let mut viewport = Viewport::new(720.0, 360.0);
		assert_eq!(distance_limit(&viewport, None), 2000.0);
		assert_eq!(distance_limit(&viewport, Some(800.0)), 800.0);
		assert_eq!(distance_limit(&viewport, Some(5000.0)), 2000.0);

		viewport.zoom_at(64.0, 0.0, 0.0);
		assert_eq!(distance_limit(&viewport, None), 500.0);
	}
}
