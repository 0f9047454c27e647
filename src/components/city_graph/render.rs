use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

use super::projection::Viewport;
use super::state::{GraphRenderState, RenderSurface, Renderer};
use super::types::Theme;
use crate::error::{GraphError, Result};

/// Zoom factor above which city names are drawn.
const LABEL_ZOOM: f64 = 16.0;

/// A `<canvas>` element waiting for a renderer.
pub struct CanvasSurface {
	pub canvas: Option<HtmlCanvasElement>,
	pub viewport: Rc<RefCell<Viewport>>,
	pub fullscreen: bool,
	/// Invoked after the canvas follows a window resize.
	pub on_resize: Option<Rc<dyn Fn()>>,
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

impl RenderSurface for CanvasSurface {
	fn mount(&self) -> Result<Box<dyn Renderer>> {
		let canvas = self.canvas.clone().ok_or(GraphError::ContainerNotReady)?;
		let window = web_sys::window().ok_or(GraphError::ContainerNotReady)?;
		let parent = canvas.parent_element().ok_or(GraphError::ContainerNotReady)?;

		let (w, h) = if self.fullscreen {
			window_size(&window).ok_or(GraphError::ContainerNotReady)?
		} else {
			(parent.client_width() as f64, parent.client_height() as f64)
		};
		if w <= 0.0 || h <= 0.0 {
			return Err(GraphError::ContainerNotReady);
		}
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
			.ok_or(GraphError::RendererUnsupported)?;
		self.viewport.borrow_mut().resize(w, h);

		let mut resize_cb = None;
		if self.fullscreen {
			let (canvas_resize, viewport_resize, on_resize) =
				(canvas.clone(), self.viewport.clone(), self.on_resize.clone());
			let cb = Closure::<dyn FnMut()>::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				viewport_resize.borrow_mut().resize(nw, nh);
				if let Some(ref notify) = on_resize {
					notify();
				}
			});
			if window
				.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
				.is_err()
			{
				warn!("could not listen for window resizes");
			}
			resize_cb = Some(cb);
		}

		Ok(Box::new(CanvasRenderer {
			canvas,
			ctx,
			viewport: self.viewport.clone(),
			resize_cb,
		}))
	}
}

pub struct CanvasRenderer {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	viewport: Rc<RefCell<Viewport>>,
	resize_cb: Option<Closure<dyn FnMut()>>,
}

impl Renderer for CanvasRenderer {
	fn draw(&mut self, state: &GraphRenderState) {
		render(state, &self.ctx, &self.viewport.borrow());
	}

	fn kill(&mut self) {
		if let (Some(cb), Some(window)) = (self.resize_cb.take(), web_sys::window()) {
			let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
		self.ctx.clear_rect(
			0.0,
			0.0,
			self.canvas.width() as f64,
			self.canvas.height() as f64,
		);
	}
}

pub fn render(state: &GraphRenderState, ctx: &CanvasRenderingContext2d, viewport: &Viewport) {
	let theme = state.theme();
	ctx.set_fill_style_str(theme.background());
	ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
	draw_edges(state, ctx, viewport, false);
	// path edges last so nothing paints over them
	draw_edges(state, ctx, viewport, true);
	draw_nodes(state, ctx, viewport, theme);
	ctx.set_global_alpha(1.0);
}

fn draw_edges(
	state: &GraphRenderState,
	ctx: &CanvasRenderingContext2d,
	viewport: &Viewport,
	overlay: bool,
) {
	let k = viewport.transform.k;
	state.for_each_edge(|n1, n2, edge| {
		if edge.overlay != overlay || (edge.hidden && !edge.overlay) {
			return;
		}
		let (x1, y1) = viewport.project(n1.city.lat, n1.city.lng);
		let (x2, y2) = viewport.project(n2.city.lat, n2.city.lng);
		if !segment_visible(viewport, x1, y1, x2, y2) {
			return;
		}

		ctx.set_global_alpha(if edge.overlay { 1.0 } else { edge.opacity });
		ctx.set_stroke_style_str(&edge.color);
		ctx.set_line_width(edge.size * k.sqrt().max(1.0));
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	});
}

fn draw_nodes(
	state: &GraphRenderState,
	ctx: &CanvasRenderingContext2d,
	viewport: &Viewport,
	theme: Theme,
) {
	let k = viewport.transform.k;
	ctx.set_global_alpha(1.0);
	state.for_each_node(|node| {
		let (x, y) = viewport.project(node.city.lat, node.city.lng);
		if x < 0.0 || y < 0.0 || x > viewport.width || y > viewport.height {
			return;
		}
		let radius = node.size * k.powf(0.25);

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.color);
		ctx.fill();

		if k >= LABEL_ZOOM && !node.city.name.is_empty() {
			ctx.set_fill_style_str(theme.node_color());
			ctx.set_font("10px sans-serif");
			let _ = ctx.fill_text(&node.city.name, x + radius + 3.0, y + 3.0);
		}
	});
}

/// Cheap reject for segments whose bounding box misses the canvas.
fn segment_visible(viewport: &Viewport, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
	!(x1.max(x2) < 0.0
		|| y1.max(y2) < 0.0
		|| x1.min(x2) > viewport.width
		|| y1.min(y2) > viewport.height)
}
