//! Equirectangular lat/lng projection with a pan/zoom transform on top.

use crate::domain::Bounds;

/// Screen-space pick radius for cities, in pixels.
pub const HIT_RADIUS: f64 = 6.0;

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 1024.0;
/// Map zoom level shown when the whole world fits the canvas.
const BASE_ZOOM_LEVEL: f64 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	pub transform: ViewTransform,
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform::default(),
			width,
			height,
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Pixels per degree with the whole world fitted and centred.
	fn scale(&self) -> f64 {
		(self.width / 360.0).min(self.height / 180.0).max(f64::EPSILON)
	}

	fn origin(&self) -> (f64, f64) {
		let s = self.scale();
		(
			(self.width - 360.0 * s) / 2.0,
			(self.height - 180.0 * s) / 2.0,
		)
	}

	pub fn project(&self, lat: f64, lng: f64) -> (f64, f64) {
		let (s, (ox, oy), t) = (self.scale(), self.origin(), &self.transform);
		let (wx, wy) = (ox + (lng + 180.0) * s, oy + (90.0 - lat) * s);
		(wx * t.k + t.x, wy * t.k + t.y)
	}

	pub fn unproject(&self, sx: f64, sy: f64) -> (f64, f64) {
		let (s, (ox, oy), t) = (self.scale(), self.origin(), &self.transform);
		let (wx, wy) = ((sx - t.x) / t.k, (sy - t.y) / t.k);
		(90.0 - (wy - oy) / s, (wx - ox) / s - 180.0)
	}

	/// Geographic rectangle currently on screen, clamped to the globe.
	pub fn bounds(&self) -> Bounds {
		let (top, left) = self.unproject(0.0, 0.0);
		let (bottom, right) = self.unproject(self.width, self.height);
		Bounds {
			min_lat: bottom.clamp(-90.0, 90.0),
			max_lat: top.clamp(-90.0, 90.0),
			min_lng: left.clamp(-180.0, 180.0),
			max_lng: right.clamp(-180.0, 180.0),
		}
	}

	pub fn zoom_level(&self) -> f64 {
		BASE_ZOOM_LEVEL + self.transform.k.log2()
	}

	/// Zooms by `factor` keeping the screen point `(x, y)` fixed.
	pub fn zoom_at(&mut self, factor: f64, x: f64, y: f64) {
		let t = &mut self.transform;
		let new_k = (t.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / t.k;
		t.x = x - (x - t.x) * ratio;
		t.y = y - (y - t.y) * ratio;
		t.k = new_k;
	}

	pub fn pan_to(&mut self, x: f64, y: f64) {
		self.transform.x = x;
		self.transform.y = y;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: (f64, f64), b: (f64, f64)) -> bool {
		(a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
	}

	#[test]
	fn whole_world_fits_at_unit_zoom() {
		let viewport = Viewport::new(720.0, 360.0);
		assert!(close(viewport.project(90.0, -180.0), (0.0, 0.0)));
		assert!(close(viewport.project(-90.0, 180.0), (720.0, 360.0)));
		assert!(close(viewport.project(0.0, 0.0), (360.0, 180.0)));

		let bounds = viewport.bounds();
		assert_eq!((bounds.min_lat, bounds.max_lat), (-90.0, 90.0));
		assert_eq!((bounds.min_lng, bounds.max_lng), (-180.0, 180.0));
		assert_eq!(viewport.zoom_level(), 2.0);
	}

	#[test]
	fn unproject_inverts_project_under_pan_and_zoom() {
		let mut viewport = Viewport::new(800.0, 600.0);
		viewport.zoom_at(4.0, 130.0, 420.0);
		viewport.pan_to(viewport.transform.x - 35.0, viewport.transform.y + 12.0);

		let (x, y) = viewport.project(-33.45, -70.66);
		assert!(close(viewport.unproject(x, y), (-33.45, -70.66)));
		assert_eq!(viewport.zoom_level(), 4.0);
	}

	#[test]
	fn zoom_keeps_the_anchor_point_and_clamps() {
		let mut viewport = Viewport::new(720.0, 360.0);
		let anchor = viewport.unproject(200.0, 100.0);
		viewport.zoom_at(8.0, 200.0, 100.0);
		assert!(close(viewport.unproject(200.0, 100.0), anchor));

		let bounds = viewport.bounds();
		assert!(bounds.max_lat - bounds.min_lat < 180.0 / 7.0);

		viewport.zoom_at(1e9, 0.0, 0.0);
		assert_eq!(viewport.transform.k, MAX_ZOOM);
		viewport.zoom_at(1e-9, 0.0, 0.0);
		assert_eq!(viewport.transform.k, MIN_ZOOM);
	}
}
