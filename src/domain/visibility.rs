/// Longest edge worth drawing at a given map zoom level, in kilometres.
///
/// Zoomed out only continental links are kept; zooming in trades reach for
/// local detail.
pub fn max_distance_for_zoom(zoom_level: f64) -> f64 {
	if zoom_level <= 3.0 {
		2000.0
	} else if zoom_level <= 5.0 {
		1500.0
	} else if zoom_level <= 7.0 {
		1000.0
	} else {
		500.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn steps_down_as_zoom_increases() {
		assert_eq!(max_distance_for_zoom(2.0), 2000.0);
		assert_eq!(max_distance_for_zoom(3.0), 2000.0);
		assert_eq!(max_distance_for_zoom(4.5), 1500.0);
		assert_eq!(max_distance_for_zoom(7.0), 1000.0);
		assert_eq!(max_distance_for_zoom(7.1), 500.0);
		assert_eq!(max_distance_for_zoom(12.0), 500.0);
	}
}
