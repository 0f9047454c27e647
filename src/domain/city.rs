use serde::Deserialize;

use super::{Bounds, CityId};

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct City {
	pub id: CityId,
	#[serde(rename = "city", alias = "name", default)]
	pub name: String,
	pub lat: f64,
	pub lng: f64,
	#[serde(default)]
	pub country: Option<String>,
	#[serde(default)]
	pub iso2: Option<String>,
	#[serde(default)]
	pub iso3: Option<String>,
	#[serde(default)]
	pub admin_name: Option<String>,
	#[serde(default)]
	pub capital: Option<String>,
	#[serde(default)]
	pub population: Option<f64>,
}

impl City {
	pub fn new(id: CityId, name: impl Into<String>, lat: f64, lng: f64) -> Self {
		Self {
			id,
			name: name.into(),
			lat,
			lng,
			country: None,
			iso2: None,
			iso3: None,
			admin_name: None,
			capital: None,
			population: None,
		}
	}

	pub fn coordinates(&self) -> (f64, f64) {
		(self.lat, self.lng)
	}

	pub fn is_in_bounds(&self, bounds: &Bounds) -> bool {
		bounds.contains(self.lat, self.lng)
	}
}

/// Great-circle distance between two cities in kilometres.
pub fn haversine_km(a: &City, b: &City) -> f64 {
	let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
	let d_lat = (b.lat - a.lat).to_radians();
	let d_lng = (b.lng - a.lng).to_radians();

	let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
	2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bounds_are_inclusive_on_every_side() {
		let bounds = Bounds {
			min_lat: -1.0,
			max_lat: 1.0,
			min_lng: -1.0,
			max_lng: 1.0,
		};
		for (lat, lng) in [(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0), (1.0, 1.0)] {
			assert!(City::new(1, "edge", lat, lng).is_in_bounds(&bounds), "({lat}, {lng})");
		}
		assert!(!City::new(2, "out", 1.0001, 0.0).is_in_bounds(&bounds));
		assert!(!City::new(3, "out", 0.0, -1.5).is_in_bounds(&bounds));
	}

	#[test]
	fn one_degree_of_longitude_at_the_equator() {
		let a = City::new(1, "a", 0.0, 0.0);
		let b = City::new(2, "b", 0.0, 1.0);
		assert!((haversine_km(&a, &b) - 111.19).abs() < 0.01);
		assert_eq!(haversine_km(&a, &a), 0.0);
	}

	#[test]
	fn deserializes_backend_record() {
		let city: City = serde_json::from_str(
			r#"{"id": 7, "city": "Lima", "lat": -12.06, "lng": -77.04, "country": "Peru", "iso2": "PE", "population": 8852000}"#,
		)
		.unwrap();
		assert_eq!(city.id, 7);
		assert_eq!(city.name, "Lima");
		assert_eq!(city.coordinates(), (-12.06, -77.04));
		assert_eq!(city.country.as_deref(), Some("Peru"));
		assert_eq!(city.capital, None);

		let bare: City = serde_json::from_str(r#"{"id": 1, "lat": 0, "lng": 0}"#).unwrap();
		assert!(bare.name.is_empty());
	}
}
