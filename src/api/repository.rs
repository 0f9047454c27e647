use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info};

use super::parse;
use super::transport::{BrowserClock, Clock, HttpTransport, Transport};
use crate::config::{ApiConfig, CITIES_PATH, EDGES_PATH, SHORTEST_PATH_PATH, SUMMARY_PATH};
use crate::domain::{Bounds, City, CityId, Edge, ShortestPath, Summary};
use crate::error::{GraphError, Result};

#[derive(Default)]
struct CacheEntry {
	cities: Option<Rc<Vec<City>>>,
	edges: Option<Rc<Vec<Edge>>>,
	summary: Option<Summary>,
	timestamp: Option<Duration>,
}

/// Fetches the city graph and keeps it fresh for `cache_duration`.
///
/// The entry expires as a whole so cities, edges and summary never drift
/// apart. Concurrent misses may fetch twice; both writes store equivalent
/// data.
pub struct GraphCacheRepository<T = HttpTransport, C = BrowserClock> {
	config: ApiConfig,
	transport: T,
	clock: C,
	cache: RefCell<CacheEntry>,
}

impl GraphCacheRepository {
	pub fn browser(config: ApiConfig) -> Self {
		Self::new(config, HttpTransport, BrowserClock)
	}
}

impl<T: Transport, C: Clock> GraphCacheRepository<T, C> {
	pub fn new(config: ApiConfig, transport: T, clock: C) -> Self {
		Self {
			config,
			transport,
			clock,
			cache: RefCell::new(CacheEntry::default()),
		}
	}

	pub fn config(&self) -> &ApiConfig {
		&self.config
	}

	pub async fn get_cities(&self) -> Result<Rc<Vec<City>>> {
		if let Some(cities) = self.cached(|entry| entry.cities.clone()) {
			debug!("cities served from cache ({})", cities.len());
			return Ok(cities);
		}

		let payload = self.transport.get_json(&self.config.url(CITIES_PATH)).await?;
		let cities = Rc::new(parse::collection::<City>(payload, "cities")?);
		info!("Fetched {} cities", cities.len());
		self.store(|entry| entry.cities = Some(cities.clone()));
		Ok(cities)
	}

	pub async fn get_edges(&self) -> Result<Rc<Vec<Edge>>> {
		if let Some(edges) = self.cached(|entry| entry.edges.clone()) {
			debug!("edges served from cache ({})", edges.len());
			return Ok(edges);
		}

		let payload = self.transport.get_json(&self.config.url(EDGES_PATH)).await?;
		let edges = Rc::new(parse::collection::<Edge>(payload, "edges")?);
		info!("Total edges received from API: {}", edges.len());
		self.store(|entry| entry.edges = Some(edges.clone()));
		Ok(edges)
	}

	pub async fn get_summary(&self) -> Result<Summary> {
		if let Some(summary) = self.cached(|entry| entry.summary.clone()) {
			debug!("summary served from cache");
			return Ok(summary);
		}

		let payload = self.transport.get_json(&self.config.url(SUMMARY_PATH)).await?;
		let summary: Summary = parse::record(payload, "summary")?;
		self.store(|entry| entry.summary = Some(summary.clone()));
		Ok(summary)
	}

	/// Edges with at least one endpoint inside `bounds`.
	///
	/// Edges whose endpoints are not both among the loaded cities are left out.
	pub async fn get_edges_in_viewport(&self, bounds: &Bounds) -> Result<Vec<Edge>> {
		let edges = self.get_edges().await?;
		let cities = self.get_cities().await?;
		let lookup: HashMap<CityId, &City> = cities.iter().map(|c| (c.id, c)).collect();

		Ok(edges
			.iter()
			.filter(|edge| {
				match (lookup.get(&edge.source), lookup.get(&edge.target)) {
					(Some(source), Some(target)) => {
						source.is_in_bounds(bounds) || target.is_in_bounds(bounds)
					}
					_ => false,
				}
			})
			.cloned()
			.collect())
	}

	/// Asks the backend for a route. Never cached.
	pub async fn shortest_path(&self, start: CityId, goal: CityId) -> Result<ShortestPath> {
		let url = format!(
			"{}?start_id={start}&goal_id={goal}",
			self.config.url(SHORTEST_PATH_PATH)
		);
		let payload = match self.transport.get_json(&url).await {
			Err(GraphError::Network {
				status: Some(404), ..
			}) => return Err(GraphError::PathNotFound { start, goal }),
			other => other?,
		};

		let path: ShortestPath = parse::record(payload, "shortest path")?;
		if path.path.is_empty() {
			return Err(GraphError::PathNotFound { start, goal });
		}
		Ok(path)
	}

	pub fn clear_cache(&self) {
		*self.cache.borrow_mut() = CacheEntry::default();
		debug!("graph cache cleared");
	}

	fn cached<R>(&self, pick: impl FnOnce(&CacheEntry) -> Option<R>) -> Option<R> {
		let now = self.clock.now();
		let mut entry = self.cache.borrow_mut();
		if let Some(stamp) = entry.timestamp {
			if now.saturating_sub(stamp) >= self.config.cache_duration {
				debug!("graph cache expired, discarding entry");
				*entry = CacheEntry::default();
			}
		}
		pick(&entry)
	}

	/// The entry is stamped once, when it is first populated, so a later
	/// miss never extends the life of data fetched earlier.
	fn store(&self, write: impl FnOnce(&mut CacheEntry)) {
		let now = self.clock.now();
		let mut entry = self.cache.borrow_mut();
		write(&mut entry);
		entry.timestamp.get_or_insert(now);
	}
}
