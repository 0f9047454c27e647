//! In-memory stand-ins for the browser seams.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;

use crate::api::{Clock, GraphCacheRepository, Transport};
use crate::components::city_graph::{
	GraphRenderState, RenderSurface, Renderer, Subscription, Theme, ThemeSource,
};
use crate::config::ApiConfig;
use crate::error::{GraphError, Result};

pub const BASE_URL: &str = "http://api.test";

pub fn url(path: &str) -> String {
	format!("{BASE_URL}{path}")
}

#[derive(Default)]
pub struct FakeTransport {
	routes: RefCell<HashMap<String, Result<Value>>>,
	calls: RefCell<Vec<String>>,
}

impl FakeTransport {
	pub fn new() -> Rc<Self> {
		Rc::new(Self::default())
	}

	pub fn respond(&self, url: impl Into<String>, body: Value) {
		self.routes.borrow_mut().insert(url.into(), Ok(body));
	}

	pub fn fail(&self, url: impl Into<String>, err: GraphError) {
		self.routes.borrow_mut().insert(url.into(), Err(err));
	}

	pub fn calls_to(&self, url: &str) -> usize {
		self.calls.borrow().iter().filter(|c| *c == url).count()
	}

	pub fn total_calls(&self) -> usize {
		self.calls.borrow().len()
	}
}

impl Transport for FakeTransport {
	async fn get_json(&self, url: &str) -> Result<Value> {
		self.calls.borrow_mut().push(url.to_string());
		self.routes.borrow().get(url).cloned().unwrap_or_else(|| {
			Err(GraphError::Network {
				url: url.to_string(),
				status: Some(404),
				message: "Not Found".into(),
			})
		})
	}
}

#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

impl ManualClock {
	pub fn advance(&self, by: Duration) {
		self.0.set(self.0.get() + by);
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Duration {
		self.0.get()
	}
}

pub type TestRepository = GraphCacheRepository<Rc<FakeTransport>, ManualClock>;

pub fn repository() -> (TestRepository, Rc<FakeTransport>, ManualClock) {
	let transport = FakeTransport::new();
	let clock = ManualClock::default();
	let repo = GraphCacheRepository::new(
		ApiConfig::with_base_url(BASE_URL),
		transport.clone(),
		clock.clone(),
	);
	(repo, transport, clock)
}

type Listener = Box<dyn FnMut(Theme)>;

/// Theme stream driven by the test.
#[derive(Clone, Default)]
pub struct ManualTheme {
	current: Rc<Cell<Theme>>,
	listeners: Rc<RefCell<Vec<(usize, Listener)>>>,
	next_id: Rc<Cell<usize>>,
}

impl ManualTheme {
	pub fn set(&self, theme: Theme) {
		self.current.set(theme);
		for (_, listener) in self.listeners.borrow_mut().iter_mut() {
			listener(theme);
		}
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.borrow().len()
	}
}

impl ThemeSource for ManualTheme {
	fn current(&self) -> Theme {
		self.current.get()
	}

	fn subscribe(&self, on_change: Box<dyn FnMut(Theme)>) -> Result<Subscription> {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		self.listeners.borrow_mut().push((id, on_change));
		let listeners = self.listeners.clone();
		Ok(Subscription::new(move || {
			listeners.borrow_mut().retain(|(other, _)| *other != id);
		}))
	}
}

/// Records renderer lifecycle events in order.
#[derive(Clone, Default)]
pub struct RenderLog(Rc<RefCell<Vec<String>>>);

impl RenderLog {
	pub fn events(&self) -> Vec<String> {
		self.0.borrow().clone()
	}

	pub fn count(&self, event: &str) -> usize {
		self.0.borrow().iter().filter(|e| *e == event).count()
	}

	fn push(&self, event: String) {
		self.0.borrow_mut().push(event);
	}
}

pub struct FakeSurface {
	pub ready: bool,
	pub log: RenderLog,
	mounted: Cell<usize>,
}

impl FakeSurface {
	pub fn new(log: &RenderLog) -> Self {
		Self {
			ready: true,
			log: log.clone(),
			mounted: Cell::new(0),
		}
	}
}

impl RenderSurface for FakeSurface {
	fn mount(&self) -> Result<Box<dyn Renderer>> {
		if !self.ready {
			return Err(GraphError::ContainerNotReady);
		}
		let id = self.mounted.get() + 1;
		self.mounted.set(id);
		self.log.push(format!("mount {id}"));
		Ok(Box::new(FakeRenderer {
			id,
			log: self.log.clone(),
		}))
	}
}

struct FakeRenderer {
	id: usize,
	log: RenderLog,
}

impl Renderer for FakeRenderer {
	fn draw(&mut self, state: &GraphRenderState) {
		self.log.push(format!(
			"draw {} {}/{}",
			self.id,
			state.node_count(),
			state.edge_count()
		));
	}

	fn kill(&mut self) {
		self.log.push(format!("kill {}", self.id));
	}
}

/// Attaches a fake renderer and returns its log.
pub fn attach_fake(state: &mut GraphRenderState) -> RenderLog {
	let log = RenderLog::default();
	state
		.attach_renderer(&FakeSurface::new(&log))
		.expect("fake surface mounts");
	log
}
