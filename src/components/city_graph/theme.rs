use std::rc::Rc;

use js_sys::Array;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MutationObserver, MutationObserverInit};

use super::state::{GraphRenderState, SharedRenderState};
use super::types::{BASE_EDGE_SIZE, Theme};
use crate::error::{GraphError, Result};

/// A stream of dark/light changes.
pub trait ThemeSource {
	fn current(&self) -> Theme;
	fn subscribe(&self, on_change: Box<dyn FnMut(Theme)>) -> Result<Subscription>;
}

/// Handle returned by [`ThemeSource::subscribe`]; unsubscribes on drop.
pub struct Subscription {
	cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
	pub fn new(cancel: impl FnOnce() + 'static) -> Self {
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}

	pub fn unsubscribe(&mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.unsubscribe();
	}
}

/// The `dark` class on `<html>`, watched with a `MutationObserver`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentTheme;

impl DocumentTheme {
	fn root() -> Option<Element> {
		web_sys::window()?.document()?.document_element()
	}
}

impl ThemeSource for DocumentTheme {
	fn current(&self) -> Theme {
		Theme::from_dark(Self::root().is_some_and(|root| root.class_list().contains("dark")))
	}

	fn subscribe(&self, mut on_change: Box<dyn FnMut(Theme)>) -> Result<Subscription> {
		let root = Self::root().ok_or(GraphError::ContainerNotReady)?;
		let mut last = self.current();
		let callback = Closure::<dyn FnMut()>::new(move || {
			let theme = DocumentTheme.current();
			if theme != last {
				last = theme;
				on_change(theme);
			}
		});

		let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
			.map_err(|_| GraphError::ContainerNotReady)?;
		let options = MutationObserverInit::new();
		options.set_attributes(true);
		options.set_attribute_filter(&Array::of1(&JsValue::from_str("class")));
		observer
			.observe_with_options(&root, &options)
			.map_err(|_| GraphError::ContainerNotReady)?;

		Ok(Subscription::new(move || {
			observer.disconnect();
			drop(callback);
		}))
	}
}

/// Keeps base colors in step with the theme without touching the path overlay.
pub struct ThemeReconciler {
	subscription: Option<Subscription>,
}

impl ThemeReconciler {
	pub fn observe<S: ThemeSource>(source: &S, state: &SharedRenderState) -> Result<Self> {
		let weak = Rc::downgrade(state);
		let subscription = source.subscribe(Box::new(move |theme| {
			let Some(state) = weak.upgrade() else {
				return;
			};
			let kept = repaint_theme(&mut state.borrow_mut(), theme);
			debug!("theme changed to {theme:?}, {kept} path edges kept");
		}))?;
		Ok(Self {
			subscription: Some(subscription),
		})
	}

	#[cfg(test)]
	pub fn is_observing(&self) -> bool {
		self.subscription.is_some()
	}

	pub fn dispose(&mut self) {
		if let Some(mut subscription) = self.subscription.take() {
			subscription.unsubscribe();
		}
	}
}

/// Recolors nodes and non-overlay edges for `theme`, then repaints once.
/// Returns the number of overlay edges left as they were.
pub fn repaint_theme(state: &mut GraphRenderState, theme: Theme) -> usize {
	state.set_theme(theme);
	let node_color = theme.node_color();
	state.for_each_node_mut(|node| node.color = node_color.to_string());

	let (edge_color, mut kept) = (theme.edge_color(), 0);
	state.for_each_edge_mut(|_, _, edge| {
		if edge.overlay {
			kept += 1;
		} else {
			edge.color = edge_color.to_string();
			edge.size = BASE_EDGE_SIZE;
		}
	});
	state.refresh();
	kept
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::city_graph::types::{PATH_EDGE_COLOR, PATH_EDGE_SIZE};
	use crate::domain::{City, Edge};
	use crate::testing::{ManualTheme, attach_fake};

	fn shared() -> SharedRenderState {
		let state = GraphRenderState::shared(Theme::Light);
		{
			let mut s = state.borrow_mut();
			for (id, lng) in [(1, 0.0), (2, 1.0), (3, 2.0)] {
				s.add_city(&City::new(id, "c", 0.0, lng), Theme::Light.node_color());
			}
			s.add_edge(&Edge::new(1, 2, None), Theme::Light.edge_color());
			s.add_edge(&Edge::new(2, 3, None), Theme::Light.edge_color());
		}
		state
	}

	#[test]
	fn theme_flip_recolors_everything_but_the_overlay() {
		let state = shared();
		let log = attach_fake(&mut state.borrow_mut());
		{
			let mut s = state.borrow_mut();
			let edge = s.edge_mut(2, 3).unwrap();
			edge.color = PATH_EDGE_COLOR.into();
			edge.size = PATH_EDGE_SIZE;
			edge.overlay = true;
		}

		let source = ManualTheme::default();
		let _reconciler = ThemeReconciler::observe(&source, &state).unwrap();
		source.set(Theme::Dark);

		let s = state.borrow();
		assert_eq!(s.theme(), Theme::Dark);
		assert_eq!(s.edge(1, 2).unwrap().color, Theme::Dark.edge_color());
		assert_eq!(s.edge(2, 3).unwrap().color, PATH_EDGE_COLOR);
		assert_eq!(s.edge(2, 3).unwrap().size, PATH_EDGE_SIZE);
		s.for_each_node(|n| assert_eq!(n.color, Theme::Dark.node_color()));
		// one draw on attach, one for the flip
		assert_eq!(log.count("draw 1 3/2"), 2);
	}

	#[test]
	fn dispose_stops_observing() {
		let state = shared();
		let source = ManualTheme::default();
		let mut reconciler = ThemeReconciler::observe(&source, &state).unwrap();
		assert_eq!(source.listener_count(), 1);

		reconciler.dispose();
		reconciler.dispose();
		assert!(!reconciler.is_observing());
		assert_eq!(source.listener_count(), 0);

		source.set(Theme::Dark);
		assert_eq!(state.borrow().edge(1, 2).unwrap().color, Theme::Light.edge_color());
	}

	#[test]
	fn dropped_state_is_ignored() {
		let source = ManualTheme::default();
		let reconciler = {
			let state = shared();
			ThemeReconciler::observe(&source, &state).unwrap()
		};
		source.set(Theme::Dark);
		assert!(reconciler.is_observing());
	}
}
