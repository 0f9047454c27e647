use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

use crate::components::city_graph::{CityGraphCanvas, GraphStats};
use crate::domain::DistanceBand;

/// Probes a throwaway canvas for a WebGL context.
fn webgl_available() -> bool {
	let Some(document) = web_sys::window().and_then(|w| w.document()) else {
		return false;
	};
	let Some(canvas) = document
		.create_element("canvas")
		.ok()
		.and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
	else {
		return false;
	};
	["webgl", "experimental-webgl"]
		.iter()
		.any(|kind| matches!(canvas.get_context(kind), Ok(Some(_))))
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let webgl = Signal::derive(webgl_available);
	let stats = RwSignal::new(GraphStats {
		loading: true,
		..GraphStats::default()
	});

	let counts = move || {
		stats.with(|s| {
			let mut line = format!(
				"{} cities, {} roads, {} shown",
				s.nodes, s.edges, s.visible_edges
			);
			if let Some(n) = s.edges_in_view {
				line.push_str(&format!(", {n} in view"));
			}
			if let Some(summary) = &s.summary {
				line.push_str(&format!(
					" (backend: {} nodes / {} edges)",
					summary.num_nodes, summary.num_edges
				));
			}
			line
		})
	};
	let hint = move || {
		stats.with(|s| match &s.selected {
			Some((_, name)) => format!("From {name}: click a destination"),
			None => "Click two cities to find the shortest route.".to_string(),
		})
	};
	let last_path = move || {
		stats.with(|s| {
			s.last_path.as_ref().map(|p| {
				format!(
					"Route: {} stops, {:.2} km, {} cities explored",
					p.path_length, p.distance, p.cities_explored
				)
			})
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<CityGraphCanvas webgl_supported=webgl stats=stats fullscreen=true />
				<div class="graph-overlay">
					<h1>"City Graph"</h1>
					<Show
						when=move || stats.with(|s| s.loading)
						fallback=move || view! { <p class="subtitle">{counts}</p> }
					>
						<p class="subtitle">"Loading graph..."</p>
					</Show>
					<p class="subtitle">{hint}</p>
					<p class="subtitle">{last_path}</p>
					<ul class="distance-legend">
						{DistanceBand::ALL
							.into_iter()
							.map(|band| {
								view! {
									<li>
										<span class="swatch" style:background-color=band.color()></span>
										{band.label()}
									</li>
								}
							})
							.collect_view()}
					</ul>
				</div>
			</div>
		</ErrorBoundary>
	}
}
