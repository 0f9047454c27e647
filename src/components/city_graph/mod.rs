mod component;
mod liveness;
mod loader;
mod path;
mod projection;
mod render;
mod state;
mod theme;
mod types;

pub use component::CityGraphCanvas;
pub use types::GraphStats;

#[cfg(test)]
pub(crate) use state::{GraphRenderState, RenderSurface, Renderer};
#[cfg(test)]
pub(crate) use theme::{Subscription, ThemeSource};
#[cfg(test)]
pub(crate) use types::Theme;
