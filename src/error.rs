//! Error type shared by the repository, the render core and the UI.

use thiserror::Error;

use crate::domain::CityId;

/// Failures surfaced by the graph cache and render core.
///
/// Nothing below the component retries; each failed operation yields exactly
/// one of these to its caller.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GraphError {
	#[error("request to {url} failed{}: {message}", status_suffix(.status))]
	Network {
		url: String,
		status: Option<u16>,
		message: String,
	},

	#[error("unexpected {resource} payload: {detail}")]
	DataShape {
		resource: &'static str,
		detail: String,
	},

	#[error("render container is not ready")]
	ContainerNotReady,

	#[error("no path found between {start} and {goal}")]
	PathNotFound { start: CityId, goal: CityId },

	#[error("WebGL is not available in your browser")]
	RendererUnsupported,
}

impl GraphError {
	pub fn network(url: impl Into<String>, message: impl ToString) -> Self {
		Self::Network {
			url: url.into(),
			status: None,
			message: message.to_string(),
		}
	}

	pub fn data_shape(resource: &'static str, detail: impl ToString) -> Self {
		Self::DataShape {
			resource,
			detail: detail.to_string(),
		}
	}
}

fn status_suffix(status: &Option<u16>) -> String {
	status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn network_message_includes_status_when_known() {
		let err = GraphError::Network {
			url: "http://api/cities/".into(),
			status: Some(503),
			message: "Service Unavailable".into(),
		};
		assert_eq!(
			err.to_string(),
			"request to http://api/cities/ failed (HTTP 503): Service Unavailable"
		);

		let err = GraphError::network("http://api/cities/", "connection refused");
		assert_eq!(
			err.to_string(),
			"request to http://api/cities/ failed: connection refused"
		);
	}
}
