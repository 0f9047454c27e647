use std::rc::Rc;
use std::time::Duration;

use gloo_net::http::Request;
use serde_json::Value;

use crate::error::{GraphError, Result};

/// Source of JSON documents keyed by absolute URL.
#[allow(async_fn_in_trait)]
pub trait Transport {
	async fn get_json(&self, url: &str) -> Result<Value>;
}

impl<T: Transport> Transport for Rc<T> {
	async fn get_json(&self, url: &str) -> Result<Value> {
		(**self).get_json(url).await
	}
}

/// Browser `fetch` through gloo-net.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpTransport;

impl Transport for HttpTransport {
	async fn get_json(&self, url: &str) -> Result<Value> {
		let resp = Request::get(url)
			.send()
			.await
			.map_err(|e| GraphError::network(url, e))?;

		if !resp.ok() {
			return Err(GraphError::Network {
				url: url.to_string(),
				status: Some(resp.status()),
				message: resp.status_text(),
			});
		}

		let text = resp
			.text()
			.await
			.map_err(|e| GraphError::network(url, e))?;
		serde_json::from_str(&text).map_err(|e| GraphError::data_shape("response body", e))
	}
}

/// Wall-clock time since the Unix epoch.
pub trait Clock {
	fn now(&self) -> Duration;
}

impl<C: Clock> Clock for Rc<C> {
	fn now(&self) -> Duration {
		(**self).now()
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
	fn now(&self) -> Duration {
		Duration::from_secs_f64(js_sys::Date::now().max(0.0) / 1000.0)
	}
}
