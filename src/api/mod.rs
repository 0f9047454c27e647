//! Backend access: HTTP transport, payload parsing and the TTL cache.

mod parse;
mod repository;
mod transport;

pub use repository::GraphCacheRepository;
pub use transport::{BrowserClock, Clock, HttpTransport, Transport};
