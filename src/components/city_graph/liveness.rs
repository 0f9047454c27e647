use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation for async continuations.
///
/// Ended when the owning view unmounts; anything resuming afterwards must
/// check it and drop its result instead of writing state.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
	pub fn new() -> Self {
		Self(Arc::new(AtomicBool::new(true)))
	}

	pub fn is_alive(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}

	pub fn end(&self) {
		self.0.store(false, Ordering::Relaxed);
	}
}

impl Default for Liveness {
	fn default() -> Self {
		Self::new()
	}
}
