use std::sync::{
	atomic::{AtomicU64, Ordering},
	Arc,
};

/// Which part of a build is underway.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
	/// Encoding the selected table rectangle into the category matrix; counts encoded cells.
	Encoding,
	/// Growing the tree; counts training rows assigned to leaves.
	Growing,
}

/// A live view of one build phase, handed to the progress callback when the phase starts. The builder advances the shared count as it works, so a retained clone can be polled while the build runs.
#[derive(Clone, Debug)]
pub struct Progress {
	phase: Phase,
	current: Arc<AtomicU64>,
	total: u64,
}

impl Progress {
	pub(crate) fn new(phase: Phase, total: u64) -> Self {
		Self {
			phase,
			current: Arc::new(AtomicU64::new(0)),
			total,
		}
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn total(&self) -> u64 {
		self.total
	}

	pub fn get(&self) -> u64 {
		self.current.load(Ordering::Relaxed)
	}

	pub(crate) fn inc(&self, amount: u64) {
		self.current.fetch_add(amount, Ordering::Relaxed);
	}
}
