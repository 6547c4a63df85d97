use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Category, CategoryIndices, InstanceHandle, PresentationContainer};

/// Mutable runtime state of one category sequence.
///
/// Owns the only live instance handle; a new instance can only be attached
/// after the previous one has been released.
#[derive(Debug)]
pub struct PlaybackSession {
	category: Category,
	indices: CategoryIndices,
	position: usize,
	skip: CancellationToken,
	active: Option<InstanceHandle>,
}

impl PlaybackSession {
	pub fn new(category: Category, indices: CategoryIndices, skip: CancellationToken) -> Self {
		Self {
			category,
			indices,
			position: 0,
			skip,
			active: None,
		}
	}

	pub fn category(&self) -> Category {
		self.category
	}

	pub fn indices(&self) -> &[usize] {
		&self.indices
	}

	pub fn position(&self) -> usize {
		self.position
	}

	/// Collection index under the cursor
	pub fn current_index(&self) -> Option<usize> {
		self.indices.get(self.position).copied()
	}

	pub fn is_last(&self) -> bool {
		self.position + 1 >= self.indices.len()
	}

	/// Move the cursor forward; returns the new collection index
	pub fn advance(&mut self) -> Option<usize> {
		if self.position < self.indices.len() {
			self.position += 1;
		}
		self.current_index()
	}

	pub fn is_skipped(&self) -> bool {
		self.skip.is_cancelled()
	}

	pub fn skip_token(&self) -> &CancellationToken {
		&self.skip
	}

	pub fn active(&self) -> Option<&InstanceHandle> {
		self.active.as_ref()
	}

	/// Take ownership of a new instance, releasing the previous one first
	pub fn attach(&mut self, handle: InstanceHandle, container: &dyn PresentationContainer) {
		self.release_active(container);
		self.active = Some(handle);
	}

	pub fn release_active(&mut self, container: &dyn PresentationContainer) {
		if let Some(handle) = self.active.take() {
			debug!("Releasing cutscene instance {}", handle.id());
			container.release(handle);
		}
	}

	/// Release everything and rewind the cursor
	pub fn finish(&mut self, container: &dyn PresentationContainer) {
		self.release_active(container);
		self.position = 0;
	}
}
