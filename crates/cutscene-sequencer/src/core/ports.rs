use super::error::Result;
use super::{AssetRef, Category};

/// A live instance of a visual asset inside the presentation container.
///
/// Not `Clone`: whoever holds it is the only one allowed to release it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct InstanceHandle(u64);

impl InstanceHandle {
	pub fn new(id: u64) -> Self {
		Self(id)
	}

	pub fn id(&self) -> u64 {
		self.0
	}
}

/// Surface that cutscene assets are instantiated into
pub trait PresentationContainer: Send + Sync {
	fn instantiate(&self, asset: &AssetRef) -> Result<InstanceHandle>;

	/// Destroy an instance; must happen before the next one is created
	fn release(&self, handle: InstanceHandle);

	fn request_playback_start(&self, handle: &InstanceHandle, trigger: &str) -> Result<()>;

	/// Normalized play position in `[0, 1]`, reset to 0 on each start.
	/// Looping playback may report values past 1 or wrap back to 0.
	fn normalized_progress(&self, handle: &InstanceHandle) -> f32;

	/// Stop the instance from advancing further (no restart, no loop)
	fn halt_progression(&self, handle: &InstanceHandle);

	/// Show the full-screen cutscene overlay
	fn show_overlay(&self) {}

	fn hide_overlay(&self) {}
}

/// Receives the hand-off once a category sequence is over
pub trait SessionController: Send + Sync {
	fn start_gameplay(&self);

	fn show_ending_screen(&self, category: Category);
}

/// Live progress of whatever is currently playing
pub trait ProgressSource: Send + Sync {
	fn normalized_progress(&self) -> f32;

	fn halt_progression(&self) {}
}

/// Binds a container and one of its instances into a [`ProgressSource`]
pub struct InstanceProgress<'a> {
	container: &'a dyn PresentationContainer,
	handle: &'a InstanceHandle,
}

impl<'a> InstanceProgress<'a> {
	pub fn new(container: &'a dyn PresentationContainer, handle: &'a InstanceHandle) -> Self {
		Self { container, handle }
	}
}

impl ProgressSource for InstanceProgress<'_> {
	fn normalized_progress(&self) -> f32 {
		self.container.normalized_progress(self.handle)
	}

	fn halt_progression(&self) {
		self.container.halt_progression(self.handle);
	}
}

/// Progress source for entries with nothing on screen
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSource for NoProgress {
	fn normalized_progress(&self) -> f32 {
		0.0
	}
}
