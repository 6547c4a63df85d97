use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::info;

use super::error::{CutsceneError, Result};
use super::{Category, SessionController};

/// Which clip the loop flag is taken from when an asset has several
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopFlagPolicy {
	/// Loop flag of the first clip, duration of the longest
	#[default]
	FirstClip,
	/// Loop flag and duration both from the longest clip
	LongestClip,
}

/// Timing knobs shared by the sequencer and the completion detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutsceneConfig {
	/// Every entry waits exactly its expected duration, no heuristics
	pub simple_timing: bool,
	/// Looping entries play once for their expected duration and are then halted
	pub force_non_looping: bool,
	pub transition_pause_ms: u64,
	pub minimum_animation_ms: u64,
	/// Used when an entry has no usable duration or no asset at all
	pub default_duration_ms: u64,
	pub timeout_ms: u64,
	pub poll_interval_ms: u64,
	/// Trigger parameter sent when requesting playback start
	pub trigger_name: String,
	pub loop_flag_policy: LoopFlagPolicy,
}

impl CutsceneConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_simple_timing(mut self, enable: bool) -> Self {
		self.simple_timing = enable;
		self
	}

	pub fn with_force_non_looping(mut self, enable: bool) -> Self {
		self.force_non_looping = enable;
		self
	}

	pub fn with_transition_pause(mut self, ms: u64) -> Self {
		self.transition_pause_ms = ms;
		self
	}

	pub fn with_minimum_animation(mut self, ms: u64) -> Self {
		self.minimum_animation_ms = ms;
		self
	}

	pub fn with_default_duration(mut self, ms: u64) -> Self {
		self.default_duration_ms = ms;
		self
	}

	pub fn with_timeout(mut self, ms: u64) -> Self {
		self.timeout_ms = ms;
		self
	}

	pub fn with_poll_interval(mut self, ms: u64) -> Self {
		self.poll_interval_ms = ms;
		self
	}

	pub fn with_trigger_name(mut self, trigger: impl Into<String>) -> Self {
		self.trigger_name = trigger.into();
		self
	}

	pub fn with_loop_flag_policy(mut self, policy: LoopFlagPolicy) -> Self {
		self.loop_flag_policy = policy;
		self
	}

	pub fn transition_pause(&self) -> Duration {
		Duration::from_millis(self.transition_pause_ms)
	}

	pub fn minimum_animation(&self) -> Duration {
		Duration::from_millis(self.minimum_animation_ms)
	}

	pub fn default_duration(&self) -> Duration {
		Duration::from_millis(self.default_duration_ms)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn validate(&self) -> Result<()> {
		if self.poll_interval_ms == 0 {
			return Err(CutsceneError::InvalidConfig("poll interval must be non-zero".to_string()));
		}
		if self.timeout_ms == 0 {
			return Err(CutsceneError::InvalidConfig("timeout must be non-zero".to_string()));
		}
		if self.default_duration_ms == 0 {
			return Err(CutsceneError::InvalidConfig("default duration must be non-zero".to_string()));
		}
		if self.minimum_animation_ms > self.timeout_ms {
			return Err(CutsceneError::InvalidConfig(format!(
				"minimum animation time {}ms exceeds timeout {}ms",
				self.minimum_animation_ms, self.timeout_ms
			)));
		}
		Ok(())
	}
}

impl Default for CutsceneConfig {
	fn default() -> Self {
		Self {
			simple_timing: false,
			force_non_looping: true,
			transition_pause_ms: 500,
			minimum_animation_ms: 500,
			default_duration_ms: 3000,
			timeout_ms: 30_000,
			poll_interval_ms: 50,
			trigger_name: "Play".to_string(),
			loop_flag_policy: LoopFlagPolicy::FirstClip,
		}
	}
}

/// Downstream action handed to the session controller when a sequence ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "category")]
pub enum SessionAction {
	StartGameplay,
	ShowEndingScreen(Category),
	Nothing,
}

impl SessionAction {
	pub fn dispatch(self, controller: &dyn SessionController) {
		match self {
			Self::StartGameplay => {
				info!("Handing over to gameplay");
				controller.start_gameplay();
			}
			Self::ShowEndingScreen(category) => {
				info!("Showing {} ending screen", category);
				controller.show_ending_screen(category);
			}
			Self::Nothing => {}
		}
	}
}

/// What a category does when it completes, is skipped, or has nothing to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRoute {
	pub on_complete: SessionAction,
	pub on_skip: SessionAction,
	pub on_empty: SessionAction,
}

impl CategoryRoute {
	/// Same action for every way the sequence can end
	pub fn uniform(action: SessionAction) -> Self {
		Self {
			on_complete: action,
			on_skip: action,
			on_empty: action,
		}
	}
}

/// Table of per-category routes; adding a category is a data change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryActions {
	routes: HashMap<Category, CategoryRoute>,
}

impl CategoryActions {
	pub fn empty() -> Self {
		Self { routes: HashMap::new() }
	}

	pub fn with_route(mut self, category: Category, route: CategoryRoute) -> Self {
		self.routes.insert(category, route);
		self
	}

	/// Unrouted categories do nothing
	pub fn route(&self, category: Category) -> CategoryRoute {
		self.routes.get(&category).copied().unwrap_or(CategoryRoute::uniform(SessionAction::Nothing))
	}
}

impl Default for CategoryActions {
	fn default() -> Self {
		Self::empty()
			.with_route(Category::Intro, CategoryRoute::uniform(SessionAction::StartGameplay))
			.with_route(Category::HappyEnd, CategoryRoute::uniform(SessionAction::ShowEndingScreen(Category::HappyEnd)))
			.with_route(Category::BadEnd, CategoryRoute::uniform(SessionAction::ShowEndingScreen(Category::BadEnd)))
	}
}
