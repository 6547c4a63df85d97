use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::wait::{pause, Wait};
use super::{CutsceneConfig, CutsceneEntry, ProgressSource};

const MIN_WAIT_RATIO: f64 = 0.05;
const ELAPSED_RATIO: f64 = 0.98;
const NEAR_END_PROGRESS: f32 = 0.95;
const NEAR_END_RATIO: f64 = 0.95;
const WRAP_PROGRESS: f32 = 1.0;
const WRAP_RATIO: f64 = 0.8;
const STALL_PROGRESS: f32 = 0.9;
const STALL_POLLS: u32 = 3;
const STALL_EPSILON: f32 = 1e-4;
const STALL_STEP_FRACTION: f32 = 0.1;

/// Why an entry was considered done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
	/// Fixed-duration mode ran its full course
	FixedDuration,
	/// 98% of the expected duration elapsed
	DurationElapsed,
	/// Progress reached 95% with 95% of the time elapsed
	ProgressNearEnd,
	/// Progress hit the end with 80% of the time elapsed
	ProgressWrapped,
	/// Progress froze near the end
	Stalled,
	TimedOut,
	Skipped,
	/// Nothing was on screen; the default duration was waited out
	Missing,
}

impl Completion {
	pub fn is_skipped(self) -> bool {
		self == Self::Skipped
	}
}

/// What the detector needs to know about one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTiming {
	pub expected: Duration,
	pub looping: bool,
	pub manual: bool,
}

impl EntryTiming {
	pub fn new(expected: Duration) -> Self {
		Self {
			expected,
			looping: false,
			manual: false,
		}
	}

	pub fn looping(mut self, looping: bool) -> Self {
		self.looping = looping;
		self
	}

	pub fn manual(mut self, manual: bool) -> Self {
		self.manual = manual;
		self
	}

	/// Timing for an entry; unknown durations fall back to the configured default
	pub fn for_entry(entry: &CutsceneEntry, config: &CutsceneConfig) -> Self {
		let secs = entry.effective_duration();
		let expected = if secs > 0.0 {
			Duration::try_from_secs_f32(secs).unwrap_or_else(|_| config.default_duration())
		} else {
			config.default_duration()
		};

		Self {
			expected,
			looping: entry.is_looping(),
			manual: entry.uses_manual_duration(),
		}
	}
}

/// Counts consecutive polls whose progress did not move while near the end
#[derive(Debug)]
struct StallTracker {
	last: Option<f32>,
	unchanged: u32,
	epsilon: f32,
}

impl Default for StallTracker {
	fn default() -> Self {
		Self::with_epsilon(STALL_EPSILON)
	}
}

impl StallTracker {
	fn with_epsilon(epsilon: f32) -> Self {
		Self {
			last: None,
			unchanged: 0,
			epsilon,
		}
	}

	/// Frozen means moving less than a tenth of one honest poll step, so long
	/// clips that advance slowly are not mistaken for stalls
	fn for_entry(poll: Duration, expected: Duration) -> Self {
		if expected.is_zero() {
			return Self::default();
		}
		let step = poll.as_secs_f32() / expected.as_secs_f32();
		Self::with_epsilon((step * STALL_STEP_FRACTION).min(STALL_EPSILON))
	}

	fn observe(&mut self, progress: f32) -> bool {
		let frozen = self.last.is_some_and(|last| (last - progress).abs() < self.epsilon);
		if frozen && progress > STALL_PROGRESS {
			self.unchanged += 1;
		} else {
			self.unchanged = 0;
		}
		self.last = Some(progress);
		self.unchanged >= STALL_POLLS
	}
}

/// Decides when a single playing entry is finished
#[derive(Debug, Clone)]
pub struct CompletionDetector {
	config: CutsceneConfig,
}

impl CompletionDetector {
	pub fn new(config: CutsceneConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &CutsceneConfig {
		&self.config
	}

	/// Whether `timing` skips the heuristics and waits a fixed duration
	pub fn uses_fixed_timing(&self, timing: &EntryTiming) -> bool {
		timing.manual || self.config.simple_timing || (timing.looping && self.config.force_non_looping)
	}

	/// Shortest time the heuristics wait before they may fire
	pub fn minimum_wait(&self, expected: Duration) -> Duration {
		self.config.minimum_animation().max(expected.mul_f64(MIN_WAIT_RATIO)).min(self.config.timeout())
	}

	/// Wait until the entry behind `source` is done or the session is skipped.
	///
	/// On any outcome but a skip the playback is halted so it cannot restart
	/// before the instance is released.
	pub async fn wait(&self, timing: EntryTiming, source: &dyn ProgressSource, skip: &CancellationToken) -> Completion {
		let expected = if timing.expected.is_zero() { self.config.default_duration() } else { timing.expected };
		let timeout = self.config.timeout();
		let started = Instant::now();

		if self.uses_fixed_timing(&timing) {
			if expected > timeout {
				warn!("Expected duration {:?} exceeds timeout {:?}; clamping", expected, timeout);
			}
			return match pause(expected.min(timeout), skip).await {
				Wait::Skipped => Completion::Skipped,
				Wait::Elapsed => {
					source.halt_progression();
					if expected > timeout {
						Completion::TimedOut
					} else {
						Completion::FixedDuration
					}
				}
			};
		}

		if pause(self.minimum_wait(expected), skip).await == Wait::Skipped {
			return Completion::Skipped;
		}

		let mut stall = StallTracker::for_entry(self.config.poll_interval(), expected);
		loop {
			let elapsed = started.elapsed();
			if elapsed >= timeout {
				warn!("Completion heuristics did not converge within {:?} (expected {:?})", timeout, expected);
				source.halt_progression();
				return Completion::TimedOut;
			}

			let progress = sanitize(source.normalized_progress());
			if let Some(reason) = evaluate(expected, elapsed, progress, &mut stall) {
				debug!("Entry complete: {:?} at {:?} (progress {:.3}, expected {:?})", reason, elapsed, progress, expected);
				source.halt_progression();
				return reason;
			}

			let next = self.config.poll_interval().min(timeout - elapsed);
			if pause(next, skip).await == Wait::Skipped {
				return Completion::Skipped;
			}
		}
	}

	/// Stand-in wait for an entry that has nothing on screen
	pub async fn wait_missing(&self, skip: &CancellationToken) -> Completion {
		let wait = self.config.default_duration().min(self.config.timeout());
		match pause(wait, skip).await {
			Wait::Skipped => Completion::Skipped,
			Wait::Elapsed => Completion::Missing,
		}
	}
}

/// Heuristic checks in order of reliability
fn evaluate(expected: Duration, elapsed: Duration, progress: f32, stall: &mut StallTracker) -> Option<Completion> {
	let stalled = stall.observe(progress);

	if elapsed >= expected.mul_f64(ELAPSED_RATIO) {
		Some(Completion::DurationElapsed)
	} else if progress >= NEAR_END_PROGRESS && elapsed >= expected.mul_f64(NEAR_END_RATIO) {
		Some(Completion::ProgressNearEnd)
	} else if progress >= WRAP_PROGRESS && elapsed >= expected.mul_f64(WRAP_RATIO) {
		Some(Completion::ProgressWrapped)
	} else if stalled {
		Some(Completion::Stalled)
	} else {
		None
	}
}

fn sanitize(progress: f32) -> f32 {
	if progress.is_finite() {
		progress.max(0.0)
	} else {
		0.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn secs(s: f64) -> Duration {
		Duration::from_secs_f64(s)
	}

	#[test]
	fn elapsed_time_is_primary() {
		let mut stall = StallTracker::default();
		assert_eq!(evaluate(secs(2.0), secs(1.97), 0.0, &mut stall), Some(Completion::DurationElapsed));
		assert_eq!(evaluate(secs(2.0), secs(1.5), 0.0, &mut StallTracker::default()), None);
	}

	#[test]
	fn near_end_requires_both_progress_and_time() {
		assert_eq!(evaluate(secs(10.0), secs(9.6), 0.96, &mut StallTracker::default()), Some(Completion::ProgressNearEnd));
		assert_eq!(evaluate(secs(10.0), secs(5.0), 0.99, &mut StallTracker::default()), None);
		assert_eq!(evaluate(secs(10.0), secs(9.6), 0.5, &mut StallTracker::default()), None);
	}

	#[test]
	fn wrapped_progress_needs_eighty_percent() {
		assert_eq!(evaluate(secs(10.0), secs(8.1), 1.0, &mut StallTracker::default()), Some(Completion::ProgressWrapped));
		assert_eq!(evaluate(secs(10.0), secs(7.0), 1.0, &mut StallTracker::default()), None);
	}

	#[test]
	fn stall_fires_after_three_unchanged_polls_near_end() {
		let mut stall = StallTracker::default();
		let expected = secs(10.0);
		assert_eq!(evaluate(expected, secs(1.0), 0.92, &mut stall), None);
		assert_eq!(evaluate(expected, secs(1.05), 0.92, &mut stall), None);
		assert_eq!(evaluate(expected, secs(1.10), 0.92, &mut stall), None);
		assert_eq!(evaluate(expected, secs(1.15), 0.92, &mut stall), Some(Completion::Stalled));
	}

	#[test]
	fn stall_ignores_frozen_progress_far_from_end() {
		let mut stall = StallTracker::default();
		for step in 0..10 {
			assert_eq!(evaluate(secs(10.0), secs(1.0 + f64::from(step) * 0.05), 0.5, &mut stall), None);
		}
	}

	#[test]
	fn stall_counter_resets_when_progress_moves() {
		let mut stall = StallTracker::default();
		assert!(!stall.observe(0.95));
		assert!(!stall.observe(0.95));
		assert!(!stall.observe(0.96));
		assert!(!stall.observe(0.96));
		assert!(!stall.observe(0.96));
		assert!(stall.observe(0.96));
	}

	#[test]
	fn slow_long_clips_are_not_stalls() {
		// 600s clip polled every 50ms moves ~8.3e-5 per poll
		let mut stall = StallTracker::for_entry(Duration::from_millis(50), secs(600.0));
		let step = 0.05 / 600.0;
		for n in 0..10_u16 {
			assert!(!stall.observe(0.92 + step * f32::from(n)), "stalled at poll {n}");
		}

		let mut frozen = StallTracker::for_entry(Duration::from_millis(50), secs(600.0));
		assert!(!frozen.observe(0.92));
		assert!(!frozen.observe(0.92));
		assert!(!frozen.observe(0.92));
		assert!(frozen.observe(0.92));
	}

	#[test]
	fn fixed_timing_triggers() {
		let detector = CompletionDetector::new(CutsceneConfig::default());
		assert!(detector.uses_fixed_timing(&EntryTiming::new(secs(1.0)).manual(true)));
		assert!(detector.uses_fixed_timing(&EntryTiming::new(secs(1.0)).looping(true)));
		assert!(!detector.uses_fixed_timing(&EntryTiming::new(secs(1.0))));

		let relaxed = CompletionDetector::new(CutsceneConfig::default().with_force_non_looping(false));
		assert!(!relaxed.uses_fixed_timing(&EntryTiming::new(secs(1.0)).looping(true)));

		let simple = CompletionDetector::new(CutsceneConfig::default().with_simple_timing(true));
		assert!(simple.uses_fixed_timing(&EntryTiming::new(secs(1.0))));
	}

	#[test]
	fn minimum_wait_scales_with_long_entries() {
		let detector = CompletionDetector::new(CutsceneConfig::default().with_minimum_animation(500));
		assert_eq!(detector.minimum_wait(secs(2.0)), Duration::from_millis(500));
		let scaled = detector.minimum_wait(secs(20.0));
		assert!(scaled.abs_diff(Duration::from_secs(1)) < Duration::from_millis(1), "got {scaled:?}");
	}

	#[test]
	fn garbage_progress_is_treated_as_zero() {
		assert_eq!(sanitize(f32::NAN), 0.0);
		assert_eq!(sanitize(-0.5), 0.0);
		assert_eq!(sanitize(0.7), 0.7);
	}
}
