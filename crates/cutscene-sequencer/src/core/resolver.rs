use tracing::{debug, warn};

use super::{AssetRef, ClipInfo, LoopFlagPolicy};

pub(crate) const NO_ASSET: &str = "no visual asset assigned";
pub(crate) const NO_ANIMATION_DATA: &str = "no animation data";
pub(crate) const ZERO_LENGTH: &str = "animation clips have zero length";

/// Outcome of inspecting one asset's authored clips
#[derive(Debug, Clone, PartialEq)]
pub struct ClipAnalysis {
	/// Seconds
	pub duration: f32,
	pub looping: bool,
	pub clip_count: usize,
	pub has_valid_clip: bool,
	pub error: Option<String>,
}

impl ClipAnalysis {
	fn failed(clip_count: usize, error: impl Into<String>) -> Self {
		Self {
			duration: 0.0,
			looping: false,
			clip_count,
			has_valid_clip: false,
			error: Some(error.into()),
		}
	}
}

/// Derive duration and loop flag from an asset's clips.
///
/// Multiple clips resolve to the longest length so no visual content is cut
/// off. Failures never propagate; they come back as `error`.
pub fn resolve(asset: Option<&AssetRef>, policy: LoopFlagPolicy) -> ClipAnalysis {
	let Some(asset) = asset else {
		return ClipAnalysis::failed(0, NO_ASSET);
	};

	let clips = match asset.clips() {
		Ok(clips) => clips,
		Err(e) => {
			warn!("Could not inspect '{}': {}", asset.name(), e);
			return ClipAnalysis::failed(0, e.to_string());
		}
	};

	let analysis = from_clips(&clips, policy);
	match &analysis.error {
		Some(err) => warn!("Analysis of '{}' failed: {}", asset.name(), err),
		None => debug!(
			"Analyzed '{}': {:.3}s, looping={}, clips={}",
			asset.name(),
			analysis.duration,
			analysis.looping,
			analysis.clip_count
		),
	}
	analysis
}

fn from_clips(clips: &[ClipInfo], policy: LoopFlagPolicy) -> ClipAnalysis {
	let Some(first) = clips.first() else {
		return ClipAnalysis::failed(0, NO_ANIMATION_DATA);
	};

	// First clip wins ties so a single-clip asset and a uniform multi-clip asset agree
	let longest = clips.iter().fold(first, |best, clip| if sanitize(clip.length) > sanitize(best.length) { clip } else { best });
	let duration = sanitize(longest.length);

	if duration <= 0.0 {
		return ClipAnalysis::failed(clips.len(), ZERO_LENGTH);
	}

	let looping = match policy {
		LoopFlagPolicy::FirstClip => first.looping,
		LoopFlagPolicy::LongestClip => longest.looping,
	};

	ClipAnalysis {
		duration,
		looping,
		clip_count: clips.len(),
		has_valid_clip: true,
		error: None,
	}
}

fn sanitize(length: f32) -> f32 {
	if length.is_finite() {
		length.max(0.0)
	} else {
		0.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::AuthoredAsset;

	fn asset(clips: Vec<ClipInfo>) -> AssetRef {
		AssetRef::new(AuthoredAsset::new("test", clips))
	}

	#[test]
	fn missing_asset_is_reported() {
		let analysis = resolve(None, LoopFlagPolicy::FirstClip);
		assert!(!analysis.has_valid_clip);
		assert_eq!(analysis.error.as_deref(), Some(NO_ASSET));
	}

	#[test]
	fn asset_without_clips_has_no_animation_data() {
		let analysis = resolve(Some(&asset(vec![])), LoopFlagPolicy::FirstClip);
		assert!(!analysis.has_valid_clip);
		assert_eq!(analysis.clip_count, 0);
		assert_eq!(analysis.error.as_deref(), Some(NO_ANIMATION_DATA));
	}

	#[test]
	fn single_clip_uses_its_length_and_loop_flag() {
		let analysis = resolve(Some(&asset(vec![ClipInfo::new("a", 2.5).looping(true)])), LoopFlagPolicy::FirstClip);
		assert_eq!(analysis.duration, 2.5);
		assert!(analysis.looping);
		assert_eq!(analysis.clip_count, 1);
		assert!(analysis.has_valid_clip);
		assert!(analysis.error.is_none());
	}

	#[test]
	fn multiple_clips_use_longest_length_and_first_loop_flag() {
		let clips = vec![ClipInfo::new("a", 1.0).looping(true), ClipInfo::new("b", 4.0), ClipInfo::new("c", 3.0)];
		let analysis = resolve(Some(&asset(clips)), LoopFlagPolicy::FirstClip);
		assert_eq!(analysis.duration, 4.0);
		assert!(analysis.looping, "loop flag comes from the first clip");
		assert_eq!(analysis.clip_count, 3);
	}

	#[test]
	fn longest_clip_policy_takes_loop_flag_from_same_clip() {
		let clips = vec![ClipInfo::new("a", 1.0).looping(true), ClipInfo::new("b", 4.0)];
		let analysis = resolve(Some(&asset(clips)), LoopFlagPolicy::LongestClip);
		assert_eq!(analysis.duration, 4.0);
		assert!(!analysis.looping);
	}

	#[test]
	fn unreadable_asset_surfaces_error() {
		let unreadable = AssetRef::new(AuthoredAsset::unreadable("broken", "corrupt header"));
		let analysis = resolve(Some(&unreadable), LoopFlagPolicy::FirstClip);
		assert!(!analysis.has_valid_clip);
		assert!(analysis.error.unwrap().contains("corrupt header"));
	}

	#[test]
	fn zero_and_garbage_lengths_are_not_valid() {
		let clips = vec![ClipInfo::new("a", 0.0), ClipInfo::new("b", f32::NAN), ClipInfo::new("c", -2.0)];
		let analysis = resolve(Some(&asset(clips)), LoopFlagPolicy::FirstClip);
		assert!(!analysis.has_valid_clip);
		assert_eq!(analysis.clip_count, 3);
		assert_eq!(analysis.error.as_deref(), Some(ZERO_LENGTH));
	}
}
