use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::error::{CutsceneError, Result};
use super::resolver::{self, ClipAnalysis};
use super::LoopFlagPolicy;

/// Grouping of entries that play together as one logical sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	Intro,
	HappyEnd,
	BadEnd,
}

impl Category {
	pub const ALL: [Self; 3] = [Self::Intro, Self::HappyEnd, Self::BadEnd];
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Intro => "Intro",
			Self::HappyEnd => "HappyEnd",
			Self::BadEnd => "BadEnd",
		};
		f.write_str(name)
	}
}

/// One authored animation clip as reported by the asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
	pub name: String,
	/// Length in seconds
	pub length: f32,
	#[serde(default)]
	pub looping: bool,
}

impl ClipInfo {
	pub fn new(name: impl Into<String>, length: f32) -> Self {
		Self {
			name: name.into(),
			length,
			looping: false,
		}
	}

	pub fn looping(mut self, looping: bool) -> Self {
		self.looping = looping;
		self
	}
}

/// Playable content owned outside the engine.
///
/// The engine never decodes or renders it; it only asks for the authored
/// clip metadata when resolving durations and hands the reference to the
/// presentation container.
pub trait VisualAsset: Send + Sync {
	fn name(&self) -> &str;

	/// Authored clips. An empty list means the asset carries no animation data.
	fn clips(&self) -> Result<Vec<ClipInfo>>;
}

/// Shared, non-owning reference to a [`VisualAsset`]
#[derive(Clone)]
pub struct AssetRef(Arc<dyn VisualAsset>);

impl AssetRef {
	pub fn new(asset: impl VisualAsset + 'static) -> Self {
		Self(Arc::new(asset))
	}

	pub fn from_arc(asset: Arc<dyn VisualAsset>) -> Self {
		Self(asset)
	}

	pub fn name(&self) -> &str {
		self.0.name()
	}

	pub fn clips(&self) -> Result<Vec<ClipInfo>> {
		self.0.clips()
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for AssetRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("AssetRef").field(&self.name()).finish()
	}
}

/// In-process asset described entirely by authored data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoredAsset {
	pub name: String,
	#[serde(default)]
	pub clips: Vec<ClipInfo>,
	/// Simulates an asset that is present but unreadable
	#[serde(default)]
	pub inspect_error: Option<String>,
}

impl AuthoredAsset {
	pub fn new(name: impl Into<String>, clips: Vec<ClipInfo>) -> Self {
		Self {
			name: name.into(),
			clips,
			inspect_error: None,
		}
	}

	pub fn unreadable(name: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			clips: Vec::new(),
			inspect_error: Some(reason.into()),
		}
	}
}

impl VisualAsset for AuthoredAsset {
	fn name(&self) -> &str {
		&self.name
	}

	fn clips(&self) -> Result<Vec<ClipInfo>> {
		match &self.inspect_error {
			Some(reason) => Err(CutsceneError::Asset(format!("{}: {}", self.name, reason))),
			None => Ok(self.clips.clone()),
		}
	}
}

/// One playable cutscene item
#[derive(Debug, Clone)]
pub struct CutsceneEntry {
	category: Category,
	asset: Option<AssetRef>,

	// Manual timing
	use_manual_duration: bool,
	manual_duration: f32,

	// Auto-detection results
	detected_duration: f32,
	is_looping: bool,
	clip_count: usize,
	has_valid_clip: bool,
	is_analyzed: bool,
	last_error: Option<String>,
}

impl CutsceneEntry {
	pub fn new(category: Category, asset: Option<AssetRef>) -> Self {
		Self {
			category,
			asset,
			use_manual_duration: false,
			manual_duration: 0.0,
			detected_duration: 0.0,
			is_looping: false,
			clip_count: 0,
			has_valid_clip: false,
			is_analyzed: false,
			last_error: None,
		}
	}

	pub fn with_manual_duration(mut self, secs: f32) -> Result<Self> {
		self.set_manual_duration(secs)?;
		Ok(self)
	}

	pub fn category(&self) -> Category {
		self.category
	}

	pub fn asset(&self) -> Option<&AssetRef> {
		self.asset.as_ref()
	}

	/// Name used in logs
	pub fn label(&self) -> &str {
		self.asset.as_ref().map_or("<missing asset>", AssetRef::name)
	}

	pub fn uses_manual_duration(&self) -> bool {
		self.use_manual_duration
	}

	pub fn manual_duration(&self) -> f32 {
		self.manual_duration
	}

	/// Make `secs` the authoritative duration, overriding any detection result
	pub fn set_manual_duration(&mut self, secs: f32) -> Result<()> {
		if !secs.is_finite() || secs <= 0.0 {
			return Err(CutsceneError::InvalidDuration(secs));
		}
		self.manual_duration = secs;
		self.use_manual_duration = true;
		Ok(())
	}

	/// Hand authority back to the detection result
	pub fn clear_manual_duration(&mut self) {
		self.use_manual_duration = false;
	}

	pub fn detected_duration(&self) -> f32 {
		self.detected_duration
	}

	pub fn is_looping(&self) -> bool {
		self.is_looping
	}

	pub fn clip_count(&self) -> usize {
		self.clip_count
	}

	pub fn has_valid_clip(&self) -> bool {
		self.has_valid_clip
	}

	pub fn is_analyzed(&self) -> bool {
		self.is_analyzed
	}

	pub fn last_error(&self) -> Option<&str> {
		self.last_error.as_deref()
	}

	/// Seconds the sequencer should budget for this entry; `0.0` when unknown
	pub fn effective_duration(&self) -> f32 {
		let secs = if self.use_manual_duration {
			self.manual_duration
		} else if self.is_analyzed && self.has_valid_clip {
			self.detected_duration
		} else {
			0.0
		};
		secs.max(0.0)
	}

	/// Re-run clip analysis, overwriting any previous result
	pub fn analyze(&mut self, policy: LoopFlagPolicy) -> &Self {
		let analysis = resolver::resolve(self.asset.as_ref(), policy);
		self.apply_analysis(analysis);
		self
	}

	fn apply_analysis(&mut self, analysis: ClipAnalysis) {
		self.detected_duration = analysis.duration;
		self.is_looping = analysis.looping;
		self.clip_count = analysis.clip_count;
		self.has_valid_clip = analysis.has_valid_clip;
		self.last_error = analysis.error;
		self.is_analyzed = true;
	}
}
