use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use super::error::Result;
use super::{AssetRef, AuthoredAsset, Category, CutsceneCollection, CutsceneConfig, CutsceneEntry};

/// One authored entry, referring to an asset by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
	pub category: Category,
	#[serde(default)]
	pub asset: Option<String>,
	#[serde(default)]
	pub manual_duration: Option<f32>,
}

/// Authored description of a cutscene collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutsceneManifest {
	#[serde(default = "enabled_by_default")]
	pub enabled: bool,
	#[serde(default)]
	pub assets: Vec<AuthoredAsset>,
	#[serde(default)]
	pub entries: Vec<ManifestEntry>,
	#[serde(default)]
	pub config: Option<CutsceneConfig>,
}

fn enabled_by_default() -> bool {
	true
}

impl CutsceneManifest {
	pub fn from_json_str(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Build and analyze the collection.
	///
	/// Unknown asset names and invalid manual durations are authoring errors:
	/// they are logged and the entry is kept with a null asset or detected timing.
	pub fn into_collection(self) -> CutsceneCollection {
		let config = self.config.unwrap_or_default();
		let assets: HashMap<String, AssetRef> = self.assets.into_iter().map(|asset| (asset.name.clone(), AssetRef::new(asset))).collect();

		let mut collection = CutsceneCollection::new();
		collection.set_enabled(self.enabled);

		for (position, authored) in self.entries.into_iter().enumerate() {
			let asset = authored.asset.as_deref().and_then(|name| {
				let found = assets.get(name).cloned();
				if found.is_none() {
					warn!("Manifest entry {} refers to unknown asset '{}'", position, name);
				}
				found
			});

			let mut entry = CutsceneEntry::new(authored.category, asset);
			if let Some(secs) = authored.manual_duration {
				if let Err(e) = entry.set_manual_duration(secs) {
					warn!("Manifest entry {}: {}; using detected timing", position, e);
				}
			}
			collection.add(entry);
		}

		let report = collection.analyze_all(config.loop_flag_policy);
		info!("Loaded manifest: {} entries, {} analysis errors", report.analyzed, report.failed);
		collection
	}
}
