use cutscene_sequencer::core::{AssetRef, Category, CutsceneError, InstanceHandle, PresentationContainer, Result, SessionController};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug)]
struct Playing {
	asset: String,
	length: f32,
	looping: bool,
	started: Option<Instant>,
	halted_at: Option<f32>,
}

impl Playing {
	fn progress(&self) -> f32 {
		if let Some(frozen) = self.halted_at {
			return frozen;
		}
		let Some(started) = self.started else {
			return 0.0;
		};
		if self.length <= 0.0 {
			return 1.0;
		}

		let raw = started.elapsed().as_secs_f32() / self.length;
		if self.looping {
			raw.fract()
		} else {
			raw.min(1.0)
		}
	}
}

/// Stands in for a scene graph: clips "play" against the tokio clock
#[derive(Debug, Default)]
pub struct SimulatedContainer {
	next_id: AtomicU64,
	playing: Mutex<HashMap<u64, Playing>>,
}

impl SimulatedContainer {
	fn with_instance<T>(&self, handle: &InstanceHandle, f: impl FnOnce(&mut Playing) -> T) -> Option<T> {
		let mut playing = self.playing.lock().ok()?;
		playing.get_mut(&handle.id()).map(f)
	}

	pub fn live_instances(&self) -> usize {
		self.playing.lock().map(|p| p.len()).unwrap_or(0)
	}
}

impl PresentationContainer for SimulatedContainer {
	fn instantiate(&self, asset: &AssetRef) -> Result<InstanceHandle> {
		let clips = asset.clips()?;
		let length = clips.iter().map(|c| c.length).fold(0.0_f32, f32::max);
		let looping = clips.first().is_some_and(|c| c.looping);

		let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
		self
			.playing
			.lock()
			.map_err(|_| CutsceneError::Presentation("container state poisoned".into()))?
			.insert(
				id,
				Playing {
					asset: asset.name().to_string(),
					length,
					looping,
					started: None,
					halted_at: None,
				},
			);

		info!("▶ Instantiated '{}' as #{} ({:.2}s{})", asset.name(), id, length, if looping { ", looping" } else { "" });
		Ok(InstanceHandle::new(id))
	}

	fn release(&self, handle: InstanceHandle) {
		if let Ok(mut playing) = self.playing.lock() {
			if let Some(instance) = playing.remove(&handle.id()) {
				info!("⏹ Released '{}' (#{})", instance.asset, handle.id());
			}
		}
	}

	fn request_playback_start(&self, handle: &InstanceHandle, trigger: &str) -> Result<()> {
		self
			.with_instance(handle, |instance| {
				instance.started = Some(Instant::now());
				debug!("Trigger '{}' set on '{}'", trigger, instance.asset);
			})
			.ok_or_else(|| CutsceneError::Presentation(format!("unknown instance #{}", handle.id())))
	}

	fn normalized_progress(&self, handle: &InstanceHandle) -> f32 {
		self.with_instance(handle, |instance| instance.progress()).unwrap_or(0.0)
	}

	fn halt_progression(&self, handle: &InstanceHandle) {
		self.with_instance(handle, |instance| {
			let progress = instance.progress();
			instance.halted_at = Some(progress);
			debug!("Halted '{}' at {:.1}%", instance.asset, progress * 100.0);
		});
	}

	fn show_overlay(&self) {
		info!("Overlay shown");
	}

	fn hide_overlay(&self) {
		info!("Overlay hidden");
	}
}

/// Session controller that only reports the handoff
#[derive(Debug, Default)]
pub struct LoggingController;

impl SessionController for LoggingController {
	fn start_gameplay(&self) {
		info!("🎮 Gameplay started");
	}

	fn show_ending_screen(&self, category: Category) {
		info!("🏁 Showing {} screen", category);
	}
}
