// Shared fakes for the integration tests
#![allow(dead_code)]

use cutscene_sequencer::core::*;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
	ShowOverlay,
	HideOverlay,
	Instantiate { id: u64, asset: String },
	Start { id: u64, trigger: String },
	Halt { id: u64 },
	Release { id: u64 },
	StartGameplay,
	ShowEnding(Category),
}

/// Timestamped event log shared by the fake container and controller
#[derive(Debug, Clone)]
pub struct Recorder {
	origin: Instant,
	events: Arc<Mutex<Vec<(Duration, Event)>>>,
}

impl Recorder {
	pub fn new() -> Self {
		Self {
			origin: Instant::now(),
			events: Arc::new(Mutex::new(Vec::new())),
		}
	}

	pub fn record(&self, event: Event) {
		self.events.lock().unwrap().push((self.origin.elapsed(), event));
	}

	pub fn events(&self) -> Vec<Event> {
		self.events.lock().unwrap().iter().map(|(_, e)| e.clone()).collect()
	}

	pub fn timed(&self) -> Vec<(Duration, Event)> {
		self.events.lock().unwrap().clone()
	}

	pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
		self.events().iter().filter(|e| pred(e)).count()
	}

	pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
		self.events().iter().position(pred)
	}

	pub fn last_position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
		self.events().iter().rposition(pred)
	}

	pub fn time_of(&self, pred: impl Fn(&Event) -> bool) -> Option<Duration> {
		self.timed().into_iter().find(|(_, e)| pred(e)).map(|(t, _)| t)
	}

	pub fn instantiated(&self) -> usize {
		self.count(|e| matches!(e, Event::Instantiate { .. }))
	}

	pub fn released(&self) -> usize {
		self.count(|e| matches!(e, Event::Release { .. }))
	}

	pub fn gameplay_starts(&self) -> usize {
		self.count(|e| *e == Event::StartGameplay)
	}

	pub fn endings(&self, category: Category) -> usize {
		self.count(|e| *e == Event::ShowEnding(category))
	}
}

struct LiveInstance {
	length: f32,
	looping: bool,
	started_at: Option<Instant>,
	frozen: Option<f32>,
}

/// Presentation container that simulates clip playback on the tokio clock
pub struct FakeContainer {
	recorder: Recorder,
	next_id: AtomicU64,
	live: Mutex<HashMap<u64, LiveInstance>>,
	failing: HashSet<String>,
}

impl FakeContainer {
	pub fn new(recorder: Recorder) -> Self {
		Self {
			recorder,
			next_id: AtomicU64::new(1),
			live: Mutex::new(HashMap::new()),
			failing: HashSet::new(),
		}
	}

	/// Instantiation of `asset` will fail
	pub fn failing_on(mut self, asset: &str) -> Self {
		self.failing.insert(asset.to_string());
		self
	}

	pub fn live_instances(&self) -> usize {
		self.live.lock().unwrap().len()
	}
}

impl PresentationContainer for FakeContainer {
	fn instantiate(&self, asset: &AssetRef) -> Result<InstanceHandle> {
		if self.failing.contains(asset.name()) {
			return Err(CutsceneError::Presentation(format!("cannot instantiate {}", asset.name())));
		}

		let clips = asset.clips().unwrap_or_default();
		let length = clips.iter().map(|c| c.length).fold(0.0_f32, f32::max);
		let looping = clips.first().is_some_and(|c| c.looping);

		let id = self.next_id.fetch_add(1, Ordering::SeqCst);
		let mut live = self.live.lock().unwrap();
		assert!(live.is_empty(), "instance {id} created while another one is still live");
		live.insert(
			id,
			LiveInstance {
				length,
				looping,
				started_at: None,
				frozen: None,
			},
		);
		self.recorder.record(Event::Instantiate {
			id,
			asset: asset.name().to_string(),
		});
		Ok(InstanceHandle::new(id))
	}

	fn release(&self, handle: InstanceHandle) {
		self.live.lock().unwrap().remove(&handle.id());
		self.recorder.record(Event::Release { id: handle.id() });
	}

	fn request_playback_start(&self, handle: &InstanceHandle, trigger: &str) -> Result<()> {
		if let Some(instance) = self.live.lock().unwrap().get_mut(&handle.id()) {
			instance.started_at = Some(Instant::now());
		}
		self.recorder.record(Event::Start {
			id: handle.id(),
			trigger: trigger.to_string(),
		});
		Ok(())
	}

	fn normalized_progress(&self, handle: &InstanceHandle) -> f32 {
		let live = self.live.lock().unwrap();
		let Some(instance) = live.get(&handle.id()) else {
			return 0.0;
		};
		if let Some(frozen) = instance.frozen {
			return frozen;
		}
		let (Some(started), true) = (instance.started_at, instance.length > 0.0) else {
			return 0.0;
		};

		let raw = started.elapsed().as_secs_f32() / instance.length;
		if instance.looping {
			raw.fract()
		} else {
			raw.min(1.0)
		}
	}

	fn halt_progression(&self, handle: &InstanceHandle) {
		let progress = self.normalized_progress(handle);
		if let Some(instance) = self.live.lock().unwrap().get_mut(&handle.id()) {
			instance.frozen = Some(progress);
		}
		self.recorder.record(Event::Halt { id: handle.id() });
	}

	fn show_overlay(&self) {
		self.recorder.record(Event::ShowOverlay);
	}

	fn hide_overlay(&self) {
		self.recorder.record(Event::HideOverlay);
	}
}

pub struct RecordingController {
	recorder: Recorder,
}

impl RecordingController {
	pub fn new(recorder: Recorder) -> Self {
		Self { recorder }
	}
}

impl SessionController for RecordingController {
	fn start_gameplay(&self) {
		self.recorder.record(Event::StartGameplay);
	}

	fn show_ending_screen(&self, category: Category) {
		self.recorder.record(Event::ShowEnding(category));
	}
}

// ============================================================================
// Fixtures
// ============================================================================

/// `RUST_LOG=cutscene_sequencer=debug cargo test` shows engine logs
pub fn init_logging() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

pub fn clip_entry(category: Category, name: &str, length: f32) -> CutsceneEntry {
	CutsceneEntry::new(category, Some(AssetRef::new(AuthoredAsset::new(name, vec![ClipInfo::new(name, length)]))))
}

pub fn looping_entry(category: Category, name: &str, length: f32) -> CutsceneEntry {
	CutsceneEntry::new(category, Some(AssetRef::new(AuthoredAsset::new(name, vec![ClipInfo::new(name, length).looping(true)]))))
}

pub struct Harness {
	pub recorder: Recorder,
	pub container: Arc<FakeContainer>,
	pub director: CutsceneDirector,
}

impl Harness {
	pub fn new(entries: Vec<CutsceneEntry>, config: CutsceneConfig) -> Self {
		let recorder = Recorder::new();
		Self::with_container(entries, config, FakeContainer::new(recorder.clone()), recorder)
	}

	pub fn with_container(entries: Vec<CutsceneEntry>, config: CutsceneConfig, container: FakeContainer, recorder: Recorder) -> Self {
		init_logging();
		let container = Arc::new(container);
		let controller = Arc::new(RecordingController::new(recorder.clone()));
		let director = CutsceneDirector::new(CutsceneCollection::from_entries(entries), config, container.clone(), controller).unwrap();
		Self { recorder, container, director }
	}
}

pub fn secs(d: Duration) -> f64 {
	d.as_secs_f64()
}
