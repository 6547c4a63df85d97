use clap::{Parser, ValueEnum};
use cutscene_sequencer::core::{Category, CutsceneConfig};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ending {
	HappyEnd,
	BadEnd,
}

impl From<Ending> for Category {
	fn from(ending: Ending) -> Self {
		match ending {
			Ending::HappyEnd => Self::HappyEnd,
			Ending::BadEnd => Self::BadEnd,
		}
	}
}

#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
	/// Cutscene manifest (JSON)
	#[arg(long, env = "CUTSCENE_MANIFEST")]
	pub manifest: PathBuf,

	/// Ending sequence to play after the intro
	#[arg(long, env = "CUTSCENE_ENDING", value_enum, default_value = "happy-end")]
	pub ending: Ending,

	/// Press skip this many milliseconds into the ending
	#[arg(long, env = "CUTSCENE_SKIP_AFTER_MS")]
	pub skip_after_ms: Option<u64>,

	/// Wait exactly each entry's duration instead of watching progress
	#[arg(long, env = "CUTSCENE_SIMPLE_TIMING")]
	pub simple_timing: bool,

	#[arg(long, env = "CUTSCENE_TRANSITION_PAUSE_MS")]
	pub transition_pause_ms: Option<u64>,

	/// Upper bound on any single entry
	#[arg(long, env = "CUTSCENE_TIMEOUT_MS")]
	pub timeout_ms: Option<u64>,

	/// Use JSON formatting for tracing
	#[arg(long, env = "LOG_JSON", default_value = "false")]
	pub log_json: bool,

	/// Log level
	#[arg(long, env = "RUST_LOG")]
	pub rust_log: Option<String>,
}

impl Config {
	/// Command line settings win over the manifest's own config block
	pub fn sequencer_config(&self, base: CutsceneConfig) -> CutsceneConfig {
		let mut config = base;
		if self.simple_timing {
			config = config.with_simple_timing(true);
		}
		if let Some(ms) = self.transition_pause_ms {
			config = config.with_transition_pause(ms);
		}
		if let Some(ms) = self.timeout_ms {
			config = config.with_timeout(ms);
		}
		config
	}
}
