mod config;
mod simulation;

use anyhow::{Context, Result};
use clap::Parser;
use cutscene_sequencer::core::{Category, CutsceneDirector, CutsceneManifest};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt::format::JsonFields, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::Config;
use crate::simulation::{LoggingController, SimulatedContainer};

fn init_tracing(config: &Config) -> Result<()> {
	let filter = EnvFilter::try_new(config.rust_log.as_deref().unwrap_or("cutscene_player=info,cutscene_sequencer=info")).context("invalid RUST_LOG filter")?;

	tracing_subscriber::registry()
		.with(if config.log_json {
			Box::new(
				tracing_subscriber::fmt::layer()
					.fmt_fields(JsonFields::default())
					.event_format(tracing_subscriber::fmt::format().json().flatten_event(true).with_span_list(false))
					.with_filter(filter),
			) as Box<dyn Layer<_> + Send + Sync>
		} else {
			Box::new(tracing_subscriber::fmt::layer().with_filter(filter))
		})
		.init();
	Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
	dotenv::dotenv().ok();
	let config = Config::parse();
	init_tracing(&config)?;

	let raw = std::fs::read_to_string(&config.manifest).with_context(|| format!("reading manifest {}", config.manifest.display()))?;
	let manifest = CutsceneManifest::from_json_str(&raw)?;
	let sequencer_config = config.sequencer_config(manifest.config.clone().unwrap_or_default());
	let collection = manifest.into_collection();

	for (index, entry) in collection.entries().iter().enumerate() {
		info!(
			"#{} {} '{}': {:.2}s{}{}",
			index,
			entry.category(),
			entry.label(),
			entry.effective_duration(),
			if entry.uses_manual_duration() { " (manual)" } else { "" },
			entry.last_error().map(|e| format!(" [{e}]")).unwrap_or_default()
		);
	}
	info!("Total cutscene time: {:.2}s", collection.total_duration());

	let director = CutsceneDirector::new(collection, sequencer_config, Arc::new(SimulatedContainer::default()), Arc::new(LoggingController))?;

	let intro = director.play(Category::Intro).await?;
	info!("Intro finished: {:?}", intro.finished().await?);

	let ending = director.play(config.ending.into()).await?;
	if let Some(ms) = config.skip_after_ms {
		tokio::time::sleep(Duration::from_millis(ms)).await;
		info!("⏭ Skip pressed");
		director.skip()?;
	}
	info!("{} finished: {:?}", ending.category(), ending.finished().await?);

	director.shutdown().await;
	Ok(())
}
