//! Headless Demo: Runs the sample pet and logs what it would display.
//!
//! Optionally takes a path to a JSON pet config; otherwise uses the
//! built-in sample. Set `RUST_LOG=petwheel=debug` to see transitions.

use petwheel::{sample_config, EngineConfig, EngineSnapshot, PetConfig, PetEngine, PetState};
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "petwheel=info,headless=info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PetConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => sample_config(),
    };

    let engine = PetEngine::spawn(config, &EngineConfig::default())?;
    info!(states = ?engine.state_names(), "engine ready");

    // Log only when the displayed frame changes
    let last_frame = Arc::new(AtomicU64::new(u64::MAX));
    let seen = Arc::clone(&last_frame);
    let subscription = engine.subscribe(move |snapshot: &EngineSnapshot| {
        let key = (snapshot.state as u64) << 32 | snapshot.frame_index as u64;
        if seen.swap(key, Ordering::Relaxed) != key {
            info!(
                state = %snapshot.state,
                frame = snapshot.frame_index,
                texture = %snapshot.frame.texture_path,
                loops = snapshot.loop_count,
                "display"
            );
        }
    })?;

    engine.start()?;
    std::thread::sleep(Duration::from_secs(2));

    if engine.state_names().contains(&PetState::Chasing) {
        engine.set_state(PetState::Chasing)?;
        std::thread::sleep(Duration::from_secs(3));
    }

    subscription.dispose();
    engine.stop()?;
    let snapshot = engine.snapshot()?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
