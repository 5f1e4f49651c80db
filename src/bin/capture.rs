//! One-shot capture: acquire a single window and save it with a timestamp.
use std::time::Duration;

use anyhow::Result;
use log::info;

use adcscope::{
    AcquisitionConfig, AcquisitionSession, CollisionPolicy, DatasetStore, SerialSettings,
};

const PORT: &str = "/dev/ttyACM0";
const WINDOW: Duration = Duration::from_secs(6);
const BASE_NAME: &str = "capture";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AcquisitionConfig {
        window: WINDOW,
        ..AcquisitionConfig::default()
    };
    let mut session = AcquisitionSession::new(SerialSettings::new(PORT), config);
    let dataset = session.acquire()?;
    info!(
        "acquired {} samples across {} data channel(s)",
        dataset.samples(),
        dataset.channels.len()
    );

    let store = DatasetStore::new(".", CollisionPolicy::Rename);
    let path = store.save(&dataset, BASE_NAME)?;
    info!("saved to {}", path.display());
    Ok(())
}
