use std::time::Duration;

use anyhow::Result;
use log::info;

use adcscope::{
    interrupt_flag, run_live, AcquisitionConfig, AcquisitionSession, SerialSettings, SimSettings,
    SnapshotView,
};

// Fixed configuration; there is deliberately no CLI surface.
const PORT: &str = "/dev/ttyACM0";
const WINDOW: Duration = Duration::from_millis(400);
const SNAPSHOT: &str = "live.png";
const VERBOSE: bool = true;
// Swap in the simulated logger when no hardware is attached.
const SIMULATE: bool = false;

fn main() -> Result<()> {
    let filter = if VERBOSE { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = AcquisitionConfig {
        window: WINDOW,
        ..AcquisitionConfig::default()
    };
    let cancel = interrupt_flag()?;
    let mut view = SnapshotView::new(SNAPSHOT);
    info!("live view -> {SNAPSHOT}; interrupt to stop");

    if SIMULATE {
        let sim = SimSettings {
            geometry: config.geometry,
            noise_codes: 40.0,
            ..SimSettings::default()
        };
        let mut session = AcquisitionSession::new(sim, config);
        run_live(&mut session, &mut view, &cancel)
    } else {
        let mut session = AcquisitionSession::new(SerialSettings::new(PORT), config);
        run_live(&mut session, &mut view, &cancel)
    }
}
