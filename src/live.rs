use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::dataset::Dataset;
use crate::session::AcquisitionSession;
use crate::stream::PowerSpectrum;
use crate::transport::Connect;

/// Voltage-scaled view of the first data channel, ready to draw.
#[derive(Clone, Debug)]
pub struct TimeTrace {
    pub time_ms: Vec<f64>,
    pub volts: Vec<f64>,
}

impl TimeTrace {
    fn from_dataset(dataset: &Dataset, volts_per_code: f64) -> Result<Self> {
        let codes = dataset
            .channels
            .first()
            .context("dataset has no data channel to display")?;
        Ok(Self {
            time_ms: dataset.time_ms.clone(),
            volts: codes.iter().map(|code| code * volts_per_code).collect(),
        })
    }
}

/// Display boundary: the loop pushes a fresh pair of traces every cycle.
pub trait TraceView {
    fn show(&mut self, trace: &TimeTrace, spectrum: &PowerSpectrum) -> Result<()>;
}

/// Cooperative cancellation flag, checked only between cycles.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Wire a fresh flag to the process interrupt signal.
pub fn interrupt_flag() -> Result<CancelFlag> {
    let flag = CancelFlag::new();
    let handler = flag.clone();
    ctrlc::set_handler(move || handler.cancel())
        .context("failed to install interrupt handler")?;
    Ok(flag)
}

/// Repeat acquisition cycles until cancelled: acquire, scale the data
/// channel to volts, derive the power spectrum of the mean-centered trace,
/// refresh the view.
///
/// Acquisition and decode failures propagate; there is no auto-retry. A
/// cycle already in flight when the flag is raised still completes, and
/// cancellation is the loop's normal exit.
pub fn run_live<C: Connect, V: TraceView>(
    session: &mut AcquisitionSession<C>,
    view: &mut V,
    cancel: &CancelFlag,
) -> Result<()> {
    let mut cycles = 0u64;
    while !cancel.is_cancelled() {
        let started = Instant::now();
        let dataset = session.acquire()?;
        let trace = TimeTrace::from_dataset(&dataset, session.config().volts_per_code)?;
        let spectrum =
            PowerSpectrum::compute(&trace.volts, dataset.sample_spacing_s().unwrap_or(0.0));
        view.show(&trace, &spectrum)?;
        cycles += 1;
        debug!("cycle {cycles} refreshed in {:?}", started.elapsed());
    }
    info!("interrupted after {cycles} cycle(s)");
    Ok(())
}
