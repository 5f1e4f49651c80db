use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use log::{debug, warn};

use crate::dataset::Dataset;
use crate::stream::{normalize, FrameDecoder, FrameGeometry, MICROS_PER_MILLI};
use crate::transport::{Connect, Link};

/// Single byte that triggers a sampling window on the device; the logger
/// waits for any one ASCII character.
pub const HANDSHAKE_TRIGGER: &[u8] = b"A";

/// How to treat an unanswered handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandshakePolicy {
    /// Proceed to the payload read anyway, with a warning.
    BestEffort,
    /// Abort the cycle before the payload read.
    Required,
}

#[derive(Clone, Debug)]
pub struct HandshakeReport {
    pub echo: String,
    pub elapsed: Duration,
}

impl HandshakeReport {
    /// An empty echo means the read timed out before the device answered.
    pub fn confirmed(&self) -> bool {
        !self.echo.is_empty()
    }
}

/// Send the trigger byte and wait for the device's acknowledge line,
/// measuring round-trip latency. A timed-out read is reported as an
/// unconfirmed handshake, not raised.
pub fn synchronize<L: Link>(link: &mut L) -> Result<HandshakeReport> {
    let started = Instant::now();
    let written = link.send(HANDSHAKE_TRIGGER)?;
    debug!("handshake: sent {written} trigger byte(s)");
    let echo = link.read_line()?;
    let elapsed = started.elapsed();
    debug!("handshake: echo {echo:?} after {elapsed:?}");
    Ok(HandshakeReport { echo, elapsed })
}

#[derive(Clone, Debug)]
pub struct AcquisitionConfig {
    pub geometry: FrameGeometry,
    /// Transport read timeout; must upper-bound how long the device keeps
    /// sending within one window, plus slack.
    pub window: Duration,
    pub handshake: HandshakePolicy,
    /// Raw device time units per millisecond.
    pub time_unit_divisor: f64,
    /// Volts per raw ADC code.
    pub volts_per_code: f64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            geometry: FrameGeometry::default(),
            window: Duration::from_secs(1),
            handshake: HandshakePolicy::BestEffort,
            time_unit_divisor: MICROS_PER_MILLI,
            // 3.3 V full scale over the 12-bit range.
            volts_per_code: 3.3 / 4095.0,
        }
    }
}

/// Owns the transport settings for repeated acquire-decode-normalize
/// cycles, plus the most recently produced dataset.
pub struct AcquisitionSession<C: Connect> {
    connector: C,
    config: AcquisitionConfig,
    decoder: FrameDecoder,
    last: Option<Dataset>,
}

impl<C: Connect> AcquisitionSession<C> {
    pub fn new(connector: C, config: AcquisitionConfig) -> Self {
        let decoder = FrameDecoder::new(config.geometry);
        Self {
            connector,
            config,
            decoder,
            last: None,
        }
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Dataset from the most recent successful cycle; a failed cycle
    /// leaves it untouched.
    pub fn last(&self) -> Option<&Dataset> {
        self.last.as_ref()
    }

    /// One full cycle: connect, synchronize, read the payload, decode,
    /// normalize the time axis. The transport lives exactly as long as
    /// the cycle.
    pub fn acquire(&mut self) -> Result<Dataset> {
        let started = Instant::now();
        let mut link = self
            .connector
            .connect(self.config.window)
            .context("transport unavailable")?;

        let report = synchronize(&mut link)?;
        if !report.confirmed() {
            match self.config.handshake {
                HandshakePolicy::BestEffort => {
                    warn!(
                        "handshake unanswered after {:?}, proceeding",
                        report.elapsed
                    );
                }
                HandshakePolicy::Required => {
                    bail!("handshake unanswered after {:?}", report.elapsed);
                }
            }
        }

        let payload = link.read_line()?;
        drop(link);
        debug!(
            "payload of {} bytes read in {:?}",
            payload.len(),
            started.elapsed()
        );

        let mut series = self.decoder.decode(&payload)?.into_iter();
        let raw_time = series.next().context("decoder produced no channels")?;
        let time_ms = normalize(&raw_time, self.config.time_unit_divisor)?;
        let dataset = Dataset {
            time_ms,
            channels: series.collect(),
        };
        debug!(
            "decoded {} data channel(s) x {} samples",
            dataset.channels.len(),
            dataset.samples()
        );
        self.last = Some(dataset.clone());
        Ok(dataset)
    }
}
