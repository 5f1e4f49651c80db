use std::collections::VecDeque;
use std::time::Duration;

use anyhow::Result;
use rand::Rng;

use crate::stream::FrameGeometry;
use crate::transport::{Connect, Link};

/// In-process stand-in for the data logger: acknowledges the trigger byte,
/// then emits one frame-structured payload. Useful for tests and for
/// exercising the full loop without hardware.
#[derive(Clone, Debug)]
pub struct SimSettings {
    pub geometry: FrameGeometry,
    /// Frames emitted per acquisition window.
    pub frames: usize,
    pub tone_hz: f64,
    pub sample_interval_us: f64,
    /// Peak noise in ADC codes; zero keeps the stream deterministic.
    pub noise_codes: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            geometry: FrameGeometry::default(),
            frames: 1,
            tone_hz: 440.0,
            // 20 kS/s per channel
            sample_interval_us: 50.0,
            noise_codes: 0.0,
        }
    }
}

impl SimSettings {
    /// Frame-interleaved payload, every sample trailed by the separator,
    /// exactly as the device prints it.
    fn payload(&self) -> String {
        let mut rng = rand::thread_rng();
        let length = self.geometry.frame_length();
        let mut payload = String::new();
        for frame in 0..self.frames {
            for slot in 0..length {
                let index = (frame * length + slot) as f64;
                let t_us = index * self.sample_interval_us;
                payload.push_str(&format!("{t_us:.0},"));
            }
            for _channel in 1..self.geometry.channel_count() {
                for slot in 0..length {
                    let index = (frame * length + slot) as f64;
                    let t_s = index * self.sample_interval_us / 1e6;
                    let phase = 2.0 * std::f64::consts::PI * self.tone_hz * t_s;
                    let mut code = 2048.0 + 1200.0 * phase.sin();
                    if self.noise_codes > 0.0 {
                        code += rng.gen_range(-self.noise_codes..=self.noise_codes);
                    }
                    let code = code.round().clamp(0.0, 4095.0);
                    payload.push_str(&format!("{code:.0},"));
                }
            }
        }
        payload
    }
}

impl Connect for SimSettings {
    type Link = SimLink;

    fn connect(&self, _read_timeout: Duration) -> Result<SimLink> {
        Ok(SimLink {
            triggered: false,
            pending: VecDeque::from(["ack".to_owned(), self.payload()]),
        })
    }
}

/// Stays silent until triggered, like the real device.
pub struct SimLink {
    triggered: bool,
    pending: VecDeque<String>,
}

impl Link for SimLink {
    fn send(&mut self, bytes: &[u8]) -> Result<usize> {
        self.triggered = true;
        Ok(bytes.len())
    }

    fn read_line(&mut self) -> Result<String> {
        if !self.triggered {
            return Ok(String::new());
        }
        Ok(self.pending.pop_front().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AcquisitionConfig, AcquisitionSession};

    fn settings() -> SimSettings {
        SimSettings {
            geometry: FrameGeometry::new(2, 100).unwrap(),
            frames: 2,
            ..SimSettings::default()
        }
    }

    #[test]
    fn silent_until_triggered() {
        let mut link = settings().connect(Duration::from_secs(1)).unwrap();
        assert_eq!(link.read_line().unwrap(), "");
        link.send(b"A").unwrap();
        assert_eq!(link.read_line().unwrap(), "ack");
    }

    #[test]
    fn end_to_end_acquisition_from_the_simulated_device() {
        let sim = settings();
        let config = AcquisitionConfig {
            geometry: sim.geometry,
            ..AcquisitionConfig::default()
        };
        let mut session = AcquisitionSession::new(sim, config);
        let dataset = session.acquire().unwrap();

        assert_eq!(dataset.samples(), 200);
        assert_eq!(dataset.channels.len(), 1);
        assert_eq!(dataset.time_ms[0], 0.0);
        assert!(dataset
            .time_ms
            .windows(2)
            .all(|pair| pair[1] > pair[0]));
        assert!(dataset.channels[0]
            .iter()
            .all(|&code| (0.0..=4095.0).contains(&code)));
    }
}
