use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Per-channel series produced by one acquisition cycle. Immutable once
/// constructed; a new cycle builds a new dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Time axis in milliseconds, rebased to zero.
    pub time_ms: Vec<f64>,
    /// Data channels in device order.
    pub channels: Vec<Vec<f64>>,
}

impl Dataset {
    pub fn samples(&self) -> usize {
        self.time_ms.len()
    }

    /// Spacing between the first two time samples, in seconds. `None` when
    /// the axis is too short to define one.
    pub fn sample_spacing_s(&self) -> Option<f64> {
        match self.time_ms[..] {
            [first, second, ..] => Some((second - first) / 1e3),
            _ => None,
        }
    }
}

/// What to do when the target file already exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionPolicy {
    Fail,
    Overwrite,
    /// Keep both: the new file gains a `-new` suffix.
    Rename,
}

/// Writes datasets as JSON blobs named `<base>-<unix seconds>.json`.
pub struct DatasetStore {
    directory: PathBuf,
    policy: CollisionPolicy,
}

impl DatasetStore {
    pub fn new(directory: impl Into<PathBuf>, policy: CollisionPolicy) -> Self {
        Self {
            directory: directory.into(),
            policy,
        }
    }

    pub fn save(&self, dataset: &Dataset, base: &str) -> Result<PathBuf> {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("system clock is before the unix epoch")?
            .as_secs();
        self.save_with_stamp(dataset, base, stamp)
    }

    fn save_with_stamp(&self, dataset: &Dataset, base: &str, stamp: u64) -> Result<PathBuf> {
        let mut path = self.directory.join(format!("{base}-{stamp}.json"));
        if path.exists() {
            match self.policy {
                CollisionPolicy::Fail => bail!("refusing to overwrite {}", path.display()),
                CollisionPolicy::Overwrite => debug!("overwriting {}", path.display()),
                CollisionPolicy::Rename => {
                    path = self.directory.join(format!("{base}-{stamp}-new.json"));
                    if path.exists() {
                        bail!("fallback name {} is also taken", path.display());
                    }
                }
            }
        }
        let blob = serde_json::to_vec(dataset).context("failed to serialize dataset")?;
        fs::write(&path, blob).with_context(|| format!("failed to write {}", path.display()))?;
        info!("dataset saved to {}", path.display());
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Dataset> {
        let blob =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_slice(&blob)
            .with_context(|| format!("{} is not a stored dataset", path.display()))
    }
}
