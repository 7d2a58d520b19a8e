//! Signal-quality heuristics over a band-power window.
//!
//! Four independent checks run against the same window:
//! - movement: mean gamma power is high (muscle activity)
//! - blink: alpha varies strongly across the window
//! - electrode: total band power is near zero (poor contact)
//! - noise: variance across every band combined is high

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{BLINK_ALPHA_STD, ELECTRODE_TOTAL_POWER, MOVEMENT_GAMMA_MEAN, NOISE_STD};
use crate::error::ComputeResult;
use crate::sample::BandSeries;
use crate::stats::{mean, std_dev, std_dev_chained};

/// Kind of signal artifact. Variant order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Artifact {
    Movement,
    Blink,
    Electrode,
    Noise,
}

impl Artifact {
    pub const ALL: [Artifact; 4] = [
        Artifact::Movement,
        Artifact::Blink,
        Artifact::Electrode,
        Artifact::Noise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Artifact::Movement => "movement",
            Artifact::Blink => "blink",
            Artifact::Electrode => "electrode",
            Artifact::Noise => "noise",
        }
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicated artifact labels, always kept in reporting order.
/// Serializes as a plain list of labels; deserializing re-sorts and dedups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Artifact>", into = "Vec<Artifact>")]
pub struct ArtifactSet(Vec<Artifact>);

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the label was already present.
    pub fn insert(&mut self, artifact: Artifact) -> bool {
        match self.0.binary_search(&artifact) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, artifact);
                true
            }
        }
    }

    pub fn contains(&self, artifact: Artifact) -> bool {
        self.0.binary_search(&artifact).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Artifact> + '_ {
        self.0.iter().copied()
    }

    /// Labels joined with ", ", e.g. `movement, noise`.
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(Artifact::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<Artifact> for ArtifactSet {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        let mut set = ArtifactSet::new();
        for a in iter {
            set.insert(a);
        }
        set
    }
}

impl From<Vec<Artifact>> for ArtifactSet {
    fn from(labels: Vec<Artifact>) -> Self {
        labels.into_iter().collect()
    }
}

impl From<ArtifactSet> for Vec<Artifact> {
    fn from(set: ArtifactSet) -> Self {
        set.0
    }
}

pub fn detect_artifacts(series: &BandSeries) -> ComputeResult<ArtifactSet> {
    let mut found = ArtifactSet::new();

    if mean(&series.gamma)? > MOVEMENT_GAMMA_MEAN {
        found.insert(Artifact::Movement);
    }

    if std_dev(&series.alpha)? > BLINK_ALPHA_STD {
        found.insert(Artifact::Blink);
    }

    let total_power = mean(&series.alpha)?
        + mean(&series.beta)?
        + mean(&series.theta)?
        + mean(&series.delta)?
        + mean(&series.gamma)?;
    if total_power < ELECTRODE_TOTAL_POWER {
        found.insert(Artifact::Electrode);
    }

    let all_bands: [&[f64]; 5] = [
        &series.alpha,
        &series.beta,
        &series.theta,
        &series.delta,
        &series.gamma,
    ];
    if std_dev_chained(&all_bands)? > NOISE_STD {
        found.insert(Artifact::Noise);
    }

    Ok(found)
}
