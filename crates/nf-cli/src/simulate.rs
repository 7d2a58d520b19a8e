//! Synthetic band-power generator for demos and pipeline testing.
//!
//! Each profile draws every band uniformly around a characteristic mean,
//! stamping samples at a fixed device rate.

use clap::ValueEnum;
use nf_core::Sample;
use nf_core::time::unix_millis_to_iso8601;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Sample spacing for a 256 Hz device, rounded to whole milliseconds.
const SAMPLE_INTERVAL_MS: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Beta-dominant: high attention.
    Focused,
    /// Alpha-dominant: high meditation, low attention.
    Relaxed,
    /// Theta-dominant: low attention and meditation.
    Drowsy,
    /// Muscle and blink contamination: artifacts fire.
    Noisy,
}

/// (mean, half-width) per band, in alpha, beta, theta, delta, gamma order.
type BandShape = [(f64, f64); 5];

impl Profile {
    fn shape(self) -> BandShape {
        match self {
            Profile::Focused => [(8.0, 3.0), (25.0, 3.0), (5.0, 2.0), (10.0, 3.0), (6.0, 2.0)],
            Profile::Relaxed => [(25.0, 3.0), (8.0, 2.0), (8.0, 2.0), (10.0, 3.0), (5.0, 2.0)],
            Profile::Drowsy => [(6.0, 2.0), (4.0, 1.0), (20.0, 3.0), (15.0, 3.0), (3.0, 1.0)],
            Profile::Noisy => [(30.0, 45.0), (15.0, 10.0), (10.0, 5.0), (20.0, 10.0), (65.0, 15.0)],
        }
    }
}

pub struct Simulator {
    rng: SmallRng,
    shape: BandShape,
    next_millis: u64,
}

impl Simulator {
    /// A fixed `seed` makes the stream reproducible.
    pub fn new(profile: Profile, seed: Option<u64>, start_millis: u64) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            rng,
            shape: profile.shape(),
            next_millis: start_millis,
        }
    }

    pub fn next_sample(&mut self) -> Sample {
        let mut bands = [0.0f64; 5];
        for (value, (mean, spread)) in bands.iter_mut().zip(self.shape) {
            // Band power is never negative.
            *value = (mean + self.rng.random_range(-spread..=spread)).max(0.0);
        }
        let timestamp = unix_millis_to_iso8601(self.next_millis);
        self.next_millis += SAMPLE_INTERVAL_MS;

        let [alpha, beta, theta, delta, gamma] = bands;
        Sample::new(timestamp, alpha, beta, theta, delta, gamma)
    }
}

impl Iterator for Simulator {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        Some(self.next_sample())
    }
}
