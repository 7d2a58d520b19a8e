//! Band-power samples and the bounded sliding buffer that holds them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::constants::FIXED_CAPACITY;
use crate::error::SampleError;

/// One validated band-power reading. Immutable once buffered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: String,
    pub alpha: f64,
    pub beta: f64,
    pub theta: f64,
    pub delta: f64,
    pub gamma: f64,
}

impl Sample {
    pub fn new(
        timestamp: impl Into<String>,
        alpha: f64,
        beta: f64,
        theta: f64,
        delta: f64,
        gamma: f64,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            alpha,
            beta,
            theta,
            delta,
            gamma,
        }
    }
}

/// An inbound record as handed over by a host, before shape validation.
///
/// Every field is optional so that a record missing a band can still be
/// deserialized and then rejected with a precise reason. The timestamp may
/// be a string or a number on the wire; numbers are kept in their JSON
/// rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub theta: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
}

impl RawSample {
    /// Check the record has every required field, in the order
    /// timestamp, alpha, beta, theta, delta, gamma.
    ///
    /// `fallback_timestamp` is used when the record carries none; pass
    /// `None` to reject such records instead.
    pub fn validate(self, fallback_timestamp: Option<String>) -> Result<Sample, SampleError> {
        let timestamp = match self.timestamp {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Null) | None => {
                fallback_timestamp.ok_or(SampleError::MissingField("timestamp"))?
            }
            Some(other) => other.to_string(),
        };

        Ok(Sample {
            timestamp,
            alpha: band(self.alpha, "alpha")?,
            beta: band(self.beta, "beta")?,
            theta: band(self.theta, "theta")?,
            delta: band(self.delta, "delta")?,
            gamma: band(self.gamma, "gamma")?,
        })
    }
}

impl From<Sample> for RawSample {
    fn from(s: Sample) -> Self {
        Self {
            timestamp: Some(serde_json::Value::String(s.timestamp)),
            alpha: Some(s.alpha),
            beta: Some(s.beta),
            theta: Some(s.theta),
            delta: Some(s.delta),
            gamma: Some(s.gamma),
        }
    }
}

fn band(value: Option<f64>, name: &'static str) -> Result<f64, SampleError> {
    match value {
        None => Err(SampleError::MissingField(name)),
        Some(v) if !v.is_finite() => Err(SampleError::NonFinite(name)),
        Some(v) => Ok(v),
    }
}

/// Per-band columns extracted from a window of samples, in window order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandSeries {
    pub alpha: Vec<f64>,
    pub beta: Vec<f64>,
    pub theta: Vec<f64>,
    pub delta: Vec<f64>,
    pub gamma: Vec<f64>,
}

impl BandSeries {
    pub fn from_samples<'a>(samples: impl IntoIterator<Item = &'a Sample>) -> Self {
        let mut series = Self::default();
        for s in samples {
            series.alpha.push(s.alpha);
            series.beta.push(s.beta);
            series.theta.push(s.theta);
            series.delta.push(s.delta);
            series.gamma.push(s.gamma);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.alpha.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.is_empty()
    }
}

/// Bounded FIFO of samples. Appending past capacity evicts exactly the
/// oldest sample.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(FIXED_CAPACITY)
    }
}

impl SampleBuffer {
    /// `capacity` is raised to 1 if zero.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, returning the evicted oldest sample on overflow.
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn band_series(&self) -> BandSeries {
        BandSeries::from_samples(self.samples.iter())
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
