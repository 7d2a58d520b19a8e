//! Streaming engine: buffers samples and, once enough history is held,
//! scores every new sample's window and threads the result into the active
//! session and the feedback history.

use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactSet, detect_artifacts};
use crate::constants::{
    FIXED_CAPACITY, HISTORY_RETAIN, HISTORY_SOFT_CAP, NEUTRAL_SCORE, PROCESS_THRESHOLD,
};
use crate::error::{ConfigError, SampleError};
use crate::feedback::{FeedbackRecord, FeedbackThresholds, generate_feedback};
use crate::guard::ProcessingGuard;
use crate::history::{FeedbackHistory, FeedbackHistoryEntry};
use crate::sample::{RawSample, Sample, SampleBuffer};
use crate::score::{ScoreResult, attention_score, meditation_score};
use crate::session::{Session, SessionManager, SessionStatus};
use crate::time::now_iso8601;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub buffer_capacity: usize,
    /// Buffer length at which each accepted sample triggers a pass.
    pub process_threshold: usize,
    pub history_soft_cap: usize,
    pub history_retain: usize,
    pub thresholds: FeedbackThresholds,
    /// Stamp samples that arrive without a timestamp instead of rejecting them.
    pub assign_missing_timestamps: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: FIXED_CAPACITY,
            process_threshold: PROCESS_THRESHOLD,
            history_soft_cap: HISTORY_SOFT_CAP,
            history_retain: HISTORY_RETAIN,
            thresholds: FeedbackThresholds::default(),
            assign_missing_timestamps: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity == 0 {
            return Err(invalid("buffer_capacity must be at least 1"));
        }
        if self.process_threshold == 0 || self.process_threshold > self.buffer_capacity {
            return Err(invalid(format!(
                "process_threshold must be in 1..={}",
                self.buffer_capacity
            )));
        }
        if self.history_soft_cap == 0 {
            return Err(invalid("history_soft_cap must be at least 1"));
        }
        if self.history_retain > self.history_soft_cap {
            return Err(invalid("history_retain must not exceed history_soft_cap"));
        }
        let t = &self.thresholds;
        if ![t.attention, t.meditation, t.encouraging, t.low_meditation]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(invalid("feedback thresholds must be finite"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue(msg.into())
}

/// Everything one processing pass produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessOutcome {
    pub timestamp: String,
    pub scores: ScoreResult,
    pub artifacts: ArtifactSet,
    pub feedback: FeedbackRecord,
    /// Whether the result was appended to an active session.
    pub recorded_in_session: bool,
}

/// What happened to one ingested record.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Malformed record, dropped without touching any state.
    Rejected(SampleError),
    /// Buffered; the buffer is still below the processing threshold.
    Buffered,
    /// Buffered and a processing pass ran.
    Processed(ProcessOutcome),
    /// Buffered, but another pass held the guard so this one was dropped.
    Skipped,
}

/// Liveness figures for health endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub buffer_length: usize,
    pub session_active: bool,
}

pub struct StreamEngine {
    config: EngineConfig,
    buffer: SampleBuffer,
    guard: ProcessingGuard,
    sessions: SessionManager,
    history: FeedbackHistory,
}

impl Default for StreamEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl StreamEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        Self {
            buffer: SampleBuffer::new(config.buffer_capacity),
            guard: ProcessingGuard::new(),
            sessions: SessionManager::new(),
            history: FeedbackHistory::new(config.history_soft_cap, config.history_retain),
            config,
        }
    }

    /// Validate and buffer one inbound record, processing the window if the
    /// buffer has reached the threshold.
    pub fn ingest(&mut self, raw: RawSample) -> IngestOutcome {
        let fallback = self.config.assign_missing_timestamps.then(now_iso8601);
        match raw.validate(fallback) {
            Ok(sample) => self.ingest_sample(sample),
            Err(e) => {
                tracing::warn!("invalid data point dropped: {e}");
                IngestOutcome::Rejected(e)
            }
        }
    }

    /// Buffer an already-validated sample.
    pub fn ingest_sample(&mut self, sample: Sample) -> IngestOutcome {
        self.buffer.push(sample);
        if self.buffer.len() < self.config.process_threshold {
            return IngestOutcome::Buffered;
        }
        match self.try_process() {
            Some(outcome) => IngestOutcome::Processed(outcome),
            None => IngestOutcome::Skipped,
        }
    }

    /// Run a pass over the current buffer regardless of the threshold.
    /// `None` if the buffer is empty or a pass is already running.
    pub fn process_now(&mut self) -> Option<ProcessOutcome> {
        if self.buffer.is_empty() {
            return None;
        }
        self.try_process()
    }

    fn try_process(&mut self) -> Option<ProcessOutcome> {
        let guard = self.guard.clone();
        let outcome = guard.try_run(|| self.process_pass());
        if outcome.is_none() {
            tracing::debug!("processing pass already running, attempt dropped");
        }
        outcome
    }

    fn process_pass(&mut self) -> ProcessOutcome {
        let series = self.buffer.band_series();

        let attention = attention_score(&series.alpha, &series.beta, &series.theta)
            .unwrap_or_else(|e| {
                tracing::warn!("attention score fell back to neutral: {e}");
                NEUTRAL_SCORE
            });
        let meditation = meditation_score(&series.alpha, &series.theta).unwrap_or_else(|e| {
            tracing::warn!("meditation score fell back to neutral: {e}");
            NEUTRAL_SCORE
        });
        let artifacts = detect_artifacts(&series).unwrap_or_else(|e| {
            tracing::warn!("artifact detection skipped for this pass: {e}");
            ArtifactSet::new()
        });
        let feedback =
            generate_feedback(attention, meditation, &artifacts, &self.config.thresholds)
                .unwrap_or_else(|e| {
                    tracing::warn!("feedback fell back to neutral: {e}");
                    FeedbackRecord::neutral()
                });

        let timestamp = now_iso8601();
        let recorded_in_session = self.sessions.record_point(
            timestamp.clone(),
            attention,
            meditation,
            feedback.clone(),
            artifacts.clone(),
        );
        self.history.append(FeedbackHistoryEntry {
            timestamp: timestamp.clone(),
            attention,
            meditation,
            feedback: feedback.clone(),
            artifacts: artifacts.clone(),
        });

        tracing::debug!(
            window = series.len(),
            attention,
            meditation,
            artifacts = artifacts.len(),
            kind = %feedback.kind,
            "processing pass complete"
        );

        ProcessOutcome {
            timestamp,
            scores: ScoreResult {
                attention,
                meditation,
            },
            artifacts,
            feedback,
            recorded_in_session,
        }
    }

    /// Open a training session. See [`SessionManager::start`] for the
    /// behavior when one is already active.
    pub fn start_session(
        &mut self,
        session_id: impl Into<String>,
        patient_id: impl Into<String>,
        session_type: Option<&str>,
    ) -> Option<Session> {
        self.sessions.start(session_id, patient_id, session_type)
    }

    /// `None` when no session is active.
    pub fn end_session(&mut self) -> Option<Session> {
        self.sessions.end()
    }

    pub fn session_status(&self) -> SessionStatus {
        self.sessions.status()
    }

    pub fn recent_feedback(&self, count: i64) -> &[FeedbackHistoryEntry] {
        self.history.recent(count)
    }

    pub fn latest(&self) -> Option<&FeedbackHistoryEntry> {
        self.history.latest()
    }

    pub fn health_snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            buffer_length: self.buffer.len(),
            session_active: self.sessions.is_active(),
        }
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn processing_guard(&self) -> ProcessingGuard {
        self.guard.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackKind;

    fn steady(i: usize) -> Sample {
        Sample::new(format!("t{i}"), 20.0, 5.0, 5.0, 10.0, 10.0)
    }

    #[test]
    fn test_below_threshold_only_buffers() {
        let mut engine = StreamEngine::default();
        for i in 0..63 {
            assert_eq!(engine.ingest_sample(steady(i)), IngestOutcome::Buffered);
        }
        assert!(engine.latest().is_none());
        assert_eq!(engine.health_snapshot().buffer_length, 63);
    }

    #[test]
    fn test_threshold_triggers_every_ingest() {
        let mut engine = StreamEngine::default();
        for i in 0..63 {
            engine.ingest_sample(steady(i));
        }
        for i in 63..70 {
            assert!(matches!(
                engine.ingest_sample(steady(i)),
                IngestOutcome::Processed(_)
            ));
        }
        assert_eq!(engine.recent_feedback(100).len(), 7);
    }

    #[test]
    fn test_rejected_record_does_not_mutate() {
        let mut engine = StreamEngine::default();
        let raw = RawSample {
            alpha: Some(1.0),
            ..RawSample::default()
        };
        assert_eq!(
            engine.ingest(raw),
            IngestOutcome::Rejected(SampleError::MissingField("timestamp"))
        );
        assert_eq!(engine.buffer().len(), 0);
    }

    #[test]
    fn test_missing_timestamp_assigned_when_configured() {
        let config = EngineConfig {
            assign_missing_timestamps: true,
            ..EngineConfig::default()
        };
        let mut engine = StreamEngine::new(config).unwrap();
        let raw = RawSample {
            timestamp: None,
            alpha: Some(1.0),
            beta: Some(1.0),
            theta: Some(1.0),
            delta: Some(1.0),
            gamma: Some(1.0),
        };
        assert_eq!(engine.ingest(raw), IngestOutcome::Buffered);
        assert!(engine.buffer().newest().unwrap().timestamp.ends_with('Z'));
    }

    #[test]
    fn test_held_guard_skips_pass() {
        let config = EngineConfig {
            process_threshold: 1,
            ..EngineConfig::default()
        };
        let mut engine = StreamEngine::new(config).unwrap();
        let token = engine.processing_guard().try_acquire().unwrap();

        assert_eq!(engine.ingest_sample(steady(0)), IngestOutcome::Skipped);
        assert_eq!(engine.buffer().len(), 1, "sample is kept even when skipped");
        assert!(engine.latest().is_none());

        drop(token);
        assert!(matches!(
            engine.ingest_sample(steady(1)),
            IngestOutcome::Processed(_)
        ));
        assert!(!engine.processing_guard().is_running());
    }

    #[test]
    fn test_process_now_respects_held_guard() {
        let mut engine = StreamEngine::default();
        engine.ingest_sample(steady(0));

        let guard = engine.processing_guard();
        let token = guard.try_acquire().unwrap();
        assert!(engine.process_now().is_none());
        assert!(guard.is_running());

        drop(token);
        assert!(engine.process_now().is_some());
        assert!(!guard.is_running(), "pass releases the guard on return");
    }

    #[test]
    fn test_non_finite_sample_falls_back_to_neutral() {
        let config = EngineConfig {
            process_threshold: 1,
            ..EngineConfig::default()
        };
        let mut engine = StreamEngine::new(config).unwrap();
        let outcome = engine.ingest_sample(Sample::new("t", f64::NAN, 1.0, 1.0, 1.0, 1.0));
        let IngestOutcome::Processed(outcome) = outcome else {
            panic!("expected a pass, got {outcome:?}");
        };
        assert_eq!(outcome.scores, ScoreResult::NEUTRAL);
        assert!(outcome.artifacts.is_empty());
        assert_eq!(outcome.feedback.kind, FeedbackKind::Encouraging);
        assert!(!engine.processing_guard().is_running());
    }

    #[test]
    fn test_process_now() {
        let mut engine = StreamEngine::default();
        assert!(engine.process_now().is_none());
        engine.ingest_sample(steady(0));
        let outcome = engine.process_now().unwrap();
        assert_eq!(outcome.feedback.kind, FeedbackKind::Negative);
        assert!(!outcome.recorded_in_session);
    }

    #[test]
    fn test_config_validation() {
        assert!(EngineConfig::default().validate().is_ok());
        let bad = [
            EngineConfig {
                buffer_capacity: 0,
                ..EngineConfig::default()
            },
            EngineConfig {
                process_threshold: 2048,
                ..EngineConfig::default()
            },
            EngineConfig {
                history_retain: 2000,
                ..EngineConfig::default()
            },
            EngineConfig {
                thresholds: FeedbackThresholds {
                    attention: f64::NAN,
                    ..FeedbackThresholds::default()
                },
                ..EngineConfig::default()
            },
        ];
        for config in bad {
            assert!(StreamEngine::new(config).is_err());
        }
    }

    #[test]
    fn test_health_snapshot_tracks_session() {
        let mut engine = StreamEngine::default();
        assert!(!engine.health_snapshot().session_active);
        engine.start_session("S1", "P1", None);
        assert!(engine.health_snapshot().session_active);
        engine.end_session();
        assert!(!engine.health_snapshot().session_active);
    }
}
