//! Training session lifecycle: Idle -> Active -> Idle.
//!
//! At most one session exists at a time. While active, every processing
//! pass appends a data point. Ending the session computes the summary and
//! hands the whole session to the caller; the manager keeps nothing.

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactSet;
use crate::constants::DEFAULT_SESSION_TYPE;
use crate::error::ComputeResult;
use crate::feedback::FeedbackRecord;
use crate::stats::{mean, std_dev};
use crate::time::now_iso8601;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDataPoint {
    pub timestamp: String,
    pub attention: f64,
    pub meditation: f64,
    pub feedback: FeedbackRecord,
    pub artifacts: ArtifactSet,
}

/// Aggregate statistics over a session's data points. All zero until the
/// session ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_data_points: usize,
    pub average_attention: f64,
    pub average_meditation: f64,
    /// Population standard deviation of attention.
    pub attention_variability: f64,
    /// Population standard deviation of meditation.
    pub meditation_variability: f64,
    /// Data points whose artifact set was non-empty.
    pub artifact_count: usize,
}

impl SessionSummary {
    pub fn from_points(points: &[SessionDataPoint]) -> ComputeResult<Self> {
        if points.is_empty() {
            return Ok(Self::default());
        }
        let attention: Vec<f64> = points.iter().map(|p| p.attention).collect();
        let meditation: Vec<f64> = points.iter().map(|p| p.meditation).collect();

        Ok(Self {
            total_data_points: points.len(),
            average_attention: mean(&attention)?,
            average_meditation: mean(&meditation)?,
            attention_variability: std_dev(&attention)?,
            meditation_variability: std_dev(&meditation)?,
            artifact_count: artifact_count(points),
        })
    }
}

fn artifact_count(points: &[SessionDataPoint]) -> usize {
    points.iter().filter(|p| !p.artifacts.is_empty()).count()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub patient_id: String,
    pub session_type: String,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub data_points: Vec<SessionDataPoint>,
    pub summary: SessionSummary,
}

/// Snapshot of the manager for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
    NoSession,
    Active {
        session_id: String,
        patient_id: String,
        session_type: String,
        start_time: String,
        data_points_count: usize,
        summary: SessionSummary,
    },
}

#[derive(Debug, Default)]
pub struct SessionManager {
    current: Option<Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session. `session_type` defaults to "training".
    ///
    /// Starting while a session is active replaces it without closing it.
    /// The replaced session is returned so the caller can decide what to do
    /// with its data; callers that want a summary must `end()` first.
    pub fn start(
        &mut self,
        session_id: impl Into<String>,
        patient_id: impl Into<String>,
        session_type: Option<&str>,
    ) -> Option<Session> {
        let session = Session {
            session_id: session_id.into(),
            patient_id: patient_id.into(),
            session_type: session_type.unwrap_or(DEFAULT_SESSION_TYPE).to_string(),
            start_time: now_iso8601(),
            end_time: None,
            data_points: Vec::new(),
            summary: SessionSummary::default(),
        };
        tracing::info!("started EEG session: {}", session.session_id);

        let replaced = self.current.replace(session);
        if let Some(old) = &replaced {
            tracing::warn!(
                "session '{}' replaced while active with {} unsummarized data points",
                old.session_id,
                old.data_points.len()
            );
        }
        replaced
    }

    /// Append one processing result. Returns false (no-op) when idle.
    pub fn record_point(
        &mut self,
        timestamp: String,
        attention: f64,
        meditation: f64,
        feedback: FeedbackRecord,
        artifacts: ArtifactSet,
    ) -> bool {
        let Some(session) = self.current.as_mut() else {
            return false;
        };
        session.data_points.push(SessionDataPoint {
            timestamp,
            attention,
            meditation,
            feedback,
            artifacts,
        });
        true
    }

    /// Close the active session and return it with its summary filled in.
    /// `None` means there was no active session.
    pub fn end(&mut self) -> Option<Session> {
        let mut session = self.current.take()?;
        session.end_time = Some(now_iso8601());
        session.summary = match SessionSummary::from_points(&session.data_points) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!("session summary fell back to counts only: {e}");
                SessionSummary {
                    total_data_points: session.data_points.len(),
                    artifact_count: artifact_count(&session.data_points),
                    ..SessionSummary::default()
                }
            }
        };
        tracing::info!("ended EEG session: {}", session.session_id);
        Some(session)
    }

    pub fn status(&self) -> SessionStatus {
        match &self.current {
            None => SessionStatus::NoSession,
            Some(s) => SessionStatus::Active {
                session_id: s.session_id.clone(),
                patient_id: s.patient_id.clone(),
                session_type: s.session_type.clone(),
                start_time: s.start_time.clone(),
                data_points_count: s.data_points.len(),
                summary: s.summary.clone(),
            },
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }
}
