//! Streaming neurofeedback engine.
//!
//! Ingests per-sample EEG band powers (delta, theta, alpha, beta, gamma),
//! keeps a bounded sliding window, and on every sample past the processing
//! threshold derives attention/meditation scores, flags signal artifacts
//! and produces a rule-based feedback directive. Results accumulate into an
//! optional training session and a bounded feedback history.
//!
//! No I/O beyond `tracing` events: transport, persistence and configuration
//! loading belong to the host.

pub mod artifact;
pub mod constants;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod guard;
pub mod history;
pub mod sample;
pub mod score;
pub mod session;
pub mod stats;
pub mod time;

pub use artifact::{Artifact, ArtifactSet, detect_artifacts};
pub use constants::{
    DEFAULT_RECENT_COUNT, DEFAULT_SESSION_TYPE, FIXED_CAPACITY, HISTORY_RETAIN,
    HISTORY_SOFT_CAP, NEUTRAL_SCORE, PROCESS_THRESHOLD,
};
pub use engine::{EngineConfig, HealthSnapshot, IngestOutcome, ProcessOutcome, StreamEngine};
pub use error::{ComputeError, ConfigError, SampleError};
pub use feedback::{
    AudioCue, FeedbackKind, FeedbackRecord, FeedbackThresholds, VisualCue, generate_feedback,
};
pub use guard::{PassToken, ProcessingGuard};
pub use history::{FeedbackHistory, FeedbackHistoryEntry};
pub use sample::{BandSeries, RawSample, Sample, SampleBuffer};
pub use score::{ScoreResult, attention_score, meditation_score};
pub use session::{Session, SessionDataPoint, SessionManager, SessionStatus, SessionSummary};
