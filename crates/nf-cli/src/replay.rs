//! Offline replay of a recorded JSONL sample stream through a fresh engine.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use nf_core::{EngineConfig, FeedbackHistoryEntry, IngestOutcome, RawSample, Session, StreamEngine};
use serde::Serialize;

/// Session to wrap the replay in.
pub struct ReplaySession {
    pub session_id: String,
    pub patient_id: String,
    pub session_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub lines: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub passes: usize,
    pub skipped: usize,
    pub latest: Option<FeedbackHistoryEntry>,
    pub session: Option<Session>,
}

/// Read `path` (`-` for stdin) and replay it.
pub fn replay_path(
    path: &Path,
    config: EngineConfig,
    session: Option<ReplaySession>,
) -> Result<ReplayReport> {
    if path == Path::new("-") {
        return replay_reader(std::io::stdin().lock(), config, session);
    }
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    replay_reader(file, config, session)
}

/// Blank lines are skipped; lines that are not a JSON object with numeric
/// bands are counted as rejected.
pub fn replay_reader(
    reader: impl Read,
    config: EngineConfig,
    session: Option<ReplaySession>,
) -> Result<ReplayReport> {
    let mut engine = StreamEngine::new(config).context("invalid engine configuration")?;
    if let Some(s) = &session {
        engine.start_session(&s.session_id, &s.patient_id, s.session_type.as_deref());
    }

    let mut report = ReplayReport {
        lines: 0,
        accepted: 0,
        rejected: 0,
        passes: 0,
        skipped: 0,
        latest: None,
        session: None,
    };

    for (lineno, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", lineno + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        report.lines += 1;

        let raw: RawSample = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("line {}: invalid data point dropped: {e}", lineno + 1);
                report.rejected += 1;
                continue;
            }
        };
        match engine.ingest(raw) {
            IngestOutcome::Rejected(_) => report.rejected += 1,
            IngestOutcome::Buffered => report.accepted += 1,
            IngestOutcome::Processed(_) => {
                report.accepted += 1;
                report.passes += 1;
            }
            IngestOutcome::Skipped => {
                report.accepted += 1;
                report.skipped += 1;
            }
        }
    }

    report.latest = engine.latest().cloned();
    if session.is_some() {
        report.session = engine.end_session();
    }
    Ok(report)
}
