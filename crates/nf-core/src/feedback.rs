//! Neuro-feedback directives: map the current brain state to a message,
//! visual/audio cues and a difficulty nudge for the training task.
//!
//! Rule precedence, first match wins:
//! 1. Any artifact present: a warning asking the patient to stay still.
//!    Scores are ignored because the window is not trustworthy.
//! 2. Attention tier: positive (>= attention threshold), encouraging
//!    (>= encouraging floor) or negative.
//! 3. For attention tiers only, a relaxation remark is appended based on
//!    the meditation score.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactSet;
use crate::constants::{ATTENTION_THRESHOLD, ENCOURAGING_FLOOR, LOW_MEDITATION, MEDITATION_THRESHOLD};
use crate::error::{ComputeError, ComputeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Neutral,
    Warning,
    Positive,
    Encouraging,
    Negative,
}

impl FeedbackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Neutral => "neutral",
            FeedbackKind::Warning => "warning",
            FeedbackKind::Positive => "positive",
            FeedbackKind::Encouraging => "encouraging",
            FeedbackKind::Negative => "negative",
        }
    }
}

impl fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual cue shown by the training UI. Shares its vocabulary with
/// [`FeedbackKind`].
pub type VisualCue = FeedbackKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCue {
    None,
    Warning,
    Success,
    Gentle,
    Alert,
}

/// One feedback directive. Built whole by each rule branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(rename = "type")]
    pub kind: FeedbackKind,
    pub message: String,
    pub visual_cue: VisualCue,
    pub audio_cue: AudioCue,
    /// -1 makes the task easier, +1 harder.
    pub difficulty_adjustment: i8,
}

impl FeedbackRecord {
    /// Fallback directive used when feedback cannot be computed.
    pub fn neutral() -> Self {
        Self {
            kind: FeedbackKind::Neutral,
            message: "Maintain current focus".to_string(),
            visual_cue: FeedbackKind::Neutral,
            audio_cue: AudioCue::None,
            difficulty_adjustment: 0,
        }
    }
}

impl Default for FeedbackRecord {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Score boundaries for the feedback tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackThresholds {
    /// Attention at or above this is "positive".
    pub attention: f64,
    /// Meditation at or above this earns the "very relaxed" remark.
    pub meditation: f64,
    /// Attention at or above this (but below `attention`) is "encouraging".
    pub encouraging: f64,
    /// Meditation below this earns the "relax a bit more" remark.
    pub low_meditation: f64,
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self {
            attention: ATTENTION_THRESHOLD,
            meditation: MEDITATION_THRESHOLD,
            encouraging: ENCOURAGING_FLOOR,
            low_meditation: LOW_MEDITATION,
        }
    }
}

pub fn generate_feedback(
    attention: f64,
    meditation: f64,
    artifacts: &ArtifactSet,
    thresholds: &FeedbackThresholds,
) -> ComputeResult<FeedbackRecord> {
    if !artifacts.is_empty() {
        return Ok(FeedbackRecord {
            kind: FeedbackKind::Warning,
            message: format!(
                "Detected artifacts: {}. Please stay still.",
                artifacts.joined()
            ),
            visual_cue: FeedbackKind::Warning,
            audio_cue: AudioCue::Warning,
            difficulty_adjustment: 0,
        });
    }

    if !attention.is_finite() {
        return Err(ComputeError::NonFinite("attention"));
    }
    if !meditation.is_finite() {
        return Err(ComputeError::NonFinite("meditation"));
    }

    let (kind, base, audio_cue, difficulty_adjustment) = if attention >= thresholds.attention {
        (
            FeedbackKind::Positive,
            "Excellent attention! Keep it up!",
            AudioCue::Success,
            1,
        )
    } else if attention >= thresholds.encouraging {
        (
            FeedbackKind::Encouraging,
            "Good attention. Try to focus a bit more.",
            AudioCue::Gentle,
            0,
        )
    } else {
        (
            FeedbackKind::Negative,
            "Focus is low. Try to concentrate.",
            AudioCue::Alert,
            -1,
        )
    };

    let remark = if meditation >= thresholds.meditation {
        " You are very relaxed."
    } else if meditation < thresholds.low_meditation {
        " Try to relax a bit more."
    } else {
        ""
    };

    Ok(FeedbackRecord {
        kind,
        message: format!("{base}{remark}"),
        visual_cue: kind,
        audio_cue,
        difficulty_adjustment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Artifact;

    fn clean() -> ArtifactSet {
        ArtifactSet::new()
    }

    fn feedback(attention: f64, meditation: f64) -> FeedbackRecord {
        generate_feedback(attention, meditation, &clean(), &FeedbackThresholds::default()).unwrap()
    }

    #[test]
    fn test_artifacts_take_precedence() {
        let artifacts: ArtifactSet = [Artifact::Movement, Artifact::Noise].into_iter().collect();
        for (att, med) in [(95.0, 95.0), (0.0, 0.0), (60.0, 50.0)] {
            let fb =
                generate_feedback(att, med, &artifacts, &FeedbackThresholds::default()).unwrap();
            assert_eq!(fb.kind, FeedbackKind::Warning);
            assert_eq!(
                fb.message,
                "Detected artifacts: movement, noise. Please stay still."
            );
            assert_eq!(fb.visual_cue, FeedbackKind::Warning);
            assert_eq!(fb.audio_cue, AudioCue::Warning);
            assert_eq!(fb.difficulty_adjustment, 0);
        }
    }

    #[test]
    fn test_warning_ignores_non_finite_scores() {
        let artifacts: ArtifactSet = [Artifact::Blink].into_iter().collect();
        let fb = generate_feedback(f64::NAN, 50.0, &artifacts, &FeedbackThresholds::default())
            .unwrap();
        assert_eq!(fb.kind, FeedbackKind::Warning);
    }

    #[test]
    fn test_attention_tiers() {
        let fb = feedback(70.0, 50.0);
        assert_eq!(fb.kind, FeedbackKind::Positive);
        assert_eq!(fb.message, "Excellent attention! Keep it up!");
        assert_eq!(fb.audio_cue, AudioCue::Success);
        assert_eq!(fb.difficulty_adjustment, 1);

        let fb = feedback(50.0, 50.0);
        assert_eq!(fb.kind, FeedbackKind::Encouraging);
        assert_eq!(fb.message, "Good attention. Try to focus a bit more.");
        assert_eq!(fb.audio_cue, AudioCue::Gentle);
        assert_eq!(fb.difficulty_adjustment, 0);

        let fb = feedback(49.99, 50.0);
        assert_eq!(fb.kind, FeedbackKind::Negative);
        assert_eq!(fb.message, "Focus is low. Try to concentrate.");
        assert_eq!(fb.visual_cue, FeedbackKind::Negative);
        assert_eq!(fb.audio_cue, AudioCue::Alert);
        assert_eq!(fb.difficulty_adjustment, -1);
    }

    #[test]
    fn test_meditation_remarks() {
        assert_eq!(
            feedback(80.0, 70.0).message,
            "Excellent attention! Keep it up! You are very relaxed."
        );
        assert_eq!(
            feedback(10.0, 29.99).message,
            "Focus is low. Try to concentrate. Try to relax a bit more."
        );
        assert_eq!(
            feedback(55.0, 30.0).message,
            "Good attention. Try to focus a bit more."
        );
    }

    #[test]
    fn test_thresholds_are_independent() {
        let thresholds = FeedbackThresholds {
            attention: 90.0,
            meditation: 40.0,
            ..FeedbackThresholds::default()
        };
        let fb = generate_feedback(80.0, 45.0, &clean(), &thresholds).unwrap();
        assert_eq!(fb.kind, FeedbackKind::Encouraging);
        assert!(fb.message.ends_with("You are very relaxed."));
    }

    #[test]
    fn test_non_finite_scores_are_error() {
        let t = FeedbackThresholds::default();
        assert!(generate_feedback(f64::NAN, 50.0, &clean(), &t).is_err());
        assert!(generate_feedback(50.0, f64::INFINITY, &clean(), &t).is_err());
    }

    #[test]
    fn test_neutral_fallback() {
        let fb = FeedbackRecord::neutral();
        assert_eq!(fb.kind, FeedbackKind::Neutral);
        assert_eq!(fb.message, "Maintain current focus");
        assert_eq!(fb.audio_cue, AudioCue::None);
        assert_eq!(fb.difficulty_adjustment, 0);
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(feedback(90.0, 50.0)).unwrap();
        assert_eq!(json["type"], "positive");
        assert_eq!(json["visual_cue"], "positive");
        assert_eq!(json["audio_cue"], "success");
        assert_eq!(json["difficulty_adjustment"], 1);

        let json = serde_json::to_value(FeedbackRecord::neutral()).unwrap();
        assert_eq!(json["audio_cue"], "none");
    }
}
