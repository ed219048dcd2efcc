//! Logit post-processing: softmax, argmax, and stress derivation.
//!
//! Two stress methods are supported. [`StressMethod::Heuristic`] weights
//! the fear, anger and sadness probabilities into a score and buckets it;
//! [`StressMethod::Table`] maps the primary emotion straight to a level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::emotion::{Emotion, EmotionScores};

/// Scores below this are [`StressLevel::Low`].
pub const LOW_THRESHOLD: f32 = 0.3;
/// Scores below this (and at or above [`LOW_THRESHOLD`]) are [`StressLevel::Medium`].
pub const HIGH_THRESHOLD: f32 = 0.6;

/// Weight applied to sadness in the stress heuristic.
const SADNESS_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    #[error("expected {expected} logits, got {got}")]
    LogitCount { expected: usize, got: usize },

    #[error("logits contain a non-finite value")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Low,
    Medium,
    High,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Bucket a stress score. Non-decreasing in `score`.
    pub fn from_score(score: f32) -> Self {
        if score < LOW_THRESHOLD {
            Self::Low
        } else if score < HIGH_THRESHOLD {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Static per-emotion mapping used by [`StressMethod::Table`].
    pub fn for_emotion(emotion: Emotion) -> Self {
        match emotion {
            Emotion::Joy | Emotion::Love => Self::Low,
            Emotion::Sadness | Emotion::Surprise => Self::Medium,
            Emotion::Anger | Emotion::Fear => Self::High,
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a stress level is derived from classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StressMethod {
    #[default]
    Heuristic,
    Table,
}

impl StressMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heuristic => "heuristic",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for StressMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StressMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "table" => Ok(Self::Table),
            other => Err(format!(
                "unknown stress method {other:?} (expected 'heuristic' or 'table')"
            )),
        }
    }
}

/// Post-processed classifier output for one unit of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub emotion: Emotion,
    pub scores: EmotionScores,
    pub stress_level: StressLevel,
    /// Present only for [`StressMethod::Heuristic`].
    pub stress_score: Option<f32>,
}

impl Assessment {
    /// Build an assessment from one row of logits.
    ///
    /// `labels[i]` names the emotion for `logits[i]`. The primary emotion is
    /// the argmax in model output order, so ties go to the lower index.
    pub fn from_logits(
        labels: &[Emotion],
        logits: &[f32],
        method: StressMethod,
    ) -> Result<Self, ScoreError> {
        if logits.len() != labels.len() {
            return Err(ScoreError::LogitCount {
                expected: labels.len(),
                got: logits.len(),
            });
        }
        if logits.iter().any(|x| !x.is_finite()) {
            return Err(ScoreError::NonFinite);
        }

        let probs = softmax(logits);
        let best = argmax(&probs).ok_or(ScoreError::LogitCount {
            expected: labels.len(),
            got: 0,
        })?;

        let mut scores = EmotionScores::default();
        for (&label, &p) in labels.iter().zip(&probs) {
            scores.set(label, p);
        }

        Ok(Self::from_scores(labels[best], scores, method))
    }

    /// Derive the stress fields for an already-normalized distribution.
    pub fn from_scores(emotion: Emotion, scores: EmotionScores, method: StressMethod) -> Self {
        let (stress_level, stress_score) = match method {
            StressMethod::Heuristic => {
                let score = stress_score(&scores);
                (StressLevel::from_score(score), Some(score))
            }
            StressMethod::Table => (StressLevel::for_emotion(emotion), None),
        };
        Self {
            emotion,
            scores,
            stress_level,
            stress_score,
        }
    }
}

/// `fear + anger + 0.5 * sadness`, clamped to `[0, 1]`.
pub fn stress_score(scores: &EmotionScores) -> f32 {
    let raw = scores.get(Emotion::Fear)
        + scores.get(Emotion::Anger)
        + SADNESS_WEIGHT * scores.get(Emotion::Sadness);
    raw.clamp(0.0, 1.0)
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 {
        exps.into_iter().map(|e| e / sum).collect()
    } else {
        exps
    }
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
