//! Request and response bodies for the prediction API.

use serde::{Deserialize, Serialize};

use crate::coping::coping_strategy;
use crate::emotion::{Emotion, EmotionScores};
use crate::scoring::{Assessment, StressLevel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalInput {
    pub text: String,
}

/// Whole-text result returned by `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub primary_emotion: Emotion,
    pub stress_level: StressLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_score: Option<f32>,
    pub scores: EmotionScores,
    pub coping_strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_breakdown: Option<Vec<SentenceResult>>,
}

impl PredictResponse {
    pub fn new(overall: Assessment, sentence_breakdown: Option<Vec<SentenceResult>>) -> Self {
        Self {
            primary_emotion: overall.emotion,
            stress_level: overall.stress_level,
            stress_score: overall.stress_score,
            scores: overall.scores,
            coping_strategy: coping_strategy(overall.stress_level, overall.emotion).to_string(),
            sentence_breakdown,
        }
    }
}

/// Result for a single sentence of the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceResult {
    pub sentence: String,
    pub emotion: Emotion,
    pub stress_level: StressLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_score: Option<f32>,
    pub scores: EmotionScores,
}

impl SentenceResult {
    pub fn new(sentence: impl Into<String>, assessment: Assessment) -> Self {
        Self {
            sentence: sentence.into(),
            emotion: assessment.emotion,
            stress_level: assessment.stress_level,
            stress_score: assessment.stress_score,
            scores: assessment.scores,
        }
    }
}
