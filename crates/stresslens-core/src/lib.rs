pub mod coping;
pub mod emotion;
pub mod report;
pub mod scoring;
pub mod sentence;

pub use coping::coping_strategy;
pub use emotion::{Emotion, EmotionScores, UnknownEmotion};
pub use report::{JournalInput, PredictResponse, SentenceResult};
pub use scoring::{Assessment, ScoreError, StressLevel, StressMethod};
pub use sentence::split_sentences;
