//! AI inference layer: ONNX Runtime emotion classification and the journal analysis pipeline.

mod analyzer;
mod labels;

#[cfg(feature = "onnx")]
mod classifier;

pub use analyzer::{AnalyzeError, AnalyzerConfig, JournalAnalyzer};
pub use labels::{LabelError, LabelOrder};

#[cfg(feature = "onnx")]
pub use classifier::{DEFAULT_MAX_LENGTH, OnnxClassifier};

/// A sequence-classification model over the six emotion labels.
///
/// Implementations return raw logits; softmax and everything after it
/// happens in [`stresslens_core::scoring`].
pub trait EmotionClassifier: Send {
    /// Emotion for each logit position.
    fn labels(&self) -> &LabelOrder;

    /// One row of logits per input text, in input order.
    fn logits_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;
}
