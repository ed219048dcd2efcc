//! Journal analysis pipeline: split → classify → score → report.

use std::sync::Mutex;

use stresslens_core::{
    Assessment, PredictResponse, ScoreError, SentenceResult, StressMethod, split_sentences,
};
use thiserror::Error;
use tracing::debug;

use crate::EmotionClassifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub stress_method: StressMethod,
    /// Include a per-sentence breakdown in every response.
    pub sentence_breakdown: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            stress_method: StressMethod::Heuristic,
            sentence_breakdown: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("text is empty")]
    EmptyText,

    #[error("classifier lock poisoned by an earlier panic")]
    Poisoned,

    #[error("classifier returned {got} rows for {expected} texts")]
    RowCount { expected: usize, got: usize },

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Inference(#[from] anyhow::Error),
}

/// Most sentences sent to the model in one forward pass.
const SENTENCE_BATCH_SIZE: usize = 32;

/// Runs journal text through a classifier and post-processes the logits.
///
/// The classifier is loaded once and shared; a forward pass needs `&mut`,
/// so calls are serialized on an internal lock.
pub struct JournalAnalyzer {
    classifier: Mutex<Box<dyn EmotionClassifier>>,
    config: AnalyzerConfig,
}

impl JournalAnalyzer {
    pub fn new(classifier: Box<dyn EmotionClassifier>, config: AnalyzerConfig) -> Self {
        Self {
            classifier: Mutex::new(classifier),
            config,
        }
    }

    /// Analyze one journal entry.
    ///
    /// Surrounding whitespace is ignored; empty text is rejected. The whole
    /// entry gets a forward pass of its own; sentences follow in bounded,
    /// length-sorted batches.
    pub fn analyze(&self, text: &str) -> Result<PredictResponse, AnalyzeError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AnalyzeError::EmptyText);
        }

        let sentences = if self.config.sentence_breakdown {
            split_sentences(text)
        } else {
            Vec::new()
        };

        let (labels, overall_row, sentence_rows) = {
            let mut classifier = self
                .classifier
                .lock()
                .map_err(|_| AnalyzeError::Poisoned)?;
            let overall_row = classify(&mut **classifier, &[text])?
                .pop()
                .ok_or(AnalyzeError::RowCount {
                    expected: 1,
                    got: 0,
                })?;
            let sentence_rows = classify_sentences(&mut **classifier, &sentences)?;
            (
                classifier.labels().as_slice().to_vec(),
                overall_row,
                sentence_rows,
            )
        };

        let method = self.config.stress_method;
        let overall = Assessment::from_logits(&labels, &overall_row, method)?;

        let breakdown = if self.config.sentence_breakdown {
            let results = sentences
                .iter()
                .zip(&sentence_rows)
                .map(|(sentence, row)| {
                    Assessment::from_logits(&labels, row, method)
                        .map(|a| SentenceResult::new(*sentence, a))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Some(results)
        } else {
            None
        };

        debug!(
            chars = text.len(),
            sentences = sentences.len(),
            emotion = %overall.emotion,
            stress = %overall.stress_level,
            "analyzed entry"
        );
        Ok(PredictResponse::new(overall, breakdown))
    }
}

/// One forward pass; exactly one row must come back per text.
fn classify(
    classifier: &mut dyn EmotionClassifier,
    texts: &[&str],
) -> Result<Vec<Vec<f32>>, AnalyzeError> {
    let rows = classifier.logits_batch(texts)?;
    if rows.len() != texts.len() {
        return Err(AnalyzeError::RowCount {
            expected: texts.len(),
            got: rows.len(),
        });
    }
    Ok(rows)
}

/// Classify sentences in chunks of similar length, since each chunk is
/// padded to its longest member. Rows are returned in input order.
fn classify_sentences(
    classifier: &mut dyn EmotionClassifier,
    sentences: &[&str],
) -> Result<Vec<Vec<f32>>, AnalyzeError> {
    let mut order: Vec<usize> = (0..sentences.len()).collect();
    order.sort_by_key(|&i| sentences[i].len());

    let mut rows = vec![Vec::new(); sentences.len()];
    for chunk in order.chunks(SENTENCE_BATCH_SIZE) {
        let texts: Vec<&str> = chunk.iter().map(|&i| sentences[i]).collect();
        for (&i, row) in chunk.iter().zip(classify(classifier, &texts)?) {
            rows[i] = row;
        }
    }
    Ok(rows)
}
