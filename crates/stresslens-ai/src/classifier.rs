//! ONNX Runtime sequence classifier for fine-tuned emotion models.
//!
//! The model directory must contain `model.onnx` (exported with a
//! `logits` output of shape `[batch, 6]`) and `tokenizer.json`. An
//! optional `config.json` supplies the label order, see [`LabelOrder`].

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use stresslens_core::Emotion;
use tokenizers::{Encoding, Tokenizer};
use tracing::{debug, info};

use crate::EmotionClassifier;
use crate::labels::LabelOrder;

/// Longest token sequence fed to the model (BERT-family position limit).
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Emotion classifier backed by an ONNX Runtime session.
pub struct OnnxClassifier {
    session: Session,
    tokenizer: Tokenizer,
    labels: LabelOrder,
    /// DistilBERT exports have no `token_type_ids` input.
    feeds_token_types: bool,
}

impl OnnxClassifier {
    /// Load a classifier from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path, max_length: usize) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let labels = LabelOrder::from_model_dir(model_dir)?;
        let session = Session::builder()?.commit_from_file(&model_path)?;

        if let Some(width) = infer_label_count(session.outputs()[0].dtype()) {
            anyhow::ensure!(
                width == Emotion::COUNT,
                "model emits {width} logits per input, expected {}",
                Emotion::COUNT
            );
        }

        let feeds_token_types = session
            .inputs()
            .iter()
            .any(|input| input.name() == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        // Pad each batch to its longest member. Keep the exported pad token
        // if tokenizer.json has one.
        let padding = match tokenizer.get_padding() {
            Some(existing) => tokenizers::PaddingParams {
                strategy: tokenizers::PaddingStrategy::BatchLongest,
                ..existing.clone()
            },
            None => tokenizers::PaddingParams::default(),
        };
        tokenizer.with_padding(Some(padding));

        info!(
            model = %model_path.display(),
            max_length,
            feeds_token_types,
            "loaded emotion model"
        );
        Ok(Self {
            session,
            tokenizer,
            labels,
            feeds_token_types,
        })
    }
}

impl EmotionClassifier for OnnxClassifier {
    fn labels(&self) -> &LabelOrder {
        &self.labels
    }

    fn logits_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
        let inputs = ModelInputs::pack(&encodings, self.feeds_token_types)?;
        let seq_len = inputs.seq_len;
        let logits = inputs.run(&mut self.session)?;

        debug!(batch_size = texts.len(), seq_len, "classified batch");
        Ok(logits
            .chunks_exact(Emotion::COUNT)
            .map(<[f32]>::to_vec)
            .collect())
    }
}

/// Row-major `[batch, seq_len]` id tensors for one padded batch.
struct ModelInputs {
    batch_size: usize,
    seq_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    /// Only built for models that declare a `token_type_ids` input.
    token_type_ids: Option<Vec<i64>>,
}

impl ModelInputs {
    fn pack(encodings: &[Encoding], with_token_types: bool) -> anyhow::Result<Self> {
        let seq_len = encodings.iter().map(Encoding::len).max().unwrap_or(0);
        anyhow::ensure!(seq_len > 0, "tokenizer produced no tokens");

        let widen = |ids: &[u32]| -> Vec<i64> {
            let mut row: Vec<i64> = ids.iter().map(|&id| i64::from(id)).collect();
            row.resize(seq_len, 0);
            row
        };
        Ok(Self {
            batch_size: encodings.len(),
            seq_len,
            input_ids: encodings.iter().flat_map(|e| widen(e.get_ids())).collect(),
            attention_mask: encodings
                .iter()
                .flat_map(|e| widen(e.get_attention_mask()))
                .collect(),
            token_type_ids: with_token_types
                .then(|| encodings.iter().flat_map(|e| widen(e.get_type_ids())).collect()),
        })
    }

    /// Forward pass; returns the flat `[batch, 6]` logits.
    fn run(self, session: &mut Session) -> anyhow::Result<Vec<f32>> {
        let batch_size = self.batch_size;
        let shape = [self.batch_size as i64, self.seq_len as i64];
        let ids = Tensor::from_array((shape, self.input_ids.into_boxed_slice()))?;
        let mask = Tensor::from_array((shape, self.attention_mask.into_boxed_slice()))?;
        let outputs = match self.token_type_ids {
            Some(types) => {
                let types = Tensor::from_array((shape, types.into_boxed_slice()))?;
                session.run(ort::inputs![
                    "input_ids" => ids,
                    "attention_mask" => mask,
                    "token_type_ids" => types,
                ])?
            }
            None => session.run(ort::inputs![
                "input_ids" => ids,
                "attention_mask" => mask,
            ])?,
        };

        let (output_shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims == [batch_size as i64, Emotion::COUNT as i64],
            "logits shape {dims:?}, expected [{batch_size}, {}]",
            Emotion::COUNT
        );
        Ok(logits.to_vec())
    }
}

/// Try to read the label count from the model's logits output type.
fn infer_label_count(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use stresslens_core::{Assessment, StressMethod};

    /// Directory holding an exported emotion model. Tests are skipped without one.
    fn model_dir() -> Option<PathBuf> {
        let dir = std::env::var_os("STRESSLENS_TEST_MODEL")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                    .join("..")
                    .join("..")
                    .join("models")
                    .join("emotion_model_final")
            });
        if dir.join("model.onnx").exists() {
            Some(dir)
        } else {
            eprintln!(
                "skipping: no model.onnx in {}; export one with\n  \
                 optimum-cli export onnx --model <checkpoint> --task text-classification {}",
                dir.display(),
                dir.display()
            );
            None
        }
    }

    fn encoding(ids: &[u32], type_id: u32) -> Encoding {
        let tokens = ids
            .iter()
            .map(|&id| tokenizers::Token::new(id, format!("t{id}"), (0, 0)))
            .collect();
        Encoding::from_tokens(tokens, type_id)
    }

    #[test]
    fn pack_pads_rows_to_longest() {
        let inputs =
            ModelInputs::pack(&[encoding(&[101, 7, 102], 0), encoding(&[101], 0)], false).unwrap();
        assert_eq!((inputs.batch_size, inputs.seq_len), (2, 3));
        assert_eq!(inputs.input_ids, vec![101, 7, 102, 101, 0, 0]);
        assert_eq!(inputs.attention_mask, vec![1, 1, 1, 1, 0, 0]);
        assert!(inputs.token_type_ids.is_none());
    }

    #[test]
    fn pack_builds_token_types_on_request() {
        let inputs = ModelInputs::pack(&[encoding(&[5, 6], 1)], true).unwrap();
        assert_eq!(inputs.token_type_ids, Some(vec![1, 1]));
    }

    #[test]
    fn pack_rejects_empty_encodings() {
        assert!(ModelInputs::pack(&[Encoding::default()], false).is_err());
    }

    #[test]
    fn load_rejects_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = OnnxClassifier::load(dir.path(), DEFAULT_MAX_LENGTH)
            .err()
            .expect("empty dir must not load");
        assert!(err.to_string().contains("model.onnx not found"), "{err}");
    }

    #[test]
    fn load_model() {
        let Some(dir) = model_dir() else { return };
        let clf = OnnxClassifier::load(&dir, DEFAULT_MAX_LENGTH).unwrap();
        assert_eq!(clf.labels().as_slice().len(), Emotion::COUNT);
    }

    #[test]
    fn one_row_per_text() {
        let Some(dir) = model_dir() else { return };
        let mut clf = OnnxClassifier::load(&dir, DEFAULT_MAX_LENGTH).unwrap();
        let rows = clf
            .logits_batch(&[
                "I am so happy today",
                "I can't stop worrying about tomorrow's interview and what might go wrong",
            ])
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == Emotion::COUNT));
    }

    #[test]
    fn long_text_is_truncated() {
        let Some(dir) = model_dir() else { return };
        let mut clf = OnnxClassifier::load(&dir, DEFAULT_MAX_LENGTH).unwrap();
        let long = "I feel tired and overwhelmed. ".repeat(400);
        let rows = clf.logits_batch(&[long.as_str()]).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn obvious_joy_is_joy() {
        let Some(dir) = model_dir() else { return };
        let mut clf = OnnxClassifier::load(&dir, DEFAULT_MAX_LENGTH).unwrap();
        let rows = clf
            .logits_batch(&["I am thrilled and delighted, this is the best day ever"])
            .unwrap();
        let a = Assessment::from_logits(clf.labels().as_slice(), &rows[0], StressMethod::Heuristic)
            .unwrap();
        assert_eq!(a.emotion, Emotion::Joy);
    }

    #[test]
    fn empty_batch() {
        let Some(dir) = model_dir() else { return };
        let mut clf = OnnxClassifier::load(&dir, DEFAULT_MAX_LENGTH).unwrap();
        assert!(clf.logits_batch(&[]).unwrap().is_empty());
    }
}
