//! Model output index → emotion label mapping.
//!
//! Fine-tuned checkpoints ship a `config.json` whose `id2label` names each
//! logit. When those names are the emotion labels we trust them; generic
//! names like `LABEL_0` fall back to the default dataset ordering.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use stresslens_core::Emotion;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("model declares {0} labels, expected {n}", n = Emotion::COUNT)]
    WrongCount(usize),

    #[error("label {0} appears more than once")]
    Duplicate(Emotion),

    #[error("id2label key {0:?} is not a valid index")]
    BadIndex(String),

    #[error("read {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("parse config.json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Emotion for each model output position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelOrder(Vec<Emotion>);

impl Default for LabelOrder {
    fn default() -> Self {
        Self(Emotion::ALL.to_vec())
    }
}

#[derive(Deserialize)]
struct ModelConfig {
    #[serde(default)]
    id2label: Option<HashMap<String, String>>,
}

impl LabelOrder {
    /// Validate an explicit ordering: all six labels, each exactly once.
    pub fn new(labels: Vec<Emotion>) -> Result<Self, LabelError> {
        if labels.len() != Emotion::COUNT {
            return Err(LabelError::WrongCount(labels.len()));
        }
        let mut seen = HashSet::new();
        for &label in &labels {
            if !seen.insert(label) {
                return Err(LabelError::Duplicate(label));
            }
        }
        Ok(Self(labels))
    }

    /// Read `config.json` from a model directory, if there is one.
    pub fn from_model_dir(model_dir: &Path) -> Result<Self, LabelError> {
        let path = model_dir.join("config.json");
        if !path.exists() {
            info!(dir = %model_dir.display(), "no config.json, using default label order");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| LabelError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_config_json(&raw)
    }

    /// Resolve the ordering from the text of a Hugging Face `config.json`.
    pub fn from_config_json(raw: &str) -> Result<Self, LabelError> {
        let config: ModelConfig = serde_json::from_str(raw)?;
        let Some(id2label) = config.id2label else {
            return Ok(Self::default());
        };
        if id2label.len() != Emotion::COUNT {
            return Err(LabelError::WrongCount(id2label.len()));
        }

        let mut slots: Vec<Option<Emotion>> = vec![None; Emotion::COUNT];
        for (key, name) in &id2label {
            let idx: usize = key
                .trim()
                .parse()
                .map_err(|_| LabelError::BadIndex(key.clone()))?;
            if idx >= Emotion::COUNT {
                return Err(LabelError::BadIndex(key.clone()));
            }
            match name.parse::<Emotion>() {
                Ok(emotion) => slots[idx] = Some(emotion),
                Err(_) => {
                    warn!(label = %name, "id2label uses non-emotion names, using default label order");
                    return Ok(Self::default());
                }
            }
        }

        // An index spelled twice ("0" and "00") leaves a hole; `new` reports it.
        let labels: Vec<Emotion> = slots.into_iter().flatten().collect();
        let order = Self::new(labels)?;
        info!(labels = ?order.0, "label order from config.json");
        Ok(order)
    }

    pub fn as_slice(&self) -> &[Emotion] {
        &self.0
    }
}
