use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stresslens_ai::{AnalyzerConfig, DEFAULT_MAX_LENGTH};
use stresslens_core::StressMethod;

#[derive(Debug, Parser)]
#[command(
    name = "stresslens",
    version,
    about = "Detect emotion and stress level in journal text"
)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Run the HTTP API.
    Serve(Serve),
    /// Analyze a single journal entry and print the result.
    Predict(Predict),
}

#[derive(Debug, Clone, Args)]
pub(crate) struct Model {
    #[arg(
        long,
        env = "STRESSLENS_MODEL_DIR",
        default_value = "emotion_model_final",
        help = "Directory containing model.onnx, tokenizer.json and optionally config.json"
    )]
    pub(crate) model_dir: PathBuf,

    #[arg(
        long,
        env = "STRESSLENS_MAX_LENGTH",
        default_value_t = DEFAULT_MAX_LENGTH,
        help = "Truncate inputs to this many tokens"
    )]
    pub(crate) max_length: usize,

    #[arg(
        long,
        env = "STRESSLENS_STRESS_METHOD",
        default_value_t = StressMethod::Heuristic,
        help = "How to derive stress: 'heuristic' (weighted score) or 'table' (per-emotion mapping)"
    )]
    pub(crate) stress_method: StressMethod,

    #[arg(long, help = "Skip the per-sentence breakdown")]
    pub(crate) no_sentence_breakdown: bool,
}

impl Model {
    pub(crate) fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            stress_method: self.stress_method,
            sentence_breakdown: !self.no_sentence_breakdown,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct Serve {
    #[command(flatten)]
    pub(crate) model: Model,

    #[arg(long, env = "STRESSLENS_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub(crate) host: IpAddr,

    #[arg(short, long, env = "STRESSLENS_PORT", default_value_t = 8000)]
    pub(crate) port: u16,

    #[arg(
        long = "origin",
        env = "STRESSLENS_ORIGINS",
        value_delimiter = ',',
        help = "Allowed CORS origin; repeat or comma-separate. Defaults to the local frontend dev server"
    )]
    pub(crate) origins: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct Predict {
    #[command(flatten)]
    pub(crate) model: Model,

    #[arg(help = "Journal text; read from --file or stdin when omitted")]
    pub(crate) text: Option<String>,

    #[arg(short, long, conflicts_with = "text", help = "Read the journal text from a file")]
    pub(crate) file: Option<PathBuf>,

    #[arg(long, help = "Print the raw JSON response instead of a card")]
    pub(crate) json: bool,
}
