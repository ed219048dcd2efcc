use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stresslens_ai::{JournalAnalyzer, OnnxClassifier};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crate::opt::{Commands, Model, Predict, Serve};

mod display;
mod opt;

fn load_analyzer(model: &Model) -> anyhow::Result<JournalAnalyzer> {
    let classifier = OnnxClassifier::load(&model.model_dir, model.max_length)
        .with_context(|| format!("loading model from {}", model.model_dir.display()))?;
    let config = model.analyzer_config();
    tracing::info!(
        stress_method = %config.stress_method,
        sentence_breakdown = config.sentence_breakdown,
        "analyzer ready"
    );
    Ok(JournalAnalyzer::new(Box::new(classifier), config))
}

async fn serve(opt: Serve) -> anyhow::Result<()> {
    let analyzer = Arc::new(load_analyzer(&opt.model)?);

    let origins = if opt.origins.is_empty() {
        stresslens_server::DEFAULT_ORIGINS
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        opt.origins
    };

    let app = stresslens_server::create_app(analyzer, &origins)?;
    let listener = TcpListener::bind((opt.host, opt.port))
        .await
        .with_context(|| format!("binding {}:{}", opt.host, opt.port))?;
    stresslens_server::serve(listener, app).await
}

fn predict(opt: Predict) -> anyhow::Result<()> {
    let text = match (&opt.text, &opt.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading journal text from stdin")?;
            buf
        }
    };

    let analyzer = load_analyzer(&opt.model)?;
    let response = analyzer.analyze(&text)?;

    if opt.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        display::print_card(&response);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("stresslens v{}", env!("CARGO_PKG_VERSION"));

    let cli = opt::Cli::parse();
    match cli.command {
        Commands::Serve(o) => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(serve(o)),
        Commands::Predict(o) => predict(o),
    }
}
