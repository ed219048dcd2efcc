//! Vertical card display for a journal analysis.
//!
//! Renders a [`PredictResponse`] as grouped, human-readable sections:
//! the overall result, the probability table, and the sentence breakdown.

use std::fmt::Write;

use stresslens_core::{EmotionScores, PredictResponse};

const BAR_WIDTH: usize = 24;

// ── Public API ──

/// Print an analysis as a vertical card.
pub fn print_card(resp: &PredictResponse) {
    print!("{}", render_card(resp));
}

/// Render an analysis as a vertical card.
pub fn render_card(resp: &PredictResponse) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== {} / {} stress ===", resp.primary_emotion, resp.stress_level);
    let _ = writeln!(out);

    let _ = writeln!(out, "Summary");
    let _ = writeln!(out, "  {:<18} {}", "primary_emotion", resp.primary_emotion);
    let _ = writeln!(out, "  {:<18} {}", "stress_level", resp.stress_level);
    if let Some(score) = resp.stress_score {
        let _ = writeln!(out, "  {:<18} {:.3}", "stress_score", score);
    }
    let _ = writeln!(out, "  {:<18} {}", "coping_strategy", resp.coping_strategy);
    let _ = writeln!(out);

    let _ = writeln!(out, "Scores");
    write_scores(&mut out, &resp.scores, "  ");

    if let Some(sentences) = &resp.sentence_breakdown
        && !sentences.is_empty()
    {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sentences");
        for (i, s) in sentences.iter().enumerate() {
            let score = s
                .stress_score
                .map(|v| format!(" {v:.2}"))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {:>2}. [{} / {}{}] {}",
                i + 1,
                s.emotion,
                s.stress_level,
                score,
                s.sentence
            );
        }
    }

    out
}

// ── Section rendering ──

fn write_scores(out: &mut String, scores: &EmotionScores, indent: &str) {
    for (emotion, p) in scores.iter() {
        let _ = writeln!(out, "{indent}{:<10} {:>6.3}  {}", emotion.as_str(), p, bar(p));
    }
}

fn bar(p: f32) -> String {
    let filled = (p.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize;
    "█".repeat(filled)
}
