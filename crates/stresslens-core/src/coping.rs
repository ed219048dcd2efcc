//! Canned coping suggestions keyed by stress level and emotion.

use crate::emotion::Emotion;
use crate::scoring::StressLevel;

/// Pick a coping strategy. Emotions without a dedicated entry (love,
/// surprise) fall back to the level's default.
pub fn coping_strategy(level: StressLevel, emotion: Emotion) -> &'static str {
    use Emotion::*;
    use StressLevel::*;

    match (level, emotion) {
        (Low, Joy) => "Celebrate this moment and write down one thing you're grateful for.",
        (Low, Sadness) => "Be kind to yourself. Drink some water or stretch for a minute.",
        (Low, Anger) => "Take 3 deep breaths: inhale for 4, hold for 4, exhale for 6.",
        (Low, Fear) => "Name one thing that feels safe or comforting right now.",
        (Low, Love | Surprise) => "Take a slow, deep breath and acknowledge your feelings gently.",

        (Medium, Joy) => "Notice what went well today and how it made you feel.",
        (Medium, Sadness) => {
            "Try writing a short note to yourself like you’re a supportive friend."
        }
        (Medium, Anger) => "Relax your shoulders and jaw, then breathe slowly.",
        (Medium, Fear) => "Try the 5-4-3-2-1 grounding technique.",
        (Medium, Love | Surprise) => {
            "Take a short walk or change your physical environment briefly."
        }

        (High, Joy) => "Hold onto the positive moment—you earned this feeling.",
        (High, Sadness) => "Reach out to someone you trust if possible.",
        (High, Anger) => "Pause and take 10 slow breaths. Imagine tension leaving your body.",
        (High, Fear) => "Put both feet on the ground and feel the support beneath you.",
        (High, Love | Surprise) => {
            "Your feelings are valid. Focus on slow breathing: in 4, hold 4, out 6."
        }
    }
}
