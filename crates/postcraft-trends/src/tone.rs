//! Lexicon tone classifier for professional-network posts.

use postcraft_core::Tone;

/// Scores above this are positive, below its negation negative.
pub const TONE_THRESHOLD: f32 = 0.3;

/// Assigns a [`Tone`] to post text.
pub trait ToneClassifier: Send + Sync {
    fn classify_tone(&self, text: &str) -> Tone;
}

/// Word weights. Keys are lowercase single words; the summed score is
/// clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("excited", 0.5),
    ("thrilled", 0.5),
    ("proud", 0.4),
    ("grateful", 0.4),
    ("thankful", 0.4),
    ("congrats", 0.4),
    ("congratulations", 0.4),
    ("love", 0.4),
    ("amazing", 0.4),
    ("great", 0.3),
    ("awesome", 0.4),
    ("incredible", 0.4),
    ("win", 0.3),
    ("wins", 0.3),
    ("success", 0.3),
    ("growth", 0.2),
    ("opportunity", 0.2),
    ("best", 0.3),
    ("happy", 0.4),
    ("celebrate", 0.4),
    ("milestone", 0.3),
    ("launch", 0.2),
    ("launched", 0.2),
    ("breakthrough", 0.4),
    ("record", 0.2),
    // Negative signals
    ("failed", -0.4),
    ("failure", -0.4),
    ("mistake", -0.3),
    ("mistakes", -0.3),
    ("wrong", -0.3),
    ("bad", -0.3),
    ("worst", -0.5),
    ("terrible", -0.5),
    ("problem", -0.2),
    ("struggle", -0.3),
    ("struggling", -0.3),
    ("layoffs", -0.5),
    ("lost", -0.3),
    ("waste", -0.4),
    ("wasted", -0.4),
    ("broken", -0.4),
    ("hard", -0.2),
    ("burnout", -0.5),
    ("decline", -0.3),
    ("scam", -0.6),
];

/// Sums lexicon weights over the words in `text`, clamped to `[-1.0, 1.0]`.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let score: f32 = text
        .split_whitespace()
        .filter_map(|word| {
            let w = word
                .trim_matches(|c: char| !c.is_alphabetic())
                .to_lowercase();
            LEXICON
                .iter()
                .find(|(lex_word, _)| *lex_word == w)
                .map(|&(_, weight)| weight)
        })
        .sum();
    score.clamp(-1.0, 1.0)
}

#[must_use]
pub fn tone_for_score(score: f32) -> Tone {
    if score > TONE_THRESHOLD {
        Tone::Positive
    } else if score < -TONE_THRESHOLD {
        Tone::Negative
    } else {
        Tone::Neutral
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconToneClassifier;

impl ToneClassifier for LexiconToneClassifier {
    fn classify_tone(&self, text: &str) -> Tone {
        tone_for_score(lexicon_score(text))
    }
}
