//! Sentiment scoring and three-way classification.
//!
//! Scoring uses the VADER lexicon and rules through the `vader_sentiment` crate: word
//! valences adjusted by boosters, nearby negation, a contrastive "but" and punctuation
//! emphasis, squashed into a compound score in [-1, 1].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::error::ScoreError;

/// Compound score at or beyond which a comment stops being neutral.
pub const POLARITY_THRESHOLD: f64 = 0.05;

/// Auxiliary proportions are reported alongside the compound score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarityScores {
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

pub trait PolarityScorer: Send + Sync {
    fn polarity_scores(&self, text: &str) -> PolarityScores;
}

/// Scorer over the full VADER lexicon. The lexicon tables are process-wide statics
/// owned by the crate; this type only borrows them, so one instance is shared by
/// every request.
#[derive(Debug, Clone, Copy)]
pub struct VaderScorer {
    _private: (),
}

impl VaderScorer {
    /// Loads the lexicon tables up front so the first request does not pay for it.
    pub fn new() -> Self {
        let scorer = Self { _private: () };
        let warmup = scorer.polarity_scores("good");
        info!("🧠 VADER lexicon loaded (\"good\" scores {:.3})", warmup.compound);
        scorer
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for VaderScorer {
    fn polarity_scores(&self, text: &str) -> PolarityScores {
        let analyzer = SentimentIntensityAnalyzer::new();
        let scores = analyzer.polarity_scores(text);
        let get = |key: &str| scores.get(key).copied().unwrap_or(0.0);
        PolarityScores {
            compound: get("compound"),
            positive: get("pos"),
            negative: get("neg"),
            neutral: get("neu"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// `>= 0.05` is positive, `<= -0.05` negative, anything strictly between is neutral.
    pub fn from_compound(score: f64) -> Self {
        if score >= POLARITY_THRESHOLD {
            SentimentLabel::Positive
        } else if score <= -POLARITY_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "Positive"),
            SentimentLabel::Neutral => write!(f, "Neutral"),
            SentimentLabel::Negative => write!(f, "Negative"),
        }
    }
}

/// Maps cleaned, translated text to a [`SentimentLabel`].
#[derive(Clone)]
pub struct SentimentClassifier {
    scorer: Arc<dyn PolarityScorer>,
}

impl SentimentClassifier {
    pub fn new(scorer: Arc<dyn PolarityScorer>) -> Self {
        Self { scorer }
    }

    /// Blank text is not classified at all and yields `Ok(None)`.
    pub fn classify(&self, text: &str) -> Result<Option<SentimentLabel>, ScoreError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let scores = self.scorer.polarity_scores(text);
        let score = scores.compound;
        if !score.is_finite() {
            return Err(ScoreError {
                score,
                text: text.to_string(),
            });
        }
        let label = SentimentLabel::from_compound(score);
        debug!(
            "[Sentiment] {} compound={:.3} pos={:.2} neg={:.2} neu={:.2}",
            label, score, scores.positive, scores.negative, scores.neutral
        );
        Ok(Some(label))
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(Arc::new(VaderScorer::new()))
    }
}
