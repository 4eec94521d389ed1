use super::{BackendContext, ModelBackend};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// The black-box text predictor behind the backend: a batch of cleaned
/// texts in, one emotion label per text out, in the same order.
pub trait TextClassifier: Send + Sync {
    fn classify(&self, texts: &[String]) -> Result<Vec<String>>;
}

/// Emotion labels in rank order; ties go to the earliest entry.
const LABELS: [&str; 6] = ["sadness", "joy", "love", "anger", "fear", "surprise"];

const LEXICON: [(&str, &[&str]); 6] = [
    (
        "sadness",
        &[
            "sad", "unhappy", "miserable", "depressed", "down", "crying", "grief", "lonely",
            "hopeless", "hurt", "gloomy",
        ],
    ),
    (
        "joy",
        &[
            "happy", "glad", "joyful", "delighted", "great", "wonderful", "excited", "cheerful",
            "pleased", "amazing", "fantastic",
        ],
    ),
    (
        "love",
        &[
            "love", "loving", "adore", "caring", "affection", "sweetheart", "darling", "fond",
            "cherish", "devoted",
        ],
    ),
    (
        "anger",
        &[
            "angry", "mad", "furious", "annoyed", "outraged", "irritated", "hate", "resentful",
            "rage", "livid",
        ],
    ),
    (
        "fear",
        &[
            "afraid", "scared", "terrified", "anxious", "nervous", "worried", "frightened",
            "panic", "dread", "uneasy",
        ],
    ),
    (
        "surprise",
        &[
            "surprised", "shocked", "astonished", "amazed", "stunned", "unexpected", "startled",
            "speechless",
        ],
    ),
];

/// Built-in predictor: keyword-lexicon scoring over the six emotion
/// labels. The label with the most keyword hits wins; with no hits at all
/// the first-ranked label is returned.
#[derive(Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    fn score(text: &str) -> &'static str {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .collect();

        let mut best: Option<(&'static str, usize)> = None;
        for (label, keywords) in LEXICON {
            let hits = words
                .iter()
                .filter(|w| keywords.contains(&w.as_str()))
                .count();
            // Strict comparison keeps the first-ranked label on ties.
            if best.is_none_or(|(_, b)| hits > b) {
                best = Some((label, hits));
            }
        }
        best.map(|(label, _)| label).unwrap_or(LABELS[0])
    }
}

impl TextClassifier for LexiconClassifier {
    fn classify(&self, texts: &[String]) -> Result<Vec<String>> {
        Ok(texts.iter().map(|t| Self::score(t).to_string()).collect())
    }
}

/// Text-classification backend: `"<text>;<label>"` payload in, emotion
/// label out, ground truth taken from the second segment.
pub struct TextBackend {
    classifier: Arc<dyn TextClassifier>,
}

impl TextBackend {
    pub const NAME: &'static str = "emotion";

    pub fn with_classifier(classifier: Arc<dyn TextClassifier>) -> Self {
        Self { classifier }
    }
}

impl ModelBackend for TextBackend {
    type Parsed = String;

    fn load_pretrained_model(_ctx: &BackendContext) -> Result<Self> {
        debug!("Loaded lexicon text model with {} labels", LABELS.len());
        Ok(Self::with_classifier(Arc::new(LexiconClassifier::new())))
    }

    /// Takes the text to classify from the first `;`-segment. A payload
    /// without a label segment still parses; the missing label is caught
    /// at metric time.
    fn parse_input(&self, raw: &str) -> Result<String> {
        let text = raw.split(';').next().unwrap_or(raw);
        Ok(text.to_string())
    }

    fn forward(&self, inputs: Vec<String>) -> Result<Vec<String>> {
        self.classifier.classify(&inputs)
    }

    /// The expected label is the second `;`-segment, whitespace-trimmed,
    /// compared case-sensitively to the prediction.
    fn get_metrics(&self, output: &str, raw: &str) -> Result<f64> {
        let label = raw
            .split(';')
            .nth(1)
            .ok_or_else(|| {
                Error::metric_format(format!("input {raw:?} is missing the \";<label>\" segment"))
            })?
            .trim();
        Ok(if output == label { 1.0 } else { 0.0 })
    }
}
