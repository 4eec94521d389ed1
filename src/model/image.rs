use super::labels::LabelTable;
use super::{BackendContext, ModelBackend};
use crate::{Error, Result};
use image::RgbImage;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// The black-box image predictor behind the backend: a batch of decoded
/// images in, one class label per image out, in the same order.
pub trait ImageClassifier: Send + Sync {
    fn classify(&self, images: &[RgbImage]) -> Result<Vec<String>>;
}

/// Built-in predictor: nearest-prototype classification on mean-RGB
/// features, with per-label prototypes loaded from a JSON weights file.
pub struct PrototypeClassifier {
    // Ranked: ties go to the earliest entry.
    prototypes: Vec<(String, [f64; 3])>,
}

#[derive(Deserialize)]
#[serde(transparent)]
struct PrototypeFile {
    prototypes: BTreeMap<String, [f64; 3]>,
}

impl PrototypeClassifier {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "cannot read image model weights {}: {}",
                path.display(),
                e
            ))
        })?;
        let file: PrototypeFile = serde_json::from_str(&raw)?;

        if file.prototypes.is_empty() {
            return Err(Error::config(format!(
                "image model weights {} contain no prototypes",
                path.display()
            )));
        }

        Ok(Self {
            prototypes: file.prototypes.into_iter().collect(),
        })
    }

    fn features(image: &RgbImage) -> [f64; 3] {
        let mut sums = [0.0f64; 3];
        for pixel in image.pixels() {
            sums[0] += pixel.0[0] as f64;
            sums[1] += pixel.0[1] as f64;
            sums[2] += pixel.0[2] as f64;
        }
        let count = (image.width() as f64 * image.height() as f64).max(1.0);
        [sums[0] / count, sums[1] / count, sums[2] / count]
    }
}

impl ImageClassifier for PrototypeClassifier {
    fn classify(&self, images: &[RgbImage]) -> Result<Vec<String>> {
        images
            .iter()
            .map(|image| {
                let features = Self::features(image);
                let mut best: Option<(&str, f64)> = None;
                for (label, prototype) in &self.prototypes {
                    let distance = features
                        .iter()
                        .zip(prototype)
                        .map(|(f, p)| (f - p) * (f - p))
                        .sum::<f64>();
                    // Strict comparison keeps the first-ranked label on ties.
                    if best.is_none_or(|(_, d)| distance < d) {
                        best = Some((label, distance));
                    }
                }
                best.map(|(label, _)| label.to_string())
                    .ok_or_else(|| Error::prediction("image classifier has no prototypes"))
            })
            .collect()
    }
}

/// Image-classification backend: file path in, class label out, ground
/// truth taken from a token in the file name.
pub struct ImageBackend {
    classifier: Box<dyn ImageClassifier>,
    labels: Arc<LabelTable>,
}

impl ImageBackend {
    pub const NAME: &'static str = "imagenet";

    pub fn with_classifier(classifier: Box<dyn ImageClassifier>, labels: Arc<LabelTable>) -> Self {
        Self { classifier, labels }
    }
}

impl ModelBackend for ImageBackend {
    type Parsed = RgbImage;

    fn load_pretrained_model(ctx: &BackendContext) -> Result<Self> {
        let classifier = PrototypeClassifier::load(&ctx.models.image_weights_path)?;
        debug!(
            "Loaded image model with {} prototypes",
            classifier.prototypes.len()
        );
        Ok(Self::with_classifier(
            Box::new(classifier),
            ctx.labels.clone(),
        ))
    }

    /// Decodes the file at `raw` into a 3-channel RGB image.
    fn parse_input(&self, raw: &str) -> Result<RgbImage> {
        let image = image::open(raw)
            .map_err(|e| Error::parse(format!("cannot decode image {raw:?}: {e}")))?;
        Ok(image.to_rgb8())
    }

    fn forward(&self, inputs: Vec<RgbImage>) -> Result<Vec<String>> {
        self.classifier.classify(&inputs)
    }

    /// The expected label is the file-name token after the last `_` and
    /// before the extension; both it and the prediction resolve through the
    /// label table and match on identifier.
    fn get_metrics(&self, output: &str, raw: &str) -> Result<f64> {
        let expected = self.labels.id(ground_truth_token(raw)?)?;
        let predicted = self.labels.id(output)?;
        Ok(if predicted == expected { 1.0 } else { 0.0 })
    }
}

fn ground_truth_token(raw: &str) -> Result<&str> {
    let tail = raw.rsplit('_').next().unwrap_or(raw);
    let token = tail.split('.').next().unwrap_or(tail);
    if token.is_empty() {
        return Err(Error::metric_format(format!(
            "file name {raw:?} carries no label token"
        )));
    }
    Ok(token)
}
