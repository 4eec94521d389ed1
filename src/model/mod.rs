pub mod image;
pub mod labels;
pub mod text;

pub use self::image::ImageBackend;
pub use self::labels::LabelTable;
pub use self::text::TextBackend;

use crate::config::ModelsConfig;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Everything a backend may need while loading its predictor.
#[derive(Clone)]
pub struct BackendContext {
    pub models: ModelsConfig,
    pub labels: Arc<LabelTable>,
}

/// The four-stage contract every classification backend implements.
///
/// `inference` (on [`ModelService`]) drives these stages in a fixed order;
/// backends only supply the modality-specific pieces. The stage methods
/// default to failing with [`Error::NotImplemented`], so a backend that
/// forgets one fails loudly at call time instead of misbehaving.
pub trait ModelBackend: Send + Sync {
    /// Decoded form of one raw input, scoped to a single inference call.
    type Parsed: Send;

    /// Constructs the backend, loading its underlying predictor(s).
    ///
    /// Errors here (weights unavailable, bad label table) surface as
    /// construction failure and must not be swallowed.
    fn load_pretrained_model(ctx: &BackendContext) -> Result<Self>
    where
        Self: Sized,
    {
        let _ = ctx;
        Err(Error::NotImplemented("load_pretrained_model"))
    }

    /// Decodes one raw item into the form the predictor accepts.
    fn parse_input(&self, raw: &str) -> Result<Self::Parsed> {
        let _ = raw;
        Err(Error::NotImplemented("parse_input"))
    }

    /// Batched prediction. Output order and length must match the input.
    fn forward(&self, inputs: Vec<Self::Parsed>) -> Result<Vec<String>> {
        let _ = inputs;
        Err(Error::NotImplemented("forward"))
    }

    /// Compares one prediction against the ground truth embedded in the
    /// raw input it was produced from.
    fn get_metrics(&self, output: &str, raw: &str) -> Result<f64> {
        let _ = (output, raw);
        Err(Error::NotImplemented("get_metrics"))
    }
}

/// Object-safe surface the orchestrator holds: one batch in, predictions
/// and per-item metrics out.
pub trait ModelService: Send + Sync {
    fn inference(&self, raw_inputs: &[String]) -> Result<(Vec<String>, Vec<f64>)>;
}

/// The fixed pipeline shared by all backends: parse every item, forward the
/// full batch once, pair each output positionally with its raw input for the
/// metric. Any per-item failure fails the whole batch; there is no partial
/// result.
impl<B: ModelBackend> ModelService for B {
    fn inference(&self, raw_inputs: &[String]) -> Result<(Vec<String>, Vec<f64>)> {
        let inputs = raw_inputs
            .iter()
            .map(|raw| self.parse_input(raw))
            .collect::<Result<Vec<_>>>()?;

        let outputs = self.forward(inputs)?;
        if outputs.len() != raw_inputs.len() {
            return Err(Error::prediction(format!(
                "predictor returned {} outputs for {} inputs",
                outputs.len(),
                raw_inputs.len()
            )));
        }

        let metrics = outputs
            .iter()
            .zip(raw_inputs)
            .map(|(output, raw)| self.get_metrics(output, raw))
            .collect::<Result<Vec<_>>>()?;

        Ok((outputs, metrics))
    }
}

type BackendCtor = Box<dyn Fn(&BackendContext) -> Result<Arc<dyn ModelService>> + Send + Sync>;

/// Maps stable model-name tokens to backend constructors.
///
/// Adding a backend means registering a constructor under a new token;
/// resolution never falls through to a default.
pub struct BackendRegistry {
    ctx: BackendContext,
    backends: HashMap<&'static str, BackendCtor>,
}

impl BackendRegistry {
    pub fn new(ctx: BackendContext) -> Self {
        Self {
            ctx,
            backends: HashMap::new(),
        }
    }

    /// Registers both built-in backend families.
    pub fn with_default_backends(ctx: BackendContext) -> Self {
        let mut registry = Self::new(ctx);
        registry.register(ImageBackend::NAME, |ctx| {
            Ok(Arc::new(ImageBackend::load_pretrained_model(ctx)?))
        });
        registry.register(TextBackend::NAME, |ctx| {
            Ok(Arc::new(TextBackend::load_pretrained_model(ctx)?))
        });
        registry
    }

    pub fn register(
        &mut self,
        name: &'static str,
        ctor: impl Fn(&BackendContext) -> Result<Arc<dyn ModelService>> + Send + Sync + 'static,
    ) {
        self.backends.insert(name, Box::new(ctor));
    }

    /// Constructs a fresh backend for the given model name. Construction
    /// loads the underlying predictor and may be slow.
    pub fn resolve(&self, model: &str) -> Result<Arc<dyn ModelService>> {
        let ctor = self
            .backends
            .get(model)
            .ok_or_else(|| Error::UnknownModelType(model.to_string()))?;

        info!("Starting {} model service", model);
        ctor(&self.ctx)
    }

    pub fn model_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.backends.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
