use crate::model::{BackendRegistry, ModelService};
use crate::{Error, Result};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// One evaluated item: the raw input paired with its stringified
/// prediction, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalResult {
    pub input: String,
    pub output: String,
}

/// Outcome of one Evaluate call: ordered results plus the aggregate
/// metric (exact sum of per-item metrics).
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub results: Vec<EvalResult>,
    pub metric: f64,
}

/// RPC-facing orchestrator. Holds at most one active backend; operations
/// are synchronous and blocking, callers are expected to run them on a
/// blocking worker.
///
/// The active slot follows snapshot semantics: `evaluate` clones the
/// backend reference out of the slot before running, so an in-flight call
/// keeps the backend it started with even if `serve_model` concurrently
/// installs a new one.
pub struct InferenceService {
    registry: BackendRegistry,
    active: RwLock<Option<Arc<dyn ModelService>>>,
}

impl InferenceService {
    pub fn new(registry: BackendRegistry) -> Self {
        Self {
            registry,
            active: RwLock::new(None),
        }
    }

    pub fn greet(&self, name: &str) -> String {
        format!("Hello, {name}!")
    }

    /// Constructs a backend purely to verify it loads, then discards it.
    /// Never touches the active slot.
    pub fn train(&self, model: &str) -> Result<()> {
        self.registry.resolve(model).map(drop)
    }

    /// Constructs a backend and installs it as the active one, replacing
    /// any previous backend. On resolution failure the slot is left
    /// untouched.
    pub fn serve_model(&self, model: &str) -> Result<()> {
        let backend = self.registry.resolve(model)?;
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = Some(backend);
        info!("Now serving model {model}");
        Ok(())
    }

    /// Runs the inference pipeline over the batch with the active backend.
    pub fn evaluate(&self, inputs: &[String]) -> Result<Evaluation> {
        let backend = self.active_backend().ok_or(Error::NoActiveModel)?;

        debug!("Evaluating a batch of {} inputs", inputs.len());
        let (outputs, metrics) = backend.inference(inputs)?;

        let metric = metrics.iter().sum();
        let results = inputs
            .iter()
            .zip(outputs)
            .map(|(input, output)| EvalResult {
                input: input.clone(),
                output,
            })
            .collect();

        Ok(Evaluation { results, metric })
    }

    pub fn has_active_model(&self) -> bool {
        self.active_backend().is_some()
    }

    fn active_backend(&self) -> Option<Arc<dyn ModelService>> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
