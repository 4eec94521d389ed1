use inferd::model::text::TextClassifier;
use inferd::{Error, Result};
use std::sync::Mutex;

/// Text classifier that replays scripted labels and records every batch
/// it was asked to classify.
pub struct ScriptedTextClassifier {
    outputs: Vec<String>,
    error: Option<String>,
    requests: Mutex<Vec<Vec<String>>>,
}

impl ScriptedTextClassifier {
    pub fn new(outputs: &[&str]) -> Self {
        Self {
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
            error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outputs: Vec::new(),
            error: Some(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_batches(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

impl TextClassifier for ScriptedTextClassifier {
    fn classify(&self, texts: &[String]) -> Result<Vec<String>> {
        self.requests.lock().unwrap().push(texts.to_vec());
        if let Some(message) = &self.error {
            return Err(Error::prediction(message.clone()));
        }
        Ok(self.outputs.clone())
    }
}
