use serde::{Deserialize, Serialize};

/// Two-valued response status. Failure causes are logged server-side and
/// are deliberately not part of the response contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GreetRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GreetResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrainTask {
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrainRequest {
    pub train_task: TrainTask,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrainResponse {
    pub status: Status,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServeModelRequest {
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServeModelResponse {
    pub status: Status,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub inputs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EvalResult {
    pub input: String,
    pub output: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub results: Vec<EvalResult>,
    pub metric: f64,
    pub status: Status,
}
