use super::types::{
    EvalResult, EvaluateRequest, EvaluateResponse, GreetRequest, GreetResponse, ServeModelRequest,
    ServeModelResponse, Status, TrainRequest, TrainResponse,
};
use crate::service::InferenceService;
use crate::{Error, Result};
use axum::{extract::State, response::Json};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<InferenceService>,
}

/// Runs a blocking service operation on the blocking pool. Model loading
/// and inference hold the calling worker for their full duration.
async fn run_blocking<T, F>(state: &AppState, op: F) -> Result<T>
where
    F: FnOnce(&InferenceService) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || op(&service))
        .await
        .map_err(|e| Error::internal(format!("blocking task failed: {e}")))?
}

pub async fn greet(
    State(state): State<AppState>,
    Json(request): Json<GreetRequest>,
) -> Json<GreetResponse> {
    Json(GreetResponse {
        message: state.service.greet(&request.name),
    })
}

pub async fn train(
    State(state): State<AppState>,
    Json(request): Json<TrainRequest>,
) -> Json<TrainResponse> {
    let model = request.train_task.model;
    match run_blocking(&state, move |service| service.train(&model)).await {
        Ok(()) => {
            info!("Training model completed");
            Json(TrainResponse { status: Status::Ok })
        }
        Err(e) => {
            error!("Training model failed: {e}");
            Json(TrainResponse {
                status: Status::Error,
            })
        }
    }
}

pub async fn serve_model(
    State(state): State<AppState>,
    Json(request): Json<ServeModelRequest>,
) -> Json<ServeModelResponse> {
    let model = request.model;
    match run_blocking(&state, move |service| service.serve_model(&model)).await {
        Ok(()) => {
            info!("Serving model completed");
            Json(ServeModelResponse { status: Status::Ok })
        }
        Err(e) => {
            error!("Serving model failed: {e}");
            Json(ServeModelResponse {
                status: Status::Error,
            })
        }
    }
}

pub async fn evaluate(
    State(state): State<AppState>,
    Json(request): Json<EvaluateRequest>,
) -> Json<EvaluateResponse> {
    let inputs = request.inputs;
    info!("Received {} inputs for evaluation", inputs.len());

    match run_blocking(&state, move |service| service.evaluate(&inputs)).await {
        Ok(evaluation) => {
            info!("Evaluation completed");
            Json(EvaluateResponse {
                results: evaluation
                    .results
                    .into_iter()
                    .map(|r| EvalResult {
                        input: r.input,
                        output: r.output,
                    })
                    .collect(),
                metric: evaluation.metric,
                status: Status::Ok,
            })
        }
        Err(e) => {
            error!("Evaluating model failed: {e}");
            Json(EvaluateResponse {
                results: Vec::new(),
                metric: 0.0,
                status: Status::Error,
            })
        }
    }
}
