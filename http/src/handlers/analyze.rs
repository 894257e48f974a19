use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use sentinel_application::{AnalyzeCallRequest, AnalyzeCallResponse};

use crate::error::HttpError;
use crate::SharedUseCase;

#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    pub session_id: Option<String>,
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn analyze_call(
    State(usecase): State<SharedUseCase>,
    Query(params): Query<AnalyzeParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<AnalyzeCallResponse>), HttpError> {
    tracing::info!(
        byte_count = body.len(),
        session_id = params.session_id.as_deref().unwrap_or("auto"),
        "received analyze request"
    );

    let request = AnalyzeCallRequest {
        audio: body.to_vec(),
        session_id: params.session_id,
    };

    match usecase.analyze(request).await {
        Ok(result) => {
            tracing::info!(
                session_id = %result.session_id,
                score = result.assessment.score,
                high_threat = result.assessment.high_threat,
                "analyze request completed"
            );
            Ok((StatusCode::OK, Json(result)))
        }
        Err(error) => {
            tracing::error!(error = %error, "analyze request failed");
            Err(HttpError::from(error))
        }
    }
}
