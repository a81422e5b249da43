use std::sync::Arc;

use {
    axum::{Json, body::Bytes, extract::State, response::IntoResponse},
    chatlog_sessions::{BufferRequest, FlushOutcome},
    serde::{Deserialize, de::DeserializeOwned},
    serde_json::{Value, json},
    tracing::error,
};

use crate::{error::ApiError, state::GatewayState};

/// Body of `POST /log/flush`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushRequest {
    pub session_id: Option<String>,
}

/// Decode a JSON body; an empty body decodes as `T::default()`.
fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
}

pub async fn health_handler(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": state.version,
        "backend": state.backend,
    }))
}

pub async fn buffer_handler(
    State(state): State<Arc<GatewayState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let req: BufferRequest = parse_body(&body)?;
    let meta = state.writer.append(req).await.map_err(|e| {
        if !e.is_validation() {
            error!(error = %e, "buffer log error");
        }
        ApiError::from(e)
    })?;
    Ok(Json(json!({ "ok": true, "path": meta.path })))
}

pub async fn flush_handler(
    State(state): State<Arc<GatewayState>>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let req: FlushRequest = parse_body(&body)?;
    let outcome = state
        .merger
        .flush(req.session_id.as_deref())
        .await
        .map_err(|e| {
            error!(error = %e, "flush log error");
            ApiError::from(e)
        })?;

    Ok(Json(match outcome {
        FlushOutcome::NothingToFlush => json!({ "ok": true, "message": "no buffer to flush" }),
        FlushOutcome::Exported(report) => json!({ "ok": true, "path": report.export.path }),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_decodes_as_default() {
        let req: FlushRequest = parse_body(b"").unwrap();
        assert!(req.session_id.is_none());
        let req: FlushRequest = parse_body(b"  \n").unwrap();
        assert!(req.session_id.is_none());
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = parse_body::<FlushRequest>(b"{nope").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn decodes_session_id() {
        let req: FlushRequest = parse_body(br#"{"sessionId":"abc"}"#).unwrap();
        assert_eq!(req.session_id.as_deref(), Some("abc"));
    }
}
