use {
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
    chatlog_sessions::LogError,
    serde::Serialize,
};

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl From<LogError> for ApiError {
    fn from(err: LogError) -> Self {
        match err {
            LogError::Validation(msg) => Self::BadRequest(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[cfg(test)]
mod tests {
    use {super::*, chatlog_blob::StoreError};

    #[test]
    fn maps_log_errors_to_status() {
        let bad = ApiError::from(LogError::Validation("role and content required".into()));
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let internal = ApiError::from(LogError::Storage(StoreError::Backend("down".into())));
        assert_eq!(internal.to_string(), "down");
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
