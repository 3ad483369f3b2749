use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors surfaced by the game engine.
///
/// `Rule` is the only variant callers should branch on: it covers every
/// expected business failure (unknown game, wrong phase, unauthorized actor,
/// invalid settings). `Internal` marks a broken invariant, e.g. a phase that
/// claims an active round while none exists.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{0}")]
    Rule(String),

    #[error("internal state error: {0}")]
    Internal(String),
}

impl GameError {
    pub fn rule(message: impl Into<String>) -> Self {
        Self::Rule(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_rule_violation(&self) -> bool {
        matches!(self, Self::Rule(_))
    }
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match &self {
            GameError::Rule(_) => StatusCode::BAD_REQUEST,
            GameError::Internal(message) => {
                tracing::error!("internal game state error: {message}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_error_carries_plain_message() {
        let err = GameError::rule("Game not found.");
        assert!(err.is_rule_violation());
        assert_eq!(err.to_string(), "Game not found.");
    }

    #[test]
    fn internal_error_is_not_a_rule_violation() {
        let err = GameError::internal("round missing");
        assert!(!err.is_rule_violation());
    }
}
