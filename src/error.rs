use thiserror::Error;

use crate::lifecycle::{ActionType, OccurrenceStatus};

#[derive(Debug, Error)]
pub enum EscolaFlowError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid transition: {action} is not allowed while the occurrence is {from}")]
    InvalidTransition {
        from: OccurrenceStatus,
        action: ActionType,
    },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("corrupt stored value: {0}")]
    Corrupt(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl EscolaFlowError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EscolaFlowError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True for the failures that end a request because of what the caller
    /// asked for, as opposed to infrastructure trouble.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EscolaFlowError::NotFound { .. }
                | EscolaFlowError::InvalidTransition { .. }
                | EscolaFlowError::Unauthorized(_)
                | EscolaFlowError::Validation(_)
        )
    }
}

pub type Result<T, E = EscolaFlowError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_display() {
        let err = EscolaFlowError::InvalidTransition {
            from: OccurrenceStatus::Concluded,
            action: ActionType::Resolution,
        };
        assert_eq!(
            err.to_string(),
            "invalid transition: resolution is not allowed while the occurrence is CONCLUDED"
        );
    }

    #[test]
    fn not_found_display() {
        let err = EscolaFlowError::not_found("occurrence", "abc");
        assert_eq!(err.to_string(), "occurrence not found: abc");
    }

    #[test]
    fn terminal_classification() {
        assert!(EscolaFlowError::Validation("empty".into()).is_terminal());
        assert!(EscolaFlowError::Unauthorized("nope".into()).is_terminal());
        assert!(!EscolaFlowError::CollaboratorUnavailable("gemini".into()).is_terminal());
        assert!(!EscolaFlowError::Config("bad".into()).is_terminal());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EscolaFlowError>();
    }
}
