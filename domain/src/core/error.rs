//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("AI assistant is disabled")]
    AiDisabled,

    #[error("Model server URL is empty")]
    EmptyServerUrl,

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

impl DomainError {
    /// Check if this error is a caller-side configuration problem
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DomainError::AiDisabled | DomainError::EmptyServerUrl | DomainError::InvalidModel(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors() {
        assert!(DomainError::AiDisabled.is_configuration());
        assert!(DomainError::EmptyServerUrl.is_configuration());
        assert!(DomainError::InvalidModel(String::new()).is_configuration());
        assert!(
            !DomainError::InvalidTransition {
                from: "idle",
                to: "completed"
            }
            .is_configuration()
        );
    }

    #[test]
    fn test_invalid_transition_display() {
        let error = DomainError::InvalidTransition {
            from: "completed",
            to: "streaming",
        };
        assert_eq!(
            error.to_string(),
            "Invalid session transition: completed -> streaming"
        );
    }
}
