use shared::{domain::DraftField, error::FailureKind};
use thiserror::Error;

/// The three requests the controller issues against the collection resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Delete,
}

impl Operation {
    pub fn method(self) -> &'static str {
        match self {
            Operation::List => "GET",
            Operation::Create => "POST",
            Operation::Delete => "DELETE",
        }
    }

    /// Fixed pointer at the misconfiguration that usually causes this operation to fail.
    pub fn hint(self) -> &'static str {
        match self {
            Operation::List => "Cannot load users. Check backend is running and CORS is enabled.",
            Operation::Create => "Cannot add user. Check backend POST endpoint and CORS.",
            Operation::Delete => "Cannot delete user. Check backend DELETE endpoint.",
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Please fill Name, Email, City.")]
    Validation { missing: Vec<DraftField> },
    #[error("{} {} failed: {source}", .operation.hint(), .operation.method())]
    Transport {
        operation: Operation,
        source: TransportError,
    },
    #[error(
        "{} {} failed: {status}{}",
        .operation.hint(),
        .operation.method(),
        body_suffix(.body)
    )]
    Server {
        operation: Operation,
        status: u16,
        body: String,
    },
}

impl SyncError {
    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::Validation { .. } => FailureKind::Validation,
            SyncError::Transport { .. } => FailureKind::Transport,
            SyncError::Server { .. } => FailureKind::Server,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            SyncError::Validation { .. } => Operation::Create,
            SyncError::Transport { operation, .. } | SyncError::Server { operation, .. } => {
                *operation
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(" {body}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_names_status_and_body() {
        let err = SyncError::Server {
            operation: Operation::Create,
            status: 500,
            body: "db down\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot add user. Check backend POST endpoint and CORS. POST failed: 500 db down"
        );
        assert_eq!(err.kind(), FailureKind::Server);
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn server_error_without_body_has_no_trailing_space() {
        let err = SyncError::Server {
            operation: Operation::Delete,
            status: 404,
            body: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete user. Check backend DELETE endpoint. DELETE failed: 404"
        );
    }

    #[test]
    fn transport_error_carries_hint_and_cause() {
        let err = SyncError::Transport {
            operation: Operation::List,
            source: TransportError::InvalidEndpoint("'localhost:5000': expected an http(s) base url".into()),
        };
        let message = err.to_string();
        assert!(message.starts_with("Cannot load users."));
        assert!(message.ends_with("GET failed: invalid endpoint: 'localhost:5000': expected an http(s) base url"));
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn validation_error_is_attributed_to_create() {
        let err = SyncError::Validation {
            missing: vec![DraftField::City],
        };
        assert_eq!(err.to_string(), "Please fill Name, Email, City.");
        assert_eq!(err.operation(), Operation::Create);
        assert_eq!(err.kind(), FailureKind::Validation);
    }
}
