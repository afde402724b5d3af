use serde::{Deserialize, Serialize};

/// Where a failed operation broke down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A required field was blank; nothing was sent.
    Validation,
    /// The request never produced a usable response.
    Transport,
    /// The server answered with a non-2xx status.
    Server,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Transport => "transport",
            FailureKind::Server => "server",
        }
    }
}
