use serde::{Deserialize, Serialize};

use crate::domain::Draft;

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

pub fn users_route() -> &'static str {
    "/api/users"
}

/// Body of `POST /api/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub city: String,
}

impl From<&Draft> for CreateUserRequest {
    fn from(draft: &Draft) -> Self {
        Self {
            name: draft.name.clone(),
            email: draft.email.clone(),
            city: draft.city.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_keeps_draft_values_as_typed() {
        let draft = Draft::new(" Senthil ", "senthil@gmail.com", "Ayodhya");
        let body = serde_json::to_value(CreateUserRequest::from(&draft)).expect("serialize");
        assert_eq!(
            body,
            serde_json::json!({
                "name": " Senthil ",
                "email": "senthil@gmail.com",
                "city": "Ayodhya",
            })
        );
    }
}
