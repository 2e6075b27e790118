use std::fmt::{Debug, Formatter};

use actix_web::{http::StatusCode, HttpResponse, HttpResponseBuilder};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/user/register` and `POST /api/user/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

// Keeps passwords out of any log line that formats a request body.
impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("login", &self.login).field("password", &"****").finish()
    }
}

/// `{"error": "..."}` with the given status.
pub fn error_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponseBuilder::new(status).json(serde_json::json!({ "error": message }))
}

/// `{"message": "..."}` with the given status.
pub fn message_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponseBuilder::new(status).json(serde_json::json!({ "message": message }))
}
