//! services/client/src/adapters/protocol.rs
//!
//! Defines the JSON bodies exchanged with the language-learning backend.

use serde::{Deserialize, Deserializer, Serialize};

//=========================================================================================
// Request Bodies (Client -> Backend)
//=========================================================================================

#[derive(Serialize, Debug)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize, Debug)]
pub struct StartSessionRequest<'a> {
    pub target_lang: &'a str,
    pub source_lang: &'a str,
    pub level: &'a str,
}

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub user_input: &'a str,
    pub session_id: &'a str,
}

//=========================================================================================
// Response Bodies (Backend -> Client)
//=========================================================================================
// Only the fields the client consumes are declared; anything else is ignored.
//=========================================================================================

#[derive(Deserialize, Debug)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct StartSessionResponse {
    #[serde(deserialize_with = "opaque_id")]
    pub session_id: String,
    pub response: String,
    #[serde(default)]
    pub corrections: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub corrections: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct FeedbackResponse {
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
}

/// The error envelope the backend sends with any non-2xx status.
#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Session ids are opaque to the client. The backend may issue them as JSON
/// strings or as integers; both are kept as text.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Text(text) => Ok(text),
        RawId::Number(number) => Ok(number.to_string()),
    }
}
