//! Request and response bodies of the authentication and password-recovery
//! routes. Field names on the wire are the service's (`usuario`, `contrasena`, ...).

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /registro`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RegisterRequest {
    #[serde(rename = "usuario")]
    #[validate(length(min = 1, message = "All fields are required."))]
    pub username: String,
    #[serde(rename = "contrasena")]
    #[validate(length(min = 1, message = "All fields are required."))]
    pub password: String,
    #[serde(rename = "pregunta")]
    #[validate(length(min = 1, message = "All fields are required."))]
    pub security_question: String,
    #[serde(rename = "respuesta")]
    #[validate(length(min = 1, message = "All fields are required."))]
    pub security_answer: String,
}

/// Body of `POST /login`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct LoginRequest {
    #[serde(rename = "usuario")]
    #[validate(length(min = 1, message = "Username and password are required."))]
    pub username: String,
    #[serde(rename = "contrasena")]
    #[validate(length(min = 1, message = "Username and password are required."))]
    pub password: String,
}

/// Successful `POST /login` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Body of `POST /recuperar/preguntas`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct SecurityQuestionRequest {
    #[serde(rename = "usuario")]
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
}

/// Successful `POST /recuperar/preguntas` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct SecurityQuestionResponse {
    #[serde(rename = "pregunta")]
    pub question: String,
}

/// Body of `POST /recuperar/validar`.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct SecurityAnswerRequest {
    #[serde(rename = "usuario")]
    #[validate(length(min = 1, message = "Username, answer and new password are required."))]
    pub username: String,
    #[serde(rename = "respuesta")]
    #[validate(length(min = 1, message = "Username, answer and new password are required."))]
    pub answer: String,
    #[serde(rename = "nueva_contrasena")]
    #[validate(length(min = 1, message = "Username, answer and new password are required."))]
    pub new_password: String,
}

/// Body of any non-2xx response. `message` is optional and shown verbatim.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
