use log::info;
use validator::Validate;

use super::{ApiClient, Operation};
use crate::error::ClientError;
use crate::models::{
    LoginRequest, LoginResponse, RegisterRequest, SecurityAnswerRequest, SecurityQuestionRequest,
    SecurityQuestionResponse,
};
use crate::session::Credential;

impl ApiClient {
    /// `POST /registro`. Success carries no payload; the caller moves on to login.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ClientError> {
        request.validate()?;
        let builder = self.http.post(self.url("/registro")).json(request);
        self.send(Operation::Register, builder).await?;
        info!("Registered user {}", request.username);
        Ok(())
    }

    /// `POST /login`. Yields the session credential on success.
    pub async fn login(&self, request: &LoginRequest) -> Result<Credential, ClientError> {
        request.validate()?;
        let builder = self.http.post(self.url("/login")).json(request);
        let response = self.send(Operation::Login, builder).await?;
        let body: LoginResponse = response.json().await?;
        info!("Logged in as {}", request.username);
        Ok(Credential::new(body.token))
    }

    /// `POST /recuperar/preguntas`. Yields the user's security question.
    pub async fn fetch_security_question(&self, username: &str) -> Result<String, ClientError> {
        let request = SecurityQuestionRequest {
            username: username.to_string(),
        };
        request.validate()?;
        let builder = self.http.post(self.url("/recuperar/preguntas")).json(&request);
        let response = self.send(Operation::FetchSecurityQuestion, builder).await?;
        let body: SecurityQuestionResponse = response.json().await?;
        Ok(body.question)
    }

    /// `POST /recuperar/validar`. On success the service has replaced the password.
    pub async fn validate_security_answer(
        &self,
        request: &SecurityAnswerRequest,
    ) -> Result<(), ClientError> {
        request.validate()?;
        let builder = self.http.post(self.url("/recuperar/validar")).json(request);
        self.send(Operation::ValidateSecurityAnswer, builder).await?;
        info!("Password reset for {}", request.username);
        Ok(())
    }
}
