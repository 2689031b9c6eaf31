//! Registration collaborator
//!
//! Request validation happens locally; only a request that passes it is
//! sent. Every outcome, including local rejections, maps to a notice the
//! host shows as a toast.

use super::{excerpt, CollaboratorError};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub email: String,
    #[serde(rename = "nickName")]
    pub nickname: String,
    pub password: String,
    pub occupation: String,
    /// Optional; empty when nobody invited the user
    pub inviter_email: String,
    /// `None` until the user has typed a code
    pub verify_code: Option<u32>,
}

/// Local rejection, raised before any request is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Email must not be empty")]
    EmptyEmail,
    #[error("Nickname must not be empty")]
    EmptyNickname,
    #[error("Verification code must not be empty")]
    EmptyVerifyCode,
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error("Occupation must not be empty")]
    EmptyOccupation,
    #[error("Email address is malformed")]
    MalformedEmail,
    #[error("Inviter email address is malformed")]
    MalformedInviterEmail,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email pattern"))
}

impl RegistrationRequest {
    /// Check required fields in form order, then email shape
    pub fn validate(&self) -> Result<(), ValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail);
        }
        if self.nickname.trim().is_empty() {
            return Err(ValidationError::EmptyNickname);
        }
        if self.verify_code.is_none() {
            return Err(ValidationError::EmptyVerifyCode);
        }
        if self.password.trim().is_empty() {
            return Err(ValidationError::EmptyPassword);
        }
        if self.occupation.trim().is_empty() {
            return Err(ValidationError::EmptyOccupation);
        }
        if !email_pattern().is_match(email) {
            return Err(ValidationError::MalformedEmail);
        }
        let inviter = self.inviter_email.trim();
        if !inviter.is_empty() && !email_pattern().is_match(inviter) {
            return Err(ValidationError::MalformedInviterEmail);
        }
        Ok(())
    }
}

/// Server verdict on a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Success,
    EmailConflict,
    EmailInvalid,
    VerifyCodeInvalid,
    GenericFailure,
}

impl RegistrationOutcome {
    /// Decode the service's result code
    ///
    /// The service answers either with the numeric code or with the code's
    /// name; anything unrecognised is a generic failure.
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(0) => Self::Success,
                Some(1) => Self::EmailConflict,
                Some(2) => Self::EmailInvalid,
                Some(3) => Self::VerifyCodeInvalid,
                _ => Self::GenericFailure,
            },
            Value::String(s) => match s.as_str() {
                "success" => Self::Success,
                "emailConflict" => Self::EmailConflict,
                "emailInvalid" => Self::EmailInvalid,
                "verifyCodeInvalid" => Self::VerifyCodeInvalid,
                _ => Self::GenericFailure,
            },
            _ => Self::GenericFailure,
        }
    }

    /// Notice shown to the user
    pub fn notice(&self) -> &'static str {
        match self {
            Self::Success => "Registration succeeded, please log in",
            Self::EmailConflict => "This email is already registered",
            Self::EmailInvalid => "This email address is not valid",
            Self::VerifyCodeInvalid => "The verification code is incorrect",
            Self::GenericFailure => "Registration failed, please try again",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Ask the service to mail a verification code to `email`
    async fn send_verify_code(&self, email: &str) -> Result<(), CollaboratorError>;

    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationOutcome, CollaboratorError>;
}

/// Validate locally, then submit; local rejections never reach the service
pub async fn submit_registration(
    service: &dyn RegistrationService,
    request: &RegistrationRequest,
) -> Result<RegistrationOutcome, CollaboratorError> {
    request.validate()?;
    service.register(request).await
}

#[derive(Debug, Clone)]
pub struct HttpRegistrationService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRegistrationService {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<String, CollaboratorError> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                status: status.as_u16(),
                body: excerpt(&text),
            });
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct VerifyCodeRequest<'a> {
    email: &'a str,
}

#[async_trait]
impl RegistrationService for HttpRegistrationService {
    async fn send_verify_code(&self, email: &str) -> Result<(), CollaboratorError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::EmptyEmail.into());
        }
        self.post("user/verify-code", &VerifyCodeRequest { email })
            .await
            .map(|_| ())
    }

    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationOutcome, CollaboratorError> {
        let body = self.post("user/register", request).await?;
        let value: Value = serde_json::from_str(body.trim())
            .map_err(|e| CollaboratorError::Decode(e.to_string()))?;
        Ok(RegistrationOutcome::from_wire(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn complete_request() -> RegistrationRequest {
        RegistrationRequest {
            email: "ada@example.com".to_string(),
            nickname: "ada".to_string(),
            password: "hunter2".to_string(),
            occupation: "engineer".to_string(),
            inviter_email: String::new(),
            verify_code: Some(123456),
        }
    }

    struct CountingService {
        calls: AtomicUsize,
        outcome: RegistrationOutcome,
    }

    #[async_trait]
    impl RegistrationService for CountingService {
        async fn send_verify_code(&self, _email: &str) -> Result<(), CollaboratorError> {
            Ok(())
        }

        async fn register(
            &self,
            _request: &RegistrationRequest,
        ) -> Result<RegistrationOutcome, CollaboratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome)
        }
    }

    #[test]
    fn each_empty_required_field_is_rejected() {
        let cases: [(fn(&mut RegistrationRequest), ValidationError); 5] = [
            (|r| r.email = "  ".into(), ValidationError::EmptyEmail),
            (|r| r.nickname.clear(), ValidationError::EmptyNickname),
            (|r| r.verify_code = None, ValidationError::EmptyVerifyCode),
            (|r| r.password = "\t".into(), ValidationError::EmptyPassword),
            (|r| r.occupation.clear(), ValidationError::EmptyOccupation),
        ];
        for (blank, expected) in cases {
            let mut request = complete_request();
            blank(&mut request);
            assert_eq!(request.validate(), Err(expected));
        }
        assert_eq!(complete_request().validate(), Ok(()));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        let mut request = complete_request();
        request.email = "not-an-email".into();
        assert_eq!(request.validate(), Err(ValidationError::MalformedEmail));

        let mut request = complete_request();
        request.inviter_email = "friend@".into();
        assert_eq!(request.validate(), Err(ValidationError::MalformedInviterEmail));

        let mut request = complete_request();
        request.inviter_email = "friend@example.org".into();
        assert_eq!(request.validate(), Ok(()));
    }

    #[test]
    fn wire_codes_map_to_outcomes() {
        use serde_json::json;
        assert_eq!(RegistrationOutcome::from_wire(&json!(0)), RegistrationOutcome::Success);
        assert_eq!(
            RegistrationOutcome::from_wire(&json!(1)),
            RegistrationOutcome::EmailConflict
        );
        assert_eq!(
            RegistrationOutcome::from_wire(&json!("verifyCodeInvalid")),
            RegistrationOutcome::VerifyCodeInvalid
        );
        assert_eq!(
            RegistrationOutcome::from_wire(&json!(42)),
            RegistrationOutcome::GenericFailure
        );
        assert_eq!(
            RegistrationOutcome::from_wire(&json!({"weird": true})),
            RegistrationOutcome::GenericFailure
        );
    }

    #[test]
    fn request_uses_service_field_names() {
        let value = serde_json::to_value(complete_request()).unwrap();
        assert_eq!(value["nickName"], "ada");
        assert_eq!(value["inviterEmail"], "");
        assert_eq!(value["verifyCode"], 123456);
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_service() {
        let service = CountingService {
            calls: AtomicUsize::new(0),
            outcome: RegistrationOutcome::Success,
        };
        let mut request = complete_request();
        request.occupation.clear();

        let result = submit_registration(&service, &request).await;
        assert!(matches!(
            result,
            Err(CollaboratorError::Validation(ValidationError::EmptyOccupation))
        ));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);

        let outcome = submit_registration(&service, &complete_request())
            .await
            .unwrap();
        assert!(outcome.is_success());
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }
}
