use thiserror::Error;

use super::{FlowKind, Step, ValidationError};
use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server has no account for this identity; continue in `to`.
    #[error("{message}")]
    Redirect {
        to: FlowKind,
        email: String,
        message: String,
    },

    #[error("A request is already in progress")]
    Busy,

    #[error("Not available at the {0} step")]
    WrongStep(Step),
}

impl FlowError {
    /// Text suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            FlowError::Api(e) => api_user_message(e),
            other => other.to_string(),
        }
    }
}

fn api_user_message(e: &ApiError) -> String {
    if let Some(message) = e.server_message() {
        return message.to_string();
    }
    match e {
        ApiError::Unauthorized(_) => "Invalid email or password".to_string(),
        ApiError::NetworkError(err) if err.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        ApiError::NetworkError(err) if err.is_connect() => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        ApiError::RateLimited => "Too many attempts. Please wait and try again.".to_string(),
        other => format!("Request failed: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::Field;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = FlowError::Api(ApiError::BadRequest("Invalid OTP".into()));
        assert_eq!(err.user_message(), "Invalid OTP");
    }

    #[test]
    fn test_user_message_fallbacks() {
        let err = FlowError::Api(ApiError::Unauthorized(String::new()));
        assert_eq!(err.user_message(), "Invalid email or password");

        let err = FlowError::Validation(ValidationError::Required(Field::Email));
        assert_eq!(err.user_message(), "Email is required");
    }

    #[test]
    fn test_redirect_shows_server_message() {
        let err = FlowError::Redirect {
            to: FlowKind::Signup,
            email: "a@b.co".into(),
            message: "User not found".into(),
        };
        assert_eq!(err.user_message(), "User not found");
        assert_eq!(FlowError::Busy.user_message(), "A request is already in progress");
    }
}
