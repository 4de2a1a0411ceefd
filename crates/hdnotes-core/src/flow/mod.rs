//! Signup and login as a two-step state machine.
//!
//! Both flows share one shape: credentials are submitted, the server emails
//! a verification code, and the code is exchanged for a session. An OAuth
//! credential skips both steps.

pub mod credential_flow;
pub mod error;
pub mod forms;

use std::fmt;

pub use credential_flow::{CredentialFlow, LoginFlow, Notice, NoticeLevel, SignupFlow, Step};
pub use error::FlowError;
pub use forms::{
    is_valid_otp, CredentialForm, Field, LoginForm, SignupForm, ValidationError,
    MIN_PASSWORD_LENGTH, MIN_SIGNUP_AGE_YEARS, OTP_LENGTH,
};

/// Which of the two sibling flows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Login,
    Signup,
}

impl FlowKind {
    /// URL segment of this flow's endpoints
    pub fn path_segment(&self) -> &'static str {
        match self {
            FlowKind::Login => "login",
            FlowKind::Signup => "signup",
        }
    }

    /// Flow to send the user to when the server has no account for them.
    /// Only login redirects; a 404 anywhere else is an ordinary error.
    pub fn redirect_on_not_found(&self) -> Option<FlowKind> {
        match self {
            FlowKind::Login => Some(FlowKind::Signup),
            FlowKind::Signup => None,
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::Login => write!(f, "login"),
            FlowKind::Signup => write!(f, "signup"),
        }
    }
}
