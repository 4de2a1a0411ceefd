use std::fmt;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use super::FlowKind;
use crate::api::{ApiResult, AuthApi};
use crate::models::OtpAck;

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Youngest age allowed to create an account
pub const MIN_SIGNUP_AGE_YEARS: i32 = 13;

/// Length of the emailed verification code
pub const OTP_LENGTH: usize = 6;

/// Date format of the date-of-birth field
pub const DOB_FORMAT: &str = "%Y-%m-%d";

/// Form field a validation error points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Email,
    Password,
    ConfirmPassword,
    DateOfBirth,
    Otp,
    OAuthCredential,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Username => "Username",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::ConfirmPassword => "Confirm password",
            Field::DateOfBirth => "Date of birth",
            Field::Otp => "Verification code",
            Field::OAuthCredential => "Sign-in credential",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{} is required", .0.label())]
    Required(Field),

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Date of birth must look like YYYY-MM-DD")]
    InvalidDate,

    #[error("Date of birth cannot be in the future")]
    DateInFuture,

    #[error("You must be at least {min_age} years old to sign up")]
    TooYoung { min_age: i32 },

    #[error("Verification code must be {expected} digits")]
    InvalidOtp { expected: usize },
}

impl ValidationError {
    /// The field to highlight for this error
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Required(field) => *field,
            ValidationError::InvalidEmail => Field::Email,
            ValidationError::PasswordTooShort { .. } => Field::Password,
            ValidationError::PasswordMismatch => Field::ConfirmPassword,
            ValidationError::InvalidDate
            | ValidationError::DateInFuture
            | ValidationError::TooYoung { .. } => Field::DateOfBirth,
            ValidationError::InvalidOtp { .. } => Field::Otp,
        }
    }
}

/// Input collected at the credentials step of a flow.
#[allow(async_fn_in_trait)]
pub trait CredentialForm: Clone {
    const KIND: FlowKind;

    /// Address the verification code is sent to
    fn email(&self) -> &str;

    /// Local checks that must pass before anything is sent to the server
    fn validate(&self, today: NaiveDate) -> Result<(), ValidationError>;

    /// Ask the server to email a verification code for this form
    async fn request_otp<A: AuthApi>(&self, api: &A) -> ApiResult<OtpAck>;
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CredentialForm for LoginForm {
    const KIND: FlowKind = FlowKind::Login;

    fn email(&self) -> &str {
        self.email.trim()
    }

    /// Presence only. The server decides whether the address is known.
    fn validate(&self, _today: NaiveDate) -> Result<(), ValidationError> {
        require(&self.email, Field::Email)?;
        require(&self.password, Field::Password)
    }

    async fn request_otp<A: AuthApi>(&self, api: &A) -> ApiResult<OtpAck> {
        api.request_login_otp(self).await
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    /// `YYYY-MM-DD`
    pub dob: String,
    pub password: String,
    pub confirm_password: String,
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("dob", &self.dob)
            .field("password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .finish()
    }
}

impl SignupForm {
    /// A form with only the email filled in, for continuing from a failed login
    pub fn prefilled(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}

impl CredentialForm for SignupForm {
    const KIND: FlowKind = FlowKind::Signup;

    fn email(&self) -> &str {
        self.email.trim()
    }

    fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        require(&self.username, Field::Username)?;
        require(&self.email, Field::Email)?;
        require(&self.dob, Field::DateOfBirth)?;
        require(&self.password, Field::Password)?;
        check_email(&self.email)?;

        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        let dob = NaiveDate::parse_from_str(self.dob.trim(), DOB_FORMAT)
            .map_err(|_| ValidationError::InvalidDate)?;
        if dob > today {
            return Err(ValidationError::DateInFuture);
        }
        if age_on(dob, today) < MIN_SIGNUP_AGE_YEARS {
            return Err(ValidationError::TooYoung {
                min_age: MIN_SIGNUP_AGE_YEARS,
            });
        }
        Ok(())
    }

    async fn request_otp<A: AuthApi>(&self, api: &A) -> ApiResult<OtpAck> {
        api.request_signup_otp(self).await
    }
}

fn require(value: &str, field: Field) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

/// Shape check only: one `@`, something before it, a dotted domain after it.
fn check_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidEmail);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::InvalidEmail);
    };
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..");
    if local.is_empty() || !domain_ok {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Whole years between `dob` and `today`
fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Exactly `OTP_LENGTH` ASCII digits
pub fn is_valid_otp(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}
