//! Endpoints of the two credential flows.
//!
//! None of these requests carry a bearer token, even when a session exists.

use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use super::{ApiClient, ApiResult};
use crate::flow::{FlowKind, LoginForm, SignupForm};
use crate::models::{AuthGrant, OtpAck};

/// Server operations behind signup and login.
///
/// Flows are generic over this trait so they can be driven without a
/// server.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    /// `POST login/manual-login`
    async fn request_login_otp(&self, form: &LoginForm) -> ApiResult<OtpAck>;

    /// `POST signup/register`
    async fn request_signup_otp(&self, form: &SignupForm) -> ApiResult<OtpAck>;

    /// `POST {kind}/verify-otp`
    async fn verify_otp(&self, kind: FlowKind, email: &str, otp: &str) -> ApiResult<AuthGrant>;

    /// `POST {kind}/oauth` with a credential from the identity provider
    async fn exchange_oauth(&self, kind: FlowKind, credential: &str) -> ApiResult<AuthGrant>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    dob: &'a str,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
struct OAuthRequest<'a> {
    token: &'a str,
}

impl AuthApi for ApiClient {
    async fn request_login_otp(&self, form: &LoginForm) -> ApiResult<OtpAck> {
        let body = LoginRequest {
            email: form.email.trim(),
            password: &form.password,
        };
        debug!(email = body.email, "Requesting login code");
        self.send_json(self.public(Method::POST, "login/manual-login").json(&body))
            .await
    }

    async fn request_signup_otp(&self, form: &SignupForm) -> ApiResult<OtpAck> {
        let body = RegisterRequest {
            username: form.username.trim(),
            email: form.email.trim(),
            password: &form.password,
            dob: form.dob.trim(),
        };
        debug!(email = body.email, "Requesting signup code");
        self.send_json(self.public(Method::POST, "signup/register").json(&body))
            .await
    }

    async fn verify_otp(&self, kind: FlowKind, email: &str, otp: &str) -> ApiResult<AuthGrant> {
        let path = format!("{}/verify-otp", kind.path_segment());
        let body = VerifyRequest {
            email: email.trim(),
            otp,
        };
        self.send_json(self.public(Method::POST, &path).json(&body)).await
    }

    async fn exchange_oauth(&self, kind: FlowKind, credential: &str) -> ApiResult<AuthGrant> {
        let path = format!("{}/oauth", kind.path_segment());
        self.send_json(
            self.public(Method::POST, &path)
                .json(&OAuthRequest { token: credential }),
        )
        .await
    }
}
