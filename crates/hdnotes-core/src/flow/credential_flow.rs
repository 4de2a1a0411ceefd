use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::forms::{is_valid_otp, CredentialForm, Field, LoginForm, SignupForm, OTP_LENGTH};
use super::{FlowError, FlowKind, ValidationError};
use crate::api::AuthApi;
use crate::auth::{Clock, SessionStore, SystemClock};
use crate::models::User;

pub type LoginFlow = CredentialFlow<LoginForm>;
pub type SignupFlow = CredentialFlow<SignupForm>;

/// Where a flow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Credentials,
    Verify,
    /// Session created; the flow accepts nothing further.
    Complete,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Credentials => write!(f, "credentials"),
            Step::Verify => write!(f, "verify"),
            Step::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// Message for the user produced by the last flow operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// The pending form only exists once a code was requested, so verifying
/// without one cannot be expressed.
#[derive(Debug, Clone)]
enum State<F> {
    Credentials,
    Verify { pending: F },
    Complete,
}

/// Marks the flow busy for as long as it lives.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self, FlowError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FlowError::Busy)?;
        Ok(Self(flag.clone()))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One signup or login attempt, from credentials to session.
///
/// At most one server call is in flight per flow. The busy flag is
/// released on every exit path, including when the caller drops the
/// future mid-request.
pub struct CredentialFlow<F: CredentialForm> {
    state: State<F>,
    otp_input: String,
    busy: Arc<AtomicBool>,
    notice: Option<Notice>,
    clock: Arc<dyn Clock>,
}

impl<F: CredentialForm> Default for CredentialFlow<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: CredentialForm> CredentialFlow<F> {
    pub fn new() -> Self {
        Self {
            state: State::Credentials,
            otp_input: String::new(),
            busy: Arc::new(AtomicBool::new(false)),
            notice: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Clock used for the date-of-birth check
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn kind(&self) -> FlowKind {
        F::KIND
    }

    pub fn step(&self) -> Step {
        match self.state {
            State::Credentials => Step::Credentials,
            State::Verify { .. } => Step::Verify,
            State::Complete => Step::Complete,
        }
    }

    /// The form the current code was requested for
    pub fn pending(&self) -> Option<&F> {
        match &self.state {
            State::Verify { pending } => Some(pending),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn otp_input(&self) -> &str {
        &self.otp_input
    }

    pub fn set_otp_input(&mut self, input: &str) {
        self.otp_input = input.trim().to_string();
    }

    /// Whether "verify" may be pressed right now
    pub fn can_verify(&self) -> bool {
        matches!(self.state, State::Verify { .. }) && !self.is_busy() && is_valid_otp(&self.otp_input)
    }

    /// Submit credentials and request a verification code.
    ///
    /// On success the flow moves to `Verify` and the server's
    /// acknowledgement is returned. On failure it stays at `Credentials`.
    pub async fn submit<A: AuthApi>(&mut self, api: &A, form: F) -> Result<String, FlowError> {
        let result = self.try_submit(api, form).await;
        self.settle(result, |message| Notice::success(message.clone()))
    }

    async fn try_submit<A: AuthApi>(&mut self, api: &A, form: F) -> Result<String, FlowError> {
        if !matches!(self.state, State::Credentials) {
            return Err(FlowError::WrongStep(self.step()));
        }
        let _busy = BusyGuard::acquire(&self.busy)?;
        form.validate(self.clock.now().date_naive())?;

        match form.request_otp(api).await {
            Ok(ack) => {
                info!(flow = %F::KIND, email = %form.email(), "Verification code requested");
                let message = if ack.message.is_empty() {
                    format!("Verification code sent to {}", form.email())
                } else {
                    ack.message
                };
                self.otp_input.clear();
                self.state = State::Verify { pending: form };
                Ok(message)
            }
            Err(e) => match F::KIND.redirect_on_not_found() {
                Some(to) if e.is_not_found() => {
                    info!(flow = %F::KIND, redirect = %to, "No account for identity, redirecting");
                    Err(FlowError::Redirect {
                        to,
                        email: form.email().to_string(),
                        message: e
                            .server_message()
                            .unwrap_or("No account found for this email. Please sign up.")
                            .to_string(),
                    })
                }
                _ => {
                    warn!(flow = %F::KIND, error = %e, "Verification code request failed");
                    Err(e.into())
                }
            },
        }
    }

    /// Exchange the entered code for a session.
    ///
    /// Nothing is sent unless the code is exactly `OTP_LENGTH` digits. On
    /// success the session store is logged in and the flow completes; on
    /// failure the flow stays at `Verify` with its input intact.
    pub async fn verify<A: AuthApi>(&mut self, api: &A, session: &SessionStore) -> Result<User, FlowError> {
        let result = self.try_verify(api, session).await;
        self.settle(result, |user| {
            Notice::success(format!("Welcome, {}!", user.display_name()))
        })
    }

    async fn try_verify<A: AuthApi>(&mut self, api: &A, session: &SessionStore) -> Result<User, FlowError> {
        let email = match &self.state {
            State::Verify { pending } => pending.email().to_string(),
            _ => return Err(FlowError::WrongStep(self.step())),
        };
        let _busy = BusyGuard::acquire(&self.busy)?;
        if !is_valid_otp(&self.otp_input) {
            return Err(ValidationError::InvalidOtp { expected: OTP_LENGTH }.into());
        }

        let grant = api.verify_otp(F::KIND, &email, &self.otp_input).await.map_err(|e| {
            warn!(flow = %F::KIND, error = %e, "Code verification failed");
            e
        })?;

        let session = session.login(grant.user, grant.token);
        self.finish();
        Ok(session.user)
    }

    /// Request a fresh code for the pending form without leaving `Verify`.
    pub async fn resend<A: AuthApi>(&mut self, api: &A) -> Result<String, FlowError> {
        let result = self.try_resend(api).await;
        self.settle(result, |message| Notice::info(message.clone()))
    }

    async fn try_resend<A: AuthApi>(&mut self, api: &A) -> Result<String, FlowError> {
        let pending = match &self.state {
            State::Verify { pending } => pending.clone(),
            _ => return Err(FlowError::WrongStep(self.step())),
        };
        let _busy = BusyGuard::acquire(&self.busy)?;

        let ack = pending.request_otp(api).await?;
        debug!(flow = %F::KIND, "Verification code resent");
        Ok(if ack.message.is_empty() {
            format!("A new code was sent to {}", pending.email())
        } else {
            ack.message
        })
    }

    /// Leave `Verify` for `Credentials`, returning the submitted form so it
    /// can be edited. Does nothing at any other step.
    pub fn back(&mut self) -> Option<F> {
        match std::mem::replace(&mut self.state, State::Credentials) {
            State::Verify { pending } => {
                self.otp_input.clear();
                self.notice = None;
                Some(pending)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Sign in with a credential from an external identity provider,
    /// skipping both steps.
    pub async fn oauth<A: AuthApi>(
        &mut self,
        api: &A,
        session: &SessionStore,
        credential: &str,
    ) -> Result<User, FlowError> {
        let result = self.try_oauth(api, session, credential).await;
        self.settle(result, |user| {
            Notice::success(format!("Signed in as {}", user.display_name()))
        })
    }

    async fn try_oauth<A: AuthApi>(
        &mut self,
        api: &A,
        session: &SessionStore,
        credential: &str,
    ) -> Result<User, FlowError> {
        if matches!(self.state, State::Complete) {
            return Err(FlowError::WrongStep(Step::Complete));
        }
        let _busy = BusyGuard::acquire(&self.busy)?;
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(ValidationError::Required(Field::OAuthCredential).into());
        }

        let grant = api.exchange_oauth(F::KIND, credential).await.map_err(|e| {
            warn!(flow = %F::KIND, error = %e, "OAuth exchange failed");
            e
        })?;

        let session = session.login(grant.user, grant.token);
        self.finish();
        Ok(session.user)
    }

    /// Pick up after a redirect to signup: a fresh signup flow on the same
    /// clock and a form prefilled with the email the server did not know.
    /// Any other error yields `None`.
    pub fn continue_as_signup(&self, err: &FlowError) -> Option<(SignupFlow, SignupForm)> {
        match err {
            FlowError::Redirect {
                to: FlowKind::Signup,
                email,
                ..
            } => {
                debug!(flow = %F::KIND, email = %email, "Continuing as signup");
                Some((
                    SignupFlow::new().with_clock(self.clock.clone()),
                    SignupForm::prefilled(email.clone()),
                ))
            }
            _ => None,
        }
    }

    fn finish(&mut self) {
        self.state = State::Complete;
        self.otp_input.clear();
    }

    fn settle<T>(
        &mut self,
        result: Result<T, FlowError>,
        on_ok: impl FnOnce(&T) -> Notice,
    ) -> Result<T, FlowError> {
        self.notice = Some(match &result {
            Ok(value) => on_ok(value),
            Err(e) => Notice::error(e.user_message()),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::api::{ApiError, ApiResult};
    use crate::auth::MemoryStore;
    use crate::models::{AuthGrant, OtpAck};

    const GOOD_CODE: &str = "123456";

    #[derive(Default)]
    struct MockApi {
        calls: Mutex<Vec<String>>,
        otp_failure: Mutex<Option<ApiError>>,
        oauth_failure: Mutex<Option<ApiError>>,
        hang: bool,
    }

    impl MockApi {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn fail_otp_once(&self, err: ApiError) {
            *self.otp_failure.lock().unwrap() = Some(err);
        }

        async fn otp(&self) -> ApiResult<OtpAck> {
            if self.hang {
                std::future::pending::<()>().await;
            }
            match self.otp_failure.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(OtpAck {
                    message: "OTP sent to your email".into(),
                }),
            }
        }
    }

    impl AuthApi for MockApi {
        async fn request_login_otp(&self, form: &LoginForm) -> ApiResult<OtpAck> {
            self.record(format!("login-otp:{}", form.email));
            self.otp().await
        }

        async fn request_signup_otp(&self, form: &SignupForm) -> ApiResult<OtpAck> {
            self.record(format!("signup-otp:{}", form.email));
            self.otp().await
        }

        async fn verify_otp(&self, kind: FlowKind, email: &str, otp: &str) -> ApiResult<AuthGrant> {
            self.record(format!("{}-verify:{}:{}", kind, email, otp));
            if otp == GOOD_CODE {
                Ok(AuthGrant {
                    user: User::new("u1", "ana", email),
                    token: "tok".into(),
                })
            } else {
                Err(ApiError::BadRequest("Invalid or expired OTP".into()))
            }
        }

        async fn exchange_oauth(&self, kind: FlowKind, credential: &str) -> ApiResult<AuthGrant> {
            self.record(format!("{}-oauth:{}", kind, credential));
            match self.oauth_failure.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(AuthGrant {
                    user: User::new("g1", "gina", "gina@example.com"),
                    token: "oauth-tok".into(),
                }),
            }
        }
    }

    fn session_store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStore::new()))
    }

    fn login_form() -> LoginForm {
        LoginForm::new("ana@example.com", "hunter22")
    }

    fn signup_form() -> SignupForm {
        SignupForm {
            username: "ana".into(),
            email: "ana@example.com".into(),
            dob: "1995-04-12".into(),
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
        }
    }

    #[tokio::test]
    async fn test_submit_moves_to_verify() {
        let api = MockApi::default();
        let mut flow = LoginFlow::new();
        assert_eq!(flow.step(), Step::Credentials);

        let message = flow.submit(&api, login_form()).await.unwrap();
        assert_eq!(message, "OTP sent to your email");
        assert_eq!(flow.step(), Step::Verify);
        assert_eq!(flow.pending(), Some(&login_form()));
        assert_eq!(flow.notice().map(|n| n.level), Some(NoticeLevel::Success));
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_signup_password_mismatch_never_calls_server() {
        let api = MockApi::default();
        let mut flow = SignupFlow::new();
        let mut form = signup_form();
        form.confirm_password = "different".into();

        let err = flow.submit(&api, form).await.unwrap_err();
        assert!(matches!(err, FlowError::Validation(ValidationError::PasswordMismatch)));
        assert!(api.calls().is_empty());
        assert_eq!(flow.step(), Step::Credentials);
        assert_eq!(
            flow.notice(),
            Some(&Notice::error("Passwords do not match"))
        );
    }

    #[tokio::test]
    async fn test_submit_failure_stays_at_credentials() {
        let api = MockApi::default();
        api.fail_otp_once(ApiError::Unauthorized("Invalid credentials".into()));
        let mut flow = LoginFlow::new();

        let err = flow.submit(&api, login_form()).await.unwrap_err();
        assert!(matches!(err, FlowError::Api(ApiError::Unauthorized(_))));
        assert_eq!(flow.step(), Step::Credentials);
        assert!(flow.pending().is_none());
        assert!(!flow.is_busy());
        assert_eq!(flow.notice(), Some(&Notice::error("Invalid credentials")));
    }

    #[tokio::test]
    async fn test_login_not_found_redirects_to_signup() {
        let api = MockApi::default();
        api.fail_otp_once(ApiError::NotFound("User not found".into()));
        let mut flow = LoginFlow::new();

        let err = flow.submit(&api, login_form()).await.unwrap_err();
        match err {
            FlowError::Redirect { to, email, message } => {
                assert_eq!(to, FlowKind::Signup);
                assert_eq!(email, "ana@example.com");
                assert_eq!(message, "User not found");
            }
            other => panic!("expected redirect, got {:?}", other),
        }
        assert_eq!(flow.step(), Step::Credentials);
    }

    #[tokio::test]
    async fn test_signup_not_found_is_plain_error() {
        let api = MockApi::default();
        api.fail_otp_once(ApiError::NotFound("Route missing".into()));
        let mut flow = SignupFlow::new();

        let err = flow.submit(&api, signup_form()).await.unwrap_err();
        assert!(matches!(err, FlowError::Api(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_verify_requires_exact_length() {
        let api = MockApi::default();
        let session = session_store();
        let mut flow = LoginFlow::new();
        flow.submit(&api, login_form()).await.unwrap();

        for code in ["12345", "1234567", ""] {
            flow.set_otp_input(code);
            assert!(!flow.can_verify());
            let err = flow.verify(&api, &session).await.unwrap_err();
            assert!(matches!(
                err,
                FlowError::Validation(ValidationError::InvalidOtp { expected: OTP_LENGTH })
            ));
        }
        assert_eq!(api.calls(), vec!["login-otp:ana@example.com".to_string()]);
        assert_eq!(flow.step(), Step::Verify);
    }

    #[tokio::test]
    async fn test_verify_unreachable_before_code_requested() {
        let api = MockApi::default();
        let session = session_store();
        let mut flow = LoginFlow::new();
        flow.set_otp_input(GOOD_CODE);

        assert!(!flow.can_verify());
        let err = flow.verify(&api, &session).await.unwrap_err();
        assert!(matches!(err, FlowError::WrongStep(Step::Credentials)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_verify_success_logs_in_and_completes() {
        let api = MockApi::default();
        let session = session_store();
        let mut flow = LoginFlow::new();
        flow.submit(&api, login_form()).await.unwrap();
        flow.set_otp_input(GOOD_CODE);
        assert!(flow.can_verify());

        let user = flow.verify(&api, &session).await.unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(session.current_user(), Some(user));
        assert_eq!(session.token().as_deref(), Some("tok"));
        assert_eq!(flow.step(), Step::Complete);
        assert_eq!(flow.otp_input(), "");

        let err = flow.submit(&api, login_form()).await.unwrap_err();
        assert!(matches!(err, FlowError::WrongStep(Step::Complete)));
    }

    #[tokio::test]
    async fn test_verify_failure_keeps_state() {
        let api = MockApi::default();
        let session = session_store();
        let mut flow = LoginFlow::new();
        flow.submit(&api, login_form()).await.unwrap();
        flow.set_otp_input("654321");

        let err = flow.verify(&api, &session).await.unwrap_err();
        assert!(matches!(err, FlowError::Api(ApiError::BadRequest(_))));
        assert_eq!(flow.step(), Step::Verify);
        assert_eq!(flow.otp_input(), "654321");
        assert_eq!(flow.pending(), Some(&login_form()));
        assert!(session.current_user().is_none());
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_resend_reuses_pending_identity() {
        let api = MockApi::default();
        let mut flow = SignupFlow::new();
        flow.submit(&api, signup_form()).await.unwrap();
        flow.set_otp_input("12");

        let message = flow.resend(&api).await.unwrap();
        assert_eq!(message, "OTP sent to your email");
        assert_eq!(flow.step(), Step::Verify);
        assert_eq!(flow.otp_input(), "12");
        assert_eq!(
            api.calls(),
            vec![
                "signup-otp:ana@example.com".to_string(),
                "signup-otp:ana@example.com".to_string()
            ]
        );
        assert_eq!(flow.notice().map(|n| n.level), Some(NoticeLevel::Info));
    }

    #[tokio::test]
    async fn test_resend_outside_verify_is_rejected() {
        let api = MockApi::default();
        let mut flow = LoginFlow::new();
        let err = flow.resend(&api).await.unwrap_err();
        assert!(matches!(err, FlowError::WrongStep(Step::Credentials)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_back_clears_code_and_returns_form() {
        let api = MockApi::default();
        let mut flow = LoginFlow::new();
        flow.submit(&api, login_form()).await.unwrap();
        flow.set_otp_input("123");

        let form = flow.back();
        assert_eq!(form, Some(login_form()));
        assert_eq!(flow.step(), Step::Credentials);
        assert_eq!(flow.otp_input(), "");
        assert!(flow.back().is_none());
    }

    #[tokio::test]
    async fn test_calls_rejected_while_busy() {
        let api = MockApi::default();
        let session = session_store();
        let mut flow = LoginFlow::new();
        flow.submit(&api, login_form()).await.unwrap();
        flow.set_otp_input(GOOD_CODE);

        let guard = BusyGuard::acquire(&flow.busy).unwrap();
        assert!(!flow.can_verify());
        assert!(matches!(flow.resend(&api).await, Err(FlowError::Busy)));
        assert!(matches!(flow.verify(&api, &session).await, Err(FlowError::Busy)));
        assert_eq!(api.calls().len(), 1);
        drop(guard);

        assert!(flow.can_verify());
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_released_when_call_is_abandoned() {
        let api = MockApi {
            hang: true,
            ..MockApi::default()
        };
        let mut flow = LoginFlow::new();

        let outcome = tokio::time::timeout(Duration::from_secs(5), flow.submit(&api, login_form())).await;
        assert!(outcome.is_err(), "hung request should time out");
        assert!(!flow.is_busy());
        assert_eq!(flow.step(), Step::Credentials);
    }

    #[tokio::test]
    async fn test_oauth_skips_both_steps() {
        let api = MockApi::default();
        let session = session_store();
        let mut flow = SignupFlow::new();

        let user = flow.oauth(&api, &session, "google-jwt").await.unwrap();
        assert_eq!(user.username, "gina");
        assert_eq!(session.token().as_deref(), Some("oauth-tok"));
        assert_eq!(flow.step(), Step::Complete);
        assert_eq!(api.calls(), vec!["signup-oauth:google-jwt".to_string()]);
    }

    #[tokio::test]
    async fn test_oauth_failure_leaves_session_empty() {
        let api = MockApi::default();
        *api.oauth_failure.lock().unwrap() = Some(ApiError::Unauthorized("Invalid Google token".into()));
        let session = session_store();
        let mut flow = LoginFlow::new();

        let err = flow.oauth(&api, &session, "bad").await.unwrap_err();
        assert_eq!(err.user_message(), "Invalid Google token");
        assert!(session.current_user().is_none());
        assert_eq!(flow.step(), Step::Credentials);
    }

    #[tokio::test]
    async fn test_oauth_empty_credential_not_sent() {
        let api = MockApi::default();
        let session = session_store();
        let mut flow = LoginFlow::new();

        let err = flow.oauth(&api, &session, "  ").await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::Validation(ValidationError::Required(Field::OAuthCredential))
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_login_sends_unusual_email_to_server() {
        let api = MockApi::default();
        let mut flow = LoginFlow::new();

        flow.submit(&api, LoginForm::new("admin@localhost", "pw")).await.unwrap();
        assert_eq!(api.calls(), vec!["login-otp:admin@localhost".to_string()]);
        assert_eq!(flow.step(), Step::Verify);
    }

    #[tokio::test]
    async fn test_redirect_continues_as_signup() {
        let api = MockApi::default();
        api.fail_otp_once(ApiError::NotFound("User not found".into()));
        let session = session_store();
        let mut login = LoginFlow::new();

        let err = login
            .submit(&api, LoginForm::new(" new@example.com ", "hunter22"))
            .await
            .unwrap_err();
        let (mut signup, mut form) = login.continue_as_signup(&err).expect("redirect to signup");
        assert_eq!(signup.step(), Step::Credentials);
        assert_eq!(form.email, "new@example.com");
        assert!(form.password.is_empty());

        form.username = "newbie".into();
        form.dob = "2001-01-01".into();
        form.password = "hunter22".into();
        form.confirm_password = "hunter22".into();
        signup.submit(&api, form).await.unwrap();
        signup.set_otp_input(GOOD_CODE);
        signup.verify(&api, &session).await.unwrap();

        assert_eq!(
            session.current_user().map(|u| u.email),
            Some("new@example.com".to_string())
        );
        assert_eq!(
            api.calls(),
            vec![
                "login-otp: new@example.com ".to_string(),
                "signup-otp:new@example.com".to_string(),
                "signup-verify:new@example.com:123456".to_string(),
            ]
        );
    }

    #[test]
    fn test_only_redirects_continue_as_signup() {
        let flow = LoginFlow::new();
        assert!(flow.continue_as_signup(&FlowError::Busy).is_none());
        let err = FlowError::Api(ApiError::NotFound("Route missing".into()));
        assert!(flow.continue_as_signup(&err).is_none());
        let err = FlowError::Redirect {
            to: FlowKind::Login,
            email: "ana@example.com".into(),
            message: "Account exists".into(),
        };
        assert!(flow.continue_as_signup(&err).is_none());
    }
}
