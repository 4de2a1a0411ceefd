use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::storage::{KeyValueStore, StorageError};
use crate::models::User;

/// Persisted key for the serialized user record
pub const USER_KEY: &str = "user";

/// Persisted key for the bearer token
pub const TOKEN_KEY: &str = "token";

/// Persisted key for the absolute expiry, in milliseconds since the epoch
pub const EXPIRY_KEY: &str = "tokenExpiry";

const SESSION_KEYS: [&str; 3] = [USER_KEY, TOKEN_KEY, EXPIRY_KEY];

/// Session lifetime when the caller does not ask for one.
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// How often the background sweep re-checks the persisted expiry.
pub const SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(60);

/// A logged-in session. Either all of it exists or none of it does.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn time_until_expiry(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }
}

/// Why persisted session state could not be used.
#[derive(Error, Debug)]
enum PersistedError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("session keys only partially present")]
    Incomplete,

    #[error("malformed {key}: {reason}")]
    Malformed { key: &'static str, reason: String },
}

/// Single owner of "who is logged in, and with what token".
///
/// Everything else reads the session through this store and changes it
/// only via `login` and `logout`. Changes are broadcast on a watch channel.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
    state: watch::Sender<Option<Session>>,
    sweep: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            storage,
            clock: Arc::new(SystemClock),
            default_ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
            state,
            sweep: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Read the persisted session. Call once at startup, before any
    /// authorized request.
    ///
    /// Expired, partial, or unreadable state is cleared and reported as
    /// no session; this never fails.
    pub fn load(&self) -> Option<Session> {
        let now = self.clock.now();
        let session = match self.read_persisted() {
            Ok(Some(session)) if !session.is_expired_at(now) => {
                debug!(
                    user_id = %session.user.id,
                    minutes_left = session.time_until_expiry(now).num_minutes(),
                    "Session loaded"
                );
                Some(session)
            }
            Ok(Some(session)) => {
                info!(expired_at = %session.expires_at, "Persisted session expired");
                self.clear_persisted();
                None
            }
            Ok(None) => {
                debug!("No persisted session");
                None
            }
            Err(e) => {
                warn!(error = %e, "Discarding unusable persisted session");
                self.clear_persisted();
                None
            }
        };
        self.state.send_replace(session.clone());
        session
    }

    /// Log in with the default TTL.
    pub fn login(&self, user: User, token: String) -> Session {
        self.login_with_ttl(user, token, self.default_ttl)
    }

    /// Replace any current session with a new one expiring `ttl` from now.
    ///
    /// A storage failure is logged; the session then lives in memory only
    /// and will not survive a restart.
    pub fn login_with_ttl(&self, user: User, token: String, ttl: Duration) -> Session {
        let session = Session {
            user,
            token,
            expires_at: self.expiry_after(ttl),
        };

        if let Err(e) = self.persist(&session) {
            warn!(error = %e, "Failed to persist session");
        }

        info!(user_id = %session.user.id, expires_at = %session.expires_at, "Logged in");
        self.state.send_replace(Some(session.clone()));
        session
    }

    /// Drop the session from memory and storage. Subscribers are only
    /// notified when there was a session to drop.
    pub fn logout(&self) {
        self.clear_persisted();
        let had_session = self.state.send_if_modified(|state| state.take().is_some());
        if had_session {
            info!("Logged out");
        }
    }

    /// The current session, if one exists and has not expired.
    /// An expired session is logged out before returning.
    pub fn current(&self) -> Option<Session> {
        let now = self.clock.now();
        let snapshot = self.state.borrow().as_ref().cloned();
        match snapshot {
            Some(session) if session.is_expired_at(now) => {
                info!(expired_at = %session.expires_at, "Session expired");
                self.logout();
                None
            }
            other => other,
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.current().map(|s| s.user)
    }

    /// Get the bearer token if the session is valid
    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Set `Authorization: Bearer <token>` on an outgoing request when a
    /// valid token exists. Without one the request goes out as-is and the
    /// server decides.
    pub fn attach_authorization(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => {
                debug!("No valid session, sending request unauthenticated");
                request
            }
        }
    }

    /// Receive every session change (login, logout, expiry).
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    /// One sweep tick: log out if the persisted (or in-memory) expiry has
    /// passed. Returns whether it did.
    pub fn check_expiry(&self) -> bool {
        let now = self.clock.now();

        let persisted_expired = match self.storage.get(EXPIRY_KEY) {
            Ok(Some(raw)) => parse_expiry(&raw).map(|at| now > at).unwrap_or(true),
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, "Could not read persisted expiry");
                false
            }
        };
        let memory_expired = self
            .state
            .borrow()
            .as_ref()
            .map(|s| s.is_expired_at(now))
            .unwrap_or(false);

        if persisted_expired || memory_expired {
            info!("Session expired, logging out");
            self.logout();
            true
        } else {
            false
        }
    }

    /// Start the periodic expiry sweep on the current tokio runtime.
    ///
    /// Replaces (and stops) a sweep started earlier. The task only holds a
    /// weak reference and is aborted when the store is dropped.
    pub fn start_expiry_sweep(self: &Arc<Self>) {
        let store = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.check_expiry();
            }
        });

        match self.sweep.lock() {
            Ok(mut slot) => {
                if let Some(previous) = slot.replace(handle) {
                    previous.abort();
                }
            }
            Err(_) => {
                warn!("Sweep handle lock poisoned, not starting expiry sweep");
                handle.abort();
            }
        }
        debug!(interval_secs = SWEEP_INTERVAL.as_secs(), "Expiry sweep started");
    }

    pub fn stop_expiry_sweep(&self) {
        if let Ok(mut slot) = self.sweep.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
                debug!("Expiry sweep stopped");
            }
        }
    }

    /// `now + ttl`. A TTL that runs past the calendar falls back to the
    /// default lifetime.
    fn expiry_after(&self, ttl: Duration) -> DateTime<Utc> {
        let now = self.clock.now();
        if let Some(at) = now.checked_add_signed(ttl) {
            return at;
        }
        warn!(ttl_days = ttl.num_days(), "Session TTL out of range, using the default");
        Duration::try_days(DEFAULT_SESSION_TTL_DAYS)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn persist(&self, session: &Session) -> Result<(), PersistedError> {
        let user = serde_json::to_string(&session.user).map_err(|e| PersistedError::Malformed {
            key: USER_KEY,
            reason: e.to_string(),
        })?;
        let expiry = session.expires_at.timestamp_millis().to_string();
        self.storage.set_many(&[
            (USER_KEY, user.as_str()),
            (TOKEN_KEY, session.token.as_str()),
            (EXPIRY_KEY, expiry.as_str()),
        ])?;
        Ok(())
    }

    fn read_persisted(&self) -> Result<Option<Session>, PersistedError> {
        let user = self.storage.get(USER_KEY)?;
        let token = self.storage.get(TOKEN_KEY)?;
        let expiry = self.storage.get(EXPIRY_KEY)?;

        let (user, token, expiry) = match (user, token, expiry) {
            (None, None, None) => return Ok(None),
            (Some(user), Some(token), Some(expiry)) => (user, token, expiry),
            _ => return Err(PersistedError::Incomplete),
        };

        let user: User = serde_json::from_str(&user).map_err(|e| PersistedError::Malformed {
            key: USER_KEY,
            reason: e.to_string(),
        })?;
        if token.is_empty() {
            return Err(PersistedError::Malformed {
                key: TOKEN_KEY,
                reason: "empty token".to_string(),
            });
        }
        let expires_at = parse_expiry(&expiry).ok_or_else(|| PersistedError::Malformed {
            key: EXPIRY_KEY,
            reason: format!("not a millisecond timestamp: {}", expiry),
        })?;

        Ok(Some(Session {
            user,
            token,
            expires_at,
        }))
    }

    fn clear_persisted(&self) {
        if let Err(e) = self.storage.remove_many(&SESSION_KEYS) {
            warn!(error = %e, "Failed to clear persisted session");
        }
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.sweep.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }
}

fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}
