//! Shared state for one invocation of the CLI.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use hdnotes_core::api::{ApiClient, ApiError};
use hdnotes_core::auth::{Session, SessionStore};
use hdnotes_core::Config;
use tracing::{debug, warn};

use crate::auth;

pub struct App {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
}

impl App {
    /// Open storage, restore any persisted session, and start the expiry
    /// sweep. `api_url` overrides the configured base URL for this run only.
    pub fn new(config: Config, api_url: Option<String>) -> Result<Self> {
        let storage = config.open_storage()?;
        let session = Arc::new(SessionStore::new(storage).with_default_ttl(config.session_ttl()));
        session.load();
        session.start_expiry_sweep();

        let api = ApiClient::new(api_url.unwrap_or_else(|| config.resolved_base_url()))
            .context("Failed to build HTTP client")?
            .with_session(session.clone());
        debug!(base_url = %api.base_url(), storage = ?config.storage, "Client configured");

        Ok(Self {
            config,
            session,
            api,
        })
    }

    /// The current session. Without one the user is sent through login
    /// first.
    pub async fn require_session(&mut self) -> Result<Session> {
        if let Some(session) = self.session.current() {
            return Ok(session);
        }
        println!("You are not signed in.");
        auth::login(self, None).await?;
        self.session
            .current()
            .ok_or_else(|| anyhow!("Sign-in was cancelled"))
    }

    /// Store the address so the next login can offer it as the default.
    pub fn remember_email(&mut self, email: &str) {
        if self.config.last_email.as_deref() == Some(email) {
            return;
        }
        self.config.last_email = Some(email.to_string());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    /// Turn an API failure into a CLI error. A rejected token ends the
    /// session so the next command asks for a fresh login.
    pub fn api_failure(&self, e: ApiError) -> anyhow::Error {
        if let ApiError::Unauthorized(_) = e {
            warn!("Server rejected the session token");
            self.session.logout();
            return anyhow!("Your session is no longer valid. Run `hdnotes login` to sign in again.");
        }
        match e.server_message() {
            Some(message) => anyhow!("{}", message),
            None => e.into(),
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.session.stop_expiry_sweep();
    }
}
