//! Core library for hdnotes.
//!
//! Client-side session lifecycle and the OTP signup/login flow for the HD
//! Notes API, plus typed access to the notes endpoints. Front ends build on
//! three pieces:
//!
//! - [`auth::SessionStore`] owns the signed-in session, persists it, and
//!   expires it
//! - [`flow::CredentialFlow`] walks a user from credentials to a session
//! - [`api::ApiClient`] talks to the server, attaching the session's token
//!   to protected requests

pub mod api;
pub mod auth;
pub mod config;
pub mod flow;
pub mod models;
pub mod utils;

pub use config::Config;
