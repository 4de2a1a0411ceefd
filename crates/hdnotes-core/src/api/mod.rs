//! HTTP access to the HD Notes API.
//!
//! `client` owns transport concerns; `auth` and `notes` add the endpoints.

pub mod auth;
pub mod client;
pub mod error;
pub mod notes;

pub use auth::AuthApi;
pub use client::{ApiClient, ApiResult, DEFAULT_API_BASE_URL};
pub use error::ApiError;
