use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::string_or_number;

/// The account record returned by the auth endpoints.
///
/// Only identity fields are typed. Everything else the server sends
/// (profile data, timestamps) is kept in `extra` and written back verbatim
/// when the session is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            email: email.into(),
            extra: Map::new(),
        }
    }

    /// Name to greet the user with: username, or the email when the
    /// account has none (OAuth signups sometimes arrive without one).
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            &self.email
        } else {
            &self.username
        }
    }
}

/// Successful verify-otp or oauth response: the account plus its bearer token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthGrant {
    pub user: User,
    pub token: String,
}

/// Acknowledgement from an OTP-request endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OtpAck {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_accepts_mongo_style_id() {
        let json = r#"{"_id":"66a1f","username":"ana","email":"ana@example.com","dob":"2000-01-02"}"#;
        let user: User = serde_json::from_str(json).expect("parse user");
        assert_eq!(user.id, "66a1f");
        assert_eq!(user.username, "ana");
        assert_eq!(user.extra.get("dob"), Some(&Value::String("2000-01-02".into())));
    }

    #[test]
    fn test_user_numeric_id() {
        let user: User = serde_json::from_str(r#"{"id":42,"email":"x@y.io"}"#).expect("parse user");
        assert_eq!(user.id, "42");
        assert_eq!(user.username, "");
        assert_eq!(user.display_name(), "x@y.io");
    }

    #[test]
    fn test_user_extra_fields_survive_round_trip() {
        let json = r#"{"id":"1","username":"ana","email":"a@b.co","provider":"google"}"#;
        let user: User = serde_json::from_str(json).expect("parse user");
        let back: Value = serde_json::to_value(&user).expect("serialize user");
        assert_eq!(back["provider"], "google");
        assert_eq!(back["id"], "1");
    }

    #[test]
    fn test_auth_grant_parse() {
        let json = r#"{"user":{"id":"1","username":"ana","email":"a@b.co"},"token":"jwt.abc"}"#;
        let grant: AuthGrant = serde_json::from_str(json).expect("parse grant");
        assert_eq!(grant.token, "jwt.abc");
        assert_eq!(grant.user.display_name(), "ana");
    }
}
