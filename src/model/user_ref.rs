//! Canonical login extraction from the shapes a user reference arrives in.
//!
//! A reference is tried as a record (`{"login": ...}`), then as JSON text, then as a bare
//! login. Each stage either does not apply to the value or produces a result; the first
//! stage that applies wins.

use log::warn;
use serde_json::Value;
use thiserror::Error;

/// Login used when a reference carries no usable identifier.
pub const UNKNOWN_LOGIN: &str = "N/A";

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Login(String),
    Unknown,
}

impl UserRef {
    pub fn login(&self) -> Option<&str> {
        match self {
            UserRef::Login(login) => Some(login),
            UserRef::Unknown => None,
        }
    }

    pub fn into_login(self) -> String {
        match self {
            UserRef::Login(login) => login,
            UserRef::Unknown => UNKNOWN_LOGIN.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed JSON `{text}`: {source}")]
    MalformedJson {
        text: String,
        #[source]
        source: serde_json::Error,
    },
}

type Stage = fn(&Value) -> Option<Result<UserRef, DecodeError>>;

const STAGES: [Stage; 3] = [record_stage, json_text_stage, bare_stage];

pub fn parse_user(value: &Value) -> Result<UserRef, DecodeError> {
    STAGES
        .iter()
        .find_map(|stage| stage(value))
        .unwrap_or(Ok(UserRef::Unknown))
}

/// Login of a user reference, or [`UNKNOWN_LOGIN`]. Decode failures are logged, never raised.
pub fn normalize_login(value: &Value) -> String {
    match parse_user(value) {
        Ok(user) => user.into_login(),
        Err(err) => {
            warn!("⚠️ Could not extract login: {err}");
            UNKNOWN_LOGIN.to_string()
        }
    }
}

/// `login` of a record. `None` when `value` is not a record at all.
pub(crate) fn record_login(value: &Value) -> Option<UserRef> {
    let record = value.as_object()?;
    let user = match record.get("login").and_then(Value::as_str) {
        Some(login) if !login.is_empty() => UserRef::Login(login.to_string()),
        _ => UserRef::Unknown,
    };
    Some(user)
}

/// Decodes `text` when it looks like JSON. `None` means it should be read as a bare login.
pub(crate) fn decode_json_text(text: &str) -> Option<Result<Value, DecodeError>> {
    let trimmed = text.trim();
    if !matches!(trimmed.chars().next(), Some('{' | '[' | '"')) {
        return None;
    }
    let decoded = serde_json::from_str(trimmed).map_err(|source| DecodeError::MalformedJson {
        text: trimmed.chars().take(PREVIEW_CHARS).collect(),
        source,
    });
    Some(decoded)
}

fn record_stage(value: &Value) -> Option<Result<UserRef, DecodeError>> {
    record_login(value).map(Ok)
}

fn json_text_stage(value: &Value) -> Option<Result<UserRef, DecodeError>> {
    let decoded = decode_json_text(value.as_str()?)?;
    Some(decoded.map(|decoded| match &decoded {
        Value::String(login) => bare_login(login),
        other => record_login(other).unwrap_or(UserRef::Unknown),
    }))
}

fn bare_stage(value: &Value) -> Option<Result<UserRef, DecodeError>> {
    value.as_str().map(|text| Ok(bare_login(text)))
}

fn bare_login(text: &str) -> UserRef {
    match text.trim() {
        "" => UserRef::Unknown,
        login => UserRef::Login(login.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn record_with_login() {
        assert_eq!(normalize_login(&json!({"login": "octocat", "id": 1})), "octocat");
    }

    #[test]
    fn record_without_login_is_unknown() {
        assert_eq!(normalize_login(&json!({"id": 1})), UNKNOWN_LOGIN);
        assert_eq!(normalize_login(&json!({"login": null})), UNKNOWN_LOGIN);
    }

    #[test]
    fn json_text_record() {
        assert_eq!(normalize_login(&json!(r#"{"login": "octocat"}"#)), "octocat");
        assert_eq!(normalize_login(&json!(r#""octocat""#)), "octocat");
    }

    #[test]
    fn bare_login_is_kept() {
        assert_eq!(normalize_login(&json!("octocat")), "octocat");
        assert_eq!(normalize_login(&json!("  octocat ")), "octocat");
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let value = json!(r#"{"login": "octo"#);
        assert!(matches!(parse_user(&value), Err(DecodeError::MalformedJson { .. })));
        assert_eq!(normalize_login(&value), UNKNOWN_LOGIN);
    }

    #[test]
    fn other_shapes_are_unknown() {
        for value in [json!(null), json!(""), json!(42), json!(true), json!(["octocat"])] {
            assert_eq!(parse_user(&value).unwrap(), UserRef::Unknown, "{value}");
        }
        assert_eq!(parse_user(&json!("[1, 2]")).unwrap(), UserRef::Unknown);
    }

    fn login_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9][a-zA-Z0-9-]{0,38}"
    }

    proptest! {
        #[test]
        fn normalizing_is_idempotent(login in login_strategy(), shape in 0..3u8) {
            let value = match shape {
                0 => json!({"login": login}),
                1 => json!(json!({"login": login}).to_string()),
                _ => json!(login),
            };
            let once = normalize_login(&value);
            prop_assert_eq!(&once, &login);
            prop_assert_eq!(normalize_login(&json!(once.clone())), once);
        }
    }
}
