//! Persisted cookie entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One cookie as stored under `domain -> name` in a jar document
///
/// Field tags are PascalCase so jar files stay interchangeable with other
/// persistent cookie-jar implementations. Nothing here is validated or
/// expired on read or write; that is the HTTP layer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cookie {
    pub name: String,

    pub value: String,

    /// Domain attribute as received (without leading dot)
    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub path: String,

    /// "Strict", "Lax", "None" or empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub same_site: String,

    #[serde(default)]
    pub secure: bool,

    #[serde(default)]
    pub http_only: bool,

    /// False for session cookies
    #[serde(default)]
    pub persistent: bool,

    #[serde(default)]
    pub host_only: bool,

    #[serde(default)]
    pub expires: DateTime<Utc>,

    #[serde(default)]
    pub creation: DateTime<Utc>,

    #[serde(default)]
    pub last_access: DateTime<Utc>,

    /// Last time the entry was set or refreshed
    #[serde(default)]
    pub updated: DateTime<Utc>,

    /// Host the cookie was received from
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub canonical_host: String,

    /// Unknown fields for forward compatibility
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl Cookie {
    /// A host-only session cookie stamped with the current time
    pub fn new(domain: &str, name: &str, value: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.to_string(),
            path: "/".to_string(),
            same_site: String::new(),
            secure: false,
            http_only: false,
            persistent: false,
            host_only: true,
            expires: DateTime::<Utc>::default(),
            creation: now,
            last_access: now,
            updated: now,
            canonical_host: domain.to_string(),
            unknown_fields: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_parse_minimal() {
        let json = r#"{"Name": "sid", "Value": "abc123"}"#;

        let cookie: Cookie = serde_json::from_str(json).unwrap();
        assert_eq!(cookie.name, "sid");
        assert_eq!(cookie.value, "abc123");
        assert!(cookie.domain.is_empty());
        assert!(!cookie.secure);
        assert_eq!(cookie.expires, DateTime::<Utc>::default());
    }

    #[test]
    fn test_cookie_parse_full_entry() {
        let json = r#"{
            "Name": "sid",
            "Value": "abc123",
            "Domain": "example.com",
            "Path": "/",
            "SameSite": "Lax",
            "Secure": true,
            "HttpOnly": true,
            "Persistent": true,
            "HostOnly": false,
            "Expires": "2027-01-01T00:00:00Z",
            "Creation": "2026-10-01T12:00:00Z",
            "LastAccess": "2026-10-02T12:00:00Z",
            "Updated": "2026-10-02T12:00:00Z",
            "CanonicalHost": "www.example.com"
        }"#;

        let cookie: Cookie = serde_json::from_str(json).unwrap();
        assert_eq!(cookie.same_site, "Lax");
        assert!(cookie.secure && cookie.http_only && cookie.persistent);
        assert!(!cookie.host_only);
        assert_eq!(cookie.expires.to_rfc3339(), "2027-01-01T00:00:00+00:00");
        assert_eq!(cookie.canonical_host, "www.example.com");
        assert!(cookie.unknown_fields.is_empty());
    }

    #[test]
    fn test_cookie_accepts_zero_time() {
        // Writers that never set an expiry emit the year-1 zero time.
        let json = r#"{"Name": "a", "Value": "b", "Expires": "0001-01-01T00:00:00Z"}"#;

        let cookie: Cookie = serde_json::from_str(json).unwrap();
        assert_eq!(cookie.expires.to_rfc3339(), "0001-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_cookie_preserves_unknown_fields() {
        let json = r#"{
            "Name": "sid",
            "Value": "abc123",
            "Partitioned": true,
            "Priority": {"level": "High"}
        }"#;

        let cookie: Cookie = serde_json::from_str(json).unwrap();
        assert_eq!(cookie.unknown_fields.len(), 2);

        let serialized = serde_json::to_string(&cookie).unwrap();
        let reparsed: Cookie = serde_json::from_str(&serialized).unwrap();
        assert_eq!(reparsed.unknown_fields.get("Partitioned"), Some(&serde_json::json!(true)));
        assert_eq!(cookie, reparsed);
    }

    #[test]
    fn test_cookie_new_defaults() {
        let cookie = Cookie::new("example.com", "sid", "v");
        assert_eq!(cookie.path, "/");
        assert!(cookie.host_only);
        assert!(!cookie.persistent);
        assert_eq!(cookie.canonical_host, "example.com");
    }
}
