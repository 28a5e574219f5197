//! Basic auth gate in front of the admin routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;
use std::sync::Arc;

/// Credentials the admin dashboard is locked behind. Loaded once at startup;
/// with no credentials configured the gate stays open and says so in the log.
#[derive(Debug, Default)]
pub struct AuthConfig {
    credentials: Option<(String, String)>,
}

impl AuthConfig {
    /// Read `ADMIN_USERNAME` and `ADMIN_PASSWORD`. Half a configuration is
    /// treated as none at all rather than locking the dashboard with a
    /// credential nobody can type.
    pub fn from_env() -> Self {
        match (non_empty_var("ADMIN_USERNAME"), non_empty_var("ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => {
                tracing::info!("Admin routes require Basic auth");
                Self {
                    credentials: Some((username, password)),
                }
            }
            (None, None) => {
                tracing::warn!("ADMIN_USERNAME/ADMIN_PASSWORD unset, admin routes are open");
                Self::default()
            }
            _ => {
                tracing::warn!("Ignoring half-configured admin credentials, admin routes are open");
                Self::default()
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.credentials.is_none()
    }

    pub fn accepts(&self, username: &str, password: &str) -> bool {
        match &self.credentials {
            // Non-short-circuiting `&` keeps the comparison time independent
            // of which field mismatched.
            Some((u, p)) => eq_constant_time(u, username) & eq_constant_time(p, password),
            None => true,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Comparison that does not leak where the first mismatch sits. The length
/// still leaks, which Basic auth over the wire leaks anyway.
fn eq_constant_time(expected: &str, provided: &str) -> bool {
    let expected = expected.as_bytes();
    let provided = provided.as_bytes();
    let mut diff = expected.len() ^ provided.len();
    for (i, byte) in expected.iter().enumerate() {
        diff |= usize::from(byte ^ provided.get(i).copied().unwrap_or(0));
    }
    diff == 0
}

/// Pull the username/password pair out of an `Authorization` header value.
fn parse_basic(value: &HeaderValue) -> Option<(String, String)> {
    let encoded = value.to_str().ok()?.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

pub async fn admin_auth_middleware(
    State(config): State<Arc<AuthConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authorized = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(parse_basic)
    {
        Some((username, password)) => config.accepts(&username, &password),
        None => config.is_open(),
    };

    if authorized {
        return next.run(request).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"prizmo-admin\"")],
        "Unauthorized",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked() -> AuthConfig {
        AuthConfig {
            credentials: Some(("wheel".to_string(), "fortune".to_string())),
        }
    }

    #[test]
    fn test_exact_credentials_only() {
        let config = locked();
        assert!(!config.is_open());
        assert!(config.accepts("wheel", "fortune"));
        assert!(!config.accepts("wheel", "misfortune"));
        assert!(!config.accepts("Wheel", "fortune"));
        assert!(!config.accepts("", ""));
    }

    #[test]
    fn test_open_config_accepts_anything() {
        let config = AuthConfig::default();
        assert!(config.is_open());
        assert!(config.accepts("whoever", "whatever"));
    }

    #[test]
    fn test_parse_basic_header() {
        // "wheel:fortune"
        let value = HeaderValue::from_static("Basic d2hlZWw6Zm9ydHVuZQ==");
        let parsed = parse_basic(&value);
        assert_eq!(parsed, Some(("wheel".to_string(), "fortune".to_string())));

        // An empty password is still a well-formed pair.
        let value = HeaderValue::from_static("Basic d2hlZWw6");
        let parsed = parse_basic(&value);
        assert_eq!(parsed, Some(("wheel".to_string(), String::new())));
    }

    #[test]
    fn test_parse_rejects_malformed_headers() {
        // Wrong scheme, invalid base64, and a payload with no colon.
        for raw in ["Bearer d2hlZWw6Zm9ydHVuZQ==", "Basic !!!", "Basic d2hlZWw="] {
            assert_eq!(parse_basic(&HeaderValue::from_static(raw)), None, "{raw}");
        }
    }

    #[test]
    fn test_eq_constant_time() {
        assert!(eq_constant_time("fortune", "fortune"));
        assert!(!eq_constant_time("fortune", "fortunes"));
        assert!(!eq_constant_time("fortune", "misfortu"));
        assert!(!eq_constant_time("fortune", ""));
        assert!(eq_constant_time("", ""));
    }
}
