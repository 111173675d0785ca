//! Shared-secret authentication.
//!
//! Every `/v1` request must present `Authorization: Basic <secret>` where
//! `<secret>` is exactly the configured value. There are no users or roles.

use secrecy::{ExposeSecret, SecretString};

use crate::constants::{BASIC_AUTH_ENV, BASIC_AUTH_PREFIX};
use crate::error::{ApiError, ApiResult};

// ============================================================================
// SHARED SECRET (TYPE-SAFE)
// ============================================================================

/// The configured credential, kept out of logs.
#[derive(Clone)]
pub struct SharedSecret(SecretString);

impl SharedSecret {
    /// Wrap a secret. Empty values are treated as "not configured".
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret: String = secret.into();
        if secret.is_empty() {
            return None;
        }
        Some(Self(SecretString::from(secret)))
    }

    /// Compare the full header value against `Basic <secret>`.
    pub fn matches_header(&self, header: &str) -> bool {
        header
            .strip_prefix(BASIC_AUTH_PREFIX)
            .is_some_and(|presented| presented == self.0.expose_secret())
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

// ============================================================================
// AUTH CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// `None` means every authenticated request fails with a server error.
    pub shared_secret: Option<SharedSecret>,
}

impl AuthConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            shared_secret: SharedSecret::new(secret),
        }
    }

    /// Load the secret from `CLOUDCMS_BASIC_AUTH`.
    pub fn from_env() -> Self {
        let shared_secret = std::env::var(BASIC_AUTH_ENV).ok().and_then(SharedSecret::new);
        if shared_secret.is_none() {
            tracing::warn!(
                env = BASIC_AUTH_ENV,
                "No shared secret configured; authenticated routes will answer 500"
            );
        }
        Self { shared_secret }
    }
}

/// Validate the `Authorization` header value of one request.
pub fn authenticate(config: &AuthConfig, header: Option<&str>) -> ApiResult<()> {
    let Some(secret) = config.shared_secret.as_ref() else {
        return Err(ApiError::auth_not_configured());
    };

    match header {
        Some(value) if secret.matches_header(value) => Ok(()),
        _ => Err(ApiError::unauthorized()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_exact_match_required() {
        let config = AuthConfig::with_secret("s3cret");
        assert!(authenticate(&config, Some("Basic s3cret")).is_ok());

        for header in ["Basic s3cret ", "basic s3cret", "s3cret", "Basic ", "Bearer s3cret"] {
            let err = authenticate(&config, Some(header)).unwrap_err();
            assert_eq!(err.code, ErrorCode::Unauthorized, "header {header:?}");
        }
        assert_eq!(
            authenticate(&config, None).unwrap_err().code,
            ErrorCode::Unauthorized
        );
    }

    #[test]
    fn test_missing_secret_is_server_error() {
        let config = AuthConfig::default();
        let err = authenticate(&config, Some("Basic anything")).unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthNotConfigured);
        assert_eq!(err.message, "Authorization configuration missing on Server");
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        assert!(AuthConfig::with_secret("").shared_secret.is_none());
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let config = AuthConfig::with_secret("hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
