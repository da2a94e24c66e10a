//! Admin key authentication.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Header carrying the admin credential.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Authenticator that validates requests against the configured admin key.
///
/// Accepts the key in either:
/// - `X-Admin-Key: <key>` header
/// - `Authorization: Bearer <key>` header
pub struct AdminKeyAuthenticator {
    expected_key: SecretString,
}

impl AdminKeyAuthenticator {
    pub fn new(admin_key: SecretString) -> Self {
        Self {
            expected_key: admin_key,
        }
    }

    /// Extract the admin key from request headers.
    fn extract_key<'a>(&self, request: &'a AuthRequest) -> Option<&'a str> {
        if let Some(key) = request.header(ADMIN_KEY_HEADER) {
            return Some(key);
        }

        let auth_header = request.header("authorization")?;
        auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
    }

    /// Synchronous check used by callers that only need a yes/no answer.
    pub fn verify(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let provided_key = self
            .extract_key(request)
            .ok_or(AuthError::NotAuthenticated)?;

        if constant_time_eq(
            provided_key.as_bytes(),
            self.expected_key.expose_secret().as_bytes(),
        ) {
            Ok(Identity::admin())
        } else {
            Err(AuthError::InvalidCredentials("Invalid admin key".to_string()))
        }
    }
}

#[async_trait]
impl Authenticator for AdminKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        self.verify(request)
    }

    fn method_name(&self) -> &'static str {
        "admin_key"
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
