mod admin_key;
mod traits;
mod types;

pub use admin_key::*;
pub use traits::*;
pub use types::*;

use crate::config::AuthConfig;

/// Factory function to create the admin authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    if !config.is_configured() {
        return Err(AuthError::ConfigurationError(
            "admin_key must be set".to_string(),
        ));
    }
    Ok(Box::new(AdminKeyAuthenticator::new(config.admin_key.clone())))
}
