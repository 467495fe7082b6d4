/// Structured error types for ventas-core.
///
/// Uses `thiserror` for better API surface and error composition.
/// The binary crate (ventas-cli) can still use `anyhow` for convenience,
/// but library consumers get structured, composable errors.

use thiserror::Error;

/// Main error type for configuration resolution
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A credential source was partially configured
    #[error("missing required variables ({convention}): {}", .missing.join(", "))]
    MissingVars {
        convention: &'static str,
        missing: Vec<String>,
    },

    /// Secret vault request failed or returned a malformed payload
    #[error("vault lookup for '{secret}' failed: {reason}")]
    Vault { secret: String, reason: String },

    /// A variable was set but its value is unusable
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Result type alias for ventas-core operations
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Create a vault error
    pub fn vault(secret: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Vault {
            secret: secret.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-value error
    pub fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_vars_display_names_each_variable() {
        let err = ConfigError::MissingVars {
            convention: "DBUSERNAME/DBPASSWORD/DBHOST/DBNAME",
            missing: vec!["DBPASSWORD".into(), "DBNAME".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("DBPASSWORD"));
        assert!(msg.contains("DBNAME"));
        assert!(msg.contains("DBUSERNAME/DBPASSWORD/DBHOST/DBNAME"));
    }

    #[test]
    fn vault_error_display() {
        let err = ConfigError::vault("DBHOST", "connection refused");
        assert_eq!(
            err.to_string(),
            "vault lookup for 'DBHOST' failed: connection refused"
        );
    }
}
