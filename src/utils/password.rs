use crate::error::{AppError, AppResult};
use bcrypt::verify;

/// Check a login password against the configured credential. Configured
/// values starting with a bcrypt prefix are treated as hashes; anything else
/// is compared for plain equality (the simple single-event deployment).
pub fn credential_matches(supplied: &str, configured: &str) -> AppResult<bool> {
    if configured.starts_with("$2") {
        verify(supplied, configured)
            .map_err(|e| AppError::InternalError(format!("password verification failed: {e}")))
    } else {
        Ok(supplied == configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcrypt::{DEFAULT_COST, hash};

    #[test]
    fn plain_equality() {
        assert!(credential_matches("orientation2026", "orientation2026").unwrap());
        assert!(!credential_matches("nope", "orientation2026").unwrap());
    }

    #[test]
    fn bcrypt_hashes() {
        let hashed = hash("orientation2026", DEFAULT_COST).unwrap();
        assert!(credential_matches("orientation2026", &hashed).unwrap());
        assert!(!credential_matches("nope", &hashed).unwrap());
    }
}
