use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::models::SessionResponse;
use crate::utils::{SessionService, credential_matches};
use log::{info, warn};

/// Login against the configured admin accounts; successful logins get a
/// signed session token for the cookie.
#[derive(Clone)]
pub struct AuthService {
    admin: AdminConfig,
    sessions: SessionService,
}

impl AuthService {
    pub fn new(admin: AdminConfig, sessions: SessionService) -> Self {
        Self { admin, sessions }
    }

    /// Returns the session token and the response body on success. Unknown
    /// account and wrong password are deliberately indistinguishable.
    pub fn login(&self, id: &str, password: &str) -> AppResult<(String, SessionResponse)> {
        let account = self.admin.accounts.iter().find(|a| a.id == id);

        let matched = match account {
            Some(account) => credential_matches(password, &account.password)?,
            None => false,
        };
        let Some(account) = account.filter(|_| matched) else {
            warn!("rejected login for '{id}'");
            return Err(AppError::AuthError("invalid credentials".to_string()));
        };

        let token = self.sessions.issue(&account.id, &account.department)?;
        info!("admin '{}' logged in", account.id);
        Ok((
            token,
            SessionResponse {
                admin_id: account.id.clone(),
                department: account.department.clone(),
                expires_in: self.sessions.expires_in(),
            },
        ))
    }

    pub fn sessions(&self) -> &SessionService {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminAccount;

    fn service() -> AuthService {
        AuthService::new(
            AdminConfig {
                accounts: vec![AdminAccount {
                    id: "admin".to_string(),
                    password: "orientation2026".to_string(),
                    department: "student-affairs".to_string(),
                }],
            },
            SessionService::new("test-secret", 3600),
        )
    }

    #[test]
    fn valid_credentials_issue_a_session() {
        let auth = service();
        let (token, session) = auth.login("admin", "orientation2026").unwrap();
        assert!(!token.is_empty());
        assert_eq!(session.admin_id, "admin");
        assert_eq!(session.department, "student-affairs");

        let claims = auth.sessions().verify(&token).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[test]
    fn unknown_account_and_wrong_password_are_equivalent() {
        let auth = service();
        let unknown = auth.login("ghost", "orientation2026").unwrap_err();
        let wrong = auth.login("admin", "nope").unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }
}
