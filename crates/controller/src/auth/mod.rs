//! Session tokens and password credentials
//!
//! Sessions are stateless: identity is asserted by a signed token carried
//! in a client-held cookie and verified per request without any server-side
//! session store. Logout only clears the cookie, an already issued token
//! stays valid until its embedded expiry.
use crate::settings;
use chrono::{Duration, Utc};

mod jwt;
pub mod password;

pub use jwt::{SessionClaims, VerifyError};

/// Issues and verifies the signed session tokens
pub struct AuthContext {
    secret: String,
    token_lifetime: Duration,
}

impl AuthContext {
    pub fn new(settings: &settings::Session) -> Self {
        Self {
            secret: settings.secret.clone(),
            token_lifetime: Duration::seconds(settings.token_lifetime_secs as i64),
        }
    }

    /// Produces a signed token asserting the given email, expiring
    /// `token_lifetime` from now.
    pub fn issue_token(&self, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();

        let claims = SessionClaims {
            sub: email.to_owned(),
            iat: now.timestamp(),
            exp: (now + self.token_lifetime).timestamp(),
        };

        jwt::sign(self.secret.as_bytes(), &claims)
    }

    /// Checks signature and expiry of a token and returns the asserted
    /// email.
    ///
    /// Any signature mismatch, malformed payload or expiry breach yields an
    /// error, never a partial identity.
    pub fn verify_token(&self, token: &str) -> Result<String, VerifyError> {
        jwt::verify(self.secret.as_bytes(), token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn make_ctx() -> AuthContext {
        AuthContext::new(&settings::Session {
            secret: "test-secret".into(),
            token_lifetime_secs: 5 * 60 * 60,
            cookie_max_age_secs: 60 * 60,
        })
    }

    #[test]
    fn token_round_trip() {
        let ctx = make_ctx();

        let token = ctx.issue_token("rider@example.org").unwrap();
        let email = ctx.verify_token(&token).expect("fresh token must verify");

        assert_eq!(email, "rider@example.org");
    }

    #[test]
    fn expired_token() {
        let ctx = make_ctx();

        let now = Utc::now();
        let claims = SessionClaims {
            sub: "rider@example.org".into(),
            iat: (now - Duration::seconds(400)).timestamp(),
            exp: (now - Duration::seconds(100)).timestamp(),
        };
        let token = jwt::sign("test-secret".as_bytes(), &claims).unwrap();

        assert_eq!(ctx.verify_token(&token), Err(VerifyError::Expired));
    }

    #[test]
    fn bad_signature() {
        let ctx = make_ctx();

        let forged = AuthContext {
            secret: "other-secret".into(),
            token_lifetime: Duration::seconds(300),
        };
        let token = forged.issue_token("rider@example.org").unwrap();

        assert_eq!(
            ctx.verify_token(&token),
            Err(VerifyError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_token() {
        let ctx = make_ctx();

        assert_eq!(
            ctx.verify_token("not-a-token"),
            Err(VerifyError::InvalidToken)
        );
    }
}
