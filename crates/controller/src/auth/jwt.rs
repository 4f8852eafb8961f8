use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Not a valid session token")]
    InvalidToken,
    #[error("Session token is expired")]
    Expired,
    #[error("Session token has an invalid signature")]
    InvalidSignature,
}

/// Claims embedded in every session token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (the user's email)
    pub sub: String,
    /// Issued at, seconds since the unix epoch
    pub iat: i64,
    /// Expires at, seconds since the unix epoch
    pub exp: i64,
}

/// Sign the claims into a HS256 token
pub fn sign(secret: &[u8], claims: &SessionClaims) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Verify a raw token.
///
/// Returns `Err(_)` if the token is malformed, carries a bad signature or
/// is expired.
pub fn verify(secret: &[u8], token: &str) -> Result<SessionClaims, VerifyError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // expiry is a hard boundary, no clock leeway
    validation.leeway = 0;

    decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => VerifyError::Expired,
            ErrorKind::InvalidSignature => VerifyError::InvalidSignature,
            _ => VerifyError::InvalidToken,
        })
}
