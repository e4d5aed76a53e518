use chrono::Duration;

use super::claims::Claims;
use super::claims::TokenType;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Lifetimes of the two token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
        }
    }
}

/// An encoded token together with the claims it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Access and refresh tokens bound to the same subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Issues and verifies typed token pairs.
pub struct TokenIssuer {
    jwt_handler: JwtHandler,
    lifetimes: TokenLifetimes,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], lifetimes: TokenLifetimes) -> Self {
        Self {
            jwt_handler: JwtHandler::new(secret),
            lifetimes,
        }
    }

    /// Issue a fresh access/refresh pair for a subject.
    ///
    /// Each token gets its own `jti`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_pair(&self, subject: impl ToString) -> Result<IssuedPair, JwtError> {
        let subject = subject.to_string();

        Ok(IssuedPair {
            access: self.issue(TokenType::Access, &subject)?,
            refresh: self.issue(TokenType::Refresh, &subject)?,
        })
    }

    fn issue(&self, token_type: TokenType, subject: &str) -> Result<IssuedToken, JwtError> {
        let lifetime = match token_type {
            TokenType::Access => self.lifetimes.access,
            TokenType::Refresh => self.lifetimes.refresh,
        };
        let claims = Claims::new(token_type, subject, lifetime);
        let token = self.jwt_handler.encode(&claims)?;

        Ok(IssuedToken { token, claims })
    }

    /// Encode arbitrary claims with the issuer's key.
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        self.jwt_handler.encode(claims)
    }

    /// Verify signature, expiry and token kind.
    ///
    /// # Errors
    /// * `TokenExpired` - Token has expired
    /// * `InvalidSignature` - Token was not signed by this issuer
    /// * `DecodingFailed` - Token is malformed
    /// * `WrongTokenType` - Token is valid but of the other kind
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims: Claims = self.jwt_handler.decode(token)?;

        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }
}
