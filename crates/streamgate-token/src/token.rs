//! Token minting and verification.

use crate::claims::AccessClaims;
use crate::error::TokenError;
use crate::keys::KeyPair;
use biscuit_auth::builder::AuthorizerBuilder;
use biscuit_auth::macros::{check, fact};
use biscuit_auth::{Authorizer, Biscuit, PublicKey};
use chrono::{DateTime, Duration, Utc};

/// Result of verifying an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Claims decoded from the token.
    pub payload: AccessClaims,
    /// Whether every check embedded in the token passed.
    pub verified: bool,
}

/// Decodes an access token into claims.
///
/// Implementations return `Err` for tokens that cannot be decoded or whose
/// signature is wrong, and `Ok` with `verified == false` for authentic tokens
/// that are no longer valid.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Verification, TokenError>;
}

/// Mints access tokens. Used by the `streamgate token mint` command and by
/// tests; the gateway itself never issues tokens.
pub struct TokenIssuer {
    keypair: KeyPair,
}

impl TokenIssuer {
    pub fn new(keypair: KeyPair) -> Self {
        Self { keypair }
    }

    /// Mint a token for `claims`, valid for `expires_in` when given.
    pub fn mint(
        &self,
        claims: &AccessClaims,
        expires_in: Option<Duration>,
    ) -> Result<String, TokenError> {
        let created = |e: biscuit_auth::error::Token| TokenError::TokenCreationFailed(e.to_string());

        let mut builder = Biscuit::builder()
            .fact(fact!("base_url({url})", url = claims.base_url.clone()))
            .map_err(created)?
            .fact(fact!("path({path})", path = claims.path.clone()))
            .map_err(created)?;

        if let Some(org_id) = &claims.org_id {
            builder = builder
                .fact(fact!("org_id({org})", org = org_id.clone()))
                .map_err(created)?;
        }
        if let Some(role) = &claims.role {
            builder = builder
                .fact(fact!("role({role})", role = role.clone()))
                .map_err(created)?;
        }
        if let Some(extra) = &claims.extra_data {
            builder = builder
                .fact(fact!("extra_data({extra})", extra = extra.clone()))
                .map_err(created)?;
        }

        let expires_at = match expires_in {
            Some(d) => Some(Utc::now().checked_add_signed(d).ok_or_else(|| {
                TokenError::TokenCreationFailed(format!("expiry {d} is out of range"))
            })?),
            None => claims.expires_at,
        };
        if let Some(expires_at) = expires_at {
            let ts = expires_at.timestamp();
            builder = builder
                .fact(fact!("expires_at({ts})", ts = ts))
                .map_err(created)?
                .check(check!("check if time($time), $time < {ts}", ts = ts))
                .map_err(created)?;
        }

        let biscuit = builder.build(self.keypair.inner()).map_err(created)?;

        biscuit
            .to_base64()
            .map_err(|e| TokenError::SerializationError(e.to_string()))
    }
}

/// Verifies Biscuit access tokens against a root public key.
pub struct BiscuitVerifier {
    public_key: PublicKey,
}

impl BiscuitVerifier {
    pub fn new(public_key: PublicKey) -> Self {
        Self { public_key }
    }
}

impl TokenVerifier for BiscuitVerifier {
    fn verify(&self, token: &str) -> Result<Verification, TokenError> {
        let biscuit = Biscuit::from_base64(token.trim(), self.public_key.clone())
            .map_err(|e| TokenError::TokenParseFailed(e.to_string()))?;

        let now = Utc::now().timestamp();
        let mut authorizer = AuthorizerBuilder::new()
            .code(format!(
                r#"
                time({now});
                allow if true;
                "#
            ))
            .map_err(|e| TokenError::VerificationFailed(e.to_string()))?
            .build(&biscuit)
            .map_err(|e| TokenError::VerificationFailed(e.to_string()))?;

        let base_url = required_string(&mut authorizer, "base_url")?;
        let path = required_string(&mut authorizer, "path")?;
        let org_id = query_first_string(&mut authorizer, "org_id")?;
        let role = query_first_string(&mut authorizer, "role")?;
        let extra_data = query_first_string(&mut authorizer, "extra_data")?;
        let expires_at = query_first_i64(&mut authorizer, "expires_at")?
            .and_then(|ts| DateTime::from_timestamp(ts, 0));

        let verified = match authorizer.authorize() {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "token checks failed");
                false
            }
        };

        Ok(Verification {
            payload: AccessClaims {
                base_url,
                path,
                org_id,
                role,
                extra_data,
                expires_at,
            },
            verified,
        })
    }
}

fn query_first_string(
    authorizer: &mut Authorizer,
    name: &str,
) -> Result<Option<String>, TokenError> {
    let rule = format!("data($x) <- {name}($x)");
    let results: Vec<(String,)> = authorizer
        .query(rule.as_str())
        .map_err(|e| TokenError::VerificationFailed(e.to_string()))?;
    Ok(results.into_iter().next().map(|(s,)| s))
}

fn query_first_i64(authorizer: &mut Authorizer, name: &str) -> Result<Option<i64>, TokenError> {
    let rule = format!("data($x) <- {name}($x)");
    let results: Vec<(i64,)> = authorizer
        .query(rule.as_str())
        .map_err(|e| TokenError::VerificationFailed(e.to_string()))?;
    Ok(results.into_iter().next().map(|(t,)| t))
}

fn required_string(authorizer: &mut Authorizer, name: &str) -> Result<String, TokenError> {
    query_first_string(authorizer, name)?.ok_or_else(|| TokenError::MissingClaim {
        claim: name.to_string(),
    })
}

/// Inspect a token without verification (for debugging).
pub fn inspect_token_unverified(token: &str) -> Result<TokenInfo, TokenError> {
    let biscuit = biscuit_auth::UnverifiedBiscuit::from_base64(token.trim())
        .map_err(|e| TokenError::TokenParseFailed(e.to_string()))?;

    Ok(TokenInfo {
        block_count: biscuit.block_count(),
        print: format!("Biscuit with {} blocks", biscuit.block_count()),
    })
}

/// Information about a token (for inspection).
pub struct TokenInfo {
    /// Number of blocks in the token.
    pub block_count: usize,
    /// Human-readable representation.
    pub print: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer_and_verifier() -> (TokenIssuer, BiscuitVerifier) {
        let keypair = KeyPair::generate().unwrap();
        let verifier = BiscuitVerifier::new(keypair.public_key());
        (TokenIssuer::new(keypair), verifier)
    }

    #[test]
    fn test_mint_and_verify() {
        let (issuer, verifier) = issuer_and_verifier();
        let claims = AccessClaims::new("https://app.example.com", "/abc123/watch");

        let token = issuer.mint(&claims, Some(Duration::hours(1))).unwrap();
        let verification = verifier.verify(&token).unwrap();

        assert!(verification.verified);
        assert_eq!(verification.payload.base_url, "https://app.example.com");
        assert_eq!(verification.payload.path, "/abc123/watch");
        assert_eq!(verification.payload.org_id.as_deref(), Some(""));
        assert_eq!(verification.payload.role.as_deref(), Some(""));
        assert_eq!(verification.payload.extra_data.as_deref(), Some(""));
        assert!(verification.payload.expires_at.is_some());
    }

    #[test]
    fn test_scoped_claims_survive() {
        let (issuer, verifier) = issuer_and_verifier();
        let claims = AccessClaims::new("https://b", "/v")
            .with_org_id("org-1")
            .with_role("admin")
            .with_extra_data("x");

        let token = issuer.mint(&claims, None).unwrap();
        let payload = verifier.verify(&token).unwrap().payload;

        assert_eq!(payload.org_id.as_deref(), Some("org-1"));
        assert_eq!(payload.role.as_deref(), Some("admin"));
        assert_eq!(payload.extra_data.as_deref(), Some("x"));
        assert!(payload.expires_at.is_none());
    }

    #[test]
    fn test_expired_token_is_not_verified() {
        let (issuer, verifier) = issuer_and_verifier();
        let claims = AccessClaims::new("https://b", "/v");

        let token = issuer.mint(&claims, Some(Duration::seconds(-60))).unwrap();
        let verification = verifier.verify(&token).unwrap();

        assert!(!verification.verified);
        assert_eq!(verification.payload.path, "/v");
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let (issuer, _) = issuer_and_verifier();
        let claims = AccessClaims::new("https://b", "/v");

        let result = issuer.mint(&claims, Some(Duration::days(200_000_000)));
        assert!(matches!(result, Err(TokenError::TokenCreationFailed(_))));
    }

    #[test]
    fn test_foreign_key_is_rejected() {
        let (issuer, _) = issuer_and_verifier();
        let (_, other_verifier) = issuer_and_verifier();

        let token = issuer.mint(&AccessClaims::new("https://b", "/v"), None).unwrap();
        assert!(matches!(
            other_verifier.verify(&token),
            Err(TokenError::TokenParseFailed(_))
        ));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let (_, verifier) = issuer_and_verifier();
        assert!(verifier.verify("not-a-token").is_err());
    }

    #[test]
    fn test_inspect_counts_blocks() {
        let (issuer, _) = issuer_and_verifier();
        let token = issuer.mint(&AccessClaims::new("https://b", "/v"), None).unwrap();
        let info = inspect_token_unverified(&token).unwrap();
        assert_eq!(info.block_count, 1);
    }
}
