use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::Validation;
use serde::Deserialize;

use super::algorithm::SigningAlgorithm;
use super::claims::Claims;
use super::errors::JwtError;
use crate::config::SigningConfig;
use crate::identity::IdentityLookup;

/// Only the field needed to pick a verification path; everything else in the
/// header is read again by jsonwebtoken once the algorithm is accepted.
#[derive(Debug, Deserialize)]
struct DeclaredHeader {
    alg: String,
}

/// Authenticates incoming credentials.
///
/// Verification runs parse, algorithm check, signature check, claim checks
/// and identity resolution in that order and stops at the first failure.
pub struct TokenVerifier {
    config: Arc<SigningConfig>,
    decoding_key: DecodingKey,
    validation: Validation,
    algorithm: SigningAlgorithm,
}

impl TokenVerifier {
    /// Create a new token verifier.
    ///
    /// # Arguments
    /// * `config` - Shared signing configuration
    pub fn new(config: Arc<SigningConfig>) -> Self {
        let algorithm = SigningAlgorithm::Hs256;

        // Only the signature is checked by jsonwebtoken; time and issuer
        // checks are done in `Claims::validate` against an explicit clock.
        let mut validation = Validation::new(algorithm.to_jsonwebtoken());
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Self {
            decoding_key: DecodingKey::from_secret(config.secret()),
            config,
            validation,
            algorithm,
        }
    }

    /// Authenticate a token and resolve its subject.
    ///
    /// # Arguments
    /// * `token` - Compact JWT string
    /// * `lookup` - User storage collaborator
    ///
    /// # Returns
    /// The user the token was issued for
    ///
    /// # Errors
    /// * `Parse` - Token is not a well-formed JWT
    /// * `UnexpectedAlgorithm` - Header declares anything but HS256
    /// * `InvalidSignature` - Signature does not match
    /// * `ClaimsInvalid` - Wrong issuer, not yet valid, or expired
    /// * `IdentityResolution` - Lookup of the subject failed
    pub async fn verify<L: IdentityLookup>(
        &self,
        token: &str,
        lookup: &L,
    ) -> Result<L::Identity, JwtError> {
        self.verify_at(token, lookup, Utc::now()).await
    }

    /// Authenticate a token against an explicit clock.
    pub async fn verify_at<L: IdentityLookup>(
        &self,
        token: &str,
        lookup: &L,
        now: DateTime<Utc>,
    ) -> Result<L::Identity, JwtError> {
        let claims = self.decode_at(token, now)?;

        lookup
            .lookup_identity_by_id(claims.sub)
            .await
            .map_err(|e| {
                tracing::warn!(
                    user_id = %claims.sub,
                    error = %e,
                    "Token subject could not be resolved"
                );
                JwtError::IdentityResolution(e)
            })
    }

    /// Validate a token without resolving its subject.
    ///
    /// # Returns
    /// Claims of a correctly signed, currently valid token
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_at(token, Utc::now())
    }

    /// Validate a token against an explicit clock without resolving its subject.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let declared = declared_algorithm(token).map_err(|e| {
            tracing::warn!(reason = "parse", error = %e, "Token rejected");
            e
        })?;

        if SigningAlgorithm::from_name(&declared) != Some(self.algorithm) {
            tracing::warn!(
                reason = "unexpected_algorithm",
                algorithm = %declared,
                "Token rejected"
            );
            return Err(JwtError::UnexpectedAlgorithm(declared));
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let error = match e.kind() {
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    ErrorKind::InvalidAlgorithm => {
                        JwtError::UnexpectedAlgorithm(declared.clone())
                    }
                    kind => JwtError::Parse(describe(kind).to_string()),
                };
                tracing::warn!(error = %error, "Token rejected");
                error
            })?;

        claims
            .validate(self.config.issuer(), now.timestamp())
            .map_err(|violation| {
                tracing::warn!(
                    reason = violation.as_str(),
                    user_id = %claims.sub,
                    not_before = claims.nbf,
                    expires_at = claims.exp,
                    "Token claims rejected"
                );
                JwtError::ClaimsInvalid(violation)
            })?;

        Ok(claims)
    }
}

/// Read the `alg` a token declares, without trusting anything else in it.
fn declared_algorithm(token: &str) -> Result<String, JwtError> {
    let mut segments = token.split('.');
    let header = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(header), Some(claims), Some(_), None)
            if !header.is_empty() && !claims.is_empty() =>
        {
            header
        }
        _ => {
            return Err(JwtError::Parse(
                "expected three dot-separated segments".to_string(),
            ))
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| JwtError::Parse("header is not base64url".to_string()))?;
    let header: DeclaredHeader = serde_json::from_slice(&bytes).map_err(|_| {
        JwtError::Parse("header is not a JSON object with an alg field".to_string())
    })?;

    Ok(header.alg)
}

/// Error text without quoting header or claim values back.
fn describe(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Base64(_) => "segment is not base64url",
        ErrorKind::Json(_) => "claims do not match the expected shape",
        ErrorKind::Utf8(_) => "segment is not UTF-8",
        _ => "malformed token",
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Duration;
    use jsonwebtoken::encode;
    use jsonwebtoken::Algorithm;
    use jsonwebtoken::EncodingKey;
    use jsonwebtoken::Header;
    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::identity::Identity;
    use crate::identity::IdentityLookupError;
    use crate::identity::UserId;
    use crate::jwt::errors::ClaimsViolation;
    use crate::jwt::issuer::TokenIssuer;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[derive(Debug, Clone, PartialEq)]
    pub struct TestUser {
        pub id: UserId,
        pub name: String,
    }

    impl Identity for TestUser {
        fn id(&self) -> UserId {
            self.id
        }
    }

    mock! {
        pub TestLookup {}

        #[async_trait]
        impl IdentityLookup for TestLookup {
            type Identity = TestUser;

            async fn lookup_identity_by_id(
                &self,
                id: UserId,
            ) -> Result<TestUser, IdentityLookupError>;
        }
    }

    fn config(issuer: &str, secret: &[u8]) -> Arc<SigningConfig> {
        Arc::new(SigningConfig::new(4, issuer, secret.to_vec()).unwrap())
    }

    fn verifier() -> TokenVerifier {
        TokenVerifier::new(config("trackit", SECRET))
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(config("trackit", SECRET))
    }

    fn alice() -> TestUser {
        TestUser {
            id: UserId(42),
            name: "alice".to_string(),
        }
    }

    fn lookup_returning_alice() -> MockTestLookup {
        let mut lookup = MockTestLookup::new();
        lookup
            .expect_lookup_identity_by_id()
            .with(eq(UserId(42)))
            .times(1)
            .returning(|_| Ok(alice()));
        lookup
    }

    fn lookup_never_called() -> MockTestLookup {
        let mut lookup = MockTestLookup::new();
        lookup.expect_lookup_identity_by_id().times(0);
        lookup
    }

    fn unsigned_token(header: serde_json::Value, claims: &Claims) -> String {
        format!(
            "{}.{}.",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap())
        )
    }

    #[tokio::test]
    async fn test_verify_success() {
        let token = issuer().issue(&alice()).unwrap();
        let lookup = lookup_returning_alice();

        let user = verifier().verify(&token, &lookup).await.unwrap();
        assert_eq!(user, alice());
        assert_eq!(user.name, "alice");
    }

    #[tokio::test]
    async fn test_verify_within_grace_window() {
        let now = Utc::now();
        let token = issuer().issue_at(&alice(), now).unwrap();
        let lookup = lookup_returning_alice();

        // Verifier clock 30 minutes behind the issuer.
        let result = verifier()
            .verify_at(&token, &lookup, now - Duration::minutes(30))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_verify_not_yet_valid() {
        let now = Utc::now();
        let token = issuer().issue_at(&alice(), now).unwrap();
        let lookup = lookup_never_called();

        let result = verifier()
            .verify_at(&token, &lookup, now - Duration::hours(2))
            .await;
        assert_eq!(
            result,
            Err(JwtError::ClaimsInvalid(ClaimsViolation::NotYetValid))
        );
    }

    #[tokio::test]
    async fn test_verify_expired() {
        let now = Utc::now();
        let token = issuer().issue_at(&alice(), now).unwrap();
        let lookup = lookup_never_called();

        let result = verifier()
            .verify_at(&token, &lookup, now + Duration::days(60))
            .await;
        assert_eq!(result, Err(JwtError::ClaimsInvalid(ClaimsViolation::Expired)));
    }

    #[tokio::test]
    async fn test_verify_issuer_mismatch() {
        let token = TokenIssuer::new(config("someone-else", SECRET))
            .issue(&alice())
            .unwrap();
        let lookup = lookup_never_called();

        let result = verifier().verify(&token, &lookup).await;
        assert_eq!(
            result,
            Err(JwtError::ClaimsInvalid(ClaimsViolation::IssuerMismatch))
        );
    }

    #[tokio::test]
    async fn test_verify_with_wrong_secret() {
        let token = TokenIssuer::new(config("trackit", b"secret2_at_least_32_bytes_long_key!"))
            .issue(&alice())
            .unwrap();
        let lookup = lookup_never_called();

        let result = verifier().verify(&token, &lookup).await;
        assert_eq!(result, Err(JwtError::InvalidSignature));
    }

    #[tokio::test]
    async fn test_verify_tampered_claims() {
        let token = issuer().issue(&alice()).unwrap();
        let segments: Vec<&str> = token.split('.').collect();

        let mut claims = verifier().decode(&token).unwrap();
        claims.sub = UserId(1);
        let forged_claims = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", segments[0], forged_claims, segments[2]);

        let lookup = lookup_never_called();
        let result = verifier().verify(&forged, &lookup).await;
        assert_eq!(result, Err(JwtError::InvalidSignature));
    }

    #[tokio::test]
    async fn test_verify_rejects_none_algorithm() {
        let claims = Claims::for_identity(&alice(), "trackit", Utc::now());
        let token = unsigned_token(serde_json::json!({"alg": "none", "typ": "JWT"}), &claims);
        let lookup = lookup_never_called();

        let result = verifier().verify(&token, &lookup).await;
        assert_eq!(result, Err(JwtError::UnexpectedAlgorithm("none".to_string())));
    }

    #[tokio::test]
    async fn test_verify_rejects_other_hmac_width() {
        // Same secret, so the signature itself would verify under HS512.
        let claims = Claims::for_identity(&alice(), "trackit", Utc::now());
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        let lookup = lookup_never_called();

        let result = verifier().verify(&token, &lookup).await;
        assert_eq!(result, Err(JwtError::UnexpectedAlgorithm("HS512".to_string())));
    }

    #[tokio::test]
    async fn test_verify_rejects_algorithm_before_signature() {
        // Garbage signature: an algorithm failure proves no MAC was compared.
        let claims = Claims::for_identity(&alice(), "trackit", Utc::now());
        let token = format!(
            "{}garbage",
            unsigned_token(serde_json::json!({"alg": "RS256"}), &claims)
        );
        let lookup = lookup_never_called();

        let result = verifier().verify(&token, &lookup).await;
        assert_eq!(result, Err(JwtError::UnexpectedAlgorithm("RS256".to_string())));
    }

    #[tokio::test]
    async fn test_verify_malformed_tokens() {
        let verifier = verifier();
        let lookup = lookup_never_called();

        for token in [
            "",
            "invalid",
            "invalid.token",
            "invalid.token.here",
            "a.b.c.d",
            ".claims.signature",
        ] {
            let result = verifier.verify(token, &lookup).await;
            assert!(
                matches!(result, Err(JwtError::Parse(_))),
                "expected parse error for {:?}, got {:?}",
                token,
                result
            );
        }
    }

    #[tokio::test]
    async fn test_verify_header_without_alg() {
        let claims = Claims::for_identity(&alice(), "trackit", Utc::now());
        let token = unsigned_token(serde_json::json!({"typ": "JWT"}), &claims);
        let lookup = lookup_never_called();

        let result = verifier().verify(&token, &lookup).await;
        assert!(matches!(result, Err(JwtError::Parse(_))));
    }

    #[tokio::test]
    async fn test_verify_signed_claims_with_wrong_shape() {
        #[derive(serde::Serialize)]
        struct OtherClaims {
            sub: String,
            role: String,
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &OtherClaims {
                sub: "user123".to_string(),
                role: "admin".to_string(),
            },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        let lookup = lookup_never_called();

        let result = verifier().verify(&token, &lookup).await;
        assert!(matches!(result, Err(JwtError::Parse(_))));
    }

    #[test]
    fn test_parse_errors_do_not_quote_token_content() {
        let signed = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({
                "iss": "trackit",
                "nbf": 0,
                "exp": i64::MAX,
                "sub": "alice@corp.example",
            }),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let error = verifier().decode(&signed).unwrap_err();
        assert!(matches!(error, JwtError::Parse(_)));
        assert!(!error.to_string().contains("alice@corp.example"));

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg": 7, "kid": "internal-key-name"}"#);
        let token = format!("{}.e30.sig", header);
        let error = verifier().decode(&token).unwrap_err();
        assert!(matches!(error, JwtError::Parse(_)));
        assert!(!error.to_string().contains("internal-key-name"));
    }

    #[tokio::test]
    async fn test_verify_user_not_found() {
        let token = issuer().issue(&alice()).unwrap();
        let mut lookup = MockTestLookup::new();
        lookup
            .expect_lookup_identity_by_id()
            .with(eq(UserId(42)))
            .times(1)
            .returning(|id| Err(IdentityLookupError::NotFound(id)));

        let result = verifier().verify(&token, &lookup).await;
        assert_eq!(
            result,
            Err(JwtError::IdentityResolution(IdentityLookupError::NotFound(
                UserId(42)
            )))
        );
        assert!(result.unwrap_err().is_unauthenticated());
    }

    #[tokio::test]
    async fn test_verify_storage_unavailable() {
        let token = issuer().issue(&alice()).unwrap();
        let mut lookup = MockTestLookup::new();
        lookup
            .expect_lookup_identity_by_id()
            .times(1)
            .returning(|_| Err(IdentityLookupError::Unavailable("connection refused".to_string())));

        let error = verifier().verify(&token, &lookup).await.unwrap_err();
        assert!(matches!(
            error,
            JwtError::IdentityResolution(IdentityLookupError::Unavailable(_))
        ));
        assert!(!error.is_unauthenticated());
    }

    #[test]
    fn test_decode_returns_claims() {
        let now = Utc::now();
        let token = issuer().issue_at(&alice(), now).unwrap();

        let claims = verifier().decode_at(&token, now).unwrap();
        assert_eq!(claims, Claims::for_identity(&alice(), "trackit", now));
    }

    #[test]
    fn test_errors_do_not_leak_secret() {
        let token = TokenIssuer::new(config("trackit", b"another_secret_value_32_bytes_xx"))
            .issue(&alice())
            .unwrap();

        let error = verifier().decode(&token).unwrap_err();
        let message = error.to_string();
        assert!(!message.contains("test_secret_key"));
        assert!(!message.contains("another_secret_value"));
    }
}
