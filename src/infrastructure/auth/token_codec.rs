//! Session token signing and verification

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Debug;

use crate::domain::auth::TokenError;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at timestamp (Unix epoch seconds)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn expires_at(&self) -> Result<DateTime<Utc>, TokenError> {
        DateTime::from_timestamp(self.exp, 0).ok_or(TokenError::Malformed)
    }

    /// A token is valid strictly before its expiry second
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// A freshly minted token and its expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// HS256 codec for session tokens.
///
/// Holds only the signing keys, so verification is a pure function of
/// the token, the key and the instant it is checked at.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenCodec {
    /// Create a codec signing with the given shared secret
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Mint a token for `subject` valid for `ttl` from now
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Mint a token as if issued at `now`.
    ///
    /// A positive `ttl` rounds the expiry up to the next whole second, so the
    /// token is valid for at least `ttl`. A non-positive `ttl` yields a token
    /// that is already expired.
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let iat = now.timestamp();
        let end = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Signing("token lifetime out of range".to_string()))?;
        let exp = if ttl > Duration::zero() && end.timestamp_subsec_nanos() > 0 {
            end.timestamp() + 1
        } else {
            end.timestamp()
        };

        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let expires_at = claims.expires_at()?;
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify structure, signature and expiry against the current time
    pub fn verify(&self, raw: &str) -> Result<Claims, TokenError> {
        self.verify_at(raw, Utc::now())
    }

    /// Verify structure, signature and expiry against `now`
    pub fn verify_at(&self, raw: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let raw = raw.trim();
        check_algorithm(raw)?;

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(raw, &self.decoding_key, &validation)
            .map_err(map_decode_error)?
            .claims;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Decode claims without checking the signature or expiry.
    ///
    /// Only for revocation bookkeeping; never use the result to authenticate.
    pub fn claims(&self, raw: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(raw.trim(), &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    /// Canonical revocation key for a raw token (hex SHA-256 of the trimmed
    /// token)
    pub fn canonical_key(raw: &str) -> String {
        hex::encode(Sha256::digest(raw.trim().as_bytes()))
    }
}

/// Reject tokens whose header names any algorithm other than HS256,
/// including ones the JWT library cannot represent such as `none`.
fn check_algorithm(raw: &str) -> Result<(), TokenError> {
    let mut segments = raw.split('.');
    let (Some(header), Some(_), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::Malformed)?;
    let header: RawHeader = serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)?;

    if header.alg != "HS256" {
        return Err(TokenError::Unsupported);
    }

    Ok(())
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidAlgorithm => TokenError::Unsupported,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_codec() -> TokenCodec {
        TokenCodec::new("test-secret-key-12345")
    }

    fn craft(header_json: &str, claims: &Claims) -> String {
        let header = URL_SAFE_NO_PAD.encode(header_json);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        format!("{}.{}.c2lnbmF0dXJl", header, payload)
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = create_codec();

        let issued = codec.issue("user-1", Duration::hours(24)).unwrap();
        assert!(!issued.token.is_empty());

        let claims = codec.verify(&issued.token).unwrap();
        assert_eq!(claims.subject(), "user-1");
        assert_eq!(claims.expires_at().unwrap(), issued.expires_at);
        assert!((24 * 3600..=24 * 3600 + 1).contains(&(claims.exp - claims.iat)));
    }

    #[test]
    fn test_non_positive_ttl_is_expired() {
        let codec = create_codec();

        for ttl in [Duration::zero(), Duration::seconds(-30), Duration::milliseconds(-400)] {
            let issued = codec.issue("user-1", ttl).unwrap();
            assert_eq!(codec.verify(&issued.token), Err(TokenError::Expired));
        }
    }

    #[test]
    fn test_short_ttl_survives_fractional_issue_instant() {
        let codec = create_codec();
        let now = DateTime::from_timestamp(1_800_000_000, 999_000_000).unwrap();

        let issued = codec.issue_at("user-1", Duration::seconds(1), now).unwrap();
        let claims = codec
            .verify_at(&issued.token, now + Duration::milliseconds(5))
            .unwrap();
        assert_eq!(claims.subject(), "user-1");
        assert!(issued.expires_at >= now + Duration::seconds(1));

        for ttl in [Duration::milliseconds(400), Duration::milliseconds(1500)] {
            let issued = codec.issue_at("user-1", ttl, now).unwrap();
            assert!(codec.verify_at(&issued.token, now).is_ok());
            assert!(issued.expires_at >= now + ttl);
        }
    }

    #[test]
    fn test_ttl_out_of_range_is_rejected() {
        let codec = create_codec();
        let result = codec.issue_at("user-1", Duration::MAX, Utc::now());
        assert!(matches!(result, Err(TokenError::Signing(_))));
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = create_codec();
        let now = Utc::now();
        let issued = codec.issue_at("user-1", Duration::seconds(60), now).unwrap();

        let just_before = issued.expires_at - Duration::seconds(1);
        assert!(codec.verify_at(&issued.token, just_before).is_ok());
        assert_eq!(
            codec.verify_at(&issued.token, issued.expires_at),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_verification_is_deterministic() {
        let codec = create_codec();
        let now = Utc::now();
        let issued = codec.issue_at("user-1", Duration::seconds(60), now).unwrap();

        let first = codec.verify_at(&issued.token, now);
        let second = codec.verify_at(&issued.token, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_tokens_for_same_subject_differ() {
        let codec = create_codec();
        let now = Utc::now();

        let a = codec.issue_at("user-1", Duration::hours(1), now).unwrap();
        let b = codec.issue_at("user-1", Duration::hours(1), now).unwrap();

        assert_ne!(a.token, b.token);
        assert_ne!(TokenCodec::canonical_key(&a.token), TokenCodec::canonical_key(&b.token));
    }

    #[test]
    fn test_wrong_secret_is_malformed() {
        let issuer = TokenCodec::new("secret-1");
        let verifier = TokenCodec::new("secret-2");

        let issued = issuer.issue("user-1", Duration::hours(1)).unwrap();
        assert_eq!(verifier.verify(&issued.token), Err(TokenError::Malformed));
    }

    #[test]
    fn test_tampered_payload_is_malformed() {
        let codec = create_codec();
        let issued = codec.issue("user-1", Duration::hours(1)).unwrap();

        let mut parts: Vec<&str> = issued.token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(r#"{"sub":"admin","iat":0,"exp":99999999999,"jti":"x"}"#);
        parts[1] = &forged;
        let tampered = parts.join(".");

        assert_eq!(codec.verify(&tampered), Err(TokenError::Malformed));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = create_codec();

        assert_eq!(codec.verify("invalid-token"), Err(TokenError::Malformed));
        assert_eq!(codec.verify("a.b.c"), Err(TokenError::Malformed));
        assert_eq!(codec.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_other_algorithms_are_unsupported() {
        let codec = create_codec();
        let claims = Claims {
            sub: "user-1".to_string(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
            jti: "jti-1".to_string(),
        };

        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();
        assert_eq!(codec.verify(&hs512), Err(TokenError::Unsupported));

        let unsigned = craft(r#"{"alg":"none","typ":"JWT"}"#, &claims);
        assert_eq!(codec.verify(&unsigned), Err(TokenError::Unsupported));
    }

    #[test]
    fn test_claims_ignores_signature_and_expiry() {
        let codec = create_codec();
        let other = TokenCodec::new("some-other-secret");

        let expired = codec.issue("user-1", Duration::seconds(-5)).unwrap();
        let claims = codec.claims(&expired.token).unwrap();
        assert_eq!(claims.subject(), "user-1");

        let foreign = other.issue("user-2", Duration::hours(1)).unwrap();
        assert_eq!(codec.claims(&foreign.token).unwrap().subject(), "user-2");
    }

    #[test]
    fn test_claims_of_garbage_is_malformed() {
        let codec = create_codec();
        assert_eq!(codec.claims("not-a-token"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_canonical_key() {
        let key = TokenCodec::canonical_key("abc.def.ghi");

        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, TokenCodec::canonical_key("  abc.def.ghi\n"));
        assert!(!key.contains("abc"));
    }

    #[test]
    fn test_debug_hides_keys() {
        let debug = format!("{:?}", create_codec());
        assert!(debug.contains("[hidden]"));
        assert!(!debug.contains("test-secret"));
    }
}
