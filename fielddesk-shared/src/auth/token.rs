/// Session tokens and cookie signing
///
/// A session is identified by a random token. Three forms of it exist:
///
/// - the **raw token**, 32 alphanumeric characters, held only by the
///   browser;
/// - the **stored hash**, SHA-256 hex of the raw token, the only form
///   the database ever sees;
/// - the **cookie value**, `token.signature`, where the signature is
///   HMAC-SHA256 over the token under the server's session secret.
///
/// The signature lets the server discard forged or corrupted cookies
/// before touching the database; the stored hash means a database leak
/// does not yield replayable cookies.
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Length of the raw session token in characters
pub const SESSION_TOKEN_LENGTH: usize = 32;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Error type for cookie signing operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The session secret was rejected by the MAC
    #[error("Invalid session secret")]
    InvalidKey,
}

/// Generates a new random session token
///
/// 32 alphanumeric characters from the OS-seeded thread RNG, roughly
/// 190 bits of randomness.
pub fn generate_session_token() -> String {
    let mut rng = rand::thread_rng();

    (0..SESSION_TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a raw token for storage
///
/// # Returns
///
/// Lowercase SHA-256 hex digest
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Builds the signed cookie value for a raw token
///
/// # Returns
///
/// `token.signature` with the signature in lowercase hex
///
/// # Errors
///
/// Returns `TokenError::InvalidKey` if the secret is rejected
pub fn sign_session_cookie(secret: &str, token: &str) -> Result<String, TokenError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::InvalidKey)?;
    mac.update(token.as_bytes());

    let signature = mac.finalize().into_bytes();

    Ok(format!("{}.{}", token, hex::encode(signature)))
}

/// Verifies a cookie value and extracts the raw token
///
/// The signature comparison is constant-time. Anything malformed, a
/// missing separator, non-hex signature bytes, or a signature that
/// does not verify, comes back as None rather than an error; a bad
/// cookie is an expected input, not a fault.
///
/// # Returns
///
/// The raw token if the cookie is authentic, None otherwise
///
/// # Errors
///
/// Returns `TokenError::InvalidKey` if the secret is rejected
pub fn verify_session_cookie(
    secret: &str,
    cookie_value: &str,
) -> Result<Option<String>, TokenError> {
    let Some((token, signature_hex)) = cookie_value.split_once('.') else {
        return Ok(None);
    };

    if token.is_empty() {
        return Ok(None);
    }

    let Ok(signature) = hex::decode(signature_hex) else {
        return Ok(None);
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::InvalidKey)?;
    mac.update(token.as_bytes());

    match mac.verify_slice(&signature) {
        Ok(()) => Ok(Some(token.to_string())),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_session_token_shape() {
        let token = generate_session_token();

        assert_eq!(token.len(), SESSION_TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_session_token_is_random() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_token_known_answer() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let token = generate_session_token();
        let cookie = sign_session_cookie("secret", &token).unwrap();

        let recovered = verify_session_cookie("secret", &cookie).unwrap();
        assert_eq!(recovered, Some(token));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let cookie = sign_session_cookie("secret", "sometoken").unwrap();

        let recovered = verify_session_cookie("other-secret", &cookie).unwrap();
        assert_eq!(recovered, None);
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let cookie = sign_session_cookie("secret", "sometoken").unwrap();
        let tampered = cookie.replacen("sometoken", "eviltoken", 1);

        assert_eq!(verify_session_cookie("secret", &tampered).unwrap(), None);
    }

    #[test]
    fn test_verify_rejects_malformed_values() {
        for value in ["", "nodothere", ".", "token.", "token.nothex", ".abcdef"] {
            assert_eq!(
                verify_session_cookie("secret", value).unwrap(),
                None,
                "value {:?} should be rejected",
                value
            );
        }
    }
}
