use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::AuthError;

const SCHEME: &str = "pbkdf2-sha256";
pub const DEFAULT_ITERATIONS: u32 = 600_000;
pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;

/// Encode a password as `pbkdf2-sha256$<iterations>$<salt>$<hash>`.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let iterations = iterations.max(1);
    let salt = generate_salt();
    let hash = derive(password, &salt, iterations);
    format!(
        "{SCHEME}${iterations}${}${}",
        STANDARD.encode(salt),
        STANDARD.encode(hash.as_slice())
    )
}

/// Check a password against a stored encoding. Comparison is constant-time.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, AuthError> {
    let mut parts = encoded.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(AuthError::MalformedHash);
    };

    let iterations: u32 = iterations
        .parse()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(AuthError::MalformedHash)?;
    let salt = STANDARD
        .decode(salt)
        .map_err(|_| AuthError::MalformedHash)?;
    let expected = STANDARD
        .decode(expected)
        .map_err(|_| AuthError::MalformedHash)?;
    if expected.len() != HASH_LENGTH {
        return Err(AuthError::MalformedHash);
    }

    let derived = derive(password, &salt, iterations);
    Ok(derived.as_slice().ct_eq(&expected).into())
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; HASH_LENGTH]> {
    let mut out = Zeroizing::new([0u8; HASH_LENGTH]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, out.as_mut_slice());
    out
}

fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: u32 = 1_000;

    #[test]
    fn hash_then_verify() {
        let encoded = hash_password("correct horse", FAST);
        assert!(verify_password("correct horse", &encoded).unwrap());
        assert!(!verify_password("wrong horse", &encoded).unwrap());
    }

    #[test]
    fn encoding_carries_scheme_and_iterations() {
        let encoded = hash_password("secret-password", FAST);
        let parts: Vec<_> = encoded.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2-sha256");
        assert_eq!(parts[1], "1000");
    }

    #[test]
    fn same_password_gets_fresh_salt() {
        let a = hash_password("same-password", FAST);
        let b = hash_password("same-password", FAST);
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_encodings_rejected() {
        for bad in [
            "",
            "plaintext",
            "bcrypt$10$abc$def",
            "pbkdf2-sha256$0$AAAA$AAAA",
            "pbkdf2-sha256$1000$!!!$AAAA",
            "pbkdf2-sha256$1000$AAAA$AAAA",
            "pbkdf2-sha256$1000$AAAA$AAAA$extra",
        ] {
            assert!(
                matches!(verify_password("x", bad), Err(AuthError::MalformedHash)),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn zero_iterations_clamped() {
        let encoded = hash_password("password123", 0);
        assert!(encoded.starts_with("pbkdf2-sha256$1$"));
        assert!(verify_password("password123", &encoded).unwrap());
    }
}
