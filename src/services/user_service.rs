use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use rand::RngCore;
use hex::encode as hex_encode;

use crate::config::DEFAULT_PBKDF2_ITERATIONS;

const HASH_PREFIX: &str = "pbkdf2:sha256:";

/// Hashes `password` as `pbkdf2:sha256:<iterations>$<salt>$<hex digest>`.
pub fn generate_password_hash(password: &str) -> String {
    hash_with_iterations(password, DEFAULT_PBKDF2_ITERATIONS)
}

fn hash_with_iterations(password: &str, iterations: u32) -> String {
    let mut salt_bytes = [0u8; 12];
    rand::rngs::OsRng.fill_bytes(&mut salt_bytes);
    let salt = hex_encode(salt_bytes);
    let mut dk = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut dk);
    format!("{}{}${}${}", HASH_PREFIX, iterations, salt, hex_encode(dk))
}

pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let Some(rest) = stored.strip_prefix(HASH_PREFIX) else {
        return false;
    };
    let mut parts = rest.splitn(3, '$');
    let (Some(iter_s), Some(salt), Some(expected_hash)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    let Ok(iterations) = iter_s.parse::<u32>() else {
        return false;
    };
    let mut dk = [0u8; 32];
    pbkdf2_hmac::<Sha256>(candidate.as_bytes(), salt.as_bytes(), iterations, &mut dk);
    hex_encode(dk) == expected_hash
}

pub fn random_session_id() -> String {
    let mut b = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut b);
    hex_encode(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_with_iterations("secret", 1_000);
        assert!(hash.starts_with("pbkdf2:sha256:1000$"));
        assert!(verify_password(&hash, "secret"));
        assert!(!verify_password(&hash, "Secret"));
    }

    #[test]
    fn hashes_are_salted() {
        assert_ne!(hash_with_iterations("secret", 1_000), hash_with_iterations("secret", 1_000));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("plain-text", "plain-text"));
        assert!(!verify_password("pbkdf2:sha256:abc$salt$hash", "x"));
        assert!(!verify_password("pbkdf2:sha256:1000$salt", "x"));
    }

    #[test]
    fn session_ids_are_hex_and_unique() {
        let a = random_session_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, random_session_id());
    }
}
