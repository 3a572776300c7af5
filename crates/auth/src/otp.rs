use rand::Rng;
use sha2::{Digest, Sha256};

const CODE_LENGTH: usize = 6;

/// Generate a numeric one-time code
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// SHA256 digest of a code, the only form kept in the database
pub fn hash(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.trim().as_bytes());
    hex::encode(hasher.finalize())
}

/// Compare a submitted code with a stored digest
pub fn matches(code: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(stored) if !stored.is_empty() => {
            let candidate = hash(code);
            candidate.len() == stored.len()
                && candidate
                    .bytes()
                    .zip(stored.bytes())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let code = generate();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_matches() {
        let code = generate();
        let stored = hash(&code);

        assert!(matches(&code, Some(&stored)));
        assert!(matches(&format!(" {} ", code), Some(&stored)));
        assert!(!matches("not-it", Some(&stored)));
        assert!(!matches(&code, None));
        assert!(!matches(&code, Some("")));
    }
}
